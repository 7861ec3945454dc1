//! PostgreSQL learning store.
//!
//! Profiles and session records are stored as JSONB documents keyed by
//! user (and session). Every write runs in a transaction that first upserts
//! the user's profile row and then holds it with `SELECT ... FOR UPDATE`,
//! so tracking and profile mutations for one user are serialized.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool, Row};

use crate::domain::foundation::{BehaviorSessionId, DomainError, Timestamp, UserId};
use crate::domain::learning::{
    track_session, BehaviorSnapshot, DataQualityPolicy, LearningStyleProfile, ProfileMutation,
    SessionBehaviorRecord,
};
use crate::ports::{BehaviorStore, LearningProfileRepository, TrackingOutcome};

/// PostgreSQL implementation of both learning persistence ports.
#[derive(Clone)]
pub struct PostgresLearningStore {
    pool: PgPool,
}

impl PostgresLearningStore {
    /// Creates a new store with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(action: &str, err: sqlx::Error) -> DomainError {
    DomainError::database(format!("Failed to {}: {}", action, err))
}

/// Inserts an empty profile if none exists, then locks and loads the row.
async fn lock_profile(
    conn: &mut PgConnection,
    user_id: &UserId,
    now: Timestamp,
) -> Result<LearningStyleProfile, DomainError> {
    let fresh = LearningStyleProfile::new(user_id.clone(), now);
    sqlx::query(
        r#"
        INSERT INTO learning_style_profiles (user_id, id, document, version, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(user_id.as_str())
    .bind(*fresh.id().as_uuid())
    .bind(Json(&fresh))
    .bind(fresh.version().as_u32() as i32)
    .bind(fresh.created_at().as_datetime())
    .bind(fresh.updated_at().as_datetime())
    .execute(&mut *conn)
    .await
    .map_err(|e| db_error("upsert profile", e))?;

    let row = sqlx::query(
        r#"
        SELECT document FROM learning_style_profiles
        WHERE user_id = $1
        FOR UPDATE
        "#,
    )
    .bind(user_id.as_str())
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| db_error("lock profile", e))?;

    let Json(profile): Json<LearningStyleProfile> = row
        .try_get("document")
        .map_err(|e| db_error("decode profile", e))?;
    Ok(profile)
}

async fn save_profile(conn: &mut PgConnection, profile: &LearningStyleProfile) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        UPDATE learning_style_profiles
        SET document = $2, version = $3, updated_at = $4
        WHERE user_id = $1
        "#,
    )
    .bind(profile.user_id().as_str())
    .bind(Json(profile))
    .bind(profile.version().as_u32() as i32)
    .bind(profile.updated_at().as_datetime())
    .execute(&mut *conn)
    .await
    .map_err(|e| db_error("update profile", e))?;
    Ok(())
}

#[async_trait]
impl BehaviorStore for PostgresLearningStore {
    async fn record_and_fold(
        &self,
        user_id: &UserId,
        session_id: &BehaviorSessionId,
        snapshot: BehaviorSnapshot,
        policy: &DataQualityPolicy,
        now: Timestamp,
    ) -> Result<TrackingOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("start transaction", e))?;

        let mut profile = lock_profile(&mut tx, user_id, now).await?;

        let existing = sqlx::query(
            r#"
            SELECT document FROM learning_behavior_sessions
            WHERE user_id = $1 AND session_id = $2
            "#,
        )
        .bind(user_id.as_str())
        .bind(session_id.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("load session record", e))?
        .map(|row| row.try_get::<Json<SessionBehaviorRecord>, _>("document"))
        .transpose()
        .map_err(|e| db_error("decode session record", e))?
        .map(|Json(record)| record);

        let tracked = track_session(existing, &mut profile, session_id.clone(), snapshot, policy, now);

        sqlx::query(
            r#"
            INSERT INTO learning_behavior_sessions (user_id, session_id, document, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, session_id)
            DO UPDATE SET document = EXCLUDED.document, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user_id.as_str())
        .bind(session_id.as_str())
        .bind(Json(&tracked.record))
        .bind(tracked.record.created_at().as_datetime())
        .bind(tracked.record.updated_at().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("save session record", e))?;

        if !tracked.fold.already_folded {
            save_profile(&mut tx, &profile).await?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("commit transaction", e))?;

        Ok(TrackingOutcome {
            fold: tracked.fold,
            merge: tracked.merge,
            data_quality: *profile.data_quality(),
            classification_method: profile.classification().method,
        })
    }

    async fn find_session(
        &self,
        user_id: &UserId,
        session_id: &BehaviorSessionId,
    ) -> Result<Option<SessionBehaviorRecord>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT document FROM learning_behavior_sessions
            WHERE user_id = $1 AND session_id = $2
            "#,
        )
        .bind(user_id.as_str())
        .bind(session_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("load session record", e))?;

        match row {
            Some(row) => {
                let Json(record): Json<SessionBehaviorRecord> = row
                    .try_get("document")
                    .map_err(|e| db_error("decode session record", e))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn purge_expired(&self, cutoff: Timestamp) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM learning_behavior_sessions WHERE updated_at < $1")
            .bind(cutoff.as_datetime())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("purge session records", e))?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl LearningProfileRepository for PostgresLearningStore {
    async fn get_or_create(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<LearningStyleProfile, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("start transaction", e))?;
        let profile = lock_profile(&mut tx, user_id, now).await?;
        tx.commit()
            .await
            .map_err(|e| db_error("commit transaction", e))?;
        Ok(profile)
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<LearningStyleProfile>, DomainError> {
        let row = sqlx::query("SELECT document FROM learning_style_profiles WHERE user_id = $1")
            .bind(user_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("load profile", e))?;

        match row {
            Some(row) => {
                let Json(profile): Json<LearningStyleProfile> = row
                    .try_get("document")
                    .map_err(|e| db_error("decode profile", e))?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    async fn update_with(
        &self,
        user_id: &UserId,
        mutation: ProfileMutation,
        now: Timestamp,
    ) -> Result<LearningStyleProfile, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("start transaction", e))?;

        let mut profile = lock_profile(&mut tx, user_id, now).await?;
        // dropping the transaction on error rolls it back
        mutation.apply(&mut profile, now)?;
        save_profile(&mut tx, &profile).await?;

        tx.commit()
            .await
            .map_err(|e| db_error("commit transaction", e))?;
        Ok(profile)
    }
}
