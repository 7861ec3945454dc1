//! Learning Style Engine server.
//!
//! Loads configuration from `LEARNING_STYLE__*` environment variables,
//! connects storage, and serves the learning API.

use std::error::Error;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use learning_style_engine::adapters::{
    HttpStylePredictor, InMemoryLearningStore, JwtSessionValidator, PostgresLearningStore,
    PredictionServiceConfig,
};
use learning_style_engine::app::LearningServices;
use learning_style_engine::application::handlers::learning::PurgeExpiredBehaviorCommand;
use learning_style_engine::config::{AppConfig, ServerConfig, ValidationError};
use learning_style_engine::domain::foundation::Timestamp;
use learning_style_engine::ports::StylePredictor;

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    if server.json_logs() {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins)).allow_credentials(true)
    }
}

async fn build_services(config: &AppConfig, predictor: Arc<dyn StylePredictor>) -> Result<LearningServices, Box<dyn Error>> {
    let Some(url) = config.database.url.as_ref() else {
        warn!("No database configured; using in-memory storage");
        return Ok(LearningServices::build(InMemoryLearningStore::new(), predictor, config));
    };

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .idle_timeout(config.database.idle_timeout())
        .connect(url.expose_secret())
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied");
    }

    Ok(LearningServices::build(PostgresLearningStore::new(pool), predictor, config))
}

fn spawn_retention_sweep(services: &LearningServices, config: &AppConfig) {
    let Some(period) = config.retention.sweep_interval() else {
        info!("Retention sweep disabled");
        return;
    };

    let purge = Arc::clone(&services.purge);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            match purge.handle(PurgeExpiredBehaviorCommand { now: Timestamp::now() }).await {
                Ok(result) if result.purged > 0 => {
                    info!(purged = result.purged, "Expired behavior records purged");
                }
                Ok(_) => {}
                Err(err) => warn!(error = %err, "Retention sweep failed"),
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let secret = config
        .auth
        .jwt_secret
        .as_ref()
        .ok_or(ValidationError::MissingRequired("AUTH__JWT_SECRET"))?;
    let validator = Arc::new(JwtSessionValidator::new(secret));

    let predictor: Arc<dyn StylePredictor> = Arc::new(HttpStylePredictor::new(
        PredictionServiceConfig::new(config.ml_service.base_url.clone())
            .with_timeouts(config.ml_service.health_timeout(), config.ml_service.predict_timeout()),
    )?);

    let services = build_services(&config, predictor).await?;
    spawn_retention_sweep(&services, &config);

    let app = services
        .router(validator, &config)
        .layer(CompressionLayer::new())
        .layer(cors_layer(&config.server))
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(
        address = %addr,
        environment = ?config.server.environment,
        ml_service = %config.ml_service.base_url,
        "Learning style engine listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
