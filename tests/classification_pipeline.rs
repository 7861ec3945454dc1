//! End-to-end classification pipeline tests.
//!
//! Runs tracking and classification against the real HTTP prediction
//! client, pointed at a local axum stub of the prediction service.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, routing::post, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use learning_style_engine::adapters::{HttpStylePredictor, InMemoryLearningStore, PredictionServiceConfig};
use learning_style_engine::application::handlers::learning::{
    ClassificationRunner, HybridClassifier, HybridClassifierConfig, TrackBehaviorCommand,
    TrackBehaviorHandler, TrackingPolicy,
};
use learning_style_engine::domain::foundation::{BehaviorSessionId, CommandMetadata, Timestamp, UserId};
use learning_style_engine::domain::learning::{
    ClassificationMethod, ClassifierPath, DataQualityPolicy, FslsmDimension,
};
use learning_style_engine::ports::{BehaviorStore, LearningProfileRepository};

// =============================================================================
// Prediction service stub
// =============================================================================

#[derive(Clone, Copy)]
enum StubMode {
    Healthy,
    ServerError,
    Slow(Duration),
}

#[derive(Clone)]
struct StubState {
    mode: StubMode,
    predict_calls: Arc<AtomicUsize>,
}

async fn stub_health() -> Json<Value> {
    Json(json!({ "status": "healthy", "models_loaded": true, "version": "stub-2" }))
}

async fn stub_predict(State(state): State<StubState>, Json(_body): Json<Value>) -> impl IntoResponse {
    state.predict_calls.fetch_add(1, Ordering::SeqCst);
    match state.mode {
        StubMode::ServerError => {
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "boom" })));
        }
        StubMode::Slow(delay) => tokio::time::sleep(delay).await,
        StubMode::Healthy => {}
    }
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "predictions": {
                "activeReflective": 6.4,
                "sensingIntuitive": -3,
                "visualVerbal": 2,
                "sequentialGlobal": 0
            },
            "confidence": {
                "activeReflective": 0.9,
                "sensingIntuitive": 0.7,
                "visualVerbal": 0.5,
                "sequentialGlobal": 0.3
            },
            "version": "stub-2"
        })),
    )
}

struct Stub {
    base_url: String,
    predict_calls: Arc<AtomicUsize>,
}

async fn start_stub(mode: StubMode) -> Stub {
    let predict_calls = Arc::new(AtomicUsize::new(0));
    let state = StubState {
        mode,
        predict_calls: predict_calls.clone(),
    };
    let app = Router::new()
        .route("/health", get(stub_health))
        .route("/predict", post(stub_predict))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Stub {
        base_url: format!("http://{}", addr),
        predict_calls,
    }
}

// =============================================================================
// Test Infrastructure
// =============================================================================

fn user() -> UserId {
    UserId::new("learner-1").unwrap()
}

fn runner(store: &InMemoryLearningStore, base_url: &str) -> Arc<ClassificationRunner> {
    let timeouts = HybridClassifierConfig {
        health_timeout: Duration::from_millis(500),
        predict_timeout: Duration::from_millis(300),
    };
    let predictor = HttpStylePredictor::new(
        PredictionServiceConfig::new(base_url).with_timeouts(timeouts.health_timeout, timeouts.predict_timeout),
    )
    .unwrap();
    let classifier = HybridClassifier::new(Arc::new(predictor), timeouts);
    Arc::new(ClassificationRunner::new(Arc::new(store.clone()), Arc::new(classifier)))
}

fn snapshot(visual: u64) -> TrackBehaviorCommand {
    TrackBehaviorCommand {
        session_id: BehaviorSessionId::new("s1").unwrap(),
        behavior: serde_json::from_value(json!({
            "modeUsage": { "visualLearning": { "count": visual, "totalTime": visual * 2000 } }
        }))
        .unwrap(),
    }
}

async fn seed(store: &InMemoryLearningStore, visual: u64) {
    let cmd = snapshot(visual);
    store
        .record_and_fold(&user(), &cmd.session_id, cmd.behavior, &DataQualityPolicy::default(), Timestamp::now())
        .await
        .unwrap();
}

// =============================================================================
// Hybrid classification over HTTP
// =============================================================================

#[tokio::test]
async fn healthy_service_prediction_is_stored() {
    let stub = start_stub(StubMode::Healthy).await;
    let store = InMemoryLearningStore::new();
    seed(&store, 30).await;

    let run = runner(&store, &stub.base_url).run(&user(), false).await.unwrap();

    assert_eq!(run.outcome.path, ClassifierPath::MlModel);
    assert_eq!(run.profile.classification().method, ClassificationMethod::MlPrediction);
    assert_eq!(run.profile.classification().model_version, "stub-2");
    assert_eq!(run.profile.dimensions().get(FslsmDimension::ActiveReflective), 6);
    assert_eq!(run.profile.dimensions().get(FslsmDimension::SensingIntuitive), -3);
    assert_eq!(run.profile.dominant_style(), "Active-Intuitive");
    assert_eq!(stub.predict_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn server_error_falls_back_to_rules() {
    let stub = start_stub(StubMode::ServerError).await;
    let store = InMemoryLearningStore::new();
    seed(&store, 30).await;

    let run = runner(&store, &stub.base_url).run(&user(), false).await.unwrap();

    assert_eq!(run.outcome.path, ClassifierPath::RuleBased);
    assert_eq!(
        run.profile.classification().fallback_reason.as_deref(),
        Some("prediction service returned status 500")
    );
    assert_eq!(stub.predict_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn slow_service_times_out_and_falls_back() {
    let stub = start_stub(StubMode::Slow(Duration::from_secs(3))).await;
    let store = InMemoryLearningStore::new();
    seed(&store, 30).await;

    let started = std::time::Instant::now();
    let run = runner(&store, &stub.base_url).run(&user(), false).await.unwrap();

    assert_eq!(run.outcome.path, ClassifierPath::RuleBased);
    assert!(run
        .profile
        .classification()
        .fallback_reason
        .as_deref()
        .unwrap_or_default()
        .contains("timed out"));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn unreachable_service_falls_back() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let store = InMemoryLearningStore::new();
    seed(&store, 30).await;

    let run = runner(&store, &base_url).run(&user(), false).await.unwrap();

    assert_eq!(run.outcome.path, ClassifierPath::RuleBased);
    assert!(run.profile.classification().fallback_reason.is_some());
}

// =============================================================================
// Tracking pipeline
// =============================================================================

#[tokio::test]
async fn fifty_tracking_calls_produce_one_prediction() {
    let stub = start_stub(StubMode::Healthy).await;
    let store = InMemoryLearningStore::new();
    let handler = TrackBehaviorHandler::new(
        Arc::new(store.clone()),
        runner(&store, &stub.base_url),
        TrackingPolicy {
            background_classification: false,
            ..TrackingPolicy::default()
        },
    );

    let mut triggered_at = Vec::new();
    for visual in 1..=50 {
        let result = handler
            .handle(snapshot(visual), CommandMetadata::new(user()))
            .await
            .unwrap();
        if result.classification_triggered {
            triggered_at.push(visual);
        }
    }

    assert_eq!(triggered_at, vec![50]);
    assert_eq!(stub.predict_calls.load(Ordering::SeqCst), 1);
    let profile = store.find_by_user(&user()).await.unwrap().unwrap();
    assert_eq!(profile.total_interactions(), 50);
    assert_eq!(profile.classification().prediction_count, 1);
    assert_eq!(profile.classification().method, ClassificationMethod::MlPrediction);
}

#[tokio::test]
async fn concurrent_first_writes_create_one_profile() {
    let store = InMemoryLearningStore::new();

    let writes = (0..16).map(|i| {
        let store = store.clone();
        async move {
            store
                .record_and_fold(
                    &user(),
                    &BehaviorSessionId::new(format!("s{}", i)).unwrap(),
                    serde_json::from_value(json!({
                        "modeUsage": { "visualLearning": { "count": 1, "totalTime": 100 } }
                    }))
                    .unwrap(),
                    &DataQualityPolicy::default(),
                    Timestamp::now(),
                )
                .await
        }
    });
    let results = futures::future::join_all(writes).await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(store.profile_count().await, 1);
    assert_eq!(store.session_count().await, 16);
    let profile = store.find_by_user(&user()).await.unwrap().unwrap();
    assert_eq!(profile.total_interactions(), 16);
    assert_eq!(profile.aggregated_stats().sessions_processed(), 16);
}
