//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::state::AppState;

/// Fixed prefix on the `detail` message of every failed prediction.
pub const PREDICTION_ERROR_PREFIX: &str = "Prediction error";

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors_enabled = state.config.cors_enabled;
    let logging = state.config.logging;

    let mut router = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/info", get(info))
        .route("/predict-sentiment/", post(predict_sentiment))
        .with_state(state);

    if cors_enabled {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }
    if logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
}

/// Root response
#[derive(Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub status: &'static str,
}

/// Root endpoint with welcome message
async fn root() -> impl IntoResponse {
    Json(RootResponse {
        message: "Welcome to the sentiment analysis API",
        status: "active",
    })
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub model_status: &'static str,
}

/// Health check endpoint; `model_status` mirrors the service lifecycle.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let model_status = if state.service.is_loaded() {
        "healthy"
    } else {
        "unhealthy"
    };

    Json(HealthResponse {
        status: "healthy",
        service: "sentiment-analysis-api",
        model_status,
    })
}

/// Static API descriptor
async fn info() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "Sentiment Analysis API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Binary sentiment classification over HTTP",
        "endpoints": [
            "GET / - Welcome message",
            "GET /health - Service health check",
            "GET /info - API information",
            "POST /predict-sentiment/ - Predict text sentiment (0=negative, 4=positive)",
        ],
    }))
}

/// Prediction request schema
#[derive(Debug, Deserialize)]
pub struct SentimentRequest {
    /// Text to classify; required, must be a string.
    pub text: String,
}

/// Prediction response schema
#[derive(Debug, Serialize)]
pub struct SentimentResponse {
    /// Echo of the request text.
    pub text: String,
    /// External label string ("0" = negative, "4" = positive).
    pub sentiment: String,
    /// Raw positive-class probability in [0, 1].
    pub confidence: f32,
}

/// Predict the sentiment of a text.
///
/// Malformed bodies (invalid JSON, missing or ill-typed `text`) map the
/// extractor rejection to 422; service failures map to 500 with a
/// `detail` message.
async fn predict_sentiment(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SentimentRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({"detail": rejection.body_text()})),
            )
                .into_response();
        },
    };

    // First request pays the artifact-loading latency; keep that and the
    // forward pass off the async workers.
    let text = request.text.clone();
    let task_state = Arc::clone(&state);
    let outcome = tokio::task::spawn_blocking(move || task_state.service.predict(&text)).await;

    let result = match outcome {
        Ok(result) => result,
        Err(join_error) => {
            return prediction_error(&join_error.to_string());
        },
    };

    match result {
        Ok(prediction) => (
            StatusCode::OK,
            Json(SentimentResponse {
                text: request.text,
                sentiment: prediction.label,
                confidence: prediction.confidence,
            }),
        )
            .into_response(),
        Err(e) => prediction_error(&e.to_string()),
    }
}

fn prediction_error(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({
            "detail": format!("{PREDICTION_ERROR_PREFIX}: {message}")
        })),
    )
        .into_response()
}
