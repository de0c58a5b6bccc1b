//! HTTP surface of the inference service.
//!
//! - `GET /` - current model status
//! - `POST /predict` - classify the form field `text`
//! - `GET /metrics` - Prometheus text exposition

pub mod metrics;

pub use metrics::ServiceMetrics;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::core::SentimentError;
use crate::pipelines::SentimentAnalysisPipeline;

const HOME_PATH: &str = "/";
const PREDICT_PATH: &str = "/predict";
const METRICS_PATH: &str = "/metrics";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid listen address `{address}`: {source}")]
    InvalidListenAddr {
        address: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("axum server error: {source}")]
    Serve {
        #[source]
        source: std::io::Error,
    },
}

/// Shared, read-only service context handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<SentimentAnalysisPipeline>,
    pub metrics: Arc<ServiceMetrics>,
}

impl AppState {
    pub fn new(pipeline: SentimentAnalysisPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            metrics: Arc::new(ServiceMetrics::new()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct StatusResponse {
    pub model_status: String,
}

#[derive(Debug, Deserialize)]
pub struct PredictForm {
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PredictResponse {
    pub result: Option<u8>,
    pub model_status: String,
    pub error: Option<String>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(HOME_PATH, get(home))
        .route(PREDICT_PATH, post(predict))
        .route(METRICS_PATH, get(metrics_text))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(listen_addr: &str, state: AppState) -> Result<(), ServerError> {
    let addr: SocketAddr = listen_addr
        .trim()
        .parse()
        .map_err(|source| ServerError::InvalidListenAddr {
            address: listen_addr.to_string(),
            source,
        })?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind {
            address: addr.to_string(),
            source,
        })?;
    tracing::info!(%addr, status = %state.pipeline.status(), "inference service listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|source| ServerError::Serve { source })?;

    tracing::info!("server shutdown complete");
    Ok(())
}

async fn home(State(state): State<AppState>) -> Json<StatusResponse> {
    state.metrics.record_request("GET", HOME_PATH);
    let start = Instant::now();

    let response = Json(StatusResponse {
        model_status: state.pipeline.status().to_string(),
    });
    state.metrics.observe_latency(HOME_PATH, start.elapsed());
    response
}

async fn predict(
    State(state): State<AppState>,
    form: Result<Form<PredictForm>, FormRejection>,
) -> (StatusCode, Json<PredictResponse>) {
    state.metrics.record_request("POST", PREDICT_PATH);
    let start = Instant::now();

    let text = form.ok().and_then(|Form(form)| form.text);
    let response = match state.pipeline.classify(text.as_deref()) {
        Ok(prediction) => {
            state.metrics.record_prediction(prediction.label.as_str());
            (
                StatusCode::OK,
                Json(PredictResponse {
                    result: Some(prediction.label.as_u8()),
                    model_status: prediction.model_kind.to_string(),
                    error: None,
                }),
            )
        }
        Err(e) => {
            tracing::warn!(kind = e.kind(), error = %e, "prediction request failed");
            (
                status_for(&e),
                Json(PredictResponse {
                    result: None,
                    model_status: state.pipeline.status().to_string(),
                    error: Some(e.to_string()),
                }),
            )
        }
    };

    state.metrics.observe_latency(PREDICT_PATH, start.elapsed());
    response
}

async fn metrics_text(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, metrics::CONTENT_TYPE)],
        state.metrics.render(),
    )
}

fn status_for(error: &SentimentError) -> StatusCode {
    match error {
        SentimentError::MissingField(_) => StatusCode::BAD_REQUEST,
        SentimentError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(%error, "failed to capture Ctrl+C signal");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "failed to capture SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
