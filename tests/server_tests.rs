// HTTP route tests for the inference service

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use http_body_util::BodyExt;
use sentiment_ops::server::{build_router, AppState, PredictResponse, StatusResponse};
use sentiment_ops::SentimentAnalysisPipeline;
use tower::ServiceExt;

const FORM: &str = "application/x-www-form-urlencoded";

fn fallback_state() -> AppState {
    AppState::new(SentimentAnalysisPipeline::fallback().expect("fallback pipeline"))
}

async fn send(state: &AppState, request: Request<Body>) -> Response {
    build_router(state.clone())
        .oneshot(request)
        .await
        .expect("router is infallible")
}

fn predict_request(body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, FORM)
        .body(Body::from(body))
        .expect("valid request")
}

async fn json<T: serde::de::DeserializeOwned>(response: Response) -> anyhow::Result<T> {
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn home_reports_model_status() -> anyhow::Result<()> {
    let state = fallback_state();
    let response = send(&state, Request::get("/").body(Body::empty())?).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: StatusResponse = json(response).await?;
    assert_eq!(
        body.model_status,
        "Using Fallback Keyword Model (registered model not found)"
    );
    assert_eq!(state.metrics.request_count("GET", "/"), 1);
    assert_eq!(state.metrics.latency_count("/"), 1);
    Ok(())
}

#[tokio::test]
async fn predict_end_to_end_updates_metrics_once() -> anyhow::Result<()> {
    let state = fallback_state();
    let response = send(
        &state,
        predict_request("text=I+love+this+product%2C+it%27s+amazing%21"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: PredictResponse = json(response).await?;
    assert_eq!(
        body,
        PredictResponse {
            result: Some(1),
            model_status: "Fallback Keyword Model".to_string(),
            error: None,
        }
    );

    assert_eq!(state.metrics.request_count("POST", "/predict"), 1);
    assert_eq!(state.metrics.latency_count("/predict"), 1);
    assert_eq!(state.metrics.prediction_count("1"), 1);
    assert_eq!(state.metrics.prediction_count("0"), 0);
    Ok(())
}

#[tokio::test]
async fn predict_without_text_is_bad_request() -> anyhow::Result<()> {
    let state = fallback_state();

    let response = send(&state, predict_request("other=value")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: PredictResponse = json(response).await?;
    assert_eq!(body.result, None);
    assert!(body.error.unwrap_or_default().contains("text"));

    let no_form = Request::post("/predict").body(Body::empty())?;
    let response = send(&state, no_form).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // latency is recorded on error paths too, predictions are not
    assert_eq!(state.metrics.request_count("POST", "/predict"), 2);
    assert_eq!(state.metrics.latency_count("/predict"), 2);
    assert_eq!(state.metrics.prediction_count("0"), 0);
    assert_eq!(state.metrics.prediction_count("1"), 0);
    Ok(())
}

#[tokio::test]
async fn unavailable_service_returns_503() -> anyhow::Result<()> {
    let state = AppState::new(SentimentAnalysisPipeline::from_parts(None, None));
    let response = send(&state, predict_request("text=great")).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: PredictResponse = json(response).await?;
    assert_eq!(body.result, None);
    assert_eq!(body.model_status, "Not Available");
    assert!(body.error.is_some());
    Ok(())
}

#[tokio::test]
async fn metrics_endpoint_exposes_all_families() -> anyhow::Result<()> {
    let state = fallback_state();
    send(&state, predict_request("text=awful+and+terrible")).await;

    let response = send(&state, Request::get("/metrics").body(Body::empty())?).await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"));

    let bytes = response.into_body().collect().await?.to_bytes();
    let text = String::from_utf8(bytes.to_vec())?;
    assert!(text.contains("app_request_count_total{method=\"POST\",endpoint=\"/predict\"} 1"));
    assert!(text.contains("app_request_latency_seconds_count{endpoint=\"/predict\"} 1"));
    assert!(text.contains("model_prediction_count_total{prediction=\"0\"} 1"));
    Ok(())
}
