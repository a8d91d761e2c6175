use std::{sync::Arc, time::Instant};

use axum::{
    extract::Request,
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::app_state::AppState;

pub mod extract;
pub mod middleware;
pub mod response;
pub mod wallet_api;

use middleware::{trace_id_middleware, TraceId};

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .nest("/api/wallet", wallet_api::routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(from_fn(trace_id_middleware))
                .layer(from_fn(trace_log)),
        )
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn trace_log(req: Request, next: axum::middleware::Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let trace_id = req
        .extensions()
        .get::<TraceId>()
        .map(|t| t.0.clone())
        .unwrap_or_else(|| "-".to_string());
    let start = Instant::now();
    let resp = next.run(req).await;
    let status = resp.status();
    let elapsed_ms = start.elapsed().as_millis() as u64;
    tracing::info!(
        trace_id = %trace_id,
        method = %method,
        path = %path,
        status = status.as_u16(),
        elapsed_ms,
        "http_request"
    );
    resp
}
