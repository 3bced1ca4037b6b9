//! HTTP router — wires every route together and adds request tracing.

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use tower::ServiceBuilder;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::items::routes::{ItemRouteState, item_routes};
use crate::store::Database;

/// Body of `GET /ping`.
pub const PING_MESSAGE: &str = "Server is started!!!";

async fn ping() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": PING_MESSAGE }))
}

/// Build the full application router over a database handle.
pub fn app(db: Arc<dyn Database>) -> Router {
    Router::new()
        .merge(item_routes(ItemRouteState { db }))
        .route("/ping", get(ping))
        .layer(
            ServiceBuilder::new().layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            ),
        )
}
