//! REST endpoints for to-do items under `/v1/items`.
//!
//! Every handler answers `200` with a `{"data": ...}` envelope on success and
//! `400` with `{"error": ...}` on any failure, see [`ApiError`].

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{debug, info};

use super::model::{TodoItem, TodoItemCreation, TodoItemUpdate};
use crate::common::{Paging, SuccessResponse};
use crate::error::{ApiError, RequestError};
use crate::store::Database;

/// Shared state for item routes.
#[derive(Clone)]
pub struct ItemRouteState {
    pub db: Arc<dyn Database>,
}

type ApiResult<T> = Result<Json<SuccessResponse<T>>, ApiError>;

/// Parse the `{id}` path segment as an integer.
fn parse_id(raw: &str) -> Result<i64, RequestError> {
    raw.parse::<i64>().map_err(|e| RequestError::InvalidId {
        raw: raw.to_string(),
        reason: e.to_string(),
    })
}

/// POST /v1/items
///
/// Responds with the new item's id.
async fn create_item(
    State(state): State<ItemRouteState>,
    payload: Result<Json<TodoItemCreation>, JsonRejection>,
) -> ApiResult<i64> {
    let Json(data) = payload.map_err(RequestError::from)?;
    let id = state.db.create_item(&data).await?;
    info!(id, "Item created");
    Ok(Json(SuccessResponse::simple(id)))
}

/// GET /v1/items?page=&limit=
///
/// Lists items that are not soft-deleted, newest id first. The count and the
/// page are two separate queries and may disagree under concurrent writes.
async fn list_items(
    State(state): State<ItemRouteState>,
    query: Result<Query<Paging>, QueryRejection>,
) -> ApiResult<Vec<TodoItem>> {
    let Query(mut paging) = query.map_err(RequestError::from)?;
    paging.process();

    paging.total = state.db.count_items().await?;
    let items = state.db.list_items(paging.offset(), paging.limit).await?;
    debug!(
        page = paging.page,
        limit = paging.limit,
        total = paging.total,
        returned = items.len(),
        "Items listed"
    );
    Ok(Json(SuccessResponse::paged(items, paging)))
}

/// GET /v1/items/{id}
///
/// Soft-deleted items are still returned here.
async fn get_item(
    State(state): State<ItemRouteState>,
    Path(id): Path<String>,
) -> ApiResult<TodoItem> {
    let id = parse_id(&id)?;
    let item = state.db.get_item(id).await?;
    Ok(Json(SuccessResponse::simple(item)))
}

/// PATCH /v1/items/{id}
///
/// Writes only the fields present in the body. An id that matches no row is
/// still reported as success.
async fn update_item(
    State(state): State<ItemRouteState>,
    Path(id): Path<String>,
    payload: Result<Json<TodoItemUpdate>, JsonRejection>,
) -> ApiResult<bool> {
    let id = parse_id(&id)?;
    let Json(update) = payload.map_err(RequestError::from)?;
    let affected = state.db.update_item(id, &update).await?;
    info!(id, affected, "Item updated");
    Ok(Json(SuccessResponse::simple(true)))
}

/// DELETE /v1/items/{id}
///
/// Soft delete: the row stays, with status `Deleted`.
async fn delete_item(
    State(state): State<ItemRouteState>,
    Path(id): Path<String>,
) -> ApiResult<bool> {
    let id = parse_id(&id)?;
    let affected = state.db.soft_delete_item(id).await?;
    info!(id, affected, "Item deleted");
    Ok(Json(SuccessResponse::simple(true)))
}

/// Build the item REST routes.
pub fn item_routes(state: ItemRouteState) -> Router {
    Router::new()
        .route("/v1/items", post(create_item).get(list_items))
        .route(
            "/v1/items/{id}",
            get(get_item).patch(update_item).delete(delete_item),
        )
        .with_state(state)
}
