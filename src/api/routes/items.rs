//! Items Routes
//!
//! Endpoints for aggregator items (one item per user-institution link).
//!
//! - POST /items - Link a new item
//! - POST /items/:item_id/refresh - Request a data refresh for an item

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::dto::{CreateItemRequest, ItemResponse, RefreshItemRequest, RefreshResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::fanout::Event;

/// POST /items
///
/// Exchange the client's link result for a new item and notify the user's
/// connected sessions. Token exchange with the aggregator is handled by
/// the out-of-scope API client collaborator.
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateItemRequest>,
) -> ApiResult<(StatusCode, Json<ItemResponse>)> {
    if req.user_id.is_empty() {
        return Err(ApiError::Validation("user_id cannot be empty".to_string()));
    }
    if req.institution_id.is_empty() {
        return Err(ApiError::Validation(
            "institution_id cannot be empty".to_string(),
        ));
    }

    let item_id = Uuid::new_v4().to_string();

    tracing::info!(
        user_id = %req.user_id,
        institution_id = %req.institution_id,
        has_public_token = req.public_token.is_some(),
        item_id = %item_id,
        "item linked"
    );

    state.registry.publish(Event::for_user(
        &req.user_id,
        "items.linked",
        json!({
            "item_id": item_id,
            "institution_id": req.institution_id,
        }),
    ));

    Ok((
        StatusCode::CREATED,
        Json(ItemResponse {
            status: "ok".to_string(),
            item_id,
        }),
    ))
}

/// POST /items/:item_id/refresh
///
/// Ask the aggregator collaborator to refresh an item's data. The eventual
/// result arrives asynchronously through the webhook route; here we only
/// confirm the request and tell the user's sessions it is in flight.
pub async fn refresh_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<String>,
    Json(req): Json<RefreshItemRequest>,
) -> ApiResult<(StatusCode, Json<RefreshResponse>)> {
    if req.user_id.is_empty() {
        return Err(ApiError::Validation("user_id cannot be empty".to_string()));
    }

    state.registry.publish(Event::for_user(
        &req.user_id,
        "items.refresh_requested",
        json!({ "item_id": item_id }),
    ));

    Ok((
        StatusCode::ACCEPTED,
        Json(RefreshResponse {
            status: "ok".to_string(),
            item_id,
        }),
    ))
}
