//! Accounts Routes
//!
//! - GET /accounts/:user_id - List accounts across a user's linked items
//!
//! Account data lives with the out-of-scope persistence collaborator; this
//! route only exposes the read-side shape the clients consume.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::AccountsResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// GET /accounts/:user_id
pub async fn list_accounts(
    State(_state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<AccountsResponse>> {
    if user_id.is_empty() {
        return Err(ApiError::Validation("user_id cannot be empty".to_string()));
    }

    Ok(Json(AccountsResponse {
        user_id,
        accounts: Vec::new(),
    }))
}
