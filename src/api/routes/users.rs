//! Users Routes
//!
//! - POST /users - Create a user

use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::dto::{CreateUserRequest, CreateUserResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::fanout::Event;

/// POST /users
///
/// Create a user record with the out-of-scope persistence collaborator and
/// announce it on the channel.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<CreateUserResponse>)> {
    validate_username(&req.username)?;

    let user_id = Uuid::new_v4().to_string();

    state.registry.publish(Event::broadcast(
        "users.created",
        json!({
            "user_id": user_id,
            "username": req.username,
        }),
    ));

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            status: "ok".to_string(),
            user_id,
        }),
    ))
}

/// Validate a username
fn validate_username(username: &str) -> ApiResult<()> {
    if username.is_empty() {
        return Err(ApiError::Validation("Username cannot be empty".to_string()));
    }
    if username.len() > 64 {
        return Err(ApiError::Validation(
            "Username exceeds maximum length of 64 characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username_valid() {
        assert!(validate_username("alice").is_ok());
    }

    #[test]
    fn test_validate_username_empty() {
        assert!(validate_username("").is_err());
    }

    #[test]
    fn test_validate_username_too_long() {
        assert!(validate_username(&"a".repeat(65)).is_err());
    }
}
