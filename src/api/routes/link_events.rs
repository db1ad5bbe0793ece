//! Link Events Routes
//!
//! - POST /link-events - Record a link-flow telemetry event
//!
//! Clients report progress through the account-linking flow here. The
//! event is mirrored to the user's other connected sessions so open
//! dashboards update as the flow advances.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;
use std::sync::Arc;

use crate::api::dto::{LinkEventRequest, LinkEventResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::fanout::Event;

/// POST /link-events
pub async fn record_link_event(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LinkEventRequest>,
) -> ApiResult<(StatusCode, Json<LinkEventResponse>)> {
    validate_link_event(&req)?;

    tracing::info!(
        user_id = %req.user_id,
        event_type = %req.event_type,
        link_session_id = ?req.link_session_id,
        "link event recorded"
    );

    state.registry.publish(Event::for_user(
        &req.user_id,
        "link.event",
        json!({
            "event_type": req.event_type,
            "link_session_id": req.link_session_id,
            "error_code": req.error_code,
        }),
    ));

    Ok((
        StatusCode::CREATED,
        Json(LinkEventResponse {
            status: "ok".to_string(),
        }),
    ))
}

/// Validate a link-event request
fn validate_link_event(req: &LinkEventRequest) -> ApiResult<()> {
    if req.user_id.is_empty() {
        return Err(ApiError::Validation("user_id cannot be empty".to_string()));
    }
    if req.event_type.is_empty() {
        return Err(ApiError::Validation(
            "event_type cannot be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(user_id: &str, event_type: &str) -> LinkEventRequest {
        LinkEventRequest {
            user_id: user_id.to_string(),
            event_type: event_type.to_string(),
            link_session_id: None,
            error_code: None,
        }
    }

    #[test]
    fn test_validate_link_event_valid() {
        assert!(validate_link_event(&request("user-1", "SUCCESS")).is_ok());
    }

    #[test]
    fn test_validate_link_event_missing_user() {
        assert!(validate_link_event(&request("", "SUCCESS")).is_err());
    }

    #[test]
    fn test_validate_link_event_missing_type() {
        assert!(validate_link_event(&request("user-1", "")).is_err());
    }
}
