//! Webhook Routes
//!
//! - POST /webhook - Inbound aggregator notifications
//!
//! This is the producer side of the fanout layer: the aggregator tells us
//! something changed for a user's item, and we translate that into an
//! event targeted at that user's open sessions. Delivery is best-effort;
//! the aggregator gets a 200 either way and never retries on our behalf.

use axum::{extract::State, Json};
use serde_json::json;
use std::sync::Arc;

use crate::api::dto::{WebhookRequest, WebhookResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::fanout::Event;

/// POST /webhook
pub async fn receive_webhook(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WebhookRequest>,
) -> ApiResult<Json<WebhookResponse>> {
    validate_webhook(&req)?;

    let topic = webhook_topic(&req.webhook_type, &req.webhook_code);

    tracing::info!(
        webhook_type = %req.webhook_type,
        webhook_code = %req.webhook_code,
        user_id = %req.user_id,
        item_id = ?req.item_id,
        "webhook received"
    );

    state.registry.publish(Event::for_user(
        &req.user_id,
        topic,
        json!({
            "webhook_type": req.webhook_type,
            "webhook_code": req.webhook_code,
            "item_id": req.item_id,
            "error": req.error,
        }),
    ));

    Ok(Json(WebhookResponse {
        status: "ok".to_string(),
    }))
}

/// Validate a webhook notification
fn validate_webhook(req: &WebhookRequest) -> ApiResult<()> {
    if req.webhook_type.is_empty() {
        return Err(ApiError::Validation(
            "webhook_type cannot be empty".to_string(),
        ));
    }
    if req.webhook_code.is_empty() {
        return Err(ApiError::Validation(
            "webhook_code cannot be empty".to_string(),
        ));
    }
    if req.user_id.is_empty() {
        return Err(ApiError::Validation("user_id cannot be empty".to_string()));
    }
    Ok(())
}

/// Derive the channel topic from the webhook classification,
/// e.g. TRANSACTIONS / DEFAULT_UPDATE -> "transactions.default_update"
fn webhook_topic(webhook_type: &str, webhook_code: &str) -> String {
    format!(
        "{}.{}",
        webhook_type.to_lowercase(),
        webhook_code.to_lowercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(webhook_type: &str, webhook_code: &str, user_id: &str) -> WebhookRequest {
        WebhookRequest {
            webhook_type: webhook_type.to_string(),
            webhook_code: webhook_code.to_string(),
            user_id: user_id.to_string(),
            item_id: None,
            error: None,
        }
    }

    #[test]
    fn test_webhook_topic_lowercased() {
        assert_eq!(
            webhook_topic("TRANSACTIONS", "DEFAULT_UPDATE"),
            "transactions.default_update"
        );
        assert_eq!(webhook_topic("ITEM", "ERROR"), "item.error");
    }

    #[test]
    fn test_validate_webhook_valid() {
        assert!(validate_webhook(&request("ITEM", "ERROR", "user-1")).is_ok());
    }

    #[test]
    fn test_validate_webhook_missing_fields() {
        assert!(validate_webhook(&request("", "ERROR", "user-1")).is_err());
        assert!(validate_webhook(&request("ITEM", "", "user-1")).is_err());
        assert!(validate_webhook(&request("ITEM", "ERROR", "")).is_err());
    }
}
