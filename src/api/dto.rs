//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================
// USER DTOs
// ============================================

/// Create-user request
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Username for the new user
    pub username: String,
}

/// Create-user response
#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    /// Status: "ok"
    pub status: String,
    /// Identifier assigned to the user
    pub user_id: String,
}

// ============================================
// ITEM DTOs
// ============================================

/// Link-item request: ties a user to an institution via the aggregator
#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    /// User linking the item
    pub user_id: String,
    /// Institution the item belongs to
    pub institution_id: String,
    /// Short-lived token produced by the client link flow
    #[serde(default)]
    pub public_token: Option<String>,
}

/// Item response
#[derive(Debug, Serialize)]
pub struct ItemResponse {
    /// Status: "ok"
    pub status: String,
    /// Identifier assigned to the item
    pub item_id: String,
}

/// Item refresh request
#[derive(Debug, Deserialize)]
pub struct RefreshItemRequest {
    /// User whose sessions should hear about the refresh
    pub user_id: String,
}

/// Item refresh response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// Status: "ok"
    pub status: String,
    /// Item the refresh was requested for
    pub item_id: String,
}

// ============================================
// ACCOUNT DTOs
// ============================================

/// One account under a linked item
#[derive(Debug, Serialize)]
pub struct AccountDto {
    /// Aggregator-assigned account id
    pub account_id: String,
    /// Display name
    pub name: String,
    /// Account type (depository, credit, ...)
    #[serde(rename = "type")]
    pub account_type: String,
    /// Last digits of the account number
    pub mask: String,
}

/// Accounts listing for a user
#[derive(Debug, Serialize)]
pub struct AccountsResponse {
    /// User the accounts belong to
    pub user_id: String,
    /// Accounts across the user's linked items
    pub accounts: Vec<AccountDto>,
}

// ============================================
// INSTITUTION DTOs
// ============================================

/// One supported institution
#[derive(Debug, Clone, Serialize)]
pub struct InstitutionDto {
    /// Institution identifier
    pub institution_id: String,
    /// Display name
    pub name: String,
    /// Products available for linking
    pub products: Vec<String>,
}

/// Institutions listing
#[derive(Debug, Serialize)]
pub struct InstitutionsResponse {
    /// Supported institutions
    pub institutions: Vec<InstitutionDto>,
}

// ============================================
// SERVICE DTOs
// ============================================

/// Service status response
#[derive(Debug, Serialize)]
pub struct ServiceStatusResponse {
    /// Service name
    pub service: String,
    /// Crate version
    pub version: String,
    /// Seconds since startup
    pub uptime_seconds: u64,
    /// Currently open channel sessions
    pub open_sessions: usize,
}

// ============================================
// LINK EVENT DTOs
// ============================================

/// Link-flow telemetry event reported by a client
#[derive(Debug, Deserialize)]
pub struct LinkEventRequest {
    /// User going through the link flow
    pub user_id: String,
    /// Event type (OPEN, SUCCESS, EXIT, ERROR, ...)
    pub event_type: String,
    /// Link session this event belongs to
    #[serde(default)]
    pub link_session_id: Option<String>,
    /// Error code when event_type is ERROR
    #[serde(default)]
    pub error_code: Option<String>,
}

/// Link-event ack
#[derive(Debug, Serialize)]
pub struct LinkEventResponse {
    /// Status: "ok"
    pub status: String,
}

// ============================================
// WEBHOOK DTOs
// ============================================

/// Inbound aggregator webhook notification
#[derive(Debug, Deserialize)]
pub struct WebhookRequest {
    /// Webhook category (ITEM, TRANSACTIONS, ...)
    pub webhook_type: String,
    /// Webhook code within the category (DEFAULT_UPDATE, ERROR, ...)
    pub webhook_code: String,
    /// User whose sessions should be notified
    pub user_id: String,
    /// Item the notification concerns
    #[serde(default)]
    pub item_id: Option<String>,
    /// Error details for error webhooks
    #[serde(default)]
    pub error: Option<Value>,
}

/// Webhook ack
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    /// Status: "ok"
    pub status: String,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: "healthy"
    pub status: String,
    /// Seconds since startup
    pub uptime_seconds: u64,
    /// Crate version
    pub version: String,
    /// Currently open channel sessions
    pub open_sessions: usize,
}
