//! LedgerLink HTTP API
//!
//! HTTP composition layer, built with Axum.
//!
//! # Endpoints
//!
//! ## Resources
//! - `POST /users` - Create a user
//! - `POST /items` - Link a new item
//! - `POST /items/:item_id/refresh` - Request an item refresh
//! - `GET /accounts/:user_id` - List a user's accounts
//! - `GET /institutions` - List supported institutions
//! - `GET /institutions/:institution_id` - Get one institution
//! - `GET /services/status` - Service info
//! - `POST /link-events` - Record a link-flow event
//!
//! ## Fanout
//! - `POST /webhook` - Inbound aggregator notifications
//! - `GET /ws` - Persistent channel connection
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! Anything else falls through to a JSON 404.

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{AppState, ServerConfig};

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::fanout::channel_handler;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .route("/users", post(routes::users::create_user))
        .route("/items", post(routes::items::create_item))
        .route("/items/:item_id/refresh", post(routes::items::refresh_item))
        .route("/accounts/:user_id", get(routes::accounts::list_accounts))
        .route("/institutions", get(routes::institutions::list_institutions))
        .route(
            "/institutions/:institution_id",
            get(routes::institutions::get_institution),
        )
        .route("/services/status", get(routes::services::status))
        .route("/link-events", post(routes::link_events::record_link_event))
        .route("/webhook", post(routes::webhook::receive_webhook))
        .route("/ws", get(channel_handler))
        .nest("/health", health_routes)
        .fallback(unhandled)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()) // Configure properly in production
        .with_state(shared_state)
}

/// Catch-all for unmatched routes
async fn unhandled() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": {
                "code": "NOT_FOUND",
                "message": "Route not found",
            }
        })),
    )
}

/// Start the API server
///
/// Serves until a shutdown signal arrives, then closes every channel
/// session before returning.
pub async fn serve(state: AppState, config: &ServerConfig) -> Result<(), ApiError> {
    let registry = Arc::clone(&state.registry);
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("LedgerLink API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    registry.shutdown().await;

    tracing::info!("LedgerLink API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fanout::{RegistryConfig, SessionRegistry};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> (Router, Arc<SessionRegistry>) {
        let registry = Arc::new(SessionRegistry::new(RegistryConfig::default()));
        let state = AppState::new(Arc::clone(&registry), ServerConfig::default());
        (build_router(state), registry)
    }

    #[tokio::test]
    async fn test_health_live() {
        let (app, _registry) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/live")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_full() {
        let (app, _registry) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unhandled_route_returns_json_404() {
        let (app, _registry) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/no/such/route")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_user() {
        let (app, _registry) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/users")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"username": "alice"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_create_user_invalid_json() {
        let (app, _registry) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/users")
                    .header("Content-Type", "application/json")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_item() {
        let (app, _registry) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/items")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        r#"{"user_id": "user-1", "institution_id": "ins_1"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_refresh_item() {
        let (app, _registry) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/items/item-1/refresh")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"user_id": "user-1"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_refresh_item_missing_user() {
        let (app, _registry) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/items/item-1/refresh")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        // Field is required by the DTO, so axum rejects before the handler
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_list_institutions() {
        let (app, _registry) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/institutions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_unknown_institution() {
        let (app, _registry) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/institutions/ins_999")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_webhook_accepted() {
        let (app, _registry) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/webhook")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        r#"{"webhook_type": "TRANSACTIONS", "webhook_code": "DEFAULT_UPDATE", "user_id": "user-1", "item_id": "item-1"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_webhook_missing_user_rejected() {
        let (app, _registry) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/webhook")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        r#"{"webhook_type": "ITEM", "webhook_code": "ERROR", "user_id": ""}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_link_event_recorded() {
        let (app, _registry) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/link-events")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        r#"{"user_id": "user-1", "event_type": "SUCCESS"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_accounts_listing() {
        let (app, _registry) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/accounts/user-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
