//! # LedgerLink
//!
//! Account-linking server with a real-time session registry and event
//! fanout over WebSocket.
//!
//! Request handlers and the aggregator webhook publish events without
//! knowing which clients care; the registry resolves each event's target
//! (all sessions, by user, or by session) against the set of currently
//! connected sessions and delivers it best-effort, at most once.
//!
//! ## Modules
//!
//! - [`fanout`]: Session registry, event model, and channel handler
//! - [`api`]: HTTP composition layer built with Axum
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ledgerlink::api::{serve, AppState, ServerConfig};
//! use ledgerlink::fanout::{RegistryConfig, SessionRegistry};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Arc::new(SessionRegistry::new(RegistryConfig::default()));
//!     let config = ServerConfig::default();
//!
//!     let state = AppState::new(Arc::clone(&registry), config.clone());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod fanout;

// Re-export top-level types for convenience
pub use api::{build_router, serve, ApiError, AppState, ServerConfig};

pub use fanout::{
    channel_handler, ClientMessage, Event, RegistryConfig, RegistryError, ServerMessage, Session,
    SessionId, SessionRegistry, SessionState, Target, UserId,
};

pub use config::{Config, ConfigError, FanoutSection, LoggingConfig, ServerSection};
