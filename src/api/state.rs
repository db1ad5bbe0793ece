//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.
//!
//! The session registry is constructed once at startup and injected here
//! explicitly; handlers reach it through the extracted state rather than a
//! module-level global or a per-request side channel.

use crate::fanout::SessionRegistry;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Session registry for real-time event fanout
    pub registry: Arc<SessionRegistry>,
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState around an already-constructed registry
    pub fn new(registry: Arc<SessionRegistry>, config: ServerConfig) -> Self {
        Self {
            registry,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Get the count of currently open sessions
    pub async fn open_sessions(&self) -> usize {
        self.registry.open_session_count().await
    }
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl ServerConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fanout::RegistryConfig;

    #[test]
    fn test_addr_format() {
        let config = ServerConfig::new("127.0.0.1", 5000);
        assert_eq!(config.addr(), "127.0.0.1:5000");
    }

    #[tokio::test]
    async fn test_open_sessions_starts_at_zero() {
        let registry = Arc::new(SessionRegistry::new(RegistryConfig::default()));
        let state = AppState::new(registry, ServerConfig::default());
        assert_eq!(state.open_sessions().await, 0);
    }
}
