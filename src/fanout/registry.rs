//! Session Registry
//!
//! Tracks all live client sessions and delivers published events to the
//! right subset of them. The registry is the only shared mutable state in
//! the fanout layer; its map is guarded by an RwLock held only while a
//! recipient snapshot is resolved, never across transport I/O.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use super::event::{Event, Target};
use super::messages::ServerMessage;

/// Unique identifier for a session, assigned at connect time.
/// Never reused for a different transport once the session closes.
pub type SessionId = String;

/// Identifier of an authenticated principal
pub type UserId = String;

/// Connection state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Transport handshake in flight, not yet registered as deliverable
    Connecting,
    /// Registered and eligible for event delivery
    Open,
    /// Terminal state; the session is removed from the map on entry
    Closed,
}

/// Server-side record of one live client connection.
///
/// Owned exclusively by the registry; handlers interact with it only
/// through the registry's operations.
pub struct Session {
    /// Unique identifier for this session's lifetime
    pub id: SessionId,
    /// Current connection state
    pub state: SessionState,
    /// Associated user, set by `associate` after the auth handshake
    pub user: Option<UserId>,
    /// When the session was registered
    pub created_at: DateTime<Utc>,
    /// Outbound queue feeding this session's transport forward task
    sender: mpsc::UnboundedSender<ServerMessage>,
}

/// Configuration for the session registry
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Maximum number of concurrent sessions
    pub max_sessions: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { max_sessions: 1000 }
    }
}

/// Process-wide table of live sessions plus a user → sessions index.
///
/// Constructed once at startup and injected into every request and
/// connection context via the shared application state. Cloning is cheap;
/// clones share the same underlying maps.
#[derive(Clone)]
pub struct SessionRegistry {
    /// Active sessions: SessionId → Session
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
    /// User associations: UserId → set of SessionIds
    users: Arc<RwLock<HashMap<UserId, HashSet<SessionId>>>>,
    /// Queue feeding the delivery worker; send order is publish order
    delivery_tx: mpsc::UnboundedSender<Event>,
    /// Configuration
    config: RegistryConfig,
}

impl SessionRegistry {
    /// Create a new, empty registry and start its delivery worker.
    ///
    /// Must be called from within a Tokio runtime: the worker draining the
    /// publish queue runs as a background task for the registry's lifetime.
    pub fn new(config: RegistryConfig) -> Self {
        let (delivery_tx, mut delivery_rx) = mpsc::unbounded_channel::<Event>();
        let registry = Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            users: Arc::new(RwLock::new(HashMap::new())),
            delivery_tx,
            config,
        };

        // Single worker draining published events in queue order. Each
        // per-session delivery is an unbounded enqueue, never a transport
        // write, so one event fully enqueues before the next is resolved
        // and sequential publishes reach any given session in sequence.
        let worker = registry.clone();
        tokio::spawn(async move {
            while let Some(event) = delivery_rx.recv().await {
                worker.deliver(&event).await;
            }
        });

        registry
    }

    /// Register a new client connection once its handshake has completed.
    ///
    /// Allocates a fresh session id and stores the session in state Open.
    /// Fails with `CapacityExceeded` when the registry already holds the
    /// configured maximum; the caller is expected to close the transport.
    pub async fn register(
        &self,
        sender: mpsc::UnboundedSender<ServerMessage>,
    ) -> Result<SessionId, RegistryError> {
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.config.max_sessions {
            return Err(RegistryError::CapacityExceeded(self.config.max_sessions));
        }

        let id = Uuid::new_v4().to_string();
        sessions.insert(
            id.clone(),
            Session {
                id: id.clone(),
                state: SessionState::Open,
                user: None,
                created_at: Utc::now(),
                sender,
            },
        );
        drop(sessions);

        tracing::info!(session_id = %id, "session registered");
        Ok(id)
    }

    /// Associate a session with an authenticated user.
    ///
    /// Fails with `UnknownSession` if the session closed concurrently; that
    /// race is expected and callers log it rather than propagating it.
    pub async fn associate(&self, id: &str, user_id: &str) -> Result<(), RegistryError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| RegistryError::UnknownSession(id.to_string()))?;
        let previous = session.user.replace(user_id.to_string());

        let mut users = self.users.write().await;
        if let Some(prev) = previous {
            if prev != user_id {
                if let Some(set) = users.get_mut(&prev) {
                    set.remove(id);
                    if set.is_empty() {
                        users.remove(&prev);
                    }
                }
            }
        }
        users
            .entry(user_id.to_string())
            .or_insert_with(HashSet::new)
            .insert(id.to_string());

        tracing::debug!(session_id = %id, user_id = %user_id, "session associated");
        Ok(())
    }

    /// Remove a session on transport-level disconnect.
    ///
    /// Idempotent: unregistering an id that is already gone is a no-op.
    pub async fn unregister(&self, id: &str) {
        let mut sessions = self.sessions.write().await;
        let Some(mut session) = sessions.remove(id) else {
            return;
        };
        session.state = SessionState::Closed;
        drop(sessions);

        if let Some(user) = &session.user {
            let mut users = self.users.write().await;
            if let Some(set) = users.get_mut(user) {
                set.remove(id);
                if set.is_empty() {
                    users.remove(user);
                }
            }
        }

        tracing::info!(session_id = %id, "session unregistered");
    }

    /// Publish an event without waiting for delivery.
    ///
    /// Hands the event to the delivery worker so request handlers are never
    /// delayed by slow or broken client transports. The queue preserves
    /// call order, so two sequential publishes from one caller reach any
    /// given session in that order. Publish never reports an error to the
    /// caller; worst case, no session receives the event.
    pub fn publish(&self, event: Event) {
        if self.delivery_tx.send(event).is_err() {
            // Only possible once the worker task's runtime is gone
            tracing::warn!("delivery worker stopped, event dropped");
        }
    }

    /// Resolve an event's target and deliver it to each recipient.
    ///
    /// This is the delivery worker's path; it is public so callers that
    /// need deterministic completion (tests, shutdown hooks) can await it
    /// directly. Returns the number of delivery attempts. The session map lock is
    /// released before any send; a send failure on one session triggers
    /// that session's `unregister` and does not affect the others.
    pub async fn deliver(&self, event: &Event) -> usize {
        let recipients = self.resolve_target(&event.target).await;
        let attempted = recipients.len();
        let message = event.to_message();

        let mut dead = Vec::new();
        for (id, sender) in recipients {
            if sender.send(message.clone()).is_err() {
                dead.push(id);
            }
        }

        for id in &dead {
            tracing::debug!(session_id = %id, topic = %event.topic, "delivery failed, pruning session");
            self.unregister(id).await;
        }

        if attempted > 0 {
            tracing::trace!(
                topic = %event.topic,
                attempted,
                failed = dead.len(),
                "event delivered"
            );
        }
        attempted
    }

    /// Snapshot the open sessions an event target resolves to
    async fn resolve_target(
        &self,
        target: &Target,
    ) -> Vec<(SessionId, mpsc::UnboundedSender<ServerMessage>)> {
        let sessions = self.sessions.read().await;
        match target {
            Target::All => sessions
                .values()
                .filter(|s| s.state == SessionState::Open)
                .map(|s| (s.id.clone(), s.sender.clone()))
                .collect(),
            Target::Sessions(ids) => ids
                .iter()
                .filter_map(|id| {
                    sessions
                        .get(id)
                        .filter(|s| s.state == SessionState::Open)
                        .map(|s| (s.id.clone(), s.sender.clone()))
                })
                .collect(),
            Target::Users(user_ids) => {
                let users = self.users.read().await;
                let mut out = Vec::new();
                for user_id in user_ids {
                    if let Some(session_ids) = users.get(user_id) {
                        for id in session_ids {
                            if let Some(session) = sessions.get(id) {
                                if session.state == SessionState::Open {
                                    out.push((session.id.clone(), session.sender.clone()));
                                }
                            }
                        }
                    }
                }
                out
            }
        }
    }

    /// Queue a message for one specific session.
    ///
    /// Used by the transport handler for handshake replies. A dead transport
    /// is pruned and reported as `UnknownSession`.
    pub async fn send_to(&self, id: &str, message: ServerMessage) -> Result<(), RegistryError> {
        let sender = {
            let sessions = self.sessions.read().await;
            sessions
                .get(id)
                .filter(|s| s.state == SessionState::Open)
                .map(|s| s.sender.clone())
                .ok_or_else(|| RegistryError::UnknownSession(id.to_string()))?
        };

        if sender.send(message).is_err() {
            self.unregister(id).await;
            return Err(RegistryError::UnknownSession(id.to_string()));
        }
        Ok(())
    }

    /// Number of currently open sessions, for operational diagnostics
    pub async fn open_session_count(&self) -> usize {
        self.sessions
            .read()
            .await
            .values()
            .filter(|s| s.state == SessionState::Open)
            .count()
    }

    /// Close every session and clear the registry.
    ///
    /// Dropping the senders ends each connection's forward task, which
    /// closes the underlying transport. Called once at process shutdown.
    pub async fn shutdown(&self) {
        let mut sessions = self.sessions.write().await;
        let count = sessions.len();
        for (_, mut session) in sessions.drain() {
            session.state = SessionState::Closed;
        }
        drop(sessions);

        self.users.write().await.clear();
        tracing::info!(closed = count, "session registry shut down");
    }
}

/// Errors that can occur in the session registry
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry is at its configured session ceiling; the connection
    /// must be rejected by the caller.
    #[error("session capacity exceeded (limit: {0})")]
    CapacityExceeded(usize),

    /// The referenced session is no longer present. Always recoverable;
    /// logged by callers and never surfaced to an end user.
    #[error("unknown session: {0}")]
    UnknownSession(String),
}
