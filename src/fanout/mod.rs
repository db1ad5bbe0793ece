//! Real-Time Event Fanout
//!
//! Bridges asynchronous backend events (webhook-driven item and link state
//! changes) to connected client sessions over a persistent WebSocket
//! channel.
//!
//! ## Architecture
//!
//! - **SessionRegistry**: owns all live sessions and resolves event targets
//! - **Handler**: WebSocket upgrade, handshake, and connection lifecycle
//! - **Event**: topic + payload + addressing mode (all / by user / by session)
//! - **Messages**: wire formats for the client and server sides
//!
//! ## Usage
//!
//! Clients connect to `/ws`, receive a `connected` greeting carrying their
//! session id, and may authenticate to receive user-targeted events:
//!
//! ```javascript
//! // Browser
//! const ws = new WebSocket('ws://localhost:5000/ws');
//!
//! ws.onopen = () => {
//!   ws.send(JSON.stringify({type: 'authenticate', user_id: 'user-42'}));
//! };
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   console.log('Received:', msg);
//! };
//! ```
//!
//! ## Delivery semantics
//!
//! At-most-once, best effort. There is no replay, acknowledgment, or
//! queuing for offline users; a client that misses an event while briefly
//! disconnected is expected to reconcile via the HTTP surface after
//! reconnecting.

mod event;
mod handler;
mod messages;
mod registry;

pub use event::{Event, Target};
pub use handler::channel_handler;
pub use messages::{ClientMessage, ServerMessage};
pub use registry::{
    RegistryConfig, RegistryError, Session, SessionId, SessionRegistry, SessionState, UserId,
};
