//! API Route Handlers
//!
//! Each module handles one resource area, mirroring the routers the
//! server mounts at the root.

pub mod accounts;
pub mod health;
pub mod institutions;
pub mod items;
pub mod link_events;
pub mod services;
pub mod users;
pub mod webhook;
