//! Minimal Chrome DevTools Protocol client
//!
//! Hand-rolled transport (WebSocket over TCP), a connection/session layer, and
//! serde types for the handful of commands the crate needs.

pub mod connection;
pub mod transport;
pub mod types;

pub use connection::{Connection, Session};
pub use transport::{launch_chrome, Transport};
