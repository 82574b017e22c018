//! Application layer for mouse-relay-ws.
//!
//! Turns one WebSocket payload into at most one device call.  It knows
//! nothing about sockets; the infrastructure layer hands it bytes.

pub mod relay_service;

pub use relay_service::{handle_payload, RelayError};
