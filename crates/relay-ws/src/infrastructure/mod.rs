//! Infrastructure layer for mouse-relay-ws.
//!
//! # Responsibilities
//!
//! - Binding a TCP listener per configured address
//! - Performing the WebSocket upgrade, including the origin check and timeout
//! - Reading frames and handing their payloads to the application layer
//! - Stopping when the shutdown future resolves

pub mod ws_server;

pub use ws_server::{bind, run_server, serve};
