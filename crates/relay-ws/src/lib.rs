//! mouse-relay-ws library crate.
//!
//! The WebSocket variant of Mouse Relay.  A browser extension connects to
//! `ws://localhost:9999` (served on both `127.0.0.1` and `::1`) and sends one
//! JSON text frame per pointer event:
//!
//! ```text
//! {"type":"move","dx":12,"dy":-3}
//! {"type":"click"}
//! {"type":"scroll","dx":0,"dy":120}
//! ```
//!
//! Nothing is sent back; failures are logged and the next frame is handled.
//!
//! # Architecture
//!
//! ```text
//! Browser extension (JSON over WebSocket)
//!         ↕
//! [mouse-relay-ws]
//!   ├── domain/           RelayConfig, OriginPolicy
//!   ├── application/      payload → Event → Dispatcher
//!   └── infrastructure/
//!         └── ws_server/  accept loop and sessions (tokio-tungstenite)
//!         ↓
//! mouse-relay-core Dispatcher → EnigoMouse
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O.
//! - `application` depends on `domain` and `mouse-relay-core` only.
//! - `infrastructure` owns the listener and the WebSocket streams.

/// Domain layer: configuration and origin policy.
pub mod domain;

/// Application layer: per-message handling.
pub mod application;

/// Infrastructure layer: WebSocket server.
pub mod infrastructure;
