//! Domain layer for mouse-relay-ws.
//!
//! Plain configuration types.  No sockets, no file access: `main.rs` fills
//! these in from the CLI and the config file.

pub mod config;

pub use config::{loopback_addrs, OriginPolicy, RelayConfig, DEFAULT_HANDSHAKE_TIMEOUT};
