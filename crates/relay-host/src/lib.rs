//! mouse-relay-host library crate.
//!
//! The native messaging host is the stdio variant of Mouse Relay.  The
//! browser starts it as a child process and talks to it over stdin/stdout
//! with 4-byte little-endian length-prefixed JSON frames.
//!
//! # Session shape
//!
//! ```text
//! browser                                host
//! ───────                                ────
//!                                        {"status":"ready"}   (or {"error":...})
//! {"event":{"type":"move","dx":4}}   →   move_relative(4, 0)
//! {"event":{"type":"click"}}         →   click_left()
//!                                    ←   {"error":"..."}      (only on failure)
//! <stdin closed>                         exit 0
//! ```
//!
//! The loop itself lives in [`application::host_service`] and is generic over
//! `Read`/`Write`, so tests drive it with in-memory buffers.  `main.rs` only
//! parses arguments, sets up logging, and hands it the real stdio handles.

/// Application layer: the startup handshake and the frame loop.
pub mod application;
