//! Application layer for the native messaging host.
//!
//! - **`host_service`** – the startup handshake (`ready` or `error` + drain)
//!   and the per-frame decode → dispatch → report loop.  It works against any
//!   `Read`/`Write` pair and any `MouseControl` device injected by the caller.

pub mod host_service;

pub use host_service::{
    run_host, unavailable_message, HostError, HostExit, NativeHost, ServeSummary,
};
