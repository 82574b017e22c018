//! # mouse-relay-core
//!
//! Shared library for Mouse Relay: the pieces both front ends need to turn a
//! browser gesture into an OS-level mouse action.
//!
//! Mouse Relay forwards pointer events from a browser extension to the native
//! mouse.  Two processes can receive those events:
//!
//! - **`mouse-relay-host`** – a native messaging host that talks to the
//!   browser over stdin/stdout using 4-byte little-endian length-prefixed
//!   JSON frames.
//! - **`mouse-relay-ws`** – a local WebSocket server; one JSON text frame per
//!   event.
//!
//! Both end in the same place: decode the JSON into an [`Event`], then let a
//! [`Dispatcher`] turn it into exactly one call on a [`MouseControl`] device.
//!
//! This crate defines:
//!
//! - **`protocol`** – the JSON event schema, the stdio frame codec, and the
//!   replies the stdio host sends back.
//! - **`dispatch`** – the four-way mapping from event type to device call,
//!   and the capability trait it calls into.
//! - **`device`** – the production `enigo` adapter and a recording fake.
//! - **`config`** – the optional TOML configuration file.

pub mod config;
pub mod device;
pub mod dispatch;
pub mod protocol;

pub use dispatch::{
    Ack, Action, DeviceError, DispatchError, Dispatcher, InvalidScrollDivisor, MouseControl,
    ScrollDivisor, DEFAULT_SCROLL_DIVISOR,
};
pub use protocol::event::{DecodeError, Event, EventKind};
pub use protocol::frame::{read_frame, write_frame, FrameError};
pub use protocol::reply::HostReply;
