//! Protocol module containing the event schema, the stdio frame codec, and
//! host reply messages.

pub mod event;
pub mod frame;
pub mod reply;

pub use event::{DecodeError, Event, EventKind};
pub use frame::{encode_frame, read_frame, write_frame, FrameError, LENGTH_PREFIX_LEN};
pub use reply::HostReply;
