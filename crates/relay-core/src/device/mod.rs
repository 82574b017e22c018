//! [`MouseControl`](crate::MouseControl) implementations.
//!
//! - **`enigo_mouse`** – the production device.  `enigo` picks the OS backend
//!   at compile time (`SendInput` on Windows, XTest/libei on Linux,
//!   `CGEvent` on macOS).
//! - **`mock`** – an in-memory recorder for tests.

pub mod enigo_mouse;
pub mod mock;

pub use enigo_mouse::{permission_hint, EnigoMouse};
pub use mock::{MouseCall, RecordingMouse};
