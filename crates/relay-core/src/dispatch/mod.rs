//! Event dispatch: maps a decoded [`Event`](crate::Event) to one mouse capability call.
//!
//! | type         | call                           |
//! |--------------|--------------------------------|
//! | `move`       | `move_relative(dx, dy)`        |
//! | `click`      | `click_left()`                 |
//! | `rightclick` | `click_right()`                |
//! | `scroll`     | `scroll(dx / D, -dy / D)`      |
//! | other        | nothing                        |
//!
//! `D` is the [`ScrollDivisor`]: how many touch pixels make one wheel step.
//! The vertical scroll axis is inverted so that dragging a finger up scrolls
//! the page the way a touch screen would.
//!
//! The device is owned by the [`Dispatcher`] and injected at construction, so
//! tests can hand it a recording fake instead of real hardware.

mod dispatcher;

pub use dispatcher::{
    Ack, Action, DispatchError, Dispatcher, InvalidScrollDivisor, ScrollDivisor, DEFAULT_SCROLL_DIVISOR,
};

use thiserror::Error;

/// Error type for the mouse capability.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The capability cannot be constructed (missing display server, missing
    /// accessibility permission, unsupported platform).
    #[error("mouse control unavailable: {0}")]
    Unavailable(String),

    /// The OS rejected a synthesized input event.
    #[error("input injection failed: {0}")]
    Injection(String),
}

/// OS-level mouse synthesis.
///
/// Scroll deltas are in wheel steps with positive `dy` meaning "scroll up"
/// and positive `dx` meaning "scroll right".  Implementations translate to
/// whatever convention the platform API uses.
#[cfg_attr(test, mockall::automock)]
pub trait MouseControl {
    /// Moves the pointer by `(dx, dy)` pixels from its current position.
    fn move_relative(&mut self, dx: f64, dy: f64) -> Result<(), DeviceError>;

    /// Presses and releases the left button.
    fn click_left(&mut self) -> Result<(), DeviceError>;

    /// Presses and releases the right button.
    fn click_right(&mut self) -> Result<(), DeviceError>;

    /// Scrolls by `(dx, dy)` wheel steps; fractional steps are allowed.
    fn scroll(&mut self, dx: f64, dy: f64) -> Result<(), DeviceError>;
}

impl<M: MouseControl + ?Sized> MouseControl for Box<M> {
    fn move_relative(&mut self, dx: f64, dy: f64) -> Result<(), DeviceError> {
        (**self).move_relative(dx, dy)
    }

    fn click_left(&mut self) -> Result<(), DeviceError> {
        (**self).click_left()
    }

    fn click_right(&mut self) -> Result<(), DeviceError> {
        (**self).click_right()
    }

    fn scroll(&mut self, dx: f64, dy: f64) -> Result<(), DeviceError> {
        (**self).scroll(dx, dy)
    }
}
