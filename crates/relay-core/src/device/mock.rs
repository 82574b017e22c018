//! Recording mouse device for unit testing.
//!
//! # Why a recording device?
//!
//! [`EnigoMouse`](super::EnigoMouse) moves the real cursor on whatever
//! machine runs the tests, and it needs a desktop session to exist at all.
//! [`RecordingMouse`] replaces every OS call with an entry in a shared log so
//! test assertions can check exactly which calls were made and in what order.
//!
//! Clones share the same log, so a test can keep one handle while the
//! dispatcher owns another:
//!
//! ```rust
//! use mouse_relay_core::device::{MouseCall, RecordingMouse};
//! use mouse_relay_core::{Dispatcher, Event, EventKind, ScrollDivisor};
//!
//! let mouse = RecordingMouse::new();
//! let mut dispatcher = Dispatcher::new(mouse.clone(), ScrollDivisor::default());
//!
//! dispatcher.dispatch(&Event::new(EventKind::Click, 0.0, 0.0)).unwrap();
//!
//! assert_eq!(mouse.calls(), vec![MouseCall::ClickLeft]);
//! ```
//!
//! # Failure injection
//!
//! [`RecordingMouse::fail_next`] makes the next `n` calls fail with
//! [`DeviceError::Injection`]; [`RecordingMouse::always_failing`] builds a
//! device where every call fails.  Failed calls are counted but not logged.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::dispatch::{DeviceError, MouseControl};

/// One recorded device call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MouseCall {
    MoveRelative { dx: f64, dy: f64 },
    ClickLeft,
    ClickRight,
    Scroll { dx: f64, dy: f64 },
}

#[derive(Debug, Default)]
struct Recording {
    calls: Vec<MouseCall>,
    failures_left: usize,
    always_fail: bool,
    failed_attempts: usize,
}

/// A device that records calls instead of touching the OS.
#[derive(Debug, Clone, Default)]
pub struct RecordingMouse {
    state: Arc<Mutex<Recording>>,
}

impl RecordingMouse {
    /// Creates a device with an empty log that never fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a device on which every call fails.
    pub fn always_failing() -> Self {
        let mouse = Self::default();
        mouse.lock().always_fail = true;
        mouse
    }

    /// Makes the next `n` calls fail.
    pub fn fail_next(&self, n: usize) {
        self.lock().failures_left = n;
    }

    /// Returns a snapshot of the successful calls, oldest first.
    pub fn calls(&self) -> Vec<MouseCall> {
        self.lock().calls.clone()
    }

    /// Number of calls that were rejected by failure injection.
    pub fn failed_attempts(&self) -> usize {
        self.lock().failed_attempts
    }

    fn lock(&self) -> MutexGuard<'_, Recording> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: MouseCall) -> Result<(), DeviceError> {
        let mut state = self.lock();
        if state.always_fail || state.failures_left > 0 {
            state.failures_left = state.failures_left.saturating_sub(1);
            state.failed_attempts += 1;
            return Err(DeviceError::Injection("mock failure".into()));
        }
        state.calls.push(call);
        Ok(())
    }
}

impl MouseControl for RecordingMouse {
    fn move_relative(&mut self, dx: f64, dy: f64) -> Result<(), DeviceError> {
        self.record(MouseCall::MoveRelative { dx, dy })
    }

    fn click_left(&mut self) -> Result<(), DeviceError> {
        self.record(MouseCall::ClickLeft)
    }

    fn click_right(&mut self) -> Result<(), DeviceError> {
        self.record(MouseCall::ClickRight)
    }

    fn scroll(&mut self, dx: f64, dy: f64) -> Result<(), DeviceError> {
        self.record(MouseCall::Scroll { dx, dy })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
