//! OS mouse synthesis via the `enigo` crate.
//!
//! # Permissions
//!
//! Synthesizing input needs whatever the OS demands of the calling process:
//! an X11/Wayland session on Linux, the Accessibility permission on macOS.
//! When that is missing `Enigo::new` fails, and [`EnigoMouse::new`] reports
//! [`DeviceError::Unavailable`].  That is the only startup-fatal condition
//! for both relay binaries.
//!
//! # Fractional deltas
//!
//! Events carry floating-point deltas but `enigo` moves in whole pixels and
//! scrolls in whole wheel steps.  Each axis keeps a [`Residual`] so the
//! fractional part of one event carries into the next; twelve scroll events
//! of a fifth of a step each still produce two full steps.
//!
//! # Scroll direction
//!
//! [`MouseControl::scroll`] uses "positive dy scrolls up".  `enigo` uses
//! "positive length scrolls down" on the vertical axis, so the vertical step
//! count is negated on the way out.  The horizontal axis agrees (positive =
//! right) and passes through.

use enigo::{Axis, Button, Coordinate, Direction, Enigo, Mouse, Settings};
use tracing::{debug, info, warn};

use crate::dispatch::{DeviceError, MouseControl};

/// Platform-specific advice for a [`DeviceError::Unavailable`] failure.
pub fn permission_hint() -> Option<&'static str> {
    if cfg!(target_os = "macos") {
        Some("grant Accessibility permission in System Settings > Privacy & Security > Accessibility")
    } else if cfg!(target_os = "linux") {
        Some("a graphical session is required (X11, or Wayland with libei)")
    } else {
        None
    }
}

/// Accumulates fractional deltas and releases whole units.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Residual(f64);

impl Residual {
    /// Adds `delta` and returns the whole units now due, keeping the fraction.
    ///
    /// A non-finite total (an overflowing delta, or NaN) is dropped and the
    /// residual reset, so one bad event cannot poison the axis.
    fn take(&mut self, delta: f64) -> i32 {
        let total = self.0 + delta;
        if !total.is_finite() {
            warn!("dropping non-finite delta {delta}");
            self.0 = 0.0;
            return 0;
        }
        let whole = total.trunc();
        self.0 = total - whole;
        // `as` saturates at i32::MIN / i32::MAX.
        whole as i32
    }
}

/// The production mouse device.
pub struct EnigoMouse {
    enigo: Enigo,
    move_x: Residual,
    move_y: Residual,
    scroll_x: Residual,
    scroll_y: Residual,
}

impl EnigoMouse {
    /// Connects to the platform input API.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Unavailable`] if the platform refuses the
    /// connection (no display, no permission).
    pub fn new() -> Result<Self, DeviceError> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| DeviceError::Unavailable(e.to_string()))?;
        info!("mouse control connected");
        Ok(Self {
            enigo,
            move_x: Residual::default(),
            move_y: Residual::default(),
            scroll_x: Residual::default(),
            scroll_y: Residual::default(),
        })
    }

    fn click(&mut self, button: Button) -> Result<(), DeviceError> {
        self.enigo
            .button(button, Direction::Click)
            .map_err(|e| DeviceError::Injection(e.to_string()))
    }
}

impl MouseControl for EnigoMouse {
    fn move_relative(&mut self, dx: f64, dy: f64) -> Result<(), DeviceError> {
        let x = self.move_x.take(dx);
        let y = self.move_y.take(dy);
        if x == 0 && y == 0 {
            return Ok(());
        }
        self.enigo
            .move_mouse(x, y, Coordinate::Rel)
            .map_err(|e| DeviceError::Injection(e.to_string()))
    }

    fn click_left(&mut self) -> Result<(), DeviceError> {
        self.click(Button::Left)
    }

    fn click_right(&mut self) -> Result<(), DeviceError> {
        self.click(Button::Right)
    }

    fn scroll(&mut self, dx: f64, dy: f64) -> Result<(), DeviceError> {
        let x = self.scroll_x.take(dx);
        let y = self.scroll_y.take(dy);
        if x != 0 {
            self.enigo
                .scroll(x, Axis::Horizontal)
                .map_err(|e| DeviceError::Injection(e.to_string()))?;
        }
        if y != 0 {
            self.enigo
                .scroll(-y, Axis::Vertical)
                .map_err(|e| DeviceError::Injection(e.to_string()))?;
        }
        if x == 0 && y == 0 {
            debug!("scroll below one step; carried over");
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_deltas_pass_through() {
        let mut r = Residual::default();
        assert_eq!(r.take(3.0), 3);
        assert_eq!(r.take(-2.0), -2);
        assert_eq!(r, Residual(0.0));
    }

    #[test]
    fn test_fractions_accumulate_into_whole_steps() {
        // Arrange: 0.4 + 0.4 + 0.4 = 1.2 → one step, 0.2 carried
        let mut r = Residual::default();

        // Act
        let steps: Vec<i32> = (0..3).map(|_| r.take(0.4)).collect();

        // Assert
        assert_eq!(steps, vec![0, 0, 1]);
        assert!((r.0 - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_negative_fractions_truncate_toward_zero() {
        let mut r = Residual::default();
        assert_eq!(r.take(-1.5), -1);
        assert_eq!(r.take(-0.5), -1);
        assert!(r.0.abs() < 1e-9);
    }

    #[test]
    fn test_opposite_directions_cancel_residual() {
        let mut r = Residual::default();
        assert_eq!(r.take(0.75), 0);
        assert_eq!(r.take(-0.5), 0);
        assert!((r.0 - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_delta_is_dropped_and_axis_recovers() {
        // Arrange: a huge delta over a tiny divisor overflows to infinity
        let mut r = Residual::default();
        assert_eq!(r.take(0.5), 0);

        // Act
        let overflow = r.take(1e300 / 1e-300);
        let nan = r.take(f64::NAN);

        // Assert
        assert_eq!(overflow, 0);
        assert_eq!(nan, 0);
        assert_eq!(r, Residual(0.0));
        assert_eq!(r.take(1.0), 1, "later events still move the axis");
    }

    #[test]
    fn test_out_of_range_delta_saturates() {
        let mut r = Residual::default();
        assert_eq!(r.take(1e12), i32::MAX);
    }
}
