//! The [`Dispatcher`]: one event in, at most one device call out.

use thiserror::Error;
use tracing::{debug, trace};

use super::{DeviceError, MouseControl};
use crate::protocol::event::{Event, EventKind};

/// Touch pixels per wheel step when nothing else is configured.
pub const DEFAULT_SCROLL_DIVISOR: f64 = 60.0;

/// Raised when a scroll divisor is zero, negative, or not finite.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
#[error("scroll divisor must be a finite number greater than zero, got {0}")]
pub struct InvalidScrollDivisor(pub f64);

/// How many touch pixels make one wheel step.
///
/// Larger values give coarser, slower scrolling; smaller values give finer,
/// faster scrolling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollDivisor(f64);

impl ScrollDivisor {
    /// Validates and wraps a divisor.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidScrollDivisor`] unless `value` is finite and `> 0`.
    pub fn new(value: f64) -> Result<Self, InvalidScrollDivisor> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(InvalidScrollDivisor(value))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for ScrollDivisor {
    fn default() -> Self {
        Self(DEFAULT_SCROLL_DIVISOR)
    }
}


/// A single planned device call, with its arguments already computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    MoveRelative { dx: f64, dy: f64 },
    ClickLeft,
    ClickRight,
    Scroll { dx: f64, dy: f64 },
}

impl Action {
    /// Short name used in logs and error descriptions.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MoveRelative { .. } => "move",
            Self::ClickLeft => "left click",
            Self::ClickRight => "right click",
            Self::Scroll { .. } => "scroll",
        }
    }

    fn apply<M: MouseControl + ?Sized>(self, device: &mut M) -> Result<(), DeviceError> {
        match self {
            Self::MoveRelative { dx, dy } => device.move_relative(dx, dy),
            Self::ClickLeft => device.click_left(),
            Self::ClickRight => device.click_right(),
            Self::Scroll { dx, dy } => device.scroll(dx, dy),
        }
    }
}

/// Outcome of a successful dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ack {
    /// The device call completed.
    Applied(Action),
    /// The event type is not one the relay acts on.
    Ignored,
}

/// Error type for a failed dispatch.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DispatchError {
    /// The device call itself failed.
    #[error("{action} failed: {source}")]
    Device {
        action: &'static str,
        #[source]
        source: DeviceError,
    },
}

/// Dispatches decoded events to an owned mouse device.
pub struct Dispatcher<M> {
    device: M,
    scroll_divisor: ScrollDivisor,
}

impl<M: MouseControl> Dispatcher<M> {
    /// Creates a dispatcher that owns `device`.
    pub fn new(device: M, scroll_divisor: ScrollDivisor) -> Self {
        Self {
            device,
            scroll_divisor,
        }
    }

    pub fn scroll_divisor(&self) -> ScrollDivisor {
        self.scroll_divisor
    }

    /// Computes the device call for `event` without performing it.
    ///
    /// Returns `None` for event kinds the relay does not act on.
    pub fn plan(&self, event: &Event) -> Option<Action> {
        let divisor = self.scroll_divisor.get();
        match event.kind {
            EventKind::Move => Some(Action::MoveRelative {
                dx: event.dx,
                dy: event.dy,
            }),
            EventKind::Click => Some(Action::ClickLeft),
            EventKind::RightClick => Some(Action::ClickRight),
            EventKind::Scroll => Some(Action::Scroll {
                dx: event.dx / divisor,
                dy: -event.dy / divisor,
            }),
            EventKind::Other => None,
        }
    }

    /// Performs the device call for `event`, if any.
    ///
    /// Either exactly one device call is made or none is; an ignored event is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Device`] if the device call fails.
    pub fn dispatch(&mut self, event: &Event) -> Result<Ack, DispatchError> {
        let Some(action) = self.plan(event) else {
            trace!("ignoring event of kind {}", event.kind.as_str());
            return Ok(Ack::Ignored);
        };

        action
            .apply(&mut self.device)
            .map_err(|source| DispatchError::Device {
                action: action.name(),
                source,
            })?;

        debug!("dispatched {action:?}");
        Ok(Ack::Applied(action))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
