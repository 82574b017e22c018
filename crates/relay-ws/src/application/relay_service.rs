//! Payload handling for the WebSocket relay.
//!
//! Each WebSocket message carries a top-level event object (no `"event"`
//! envelope, unlike the stdio host).  [`handle_payload`] decodes it and
//! dispatches it.  Failures are returned to the caller, which logs them and
//! moves on to the next message; the session stays open.

use thiserror::Error;

use mouse_relay_core::{Ack, DecodeError, DispatchError, Dispatcher, Event, MouseControl};

/// A failure handling one WebSocket message.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The payload was not a JSON object.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The device call failed.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Decodes `payload` as an event and dispatches it.
///
/// # Errors
///
/// Returns [`RelayError::Decode`] if the payload is not a JSON object, or
/// [`RelayError::Dispatch`] if the device call fails.
///
/// # Example
///
/// ```rust
/// use mouse_relay_core::device::{MouseCall, RecordingMouse};
/// use mouse_relay_core::{Dispatcher, ScrollDivisor};
/// use mouse_relay_ws::application::handle_payload;
///
/// let mouse = RecordingMouse::new();
/// let mut dispatcher = Dispatcher::new(mouse.clone(), ScrollDivisor::default());
///
/// handle_payload(&mut dispatcher, br#"{"type":"rightclick"}"#).unwrap();
///
/// assert_eq!(mouse.calls(), vec![MouseCall::ClickRight]);
/// ```
pub fn handle_payload<M: MouseControl>(
    dispatcher: &mut Dispatcher<M>,
    payload: &[u8],
) -> Result<Ack, RelayError> {
    let event = Event::from_slice(payload)?;
    Ok(dispatcher.dispatch(&event)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mouse_relay_core::device::{MouseCall, RecordingMouse};
    use mouse_relay_core::{Action, ScrollDivisor};

    fn relay() -> (RecordingMouse, Dispatcher<RecordingMouse>) {
        let mouse = RecordingMouse::new();
        let dispatcher = Dispatcher::new(mouse.clone(), ScrollDivisor::default());
        (mouse, dispatcher)
    }

    #[test]
    fn test_top_level_move_is_dispatched() {
        // Arrange
        let (mouse, mut dispatcher) = relay();

        // Act
        let ack = handle_payload(&mut dispatcher, br#"{"type":"move","dx":7,"dy":-2}"#).unwrap();

        // Assert
        assert_eq!(
            ack,
            Ack::Applied(Action::MoveRelative { dx: 7.0, dy: -2.0 })
        );
        assert_eq!(mouse.calls(), vec![MouseCall::MoveRelative { dx: 7.0, dy: -2.0 }]);
    }

    #[test]
    fn test_scroll_is_scaled_and_vertical_inverted() {
        let (mouse, mut dispatcher) = relay();

        handle_payload(&mut dispatcher, br#"{"type":"scroll","dx":120,"dy":60}"#).unwrap();

        assert_eq!(mouse.calls(), vec![MouseCall::Scroll { dx: 2.0, dy: -1.0 }]);
    }

    #[test]
    fn test_enveloped_event_is_ignored() {
        // The stdio host's {"event": {...}} shape has no top-level type here.
        let (mouse, mut dispatcher) = relay();

        let ack = handle_payload(&mut dispatcher, br#"{"event":{"type":"click"}}"#).unwrap();

        assert_eq!(ack, Ack::Ignored);
        assert!(mouse.calls().is_empty());
    }

    #[test]
    fn test_invalid_json_is_decode_error() {
        let (mouse, mut dispatcher) = relay();

        let err = handle_payload(&mut dispatcher, b"click").unwrap_err();

        assert!(matches!(err, RelayError::Decode(_)));
        assert!(mouse.calls().is_empty());
    }

    #[test]
    fn test_device_failure_is_dispatch_error() {
        // Arrange
        let mouse = RecordingMouse::always_failing();
        let mut dispatcher = Dispatcher::new(mouse.clone(), ScrollDivisor::default());

        // Act
        let err = handle_payload(&mut dispatcher, br#"{"type":"click"}"#).unwrap_err();

        // Assert
        assert!(matches!(err, RelayError::Dispatch(_)));
        assert!(err.to_string().starts_with("left click failed"));
        assert_eq!(mouse.failed_attempts(), 1);
    }
}
