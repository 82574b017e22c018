//! NativeHost: the stdio frame loop.
//!
//! # Startup handshake
//!
//! Before reading anything the host tells the browser whether it can do its
//! job:
//!
//! - device available → one `{"status":"ready"}` frame, then [`NativeHost::serve`];
//! - device unavailable or configuration unusable → one `{"error": ...}` frame, then
//!   [`NativeHost::reject_and_drain`] reads and discards every inbound frame
//!   until the browser closes stdin, and the process exits non-zero.
//!
//! Draining matters: if the host exited straight away the browser's next
//! write would hit a closed pipe and surface as a broken-pipe error on its
//! side instead of the error frame we just sent.
//!
//! # Failure isolation
//!
//! A frame that fails to decode, a truncated frame, or a device call that
//! fails each produce one error frame and the loop moves on to the next
//! frame.  Only a failure of stdin/stdout itself ends the loop with a
//! [`HostError`].

use std::fmt::Display;
use std::io::{Read, Write};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use mouse_relay_core::{
    device::permission_hint, read_frame, write_frame, Ack, DecodeError, DeviceError,
    DispatchError, Dispatcher, Event, FrameError, HostReply, MouseControl, ScrollDivisor,
};

/// Errors that end the host session.
#[derive(Debug, Error)]
pub enum HostError {
    /// Reading stdin or writing stdout failed.
    #[error(transparent)]
    Transport(#[from] FrameError),

    /// A reply could not be serialized.
    #[error("failed to encode reply: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A per-frame failure, reported to the browser and then skipped.
#[derive(Debug, Error)]
enum FrameFailure {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// How the host session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostExit {
    /// The browser closed stdin after a normal session.
    InputClosed,
    /// The mouse device could not be opened; input was drained.
    DeviceUnavailable,
    /// The configuration was unusable; input was drained.
    ConfigInvalid,
}

impl HostExit {
    /// Process exit code for this outcome.
    pub fn exit_code(self) -> u8 {
        match self {
            Self::InputClosed => 0,
            Self::DeviceUnavailable | Self::ConfigInvalid => 1,
        }
    }
}

/// Per-session counters, logged when the session ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ServeSummary {
    /// Frames read, including ones that failed.
    pub frames: u64,
    /// Frames that produced a device call.
    pub applied: u64,
    /// Frames with an event type the relay does not act on.
    pub ignored: u64,
    /// Frames answered with an error reply.
    pub failed: u64,
}

/// The host end of a native messaging channel.
pub struct NativeHost<R, W> {
    reader: R,
    writer: W,
}

impl<R: Read, W: Write> NativeHost<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Returns the underlying reader and writer.
    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }

    /// Writes one reply frame.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if encoding or writing fails.
    pub fn send(&mut self, reply: &HostReply) -> Result<(), HostError> {
        let payload = reply.to_json_bytes()?;
        write_frame(&mut self.writer, &payload)?;
        Ok(())
    }

    /// Sends the `{"status":"ready"}` handshake.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if writing fails.
    pub fn announce_ready(&mut self) -> Result<(), HostError> {
        self.send(&HostReply::Ready)
    }

    /// Sends an `{"error": ...}` frame.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if writing fails.
    pub fn report_error(&mut self, description: impl Display) -> Result<(), HostError> {
        self.send(&HostReply::error(description))
    }

    /// Runs the frame loop until stdin closes.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] only for transport failures.  Per-frame failures
    /// are reported to the browser and counted in the summary.
    pub fn serve<M: MouseControl>(
        &mut self,
        dispatcher: &mut Dispatcher<M>,
    ) -> Result<ServeSummary, HostError> {
        let mut summary = ServeSummary::default();

        loop {
            let frame = match read_frame(&mut self.reader) {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e @ FrameError::Truncated { .. }) => {
                    // The stream is already at EOF; report and let the next
                    // read end the loop.
                    summary.frames += 1;
                    summary.failed += 1;
                    warn!("{e}");
                    self.report_error(&e)?;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            summary.frames += 1;

            match handle_frame(dispatcher, &frame) {
                Ok(Ack::Applied(_)) => summary.applied += 1,
                Ok(Ack::Ignored) => summary.ignored += 1,
                Err(failure) => {
                    summary.failed += 1;
                    warn!("frame {}: {failure}", summary.frames);
                    self.report_error(&failure)?;
                }
            }
        }

        debug!("stdin closed after {} frames", summary.frames);
        Ok(summary)
    }

    /// Sends one error frame, then discards inbound frames until stdin closes.
    ///
    /// Returns the number of frames discarded.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the error frame cannot be written or stdin
    /// fails with anything other than end-of-stream.
    pub fn reject_and_drain(&mut self, reason: impl Display) -> Result<usize, HostError> {
        self.report_error(reason)?;

        let mut drained = 0;
        loop {
            match read_frame(&mut self.reader) {
                Ok(Some(_)) => drained += 1,
                Ok(None) => break,
                Err(FrameError::Truncated { .. }) => {
                    drained += 1;
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }
        debug!("drained {drained} frames after startup failure");
        Ok(drained)
    }
}

fn handle_frame<M: MouseControl>(
    dispatcher: &mut Dispatcher<M>,
    frame: &[u8],
) -> Result<Ack, FrameFailure> {
    let event = Event::from_envelope_slice(frame)?;
    Ok(dispatcher.dispatch(&event)?)
}

/// Builds the error description sent when the device cannot be opened.
pub fn unavailable_message(err: &DeviceError) -> String {
    match permission_hint() {
        Some(hint) => format!("{err} ({hint})"),
        None => err.to_string(),
    }
}

/// Runs a complete host session: handshake, then serve or drain.
///
/// `scroll_divisor` is the outcome of resolving the configuration and
/// `open_device` opens the mouse; the caller supplies both so tests can inject
/// a fake device or a failure.  The device is only opened once the
/// configuration is known to be good.
///
/// # Errors
///
/// Returns [`HostError`] if stdin or stdout fails.
pub fn run_host<R, W, M, E, F>(
    reader: R,
    writer: W,
    scroll_divisor: Result<ScrollDivisor, E>,
    open_device: F,
) -> Result<HostExit, HostError>
where
    R: Read,
    W: Write,
    M: MouseControl,
    E: Display,
    F: FnOnce() -> Result<M, DeviceError>,
{
    let mut host = NativeHost::new(reader, writer);

    let scroll_divisor = match scroll_divisor {
        Ok(divisor) => divisor,
        Err(e) => {
            let message = format!("invalid configuration: {e}");
            error!("{message}");
            let drained = host.reject_and_drain(&message)?;
            info!("input closed after discarding {drained} frames");
            return Ok(HostExit::ConfigInvalid);
        }
    };

    match open_device() {
        Ok(device) => {
            host.announce_ready()?;
            let mut dispatcher = Dispatcher::new(device, scroll_divisor);
            info!(
                "native messaging host ready (scroll divisor {})",
                dispatcher.scroll_divisor().get()
            );
            let summary = host.serve(&mut dispatcher)?;
            info!(
                "session ended: {} frames, {} applied, {} ignored, {} failed",
                summary.frames, summary.applied, summary.ignored, summary.failed
            );
            Ok(HostExit::InputClosed)
        }
        Err(e) => {
            let message = unavailable_message(&e);
            error!("{message}");
            let drained = host.reject_and_drain(&message)?;
            info!("input closed after discarding {drained} frames");
            Ok(HostExit::DeviceUnavailable)
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
