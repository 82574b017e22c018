//! WebSocket server: accept loop and session handling.
//!
//! This module is responsible for:
//!
//! 1. Binding a TCP listener on each configured address.
//! 2. Accepting browser connections on any of them.
//! 3. Upgrading each to a WebSocket session within the handshake timeout,
//!    applying the [`OriginPolicy`].
//! 4. Handing every text or binary frame to
//!    [`handle_payload`](crate::application::handle_payload).
//! 5. Returning when the shutdown future resolves.
//!
//! # Concurrent sessions, one mouse
//!
//! Sessions run concurrently on the calling task rather than being spawned,
//! so an idle or stalled client never holds up the next one.  They share the
//! [`Dispatcher`] through a `RefCell`; the borrow is taken for a single
//! synchronous `handle_payload` call and never held across an `.await`, so
//! events from different sessions are applied whole, one at a time, in
//! arrival order.  The device does not have to be `Send`.
//!
//! # Error policy
//!
//! A frame that fails to decode or dispatch is logged and skipped; the
//! session stays open.  A transport error or a handshake timeout ends that
//! session only.
//!
//! # Shutdown
//!
//! Shutdown is not graceful: open sessions are dropped without a Close
//! frame.

use std::cell::RefCell;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{anyhow, Context};
use futures_util::future::select_all;
use futures_util::stream::FuturesUnordered;
use futures_util::StreamExt;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{
    accept_hdr_async,
    tungstenite::{
        handshake::server::{ErrorResponse, Request, Response},
        http::{header::ORIGIN, StatusCode},
        Error as WsError, Message as WsMessage,
    },
};
use tracing::{debug, error, info, warn};

use mouse_relay_core::{Ack, Dispatcher, MouseControl};

use crate::application::handle_payload;
use crate::domain::config::{OriginPolicy, RelayConfig};

/// The dispatcher as shared by concurrent sessions.
type SharedDispatcher<'a, M> = RefCell<&'a mut Dispatcher<M>>;

// ── Public API ────────────────────────────────────────────────────────────────

/// Binds a TCP listener on every address in `addrs`.
///
/// An address that cannot be bound is logged and skipped as long as at
/// least one other succeeds; `localhost` must keep working on hosts without
/// IPv6.
///
/// # Errors
///
/// Returns the last bind error if no address could be bound (port in use,
/// no permission), or an error if `addrs` is empty.
pub async fn bind(addrs: &[SocketAddr]) -> anyhow::Result<Vec<TcpListener>> {
    let mut listeners = Vec::with_capacity(addrs.len());
    let mut last_error = None;

    for &addr in addrs {
        match TcpListener::bind(addr).await {
            Ok(listener) => {
                info!("WebSocket relay listening on ws://{addr}");
                listeners.push(listener);
            }
            Err(e) => {
                warn!("could not bind {addr}: {e}");
                last_error = Some(
                    anyhow::Error::new(e)
                        .context(format!("failed to bind WebSocket listener on {addr}")),
                );
            }
        }
    }

    if listeners.is_empty() {
        return Err(last_error.unwrap_or_else(|| anyhow!("no listen address configured")));
    }
    Ok(listeners)
}

/// Binds `config.bind_addrs` and serves until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error only if no listener can be bound.
pub async fn run_server<M, F>(
    config: &RelayConfig,
    dispatcher: &mut Dispatcher<M>,
    shutdown: F,
) -> anyhow::Result<()>
where
    M: MouseControl,
    F: Future<Output = ()>,
{
    let listeners = bind(&config.bind_addrs).await?;
    serve(listeners, config, dispatcher, shutdown).await;
    Ok(())
}

/// Accepts connections on `listeners` and serves them concurrently until
/// `shutdown` resolves.
///
/// Only `origin_policy` and `handshake_timeout` are read from `config`; the
/// listeners are already bound.
pub async fn serve<M, F>(
    listeners: Vec<TcpListener>,
    config: &RelayConfig,
    dispatcher: &mut Dispatcher<M>,
    shutdown: F,
) where
    M: MouseControl,
    F: Future<Output = ()>,
{
    if listeners.is_empty() {
        warn!("no listeners to serve");
        return;
    }

    let dispatcher: SharedDispatcher<'_, M> = RefCell::new(dispatcher);
    let mut sessions = FuturesUnordered::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            accepted = accept_any(&listeners) => match accepted {
                Ok((stream, peer_addr)) => {
                    debug!("new connection from {peer_addr}");
                    sessions.push(handle_connection(stream, peer_addr, config, &dispatcher));
                }
                // Transient (e.g. out of file descriptors); keep accepting.
                Err(e) => error!("accept error: {e}"),
            },
            Some(()) = sessions.next() => {}
        }
    }

    if !sessions.is_empty() {
        info!("shutdown requested; dropping {} open session(s)", sessions.len());
    }
    info!("WebSocket relay stopped");
}

/// Waits for a connection on whichever listener gets one first.
///
/// `listeners` must not be empty.
async fn accept_any(listeners: &[TcpListener]) -> std::io::Result<(TcpStream, SocketAddr)> {
    let (accepted, _, _) = select_all(listeners.iter().map(|l| Box::pin(l.accept()))).await;
    accepted
}

/// Runs one session and logs how it ended.
async fn handle_connection<M: MouseControl>(
    stream: TcpStream,
    peer_addr: SocketAddr,
    config: &RelayConfig,
    dispatcher: &SharedDispatcher<'_, M>,
) {
    match run_session(stream, peer_addr, config, dispatcher).await {
        Ok(stats) => info!(
            "session {peer_addr} closed: {} frames, {} applied, {} failed",
            stats.frames, stats.applied, stats.failed
        ),
        Err(e) => warn!("session {peer_addr} closed with error: {e:#}"),
    }
}

// ── Per-session handler ───────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct SessionStats {
    frames: u64,
    applied: u64,
    failed: u64,
}

/// Runs one WebSocket session to completion.
///
/// # Errors
///
/// Returns an error if the handshake fails, is rejected, or does not finish
/// within `config.handshake_timeout`, or if the connection fails
/// mid-session.
async fn run_session<M: MouseControl>(
    raw_stream: TcpStream,
    peer_addr: SocketAddr,
    config: &RelayConfig,
    dispatcher: &SharedDispatcher<'_, M>,
) -> anyhow::Result<SessionStats> {
    let policy: &OriginPolicy = &config.origin_policy;
    let check_origin = |request: &Request, response: Response| {
        let origin = request
            .headers()
            .get(ORIGIN)
            .and_then(|value| value.to_str().ok());
        if policy.permits(origin) {
            debug!("session {peer_addr}: origin {origin:?} accepted");
            Ok(response)
        } else {
            warn!("session {peer_addr}: origin {origin:?} not allowed");
            let mut rejection = ErrorResponse::new(Some("origin not allowed".to_string()));
            *rejection.status_mut() = StatusCode::FORBIDDEN;
            Err(rejection)
        }
    };

    let mut ws_stream = tokio::time::timeout(
        config.handshake_timeout,
        accept_hdr_async(raw_stream, check_origin),
    )
    .await
    .map_err(|_| handshake_timed_out(peer_addr, config.handshake_timeout))?
    .with_context(|| format!("WebSocket handshake failed with {peer_addr}"))?;

    info!("WebSocket session established: {peer_addr}");

    let mut stats = SessionStats::default();

    loop {
        let ws_msg = match ws_stream.next().await {
            Some(Ok(msg)) => msg,
            Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed | WsError::Protocol(_))) => {
                debug!("session {peer_addr}: closed by peer");
                break;
            }
            Some(Err(e)) => {
                return Err(e).with_context(|| format!("session {peer_addr}: read failed"));
            }
            None => {
                debug!("session {peer_addr}: stream ended");
                break;
            }
        };

        let payload: &[u8] = match &ws_msg {
            WsMessage::Text(text) => text.as_bytes(),
            WsMessage::Binary(bytes) => &bytes[..],
            WsMessage::Ping(data) => {
                // tokio-tungstenite queues the Pong itself.
                debug!("session {peer_addr}: ping ({} bytes)", data.len());
                continue;
            }
            WsMessage::Pong(_) => continue,
            WsMessage::Close(frame) => {
                // The stream ends once the close reply has been flushed.
                debug!("session {peer_addr}: Close frame received: {frame:?}");
                continue;
            }
            WsMessage::Frame(_) => continue,
        };

        stats.frames += 1;
        let outcome = {
            let mut guard = dispatcher.borrow_mut();
            handle_payload(&mut **guard, payload)
        };
        match outcome {
            Ok(Ack::Applied(_)) => stats.applied += 1,
            Ok(Ack::Ignored) => {}
            Err(e) => {
                stats.failed += 1;
                warn!("session {peer_addr}: frame {}: {e}", stats.frames);
            }
        }
    }

    Ok(stats)
}

fn handshake_timed_out(peer_addr: SocketAddr, limit: Duration) -> anyhow::Error {
    anyhow!("WebSocket handshake with {peer_addr} not completed within {limit:?}")
}
