//! Mouse Relay WebSocket server — entry point.
//!
//! Listens on a local WebSocket port and turns each JSON event frame from the
//! browser extension into a native mouse action.
//!
//! # Usage
//!
//! ```text
//! mouse-relay-ws [OPTIONS]
//!
//! Options:
//!   --bind <IP|localhost>    Listener address [default: localhost]
//!   --port <PORT>            Listener port [default: 9999]
//!   --scroll-divisor <D>     Touch pixels per wheel step [default: 60]
//!   --restrict-origins       Only accept origins from --allow-origin
//!   --allow-origin <ORIGIN>  Allowed origin (repeatable, or comma separated)
//!   --config <PATH>          TOML config file
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                        | Description                    |
//! |---------------------------------|--------------------------------|
//! | `MOUSE_RELAY_BIND`              | Listener address               |
//! | `MOUSE_RELAY_PORT`              | Listener port                  |
//! | `MOUSE_RELAY_SCROLL_DIVISOR`    | Touch pixels per wheel step    |
//! | `MOUSE_RELAY_RESTRICT_ORIGINS`  | Enable the origin allow-list   |
//! | `MOUSE_RELAY_ALLOWED_ORIGINS`   | Comma-separated allowed origins|
//! | `MOUSE_RELAY_CONFIG`            | Path to the TOML config file   |
//!
//! CLI args take precedence over environment variables, which take
//! precedence over the config file.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mouse_relay_core::config::{load_config, RelayFileConfig, LOCALHOST};
use mouse_relay_core::device::{permission_hint, EnigoMouse};
use mouse_relay_core::{Dispatcher, ScrollDivisor};
use mouse_relay_ws::domain::{
    loopback_addrs, OriginPolicy, RelayConfig, DEFAULT_HANDSHAKE_TIMEOUT,
};
use mouse_relay_ws::infrastructure::run_server;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Mouse Relay WebSocket server.
///
/// Unset options fall back to the config file, then to built-in defaults.
#[derive(Debug, Parser)]
#[command(
    name = "mouse-relay-ws",
    about = "Local WebSocket server that turns browser pointer events into mouse actions",
    version
)]
struct Cli {
    /// IP address to bind, or `localhost` for both loopback addresses.  Keep
    /// this on loopback unless you know why not.
    #[arg(long, env = "MOUSE_RELAY_BIND")]
    bind: Option<String>,

    /// TCP port for the WebSocket listener.
    #[arg(long, env = "MOUSE_RELAY_PORT")]
    port: Option<u16>,

    /// Touch pixels per wheel step.  Larger values scroll more slowly.
    #[arg(long, env = "MOUSE_RELAY_SCROLL_DIVISOR")]
    scroll_divisor: Option<f64>,

    /// Reject upgrade requests whose Origin is not in the allow-list.
    #[arg(long, env = "MOUSE_RELAY_RESTRICT_ORIGINS")]
    restrict_origins: bool,

    /// Allowed origin, e.g. `chrome-extension://<id>`.  Replaces the config
    /// file's list when given.
    #[arg(
        long = "allow-origin",
        env = "MOUSE_RELAY_ALLOWED_ORIGINS",
        value_delimiter = ','
    )]
    allow_origins: Vec<String>,

    /// Path to a TOML config file.  Defaults to the platform config directory.
    #[arg(long, env = "MOUSE_RELAY_CONFIG")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Merges the CLI arguments over `file` into a [`RelayConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the bind address is neither an IP address nor
    /// `localhost`, the scroll divisor is unusable, or origins are restricted
    /// with an empty list.
    fn into_relay_config(self, file: RelayFileConfig) -> anyhow::Result<RelayConfig> {
        // Validated before any field is moved out of `file`.
        let scroll_divisor = match self.scroll_divisor {
            Some(value) => ScrollDivisor::new(value).context("invalid --scroll-divisor")?,
            None => file.validated_scroll_divisor()?,
        };

        let port = self.port.unwrap_or(file.server.port);
        let bind = self.bind.unwrap_or(file.server.bind_address);
        let bind_addrs = resolve_bind_addrs(&bind, port)?;

        let origin_policy = if self.restrict_origins || file.server.restrict_origins {
            let allowed = if self.allow_origins.is_empty() {
                file.server.allowed_origins
            } else {
                self.allow_origins
            };
            if allowed.is_empty() {
                bail!("origin restriction is enabled but no allowed origins are configured");
            }
            OriginPolicy::AllowList(allowed)
        } else {
            OriginPolicy::AnyOrigin
        };

        Ok(RelayConfig {
            bind_addrs,
            scroll_divisor,
            origin_policy,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        })
    }
}

/// Turns a bind setting into listener addresses.
///
/// `localhost` means both loopbacks, since browsers may resolve it to either
/// `127.0.0.1` or `::1`.  Anything else must be a literal IP address.
fn resolve_bind_addrs(bind: &str, port: u16) -> anyhow::Result<Vec<SocketAddr>> {
    if bind.eq_ignore_ascii_case(LOCALHOST) {
        return Ok(loopback_addrs(port));
    }
    let ip: IpAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address: '{bind}'"))?;
    Ok(vec![SocketAddr::new(ip, port)])
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// A current-thread runtime is enough: sessions are multiplexed on this
/// task, and the mouse device never leaves it.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let file = load_config(cli.config.as_deref()).context("failed to load config")?;
    let config = cli.into_relay_config(file)?;

    let device = EnigoMouse::new().map_err(|e| match permission_hint() {
        Some(hint) => anyhow!("{e} ({hint})"),
        None => anyhow!(e),
    })?;
    let mut dispatcher = Dispatcher::new(device, config.scroll_divisor);

    info!(
        "Mouse Relay WebSocket server starting — bind={:?}, scroll divisor={}, origins={:?}",
        config.bind_addrs,
        config.scroll_divisor.get(),
        config.origin_policy
    );

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl+C — shutting down"),
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
                // Without a signal handler, run until killed.
                std::future::pending::<()>().await;
            }
        }
    };

    run_server(&config, &mut dispatcher, shutdown).await
}

// ── Tests ─────────────────────────────────────────────────────────────────────
