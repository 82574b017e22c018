//! Mouse Relay native messaging host — entry point.
//!
//! The browser launches this binary when the extension calls
//! `connectNative`, then exchanges length-prefixed JSON frames with it over
//! stdin/stdout.  Logs go to stderr; stdout carries nothing but frames.
//!
//! # Usage
//!
//! ```text
//! mouse-relay-host [OPTIONS] [BROWSER_ARGS]...
//!
//! Options:
//!   --scroll-divisor <D>   Touch pixels per wheel step [default: 60]
//!   --config <PATH>        TOML config file
//! ```
//!
//! Browsers append their own arguments (the caller's origin, a manifest
//! path, `--parent-window=<handle>` on Windows); these are accepted and
//! logged, never interpreted.
//!
//! # Environment variable overrides
//!
//! | Variable                       | Description                      |
//! |--------------------------------|----------------------------------|
//! | `MOUSE_RELAY_SCROLL_DIVISOR`   | Touch pixels per wheel step      |
//! | `MOUSE_RELAY_CONFIG`           | Path to the TOML config file     |
//! | `RUST_LOG`                     | Log filter (default `info`)      |
//!
//! Precedence is CLI flag, then environment, then config file, then the
//! built-in default.
//!
//! # Exit codes
//!
//! `0` when the browser closes stdin, `1` when the mouse device or the
//! configuration is unusable, or when stdio itself fails.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use mouse_relay_core::config::load_config;
use mouse_relay_core::device::EnigoMouse;
use mouse_relay_core::ScrollDivisor;
use mouse_relay_host::application::run_host;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Mouse Relay native messaging host.
#[derive(Debug, Parser)]
#[command(
    name = "mouse-relay-host",
    about = "Native messaging host that turns browser pointer events into mouse actions",
    version
)]
struct Cli {
    /// Touch pixels per wheel step.  Larger values scroll more slowly.
    #[arg(long, env = "MOUSE_RELAY_SCROLL_DIVISOR")]
    scroll_divisor: Option<f64>,

    /// Path to a TOML config file.  Defaults to the platform config directory.
    #[arg(long, env = "MOUSE_RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Window handle passed by Chrome on Windows.
    #[arg(long)]
    parent_window: Option<String>,

    /// Arguments appended by the browser (origin, manifest path, extension id).
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    browser_args: Vec<String>,
}

impl Cli {
    /// Resolves the scroll divisor from the flag, or the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the flag value is unusable, or the config file
    /// cannot be read, parsed, or validated.
    fn resolve_scroll_divisor(&self) -> anyhow::Result<ScrollDivisor> {
        if let Some(value) = self.scroll_divisor {
            return ScrollDivisor::new(value).context("invalid --scroll-divisor");
        }
        let file = load_config(self.config.as_deref()).context("failed to load config")?;
        Ok(file.validated_scroll_divisor()?)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    // stdout is the protocol channel, so logs must go to stderr without
    // colour codes (browsers capture stderr into their own log).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    debug!(
        "launched with browser args {:?}, parent window {:?}",
        cli.browser_args, cli.parent_window
    );

    let scroll_divisor = cli.resolve_scroll_divisor().map_err(|e| format!("{e:#}"));

    info!("mouse-relay-host {} starting", env!("CARGO_PKG_VERSION"));

    let stdin = std::io::stdin().lock();
    let stdout = std::io::stdout().lock();

    match run_host(stdin, stdout, scroll_divisor, EnigoMouse::new) {
        Ok(exit) => {
            info!("mouse-relay-host stopped ({exit:?})");
            ExitCode::from(exit.exit_code())
        }
        Err(e) => {
            error!("native messaging session failed: {e}");
            ExitCode::FAILURE
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
