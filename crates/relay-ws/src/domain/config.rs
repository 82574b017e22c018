//! Relay configuration types.
//!
//! [`RelayConfig`] holds every runtime setting of the WebSocket relay.  It is
//! built once at startup and borrowed by the server for its whole lifetime.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use mouse_relay_core::{config::DEFAULT_PORT, ScrollDivisor};

/// Which browser origins may open a session.
///
/// The relay is meant to be reached by one local extension, so the default is
/// to accept any origin.  A stricter deployment switches to an allow-list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OriginPolicy {
    /// Every upgrade request is accepted, with or without an `Origin` header.
    #[default]
    AnyOrigin,
    /// Only requests whose `Origin` header matches one entry exactly.
    /// Requests without an `Origin` header are rejected.
    AllowList(Vec<String>),
}

impl OriginPolicy {
    /// Returns `true` if a request carrying `origin` may connect.
    ///
    /// Comparison ignores ASCII case and a trailing `/`, since browsers are
    /// not consistent about either for extension origins.
    pub fn permits(&self, origin: Option<&str>) -> bool {
        match self {
            Self::AnyOrigin => true,
            Self::AllowList(allowed) => origin.is_some_and(|origin| {
                let origin = normalize(origin);
                allowed.iter().any(|a| normalize(a).eq_ignore_ascii_case(origin))
            }),
        }
    }
}

fn normalize(origin: &str) -> &str {
    origin.trim().trim_end_matches('/')
}

/// How long a client may take to complete the WebSocket upgrade.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// The IPv4 and IPv6 loopback addresses on `port`, which is what
/// `localhost` resolves to on current desktop systems.
pub fn loopback_addrs(port: u16) -> Vec<SocketAddr> {
    vec![
        SocketAddr::from((Ipv4Addr::LOCALHOST, port)),
        SocketAddr::from((Ipv6Addr::LOCALHOST, port)),
    ]
}

/// All runtime configuration for the WebSocket relay.
///
/// # Example
///
/// ```rust
/// use mouse_relay_ws::domain::{OriginPolicy, RelayConfig};
///
/// let cfg = RelayConfig::default();
/// assert!(cfg.bind_addrs.iter().all(|a| a.port() == 9999));
/// assert_eq!(cfg.origin_policy, OriginPolicy::AnyOrigin);
/// ```
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Listener addresses.  Both loopbacks by default; the relay has no
    /// authentication of its own.
    pub bind_addrs: Vec<SocketAddr>,

    /// Touch pixels per wheel step.
    pub scroll_divisor: ScrollDivisor,

    /// Origin check applied during the WebSocket upgrade.
    pub origin_policy: OriginPolicy,

    /// Connections that have not finished the upgrade by then are dropped.
    pub handshake_timeout: Duration,
}

impl Default for RelayConfig {
    /// | Field             | Default                        |
    /// |-------------------|--------------------------------|
    /// | bind_addrs        | `127.0.0.1:9999`, `[::1]:9999` |
    /// | scroll_divisor    | `60`                           |
    /// | origin_policy     | any origin                     |
    /// | handshake_timeout | 10 s                           |
    fn default() -> Self {
        Self {
            bind_addrs: loopback_addrs(DEFAULT_PORT),
            scroll_divisor: ScrollDivisor::default(),
            origin_policy: OriginPolicy::AnyOrigin,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn allow(origins: &[&str]) -> OriginPolicy {
        OriginPolicy::AllowList(origins.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_default_binds_both_loopbacks_on_9999() {
        // Arrange / Act
        let cfg = RelayConfig::default();
        // Assert
        let addrs: Vec<String> = cfg.bind_addrs.iter().map(|a| a.to_string()).collect();
        assert_eq!(addrs, vec!["127.0.0.1:9999", "[::1]:9999"]);
    }

    #[test]
    fn test_default_handshake_timeout_is_bounded() {
        assert_eq!(RelayConfig::default().handshake_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_default_scroll_divisor_is_60() {
        assert_eq!(RelayConfig::default().scroll_divisor.get(), 60.0);
    }

    #[test]
    fn test_any_origin_permits_everything() {
        let policy = OriginPolicy::AnyOrigin;
        assert!(policy.permits(None));
        assert!(policy.permits(Some("https://example.com")));
        assert!(policy.permits(Some("null")));
    }

    #[test]
    fn test_allow_list_permits_exact_match_only() {
        // Arrange
        let policy = allow(&["chrome-extension://abcdef"]);

        // Act / Assert
        assert!(policy.permits(Some("chrome-extension://abcdef")));
        assert!(!policy.permits(Some("chrome-extension://abcdefg")));
        assert!(!policy.permits(Some("https://abcdef")));
    }

    #[test]
    fn test_allow_list_ignores_case_and_trailing_slash() {
        let policy = allow(&["moz-extension://1234-ABCD/"]);
        assert!(policy.permits(Some("moz-extension://1234-abcd")));
    }

    #[test]
    fn test_allow_list_rejects_missing_origin() {
        assert!(!allow(&["chrome-extension://abcdef"]).permits(None));
    }

    #[test]
    fn test_empty_allow_list_rejects_everything() {
        assert!(!allow(&[]).permits(Some("chrome-extension://abcdef")));
    }
}
