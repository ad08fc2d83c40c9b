//! The endpoint a probe connects to.

use crate::error::{BoxError, ErrorContext, OpaqueError};
use std::{fmt, str::FromStr, time::Duration};

/// Timeout used for every blocking step when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Where connections are made to, and how long each blocking step may take.
///
/// A target is usually built once per scenario from discovered service
/// endpoint info (e.g. a node port on the public ip of the cluster),
/// and never mutated afterwards.
///
/// ```
/// use lbprobe_core::Target;
/// use std::time::Duration;
///
/// let target: Target = "10.0.0.7:30080".parse().unwrap();
/// assert_eq!(target.host(), "10.0.0.7");
/// assert_eq!(target.port(), 30080);
///
/// let target = target.with_timeout(Duration::from_secs(2));
/// assert_eq!(target.to_string(), "10.0.0.7:30080");
/// assert_eq!(target.timeout(), Duration::from_secs(2));
/// ```
pub struct Target {
    host: String,
    port: u16,
    timeout: Duration,
}

impl Target {
    /// Create a new [`Target`] using the [`DEFAULT_TIMEOUT`].
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overwrite the timeout of this [`Target`].
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Host (domain or ip address) of the target.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port of the target.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Timeout applied to every blocking step against this target.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The `(host, port)` pair in a form accepted by the tokio socket APIs.
    #[must_use]
    pub fn addr(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for Target {
    type Err = BoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (host, port) = s
            .rsplit_once(':')
            .with_context(|| format!("target '{s}' is missing a port"))?;

        let host = match host.strip_prefix('[') {
            Some(v6) => v6
                .strip_suffix(']')
                .with_context(|| format!("unterminated ipv6 host in target '{s}'"))?,
            None if host.contains(':') => {
                return Err(OpaqueError::from_display(format!(
                    "ipv6 host in target '{s}' has to be enclosed in brackets"
                ))
                .into_boxed());
            }
            None => host,
        };
        if host.is_empty() {
            return Err(
                OpaqueError::from_display(format!("target '{s}' has an empty host")).into_boxed(),
            );
        }

        let port = port
            .parse::<u16>()
            .with_context(|| format!("parse port of target '{s}'"))?;

        Ok(Self::new(host, port))
    }
}
