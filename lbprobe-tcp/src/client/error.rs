//! Defines the [`ConnectionError`] type returned by a failed sampling run.

use lbprobe_core::{Target, error::BoxError};
use std::fmt;

/// The kind of [`ConnectionError`] that can occur during a sampling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionErrorKind {
    /// The connection could not be established,
    /// e.g. because it was refused or the host could not be resolved.
    Connect,
    /// Connecting or reading did not complete within the timeout of the target.
    Timeout,
    /// Reading from the established connection failed.
    Read,
    /// The peer closed the connection without sending anything.
    EmptyResponse,
    /// The peer sent a payload which is not valid UTF-8.
    Decode,
}

impl fmt::Display for ConnectionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "Connect"),
            Self::Timeout => write!(f, "Timeout"),
            Self::Read => write!(f, "Read"),
            Self::EmptyResponse => write!(f, "EmptyResponse"),
            Self::Decode => write!(f, "Decode"),
        }
    }
}

/// Error returned by a sampling run that could not complete.
///
/// A single failing connection aborts the whole run,
/// so this error always points at exactly one iteration.
///
/// Call [`ConnectionError::kind`] to determine what went wrong,
/// and [`std::error::Error::source`] to get the underlying error.
#[derive(Debug)]
pub struct ConnectionError {
    iteration: usize,
    target: Target,
    kind: ConnectionErrorKind,
    source: BoxError,
}

impl ConnectionError {
    /// Create a new [`ConnectionError`].
    pub fn new(
        iteration: usize,
        target: Target,
        kind: ConnectionErrorKind,
        source: impl Into<BoxError>,
    ) -> Self {
        Self {
            iteration,
            target,
            kind,
            source: source.into(),
        }
    }

    /// Zero-based index of the connection attempt that failed.
    #[must_use]
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// The target the failing connection was made to.
    #[must_use]
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// The kind of error that occurred.
    #[must_use]
    pub fn kind(&self) -> ConnectionErrorKind {
        self.kind
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sample #{} to {} failed ({}): {}",
            self.iteration, self.target, self.kind, self.source
        )
    }
}

impl std::error::Error for ConnectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}
