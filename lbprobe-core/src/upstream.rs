//! Inspection of a rendered proxy configuration.
//!
//! Used to check how many backends a rendered `upstream` block
//! points to, e.g. after scaling the service behind it.

use crate::error::{BoxError, ErrorContext};
use regex::Regex;
use std::sync::OnceLock;

const UPSTREAM_SERVER_PATTERN: &str = "server .*;";

#[derive(Debug, Clone, PartialEq, Eq)]
/// One `server <address> [parameters];` entry of a rendered config.
pub struct UpstreamServer {
    entry: String,
}

impl UpstreamServer {
    /// The matched entry, as found in the config.
    #[must_use]
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// The address the entry points to (the first token after `server`).
    #[must_use]
    pub fn address(&self) -> &str {
        self.entry
            .strip_prefix("server ")
            .unwrap_or(&self.entry)
            .split_whitespace()
            .next()
            .map(|token| token.trim_end_matches(';'))
            .unwrap_or_default()
    }
}

/// Find every upstream server entry in the rendered config.
///
/// Matching is done per line and is greedy: everything from `server `
/// up to the last `;` on that line counts as one entry.
pub fn upstream_servers(conf: &str) -> Result<Vec<UpstreamServer>, BoxError> {
    let servers: Vec<_> = upstream_server_regex()?
        .find_iter(conf)
        .map(|m| UpstreamServer {
            entry: m.as_str().to_owned(),
        })
        .collect();
    tracing::debug!(
        upstream.count = servers.len(),
        "inspected rendered upstream config"
    );
    Ok(servers)
}

/// The compiled upstream server pattern, shared by all calls.
fn upstream_server_regex() -> Result<&'static Regex, BoxError> {
    static UPSTREAM_SERVER_REGEX: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    UPSTREAM_SERVER_REGEX
        .get_or_init(|| Regex::new(UPSTREAM_SERVER_PATTERN))
        .as_ref()
        .map_err(Clone::clone)
        .context("compile upstream server pattern")
}

/// Count the upstream server entries in the rendered config.
pub fn count_upstream_servers(conf: &str) -> Result<usize, BoxError> {
    upstream_servers(conf).map(|servers| servers.len())
}
