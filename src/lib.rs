//! Probe tcp load balancing and tls endpoints of an ingress under test.
//!
//! lbprobe is test-support tooling for end-to-end tests of an ingress
//! (load balancing) controller. Its core answers one question: when many
//! short-lived connections are made to a load balanced endpoint, how many
//! distinct backends answered them?
//!
//! 1. the [connection sampler](tcp::client) opens `N` connections, one after
//!    the other, and records the identity each responder writes back;
//! 2. the samples are [tabulated](core::tabulate) into a [`Distribution`](core::Distribution);
//! 3. the distribution is [verified](core::verify) against the expected
//!    number of distinct responders.
//!
//! Auxiliary utilities are available as well:
//!
//! - an [identity server](tcp::server::IdentityServer), the backend which
//!   writes its own `ip:port` to every connection;
//! - a [tls certificate probe](tls::client::fetch_peer_certificate) and
//!   typed [certificate subject](tls::cert::CertificateSubject);
//! - an [https client](tls::http::HttpsClient) which can present the
//!   `host` header as server name (SNI);
//! - [inspection](core::upstream_servers) of the upstream servers of a
//!   rendered proxy configuration.
//!
//! # Example
//!
//! ```no_run
//! use lbprobe::core::{Target, tabulate, verify};
//!
//! # async fn run() -> Result<(), lbprobe::core::error::BoxError> {
//! let target: Target = "10.0.0.7:30080".parse()?;
//! let samples = lbprobe::tcp::client::sample(&target, 20).await?;
//!
//! let distribution = tabulate(&samples);
//! let verdict = verify(&distribution, 4);
//! assert!(verdict.distinct_at_least(3), "{verdict}");
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(
    not(test),
    warn(clippy::print_stdout, clippy::dbg_macro),
    deny(clippy::unwrap_used, clippy::expect_used)
)]

#[doc(inline)]
pub use ::lbprobe_core as core;

#[doc(inline)]
pub use ::lbprobe_tcp as tcp;

#[cfg(feature = "tls")]
#[cfg_attr(docsrs, doc(cfg(feature = "tls")))]
#[doc(inline)]
pub use ::lbprobe_tls as tls;
