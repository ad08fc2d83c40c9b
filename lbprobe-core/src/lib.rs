//! Core types for lbprobe.
//!
//! Contains what every probe has in common: the [`Target`] connections are
//! made to, the tabulation of responder identities into a [`Distribution`],
//! the [`Verdict`] reached over such a distribution, the inspection of a
//! rendered upstream config and the [`error`] utilities used across crates.
//!
//! # lbprobe
//!
//! Crate used by the end-user `lbprobe` crate and the `lbprobe` cli alike.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(
    not(test),
    warn(clippy::print_stdout, clippy::dbg_macro),
    deny(clippy::unwrap_used, clippy::expect_used)
)]

pub mod error;

mod distribution;
#[doc(inline)]
pub use distribution::{Distribution, Iter as DistributionIter, Sample, tabulate};

mod target;
#[doc(inline)]
pub use target::{DEFAULT_TIMEOUT, Target};

mod verdict;
#[doc(inline)]
pub use verdict::{CountBounds, Verdict, verify, verify_with_bounds};

mod upstream;
#[doc(inline)]
pub use upstream::{UpstreamServer, count_upstream_servers, upstream_servers};
