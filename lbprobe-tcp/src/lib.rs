//! TCP support for lbprobe.
//!
//! - [`client`]: sampling of the responders behind a tcp load balancer;
//! - [`server`]: the identity servers to put behind such a load balancer.
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

pub mod client;
pub mod server;
