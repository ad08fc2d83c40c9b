//! lbprobe cli commands

pub mod cert;
pub mod sample;
pub mod send;
pub mod serve;
pub mod upstreams;
