#[path = "../common/mod.rs"]
mod common;

mod utils;

mod sample;
mod send;
mod upstreams;
