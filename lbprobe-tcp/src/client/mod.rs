//! Connection sampling.
//!
//! A [`Sampler`] makes a series of short-lived connections to a
//! [`Target`] and records, per connection, the payload the responder
//! sent back. Those payloads are the responder identities that can be
//! tabulated into a [`Distribution`].
//!
//! [`Target`]: lbprobe_core::Target
//! [`Distribution`]: lbprobe_core::Distribution

mod connect;
#[doc(inline)]
pub use connect::{SampleConnector, TcpConnector};

mod error;
#[doc(inline)]
pub use error::{ConnectionError, ConnectionErrorKind};

mod sampler;
#[doc(inline)]
pub use sampler::{READ_BUFFER_SIZE, Sampler, sample};
