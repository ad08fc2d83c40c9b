//! Identity servers.
//!
//! The backends put behind the load balancer under test:
//! every accepted connection is answered with the identity
//! of the server and closed right after.

mod identity;
#[doc(inline)]
pub use identity::IdentityServer;

mod outbound;
#[doc(inline)]
pub use outbound::outbound_ip;
