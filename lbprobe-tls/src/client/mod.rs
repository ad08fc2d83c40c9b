//! Tls client support: connector configuration and certificate probing.

mod connector_data;
#[doc(inline)]
pub use connector_data::{TlsConnectorData, TlsConnectorDataBuilder, client_root_certs};

pub(crate) mod handshake;

mod probe;
#[doc(inline)]
pub use probe::{fetch_peer_certificate, fetch_server_certificate_subject};
