use lbprobe_core::error::{BoxError, ErrorContext};
use rustls::ClientConfig;
use rustls_pki_types::ServerName;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpStream;
use tokio_rustls::{TlsConnector, client::TlsStream};

/// Connect over tcp and establish a tls session on top of it.
///
/// Both steps are bounded by `timeout`. When `server_name` is an ip
/// address the handshake is done without SNI extension.
pub(crate) async fn connect(
    addr: (&str, u16),
    server_name: &str,
    client_config: Arc<ClientConfig>,
    timeout: Duration,
) -> Result<TlsStream<TcpStream>, BoxError> {
    let server_name = ServerName::try_from(server_name.to_owned())
        .with_context(|| format!("invalid tls server name '{server_name}'"))?;

    let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
        .await
        .context("tcp connect timed out")?
        .context("tcp connect")?;

    if let Ok(peer_addr) = stream.peer_addr() {
        tracing::debug!(
            network.peer.address = %peer_addr.ip(),
            network.peer.port = peer_addr.port(),
            "TCP connection established",
        );
    }

    let sni = server_name.to_str().into_owned();
    let stream = tokio::time::timeout(
        timeout,
        TlsConnector::from(client_config).connect(server_name, stream),
    )
    .await
    .context("tls handshake timed out")?
    .context("tls handshake")?;

    let (_, conn) = stream.get_ref();
    tracing::debug!(
        tls.server_name = %sni,
        tls.protocol_version = ?conn.protocol_version(),
        tls.cipher_suite = ?conn.negotiated_cipher_suite().map(|suite| suite.suite()),
        "TLS handshake completed",
    );

    Ok(stream)
}
