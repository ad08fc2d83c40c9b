use super::{TlsConnectorData, handshake};
use crate::{
    ServerVerifyMode,
    cert::{CertificateSubject, PemCertificate, der_to_pem},
};
use lbprobe_core::{
    Target,
    error::{BoxError, ErrorContext},
};
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Fetch the certificate the peer presents during a tls handshake.
///
/// The SNI used is, in order of preference: the given `server_name`,
/// the one configured in the `connector_data`, the host of the target.
/// Only the leaf certificate is returned, PEM encoded, and the
/// connection is closed before returning.
pub async fn fetch_peer_certificate(
    target: &Target,
    server_name: Option<&str>,
    connector_data: &TlsConnectorData,
) -> Result<PemCertificate, BoxError> {
    let server_name = server_name
        .or(connector_data.server_name())
        .unwrap_or(target.host());

    tracing::info!(
        server.address = target.host(),
        server.port = target.port(),
        tls.server_name = server_name,
        tls.verify_mode = %connector_data.server_verify_mode(),
        "fetch peer certificate",
    );

    let mut stream = handshake::connect(
        target.addr(),
        server_name,
        connector_data.client_config().clone(),
        target.timeout(),
    )
    .await
    .with_context(|| format!("tls connect to {target}"))?;

    let (_, conn) = stream.get_ref();
    let pem = conn
        .peer_certificates()
        .and_then(|chain| chain.first())
        .map(|leaf| der_to_pem(leaf.as_ref()))
        .context("no peer cert information found")?;

    close_within(&mut stream, target.timeout()).await;

    Ok(pem)
}

/// Close the connection, giving up after `timeout`.
///
/// Failing to close is logged, the certificate is already fetched by then.
async fn close_within<S>(stream: &mut S, timeout: Duration)
where
    S: AsyncWrite + Unpin,
{
    match tokio::time::timeout(timeout, stream.shutdown()).await {
        Ok(Ok(())) => (),
        Ok(Err(err)) => tracing::debug!("error closing tls connection: {err}"),
        Err(_) => tracing::debug!(
            timeout = ?timeout,
            "closing tls connection timed out"
        ),
    }
}

/// Fetch the certificate of the server and return its subject.
///
/// The certificate is not verified, as only its subject is of interest.
/// `host` is used as SNI when given.
pub async fn fetch_server_certificate_subject(
    target: &Target,
    host: Option<&str>,
) -> Result<CertificateSubject, BoxError> {
    let connector_data = TlsConnectorData::with_server_verify_mode(ServerVerifyMode::Disable)?;
    let pem = fetch_peer_certificate(target, host, &connector_data).await?;
    let subject = pem.subject().context("extract certificate subject")?;
    Ok(subject)
}
