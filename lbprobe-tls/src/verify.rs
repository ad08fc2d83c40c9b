//! Server certificate verification modes.

use lbprobe_core::error::{BoxError, ErrorContext, OpaqueError};
use rustls::{
    DigitallySignedStruct, Error, RootCertStore, SignatureScheme,
    client::{
        WebPkiServerVerifier,
        danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier},
        verify_server_name,
    },
    crypto::{
        CryptoProvider, WebPkiSupportedAlgorithms, verify_tls12_signature, verify_tls13_signature,
    },
    server::ParsedCertificate,
};
use rustls_pki_types::{CertificateDer, ServerName, UnixTime};
use std::{fmt, str::FromStr, sync::Arc};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
/// How the certificate presented by a server is verified.
///
/// Whatever the mode, the handshake signatures are always checked
/// against the public key of the presented certificate.
pub enum ServerVerifyMode {
    /// Accept any certificate chain for any name.
    Disable,
    /// Only check that the certificate is valid for the server name,
    /// without verifying it chains up to a trusted root.
    Hostname,
    #[default]
    /// Verify the full chain up to a trusted root,
    /// as well as the server name.
    FullChain,
}

impl ServerVerifyMode {
    /// The name of this mode as used on the command line.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disable => "none",
            Self::Hostname => "hostname",
            Self::FullChain => "full-chain",
        }
    }
}

impl fmt::Display for ServerVerifyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerVerifyMode {
    type Err = OpaqueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "disable" | "insecure" => Ok(Self::Disable),
            "hostname" => Ok(Self::Hostname),
            "full-chain" | "full_chain" | "fullchain" => Ok(Self::FullChain),
            other => Err(OpaqueError::from_display(format!(
                "unknown server verify mode: {other}"
            ))),
        }
    }
}

/// Create the [`ServerCertVerifier`] for the given mode.
pub(crate) fn server_cert_verifier(
    mode: ServerVerifyMode,
    roots: Arc<RootCertStore>,
    provider: Arc<CryptoProvider>,
) -> Result<Arc<dyn ServerCertVerifier>, BoxError> {
    let algorithms = provider.signature_verification_algorithms;
    let verifier: Arc<dyn ServerCertVerifier> = match mode {
        ServerVerifyMode::Disable => Arc::new(NoServerCertVerifier { algorithms }),
        ServerVerifyMode::Hostname => Arc::new(HostnameServerCertVerifier { algorithms }),
        ServerVerifyMode::FullChain => WebPkiServerVerifier::builder_with_provider(roots, provider)
            .build()
            .context("build webpki server cert verifier")?,
    };
    Ok(verifier)
}

/// A [`ServerCertVerifier`] which accepts any certificate.
#[derive(Debug)]
pub(crate) struct NoServerCertVerifier {
    algorithms: WebPkiSupportedAlgorithms,
}

impl ServerCertVerifier for NoServerCertVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, Error> {
        verify_tls12_signature(message, cert, dss, &self.algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, Error> {
        verify_tls13_signature(message, cert, dss, &self.algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.algorithms.supported_schemes()
    }
}

/// A [`ServerCertVerifier`] which only checks the name the
/// end entity certificate is issued for.
#[derive(Debug)]
pub(crate) struct HostnameServerCertVerifier {
    algorithms: WebPkiSupportedAlgorithms,
}

impl ServerCertVerifier for HostnameServerCertVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, Error> {
        let cert = ParsedCertificate::try_from(end_entity)?;
        verify_server_name(&cert, server_name)?;
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, Error> {
        verify_tls12_signature(message, cert, dss, &self.algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, Error> {
        verify_tls13_signature(message, cert, dss, &self.algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.algorithms.supported_schemes()
    }
}
