use crate::verify::{ServerVerifyMode, server_cert_verifier};
use lbprobe_core::error::{BoxError, ErrorContext};
use rustls::{ALL_VERSIONS, ClientConfig, RootCertStore};
use std::sync::{Arc, OnceLock};

#[derive(Debug, Clone)]
/// Configuration used to establish tls connections.
///
/// Created using the [`TlsConnectorDataBuilder`], or from a
/// [`rustls::ClientConfig`] directly, in which case the verification
/// is whatever that config does and is reported as [`ServerVerifyMode::FullChain`].
pub struct TlsConnectorData {
    client_config: Arc<ClientConfig>,
    server_name: Option<String>,
    server_verify_mode: ServerVerifyMode,
}

impl TlsConnectorData {
    /// Create a default [`TlsConnectorData`], which verifies
    /// the full chain against the webpki roots.
    pub fn new() -> Result<Self, BoxError> {
        TlsConnectorDataBuilder::new().build()
    }

    /// Create a [`TlsConnectorData`] using the given verification mode.
    pub fn with_server_verify_mode(mode: ServerVerifyMode) -> Result<Self, BoxError> {
        TlsConnectorDataBuilder::new()
            .with_server_verify_mode(mode)
            .build()
    }

    /// The rustls config used for every handshake.
    #[must_use]
    pub fn client_config(&self) -> &Arc<ClientConfig> {
        &self.client_config
    }

    /// The server name (SNI) to use instead of the one the caller derives.
    #[must_use]
    pub fn server_name(&self) -> Option<&str> {
        self.server_name.as_deref()
    }

    /// How the certificate of the server is verified.
    #[must_use]
    pub fn server_verify_mode(&self) -> ServerVerifyMode {
        self.server_verify_mode
    }
}

impl From<ClientConfig> for TlsConnectorData {
    #[inline]
    fn from(value: ClientConfig) -> Self {
        Arc::new(value).into()
    }
}

impl From<Arc<ClientConfig>> for TlsConnectorData {
    fn from(value: Arc<ClientConfig>) -> Self {
        Self {
            client_config: value,
            server_name: None,
            server_verify_mode: ServerVerifyMode::FullChain,
        }
    }
}

#[derive(Debug, Clone, Default)]
/// Builder for [`TlsConnectorData`].
pub struct TlsConnectorDataBuilder {
    server_verify_mode: ServerVerifyMode,
    server_name: Option<String>,
    alpn_protocols: Vec<Vec<u8>>,
    root_certificates: Option<Arc<RootCertStore>>,
}

impl TlsConnectorDataBuilder {
    /// Create a new [`TlsConnectorDataBuilder`] which verifies the full chain
    /// against the webpki roots and does not advertise any ALPN protocols.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how the certificate of the server is verified.
    pub fn set_server_verify_mode(&mut self, mode: ServerVerifyMode) -> &mut Self {
        self.server_verify_mode = mode;
        self
    }

    /// Same as [`Self::set_server_verify_mode`] but consuming self
    #[must_use]
    pub fn with_server_verify_mode(mut self, mode: ServerVerifyMode) -> Self {
        self.set_server_verify_mode(mode);
        self
    }

    /// Set the verification mode if one is given, keep the current one otherwise.
    #[must_use]
    pub fn maybe_with_server_verify_mode(mut self, mode: Option<ServerVerifyMode>) -> Self {
        if let Some(mode) = mode {
            self.set_server_verify_mode(mode);
        }
        self
    }

    /// Set the server name that will be used for SNI.
    pub fn set_server_name(&mut self, server_name: impl Into<String>) -> &mut Self {
        self.server_name = Some(server_name.into());
        self
    }

    /// Same as [`Self::set_server_name`] but consuming self
    #[must_use]
    pub fn with_server_name(mut self, server_name: impl Into<String>) -> Self {
        self.set_server_name(server_name);
        self
    }

    /// Set the server name to the provided option consuming self
    #[must_use]
    pub fn maybe_with_server_name(mut self, server_name: Option<String>) -> Self {
        self.server_name = server_name;
        self
    }

    /// Set the protocols advertised in the ALPN extension.
    pub fn set_alpn_protocols(&mut self, protos: &[&[u8]]) -> &mut Self {
        self.alpn_protocols = protos.iter().map(|proto| proto.to_vec()).collect();
        self
    }

    /// Same as [`Self::set_alpn_protocols`] but consuming self
    #[must_use]
    pub fn with_alpn_protocols(mut self, protos: &[&[u8]]) -> Self {
        self.set_alpn_protocols(protos);
        self
    }

    /// Advertise `http/1.1` as the only ALPN protocol.
    #[must_use]
    pub fn with_alpn_protocols_http_1(self) -> Self {
        self.with_alpn_protocols(&[b"http/1.1".as_slice()])
    }

    /// Set the roots trusted by [`ServerVerifyMode::FullChain`],
    /// replacing the webpki roots.
    pub fn set_root_certificates(&mut self, roots: impl Into<Arc<RootCertStore>>) -> &mut Self {
        self.root_certificates = Some(roots.into());
        self
    }

    /// Same as [`Self::set_root_certificates`] but consuming self
    #[must_use]
    pub fn with_root_certificates(mut self, roots: impl Into<Arc<RootCertStore>>) -> Self {
        self.set_root_certificates(roots);
        self
    }

    /// Build [`TlsConnectorData`] from the current config
    pub fn build(self) -> Result<TlsConnectorData, BoxError> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let roots = self.root_certificates.unwrap_or_else(client_root_certs);
        let verifier = server_cert_verifier(self.server_verify_mode, roots, provider.clone())?;

        let mut client_config = ClientConfig::builder_with_provider(provider)
            .with_protocol_versions(ALL_VERSIONS)
            .context("select tls protocol versions")?
            .dangerous()
            .with_custom_certificate_verifier(verifier)
            .with_no_client_auth();
        client_config.alpn_protocols = self.alpn_protocols;

        tracing::trace!(
            tls.verify_mode = %self.server_verify_mode,
            tls.server_name = ?self.server_name,
            "tls connector data built",
        );

        Ok(TlsConnectorData {
            client_config: Arc::new(client_config),
            server_name: self.server_name,
            server_verify_mode: self.server_verify_mode,
        })
    }
}

/// The webpki (Mozilla) root certificates.
pub fn client_root_certs() -> Arc<RootCertStore> {
    static ROOT_CERTS: OnceLock<Arc<RootCertStore>> = OnceLock::new();
    ROOT_CERTS
        .get_or_init(|| {
            let mut root_storage = RootCertStore::empty();
            root_storage.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
            Arc::new(root_storage)
        })
        .clone()
}
