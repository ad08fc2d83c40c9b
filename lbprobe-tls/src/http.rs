//! An https client which can present the `host` header as SNI.
//!
//! Useful to reach a virtual server of an ingress through the ip address
//! of the ingress, while still selecting the right certificate and
//! server block by name.

use crate::client::{TlsConnectorData, handshake};
use bytes::Bytes;
use http::{HeaderValue, Request, Response, Uri, header::HOST, uri::Scheme};
use http_body_util::BodyExt;
use hyper::body::Body;
use hyper_util::rt::TokioIo;
use lbprobe_core::{
    DEFAULT_TIMEOUT,
    error::{BoxError, ErrorContext, OpaqueError},
};
use std::time::Duration;

const HTTPS_DEFAULT_PORT: u16 = 443;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
/// Where the [`HttpsClient`] takes the tls server name (SNI) from.
pub enum ServerNameSource {
    #[default]
    /// The host of the request uri, unless the
    /// [`TlsConnectorData`] overwrites it.
    UriHost,
    /// The `host` header of the request (without port),
    /// falling back to the uri host when the header is missing.
    HostHeader,
}

#[derive(Debug, Clone)]
/// An http/1.1 over tls client.
///
/// Each request is sent over a new connection, which is closed
/// once the response has been received.
pub struct HttpsClient {
    connector_data: TlsConnectorData,
    server_name_source: ServerNameSource,
    timeout: Duration,
}

impl HttpsClient {
    /// Create a new [`HttpsClient`] using the given tls configuration.
    #[must_use]
    pub fn new(connector_data: TlsConnectorData) -> Self {
        Self {
            connector_data,
            server_name_source: ServerNameSource::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set where the tls server name is taken from.
    #[must_use]
    pub fn with_server_name_source(mut self, source: ServerNameSource) -> Self {
        self.server_name_source = source;
        self
    }

    /// Present the `host` header of requests as tls server name.
    #[must_use]
    pub fn with_host_header_as_server_name(self) -> Self {
        self.with_server_name_source(ServerNameSource::HostHeader)
    }

    /// Set the timeout of a single exchange (connect, handshake, request and response).
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The tls configuration of this client.
    #[must_use]
    pub fn connector_data(&self) -> &TlsConnectorData {
        &self.connector_data
    }

    /// Send the request and wait for the full response.
    ///
    /// The request is sent in origin-form. If the request has no `host`
    /// header it gets one based on the uri.
    pub async fn send<B>(&self, request: Request<B>) -> Result<Response<Bytes>, BoxError>
    where
        B: Body<Data: Send, Error: Into<BoxError>> + Send + 'static,
    {
        tokio::time::timeout(self.timeout, self.exchange(request))
            .await
            .context("https exchange timed out")?
    }

    async fn exchange<B>(&self, mut request: Request<B>) -> Result<Response<Bytes>, BoxError>
    where
        B: Body<Data: Send, Error: Into<BoxError>> + Send + 'static,
    {
        let uri = request.uri().clone();
        if uri.scheme().is_some_and(|scheme| *scheme != Scheme::HTTPS) {
            return Err(OpaqueError::from_display(format!(
                "unsupported scheme in uri '{uri}', only https is supported"
            ))
            .into_boxed());
        }
        let authority = uri
            .authority()
            .with_context(|| format!("missing authority in uri '{uri}'"))?;
        let host = strip_brackets(authority.host());
        let port = authority.port_u16().unwrap_or(HTTPS_DEFAULT_PORT);

        if !request.headers().contains_key(HOST) {
            let value = match authority.port_u16() {
                Some(port) if port != HTTPS_DEFAULT_PORT => {
                    format!("{}:{port}", authority.host())
                }
                _ => authority.host().to_owned(),
            };
            let value = HeaderValue::try_from(value).context("create host header value")?;
            request.headers_mut().insert(HOST, value);
        }

        let server_name = match self.server_name_source {
            ServerNameSource::HostHeader => match request.headers().get(HOST) {
                Some(value) => value
                    .to_str()
                    .map(host_without_port)
                    .context("host header as tls server name")?
                    .to_owned(),
                None => host.to_owned(),
            },
            ServerNameSource::UriHost => self
                .connector_data
                .server_name()
                .unwrap_or(host)
                .to_owned(),
        };

        let path_and_query = uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        *request.uri_mut() = path_and_query
            .parse::<Uri>()
            .context("create origin-form request uri")?;

        tracing::debug!(
            server.address = host,
            server.port = port,
            tls.server_name = %server_name,
            http.request.method = %request.method(),
            url.path = path_and_query,
            "sending https request",
        );

        let stream = handshake::connect(
            (host, port),
            &server_name,
            self.connector_data.client_config().clone(),
            self.timeout,
        )
        .await?;

        let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
            .await
            .context("http/1.1 handshake")?;
        tokio::spawn(async move {
            if let Err(err) = conn.await {
                tracing::debug!("https connection closed with error: {err}");
            }
        });

        let response = sender
            .send_request(request)
            .await
            .context("send http request")?;
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .context("collect http response body")?
            .to_bytes();

        tracing::debug!(
            http.response.status_code = parts.status.as_u16(),
            http.response.body.size = body.len(),
            "https response received",
        );

        Ok(Response::from_parts(parts, body))
    }
}

fn strip_brackets(host: &str) -> &str {
    host.strip_prefix('[')
        .and_then(|host| host.strip_suffix(']'))
        .unwrap_or(host)
}

/// The name part of a `host` header value.
fn host_without_port(value: &str) -> &str {
    let value = value.trim();
    if let Some(rest) = value.strip_prefix('[') {
        return rest.split_once(']').map_or(rest, |(host, _)| host);
    }
    match value.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') && port.parse::<u16>().is_ok() => host,
        _ => value,
    }
}
