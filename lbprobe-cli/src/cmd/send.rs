#![allow(clippy::print_stdout)]

use bytes::Bytes;
use clap::Args;
use http::{HeaderValue, Request, header::HOST};
use http_body_util::Empty;
use lbprobe_core::error::{BoxError, ErrorContext, OpaqueError};
use lbprobe_tls::{ServerVerifyMode, client::TlsConnectorDataBuilder, http::HttpsClient};
use std::time::Duration;

#[derive(Debug, Args)]
/// send a GET request over https, optionally presenting
/// the `host` header as server name (SNI)
pub struct CliCommandSend {
    /// The url to request
    ///
    /// e.g. "https://10.0.0.7:443/coffee"
    url: http::Uri,

    #[arg(long)]
    /// the `host` header to send, also used as server name (SNI)
    host: Option<String>,

    #[arg(long, short = 'k')]
    /// Wether to skip certificate verification
    insecure: bool,

    #[arg(long, short = 't')]
    /// the timeout in seconds for the whole exchange
    ///
    /// (default: 10s)
    timeout: Option<u64>,
}

/// Run the send command
pub async fn run(cfg: CliCommandSend) -> Result<(), BoxError> {
    let connector_data = TlsConnectorDataBuilder::new()
        .maybe_with_server_verify_mode(cfg.insecure.then_some(ServerVerifyMode::Disable))
        .with_alpn_protocols_http_1()
        .build()
        .context("build tls connector data")?;

    let mut client = HttpsClient::new(connector_data);
    if let Some(secs) = cfg.timeout {
        client = client.with_timeout(Duration::from_secs(secs));
    }

    let mut request = Request::get(cfg.url.clone())
        .body(Empty::<Bytes>::new())
        .context("build http request")?;
    if let Some(host) = cfg.host {
        let value = HeaderValue::try_from(host).context("create host header value")?;
        request.headers_mut().insert(HOST, value);
        client = client.with_host_header_as_server_name();
    }

    tracing::info!(url.full = %cfg.url, "sending request");

    let response = client.send(request).await?;

    println!("{:?} {}", response.version(), response.status());
    for (name, value) in response.headers() {
        println!("{name}: {}", value.to_str().unwrap_or("<binary>"));
    }
    println!();
    println!("{}", String::from_utf8_lossy(response.body()));

    if response.status().is_success() {
        Ok(())
    } else {
        Err(OpaqueError::from_display(format!(
            "request failed with status {}",
            response.status()
        ))
        .into_boxed())
    }
}
