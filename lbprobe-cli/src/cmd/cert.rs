#![allow(clippy::print_stdout)]

use clap::{Args, ValueEnum};
use lbprobe_core::{
    Target,
    error::{BoxError, ErrorContext},
};
use lbprobe_tls::{
    ServerVerifyMode,
    client::{TlsConnectorDataBuilder, fetch_peer_certificate},
};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
/// How the certificate of the server is verified
pub enum VerifyArg {
    /// accept any certificate
    None,
    /// only check the certificate is valid for the server name
    Hostname,
    /// verify the full chain against the webpki roots
    FullChain,
}

impl From<VerifyArg> for ServerVerifyMode {
    fn from(value: VerifyArg) -> Self {
        match value {
            VerifyArg::None => Self::Disable,
            VerifyArg::Hostname => Self::Hostname,
            VerifyArg::FullChain => Self::FullChain,
        }
    }
}

#[derive(Debug, Args)]
/// fetch the certificate a tls server presents
pub struct CliCommandCert {
    /// The endpoint to connect to
    ///
    /// e.g. "10.0.0.7:443" or "cafe.example.com:443"
    target: Target,

    #[arg(long)]
    /// the server name (SNI) to present, defaults to the target host
    host: Option<String>,

    #[arg(long, value_enum, default_value_t = VerifyArg::FullChain)]
    /// how the certificate of the server is verified
    verify: VerifyArg,

    #[arg(long, short = 'k')]
    /// Wether to skip certificate verification (same as `--verify none`)
    insecure: bool,

    #[arg(long, short = 't')]
    /// the timeout in seconds for connecting and the handshake
    ///
    /// (default: 10s)
    timeout: Option<u64>,
}

/// Run the cert command
pub async fn run(cfg: CliCommandCert) -> Result<(), BoxError> {
    let target = match cfg.timeout {
        Some(secs) => cfg.target.with_timeout(Duration::from_secs(secs)),
        None => cfg.target,
    };

    let mode = if cfg.insecure {
        ServerVerifyMode::Disable
    } else {
        cfg.verify.into()
    };
    let connector_data = TlsConnectorDataBuilder::new()
        .with_server_verify_mode(mode)
        .maybe_with_server_name(cfg.host)
        .build()
        .context("build tls connector data")?;

    let pem = fetch_peer_certificate(&target, None, &connector_data).await?;
    let subject = pem.subject().context("extract certificate subject")?;

    print!("{pem}");
    println!();
    println!("Subject: {subject}");
    for (name, value) in [
        ("Common Name", &subject.common_name),
        ("Organization", &subject.organization),
        ("Organizational Unit", &subject.organizational_unit),
        ("Country", &subject.country),
        ("State or Province", &subject.state_or_province),
        ("Locality", &subject.locality),
        ("Email Address", &subject.email_address),
    ] {
        if let Some(value) = value {
            println!("* {name}: {value}");
        }
    }
    for attr in &subject.unknown {
        println!("* {}: {}", attr.oid, attr.value);
    }

    Ok(())
}
