#![allow(clippy::print_stdout)]

use clap::Args;
use lbprobe_core::{
    error::{BoxError, ErrorContext, OpaqueError},
    upstream_servers,
};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

#[derive(Debug, Args)]
/// list the upstream servers of a rendered proxy configuration
pub struct CliCommandUpstreams {
    /// The rendered configuration file, or `-` to read stdin
    config: PathBuf,

    #[arg(long)]
    /// the exact number of upstream servers expected
    expect: Option<usize>,
}

/// Run the upstreams command
pub async fn run(cfg: CliCommandUpstreams) -> Result<(), BoxError> {
    let conf = if cfg.config.as_os_str() == "-" {
        let mut conf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut conf)
            .await
            .context("read config from stdin")?;
        conf
    } else {
        tokio::fs::read_to_string(&cfg.config)
            .await
            .with_context(|| format!("read config file '{}'", cfg.config.display()))?
    };

    let servers = upstream_servers(&conf)?;
    for server in &servers {
        println!("{}", server.address());
    }
    println!("{} upstream server(s)", servers.len());

    match cfg.expect {
        Some(expected) if expected != servers.len() => Err(OpaqueError::from_display(format!(
            "expected {expected} upstream server(s), found {}",
            servers.len()
        ))
        .into_boxed()),
        _ => Ok(()),
    }
}
