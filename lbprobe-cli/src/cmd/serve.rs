use clap::Args;
use lbprobe_core::error::{BoxError, ErrorContext};
use lbprobe_tcp::server::IdentityServer;
use std::{net::IpAddr, time::Duration};

#[derive(Debug, Args)]
/// run a backend which answers every tcp connection with its own `ip:port`
pub struct CliCommandServe {
    #[arg(long, short = 'p', default_value_t = 3333)]
    /// the port to listen on
    port: u16,

    #[arg(long, short = 'i', default_value = "0.0.0.0")]
    /// the interface to listen on
    interface: IpAddr,

    #[arg(long)]
    /// the ip address to advertise as identity
    ///
    /// (default: the interface, or the outbound ip when
    /// listening on all interfaces)
    advertise: Option<IpAddr>,
}

/// Run the identity server until ctrl-c is received
pub async fn run(cfg: CliCommandServe) -> Result<(), BoxError> {
    let server = IdentityServer::bind((cfg.interface, cfg.port), cfg.advertise)
        .await
        .context("bind identity server")?;

    tracing::info!(
        network.local.address = %cfg.interface,
        network.local.port = cfg.port,
        server.identity = server.identity(),
        "starting identity server",
    );

    let graceful = tokio_graceful::Shutdown::default();
    graceful.spawn_task_fn(async move |guard| server.serve(guard).await);

    graceful
        .shutdown_with_limit(Duration::from_secs(30))
        .await
        .context("graceful shutdown")?;

    Ok(())
}
