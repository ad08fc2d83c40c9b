use super::outbound_ip;
use lbprobe_core::error::{BoxError, ErrorContext};
use std::{
    io,
    net::{IpAddr, SocketAddr},
    pin::{Pin, pin},
    sync::Arc,
    time::Duration,
};
use tokio::{
    io::AsyncWriteExt,
    net::{TcpListener, TcpStream, ToSocketAddrs},
};
use tokio_graceful::ShutdownGuard;

/// How long accepting is paused after an accept error.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Debug)]
/// A tcp server which answers every connection with its own identity
/// (`<ip>:<port>`) and closes it.
///
/// Put a couple of these behind a load balancer to find out
/// which backend served a connection.
pub struct IdentityServer {
    listener: TcpListener,
    identity: Arc<str>,
}

impl IdentityServer {
    /// Bind a new [`IdentityServer`] to the given address.
    ///
    /// The identity is made of the advertised ip and the bound port.
    /// When no ip is advertised the bound ip is used, unless that one is
    /// unspecified (e.g. `0.0.0.0`), in which case the [`outbound_ip`]
    /// of this host is used instead.
    pub async fn bind<A: ToSocketAddrs>(
        addr: A,
        advertise: Option<IpAddr>,
    ) -> Result<Self, BoxError> {
        let listener = TcpListener::bind(addr)
            .await
            .context("bind identity server")?;
        let local_addr = listener
            .local_addr()
            .context("get local address of identity server")?;

        let ip = match advertise {
            Some(ip) => ip,
            None if local_addr.ip().is_unspecified() => outbound_ip()
                .await
                .context("discover ip to advertise")?,
            None => local_addr.ip(),
        };
        let identity = SocketAddr::new(ip, local_addr.port()).to_string();

        tracing::debug!(
            network.local.address = %local_addr.ip(),
            network.local.port = local_addr.port(),
            identity = %identity,
            "identity server bound",
        );

        Ok(Self {
            listener,
            identity: identity.into(),
        })
    }

    /// The identity written to every accepted connection.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// The address the server is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve connections until the given guard is cancelled.
    ///
    /// Each connection is handled in its own task,
    /// which keeps the shutdown pending until it is done.
    pub async fn serve(self, guard: ShutdownGuard) {
        tracing::info!(identity = %self.identity, "identity server ready");

        let mut cancelled = pin!(guard.cancelled());
        loop {
            tokio::select! {
                _ = cancelled.as_mut() => {
                    tracing::trace!("signal received: initiate graceful shutdown");
                    break;
                }
                result = self.listener.accept() => match result {
                    Ok((stream, peer_addr)) => {
                        let identity = self.identity.clone();
                        guard.spawn_task(serve_connection(stream, peer_addr, identity));
                    }
                    Err(err) => {
                        tracing::error!("TCP accept error: {err:?}");
                        if accept_error_backoff(cancelled.as_mut()).await {
                            tracing::trace!("signal received during accept backoff: initiate graceful shutdown");
                            break;
                        }
                    }
                }
            }
        }
    }
}

/// Sleep after an accept error, unless shutdown is signalled first.
///
/// Returns `true` if the shutdown signal ended the backoff.
async fn accept_error_backoff<F>(cancelled: Pin<&mut F>) -> bool
where
    F: Future<Output = ()> + ?Sized,
{
    tokio::select! {
        _ = cancelled => true,
        _ = tokio::time::sleep(ACCEPT_ERROR_BACKOFF) => false,
    }
}

async fn serve_connection(mut stream: TcpStream, peer_addr: SocketAddr, identity: Arc<str>) {
    tracing::debug!(
        network.peer.address = %peer_addr.ip(),
        network.peer.port = peer_addr.port(),
        "connection received",
    );
    if let Err(err) = stream.write_all(identity.as_bytes()).await {
        tracing::error!("error writing identity to peer: {err}");
        return;
    }
    if let Err(err) = stream.shutdown().await {
        tracing::debug!("error closing connection to peer: {err}");
    }
}
