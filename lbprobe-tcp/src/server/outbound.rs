use lbprobe_core::error::{BoxError, ErrorContext};
use std::net::{IpAddr, SocketAddr};
use tokio::net::{ToSocketAddrs, UdpSocket};

const PUBLIC_PROBE_ADDR: &str = "8.8.8.8:80";

/// Discover the ip address this host uses for outbound traffic.
///
/// A udp socket is "connected" to a public address, which makes the
/// OS pick a route and thus a local address. No packet is sent.
pub async fn outbound_ip() -> Result<IpAddr, BoxError> {
    outbound_ip_towards(PUBLIC_PROBE_ADDR).await
}

async fn outbound_ip_towards(addr: impl ToSocketAddrs) -> Result<IpAddr, BoxError> {
    let socket = UdpSocket::bind(SocketAddr::from(([0, 0, 0, 0], 0)))
        .await
        .context("bind udp socket")?;
    socket
        .connect(addr)
        .await
        .context("connect udp socket")?;
    let local_addr = socket
        .local_addr()
        .context("get local address of udp socket")?;
    Ok(local_addr.ip())
}
