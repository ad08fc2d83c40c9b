#![allow(dead_code)]

use lbprobe::{core::Target, tcp::server::IdentityServer};
use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair};
use rustls::{
    ServerConfig,
    pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer},
};
use std::{
    net::{Ipv4Addr, SocketAddr},
    sync::{Arc, Once},
    time::Duration,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};
use tokio_graceful::Shutdown;
use tokio_rustls::TlsAcceptor;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Name the test certificates are issued for.
pub(crate) const SERVER_NAME: &str = "cafe.example.com";

/// to ensure we only ever register tracing once,
/// in the first test that gets run.
static INIT_TRACING_ONCE: Once = Once::new();

/// Initialize tracing for integration tests
pub(crate) fn init_tracing() {
    INIT_TRACING_ONCE.call_once(|| {
        tracing_subscriber::registry()
            .with(fmt::layer().with_test_writer())
            .with(
                EnvFilter::builder()
                    .with_default_directive(LevelFilter::DEBUG.into())
                    .from_env_lossy(),
            )
            .init();
    });
}

/// A target on the loopback interface with a short timeout.
pub(crate) fn local_target(addr: SocketAddr) -> Target {
    Target::new(addr.ip().to_string(), addr.port()).with_timeout(Duration::from_secs(2))
}

/// Identity servers running until dropped.
pub(crate) struct Backends {
    _shutdown: Shutdown,
    addrs: Vec<SocketAddr>,
    identities: Vec<String>,
}

impl Backends {
    pub(crate) fn addrs(&self) -> &[SocketAddr] {
        &self.addrs
    }

    pub(crate) fn identities(&self) -> &[String] {
        &self.identities
    }
}

/// Spawn `n` identity servers on ephemeral loopback ports.
pub(crate) async fn spawn_identity_servers(n: usize) -> Backends {
    let shutdown = Shutdown::new(std::future::pending::<()>());
    let mut addrs = Vec::with_capacity(n);
    let mut identities = Vec::with_capacity(n);

    for _ in 0..n {
        let server = IdentityServer::bind((Ipv4Addr::LOCALHOST, 0), None)
            .await
            .unwrap();
        addrs.push(server.local_addr().unwrap());
        identities.push(server.identity().to_owned());
        shutdown.spawn_task_fn(async move |guard| server.serve(guard).await);
    }

    Backends {
        _shutdown: shutdown,
        addrs,
        identities,
    }
}

/// Spawn a tcp proxy which hands every new connection
/// to the next backend, round robin.
pub(crate) async fn spawn_round_robin_balancer(backends: Vec<SocketAddr>) -> SocketAddr {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut next = 0;
        while let Ok((mut inbound, _)) = listener.accept().await {
            let backend = backends[next % backends.len()];
            next += 1;
            tokio::spawn(async move {
                match TcpStream::connect(backend).await {
                    Ok(mut outbound) => {
                        if let Err(err) =
                            tokio::io::copy_bidirectional(&mut inbound, &mut outbound).await
                        {
                            tracing::debug!("balancer copy error: {err}");
                        }
                    }
                    Err(err) => tracing::debug!("balancer connect to {backend} failed: {err}"),
                }
            });
        }
    });

    addr
}

/// Spawn a tcp server which accepts connections but never writes to them.
pub(crate) async fn spawn_silent_server() -> SocketAddr {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    addr
}

/// An address nothing listens on.
pub(crate) async fn unused_local_addr() -> SocketAddr {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    listener.local_addr().unwrap()
}

/// A self-signed certificate issued for [`SERVER_NAME`].
pub(crate) struct SelfSigned {
    pub(crate) cert: CertificateDer<'static>,
    pub(crate) key: PrivateKeyDer<'static>,
}

pub(crate) fn self_signed_certificate() -> SelfSigned {
    let key_pair = KeyPair::generate().unwrap();

    let mut params = CertificateParams::new(vec![SERVER_NAME.to_owned()]).unwrap();
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, SERVER_NAME);
    dn.push(DnType::OrganizationName, "lbprobe");
    dn.push(DnType::OrganizationalUnitName, "ingress");
    dn.push(DnType::CountryName, "BE");
    params.distinguished_name = dn;

    let cert = params.self_signed(&key_pair).unwrap();

    SelfSigned {
        cert: cert.der().clone(),
        key: PrivatePkcs8KeyDer::from(key_pair.serialize_der()).into(),
    }
}

fn tls_acceptor(certificate: &SelfSigned) -> TlsAcceptor {
    let config = ServerConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .unwrap()
    .with_no_client_auth()
    .with_single_cert(vec![certificate.cert.clone()], certificate.key.clone_key())
    .unwrap();
    TlsAcceptor::from(Arc::new(config))
}

/// Spawn a tls server which completes the handshake and closes the connection.
pub(crate) async fn spawn_tls_server(certificate: &SelfSigned) -> SocketAddr {
    let acceptor = tls_acceptor(certificate);
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                match acceptor.accept(stream).await {
                    Ok(mut stream) => {
                        let mut buf = [0u8; 64];
                        let _ = stream.read(&mut buf).await;
                    }
                    Err(err) => tracing::debug!("test tls server handshake failed: {err}"),
                }
            });
        }
    });

    addr
}

/// Spawn an https (http/1.1) server which answers every request
/// with the server name (SNI) the client presented, or `<none>`.
pub(crate) async fn spawn_sni_echo_server(certificate: &SelfSigned) -> SocketAddr {
    spawn_https_server(certificate, "200 OK").await
}

/// Like [`spawn_sni_echo_server`], but answering with the given status
/// (e.g. `"404 Not Found"`).
pub(crate) async fn spawn_https_server(certificate: &SelfSigned, status: &'static str) -> SocketAddr {
    let acceptor = tls_acceptor(certificate);
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                let Ok(mut stream) = acceptor.accept(stream).await else {
                    return;
                };
                let sni = stream
                    .get_ref()
                    .1
                    .server_name()
                    .unwrap_or("<none>")
                    .to_owned();

                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }

                let response = format!(
                    "HTTP/1.1 {status}\r\ncontent-type: text/plain\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{sni}",
                    sni.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    addr
}
