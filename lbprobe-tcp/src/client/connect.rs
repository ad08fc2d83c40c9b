use lbprobe_core::{Target, error::BoxError};
use std::sync::Arc;
use tokio::io::AsyncRead;
use tokio::net::TcpStream;

/// Trait used by the [`Sampler`] to establish the connection
/// a single sample is read from.
///
/// The [`Sampler`] bounds the returned future by the timeout of the target,
/// implementations do not have to.
///
/// [`Sampler`]: super::Sampler
pub trait SampleConnector: Send + Sync + 'static {
    /// Type of the established connection.
    type Stream: AsyncRead + Send + Unpin + 'static;
    /// Type of error that can occur when establishing the connection failed.
    type Error: Into<BoxError>;

    /// Connect to the given [`Target`].
    fn connect(
        &self,
        target: &Target,
    ) -> impl Future<Output = Result<Self::Stream, Self::Error>> + Send;
}

#[derive(Debug, Clone, Default)]
#[non_exhaustive]
/// A [`SampleConnector`] which establishes plain tcp connections.
pub struct TcpConnector;

impl TcpConnector {
    /// Create a new [`TcpConnector`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SampleConnector for TcpConnector {
    type Stream = TcpStream;
    type Error = std::io::Error;

    async fn connect(&self, target: &Target) -> Result<Self::Stream, Self::Error> {
        let stream = TcpStream::connect(target.addr()).await?;
        tracing::trace!(
            server.address = target.host(),
            server.port = target.port(),
            network.local.address = ?stream.local_addr().ok(),
            "tcp connection established",
        );
        Ok(stream)
    }
}

impl<C: SampleConnector> SampleConnector for Arc<C> {
    type Stream = C::Stream;
    type Error = C::Error;

    fn connect(
        &self,
        target: &Target,
    ) -> impl Future<Output = Result<Self::Stream, Self::Error>> + Send {
        (**self).connect(target)
    }
}
