use super::{ConnectionError, ConnectionErrorKind, SampleConnector, TcpConnector};
use lbprobe_core::{
    Sample, Target,
    error::{BoxError, OpaqueError},
};
use tokio::io::AsyncReadExt;

/// Maximum number of bytes read from a single connection.
pub const READ_BUFFER_SIZE: usize = 4096;

#[derive(Debug, Clone, Default)]
/// Opens short-lived connections to a [`Target`] and records
/// which responder answered each one of them.
///
/// Connections are made one after the other, never concurrently.
/// Per connection a single read is done, and what is read is
/// used as the identity of the responder.
pub struct Sampler<C = TcpConnector> {
    connector: C,
}

impl Sampler {
    /// Create a new [`Sampler`] making plain tcp connections.
    #[must_use]
    pub fn tcp() -> Self {
        Self::default()
    }
}

impl<C> Sampler<C> {
    /// Create a new [`Sampler`] using the given [`SampleConnector`].
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Reference to the [`SampleConnector`] used by this [`Sampler`].
    pub fn connector(&self) -> &C {
        &self.connector
    }
}

impl<C: SampleConnector> Sampler<C> {
    /// Take `count` samples from the given [`Target`].
    ///
    /// The samples are returned in iteration order.
    /// The first connection that fails aborts the run.
    pub async fn sample(
        &self,
        target: &Target,
        count: usize,
    ) -> Result<Vec<Sample>, ConnectionError> {
        tracing::info!(
            server.address = target.host(),
            server.port = target.port(),
            sample.count = count,
            "sampling responders",
        );

        let mut samples = Vec::with_capacity(count);
        for iteration in 0..count {
            let sample = self.sample_once(target, iteration).await?;
            tracing::debug!(
                sample.iteration = iteration,
                sample.identity = %sample.responder_identity,
                "sample taken",
            );
            samples.push(sample);
        }
        Ok(samples)
    }

    async fn sample_once(
        &self,
        target: &Target,
        iteration: usize,
    ) -> Result<Sample, ConnectionError> {
        let err = |kind, source: BoxError| {
            ConnectionError::new(iteration, target.clone(), kind, source)
        };

        let connect = self.connector.connect(target);
        let mut stream = match tokio::time::timeout(target.timeout(), connect).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => return Err(err(ConnectionErrorKind::Connect, source.into())),
            Err(elapsed) => return Err(err(ConnectionErrorKind::Timeout, elapsed.into())),
        };

        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        let n = match tokio::time::timeout(target.timeout(), stream.read(&mut buf)).await {
            Ok(Ok(n)) => n,
            Ok(Err(source)) => return Err(err(ConnectionErrorKind::Read, source.into())),
            Err(elapsed) => return Err(err(ConnectionErrorKind::Timeout, elapsed.into())),
        };
        if n == 0 {
            return Err(err(
                ConnectionErrorKind::EmptyResponse,
                OpaqueError::from_display("connection closed before any data was received")
                    .into_boxed(),
            ));
        }
        buf.truncate(n);

        let identity = String::from_utf8(buf)
            .map_err(|source| err(ConnectionErrorKind::Decode, source.into()))?;
        Ok(Sample::new(iteration, identity))
    }
}

/// Take `count` samples from the given [`Target`] over plain tcp.
///
/// See [`Sampler::sample`] for more information.
pub async fn sample(target: &Target, count: usize) -> Result<Vec<Sample>, ConnectionError> {
    Sampler::tcp().sample(target, count).await
}
