//! Connection endpoints.
//!
//! An [`Endpoint`] owns one live connection and splits it into two halves:
//!
//! - an [`EndpointWriter`] that sends chunks out on the connection, and
//! - an [`Arrivals`] queue that surfaces every chunk read from the connection,
//!   in arrival order, exactly as the driver delivered it.
//!
//! Reading happens on a dedicated task that keeps draining the connection into
//! a bounded queue, so a slow consumer applies backpressure to that queue
//! instead of stalling the other half of the connection.

use bytes::{Bytes, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace};

/// Default number of bytes requested per read.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;

/// Default capacity of the arrival queue, in chunks.
pub const DEFAULT_QUEUE_DEPTH: usize = 256;

/// Errors reported by [`EndpointWriter::write`].
#[derive(Debug, Error)]
pub enum EndpointError {
    /// The peer side of the connection is gone.
    #[error("{endpoint} connection is closed")]
    Closed { endpoint: String },

    /// The driver rejected or failed the transmission.
    #[error("write to {endpoint} failed: {source}")]
    Write {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },
}

impl EndpointError {
    fn from_io(endpoint: &str, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::NotConnected => Self::Closed {
                endpoint: endpoint.to_string(),
            },
            _ => Self::Write {
                endpoint: endpoint.to_string(),
                source,
            },
        }
    }
}

/// Tuning knobs for an endpoint's reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointOptions {
    /// Bytes requested per read; bounds the size of a single chunk.
    pub read_buffer_size: usize,
    /// Number of chunks that may wait in the arrival queue.
    pub queue_depth: usize,
}

impl Default for EndpointOptions {
    fn default() -> Self {
        Self {
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            queue_depth: DEFAULT_QUEUE_DEPTH,
        }
    }
}

/// One side of the bridge, bound to one connection.
pub struct Endpoint {
    writer: EndpointWriter,
    arrivals: Arrivals,
}

impl Endpoint {
    /// Take ownership of `stream` and start reading from it.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<S>(name: impl Into<String>, stream: S, options: EndpointOptions) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let name = name.into();
        let (read_half, write_half) = tokio::io::split(stream);
        let (tx, rx) = mpsc::channel(options.queue_depth.max(1));

        let reader = tokio::spawn(read_loop(
            name.clone(),
            read_half,
            tx,
            options.read_buffer_size.max(1),
        ));

        Self {
            writer: EndpointWriter {
                name: name.clone(),
                inner: Box::new(write_half),
            },
            arrivals: Arrivals { name, rx, reader },
        }
    }

    pub fn name(&self) -> &str {
        &self.writer.name
    }

    /// Split into the write half and the arrival queue.
    pub fn into_parts(self) -> (EndpointWriter, Arrivals) {
        (self.writer, self.arrivals)
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("name", &self.writer.name)
            .finish()
    }
}

/// Outbound half of an endpoint.
pub struct EndpointWriter {
    name: String,
    inner: Box<dyn AsyncWrite + Send + Unpin>,
}

impl EndpointWriter {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hand `chunk` to the driver for transmission.
    ///
    /// Completes once the bytes are accepted by the driver, not when the
    /// far end acknowledges them.
    pub async fn write(&mut self, chunk: &[u8]) -> Result<(), EndpointError> {
        self.inner
            .write_all(chunk)
            .await
            .map_err(|e| EndpointError::from_io(&self.name, e))?;
        self.inner
            .flush()
            .await
            .map_err(|e| EndpointError::from_io(&self.name, e))?;
        trace!(endpoint = %self.name, len = chunk.len(), "Chunk written");
        Ok(())
    }
}

impl std::fmt::Debug for EndpointWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointWriter")
            .field("name", &self.name)
            .finish()
    }
}

/// Inbound chunks of an endpoint, in arrival order.
pub struct Arrivals {
    name: String,
    rx: mpsc::Receiver<Bytes>,
    reader: JoinHandle<()>,
}

impl Arrivals {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wait for the next chunk. Returns `None` once the connection has closed
    /// and every buffered chunk has been delivered.
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.rx.recv().await
    }
}

impl Drop for Arrivals {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

impl std::fmt::Debug for Arrivals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arrivals").field("name", &self.name).finish()
    }
}

async fn read_loop<R>(name: String, mut reader: R, tx: mpsc::Sender<Bytes>, buffer_size: usize)
where
    R: AsyncRead + Unpin,
{
    let mut buf = BytesMut::with_capacity(buffer_size);
    loop {
        buf.reserve(buffer_size);
        let mut limited = (&mut reader).take(buffer_size as u64);
        match limited.read_buf(&mut buf).await {
            Ok(0) => {
                info!(endpoint = %name, "Connection closed by peer");
                break;
            }
            Ok(n) => {
                trace!(endpoint = %name, len = n, "Chunk received");
                if tx.send(buf.split().freeze()).await.is_err() {
                    debug!(endpoint = %name, "Arrival queue dropped, stopping reader");
                    break;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
            Err(e) => {
                error!(endpoint = %name, "Read failed, closing arrivals: {}", e);
                break;
            }
        }
    }
}
