//! Output for the traffic log.
//!
//! Both relay directions share one sink. Each call to [`LogSink::emit`] writes
//! a whole block atomically, so lines from the two directions never interleave
//! mid-line.

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};
use tokio::sync::Mutex;
use tracing::warn;

/// Destination for formatted log blocks.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Append `block` to the log. Failures are reported, never propagated.
    async fn emit(&self, block: &str);
}

/// A [`LogSink`] over any async writer, serialised by a mutex.
///
/// The mutex is held across the write and the flush, so a slow writer only
/// delays the direction that is currently emitting.
#[derive(Debug)]
pub struct WriterSink<W> {
    inner: Mutex<W>,
}

impl WriterSink<Stdout> {
    /// Sink writing to the process's standard output.
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> WriterSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self {
            inner: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }
}

#[async_trait]
impl<W> LogSink for WriterSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn emit(&self, block: &str) {
        if block.is_empty() {
            return;
        }
        let mut writer = self.inner.lock().await;
        if let Err(e) = writer.write_all(block.as_bytes()).await {
            warn!("Failed to write traffic log: {}", e);
            return;
        }
        if let Err(e) = writer.flush().await {
            warn!("Failed to flush traffic log: {}", e);
        }
    }
}
