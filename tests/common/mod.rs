//! Shared test utilities for bridge tests.
//!
//! This module provides common test infrastructure including:
//! - In-memory "serial ports" built on `tokio::io::duplex`
//! - A stream that fails writes on demand
//! - A recording log sink
//! - A harness that starts a bridge between two fake devices

#![allow(dead_code)]

use async_trait::async_trait;
use serial_tap::endpoint::{Endpoint, EndpointOptions};
use serial_tap::format::DisplayMode;
use serial_tap::relay::{Bridge, BridgeHandle};
use serial_tap::sink::LogSink;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{duplex, AsyncRead, AsyncReadExt, AsyncWrite, DuplexStream, ReadBuf};

/// Upper bound for any single wait in these tests.
pub const WAIT: Duration = Duration::from_secs(5);

/// Log sink that keeps every emitted block in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    blocks: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn blocks(&self) -> Vec<String> {
        self.blocks.lock().unwrap().clone()
    }

    /// All emitted lines, in emission order.
    pub fn lines(&self) -> Vec<String> {
        self.blocks()
            .iter()
            .flat_map(|b| b.lines().map(str::to_string).collect::<Vec<_>>())
            .collect()
    }

    /// Wait until at least `count` blocks have been emitted.
    pub async fn wait_for_blocks(&self, count: usize) -> Vec<String> {
        let deadline = tokio::time::Instant::now() + WAIT;
        loop {
            let blocks = self.blocks();
            if blocks.len() >= count {
                return blocks;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "timed out waiting for {count} blocks, got {blocks:?}"
            );
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl LogSink for RecordingSink {
    async fn emit(&self, block: &str) {
        self.blocks.lock().unwrap().push(block.to_string());
    }
}

/// Duplex stream whose next `n` writes fail with an injected error.
#[derive(Debug)]
pub struct FlakyStream {
    inner: DuplexStream,
    failures: Arc<AtomicUsize>,
}

impl FlakyStream {
    pub fn new(inner: DuplexStream) -> (Self, Arc<AtomicUsize>) {
        let failures = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner,
                failures: Arc::clone(&failures),
            },
            failures,
        )
    }
}

impl AsyncRead for FlakyStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl AsyncWrite for FlakyStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let pending = self.failures.load(Ordering::SeqCst);
        if pending > 0 {
            self.failures.store(pending - 1, Ordering::SeqCst);
            return Poll::Ready(Err(io::Error::other("injected transmit fault")));
        }
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

/// A running bridge between two in-memory devices.
pub struct Harness {
    /// Far end of the target port: what the serial device would see.
    pub target_device: DuplexStream,
    /// Far end of the passthru port: what the host application would see.
    pub passthru_device: DuplexStream,
    pub handle: BridgeHandle,
    pub sink: Arc<RecordingSink>,
}

/// Start a bridge over plain duplex streams.
pub fn start_bridge(input_type: DisplayMode, output_type: DisplayMode) -> Harness {
    let (target_local, target_device) = duplex(4096);
    let (passthru_local, passthru_device) = duplex(4096);
    let sink = Arc::new(RecordingSink::default());

    let target = Endpoint::spawn("target", target_local, EndpointOptions::default());
    let passthru = Endpoint::spawn("passthru", passthru_local, EndpointOptions::default());
    let handle = Bridge::new(target, passthru, input_type, output_type, sink.clone()).start();

    Harness {
        target_device,
        passthru_device,
        handle,
        sink,
    }
}

/// Read exactly `len` bytes from a device, failing the test on timeout.
pub async fn read_exact_timeout(device: &mut DuplexStream, len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    tokio::time::timeout(WAIT, device.read_exact(&mut buf))
        .await
        .expect("timed out waiting for relayed bytes")
        .expect("device read failed");
    buf
}

/// Assert that nothing arrives on `device` within a short window.
pub async fn assert_silent(device: &mut DuplexStream) {
    let mut buf = [0u8; 64];
    let result = tokio::time::timeout(Duration::from_millis(100), device.read(&mut buf)).await;
    if let Ok(Ok(n)) = result {
        assert_eq!(n, 0, "unexpected bytes: {:?}", &buf[..n]);
    }
}

/// Split a log line into (timestamp, rest-after-bracket).
pub fn split_log_line(line: &str) -> (&str, &str) {
    let line = line.strip_prefix('[').expect("line starts with '['");
    let (ts, rest) = line.split_once("] ").expect("line has '] ' separator");
    (ts, rest)
}
