//! The bidirectional relay.
//!
//! A [`Bridge`] wires two endpoints together:
//!
//! ```text
//!  target  ──arrivals──> [out loop] ──write──> passthru     (logged as -->)
//!  target  <──write───── [in loop]  <─arrivals── passthru   (logged as <--)
//!                             │
//!                             └──> format_chunk ──> LogSink (shared)
//! ```
//!
//! Each direction runs on its own task and owns its arrival queue and the
//! opposite endpoint's writer outright, so the only resource the two loops
//! share is the log sink. Within a direction, chunks are handled strictly in
//! arrival order; across directions there is no ordering.

use crate::endpoint::{Arrivals, Endpoint, EndpointWriter};
use crate::format::{format_chunk, render_block, Direction, DisplayMode};
use crate::sink::LogSink;
use chrono::Utc;
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Counters owned by one direction's loop.
#[derive(Debug, Default)]
pub struct RelayStats {
    chunks_relayed: AtomicU64,
    bytes_relayed: AtomicU64,
    write_failures: AtomicU64,
    lines_logged: AtomicU64,
}

impl RelayStats {
    fn record_relayed(&self, len: usize) {
        self.chunks_relayed.fetch_add(1, Ordering::Relaxed);
        self.bytes_relayed.fetch_add(len as u64, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    fn record_lines(&self, lines: usize) {
        self.lines_logged.fetch_add(lines as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            chunks_relayed: self.chunks_relayed.load(Ordering::Relaxed),
            bytes_relayed: self.bytes_relayed.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            lines_logged: self.lines_logged.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of a direction's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub chunks_relayed: u64,
    pub bytes_relayed: u64,
    pub write_failures: u64,
    pub lines_logged: u64,
}

/// Counters for both directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BridgeReport {
    /// Target -> passthru.
    pub outbound: StatsSnapshot,
    /// Passthru -> target.
    pub inbound: StatsSnapshot,
}

/// Two endpoints plus the display mode for each direction, not yet running.
pub struct Bridge {
    target: Endpoint,
    passthru: Endpoint,
    input_type: DisplayMode,
    output_type: DisplayMode,
    sink: Arc<dyn LogSink>,
}

impl Bridge {
    /// `input_type` renders passthru -> target traffic, `output_type` renders
    /// target -> passthru traffic.
    pub fn new(
        target: Endpoint,
        passthru: Endpoint,
        input_type: DisplayMode,
        output_type: DisplayMode,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            target,
            passthru,
            input_type,
            output_type,
            sink,
        }
    }

    /// Spawn both direction loops.
    pub fn start(self) -> BridgeHandle {
        let (target_writer, target_arrivals) = self.target.into_parts();
        let (passthru_writer, passthru_arrivals) = self.passthru.into_parts();

        let outbound_stats = Arc::new(RelayStats::default());
        let inbound_stats = Arc::new(RelayStats::default());

        info!(
            target_port = target_arrivals.name(),
            passthru_port = passthru_arrivals.name(),
            input_type = %self.input_type,
            output_type = %self.output_type,
            "Bridge started"
        );

        let outbound = tokio::spawn(relay_direction(
            Direction::Out,
            self.output_type,
            target_arrivals,
            passthru_writer,
            Arc::clone(&self.sink),
            Arc::clone(&outbound_stats),
        ));
        let inbound = tokio::spawn(relay_direction(
            Direction::In,
            self.input_type,
            passthru_arrivals,
            target_writer,
            self.sink,
            Arc::clone(&inbound_stats),
        ));

        BridgeHandle {
            outbound,
            inbound,
            outbound_stats,
            inbound_stats,
        }
    }

    /// Start the bridge and wait until both directions have finished.
    pub async fn run(self) -> BridgeReport {
        self.start().join().await
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("target", &self.target)
            .field("passthru", &self.passthru)
            .field("input_type", &self.input_type)
            .field("output_type", &self.output_type)
            .finish()
    }
}

/// A running bridge.
#[derive(Debug)]
pub struct BridgeHandle {
    outbound: JoinHandle<()>,
    inbound: JoinHandle<()>,
    outbound_stats: Arc<RelayStats>,
    inbound_stats: Arc<RelayStats>,
}

impl BridgeHandle {
    pub fn stats(&self) -> BridgeReport {
        BridgeReport {
            outbound: self.outbound_stats.snapshot(),
            inbound: self.inbound_stats.snapshot(),
        }
    }

    /// Wait for both directions to finish, i.e. both connections to close.
    pub async fn join(self) -> BridgeReport {
        self.join_until(std::future::pending()).await
    }

    /// Like [`join`](Self::join), but stop both directions as soon as
    /// `shutdown` resolves.
    pub async fn join_until<F>(self, shutdown: F) -> BridgeReport
    where
        F: Future<Output = ()>,
    {
        let Self {
            mut outbound,
            mut inbound,
            outbound_stats,
            inbound_stats,
        } = self;

        let finished = async {
            let (out_result, in_result) = tokio::join!(&mut outbound, &mut inbound);
            for (direction, result) in [(Direction::Out, out_result), (Direction::In, in_result)] {
                if let Err(e) = result {
                    warn!(%direction, "Relay task ended abnormally: {}", e);
                }
            }
        };

        let interrupted = tokio::select! {
            _ = finished => false,
            _ = shutdown => true,
        };
        if interrupted {
            outbound.abort();
            inbound.abort();
        }

        BridgeReport {
            outbound: outbound_stats.snapshot(),
            inbound: inbound_stats.snapshot(),
        }
    }
}

async fn relay_direction(
    direction: Direction,
    mode: DisplayMode,
    mut arrivals: Arrivals,
    mut writer: EndpointWriter,
    sink: Arc<dyn LogSink>,
    stats: Arc<RelayStats>,
) {
    debug!(%direction, from = arrivals.name(), to = writer.name(), "Relay loop running");

    while let Some(chunk) = arrivals.recv().await {
        match writer.write(&chunk).await {
            Ok(()) => stats.record_relayed(chunk.len()),
            Err(e) => {
                stats.record_failure();
                warn!(%direction, len = chunk.len(), "Relay write failed: {}", e);
            }
        }

        let lines = format_chunk(&chunk, direction, mode, Utc::now());
        if !lines.is_empty() {
            sink.emit(&render_block(&lines)).await;
            stats.record_lines(lines.len());
        }
    }

    info!(%direction, endpoint = arrivals.name(), "Arrivals closed, direction finished");
}
