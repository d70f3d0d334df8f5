//! Completion report delivery.

use async_trait::async_trait;
use marquee_core::CompletionReport;
use tokio::sync::mpsc;

/// Receives exactly one report per processed work item.
#[async_trait]
pub trait CompletionSink: Send + Sync {
    /// Deliver a report.
    async fn report(&self, report: CompletionReport);
}

/// Logs reports through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

#[async_trait]
impl CompletionSink for TracingSink {
    async fn report(&self, report: CompletionReport) {
        tracing::info!(
            content_ref = %report.content_ref,
            status = %report.status,
            elapsed_ms = report.elapsed_ms,
            fields_written = report.fields_written,
            reason = report.reason.as_deref(),
            error = report.error.as_deref(),
            "Work item finished"
        );
    }
}

/// Forwards reports on an mpsc channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<CompletionReport>,
}

impl ChannelSink {
    /// Wrap an existing sender.
    pub fn new(tx: mpsc::Sender<CompletionReport>) -> Self {
        Self { tx }
    }

    /// Create a sink and the receiving end of its channel.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<CompletionReport>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl CompletionSink for ChannelSink {
    async fn report(&self, report: CompletionReport) {
        if let Err(e) = self.tx.send(report).await {
            tracing::warn!(content_ref = %e.0.content_ref, "Completion receiver dropped");
        }
    }
}
