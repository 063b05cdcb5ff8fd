//! Receipt sinks for observing commits.

use tokio::sync::mpsc;

use crate::receipt::Receipt;

/// Receives every receipt the manager commits.
///
/// The manager calls `record` after the graph and lineage are updated;
/// implementations decide whether to persist, stream or drop the receipt.
pub trait ReceiptSink: Send + Sync {
  fn record(&self, receipt: Receipt);
}

/// Discards every receipt.
#[derive(Debug, Clone, Default)]
pub struct NoopSink;

impl ReceiptSink for NoopSink {
  fn record(&self, _receipt: Receipt) {}
}

/// Forwards receipts to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
  // Unbounded so a slow consumer never stalls a commit. One receipt per
  // committed transaction keeps the volume low.
  sender: mpsc::UnboundedSender<Receipt>,
}

impl ChannelSink {
  pub fn new(sender: mpsc::UnboundedSender<Receipt>) -> Self {
    Self { sender }
  }
}

impl ReceiptSink for ChannelSink {
  fn record(&self, receipt: Receipt) {
    // The receiver may have been dropped.
    let _ = self.sender.send(receipt);
  }
}
