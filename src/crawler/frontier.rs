use crate::state::WorkItem;
use tokio::sync::mpsc;

/// Handle handlers use to push newly discovered work to the driver
///
/// Cloned into every handler. The driver owns the receiving side and does the
/// deduplication and dispatch.
#[derive(Debug, Clone)]
pub struct Frontier {
    tx: mpsc::UnboundedSender<WorkItem>,
}

impl Frontier {
    /// Creates a handle and the receiver the driver drains
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<WorkItem>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queues an item; false if the driver has already shut down
    pub fn enqueue(&self, item: WorkItem) -> bool {
        self.tx.send(item).is_ok()
    }
}
