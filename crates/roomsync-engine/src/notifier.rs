//! Channel-backed change notifier.

use roomsync_core::{ChangeEvent, ChangeNotifier};
use tokio::sync::mpsc;

/// Publishes change events onto an unbounded tokio channel. Dropping the
/// receiver silences the notifier without erroring the publisher side.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<ChangeEvent>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ChangeEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl ChangeNotifier for ChannelNotifier {
    fn publish(&self, event: ChangeEvent) {
        if self.sender.send(event).is_err() {
            tracing::debug!("Change event dropped, receiver closed");
        }
    }
}
