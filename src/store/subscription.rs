use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use crate::chat::msg::Message;

/// A live feed of inserted rows. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    id: Uuid,
    rx: broadcast::Receiver<Message>,
}

impl Subscription {
    pub(crate) fn new(rx: broadcast::Receiver<Message>) -> Self {
        let id = Uuid::now_v7();
        tracing::debug!(subscription = %id, "subscribed to inserts");
        Self { id, rx }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Next inserted row, or `None` once the store has shut down.
    ///
    /// Rows dropped because this subscriber fell behind are skipped.
    pub async fn recv(&mut self) -> Option<Message> {
        loop {
            match self.rx.recv().await {
                Ok(message) => return Some(message),
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(subscription = %self.id, missed, "subscriber lagged behind");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    pub fn unsubscribe(self) {
        tracing::debug!(subscription = %self.id, "unsubscribed from inserts");
    }
}
