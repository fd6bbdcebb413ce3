//! The chat view's local message list.
//!
//! One task owns the list and is the only consumer of the store
//! subscription. Every received row is prepended and forwarded to the view.
//! Stopping the task drops the subscription, after which the list never
//! changes again.

use tokio::{
    sync::{mpsc, oneshot},
    task::{JoinError, JoinHandle},
};

use crate::store::Subscription;

use super::msg::Message;

/// Messages newest first.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChatFeed {
    messages: Vec<Message>,
}

impl ChatFeed {
    pub fn new(initial: Vec<Message>) -> Self {
        Self { messages: initial }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn prepend(&mut self, message: Message) {
        self.messages.insert(0, message);
    }

    /// Starts consuming `subscription`, sending each applied row to `updates`.
    pub fn spawn(self, subscription: Subscription, updates: mpsc::Sender<Message>) -> FeedHandle {
        let (stop, stopped) = oneshot::channel();
        let task = tokio::spawn(self.run(subscription, stopped, updates));
        FeedHandle { stop, task }
    }

    async fn run(
        mut self,
        mut subscription: Subscription,
        mut stopped: oneshot::Receiver<()>,
        updates: mpsc::Sender<Message>,
    ) -> Self {
        loop {
            tokio::select! {
                biased;
                // also fires when the handle is dropped
                _ = &mut stopped => break,
                received = subscription.recv() => {
                    let Some(message) = received else {
                        break;
                    };
                    self.prepend(message.clone());
                    if updates.send(message).await.is_err() {
                        break;
                    }
                }
            }
        }

        subscription.unsubscribe();
        self
    }
}

pub struct FeedHandle {
    stop: oneshot::Sender<()>,
    task: JoinHandle<ChatFeed>,
}

impl FeedHandle {
    /// Stops the consumer and hands back the final list.
    pub async fn unsubscribe(self) -> Result<ChatFeed, JoinError> {
        let _ = self.stop.send(());
        self.task.await
    }
}
