use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::{profiles::Profile, store::SharedStore};

use super::msg::NewMessage;

/// The chat view's input box.
#[derive(Debug, Default)]
pub struct Composer {
    input: String,
}

impl Composer {
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Sends the current input as `profile` and clears it right away.
    ///
    /// The insert runs in the background and its outcome is only logged; the
    /// message shows up once the store echoes it back. Blank input is dropped
    /// without an insert.
    pub fn submit(&mut self, store: &SharedStore, profile: &Profile) -> Option<JoinHandle<()>> {
        let text = std::mem::take(&mut self.input);
        if text.trim().is_empty() {
            return None;
        }

        let message = NewMessage::from_profile(profile, text);
        let store = Arc::clone(store);
        Some(tokio::spawn(async move {
            match store.insert(message).await {
                Ok(stored) => tracing::debug!(id = stored.id, "message stored"),
                Err(e) => tracing::error!(error = %e, "failed to send message"),
            }
        }))
    }
}
