//! Message storage backends.
//!
//! The chat only ever needs three things from its store: the stored history,
//! an insert, and a stream of rows inserted after it subscribed.

mod sqlite;
mod subscription;
mod supabase;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    chat::msg::{Message, NewMessage},
    config::Config,
};

pub use sqlite::SqliteStore;
pub use subscription::Subscription;
pub use supabase::{SupabaseConfig, SupabaseStore};

/// Capacity of the per-store insert notification channel.
pub const NOTIFY_CAPACITY: usize = 256;

pub type SharedStore = Arc<dyn MessageStore>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("store returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("insert returned no row")]
    EmptyInsert,
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// All stored messages, newest first.
    async fn select_latest(&self) -> Result<Vec<Message>, StoreError>;

    /// Stores `message` and returns it with its assigned id.
    async fn insert(&self, message: NewMessage) -> Result<Message, StoreError>;

    /// Starts receiving every row inserted from now on.
    fn subscribe(&self) -> Subscription;

    /// Subscriptions currently alive.
    fn subscriber_count(&self) -> usize;
}

/// Opens the hosted store when one is configured, the local one otherwise.
pub async fn open(config: &Config) -> Result<SharedStore, StoreError> {
    let store: SharedStore = match &config.supabase {
        Some(supabase) => Arc::new(SupabaseStore::connect(supabase.clone()).await?),
        None => Arc::new(SqliteStore::connect(&config.database_url).await?),
    };
    Ok(store)
}
