use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tokio::sync::broadcast;

use crate::chat::msg::{Message, NewMessage};

use super::{MessageStore, StoreError, Subscription, NOTIFY_CAPACITY};

const SCHEMA: &str = r#"CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    "from" TEXT NOT NULL,
    avatar_url TEXT NOT NULL,
    text TEXT NOT NULL
)"#;

/// Local message table, for running without a hosted project.
pub struct SqliteStore {
    db_pool: SqlitePool,
    tx: broadcast::Sender<Message>,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // every connection to :memory: opens a fresh database
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(16)
        };

        let db_pool = pool_options.connect_with(options).await?;
        sqlx::query(SCHEMA).execute(&db_pool).await?;

        tracing::info!(%database_url, "sqlite message store ready");

        Ok(Self {
            db_pool,
            tx: broadcast::channel(NOTIFY_CAPACITY).0,
        })
    }
}

#[async_trait]
impl MessageStore for SqliteStore {
    async fn select_latest(&self) -> Result<Vec<Message>, StoreError> {
        let rows: Vec<(i64, String, String, String)> =
            sqlx::query_as(r#"SELECT id,"from",avatar_url,text FROM messages ORDER BY id DESC"#)
                .fetch_all(&self.db_pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(id, from, avatar_url, text)| Message { id, from, avatar_url, text })
            .collect())
    }

    async fn insert(&self, message: NewMessage) -> Result<Message, StoreError> {
        let NewMessage { from, avatar_url, text } = message;
        let id = sqlx::query(r#"INSERT INTO messages ("from",avatar_url,text) VALUES (?,?,?)"#)
            .bind(&from)
            .bind(&avatar_url)
            .bind(&text)
            .execute(&self.db_pool)
            .await?
            .last_insert_rowid();

        let message = Message { id, from, avatar_url, text };
        // no subscribers is fine
        let _ = self.tx.send(message.clone());

        Ok(message)
    }

    fn subscribe(&self) -> Subscription {
        Subscription::new(self.tx.subscribe())
    }

    fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_message(text: &str) -> NewMessage {
        NewMessage {
            from: "The Octocat".to_owned(),
            avatar_url: "https://avatars.example/u/1".to_owned(),
            text: text.to_owned(),
        }
    }

    #[tokio::test]
    async fn history_comes_back_newest_first() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();

        let first = store.insert(new_message("first")).await.unwrap();
        let second = store.insert(new_message("second")).await.unwrap();
        assert!(second.id > first.id);

        let history = store.select_latest().await.unwrap();
        assert_eq!(history, vec![second, first]);
    }

    #[tokio::test]
    async fn subscribers_see_inserts_made_after_subscribing() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        store.insert(new_message("before")).await.unwrap();

        let mut subscription = store.subscribe();
        let inserted = store.insert(new_message("after")).await.unwrap();

        assert_eq!(subscription.recv().await, Some(inserted));
    }

    #[tokio::test]
    async fn unsubscribing_releases_the_receiver() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();

        let subscription = store.subscribe();
        assert_eq!(store.subscriber_count(), 1);

        subscription.unsubscribe();
        assert_eq!(store.subscriber_count(), 0);
        store.insert(new_message("nobody listening")).await.unwrap();
    }
}
