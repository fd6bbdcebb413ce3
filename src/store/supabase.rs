use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tokio::{sync::broadcast, task::JoinHandle};

use crate::chat::msg::{Message, NewMessage};

use super::{MessageStore, StoreError, Subscription, NOTIFY_CAPACITY};

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
    /// How often the watcher asks for rows newer than the last one seen.
    pub poll_interval: Duration,
}

/// The `messages` table of a hosted Supabase project, through its REST API.
///
/// Insert notifications come from a background watcher that polls for ids
/// above the last one it saw and fans the rows out to subscribers.
pub struct SupabaseStore {
    rest: Rest,
    tx: broadcast::Sender<Message>,
    watcher: JoinHandle<()>,
}

#[derive(Clone)]
struct Rest {
    client: Client,
    endpoint: String,
    anon_key: String,
}

impl Rest {
    fn get(&self) -> RequestBuilder {
        self.authorize(self.client.get(&self.endpoint))
    }

    fn post(&self) -> RequestBuilder {
        self.authorize(self.client.post(&self.endpoint))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }
        Ok(response.json().await?)
    }

    async fn latest_id(&self) -> Result<i64, StoreError> {
        let response = self
            .get()
            .query(&[("select", "id"), ("order", "id.desc"), ("limit", "1")])
            .send()
            .await?;

        #[derive(serde::Deserialize)]
        struct Id {
            id: i64,
        }

        let ids: Vec<Id> = Self::decode(response).await?;
        Ok(ids.first().map(|row| row.id).unwrap_or(0))
    }

    async fn newer_than(&self, last_seen: i64) -> Result<Vec<Message>, StoreError> {
        let response = self
            .get()
            .query(&[
                ("select", "*".to_owned()),
                ("id", format!("gt.{last_seen}")),
                ("order", "id.asc".to_owned()),
            ])
            .send()
            .await?;
        Self::decode(response).await
    }
}

impl SupabaseStore {
    pub async fn connect(config: SupabaseConfig) -> Result<Self, StoreError> {
        let rest = Rest {
            client: Client::builder().build()?,
            endpoint: format!("{}/rest/v1/messages", config.url.trim_end_matches('/')),
            anon_key: config.anon_key,
        };

        // rows above this id are announced; without it nothing can be
        let last_seen = rest.latest_id().await?;

        let tx = broadcast::channel(NOTIFY_CAPACITY).0;
        let watcher = tokio::spawn(watch(rest.clone(), tx.clone(), last_seen, config.poll_interval));

        tracing::info!(endpoint = %rest.endpoint, "supabase message store ready");

        Ok(Self { rest, tx, watcher })
    }
}

impl Drop for SupabaseStore {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}

async fn watch(
    rest: Rest,
    tx: broadcast::Sender<Message>,
    mut last_seen: i64,
    poll_interval: Duration,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match rest.newer_than(last_seen).await {
            Ok(rows) => {
                for row in rows {
                    last_seen = last_seen.max(row.id);
                    tracing::trace!(id = row.id, "new message row");
                    let _ = tx.send(row);
                }
            }
            Err(e) => tracing::warn!(error = %e, "polling for new messages failed"),
        }
    }
}

#[async_trait]
impl MessageStore for SupabaseStore {
    async fn select_latest(&self) -> Result<Vec<Message>, StoreError> {
        let response = self
            .rest
            .get()
            .query(&[("select", "*"), ("order", "id.desc")])
            .send()
            .await?;
        Rest::decode(response).await
    }

    async fn insert(&self, message: NewMessage) -> Result<Message, StoreError> {
        let response = self
            .rest
            .post()
            .header("Prefer", "return=representation")
            .json(&[message])
            .send()
            .await?;

        Rest::decode::<Vec<Message>>(response)
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::EmptyInsert)
    }

    fn subscribe(&self) -> Subscription {
        Subscription::new(self.tx.subscribe())
    }

    fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
