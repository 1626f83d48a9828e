use std::sync::Arc;

use crate::error::Result;
use crate::keys;
use crate::trait_client::{KeyValueStore, KeyValueStoreExt};

/// Tweets produced by one tweet writer invocation, keyed by chat and generation id
#[derive(Clone)]
pub struct GeneratedThreadRepository {
    store: Arc<dyn KeyValueStore>,
}

impl GeneratedThreadRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn save(&self, chat_id: &str, generation_id: &str, tweets: &[String]) -> Result<()> {
        self.store
            .set_json(&keys::generated_thread(chat_id, generation_id), tweets, None)
            .await
    }

    pub async fn get(&self, chat_id: &str, generation_id: &str) -> Result<Vec<String>> {
        Ok(self
            .store
            .get_json(&keys::generated_thread(chat_id, generation_id))
            .await?
            .unwrap_or_default())
    }
}
