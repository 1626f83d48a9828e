use std::sync::Arc;

use crate::error::Result;
use crate::keys;
use crate::models::WebsiteContent;
use crate::trait_client::{KeyValueStore, KeyValueStoreExt};

/// Pages read during the current chat turn
#[derive(Clone)]
pub struct WebsiteContentRepository {
    store: Arc<dyn KeyValueStore>,
}

impl WebsiteContentRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, chat_id: &str) -> Result<Vec<WebsiteContent>> {
        Ok(self
            .store
            .get_json(&keys::website_contents(chat_id))
            .await?
            .unwrap_or_default())
    }

    pub async fn append(&self, chat_id: &str, content: WebsiteContent) -> Result<()> {
        let mut contents = self.list(chat_id).await?;
        contents.push(content);
        self.store
            .set_json(&keys::website_contents(chat_id), &contents, None)
            .await
    }

    pub async fn clear(&self, chat_id: &str) -> Result<bool> {
        self.store.delete(&keys::website_contents(chat_id)).await
    }
}
