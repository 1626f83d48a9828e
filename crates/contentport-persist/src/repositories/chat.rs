use contentport_types::{ChatHistoryItem, ChatMessage};
use std::sync::Arc;

use crate::error::Result;
use crate::keys;
use crate::trait_client::{KeyValueStore, KeyValueStoreExt};

/// Maximum number of entries returned by [`ChatHistoryRepository::list_index`]
pub const HISTORY_LIST_LIMIT: usize = 20;

#[derive(Clone)]
pub struct ChatHistoryRepository {
    store: Arc<dyn KeyValueStore>,
}

impl ChatHistoryRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Messages of a chat; an unknown chat has none
    pub async fn get_messages(&self, chat_id: &str) -> Result<Vec<ChatMessage>> {
        Ok(self
            .store
            .get_json(&keys::chat_history(chat_id))
            .await?
            .unwrap_or_default())
    }

    /// Replace the stored conversation
    pub async fn save_messages(&self, chat_id: &str, messages: &[ChatMessage]) -> Result<()> {
        self.store
            .set_json(&keys::chat_history(chat_id), messages, None)
            .await
    }

    /// Put `item` at the front of the user's index, dropping any older entry
    /// for the same chat
    pub async fn touch_index(&self, email: &str, item: ChatHistoryItem) -> Result<()> {
        let key = keys::chat_index(email);
        let existing: Vec<ChatHistoryItem> = self.store.get_json(&key).await?.unwrap_or_default();

        let mut index = Vec::with_capacity(existing.len() + 1);
        let id = item.id.clone();
        index.push(item);
        index.extend(existing.into_iter().filter(|entry| entry.id != id));

        self.store.set_json(&key, &index, None).await
    }

    /// Most recent chats first, capped at [`HISTORY_LIST_LIMIT`]
    pub async fn list_index(&self, email: &str) -> Result<Vec<ChatHistoryItem>> {
        let mut index: Vec<ChatHistoryItem> = self
            .store
            .get_json(&keys::chat_index(email))
            .await?
            .unwrap_or_default();
        index.truncate(HISTORY_LIST_LIMIT);
        Ok(index)
    }
}
