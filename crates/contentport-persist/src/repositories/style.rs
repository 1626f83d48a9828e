use std::sync::Arc;

use crate::error::Result;
use crate::keys;
use crate::models::{Style, StyleTweet};
use crate::trait_client::{KeyValueStore, KeyValueStoreExt};

#[derive(Clone)]
pub struct StyleRepository {
    store: Arc<dyn KeyValueStore>,
}

impl StyleRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, email: &str, account_id: &str) -> Result<Option<Style>> {
        self.store.get_json(&keys::style(email, account_id)).await
    }

    pub async fn exists(&self, email: &str, account_id: &str) -> Result<bool> {
        self.store.exists(&keys::style(email, account_id)).await
    }

    pub async fn save(&self, email: &str, account_id: &str, style: &Style) -> Result<()> {
        self.store
            .set_json(&keys::style(email, account_id), style, None)
            .await
    }

    /// Append an imported tweet, creating the style when missing.
    /// A given `prompt` replaces the stored one.
    pub async fn append_tweet(
        &self,
        email: &str,
        account_id: &str,
        tweet: StyleTweet,
        prompt: Option<String>,
    ) -> Result<Style> {
        let mut style = self.get(email, account_id).await?.unwrap_or_default();
        style.tweets.push(tweet);
        if prompt.is_some() {
            style.prompt = prompt;
        }

        self.save(email, account_id, &style).await?;
        Ok(style)
    }

    /// Remove a tweet by id; `None` when the user has no style
    pub async fn remove_tweet(
        &self,
        email: &str,
        account_id: &str,
        tweet_id: &str,
    ) -> Result<Option<Style>> {
        let Some(mut style) = self.get(email, account_id).await? else {
            return Ok(None);
        };
        style.tweets.retain(|tweet| tweet.id != tweet_id);

        self.save(email, account_id, &style).await?;
        Ok(Some(style))
    }

    pub async fn set_prompt(&self, email: &str, account_id: &str, prompt: String) -> Result<Style> {
        let mut style = self.get(email, account_id).await?.unwrap_or_default();
        style.prompt = Some(prompt);

        self.save(email, account_id, &style).await?;
        Ok(style)
    }
}
