use anyhow::{anyhow, Result};
use async_trait::async_trait;
use contentport_integrations::{strip_short_links, tweet_id_from_url, TwitterApi, WebScraper};
use contentport_llm::Tool;
use contentport_persist::{KeyValueStore, WebsiteContent, WebsiteContentRepository};
use serde_json::{json, Value};
use std::sync::Arc;
use url::Url;

use super::{ChatTool, ToolCallContext};

pub const READ_WEBSITE_CONTENT: &str = "readWebsiteContent";

/// Reads a page (or a tweet, for status links) and caches it for the tweet writer
pub struct ReadWebsiteTool {
    chat_id: String,
    scraper: Arc<dyn WebScraper>,
    twitter: Arc<dyn TwitterApi>,
    websites: WebsiteContentRepository,
}

impl ReadWebsiteTool {
    pub fn new(
        chat_id: impl Into<String>,
        scraper: Arc<dyn WebScraper>,
        twitter: Arc<dyn TwitterApi>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            chat_id: chat_id.into(),
            scraper,
            twitter,
            websites: WebsiteContentRepository::new(store),
        }
    }

    async fn read_tweet(&self, url: &str, tweet_id: &str) -> Result<WebsiteContent> {
        let tweet = self
            .twitter
            .lookup_tweet(tweet_id)
            .await?
            .ok_or_else(|| anyhow!("Tweet not found"))?;

        let title = match &tweet.author {
            Some(author) => format!("Tweet by @{}", author.username),
            None => format!("Tweet {}", tweet.id),
        };

        Ok(WebsiteContent {
            url: url.to_string(),
            title,
            content: strip_short_links(tweet.full_text()),
        })
    }

    async fn read_page(&self, url: &Url) -> Result<WebsiteContent> {
        let page = self.scraper.scrape(url.as_str()).await?;
        let title = page
            .title
            .filter(|title| !title.trim().is_empty())
            .or_else(|| url.host_str().map(str::to_string))
            .unwrap_or_else(|| url.to_string());

        Ok(WebsiteContent {
            url: url.to_string(),
            title,
            content: page.markdown,
        })
    }
}

#[async_trait]
impl ChatTool for ReadWebsiteTool {
    fn definition(&self) -> Tool {
        Tool::new(
            READ_WEBSITE_CONTENT,
            "Read the content of a web page or a tweet link.",
            json!({
                "type": "object",
                "properties": {
                    "website_url": { "type": "string", "description": "Absolute URL to read" }
                },
                "required": ["website_url"]
            }),
        )
    }

    async fn call(&self, arguments: Value, _ctx: &ToolCallContext) -> Result<String> {
        let raw = arguments
            .get("website_url")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("website_url is required"))?;
        let url = Url::parse(raw.trim()).map_err(|e| anyhow!("Invalid URL {}: {}", raw, e))?;

        let content = match tweet_id_from_url(url.as_str()) {
            Some(tweet_id) => self.read_tweet(url.as_str(), &tweet_id).await?,
            None => self.read_page(&url).await?,
        };

        tracing::debug!(chat_id = %self.chat_id, url = %content.url, "read website content");
        self.websites.append(&self.chat_id, content.clone()).await?;

        Ok(serde_json::to_string(&content)?)
    }
}
