use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

use crate::error::{IntegrationError, Result};

pub const FIRECRAWL_API_BASE: &str = "https://api.firecrawl.dev";

/// Readable content of a web page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedPage {
    pub url: String,
    pub markdown: String,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[async_trait]
pub trait WebScraper: Send + Sync {
    async fn scrape(&self, url: &str) -> Result<ScrapedPage>;
}

#[derive(Deserialize, Default)]
struct PageMetadata {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
struct ScrapeData {
    #[serde(default)]
    markdown: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    metadata: Option<PageMetadata>,
}

#[derive(Deserialize)]
struct ScrapeResponse {
    success: bool,
    #[serde(default)]
    data: Option<ScrapeData>,
    #[serde(default)]
    error: Option<String>,
}

pub struct FirecrawlClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl FirecrawlClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, FIRECRAWL_API_BASE)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            http_client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl WebScraper for FirecrawlClient {
    async fn scrape(&self, url: &str) -> Result<ScrapedPage> {
        let response = self
            .http_client
            .post(format!("{}/v0/scrape", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({ "url": url }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IntegrationError::api(
                "Firecrawl",
                status.as_u16(),
                format!("HTTP error! status: {}", status.as_u16()),
            ));
        }

        let body: ScrapeResponse = response.json().await?;
        let data = match (body.success, body.data) {
            (true, Some(data)) => data,
            (_, _) => {
                return Err(IntegrationError::api(
                    "Firecrawl",
                    status.as_u16(),
                    body.error.unwrap_or_else(|| "Unknown error occurred".to_string()),
                ))
            }
        };

        let metadata = data.metadata.unwrap_or_default();
        Ok(ScrapedPage {
            url: url.to_string(),
            markdown: data.markdown.or(data.content).unwrap_or_default(),
            title: metadata.title.filter(|t| !t.is_empty()),
            description: metadata.description.filter(|d| !d.is_empty()),
        })
    }
}
