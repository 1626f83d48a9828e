// Provider-agnostic client creation from configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::openrouter::{OpenRouterClient, OPENROUTER_API_BASE};
use crate::traits::ChatClient;

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    #[default]
    OpenRouter,
    OpenAI,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub provider: ProviderType,
    pub api_key: String,
    /// Overrides the provider's default endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_title: Option<String>,
}

impl ProviderConfig {
    pub fn openrouter(api_key: impl Into<String>) -> Self {
        Self {
            provider: ProviderType::OpenRouter,
            api_key: api_key.into(),
            base_url: None,
            referer: None,
            app_title: None,
        }
    }

    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            provider: ProviderType::OpenAI,
            ..Self::openrouter(api_key)
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_attribution(mut self, referer: impl Into<String>, title: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self.app_title = Some(title.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        match (&self.base_url, self.provider) {
            (Some(url), _) => url,
            (None, ProviderType::OpenRouter) => OPENROUTER_API_BASE,
            (None, ProviderType::OpenAI) => OPENAI_API_BASE,
        }
    }
}

pub struct ClientFactory;

impl ClientFactory {
    pub fn create_chat_client(config: ProviderConfig) -> Result<Arc<dyn ChatClient>> {
        let mut builder = OpenRouterClient::builder()
            .api_key(config.api_key.clone())
            .base_url(config.endpoint());

        // Attribution headers only mean something to OpenRouter
        if config.provider == ProviderType::OpenRouter {
            if let Some(referer) = &config.referer {
                builder = builder.referer(referer.clone());
            }
            if let Some(title) = &config.app_title {
                builder = builder.app_title(title.clone());
            }
        }

        Ok(Arc::new(builder.build()?))
    }
}
