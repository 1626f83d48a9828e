use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Linked provider account as stored by the auth layer, with OAuth 1.0a tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: String,
    pub user_id: String,
    pub provider_id: String,
    /// Id of the identity at the provider
    pub account_id: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub access_secret: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AccountRecord {
    pub fn twitter(
        user_id: impl Into<String>,
        account_id: impl Into<String>,
        access_token: impl Into<String>,
        access_secret: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            provider_id: "twitter".to_string(),
            account_id: account_id.into(),
            access_token: Some(access_token.into()),
            access_secret: Some(access_secret.into()),
            created_at: Utc::now(),
        }
    }

    /// Both OAuth tokens, when present and non-empty
    pub fn oauth_tokens(&self) -> Option<(&str, &str)> {
        match (self.access_token.as_deref(), self.access_secret.as_deref()) {
            (Some(token), Some(secret)) if !token.is_empty() && !secret.is_empty() => {
                Some((token, secret))
            }
            _ => None,
        }
    }
}

/// Public profile of a connected Twitter account, cached in the key-value store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub id: String,
    pub name: String,
    pub username: String,
    pub profile_image_url: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_id: Option<String>,
}
