use serde::{Deserialize, Serialize};

/// Page read during a chat turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebsiteContent {
    pub url: String,
    pub title: String,
    pub content: String,
}
