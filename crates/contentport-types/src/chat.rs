//! Chat message model shared by the HTTP layer, the run orchestrator and history storage.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolInvocationState {
    OutputAvailable,
    OutputError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessagePart {
    Text {
        text: String,
    },

    /// Uploaded file or image, referenced by URL
    File {
        media_type: String,
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
    },

    /// A completed tool call with its result
    ToolInvocation {
        tool_call_id: String,
        tool_name: String,
        #[serde(default)]
        input: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<String>,
        state: ToolInvocationState,
    },
}

impl MessagePart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentType {
    Url,
    Txt,
    Docx,
    Pdf,
    Image,
    Manual,
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentVariant {
    Knowledge,
    Chat,
}

/// Reference to a knowledge document or a chat upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Object key; only chat uploads carry one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_key: Option<String>,
    #[serde(rename = "type")]
    pub kind: AttachmentType,
    pub variant: AttachmentVariant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftMedia {
    pub s3_key: String,
    pub media_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Tweet currently open in the editor, sent along with a chat turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftTweet {
    pub id: String,
    #[serde(default)]
    pub index: u32,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<DraftMedia>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageMetadata {
    /// Raw text the user typed, before prompt wrapping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tweets: Vec<DraftTweet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: MessageRole,
    #[serde(default)]
    pub parts: Vec<MessagePart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
}

impl ChatMessage {
    pub fn user(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: MessageRole::User,
            parts: vec![MessagePart::text(text)],
            metadata: None,
        }
    }

    pub fn assistant(id: impl Into<String>, parts: Vec<MessagePart>) -> Self {
        Self {
            id: id.into(),
            role: MessageRole::Assistant,
            parts,
            metadata: None,
        }
    }

    /// Concatenation of the text parts
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                MessagePart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn attachments(&self) -> &[Attachment] {
        self.metadata
            .as_ref()
            .map(|m| m.attachments.as_slice())
            .unwrap_or_default()
    }

    pub fn draft_tweets(&self) -> &[DraftTweet] {
        self.metadata
            .as_ref()
            .map(|m| m.tweets.as_slice())
            .unwrap_or_default()
    }
}

/// Entry of the per-user chat index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatHistoryItem {
    pub id: String,
    pub title: String,
    pub last_updated: String,
}
