use super::content::Content;
use super::tool::ToolCall;
use serde::{Deserialize, Serialize};

/// Provider-agnostic conversation message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System {
        content: Content,
    },

    #[serde(rename = "user")]
    Human {
        content: Content,
    },

    #[serde(rename = "assistant")]
    AI {
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<Content>,

        #[serde(skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<ToolCall>>,
    },

    Tool {
        tool_call_id: String,
        content: Content,
    },
}

impl Message {
    pub fn system(content: impl Into<Content>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    pub fn human(content: impl Into<Content>) -> Self {
        Self::Human {
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<Content>) -> Self {
        Self::AI {
            content: Some(content.into()),
            tool_calls: None,
        }
    }

    /// Assistant turn that requested tools, optionally with text streamed before the calls
    pub fn ai_with_tools(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::AI {
            content: content.filter(|c| !c.is_empty()).map(Content::Text),
            tool_calls: Some(tool_calls),
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<Content>) -> Self {
        Self::Tool {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
        }
    }

    pub fn role(&self) -> &str {
        match self {
            Self::System { .. } => "system",
            Self::Human { .. } => "user",
            Self::AI { .. } => "assistant",
            Self::Tool { .. } => "tool",
        }
    }

    /// Text content of the message, empty when it only carries tool calls
    pub fn text(&self) -> String {
        match self {
            Self::System { content } | Self::Human { content } | Self::Tool { content, .. } => {
                content.joined_text()
            }
            Self::AI { content, .. } => content
                .as_ref()
                .map(Content::joined_text)
                .unwrap_or_default(),
        }
    }
}
