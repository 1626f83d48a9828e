use contentport_llm::TokenUsage;
use serde::{Deserialize, Serialize};

/// Progress of a tool that streams its own output (the tweet writer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolOutputStatus {
    Processing,
    Streaming,
    Complete,
}

/// Events of one chat run, as streamed to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Run started
    InitStream {
        run_id: String,
        chat_id: String,
        message_id: String,
        timestamp: i64,
    },

    /// Assistant text (token-by-token)
    Message {
        content: String,
    },

    /// Tool call fragment from the model
    ToolCall {
        index: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        arguments: Option<String>,
    },

    /// Partial output streamed by a running tool
    ToolOutput {
        tool_call_id: String,
        text: String,
        index: u32,
        status: ToolOutputStatus,
    },

    /// Tool finished
    ToolResult {
        tool_call_id: String,
        tool_name: String,
        input: serde_json::Value,
        result: String,
        is_error: bool,
        duration_ms: u64,
    },

    Usage {
        usage: TokenUsage,
    },

    /// One model step finished
    Done {
        #[serde(skip_serializing_if = "Option::is_none")]
        finish_reason: Option<String>,
    },

    /// Fatal error; terminal
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        node_id: Option<String>,
    },

    /// Run completed
    EndStream {
        status: String,
        total_duration_ms: u64,
    },
}

impl StreamEvent {
    /// Name used for the SSE `event:` field
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::InitStream { .. } => "init_stream",
            Self::Message { .. } => "message",
            Self::ToolCall { .. } => "tool_call",
            Self::ToolOutput { .. } => "tool_output",
            Self::ToolResult { .. } => "tool_result",
            Self::Usage { .. } => "usage",
            Self::Done { .. } => "done",
            Self::Error { .. } => "error",
            Self::EndStream { .. } => "end_stream",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Error { .. } | Self::EndStream { .. })
    }
}

impl From<contentport_llm::StreamEvent> for StreamEvent {
    fn from(event: contentport_llm::StreamEvent) -> Self {
        match event {
            contentport_llm::StreamEvent::Message { content } => Self::Message { content },
            contentport_llm::StreamEvent::ToolCall {
                index,
                id,
                name,
                arguments,
            } => Self::ToolCall {
                index,
                id,
                name,
                arguments,
            },
            contentport_llm::StreamEvent::Usage { usage } => Self::Usage { usage },
            contentport_llm::StreamEvent::Done { finish_reason } => Self::Done { finish_reason },
        }
    }
}
