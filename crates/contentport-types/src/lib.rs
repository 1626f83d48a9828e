pub mod chat;
pub mod config;
pub mod events;
pub mod state;

pub use chat::{
    Attachment, AttachmentType, AttachmentVariant, ChatHistoryItem, ChatMessage, DraftMedia,
    DraftTweet, MessageMetadata, MessagePart, MessageRole, ToolInvocationState,
};
pub use config::{GraphConfig, LLMConfig};
pub use events::{StreamEvent, ToolOutputStatus};
pub use state::{GraphInput, GraphState};
