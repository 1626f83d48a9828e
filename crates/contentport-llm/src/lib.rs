pub mod buffer_utils;
pub mod config;
pub mod openrouter;
pub mod streaming;
pub mod traits;
pub mod types;

pub use traits::{ChatClient, ChatOptions, ChatRequest, ChatResponse, EventStream, TokenUsage};

pub use buffer_utils::CircularLineBuffer;
pub use config::{ClientFactory, ProviderConfig};
pub use openrouter::OpenRouterClient;
pub use streaming::StreamEvent;
pub use types::{Content, ContentPart, FileData, ImageUrl, Message, Tool, ToolCall, ToolChoice};
