pub mod builder;
pub mod graph;
pub mod node;
pub mod nodes;
pub mod prompt;
pub mod router;
pub mod tools;

pub use builder::GraphBuilder;
pub use graph::Graph;
pub use node::{EventSender, Node, NodeType};
pub use router::{NextNode, Router, SimpleRouter};
pub use tools::{ChatTool, ReadWebsiteTool, ToolCallContext, ToolRegistry, WriteTweetContext, WriteTweetTool};

// Re-export key types from contentport-types
pub use contentport_types::{GraphConfig, GraphInput, GraphState, LLMConfig, StreamEvent};
