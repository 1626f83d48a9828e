pub mod read_website;
pub mod write_tweet;

pub use read_website::ReadWebsiteTool;
pub use write_tweet::{WriteTweetContext, WriteTweetTool};

use anyhow::Result;
use async_trait::async_trait;
use contentport_llm::Tool;
use serde_json::Value;
use std::sync::Arc;

use crate::node::EventSender;

/// Per-call data handed to a tool
pub struct ToolCallContext {
    pub tool_call_id: String,
    /// Tools that stream partial output send `tool_output` events here
    pub events: EventSender,
}

/// Tool the model can call during a chat run
#[async_trait]
pub trait ChatTool: Send + Sync {
    fn definition(&self) -> Tool;

    /// Result text handed back to the model
    async fn call(&self, arguments: Value, ctx: &ToolCallContext) -> Result<String>;
}

/// Tools available to one run, looked up by function name
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn ChatTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, tool: Arc<dyn ChatTool>) -> Self {
        self.register(tool);
        self
    }

    pub fn register(&mut self, tool: Arc<dyn ChatTool>) {
        let name = tool.definition().function.name;
        self.tools.retain(|t| t.definition().function.name != name);
        self.tools.push(tool);
    }

    pub fn definitions(&self) -> Vec<Tool> {
        self.tools.iter().map(|tool| tool.definition()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ChatTool>> {
        self.tools
            .iter()
            .find(|tool| tool.definition().function.name == name)
            .cloned()
    }

    pub async fn execute(&self, name: &str, arguments: Value, ctx: &ToolCallContext) -> Result<String> {
        let tool = self
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown tool: {}", name))?;
        tool.call(arguments, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::sync::mpsc;

    struct Named(&'static str);

    #[async_trait]
    impl ChatTool for Named {
        fn definition(&self) -> Tool {
            Tool::new(self.0, "test tool", json!({"type": "object"}))
        }

        async fn call(&self, _arguments: Value, _ctx: &ToolCallContext) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_dispatch_by_name() {
        let registry = ToolRegistry::new()
            .with(Arc::new(Named("a")))
            .with(Arc::new(Named("b")));
        let (tx, _rx) = mpsc::channel(4);
        let ctx = ToolCallContext {
            tool_call_id: "call_1".into(),
            events: tx,
        };

        assert_eq!(registry.definitions().len(), 2);
        assert_eq!(registry.execute("b", json!({}), &ctx).await.unwrap(), "b");

        let err = registry.execute("missing", json!({}), &ctx).await.unwrap_err();
        assert!(err.to_string().contains("Unknown tool: missing"));
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Named("a")));
        registry.register(Arc::new(Named("a")));
        assert_eq!(registry.definitions().len(), 1);
    }
}
