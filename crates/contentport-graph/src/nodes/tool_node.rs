use crate::node::{EventSender, Node, NodeType};
use crate::tools::{ToolCallContext, ToolRegistry};
use anyhow::Result;
use async_trait::async_trait;
use contentport_types::{GraphState, StreamEvent};
use serde_json::Value;
use std::time::Instant;

pub struct ToolNode {
    tools: ToolRegistry,
}

impl ToolNode {
    pub fn new(tools: ToolRegistry) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl Node for ToolNode {
    async fn execute(&self, state: &mut GraphState, event_tx: EventSender) -> Result<()> {
        let tool_calls = state.get_pending_tool_calls();

        for tool_call in tool_calls {
            let start = Instant::now();
            let name = tool_call.function.name.clone();
            let ctx = ToolCallContext {
                tool_call_id: tool_call.id.clone(),
                events: event_tx.clone(),
            };

            let outcome = match tool_call.arguments_value() {
                Ok(args) => {
                    let result = self.tools.execute(&name, args.clone(), &ctx).await;
                    (args, result)
                }
                Err(e) => (
                    Value::String(tool_call.function.arguments.clone()),
                    Err(anyhow::anyhow!("Invalid arguments: {}", e)),
                ),
            };

            // Failures go back to the model as the tool result
            let (input, result, is_error) = match outcome {
                (input, Ok(result)) => (input, result, false),
                (input, Err(e)) => {
                    tracing::warn!(tool = %name, error = %e, "tool execution failed");
                    (input, format!("Tool execution failed: {}", e), true)
                }
            };

            event_tx
                .send(StreamEvent::ToolResult {
                    tool_call_id: tool_call.id.clone(),
                    tool_name: name,
                    input,
                    result: result.clone(),
                    is_error,
                    duration_ms: start.elapsed().as_millis() as u64,
                })
                .await?;

            state.add_tool_result(tool_call.id, result);
        }

        Ok(())
    }

    fn node_type(&self) -> NodeType {
        NodeType::Tool
    }
}
