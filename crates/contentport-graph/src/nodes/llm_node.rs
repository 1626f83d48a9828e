use crate::node::{EventSender, Node, NodeType};
use anyhow::Result;
use async_trait::async_trait;
use contentport_llm::{ChatClient, ChatOptions, ChatRequest, EventStream, Message, Tool, ToolCall, ToolChoice};
use contentport_types::GraphState;
use futures::StreamExt;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Tool call assembled from streamed fragments
#[derive(Default)]
struct ToolCallBuffer {
    id: Option<String>,
    name: Option<String>,
    arguments: String,
}

/// Assistant turn produced by one model step
struct StepOutput {
    content: String,
    tool_calls: Vec<ToolCall>,
}

pub struct LLMNode {
    client: Arc<dyn ChatClient>,
    tools: Vec<Tool>,
}

impl LLMNode {
    pub fn new(client: Arc<dyn ChatClient>, tools: Vec<Tool>) -> Self {
        Self { client, tools }
    }

    async fn create_stream(&self, state: &GraphState) -> Result<EventStream> {
        let config = &state.llm_config;
        tracing::info!(
            model = %config.model,
            step = state.steps + 1,
            tools = self.tools.len(),
            "LLM_NODE: creating stream"
        );

        let mut options = ChatOptions::new().fallback_models(config.fallback_models.clone());
        if !self.tools.is_empty() {
            options = options.tools(self.tools.clone()).tool_choice(ToolChoice::auto());
        }
        if let Some(temp) = config.temperature {
            options = options.temperature(temp);
        }
        if let Some(max_tokens) = config.max_tokens {
            options = options.max_tokens(max_tokens);
        }

        let request = ChatRequest::new(config.model.clone(), state.messages.clone()).with_options(options);
        self.client.chat_stream(request).await
    }

    /// Forward every event to the client while accumulating the assistant turn
    async fn process_stream(&self, mut stream: EventStream, event_tx: EventSender) -> Result<StepOutput> {
        let mut content = String::new();
        let mut buffers: BTreeMap<u32, ToolCallBuffer> = BTreeMap::new();

        while let Some(event) = stream.next().await {
            let event = event?;

            match &event {
                contentport_llm::StreamEvent::Message { content: delta } => {
                    content.push_str(delta);
                }
                contentport_llm::StreamEvent::ToolCall {
                    index,
                    id,
                    name,
                    arguments,
                } => {
                    let entry = buffers.entry(*index).or_default();
                    if let Some(id) = id {
                        entry.id = Some(id.clone());
                    }
                    if let Some(name) = name {
                        entry.name = Some(name.clone());
                    }
                    if let Some(args) = arguments {
                        entry.arguments.push_str(args);
                    }
                }
                _ => {}
            }

            event_tx.send(event.into()).await?;
        }

        let tool_calls = buffers
            .into_values()
            .filter_map(|buffer| match (buffer.id, buffer.name) {
                (Some(id), Some(name)) => Some(ToolCall::new(id, name, buffer.arguments)),
                _ => None,
            })
            .collect();

        Ok(StepOutput {
            content,
            tool_calls,
        })
    }

    fn save_output(state: &mut GraphState, output: StepOutput) {
        if !output.tool_calls.is_empty() {
            state.add_message(Message::ai_with_tools(Some(output.content), output.tool_calls));
        } else if !output.content.is_empty() {
            state.add_message(Message::ai(output.content));
        }
    }
}

#[async_trait]
impl Node for LLMNode {
    async fn execute(&self, state: &mut GraphState, event_tx: EventSender) -> Result<()> {
        let stream = self.create_stream(state).await?;
        let output = self.process_stream(stream, event_tx).await?;

        Self::save_output(state, output);
        state.steps += 1;

        Ok(())
    }

    fn node_type(&self) -> NodeType {
        NodeType::LLM
    }
}
