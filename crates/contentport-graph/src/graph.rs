use crate::node::{Node, NodeType};
use crate::nodes::{LLMNode, ToolNode};
use crate::router::{NextNode, Router, SimpleRouter};
use crate::tools::ToolRegistry;
use anyhow::Result;
use contentport_llm::ChatClient;
use contentport_types::{GraphConfig, GraphInput, GraphState, StreamEvent};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

const EVENT_BUFFER: usize = 1000;

pub struct Graph {
    llm_client: Arc<dyn ChatClient>,
    config: GraphConfig,
}

impl Graph {
    pub fn new(llm_client: Arc<dyn ChatClient>, config: GraphConfig) -> Self {
        Self { llm_client, config }
    }

    pub fn builder() -> crate::builder::GraphBuilder {
        crate::builder::GraphBuilder::new()
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Spawn execution in background, return event receiver.
    ///
    /// The stream ends with `end_stream` on success or a single `error`
    /// event when the run fails or exceeds the execution timeout.
    pub fn spawn_run(&self, input: GraphInput, tools: ToolRegistry) -> mpsc::Receiver<StreamEvent> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        let llm_client = Arc::clone(&self.llm_client);
        let config = self.config.clone();

        tokio::spawn(async move {
            let timeout = config.execution_timeout;
            let run = Self::execute_loop(input, tools, tx.clone(), llm_client, config);

            let message = match tokio::time::timeout(timeout, run).await {
                Ok(Ok(())) => return,
                Ok(Err(e)) => e.to_string(),
                Err(_) => format!("Run timed out after {}s", timeout.as_secs()),
            };

            tracing::error!(error = %message, "chat run failed");
            let _ = tx
                .send(StreamEvent::Error {
                    message,
                    node_id: None,
                })
                .await;
        });

        rx
    }

    async fn execute_loop(
        input: GraphInput,
        tools: ToolRegistry,
        event_tx: mpsc::Sender<StreamEvent>,
        llm_client: Arc<dyn ChatClient>,
        config: GraphConfig,
    ) -> Result<()> {
        let start_time = Instant::now();
        let message_id = input.message_id.clone();
        let mut state = GraphState::from_input(input);

        event_tx
            .send(StreamEvent::InitStream {
                run_id: state.run_id.clone(),
                chat_id: state.chat_id.clone(),
                message_id,
                timestamp: chrono::Utc::now().timestamp_millis(),
            })
            .await?;

        let llm_node = LLMNode::new(llm_client, tools.definitions());
        let tool_node = ToolNode::new(tools);
        let router = SimpleRouter::new(config.max_steps);

        let mut current_node = NodeType::LLM;

        loop {
            let node_start = Instant::now();

            match current_node {
                NodeType::LLM => llm_node.execute(&mut state, event_tx.clone()).await?,
                NodeType::Tool => tool_node.execute(&mut state, event_tx.clone()).await?,
            }

            tracing::debug!(
                run_id = %state.run_id,
                node = ?current_node,
                step = state.steps,
                duration_ms = node_start.elapsed().as_millis() as u64,
                "node finished"
            );

            match router.next(&state, current_node) {
                NextNode::End => break,
                NextNode::LLM => current_node = NodeType::LLM,
                NextNode::Tool => current_node = NodeType::Tool,
            }
        }

        event_tx
            .send(StreamEvent::EndStream {
                status: "success".to_string(),
                total_duration_ms: start_time.elapsed().as_millis() as u64,
            })
            .await?;

        Ok(())
    }
}
