use anyhow::{anyhow, Result};
use contentport_llm::ChatClient;
use contentport_types::GraphConfig;
use std::sync::Arc;

use crate::graph::Graph;

/// Builder for constructing a Graph
pub struct GraphBuilder {
    llm_client: Option<Arc<dyn ChatClient>>,
    config: GraphConfig,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            llm_client: None,
            config: GraphConfig::default(),
        }
    }

    pub fn llm_client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.llm_client = Some(client);
        self
    }

    pub fn config(mut self, config: GraphConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Graph> {
        let llm_client = self
            .llm_client
            .ok_or_else(|| anyhow!("LLM client is required"))?;
        if self.config.max_steps == 0 {
            return Err(anyhow!("max_steps must be at least 1"));
        }

        Ok(Graph::new(llm_client, self.config))
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
