use crate::node::NodeType;
use contentport_types::GraphState;

/// Decides which node to execute next based on current state
pub trait Router: Send + Sync {
    fn next(&self, state: &GraphState, current: NodeType) -> NextNode;
}

#[derive(Debug, Clone, PartialEq)]
pub enum NextNode {
    LLM,
    Tool,
    End,
}

/// LLM -> Tool (if tool calls present) -> LLM -> ... -> END
///
/// A step is one model call plus the tools it requested. Once `max_steps`
/// steps ran, the results of the last tool round are kept but the model is
/// not called again.
pub struct SimpleRouter {
    max_steps: usize,
}

impl SimpleRouter {
    pub fn new(max_steps: usize) -> Self {
        Self { max_steps }
    }
}

impl Router for SimpleRouter {
    fn next(&self, state: &GraphState, current: NodeType) -> NextNode {
        match current {
            NodeType::LLM => {
                if state.has_pending_tool_calls() {
                    NextNode::Tool
                } else {
                    NextNode::End
                }
            }
            NodeType::Tool => {
                if state.steps >= self.max_steps {
                    NextNode::End
                } else {
                    NextNode::LLM
                }
            }
        }
    }
}
