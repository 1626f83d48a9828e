use crate::config::LLMConfig;
use contentport_llm::{Message, ToolCall};

#[derive(Debug, Clone)]
pub struct GraphState {
    pub chat_id: String,
    pub run_id: String,
    pub messages: Vec<Message>,
    pub llm_config: LLMConfig,
    /// Model steps taken so far
    pub steps: usize,
}

impl GraphState {
    pub fn from_input(input: GraphInput) -> Self {
        Self {
            chat_id: input.chat_id,
            run_id: uuid::Uuid::new_v4().to_string(),
            messages: input.messages,
            llm_config: input.llm_config,
            steps: 0,
        }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn has_pending_tool_calls(&self) -> bool {
        matches!(
            self.last_message(),
            Some(Message::AI { tool_calls: Some(calls), .. }) if !calls.is_empty()
        )
    }

    pub fn get_pending_tool_calls(&self) -> Vec<ToolCall> {
        match self.last_message() {
            Some(Message::AI {
                tool_calls: Some(calls),
                ..
            }) => calls.clone(),
            _ => Vec::new(),
        }
    }

    pub fn add_tool_result(&mut self, tool_call_id: String, result: String) {
        self.messages.push(Message::tool_result(tool_call_id, result));
    }
}

#[derive(Debug, Clone)]
pub struct GraphInput {
    pub chat_id: String,
    /// Id the assistant message will be stored under
    pub message_id: String,
    pub messages: Vec<Message>,
    pub llm_config: LLMConfig,
}

impl GraphInput {
    pub fn new(chat_id: impl Into<String>, messages: Vec<Message>, llm_config: LLMConfig) -> Self {
        Self {
            chat_id: chat_id.into(),
            message_id: format!("msg_{}", uuid::Uuid::new_v4().simple()),
            messages,
            llm_config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_tool_calls() {
        let mut state = GraphState::from_input(GraphInput::new(
            "chat_1",
            vec![Message::human("hi")],
            LLMConfig::default(),
        ));
        assert!(!state.has_pending_tool_calls());

        state.add_message(Message::ai_with_tools(
            None,
            vec![ToolCall::new("call_1", "writeTweet", "{}")],
        ));
        assert!(state.has_pending_tool_calls());
        assert_eq!(state.get_pending_tool_calls()[0].id, "call_1");

        state.add_tool_result("call_1".into(), "done".into());
        assert!(!state.has_pending_tool_calls());
    }

    #[test]
    fn test_message_id_prefix() {
        let input = GraphInput::new("c", Vec::new(), LLMConfig::default());
        assert!(input.message_id.starts_with("msg_"));
    }
}
