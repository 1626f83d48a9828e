use contentport_types::{ChatMessage, MessagePart, StreamEvent, ToolInvocationState};

/// Folds the events of one chat run into the assistant message that is
/// appended to the stored history.
///
/// Text deltas are buffered and flushed into a text part whenever a tool
/// result arrives or a model step ends, so parts keep the order in which
/// the client rendered them.
pub struct TurnAccumulator {
    message_id: String,
    parts: Vec<MessagePart>,
    text_buffer: String,
    failed: bool,
}

impl TurnAccumulator {
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            parts: Vec::new(),
            text_buffer: String::new(),
            failed: false,
        }
    }

    pub fn push(&mut self, event: &StreamEvent) {
        match event {
            StreamEvent::Message { content } => {
                self.text_buffer.push_str(content);
            }
            StreamEvent::ToolResult {
                tool_call_id,
                tool_name,
                input,
                result,
                is_error,
                ..
            } => {
                self.flush_text();
                self.parts.push(MessagePart::ToolInvocation {
                    tool_call_id: tool_call_id.clone(),
                    tool_name: tool_name.clone(),
                    input: input.clone(),
                    output: Some(result.clone()),
                    state: if *is_error {
                        ToolInvocationState::OutputError
                    } else {
                        ToolInvocationState::OutputAvailable
                    },
                });
            }
            StreamEvent::Done { .. } => self.flush_text(),
            StreamEvent::Error { .. } => self.failed = true,
            _ => {}
        }
    }

    /// Whether the run hit a fatal error; failed turns are not persisted
    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn finish(mut self) -> ChatMessage {
        self.flush_text();
        ChatMessage::assistant(self.message_id, self.parts)
    }

    fn flush_text(&mut self) {
        if self.text_buffer.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.text_buffer);
        self.parts.push(MessagePart::Text { text });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentport_types::MessageRole;
    use serde_json::json;

    fn message(content: &str) -> StreamEvent {
        StreamEvent::Message {
            content: content.to_string(),
        }
    }

    #[test]
    fn test_parts_follow_event_order() {
        let mut acc = TurnAccumulator::new("msg_1");
        acc.push(&message("Let me "));
        acc.push(&message("write that."));
        acc.push(&StreamEvent::Done {
            finish_reason: Some("tool_calls".into()),
        });
        acc.push(&StreamEvent::ToolResult {
            tool_call_id: "call_1".into(),
            tool_name: "writeTweet".into(),
            input: json!({"instruction": "rust"}),
            result: "Rust is fun".into(),
            is_error: false,
            duration_ms: 12,
        });
        acc.push(&message("Done!"));

        assert!(!acc.failed());
        let msg = acc.finish();
        assert_eq!(msg.id, "msg_1");
        assert_eq!(msg.role, MessageRole::Assistant);
        assert_eq!(msg.parts.len(), 3);
        assert_eq!(msg.parts[0], MessagePart::text("Let me write that."));
        assert!(matches!(
            &msg.parts[1],
            MessagePart::ToolInvocation { state: ToolInvocationState::OutputAvailable, .. }
        ));
        assert_eq!(msg.parts[2], MessagePart::text("Done!"));
    }

    #[test]
    fn test_tool_error_and_fatal_error() {
        let mut acc = TurnAccumulator::new("msg_2");
        acc.push(&StreamEvent::ToolResult {
            tool_call_id: "call_1".into(),
            tool_name: "readWebsiteContent".into(),
            input: json!({}),
            result: "scrape failed".into(),
            is_error: true,
            duration_ms: 3,
        });
        acc.push(&StreamEvent::Error {
            message: "boom".into(),
            node_id: None,
        });

        assert!(acc.failed());
        let msg = acc.finish();
        assert!(matches!(
            &msg.parts[0],
            MessagePart::ToolInvocation { state: ToolInvocationState::OutputError, .. }
        ));
    }
}
