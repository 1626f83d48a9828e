//! Stored chat messages to model messages.

use contentport_llm::{Content, ContentPart, Message, ToolCall};
use contentport_types::{ChatMessage, MessagePart, MessageRole};

/// Model input part of a stored message part; tool invocations have none
pub fn content_part(part: &MessagePart) -> Option<ContentPart> {
    match part {
        MessagePart::Text { text } => Some(ContentPart::text(text.clone())),
        MessagePart::File {
            media_type,
            url,
            filename,
        } => {
            if media_type.starts_with("image/") {
                Some(ContentPart::image(url.clone()))
            } else {
                let filename = filename.clone().unwrap_or_else(|| "file".to_string());
                Some(ContentPart::file(filename, url.clone()))
            }
        }
        MessagePart::ToolInvocation { .. } => None,
    }
}

fn user_content(message: &ChatMessage) -> Content {
    let parts: Vec<ContentPart> = message.parts.iter().filter_map(content_part).collect();
    match parts.as_slice() {
        [ContentPart::Text { text }] => Content::Text(text.clone()),
        _ => Content::Parts(parts),
    }
}

/// Assistant turn replayed as text, tool calls and tool results in part order
fn assistant_messages(message: &ChatMessage, out: &mut Vec<Message>) {
    let mut text = String::new();

    for part in &message.parts {
        match part {
            MessagePart::Text { text: chunk } => text.push_str(chunk),
            MessagePart::ToolInvocation {
                tool_call_id,
                tool_name,
                input,
                output,
                ..
            } => {
                let call = ToolCall::new(tool_call_id.clone(), tool_name.clone(), input.to_string());
                out.push(Message::ai_with_tools(
                    Some(std::mem::take(&mut text)),
                    vec![call],
                ));
                out.push(Message::tool_result(
                    tool_call_id.clone(),
                    output.clone().unwrap_or_default(),
                ));
            }
            MessagePart::File { .. } => {}
        }
    }

    if !text.is_empty() {
        out.push(Message::ai(text));
    }
}

/// System prompt followed by the stored history
pub fn to_model_messages(system_prompt: String, history: &[ChatMessage]) -> Vec<Message> {
    let mut messages = vec![Message::system(system_prompt)];

    for message in history {
        match message.role {
            MessageRole::User => messages.push(Message::human(user_content(message))),
            MessageRole::Assistant => assistant_messages(message, &mut messages),
            MessageRole::System => messages.push(Message::system(message.text())),
        }
    }

    messages
}
