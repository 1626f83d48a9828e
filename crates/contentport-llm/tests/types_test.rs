use contentport_llm::{Content, ContentPart, Message, Tool, ToolCall, ToolChoice};
use serde_json::json;

#[test]
fn test_content_text_creation() {
    let content = Content::text("Hello, world!");
    assert_eq!(content.as_text(), Some("Hello, world!"));
}

#[test]
fn test_multipart_content_is_not_plain_text() {
    let content = Content::Parts(vec![
        ContentPart::text("caption"),
        ContentPart::image("https://cdn.example.com/a.png"),
    ]);
    assert_eq!(content.as_text(), None);
    assert_eq!(content.joined_text(), "caption");
}

#[test]
fn test_message_roles() {
    assert_eq!(Message::system("You are helpful").role(), "system");
    assert_eq!(Message::human("Hello").role(), "user");
    assert_eq!(Message::ai("Hi there!").role(), "assistant");
    assert_eq!(Message::tool_result("call_123", "42").role(), "tool");
}

#[test]
fn test_message_serialization_human() {
    let msg = Message::human("Hello");
    let json = serde_json::to_string(&msg).unwrap();
    assert!(json.contains("\"role\":\"user\""));
    assert!(json.contains("Hello"));
}

#[test]
fn test_message_deserialization_with_parts() {
    let json = r#"{"role":"user","content":[{"type":"text","text":"a"},{"type":"image_url","image_url":{"url":"https://x/y.png"}}]}"#;
    let msg: Message = serde_json::from_str(json).unwrap();

    match msg {
        Message::Human { content: Content::Parts(parts) } => assert_eq!(parts.len(), 2),
        other => panic!("unexpected message {:?}", other),
    }
}

#[test]
fn test_ai_with_tools_drops_empty_text() {
    let msg = Message::ai_with_tools(Some(String::new()), vec![ToolCall::new("c", "writeTweet", "{}")]);
    match msg {
        Message::AI { content, tool_calls } => {
            assert!(content.is_none());
            assert_eq!(tool_calls.unwrap().len(), 1);
        }
        other => panic!("unexpected message {:?}", other),
    }
}

#[test]
fn test_tool_serialization() {
    let tool = Tool::new(
        "readWebsiteContent",
        "Read a page",
        json!({"type": "object", "properties": {"website_url": {"type": "string"}}}),
    );

    let value = serde_json::to_value(&tool).unwrap();
    assert_eq!(value["type"], "function");
    assert_eq!(value["function"]["name"], "readWebsiteContent");
    assert_eq!(tool.name(), "readWebsiteContent");
}

#[test]
fn test_tool_call_arguments() {
    let call = ToolCall::new("call_1", "readWebsiteContent", r#"{"website_url":"https://a.b"}"#);
    let args = call.arguments_value().unwrap();
    assert_eq!(args["website_url"], "https://a.b");

    let empty = ToolCall::new("call_2", "writeTweet", "");
    assert_eq!(empty.arguments_value().unwrap(), json!({}));
}

#[test]
fn test_tool_choice_serialization() {
    assert_eq!(serde_json::to_value(ToolChoice::auto()).unwrap(), json!("auto"));
    assert_eq!(
        serde_json::to_value(ToolChoice::force("writeTweet")).unwrap(),
        json!({"type": "function", "function": {"name": "writeTweet"}})
    );
}
