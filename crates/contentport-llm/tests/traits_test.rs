use contentport_llm::{ChatOptions, ChatRequest, Message, Tool, ToolChoice};
use serde_json::json;

#[test]
fn test_chat_request_creation() {
    let request = ChatRequest::new("openai/gpt-4.1", vec![Message::human("Hello")]);

    assert_eq!(request.model, "openai/gpt-4.1");
    assert_eq!(request.messages.len(), 1);
    assert!(request.options.fallback_models.is_empty());
}

#[test]
fn test_chat_options_builder() {
    let options = ChatOptions::new()
        .temperature(0.5)
        .max_tokens(200)
        .tools(vec![Tool::new("test", "Test tool", json!({"type": "object"}))])
        .tool_choice(ToolChoice::auto())
        .fallback_models(vec!["openai/gpt-4o".into()]);

    assert_eq!(options.temperature, Some(0.5));
    assert_eq!(options.max_tokens, Some(200));
    assert!(options.tools.is_some());
    assert_eq!(options.tool_choice, Some(ToolChoice::auto()));
    assert_eq!(options.fallback_models, vec!["openai/gpt-4o".to_string()]);
}

#[test]
fn test_chat_options_default() {
    let options = ChatOptions::default();

    assert_eq!(options.temperature, None);
    assert_eq!(options.max_tokens, None);
    assert!(options.tools.is_none());
    assert!(options.tool_choice.is_none());
}
