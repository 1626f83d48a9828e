use anyhow::Result;
use async_trait::async_trait;
use contentport_graph::{
    ChatTool, Graph, GraphConfig, GraphInput, LLMConfig, ReadWebsiteTool, StreamEvent,
    ToolCallContext, ToolRegistry, WriteTweetContext, WriteTweetTool,
};
use contentport_integrations::{
    MediaUpload, NewTweet, PostedTweet, ScrapedPage, TweetAuthorInfo, TweetLookup, TwitterApi,
    TwitterUser, UserTokens, WebScraper,
};
use contentport_llm::{ChatClient, ChatRequest, ChatResponse, EventStream, Message, Tool};
use contentport_persist::{GeneratedThreadRepository, InMemoryStore, KeyValueStore, WebsiteContentRepository};
use contentport_types::ToolOutputStatus;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

type LlmEvent = contentport_llm::StreamEvent;

/// Replays one scripted stream per request and records the requests
#[derive(Default)]
struct ScriptedClient {
    scripts: Mutex<VecDeque<Vec<LlmEvent>>>,
    requests: Mutex<Vec<ChatRequest>>,
    repeat_last: bool,
}

impl ScriptedClient {
    fn new(scripts: Vec<Vec<LlmEvent>>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            ..Default::default()
        }
    }

    fn repeating(script: Vec<LlmEvent>) -> Self {
        Self {
            scripts: Mutex::new(vec![script].into()),
            repeat_last: true,
            ..Default::default()
        }
    }

    fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse> {
        anyhow::bail!("not scripted")
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<EventStream> {
        self.requests.lock().unwrap().push(request);
        let script = {
            let mut scripts = self.scripts.lock().unwrap();
            if self.repeat_last && scripts.len() == 1 {
                scripts.front().cloned()
            } else {
                scripts.pop_front()
            }
        };
        let script = script.ok_or_else(|| anyhow::anyhow!("upstream unavailable"))?;
        Ok(Box::pin(futures::stream::iter(script.into_iter().map(Ok))))
    }
}

fn text(content: &str) -> LlmEvent {
    LlmEvent::Message {
        content: content.into(),
    }
}

fn done(reason: &str) -> LlmEvent {
    LlmEvent::Done {
        finish_reason: Some(reason.into()),
    }
}

fn tool_call(id: &str, name: &str, arguments: &str) -> Vec<LlmEvent> {
    vec![
        LlmEvent::ToolCall {
            index: 0,
            id: Some(id.into()),
            name: Some(name.into()),
            arguments: Some(String::new()),
        },
        LlmEvent::ToolCall {
            index: 0,
            id: None,
            name: None,
            arguments: Some(arguments.into()),
        },
        done("tool_calls"),
    ]
}

struct EchoTool;

#[async_trait]
impl ChatTool for EchoTool {
    fn definition(&self) -> Tool {
        Tool::new("echo", "Echo the input", json!({"type": "object"}))
    }

    async fn call(&self, arguments: Value, _ctx: &ToolCallContext) -> Result<String> {
        Ok(format!("echo: {}", arguments["text"].as_str().unwrap_or_default()))
    }
}

struct FailingTool;

#[async_trait]
impl ChatTool for FailingTool {
    fn definition(&self) -> Tool {
        Tool::new("fail", "Always fails", json!({"type": "object"}))
    }

    async fn call(&self, _arguments: Value, _ctx: &ToolCallContext) -> Result<String> {
        anyhow::bail!("site unreachable")
    }
}

fn input() -> GraphInput {
    GraphInput::new(
        "chat_1",
        vec![Message::system("be brief"), Message::human("hi")],
        LLMConfig::default(),
    )
}

async fn collect(mut rx: mpsc::Receiver<StreamEvent>) -> Vec<StreamEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_plain_answer_streams_and_ends() {
    let client = Arc::new(ScriptedClient::new(vec![vec![text("Hel"), text("lo"), done("stop")]]));
    let graph = Graph::new(client.clone(), GraphConfig::default());

    let events = collect(graph.spawn_run(input(), ToolRegistry::new())).await;

    assert!(matches!(events.first(), Some(StreamEvent::InitStream { chat_id, .. }) if chat_id == "chat_1"));
    assert_eq!(events[1], StreamEvent::Message { content: "Hel".into() });
    assert!(matches!(events.last(), Some(StreamEvent::EndStream { status, .. }) if status == "success"));

    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].options.tools.is_none());
    assert_eq!(requests[0].options.fallback_models, vec!["openai/gpt-4o".to_string()]);
}

#[tokio::test]
async fn test_tool_round_trip() {
    let client = Arc::new(ScriptedClient::new(vec![
        tool_call("call_1", "echo", r#"{"text":"ping"}"#),
        vec![text("done"), done("stop")],
    ]));
    let graph = Graph::new(client.clone(), GraphConfig::default());
    let tools = ToolRegistry::new().with(Arc::new(EchoTool));

    let events = collect(graph.spawn_run(input(), tools)).await;

    let result = events
        .iter()
        .find_map(|event| match event {
            StreamEvent::ToolResult {
                tool_name,
                input,
                result,
                is_error,
                ..
            } => Some((tool_name.clone(), input.clone(), result.clone(), *is_error)),
            _ => None,
        })
        .unwrap();
    assert_eq!(result, ("echo".into(), json!({"text": "ping"}), "echo: ping".into(), false));

    let requests = client.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].options.tools.is_some());
    assert_eq!(
        requests[1].messages.last(),
        Some(&Message::tool_result("call_1", "echo: ping"))
    );
    assert!(matches!(events.last(), Some(StreamEvent::EndStream { .. })));
}

#[tokio::test]
async fn test_tool_failure_is_returned_to_the_model() {
    let client = Arc::new(ScriptedClient::new(vec![
        tool_call("call_1", "fail", "{}"),
        vec![text("sorry, that page is down"), done("stop")],
    ]));
    let graph = Graph::new(client.clone(), GraphConfig::default());
    let tools = ToolRegistry::new().with(Arc::new(FailingTool));

    let events = collect(graph.spawn_run(input(), tools)).await;

    assert!(events.iter().any(|event| matches!(
        event,
        StreamEvent::ToolResult { is_error: true, result, .. } if result.contains("site unreachable")
    )));
    assert!(!events.iter().any(|event| matches!(event, StreamEvent::Error { .. })));
    assert_eq!(client.requests().len(), 2);
}

#[tokio::test]
async fn test_unknown_tool_is_an_error_result() {
    let client = Arc::new(ScriptedClient::new(vec![
        tool_call("call_1", "nope", "{}"),
        vec![done("stop")],
    ]));
    let graph = Graph::new(client, GraphConfig::default());

    let events = collect(graph.spawn_run(input(), ToolRegistry::new().with(Arc::new(EchoTool)))).await;

    assert!(events.iter().any(|event| matches!(
        event,
        StreamEvent::ToolResult { is_error: true, result, .. } if result.contains("Unknown tool: nope")
    )));
}

#[tokio::test]
async fn test_step_limit_stops_the_loop() {
    let client = Arc::new(ScriptedClient::repeating(tool_call("call_x", "echo", "{}")));
    let graph = Graph::new(client.clone(), GraphConfig::default().with_max_steps(2));

    let events = collect(graph.spawn_run(input(), ToolRegistry::new().with(Arc::new(EchoTool)))).await;

    assert_eq!(client.requests().len(), 2);
    let tool_results = events
        .iter()
        .filter(|event| matches!(event, StreamEvent::ToolResult { .. }))
        .count();
    assert_eq!(tool_results, 2);
    assert!(matches!(events.last(), Some(StreamEvent::EndStream { .. })));
}

#[tokio::test]
async fn test_upstream_failure_emits_terminal_error() {
    let client = Arc::new(ScriptedClient::new(Vec::new()));
    let graph = Graph::new(client, GraphConfig::default());

    let events = collect(graph.spawn_run(input(), ToolRegistry::new())).await;

    assert_eq!(events.len(), 2);
    assert!(matches!(&events[1], StreamEvent::Error { message, .. } if message.contains("upstream unavailable")));
    assert!(events[1].is_terminal());
}

#[test]
fn test_builder_requires_client() {
    assert!(Graph::builder().build().is_err());
}

fn write_context() -> WriteTweetContext {
    WriteTweetContext {
        chat_id: "chat_1".into(),
        generation_id: "gen_1".into(),
        email: "writer@example.com".into(),
        account_id: "acc_1".into(),
        user_message: "thread about rust".into(),
        drafts: Vec::new(),
        attachments: Vec::new(),
    }
}

#[tokio::test]
async fn test_write_tweet_streams_tool_output() {
    let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new());
    let writer_client = Arc::new(ScriptedClient::new(vec![vec![
        text("first tweet\n"),
        text("---\nsecond tweet"),
        done("stop"),
    ]]));
    let tool = WriteTweetTool::new(
        writer_client.clone(),
        LLMConfig::default(),
        write_context(),
        store.clone(),
    );

    let (tx, rx) = mpsc::channel(32);
    let ctx = ToolCallContext {
        tool_call_id: "call_1".into(),
        events: tx,
    };
    let result = tool
        .call(json!({"instruction": "a two tweet thread"}), &ctx)
        .await
        .unwrap();
    drop(ctx);

    assert_eq!(result, "first tweet\n---\nsecond tweet");

    let statuses: Vec<(ToolOutputStatus, u32)> = collect(rx)
        .await
        .into_iter()
        .filter_map(|event| match event {
            StreamEvent::ToolOutput { status, index, .. } => Some((status, index)),
            _ => None,
        })
        .collect();
    assert_eq!(
        statuses,
        vec![
            (ToolOutputStatus::Processing, 0),
            (ToolOutputStatus::Streaming, 0),
            (ToolOutputStatus::Streaming, 1),
            (ToolOutputStatus::Complete, 1),
        ]
    );

    let saved = GeneratedThreadRepository::new(store)
        .get("chat_1", "gen_1")
        .await
        .unwrap();
    assert_eq!(saved, vec!["first tweet", "second tweet"]);

    let request = &writer_client.requests()[0];
    assert!(request.messages[1].text().contains("<instruction>a two tweet thread</instruction>"));
}

struct FakeScraper;

#[async_trait]
impl WebScraper for FakeScraper {
    async fn scrape(&self, url: &str) -> contentport_integrations::Result<ScrapedPage> {
        Ok(ScrapedPage {
            url: url.to_string(),
            markdown: "# Post\nbody".into(),
            title: None,
            description: None,
        })
    }
}

struct FakeTwitter;

#[async_trait]
impl TwitterApi for FakeTwitter {
    async fn current_user(&self, _tokens: &UserTokens) -> contentport_integrations::Result<TwitterUser> {
        unimplemented!()
    }

    async fn lookup_tweet(&self, tweet_id: &str) -> contentport_integrations::Result<Option<TweetLookup>> {
        Ok(Some(TweetLookup {
            id: tweet_id.to_string(),
            text: "launch day https://t.co/xyz".into(),
            note_text: None,
            created_at: None,
            author_id: Some("42".into()),
            edit_history_tweet_ids: Vec::new(),
            author: Some(TweetAuthorInfo {
                id: "42".into(),
                username: "writer".into(),
                name: "Writer".into(),
                profile_image_url: None,
            }),
        }))
    }

    async fn upload_media(&self, _tokens: &UserTokens, _upload: MediaUpload) -> contentport_integrations::Result<String> {
        unimplemented!()
    }

    async fn post_tweet(&self, _tokens: &UserTokens, _tweet: NewTweet) -> contentport_integrations::Result<PostedTweet> {
        unimplemented!()
    }
}

#[tokio::test]
async fn test_read_website_caches_pages_and_tweets() {
    let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new());
    let tool = ReadWebsiteTool::new("chat_1", Arc::new(FakeScraper), Arc::new(FakeTwitter), store.clone());
    let (tx, _rx) = mpsc::channel(4);
    let ctx = ToolCallContext {
        tool_call_id: "call_1".into(),
        events: tx,
    };

    let page: Value = serde_json::from_str(
        &tool
            .call(json!({"website_url": "https://blog.example/post"}), &ctx)
            .await
            .unwrap(),
    )
    .unwrap();
    assert_eq!(page["title"], "blog.example");
    assert_eq!(page["content"], "# Post\nbody");

    let tweet: Value = serde_json::from_str(
        &tool
            .call(json!({"website_url": "https://x.com/writer/status/123"}), &ctx)
            .await
            .unwrap(),
    )
    .unwrap();
    assert_eq!(tweet["title"], "Tweet by @writer");
    assert_eq!(tweet["content"], "launch day");

    let cached = WebsiteContentRepository::new(store).list("chat_1").await.unwrap();
    assert_eq!(cached.len(), 2);

    assert!(tool.call(json!({"website_url": "not a url"}), &ctx).await.is_err());
}
