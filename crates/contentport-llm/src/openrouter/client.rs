// OpenAI-compatible chat completions over HTTP, aimed at the OpenRouter gateway

use crate::buffer_utils::parse_sse_stream;
use crate::streaming::ChatChunkParser;
use crate::traits::{ChatClient, ChatOptions, ChatRequest, ChatResponse, EventStream, TokenUsage};
use crate::types::{Content, ContentPart, Message, ToolCall};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Map, Value};

pub const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";

/// Chat client for any OpenAI-compatible `/chat/completions` endpoint
pub struct OpenRouterClient {
    http_client: reqwest::Client,
    base_url: String,
}

#[derive(Default)]
pub struct OpenRouterClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    referer: Option<String>,
    app_title: Option<String>,
}

impl OpenRouterClientBuilder {
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sent as `HTTP-Referer` for gateway attribution
    pub fn referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    /// Sent as `X-Title` for gateway attribution
    pub fn app_title(mut self, title: impl Into<String>) -> Self {
        self.app_title = Some(title.into());
        self
    }

    pub fn build(self) -> Result<OpenRouterClient> {
        let api_key = self.api_key.context("API key is required")?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .context("Invalid API key format")?,
        );
        if let Some(referer) = self.referer {
            headers.insert(
                HeaderName::from_static("http-referer"),
                HeaderValue::from_str(&referer).context("Invalid referer header")?,
            );
        }
        if let Some(title) = self.app_title {
            headers.insert(
                HeaderName::from_static("x-title"),
                HeaderValue::from_str(&title).context("Invalid title header")?,
            );
        }

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(OpenRouterClient {
            http_client,
            base_url: self
                .base_url
                .unwrap_or_else(|| OPENROUTER_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

impl OpenRouterClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder().api_key(api_key).build()
    }

    pub fn builder() -> OpenRouterClientBuilder {
        OpenRouterClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_chat_request(
        &self,
        model: &str,
        messages: Vec<Message>,
        options: &ChatOptions,
        stream: bool,
    ) -> Result<Value> {
        let messages: Vec<Value> = messages
            .into_iter()
            .map(convert_message)
            .collect::<Result<Vec<_>>>()?;

        let mut obj = Map::new();
        obj.insert("model".to_string(), json!(model));
        obj.insert("messages".to_string(), Value::Array(messages));
        obj.insert("stream".to_string(), json!(stream));

        if stream {
            obj.insert("stream_options".to_string(), json!({ "include_usage": true }));
        }
        if !options.fallback_models.is_empty() {
            let mut models = vec![model.to_string()];
            models.extend(options.fallback_models.iter().cloned());
            obj.insert("models".to_string(), json!(models));
        }
        if let Some(temp) = options.temperature {
            obj.insert("temperature".to_string(), json!(temp));
        }
        if let Some(max_tokens) = options.max_tokens {
            obj.insert("max_tokens".to_string(), json!(max_tokens));
        }
        if let Some(tools) = &options.tools {
            if !tools.is_empty() {
                obj.insert("tools".to_string(), serde_json::to_value(tools)?);
            }
        }
        if let Some(tool_choice) = &options.tool_choice {
            obj.insert("tool_choice".to_string(), serde_json::to_value(tool_choice)?);
        }

        Ok(Value::Object(obj))
    }

    async fn post_completions(&self, payload: &Value) -> Result<reqwest::Response> {
        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .json(payload)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("LLM gateway error ({}): {}", status, error_text);
        }

        Ok(response)
    }
}

fn convert_message(message: Message) -> Result<Value> {
    match message {
        Message::System { content } => Ok(json!({
            "role": "system",
            "content": convert_content(content),
        })),
        Message::Human { content } => Ok(json!({
            "role": "user",
            "content": convert_content(content),
        })),
        Message::AI { content, tool_calls } => {
            let mut map = Map::new();
            map.insert("role".to_string(), json!("assistant"));
            map.insert(
                "content".to_string(),
                content.map(convert_content).unwrap_or(Value::Null),
            );
            if let Some(tool_calls) = tool_calls {
                map.insert("tool_calls".to_string(), serde_json::to_value(tool_calls)?);
            }
            Ok(Value::Object(map))
        }
        Message::Tool { tool_call_id, content } => Ok(json!({
            "role": "tool",
            "tool_call_id": tool_call_id,
            "content": content.joined_text(),
        })),
    }
}

fn convert_content(content: Content) -> Value {
    match content {
        Content::Text(s) => json!(s),
        Content::Parts(parts) => Value::Array(
            parts
                .into_iter()
                .map(|part| match part {
                    ContentPart::Text { text } => json!({ "type": "text", "text": text }),
                    ContentPart::ImageUrl { image_url } => {
                        json!({ "type": "image_url", "image_url": image_url })
                    }
                    ContentPart::File { file } => json!({ "type": "file", "file": file }),
                })
                .collect(),
        ),
    }
}

#[async_trait]
impl ChatClient for OpenRouterClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let payload =
            self.build_chat_request(&request.model, request.messages, &request.options, false)?;

        tracing::debug!(model = %request.model, "chat completion");
        let response = self.post_completions(&payload).await?;

        let raw: CompletionResponse = response
            .json()
            .await
            .context("Failed to parse response")?;

        let choice = raw.choices.into_iter().next();
        let finish_reason = choice.as_ref().and_then(|c| c.finish_reason.clone());
        let (content, tool_calls) = match choice {
            Some(c) => (c.message.content, c.message.tool_calls),
            None => (None, None),
        };

        Ok(ChatResponse {
            content,
            tool_calls,
            usage: raw.usage.map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason,
            model: raw.model,
        })
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<EventStream> {
        let payload =
            self.build_chat_request(&request.model, request.messages, &request.options, true)?;

        tracing::debug!(model = %request.model, "streaming chat completion");
        let response = self.post_completions(&payload).await?;

        Ok(parse_sse_stream(response.bytes_stream(), ChatChunkParser))
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
