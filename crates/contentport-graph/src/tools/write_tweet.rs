use anyhow::Result;
use async_trait::async_trait;
use contentport_llm::{
    ChatClient, ChatOptions, ChatRequest, Content, ContentPart, Message, Tool,
};
use contentport_persist::{
    AccountRepository, GeneratedThreadRepository, KeyValueStore, StyleRepository,
    WebsiteContentRepository,
};
use contentport_types::{DraftTweet, LLMConfig, StreamEvent, ToolOutputStatus};
use futures::StreamExt;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{ChatTool, ToolCallContext};
use crate::prompt::{tweet_writer_prompt, writer_request, THREAD_SEPARATOR};

pub const WRITE_TWEET: &str = "writeTweet";

/// What the writer knows about the turn that triggered it
#[derive(Debug, Clone)]
pub struct WriteTweetContext {
    pub chat_id: String,
    /// Key of the generated thread for this turn
    pub generation_id: String,
    pub email: String,
    pub account_id: String,
    pub user_message: String,
    pub drafts: Vec<DraftTweet>,
    /// Parsed attachments of the user message (documents, images)
    pub attachments: Vec<ContentPart>,
}

/// Writes tweets with a nested completion and streams them as `tool_output` events
pub struct WriteTweetTool {
    client: Arc<dyn ChatClient>,
    llm_config: LLMConfig,
    context: WriteTweetContext,
    styles: StyleRepository,
    accounts: AccountRepository,
    websites: WebsiteContentRepository,
    threads: GeneratedThreadRepository,
}

/// Tweets of writer output, split on the thread separator
pub fn split_thread(text: &str) -> Vec<String> {
    text.split(THREAD_SEPARATOR)
        .map(str::trim)
        .filter(|tweet| !tweet.is_empty())
        .map(str::to_string)
        .collect()
}

impl WriteTweetTool {
    pub fn new(
        client: Arc<dyn ChatClient>,
        llm_config: LLMConfig,
        context: WriteTweetContext,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            client,
            llm_config,
            context,
            styles: StyleRepository::new(store.clone()),
            accounts: AccountRepository::new(store.clone()),
            websites: WebsiteContentRepository::new(store.clone()),
            threads: GeneratedThreadRepository::new(store),
        }
    }

    async fn build_messages(&self, instruction: &str) -> Result<Vec<Message>> {
        let ctx = &self.context;
        let style = self.styles.get(&ctx.email, &ctx.account_id).await?;
        let account = self.accounts.active(&ctx.email).await?;
        let websites = self.websites.list(&ctx.chat_id).await?;

        let request = writer_request(instruction, &ctx.user_message, &ctx.drafts, &websites);
        let content = if ctx.attachments.is_empty() {
            Content::Text(request)
        } else {
            let mut parts = vec![ContentPart::text(request)];
            parts.extend(ctx.attachments.iter().cloned());
            Content::Parts(parts)
        };

        Ok(vec![
            Message::system(tweet_writer_prompt(style.as_ref(), account.as_ref())),
            Message::human(content),
        ])
    }

    async fn emit(
        &self,
        call: &ToolCallContext,
        text: &str,
        status: ToolOutputStatus,
    ) -> Result<()> {
        call.events
            .send(StreamEvent::ToolOutput {
                tool_call_id: call.tool_call_id.clone(),
                text: text.to_string(),
                index: text.matches(THREAD_SEPARATOR).count() as u32,
                status,
            })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ChatTool for WriteTweetTool {
    fn definition(&self) -> Tool {
        Tool::new(
            WRITE_TWEET,
            "Write a new tweet or thread, or edit the tweets currently open in the editor.",
            json!({
                "type": "object",
                "properties": {
                    "instruction": {
                        "type": "string",
                        "description": "What to write or change, in the user's words plus any context you gathered"
                    }
                },
                "required": ["instruction"]
            }),
        )
    }

    async fn call(&self, arguments: Value, ctx: &ToolCallContext) -> Result<String> {
        let instruction = arguments
            .get("instruction")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.context.user_message)
            .to_string();

        self.emit(ctx, "", ToolOutputStatus::Processing).await?;

        let messages = self.build_messages(&instruction).await?;
        let mut options = ChatOptions::new().fallback_models(self.llm_config.fallback_models.clone());
        if let Some(temp) = self.llm_config.temperature {
            options = options.temperature(temp);
        }
        if let Some(max_tokens) = self.llm_config.max_tokens {
            options = options.max_tokens(max_tokens);
        }

        let request = ChatRequest::new(self.llm_config.model.clone(), messages).with_options(options);
        let mut stream = self.client.chat_stream(request).await?;

        let mut text = String::new();
        while let Some(event) = stream.next().await {
            if let contentport_llm::StreamEvent::Message { content } = event? {
                text.push_str(&content);
                self.emit(ctx, &text, ToolOutputStatus::Streaming).await?;
            }
        }

        let text = text.trim().to_string();
        self.emit(ctx, &text, ToolOutputStatus::Complete).await?;

        let tweets = split_thread(&text);
        self.threads
            .save(&self.context.chat_id, &self.context.generation_id, &tweets)
            .await?;

        tracing::debug!(
            chat_id = %self.context.chat_id,
            tweets = tweets.len(),
            "tweet writer finished"
        );

        Ok(text)
    }
}
