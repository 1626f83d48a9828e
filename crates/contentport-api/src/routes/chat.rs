use axum::{
    extract::State,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use contentport_graph::prompt::{enhance_prompt_request, ENHANCE_PROMPT_SYSTEM};
use contentport_llm::{ChatOptions, ChatRequest, Message};
use contentport_persist::{repositories::chat::HISTORY_LIST_LIMIT, User};
use contentport_types::{ChatHistoryItem, ChatMessage};

use crate::{
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiQuery},
    state::AppState,
};

const ENHANCE_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Deserialize)]
pub struct MessageHistoryQuery {
    #[serde(default)]
    pub chat_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageHistoryResponse {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ChatHistoryResponse {
    pub chat_history: Vec<ChatHistoryItem>,
}

#[derive(Debug, Deserialize)]
pub struct EnhancePromptRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct EnhancePromptResponse {
    pub enhanced_text: String,
    pub success: bool,
}

/// Stored messages of a chat; empty for a missing or unknown chat
pub async fn get_message_history(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<MessageHistoryQuery>,
) -> ApiResult<Json<MessageHistoryResponse>> {
    let messages = match query.chat_id.as_deref().filter(|id| !id.is_empty()) {
        Some(chat_id) => state.chats().get_messages(chat_id).await?,
        None => Vec::new(),
    };

    Ok(Json(MessageHistoryResponse { messages }))
}

pub async fn history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> ApiResult<Json<ChatHistoryResponse>> {
    let mut chat_history = state.chats().list_index(&user.email).await?;
    chat_history.truncate(HISTORY_LIST_LIMIT);

    Ok(Json(ChatHistoryResponse { chat_history }))
}

/// Rewrites a prompt into a more specific one for the tweet writer
pub async fn enhance_prompt(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<EnhancePromptRequest>,
) -> ApiResult<Json<EnhancePromptResponse>> {
    if req.text.trim().is_empty() {
        return Err(ApiError::BadRequest("Text is required".to_string()));
    }

    let request = ChatRequest::new(
        state.config.llm.enhance_model.clone(),
        vec![
            Message::system(ENHANCE_PROMPT_SYSTEM),
            Message::human(enhance_prompt_request(&req.text)),
        ],
    )
    .with_options(ChatOptions::new().temperature(ENHANCE_TEMPERATURE));

    let response = state.llm_client.chat(request).await?;
    let enhanced_text = response.content.unwrap_or_default().trim().to_string();

    Ok(Json(EnhancePromptResponse {
        enhanced_text,
        success: true,
    }))
}
