use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Extension,
};
use chrono::{SecondsFormat, Utc};
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use contentport_graph::{
    prompt::{assistant_prompt, user_turn},
    GraphInput, ReadWebsiteTool, StreamEvent, ToolRegistry, WriteTweetContext, WriteTweetTool,
};
use contentport_persist::{Plan, RateLimiter, TurnAccumulator, User};
use contentport_types::{ChatHistoryItem, ChatMessage, MessageMetadata, MessagePart};

use crate::{
    error::{ApiError, ApiResult},
    extract::ApiJson,
    services::{
        accounts::require_active,
        attachments::parse_attachments,
        conversation::{content_part, to_model_messages},
    },
    state::AppState,
};

const SSE_BUFFER: usize = 256;

#[derive(Debug, Deserialize)]
pub struct ChatRequestBody {
    /// Chat id; a new id starts a new chat
    pub id: String,
    pub message: ChatMessage,
}

fn rate_limit_message(plan: Plan) -> &'static str {
    match plan {
        Plan::Pro => {
            "You've reached your hourly message limit. Please try again in a few hours."
        }
        Plan::Free => "Free plan limit reached, please upgrade to continue.",
    }
}

fn to_sse_event(event: &StreamEvent) -> Event {
    Event::default()
        .event(event.event_name())
        .json_data(event)
        .unwrap_or_else(|e| {
            tracing::error!("Failed to serialize stream event: {}", e);
            Event::default().event("error").data("{\"type\":\"error\"}")
        })
}

/// Send a chat message and stream the run as Server-Sent Events
///
/// The full history is saved once the run ends successfully.
pub async fn send_message_stream(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    ApiJson(req): ApiJson<ChatRequestBody>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let chat_id = req.id;
    let mut message = req.message;

    // 1. Rate limit
    let limiter = RateLimiter::for_plan(user.plan, state.kv.clone());
    let decision = limiter.limit(&user.email).await?;
    if state.config.rate_limit.enabled && !decision.success {
        tracing::info!(user_id = %user.id, "Chat rate limit reached");
        return Err(ApiError::RateLimited(rate_limit_message(user.plan).to_string()));
    }

    // 2. Active account
    let account = require_active(&state, &user.email, || {
        ApiError::PreconditionFailed("No connected account".to_string())
    })
    .await?;

    // 3. History and attachments
    let mut messages = state.chats().get_messages(&chat_id).await?;
    let parsed = parse_attachments(&state, &user, message.attachments()).await?;

    // 4. Prompt assembly
    let user_text = message.text();
    let drafts = message.draft_tweets().to_vec();
    let turn = user_turn(&user_text, &parsed.links, &drafts, Utc::now().date_naive());

    let metadata = message.metadata.get_or_insert_with(MessageMetadata::default);
    if metadata.user_message.is_none() {
        metadata.user_message = Some(user_text.clone());
    }
    message.parts = std::iter::once(MessagePart::text(turn))
        .chain(parsed.parts.iter().cloned())
        .collect();
    messages.push(message);

    // 5. Run
    let input = GraphInput::new(
        chat_id.clone(),
        to_model_messages(assistant_prompt(&drafts), &messages),
        state.config.llm.chat(),
    );
    let message_id = input.message_id.clone();

    let writer = WriteTweetTool::new(
        state.llm_client.clone(),
        state.config.llm.writer(),
        WriteTweetContext {
            chat_id: chat_id.clone(),
            generation_id: uuid::Uuid::new_v4().to_string(),
            email: user.email.clone(),
            account_id: account.id.clone(),
            user_message: user_text,
            drafts,
            attachments: parsed.parts.iter().filter_map(content_part).collect(),
        },
        state.kv.clone(),
    );
    let reader = ReadWebsiteTool::new(
        chat_id.clone(),
        state.scraper.clone(),
        state.twitter.clone(),
        state.kv.clone(),
    );
    let tools = ToolRegistry::new()
        .with(Arc::new(writer))
        .with(Arc::new(reader));

    tracing::info!(chat_id = %chat_id, user_id = %user.id, "Starting chat run");
    let events = state.graph.spawn_run(input, tools);

    // 6. Forward events, persist on finish
    let (tx, rx) = mpsc::channel(SSE_BUFFER);
    let turn = FinishedTurn {
        state: Arc::clone(&state),
        chat_id,
        email: user.email,
        message_id,
        messages,
    };
    tokio::spawn(forward_events(turn, events, tx));

    let sse_stream = ReceiverStream::new(rx).map(|event| Ok::<Event, Infallible>(to_sse_event(&event)));

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::default()))
}

struct FinishedTurn {
    state: Arc<AppState>,
    chat_id: String,
    email: String,
    message_id: String,
    messages: Vec<ChatMessage>,
}

/// Relays run events to the client and saves the turn once the run ends.
/// A disconnected client does not stop the run from being saved.
async fn forward_events(
    mut turn: FinishedTurn,
    mut events: mpsc::Receiver<StreamEvent>,
    tx: mpsc::Sender<StreamEvent>,
) {
    let mut accumulator = TurnAccumulator::new(turn.message_id.clone());
    let mut completed = false;
    let mut client_connected = true;

    while let Some(event) = events.recv().await {
        accumulator.push(&event);
        completed |= matches!(event, StreamEvent::EndStream { .. });

        if client_connected && tx.send(event).await.is_err() {
            tracing::debug!(chat_id = %turn.chat_id, "Client disconnected, finishing run");
            client_connected = false;
        }
    }

    if !completed || accumulator.failed() {
        tracing::warn!(chat_id = %turn.chat_id, "Chat run did not complete, history not saved");
        return;
    }

    turn.messages.push(accumulator.finish());
    if let Err(e) = save_turn(&turn).await {
        tracing::error!(chat_id = %turn.chat_id, "Failed to save chat history: {}", e);
    }

    drop(tx);
}

async fn save_turn(turn: &FinishedTurn) -> contentport_persist::Result<()> {
    let chats = turn.state.chats();
    chats.save_messages(&turn.chat_id, &turn.messages).await?;
    turn.state.websites().clear(&turn.chat_id).await?;

    let title = turn
        .messages
        .first()
        .and_then(|message| message.metadata.as_ref())
        .and_then(|metadata| metadata.user_message.clone())
        .unwrap_or_else(|| "Unnamed chat".to_string());

    chats
        .touch_index(
            &turn.email,
            ChatHistoryItem {
                id: turn.chat_id.clone(),
                title,
                last_updated: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            },
        )
        .await?;

    tracing::info!(chat_id = %turn.chat_id, messages = turn.messages.len(), "Chat history saved");
    Ok(())
}
