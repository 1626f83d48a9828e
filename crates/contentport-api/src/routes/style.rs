use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use contentport_integrations::{strip_short_links, tweet_id_from_url};
use contentport_persist::{AccountProfile, StyleTweet, TweetAuthor, User};

use crate::{
    error::{ApiError, ApiResult},
    extract::ApiJson,
    routes::file::SuccessResponse,
    services::accounts::require_active,
    state::AppState,
};

const MAX_LINK_CHARS: usize = 200;

#[derive(Debug, Serialize)]
pub struct StyleResponse {
    pub tweets: Vec<StyleTweet>,
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TweetsResponse {
    pub tweets: Vec<StyleTweet>,
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub link: String,
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub tweet_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

async fn connected_account(state: &AppState, email: &str) -> ApiResult<AccountProfile> {
    require_active(state, email, || {
        ApiError::BadRequest("Please connect your Twitter account".to_string())
    })
    .await
}

/// Example tweets of the active account, newest first
pub async fn get(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> ApiResult<Json<StyleResponse>> {
    let account = connected_account(&state, &user.email).await?;

    let response = match state.styles().get(&user.email, &account.id).await? {
        Some(style) => StyleResponse {
            tweets: style.tweets.into_iter().rev().collect(),
            prompt: style.prompt,
        },
        None => StyleResponse {
            tweets: Vec::new(),
            prompt: None,
        },
    };

    Ok(Json(response))
}

/// Add a tweet to the style from its status link
pub async fn import(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    ApiJson(req): ApiJson<ImportRequest>,
) -> ApiResult<Json<TweetsResponse>> {
    let link = req.link.trim();
    if link.is_empty() || link.chars().count() > MAX_LINK_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Link must be between 1 and {} characters",
            MAX_LINK_CHARS
        )));
    }

    let account = connected_account(&state, &user.email).await?;

    let tweet_id = tweet_id_from_url(link).ok_or_else(|| {
        ApiError::BadRequest(
            "Invalid Twitter link format. Please provide a direct link to a tweet.".to_string(),
        )
    })?;

    let tweet = state
        .twitter
        .lookup_tweet(&tweet_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tweet not found".to_string()))?;

    let text = strip_short_links(tweet.full_text());

    let author = tweet
        .author
        .filter(|author| tweet.author_id.as_deref().map_or(true, |id| id == author.id))
        .map(|author| TweetAuthor {
            username: author.username,
            name: author.name,
            profile_image_url: author.profile_image_url,
        });

    let style_tweet = StyleTweet {
        id: tweet.id,
        text,
        author_id: tweet.author_id,
        created_at: tweet.created_at,
        edit_history_tweet_ids: tweet.edit_history_tweet_ids,
        author,
    };

    let prompt = req.prompt.filter(|prompt| !prompt.is_empty());
    let style = state
        .styles()
        .append_tweet(&user.email, &account.id, style_tweet, prompt)
        .await?;

    tracing::info!(tweet_id = %tweet_id, "Imported style tweet");
    Ok(Json(TweetsResponse {
        tweets: style.tweets,
    }))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    ApiJson(req): ApiJson<DeleteRequest>,
) -> ApiResult<Json<TweetsResponse>> {
    let account = connected_account(&state, &user.email).await?;

    let style = state
        .styles()
        .remove_tweet(&user.email, &account.id, &req.tweet_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No style found for this user".to_string()))?;

    Ok(Json(TweetsResponse {
        tweets: style.tweets,
    }))
}

/// Create the style or replace its prompt; a missing prompt changes nothing
pub async fn save(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    ApiJson(req): ApiJson<SaveRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    let account = connected_account(&state, &user.email).await?;

    if let Some(prompt) = req.prompt {
        state
            .styles()
            .set_prompt(&user.email, &account.id, prompt)
            .await?;
    }

    Ok(Json(SuccessResponse { success: true }))
}
