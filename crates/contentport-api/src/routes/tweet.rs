use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use contentport_integrations::NewTweet;
use contentport_persist::User;

use crate::{
    error::{ApiError, ApiResult},
    extract::ApiJson,
    services::{
        accounts::{account_tokens, require_active},
        media::{ensure_valid_media, MediaItem},
    },
    state::AppState,
};

const MAX_TWEET_MEDIA: usize = 4;

#[derive(Debug, Deserialize)]
pub struct TweetInput {
    pub content: String,
    #[serde(default)]
    pub media: Vec<MediaItem>,
}

#[derive(Debug, Deserialize)]
pub struct PostRequest {
    pub tweets: Vec<TweetInput>,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub success: bool,
    pub tweet_ids: Vec<String>,
}

fn validate(tweets: &[TweetInput]) -> ApiResult<()> {
    if tweets.is_empty() {
        return Err(ApiError::BadRequest("At least one tweet is required".to_string()));
    }
    for (index, tweet) in tweets.iter().enumerate() {
        if tweet.content.trim().is_empty() && tweet.media.is_empty() {
            return Err(ApiError::BadRequest(format!("Tweet {} is empty", index + 1)));
        }
        if tweet.media.len() > MAX_TWEET_MEDIA {
            return Err(ApiError::BadRequest(format!(
                "Tweet {} has more than {} media items",
                index + 1,
                MAX_TWEET_MEDIA
            )));
        }
    }
    Ok(())
}

/// Post a tweet, or a thread where each tweet replies to the previous one
pub async fn post(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    ApiJson(req): ApiJson<PostRequest>,
) -> ApiResult<Json<PostResponse>> {
    validate(&req.tweets)?;

    let account = require_active(&state, &user.email, || {
        ApiError::BadRequest("No active account found".to_string())
    })
    .await?;
    let tokens = account_tokens(&state, &user.id, &account.id)
        .await?
        .ok_or_else(|| {
            ApiError::BadRequest(
                "Twitter account not connected or access token missing".to_string(),
            )
        })?;

    let mut tweet_ids: Vec<String> = Vec::with_capacity(req.tweets.len());
    for tweet in req.tweets {
        let media = ensure_valid_media(&state, &tokens, tweet.media).await?;

        let posted = state
            .twitter
            .post_tweet(
                &tokens,
                NewTweet {
                    text: tweet.content,
                    media_ids: media.into_iter().map(|item| item.media_id).collect(),
                    reply_to: tweet_ids.last().cloned(),
                },
            )
            .await?;

        tracing::info!(tweet_id = %posted.id, "Posted tweet");
        tweet_ids.push(posted.id);
    }

    Ok(Json(PostResponse {
        success: true,
        tweet_ids,
    }))
}
