// Twitter API v1.1/v2 client: user-context calls are OAuth 1.0a signed,
// tweet lookups use the app bearer token.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use super::media::MediaKind;
use super::oauth::{authorization_header, OAuthCredentials};
use crate::error::{IntegrationError, Result};

pub const TWITTER_API_BASE: &str = "https://api.twitter.com";
pub const TWITTER_UPLOAD_BASE: &str = "https://upload.twitter.com";

const CHUNK_SIZE: usize = 4 * 1024 * 1024;
const MAX_STATUS_POLLS: u32 = 60;

/// Access token pair of a connected account
#[derive(Debug, Clone)]
pub struct UserTokens {
    pub access_token: String,
    pub access_secret: String,
}

/// Authenticated user's profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwitterUser {
    pub id: String,
    pub name: String,
    pub username: String,
    pub profile_image_url: String,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweetAuthorInfo {
    pub id: String,
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweetLookup {
    pub id: String,
    pub text: String,
    /// Untruncated text of long-form tweets
    #[serde(default)]
    pub note_text: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub edit_history_tweet_ids: Vec<String>,
    #[serde(default)]
    pub author: Option<TweetAuthorInfo>,
}

impl TweetLookup {
    pub fn full_text(&self) -> &str {
        self.note_text.as_deref().unwrap_or(&self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostedTweet {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub kind: MediaKind,
    /// User ids allowed to reuse the media id
    pub additional_owners: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewTweet {
    pub text: String,
    pub media_ids: Vec<String>,
    pub reply_to: Option<String>,
}

#[async_trait]
pub trait TwitterApi: Send + Sync {
    async fn current_user(&self, tokens: &UserTokens) -> Result<TwitterUser>;

    /// `None` when the tweet does not exist or is not visible
    async fn lookup_tweet(&self, tweet_id: &str) -> Result<Option<TweetLookup>>;

    /// Returns the new media id
    async fn upload_media(&self, tokens: &UserTokens, upload: MediaUpload) -> Result<String>;

    async fn post_tweet(&self, tokens: &UserTokens, tweet: NewTweet) -> Result<PostedTweet>;
}

#[derive(Debug, Clone)]
pub struct TwitterConfig {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub bearer_token: String,
    pub api_base: String,
    pub upload_base: String,
}

impl TwitterConfig {
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        bearer_token: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            bearer_token: bearer_token.into(),
            api_base: TWITTER_API_BASE.to_string(),
            upload_base: TWITTER_UPLOAD_BASE.to_string(),
        }
    }

    /// Point both hosts at one base URL (mock servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        self.api_base = base_url.clone();
        self.upload_base = base_url;
        self
    }
}

pub struct TwitterHttpClient {
    http_client: reqwest::Client,
    config: TwitterConfig,
}

// Wire formats

#[derive(Deserialize)]
struct V1User {
    id_str: String,
    name: String,
    screen_name: String,
    #[serde(default)]
    profile_image_url_https: String,
    #[serde(default)]
    verified: bool,
}

#[derive(Deserialize)]
struct NoteTweet {
    text: String,
}

#[derive(Deserialize)]
struct V2Tweet {
    id: String,
    text: String,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    author_id: Option<String>,
    #[serde(default)]
    note_tweet: Option<NoteTweet>,
    #[serde(default)]
    edit_history_tweet_ids: Vec<String>,
}

#[derive(Deserialize, Default)]
struct Includes {
    #[serde(default)]
    users: Vec<TweetAuthorInfo>,
}

#[derive(Deserialize)]
struct TweetLookupResponse {
    #[serde(default)]
    data: Option<V2Tweet>,
    #[serde(default)]
    includes: Option<Includes>,
}

#[derive(Deserialize)]
struct PostTweetResponse {
    data: PostedTweet,
}

#[derive(Deserialize)]
struct ProcessingInfo {
    state: String,
    #[serde(default)]
    check_after_secs: Option<u64>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Deserialize)]
struct MediaResponse {
    media_id_string: String,
    #[serde(default)]
    processing_info: Option<ProcessingInfo>,
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(IntegrationError::api("Twitter", status.as_u16(), body));
    }
    Ok(response.json().await?)
}

async fn ensure_success(response: Response) -> Result<()> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(IntegrationError::api("Twitter", status.as_u16(), body));
    }
    Ok(())
}

fn form_params(pairs: &[(&str, String)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

impl TwitterHttpClient {
    pub fn new(config: TwitterConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            http_client,
            config,
        })
    }

    fn credentials(&self, tokens: &UserTokens) -> OAuthCredentials {
        OAuthCredentials {
            consumer_key: self.config.consumer_key.clone(),
            consumer_secret: self.config.consumer_secret.clone(),
            token: tokens.access_token.clone(),
            token_secret: tokens.access_secret.clone(),
        }
    }

    fn upload_url(&self) -> String {
        format!("{}/1.1/media/upload.json", self.config.upload_base)
    }

    /// Signed form-encoded POST to the upload endpoint
    async fn post_upload_form(
        &self,
        tokens: &UserTokens,
        params: Vec<(String, String)>,
    ) -> Result<MediaResponse> {
        let url = self.upload_url();
        let auth = authorization_header("POST", &url, &self.credentials(tokens), &params)?;
        let response = self
            .http_client
            .post(&url)
            .header("Authorization", auth)
            .form(&params)
            .send()
            .await?;
        read_json(response).await
    }

    async fn simple_upload(&self, tokens: &UserTokens, upload: MediaUpload) -> Result<String> {
        let url = self.upload_url();
        let auth = authorization_header("POST", &url, &self.credentials(tokens), &[])?;

        let part = Part::bytes(upload.bytes)
            .file_name("media")
            .mime_str(&upload.mime_type)?;
        let mut form = Form::new().part("media", part);
        if !upload.additional_owners.is_empty() {
            form = form.text("additional_owners", upload.additional_owners.join(","));
        }

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", auth)
            .multipart(form)
            .send()
            .await?;
        let media: MediaResponse = read_json(response).await?;
        Ok(media.media_id_string)
    }

    /// INIT, APPEND per chunk, FINALIZE, then STATUS until processing ends
    async fn chunked_upload(&self, tokens: &UserTokens, upload: MediaUpload) -> Result<String> {
        let mut init = vec![
            ("command", "INIT".to_string()),
            ("total_bytes", upload.bytes.len().to_string()),
            ("media_type", upload.mime_type.clone()),
            ("media_category", upload.kind.category().to_string()),
        ];
        if !upload.additional_owners.is_empty() {
            init.push(("additional_owners", upload.additional_owners.join(",")));
        }
        let media_id = self
            .post_upload_form(tokens, form_params(&init))
            .await?
            .media_id_string;

        let url = self.upload_url();
        for (index, chunk) in upload.bytes.chunks(CHUNK_SIZE).enumerate() {
            let auth = authorization_header("POST", &url, &self.credentials(tokens), &[])?;
            let form = Form::new()
                .text("command", "APPEND")
                .text("media_id", media_id.clone())
                .text("segment_index", index.to_string())
                .part("media", Part::bytes(chunk.to_vec()).file_name("media"));

            let response = self
                .http_client
                .post(&url)
                .header("Authorization", auth)
                .multipart(form)
                .send()
                .await?;
            ensure_success(response).await?;
        }

        let finalize = [
            ("command", "FINALIZE".to_string()),
            ("media_id", media_id.clone()),
        ];
        let mut processing = self
            .post_upload_form(tokens, form_params(&finalize))
            .await?
            .processing_info;

        let mut polls = 0;
        while let Some(info) = processing {
            match info.state.as_str() {
                "succeeded" => break,
                "failed" => {
                    let reason = info
                        .error
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "unknown error".to_string());
                    return Err(IntegrationError::MediaProcessing(reason));
                }
                _ => {}
            }

            polls += 1;
            if polls > MAX_STATUS_POLLS {
                return Err(IntegrationError::MediaProcessing(format!(
                    "media {} still processing",
                    media_id
                )));
            }
            let wait = info.check_after_secs.unwrap_or(1).max(1);
            tokio::time::sleep(Duration::from_secs(wait)).await;
            processing = self.media_status(tokens, &media_id).await?.processing_info;
        }

        tracing::debug!(media_id = %media_id, kind = upload.kind.as_str(), "Chunked upload complete");
        Ok(media_id)
    }

    async fn media_status(&self, tokens: &UserTokens, media_id: &str) -> Result<MediaResponse> {
        let url = self.upload_url();
        let params = form_params(&[
            ("command", "STATUS".to_string()),
            ("media_id", media_id.to_string()),
        ]);
        let auth = authorization_header("GET", &url, &self.credentials(tokens), &params)?;
        let response = self
            .http_client
            .get(&url)
            .header("Authorization", auth)
            .query(&params)
            .send()
            .await?;
        read_json(response).await
    }
}

#[async_trait]
impl TwitterApi for TwitterHttpClient {
    async fn current_user(&self, tokens: &UserTokens) -> Result<TwitterUser> {
        let url = format!(
            "{}/1.1/account/verify_credentials.json",
            self.config.api_base
        );
        let auth = authorization_header("GET", &url, &self.credentials(tokens), &[])?;
        let response = self
            .http_client
            .get(&url)
            .header("Authorization", auth)
            .send()
            .await?;

        let user: V1User = read_json(response).await?;
        Ok(TwitterUser {
            id: user.id_str,
            name: user.name,
            username: user.screen_name,
            profile_image_url: user.profile_image_url_https,
            verified: user.verified,
        })
    }

    async fn lookup_tweet(&self, tweet_id: &str) -> Result<Option<TweetLookup>> {
        let url = format!("{}/2/tweets/{}", self.config.api_base, tweet_id);
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.config.bearer_token)
            .query(&[
                ("tweet.fields", "id,text,created_at,author_id,note_tweet"),
                ("expansions", "author_id"),
                ("user.fields", "username,name,profile_image_url"),
            ])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: TweetLookupResponse = read_json(response).await?;
        let Some(tweet) = body.data else {
            return Ok(None);
        };

        let author = body.includes.unwrap_or_default().users.into_iter().find(|user| {
            tweet.author_id.as_deref() == Some(user.id.as_str())
        });

        Ok(Some(TweetLookup {
            id: tweet.id,
            text: tweet.text,
            note_text: tweet.note_tweet.map(|note| note.text),
            created_at: tweet.created_at,
            author_id: tweet.author_id,
            edit_history_tweet_ids: tweet.edit_history_tweet_ids,
            author,
        }))
    }

    async fn upload_media(&self, tokens: &UserTokens, upload: MediaUpload) -> Result<String> {
        if upload.bytes.is_empty() {
            return Err(IntegrationError::InvalidInput("empty media".to_string()));
        }
        tracing::info!(
            kind = upload.kind.as_str(),
            bytes = upload.bytes.len(),
            "Uploading media to Twitter"
        );

        if upload.kind.is_chunked() {
            self.chunked_upload(tokens, upload).await
        } else {
            self.simple_upload(tokens, upload).await
        }
    }

    async fn post_tweet(&self, tokens: &UserTokens, tweet: NewTweet) -> Result<PostedTweet> {
        let url = format!("{}/2/tweets", self.config.api_base);
        let auth = authorization_header("POST", &url, &self.credentials(tokens), &[])?;

        let mut body = json!({ "text": tweet.text });
        if !tweet.media_ids.is_empty() {
            body["media"] = json!({ "media_ids": tweet.media_ids });
        }
        if let Some(reply_to) = &tweet.reply_to {
            body["reply"] = json!({ "in_reply_to_tweet_id": reply_to });
        }

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", auth)
            .json(&body)
            .send()
            .await?;
        let posted: PostTweetResponse = read_json(response).await?;
        Ok(posted.data)
    }
}
