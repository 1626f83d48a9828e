#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

use contentport_api::{build_router, config::Config, state::AppState};
use contentport_graph::{Graph, GraphConfig};
use contentport_integrations::{
    MediaUpload, NewTweet, ObjectHead, ObjectStorage, PostedTweet, PresignedPost, ScrapedPage,
    StoredObject, TweetAuthorInfo, TweetLookup, TwitterApi, TwitterUser, UserTokens, WebScraper,
};
use contentport_llm::{ChatClient, ChatRequest, ChatResponse, EventStream};
use contentport_persist::{AccountProfile, AccountRecord, Plan, Session, Stores, User};

pub type LlmEvent = contentport_llm::StreamEvent;

pub const TOKEN: &str = "session_abc";

fn config(rate_limit: bool) -> Config {
    let toml = format!(
        r#"
        [server]
        host = "127.0.0.1"
        port = 0

        [cors]
        enabled = true
        origins = ["*"]

        [mongodb]
        database = "contentport_test"
        in_memory = true

        [llm]
        model = "openai/gpt-4.1"
        enhance_model = "meta-llama/llama-3.2-3b-instruct:free"

        [graph]
        max_steps = 3
        timeout_secs = 30

        [rate_limit]
        enabled = {}

        [s3]
        bucket = "contentport-test"
        region = "us-east-1"

        [logging]
        level = "debug"
        format = "pretty"
        "#,
        rate_limit
    );
    toml::from_str(&toml).expect("test config")
}

/// Replays one scripted stream per request
#[derive(Default)]
pub struct ScriptedClient {
    scripts: Mutex<VecDeque<Vec<LlmEvent>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedClient {
    pub fn new(scripts: Vec<Vec<LlmEvent>>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.requests.lock().unwrap().push(request);
        Ok(ChatResponse {
            content: Some("A sharper prompt".into()),
            tool_calls: None,
            usage: None,
            finish_reason: Some("stop".into()),
            model: None,
        })
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<EventStream> {
        self.requests.lock().unwrap().push(request);
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("upstream unavailable"))?;
        Ok(Box::pin(futures::stream::iter(script.into_iter().map(Ok))))
    }
}

pub fn text(content: &str) -> LlmEvent {
    LlmEvent::Message {
        content: content.into(),
    }
}

pub fn done() -> LlmEvent {
    LlmEvent::Done {
        finish_reason: Some("stop".into()),
    }
}

/// Object store backed by a map; counts presigned uploads
#[derive(Default)]
pub struct FakeStorage {
    pub objects: Mutex<HashMap<String, StoredObject>>,
    pub presigned: AtomicUsize,
}

impl FakeStorage {
    pub fn put(&self, key: &str, bytes: &[u8], content_type: &str) {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                bytes: bytes.to_vec(),
                content_type: Some(content_type.to_string()),
            },
        );
    }

    pub fn presigned_count(&self) -> usize {
        self.presigned.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    fn presigned_post(
        &self,
        key: &str,
        content_type: &str,
        _max_bytes: u64,
        _expires_in: Duration,
    ) -> contentport_integrations::Result<PresignedPost> {
        self.presigned.fetch_add(1, Ordering::SeqCst);
        Ok(PresignedPost {
            url: "https://contentport-test.s3.amazonaws.com".into(),
            fields: [
                ("key".to_string(), key.to_string()),
                ("Content-Type".to_string(), content_type.to_string()),
            ]
            .into_iter()
            .collect(),
        })
    }

    async fn head_object(&self, key: &str) -> contentport_integrations::Result<Option<ObjectHead>> {
        Ok(self.objects.lock().unwrap().get(key).map(|object| ObjectHead {
            content_type: object.content_type.clone(),
            content_length: Some(object.bytes.len() as i64),
        }))
    }

    async fn get_object(&self, key: &str) -> contentport_integrations::Result<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned().ok_or_else(|| {
            contentport_integrations::IntegrationError::api("S3", 404, "NoSuchKey")
        })
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://contentport-test.s3.amazonaws.com/{}", key)
    }
}

/// Knows a single tweet, id 123 by @writer
#[derive(Default)]
pub struct FakeTwitter {
    pub posted: Mutex<Vec<NewTweet>>,
}

#[async_trait]
impl TwitterApi for FakeTwitter {
    async fn current_user(&self, _tokens: &UserTokens) -> contentport_integrations::Result<TwitterUser> {
        Ok(TwitterUser {
            id: "42".into(),
            name: "Writer Renamed".into(),
            username: "writer".into(),
            profile_image_url: "https://pbs.twimg.com/new.jpg".into(),
            verified: false,
        })
    }

    async fn lookup_tweet(&self, tweet_id: &str) -> contentport_integrations::Result<Option<TweetLookup>> {
        if tweet_id != "123" {
            return Ok(None);
        }
        Ok(Some(TweetLookup {
            id: "123".into(),
            text: "shipping small things daily https://t.co/abc".into(),
            note_text: None,
            created_at: Some("2025-01-01T00:00:00.000Z".into()),
            author_id: Some("42".into()),
            edit_history_tweet_ids: vec!["123".into()],
            author: Some(TweetAuthorInfo {
                id: "42".into(),
                username: "writer".into(),
                name: "Writer".into(),
                profile_image_url: None,
            }),
        }))
    }

    async fn upload_media(
        &self,
        _tokens: &UserTokens,
        _upload: MediaUpload,
    ) -> contentport_integrations::Result<String> {
        Ok("media_1".into())
    }

    async fn post_tweet(
        &self,
        _tokens: &UserTokens,
        tweet: NewTweet,
    ) -> contentport_integrations::Result<PostedTweet> {
        let mut posted = self.posted.lock().unwrap();
        posted.push(tweet.clone());
        Ok(PostedTweet {
            id: format!("tweet_{}", posted.len()),
            text: tweet.text,
        })
    }
}

pub struct FakeScraper;

#[async_trait]
impl WebScraper for FakeScraper {
    async fn scrape(&self, url: &str) -> contentport_integrations::Result<ScrapedPage> {
        Ok(ScrapedPage {
            url: url.to_string(),
            markdown: "# Release notes".into(),
            title: Some("Release notes".into()),
            description: Some("What shipped this week".into()),
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub storage: Arc<FakeStorage>,
    pub twitter: Arc<FakeTwitter>,
    pub llm: Arc<ScriptedClient>,
    pub user: User,
}

pub struct TestAppBuilder {
    plan: Plan,
    rate_limit: bool,
    scripts: Vec<Vec<LlmEvent>>,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            plan: Plan::Free,
            rate_limit: false,
            scripts: Vec::new(),
        }
    }

    pub fn rate_limited(mut self) -> Self {
        self.rate_limit = true;
        self
    }

    pub fn script(mut self, script: Vec<LlmEvent>) -> Self {
        self.scripts.push(script);
        self
    }

    pub async fn build(self) -> TestApp {
        let storage = Arc::new(FakeStorage::default());
        let twitter = Arc::new(FakeTwitter::default());
        let llm = Arc::new(ScriptedClient::new(self.scripts));
        let graph = Graph::new(llm.clone(), GraphConfig::default());

        let state = Arc::new(AppState::new(
            config(self.rate_limit),
            Stores::in_memory(),
            storage.clone(),
            twitter.clone(),
            Arc::new(FakeScraper),
            llm.clone(),
            graph,
        ));

        let user = User::new("writer@example.com", "Writer", self.plan);
        state.records.save_user(user.clone()).await.unwrap();
        state
            .records
            .save_session(Session {
                token: TOKEN.into(),
                user_id: user.id.clone(),
                expires_at: Utc::now() + ChronoDuration::hours(1),
            })
            .await
            .unwrap();

        TestApp {
            router: build_router(state.clone()),
            state,
            storage,
            twitter,
            llm,
            user,
        }
    }
}

impl TestApp {
    /// Stores a Twitter account with tokens and its cached profile
    pub async fn connect_account(&self, username: &str, activate: bool) -> AccountProfile {
        let record = AccountRecord::twitter(&self.user.id, "42", "access", "secret");
        self.state.records.save_account(record.clone()).await.unwrap();

        let profile = AccountProfile {
            id: record.id,
            name: username.to_uppercase(),
            username: username.into(),
            profile_image_url: "https://pbs.twimg.com/old.jpg".into(),
            verified: false,
            twitter_id: Some("42".into()),
        };
        let accounts = self.state.accounts();
        accounts.save_profile(&self.user.email, &profile).await.unwrap();
        if activate {
            accounts.set_active(&self.user.email, &profile).await.unwrap();
        }
        profile
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Vec<u8>) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let (status, bytes) = self.send(Method::GET, uri, None, Some(TOKEN)).await;
        (status, parse(&bytes))
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let (status, bytes) = self.send(Method::POST, uri, Some(body), Some(TOKEN)).await;
        (status, parse(&bytes))
    }

    pub async fn get_anonymous(&self, uri: &str) -> (StatusCode, Value) {
        let (status, bytes) = self.send(Method::GET, uri, None, None).await;
        (status, parse(&bytes))
    }

    /// Raw body, for event streams
    pub async fn post_raw(&self, uri: &str, body: Value) -> (StatusCode, String) {
        let (status, bytes) = self.send(Method::POST, uri, Some(body), Some(TOKEN)).await;
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn parse(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap_or(Value::Null)
}
