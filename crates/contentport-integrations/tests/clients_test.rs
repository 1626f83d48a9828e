use contentport_integrations::{
    FirecrawlClient, MediaKind, MediaUpload, NewTweet, ObjectStorage, S3Client, S3Config,
    TwitterApi, TwitterConfig, TwitterHttpClient, UserTokens, WebScraper,
};
use mockito::Matcher;
use serde_json::json;

fn twitter(server: &mockito::ServerGuard) -> TwitterHttpClient {
    let config = TwitterConfig::new("consumer", "consumer-secret", "app-bearer")
        .with_base_url(server.url());
    TwitterHttpClient::new(config).unwrap()
}

fn tokens() -> UserTokens {
    UserTokens {
        access_token: "user-token".into(),
        access_secret: "user-secret".into(),
    }
}

#[tokio::test]
async fn test_lookup_tweet_prefers_note_text_and_resolves_author() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/2/tweets/1234")
        .match_header("authorization", "Bearer app-bearer")
        .match_query(Matcher::UrlEncoded("expansions".into(), "author_id".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "data": {
                    "id": "1234",
                    "text": "short version https://t.co/abc",
                    "author_id": "42",
                    "created_at": "2025-01-01T00:00:00.000Z",
                    "note_tweet": { "text": "the long version" },
                    "edit_history_tweet_ids": ["1234"]
                },
                "includes": {
                    "users": [
                        { "id": "7", "username": "someone", "name": "Someone" },
                        { "id": "42", "username": "writer", "name": "Writer", "profile_image_url": "https://img/w.png" }
                    ]
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let tweet = twitter(&server).lookup_tweet("1234").await.unwrap().unwrap();
    mock.assert_async().await;

    assert_eq!(tweet.full_text(), "the long version");
    assert_eq!(tweet.author.unwrap().username, "writer");
}

#[tokio::test]
async fn test_lookup_missing_tweet() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/2/tweets/999")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"errors":[{"title":"Not Found Error"}]}"#)
        .create_async()
        .await;

    assert!(twitter(&server).lookup_tweet("999").await.unwrap().is_none());
}

#[tokio::test]
async fn test_post_reply_with_media_is_oauth_signed() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/2/tweets")
        .match_header("authorization", Matcher::Regex(r#"^OAuth .*oauth_token="user-token""#.into()))
        .match_body(Matcher::PartialJson(json!({
            "text": "second",
            "media": { "media_ids": ["m1"] },
            "reply": { "in_reply_to_tweet_id": "100" }
        })))
        .with_status(201)
        .with_body(r#"{"data":{"id":"101","text":"second"}}"#)
        .create_async()
        .await;

    let posted = twitter(&server)
        .post_tweet(
            &tokens(),
            NewTweet {
                text: "second".into(),
                media_ids: vec!["m1".into()],
                reply_to: Some("100".into()),
            },
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(posted.id, "101");
}

#[tokio::test]
async fn test_gif_upload_is_chunked() {
    let mut server = mockito::Server::new_async().await;
    let init = server
        .mock("POST", "/1.1/media/upload.json")
        .match_body(Matcher::Regex("command=INIT".into()))
        .with_status(202)
        .with_body(r#"{"media_id_string":"777"}"#)
        .create_async()
        .await;
    let append = server
        .mock("POST", "/1.1/media/upload.json")
        .match_body(Matcher::Regex("APPEND".into()))
        .with_status(204)
        .create_async()
        .await;
    let finalize = server
        .mock("POST", "/1.1/media/upload.json")
        .match_body(Matcher::Regex("command=FINALIZE".into()))
        .with_status(200)
        .with_body(r#"{"media_id_string":"777"}"#)
        .create_async()
        .await;

    let media_id = twitter(&server)
        .upload_media(
            &tokens(),
            MediaUpload {
                bytes: b"GIF89a-bytes".to_vec(),
                mime_type: "image/gif".into(),
                kind: MediaKind::Gif,
                additional_owners: vec!["42".into()],
            },
        )
        .await
        .unwrap();

    init.assert_async().await;
    append.assert_async().await;
    finalize.assert_async().await;
    assert_eq!(media_id, "777");
}

#[tokio::test]
async fn test_current_user_maps_v1_fields() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/1.1/account/verify_credentials.json")
        .with_status(200)
        .with_body(
            r#"{"id_str":"42","name":"Writer","screen_name":"writer","profile_image_url_https":"https://img/w.png","verified":true}"#,
        )
        .create_async()
        .await;

    let user = twitter(&server).current_user(&tokens()).await.unwrap();
    assert_eq!(user.username, "writer");
    assert_eq!(user.profile_image_url, "https://img/w.png");
    assert!(user.verified);
}

fn s3(server: &mockito::ServerGuard) -> S3Client {
    S3Client::new(S3Config {
        bucket: "uploads".into(),
        region: "us-east-1".into(),
        access_key_id: "AKID".into(),
        secret_access_key: "secret".into(),
        endpoint: Some(server.url()),
    })
    .unwrap()
}

#[tokio::test]
async fn test_head_object_reads_metadata() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("HEAD", "/uploads/chat/u1/doc.pdf")
        .match_header("authorization", Matcher::Regex("^AWS4-HMAC-SHA256 Credential=AKID/".into()))
        .match_header("x-amz-content-sha256", Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/pdf")
        .create_async()
        .await;

    let head = s3(&server).head_object("chat/u1/doc.pdf").await.unwrap().unwrap();
    mock.assert_async().await;
    assert_eq!(head.content_type.as_deref(), Some("application/pdf"));
}

#[tokio::test]
async fn test_head_missing_object() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("HEAD", "/uploads/chat/u1/gone.pdf")
        .with_status(404)
        .create_async()
        .await;

    assert!(s3(&server).head_object("chat/u1/gone.pdf").await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_object_returns_bytes() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/uploads/tweet-media/u1/a.png")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(vec![1u8, 2, 3])
        .create_async()
        .await;

    let object = s3(&server).get_object("tweet-media/u1/a.png").await.unwrap();
    assert_eq!(object.bytes, vec![1, 2, 3]);
    assert_eq!(object.content_type.as_deref(), Some("image/png"));
}

#[tokio::test]
async fn test_firecrawl_scrape() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v0/scrape")
        .match_header("authorization", "Bearer fc-key")
        .match_body(Matcher::PartialJson(json!({"url": "https://blog.example/post"})))
        .with_status(200)
        .with_body(
            json!({
                "success": true,
                "data": {
                    "markdown": "# Post\nbody",
                    "metadata": { "title": "Post", "description": "A post" }
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = FirecrawlClient::with_base_url("fc-key", server.url()).unwrap();
    let page = client.scrape("https://blog.example/post").await.unwrap();
    assert_eq!(page.markdown, "# Post\nbody");
    assert_eq!(page.title.as_deref(), Some("Post"));
}

#[tokio::test]
async fn test_firecrawl_failure_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v0/scrape")
        .with_status(200)
        .with_body(r#"{"success":false,"error":"blocked"}"#)
        .create_async()
        .await;

    let client = FirecrawlClient::with_base_url("fc-key", server.url()).unwrap();
    let err = client.scrape("https://blocked.example").await.unwrap_err();
    assert!(err.to_string().contains("blocked"));
}
