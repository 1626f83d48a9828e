use contentport_persist::{
    AccountProfile, AccountRepository, ChatHistoryRepository, DocumentQuery, DocumentType,
    MediaUploadRepository, NewKnowledgeDocument, Plan, RateLimiter, RecordStore, StyleRepository,
    StyleTweet, Stores,
};
use contentport_types::{ChatHistoryItem, ChatMessage};

fn profile(id: &str, username: &str) -> AccountProfile {
    AccountProfile {
        id: id.to_string(),
        name: username.to_uppercase(),
        username: username.to_string(),
        profile_image_url: format!("https://img.example/{}.png", username),
        verified: false,
        twitter_id: Some(format!("tw_{}", id)),
    }
}

fn history_item(id: &str, title: &str) -> ChatHistoryItem {
    ChatHistoryItem {
        id: id.to_string(),
        title: title.to_string(),
        last_updated: "2025-01-01T00:00:00Z".to_string(),
    }
}

#[tokio::test]
async fn test_sixth_free_request_is_rejected() {
    let stores = Stores::in_memory();
    let limiter = RateLimiter::for_plan(Plan::Free, stores.kv.clone());

    for i in 0..5 {
        let decision = limiter.limit("user_1").await.unwrap();
        assert!(decision.success, "request {} should pass", i + 1);
        assert_eq!(decision.remaining, 4 - i);
    }
    assert!(!limiter.limit("user_1").await.unwrap().success);

    // Identities are counted separately
    assert!(limiter.limit("user_2").await.unwrap().success);
}

#[tokio::test]
async fn test_eighty_first_pro_request_is_rejected() {
    let stores = Stores::in_memory();
    let limiter = RateLimiter::for_plan(Plan::Pro, stores.kv.clone());

    for _ in 0..80 {
        assert!(limiter.limit("pro_user").await.unwrap().success);
    }
    let decision = limiter.limit("pro_user").await.unwrap();
    assert!(!decision.success);
    assert_eq!(decision.limit, 80);
}

#[tokio::test]
async fn test_deleted_document_is_hidden_from_list() {
    let stores = Stores::in_memory();
    let mut first = NewKnowledgeDocument::new("user_1", DocumentType::Txt);
    first.title = Some("notes".into());
    let first = stores.records.insert_document(first).await.unwrap();
    let second = stores
        .records
        .insert_document(NewKnowledgeDocument::new("user_1", DocumentType::Pdf))
        .await
        .unwrap();

    let query = DocumentQuery::default();
    assert_eq!(stores.records.list_documents("user_1", &query).await.unwrap().len(), 2);

    assert!(stores.records.soft_delete_document("user_1", &first.id).await.unwrap());
    let listed = stores.records.list_documents("user_1", &query).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, second.id);

    // Still retrievable directly, flagged as deleted
    let deleted = stores.records.get_document("user_1", &first.id).await.unwrap().unwrap();
    assert!(deleted.is_deleted);
}

#[tokio::test]
async fn test_switching_active_account() {
    let stores = Stores::in_memory();
    let accounts = AccountRepository::new(stores.kv.clone());
    let email = "writer@example.com";

    accounts.save_profile(email, &profile("a1", "first")).await.unwrap();
    accounts.save_profile(email, &profile("a2", "second")).await.unwrap();
    assert!(accounts.active(email).await.unwrap().is_none());

    let first = accounts.get_profile(email, "a1").await.unwrap().unwrap();
    accounts.set_active(email, &first).await.unwrap();
    let second = accounts.get_profile(email, "a2").await.unwrap().unwrap();
    accounts.set_active(email, &second).await.unwrap();

    assert_eq!(accounts.active(email).await.unwrap().unwrap().id, "a2");
}

#[tokio::test]
async fn test_history_index_moves_chat_to_front() {
    let stores = Stores::in_memory();
    let history = ChatHistoryRepository::new(stores.kv.clone());
    let email = "writer@example.com";

    history.touch_index(email, history_item("c1", "first")).await.unwrap();
    history.touch_index(email, history_item("c2", "second")).await.unwrap();
    history.touch_index(email, history_item("c1", "first again")).await.unwrap();

    let index = history.list_index(email).await.unwrap();
    let ids: Vec<&str> = index.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, vec!["c1", "c2"]);
    assert_eq!(index[0].title, "first again");
}

#[tokio::test]
async fn test_history_index_is_capped() {
    let stores = Stores::in_memory();
    let history = ChatHistoryRepository::new(stores.kv.clone());

    for i in 0..25 {
        history
            .touch_index("a@b.co", history_item(&format!("c{}", i), "chat"))
            .await
            .unwrap();
    }

    let index = history.list_index("a@b.co").await.unwrap();
    assert_eq!(index.len(), 20);
    assert_eq!(index[0].id, "c24");
}

#[tokio::test]
async fn test_messages_round_trip_and_missing_chat() {
    let stores = Stores::in_memory();
    let history = ChatHistoryRepository::new(stores.kv.clone());

    assert!(history.get_messages("nope").await.unwrap().is_empty());

    let messages = vec![ChatMessage::user("m1", "hello")];
    history.save_messages("chat_1", &messages).await.unwrap();
    assert_eq!(history.get_messages("chat_1").await.unwrap(), messages);
}

#[tokio::test]
async fn test_style_append_and_remove() {
    let stores = Stores::in_memory();
    let styles = StyleRepository::new(stores.kv.clone());
    let tweet = StyleTweet {
        id: "t1".into(),
        text: "shipping rust today".into(),
        author_id: Some("42".into()),
        created_at: None,
        edit_history_tweet_ids: vec![],
        author: None,
    };

    assert!(styles.remove_tweet("a@b.co", "acc", "t1").await.unwrap().is_none());

    let style = styles
        .append_tweet("a@b.co", "acc", tweet, Some("short and dry".into()))
        .await
        .unwrap();
    assert_eq!(style.tweets.len(), 1);
    assert_eq!(style.prompt.as_deref(), Some("short and dry"));

    let style = styles.remove_tweet("a@b.co", "acc", "t1").await.unwrap().unwrap();
    assert!(style.tweets.is_empty());
    assert_eq!(style.prompt.as_deref(), Some("short and dry"));
}

#[tokio::test]
async fn test_media_freshness_window() {
    let stores = Stores::in_memory();
    let media = MediaUploadRepository::new(stores.kv.clone());
    let day_ms = 24 * 60 * 60 * 1000;
    let uploaded = chrono::Utc::now().timestamp_millis();

    assert!(!media.is_fresh_at("m1", uploaded).await.unwrap());

    media.record("m1", uploaded).await.unwrap();
    assert!(media.is_fresh_at("m1", uploaded + day_ms - 1).await.unwrap());
    assert!(!media.is_fresh_at("m1", uploaded + day_ms).await.unwrap());
}
