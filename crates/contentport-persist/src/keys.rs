//! Key layout of the key-value store.

pub fn chat_history(chat_id: &str) -> String {
    format!("chat:history:{}", chat_id)
}

pub fn chat_index(email: &str) -> String {
    format!("chat:history-list:{}", email)
}

pub fn account_profile(email: &str, account_id: &str) -> String {
    format!("account:{}:{}", email, account_id)
}

pub fn active_account(email: &str) -> String {
    format!("active-account:{}", email)
}

pub fn style(email: &str, account_id: &str) -> String {
    format!("style:{}:{}", email, account_id)
}

pub fn website_contents(chat_id: &str) -> String {
    format!("website-contents:{}", chat_id)
}

pub fn generated_thread(chat_id: &str, generation_id: &str) -> String {
    format!("thread:{}:{}", chat_id, generation_id)
}

pub fn media_upload(media_id: &str) -> String {
    format!("tweet-media-upload:{}", media_id)
}

pub fn rate_limit(prefix: &str, identifier: &str, bucket: i64) -> String {
    format!("{}:{}:{}", prefix, identifier, bucket)
}
