use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweetAuthor {
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

/// Example tweet imported into a style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleTweet {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub edit_history_tweet_ids: Vec<String>,
    #[serde(default)]
    pub author: Option<TweetAuthor>,
}

/// Per-(user, account) writing style: example tweets plus free-form guidance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Style {
    #[serde(default)]
    pub tweets: Vec<StyleTweet>,
    #[serde(default)]
    pub prompt: Option<String>,
}
