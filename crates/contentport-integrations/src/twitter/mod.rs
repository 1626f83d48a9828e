pub mod client;
pub mod links;
pub mod media;
pub mod oauth;

pub use client::{
    MediaUpload, NewTweet, PostedTweet, TweetAuthorInfo, TweetLookup, TwitterApi, TwitterConfig,
    TwitterHttpClient, TwitterUser, UserTokens, TWITTER_API_BASE, TWITTER_UPLOAD_BASE,
};
pub use links::{strip_short_links, tweet_id_from_url};
pub use media::MediaKind;
pub use oauth::OAuthCredentials;
