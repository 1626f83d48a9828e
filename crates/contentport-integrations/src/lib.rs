pub mod error;
pub mod extract;
pub mod s3;
pub mod scrape;
pub mod twitter;

pub use error::{IntegrationError, Result};
pub use extract::{extract_text, preview, DocumentFormat};
pub use s3::{ObjectHead, ObjectStorage, PresignedPost, S3Client, S3Config, StoredObject};
pub use scrape::{FirecrawlClient, ScrapedPage, WebScraper};
pub use twitter::{
    strip_short_links, tweet_id_from_url, MediaKind, MediaUpload, NewTweet, OAuthCredentials,
    PostedTweet, TweetAuthorInfo, TweetLookup, TwitterApi, TwitterConfig, TwitterHttpClient,
    TwitterUser, UserTokens,
};
