pub mod accumulator;
pub mod builder;
pub mod dbs;
pub mod error;
pub mod keys;
pub mod models;
pub mod ratelimit;
pub mod repositories;
pub mod trait_client;

pub use accumulator::TurnAccumulator;
pub use builder::{StoreBuilder, Stores};
pub use dbs::memory::InMemoryStore;
#[cfg(feature = "mongodb")]
pub use dbs::mongo::MongoStore;
pub use error::{PersistError, Result};
pub use models::{
    AccountProfile, AccountRecord, DocumentQuery, DocumentType, KnowledgeDocument,
    NewKnowledgeDocument, Plan, Session, Style, StyleTweet, TweetAuthor, User, WebsiteContent,
};
pub use ratelimit::{RateLimitDecision, RateLimiter, Window};
pub use repositories::{
    AccountRepository, ChatHistoryRepository, GeneratedThreadRepository, MediaUploadRepository,
    StyleRepository, WebsiteContentRepository,
};
pub use trait_client::{KeyValueStore, KeyValueStoreExt, RecordStore};
