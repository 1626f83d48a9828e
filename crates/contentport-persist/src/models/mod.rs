pub mod account;
pub mod knowledge;
pub mod style;
pub mod user;
pub mod website;

pub use account::{AccountProfile, AccountRecord};
pub use knowledge::{DocumentQuery, DocumentType, KnowledgeDocument, NewKnowledgeDocument};
pub use style::{Style, StyleTweet, TweetAuthor};
pub use user::{Plan, Session, User};
pub use website::WebsiteContent;
