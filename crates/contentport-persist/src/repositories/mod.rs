//! Typed repositories over the key-value store.

pub mod account;
pub mod chat;
pub mod generation;
pub mod media;
pub mod style;
pub mod website;

pub use account::AccountRepository;
pub use chat::ChatHistoryRepository;
pub use generation::GeneratedThreadRepository;
pub use media::MediaUploadRepository;
pub use style::StyleRepository;
pub use website::WebsiteContentRepository;
