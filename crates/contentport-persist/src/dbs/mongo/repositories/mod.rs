pub mod account;
pub mod document;
pub mod kv;
pub mod user;

pub use account::MongoAccountRepository;
pub use document::MongoDocumentRepository;
pub use kv::MongoKeyValueRepository;
pub use user::MongoUserRepository;
