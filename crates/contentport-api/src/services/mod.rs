pub mod accounts;
pub mod attachments;
pub mod conversation;
pub mod file_types;
pub mod media;
