pub mod chat;
pub mod file;
pub mod health;
pub mod knowledge;
pub mod settings;
pub mod style;
pub mod tweet;
