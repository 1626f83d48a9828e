pub mod client;
pub mod sigv4;

pub use client::{ObjectHead, ObjectStorage, PresignedPost, S3Client, S3Config, StoredObject};
