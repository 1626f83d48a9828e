use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::error::Result;
use crate::models::{
    AccountRecord, DocumentQuery, KnowledgeDocument, NewKnowledgeDocument, Session, User,
};

/// Relational records: users, sessions, linked accounts and knowledge documents
///
/// Users, sessions and accounts are written by the auth layer; the `save_*`
/// methods exist for it and for fixtures.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// User owning a live session token
    async fn find_session_user(&self, token: &str) -> Result<Option<User>>;

    async fn save_user(&self, user: User) -> Result<()>;

    async fn save_session(&self, session: Session) -> Result<()>;

    async fn save_account(&self, account: AccountRecord) -> Result<()>;

    /// Accounts of one provider, newest first
    async fn list_accounts(&self, user_id: &str, provider_id: &str) -> Result<Vec<AccountRecord>>;

    async fn get_account(&self, user_id: &str, account_id: &str) -> Result<Option<AccountRecord>>;

    /// Returns whether a record was removed
    async fn delete_account(&self, user_id: &str, account_id: &str) -> Result<bool>;

    async fn insert_document(&self, document: NewKnowledgeDocument) -> Result<KnowledgeDocument>;

    async fn get_document(&self, user_id: &str, id: &str) -> Result<Option<KnowledgeDocument>>;

    /// Non-deleted documents matching the query, newest first
    async fn list_documents(
        &self,
        user_id: &str,
        query: &DocumentQuery,
    ) -> Result<Vec<KnowledgeDocument>>;

    /// Sets the soft-delete flag; returns whether a document matched
    async fn soft_delete_document(&self, user_id: &str, id: &str) -> Result<bool>;

    async fn ping(&self) -> Result<()>;
}

/// JSON key-value store with per-key expiry
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_value(&self, key: &str) -> Result<Option<Value>>;

    /// Overwrites the key; `None` keeps it until deleted
    async fn set_value(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<()>;

    /// Returns whether the key existed
    async fn delete(&self, key: &str) -> Result<bool>;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// Atomically adds `by` to an integer key and returns the new value.
    /// A missing key starts at zero and expires after `ttl`.
    async fn incr_by(&self, key: &str, by: i64, ttl: Duration) -> Result<i64>;

    async fn ping(&self) -> Result<()>;
}

/// Typed helpers over [`KeyValueStore`]
#[async_trait]
pub trait KeyValueStoreExt: KeyValueStore {
    async fn get_json<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        match self.get_value(key).await? {
            Some(Value::Null) | None => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    async fn set_json<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> Result<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        let value = serde_json::to_value(value)?;
        self.set_value(key, value, ttl).await
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}
