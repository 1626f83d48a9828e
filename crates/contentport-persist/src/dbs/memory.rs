//! In-memory store for development and tests.
//!
//! Implements both [`RecordStore`] and [`KeyValueStore`]; data is lost on restart.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::error::{PersistError, Result};
use crate::models::{
    AccountRecord, DocumentQuery, KnowledgeDocument, NewKnowledgeDocument, Session, User,
};
use crate::trait_client::{KeyValueStore, RecordStore};

#[derive(Debug, Clone)]
struct KvEntry {
    value: Value,
    expires_at: Option<Instant>,
}

impl KvEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map_or(false, |at| at <= now)
    }
}

#[derive(Debug, Default)]
struct Records {
    users: HashMap<String, User>,
    sessions: HashMap<String, Session>,
    accounts: HashMap<String, AccountRecord>,
    documents: HashMap<String, KnowledgeDocument>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    records: Arc<RwLock<Records>>,
    kv: Arc<RwLock<HashMap<String, KvEntry>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys
    pub async fn kv_len(&self) -> usize {
        let now = Instant::now();
        self.kv
            .read()
            .await
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    /// Remaining time to live of a key, `None` when missing or persistent
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let kv = self.kv.read().await;
        let entry = kv.get(key)?;
        entry
            .expires_at
            .map(|at| at.saturating_duration_since(Instant::now()))
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get_value(&self, key: &str) -> Result<Option<Value>> {
        let now = Instant::now();
        {
            let kv = self.kv.read().await;
            match kv.get(key) {
                Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Expired entry: drop it
        self.kv.write().await.remove(key);
        Ok(None)
    }

    async fn set_value(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<()> {
        let entry = KvEntry {
            value,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.kv.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let now = Instant::now();
        let removed = self.kv.write().await.remove(key);
        Ok(removed.map_or(false, |entry| !entry.is_expired(now)))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get_value(key).await?.is_some())
    }

    async fn incr_by(&self, key: &str, by: i64, ttl: Duration) -> Result<i64> {
        let now = Instant::now();
        let mut kv = self.kv.write().await;

        let entry = kv
            .entry(key.to_string())
            .and_modify(|entry| {
                if entry.is_expired(now) {
                    entry.value = Value::from(0);
                    entry.expires_at = Some(now + ttl);
                }
            })
            .or_insert_with(|| KvEntry {
                value: Value::from(0),
                expires_at: Some(now + ttl),
            });

        let current = entry.value.as_i64().ok_or_else(|| {
            PersistError::Internal(format!("value at {} is not an integer", key))
        })?;
        let next = current + by;
        entry.value = Value::from(next);
        Ok(next)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn find_session_user(&self, token: &str) -> Result<Option<User>> {
        let records = self.records.read().await;
        let Some(session) = records.sessions.get(token) else {
            return Ok(None);
        };
        if session.is_expired_at(Utc::now()) {
            return Ok(None);
        }
        Ok(records.users.get(&session.user_id).cloned())
    }

    async fn save_user(&self, user: User) -> Result<()> {
        self.records.write().await.users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn save_session(&self, session: Session) -> Result<()> {
        self.records
            .write()
            .await
            .sessions
            .insert(session.token.clone(), session);
        Ok(())
    }

    async fn save_account(&self, account: AccountRecord) -> Result<()> {
        self.records
            .write()
            .await
            .accounts
            .insert(account.id.clone(), account);
        Ok(())
    }

    async fn list_accounts(&self, user_id: &str, provider_id: &str) -> Result<Vec<AccountRecord>> {
        let records = self.records.read().await;
        let mut accounts: Vec<AccountRecord> = records
            .accounts
            .values()
            .filter(|a| a.user_id == user_id && a.provider_id == provider_id)
            .cloned()
            .collect();
        accounts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(accounts)
    }

    async fn get_account(&self, user_id: &str, account_id: &str) -> Result<Option<AccountRecord>> {
        let records = self.records.read().await;
        Ok(records
            .accounts
            .get(account_id)
            .filter(|a| a.user_id == user_id)
            .cloned())
    }

    async fn delete_account(&self, user_id: &str, account_id: &str) -> Result<bool> {
        let mut records = self.records.write().await;
        let owned = records
            .accounts
            .get(account_id)
            .map_or(false, |a| a.user_id == user_id);
        if owned {
            records.accounts.remove(account_id);
        }
        Ok(owned)
    }

    async fn insert_document(&self, document: NewKnowledgeDocument) -> Result<KnowledgeDocument> {
        let document = document.into_document();
        self.records
            .write()
            .await
            .documents
            .insert(document.id.clone(), document.clone());
        Ok(document)
    }

    async fn get_document(&self, user_id: &str, id: &str) -> Result<Option<KnowledgeDocument>> {
        let records = self.records.read().await;
        Ok(records
            .documents
            .get(id)
            .filter(|d| d.user_id == user_id)
            .cloned())
    }

    async fn list_documents(
        &self,
        user_id: &str,
        query: &DocumentQuery,
    ) -> Result<Vec<KnowledgeDocument>> {
        let records = self.records.read().await;
        let mut documents: Vec<KnowledgeDocument> = records
            .documents
            .values()
            .filter(|d| d.user_id == user_id && query.matches(d))
            .cloned()
            .collect();
        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(documents
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit.max(0) as usize)
            .collect())
    }

    async fn soft_delete_document(&self, user_id: &str, id: &str) -> Result<bool> {
        let mut records = self.records.write().await;
        match records.documents.get_mut(id) {
            Some(document) if document.user_id == user_id => {
                document.is_deleted = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
