use async_trait::async_trait;
use mongodb::{bson::doc, Client};
use serde_json::Value;
use std::time::Duration;

use crate::dbs::mongo::repositories::{
    MongoAccountRepository, MongoDocumentRepository, MongoKeyValueRepository, MongoUserRepository,
};
use crate::error::{PersistError, Result};
use crate::models::{
    AccountRecord, DocumentQuery, KnowledgeDocument, NewKnowledgeDocument, Session, User,
};
use crate::trait_client::{KeyValueStore, RecordStore};

/// MongoDB-backed store serving both records and the key-value layer
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    database: String,
    user_repo: MongoUserRepository,
    account_repo: MongoAccountRepository,
    document_repo: MongoDocumentRepository,
    kv_repo: MongoKeyValueRepository,
}

impl MongoStore {
    /// Connect to MongoDB and create the TTL index used by the key-value layer
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        let store = Self {
            user_repo: MongoUserRepository::new(&client, database),
            account_repo: MongoAccountRepository::new(&client, database),
            document_repo: MongoDocumentRepository::new(&client, database),
            kv_repo: MongoKeyValueRepository::new(&client, database),
            database: database.to_string(),
            client,
        };

        store.kv_repo.ensure_indexes().await?;
        tracing::info!(database = %database, "Connected to MongoDB");

        Ok(store)
    }

    async fn run_ping(&self) -> Result<()> {
        self.client
            .database(&self.database)
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MongoStore {
    async fn find_session_user(&self, token: &str) -> Result<Option<User>> {
        let user = self.user_repo.find_session_user(token).await?;
        Ok(user.map(Into::into))
    }

    async fn save_user(&self, user: User) -> Result<()> {
        self.user_repo.save_user(user.into()).await
    }

    async fn save_session(&self, session: Session) -> Result<()> {
        self.user_repo.save_session(session.into()).await
    }

    async fn save_account(&self, account: AccountRecord) -> Result<()> {
        self.account_repo.save(account.into()).await
    }

    async fn list_accounts(&self, user_id: &str, provider_id: &str) -> Result<Vec<AccountRecord>> {
        let accounts = self.account_repo.list(user_id, provider_id).await?;
        Ok(accounts.into_iter().map(Into::into).collect())
    }

    async fn get_account(&self, user_id: &str, account_id: &str) -> Result<Option<AccountRecord>> {
        let account = self.account_repo.get(user_id, account_id).await?;
        Ok(account.map(Into::into))
    }

    async fn delete_account(&self, user_id: &str, account_id: &str) -> Result<bool> {
        self.account_repo.delete(user_id, account_id).await
    }

    async fn insert_document(&self, document: NewKnowledgeDocument) -> Result<KnowledgeDocument> {
        let document = document.into_document();
        self.document_repo.insert(document.clone().into()).await?;
        Ok(document)
    }

    async fn get_document(&self, user_id: &str, id: &str) -> Result<Option<KnowledgeDocument>> {
        let document = self.document_repo.get(user_id, id).await?;
        Ok(document.map(Into::into))
    }

    async fn list_documents(
        &self,
        user_id: &str,
        query: &DocumentQuery,
    ) -> Result<Vec<KnowledgeDocument>> {
        let documents = self.document_repo.list(user_id, query).await?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn soft_delete_document(&self, user_id: &str, id: &str) -> Result<bool> {
        self.document_repo.soft_delete(user_id, id).await
    }

    async fn ping(&self) -> Result<()> {
        self.run_ping().await
    }
}

#[async_trait]
impl KeyValueStore for MongoStore {
    async fn get_value(&self, key: &str) -> Result<Option<Value>> {
        self.kv_repo.get(key).await
    }

    async fn set_value(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<()> {
        self.kv_repo.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.kv_repo.delete(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.kv_repo.get(key).await?.is_some())
    }

    async fn incr_by(&self, key: &str, by: i64, ttl: Duration) -> Result<i64> {
        self.kv_repo.incr_by(key, by, ttl).await
    }

    async fn ping(&self) -> Result<()> {
        self.run_ping().await
    }
}
