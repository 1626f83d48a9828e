use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{AccountRecord, DocumentType, KnowledgeDocument, Plan, Session, User};

/// MongoDB-specific User model (`_id` keyed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub plan: Plan,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoSession {
    #[serde(rename = "_id")]
    pub token: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoAccount {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub provider_id: String,
    pub account_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_secret: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub file_name: String,
    pub s3_key: String,
    #[serde(rename = "type")]
    pub kind: DocumentType,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_starred: bool,
    pub is_example: bool,
    pub is_deleted: bool,
    pub size_bytes: Option<i64>,
    #[serde(default)]
    pub metadata: Value,
    #[serde(default)]
    pub source_url: String,
    pub created_at: DateTime<Utc>,
}

// Conversions between database-agnostic and MongoDB-specific models

impl From<User> for MongoUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            plan: user.plan,
            created_at: user.created_at,
        }
    }
}

impl From<MongoUser> for User {
    fn from(user: MongoUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            plan: user.plan,
            created_at: user.created_at,
        }
    }
}

impl From<Session> for MongoSession {
    fn from(session: Session) -> Self {
        Self {
            token: session.token,
            user_id: session.user_id,
            expires_at: session.expires_at,
        }
    }
}

impl From<AccountRecord> for MongoAccount {
    fn from(account: AccountRecord) -> Self {
        Self {
            id: account.id,
            user_id: account.user_id,
            provider_id: account.provider_id,
            account_id: account.account_id,
            access_token: account.access_token,
            access_secret: account.access_secret,
            created_at: account.created_at,
        }
    }
}

impl From<MongoAccount> for AccountRecord {
    fn from(account: MongoAccount) -> Self {
        Self {
            id: account.id,
            user_id: account.user_id,
            provider_id: account.provider_id,
            account_id: account.account_id,
            access_token: account.access_token,
            access_secret: account.access_secret,
            created_at: account.created_at,
        }
    }
}

impl From<KnowledgeDocument> for MongoDocument {
    fn from(doc: KnowledgeDocument) -> Self {
        Self {
            id: doc.id,
            user_id: doc.user_id,
            file_name: doc.file_name,
            s3_key: doc.s3_key,
            kind: doc.kind,
            title: doc.title,
            description: doc.description,
            tags: doc.tags,
            is_starred: doc.is_starred,
            is_example: doc.is_example,
            is_deleted: doc.is_deleted,
            size_bytes: doc.size_bytes,
            metadata: doc.metadata,
            source_url: doc.source_url,
            created_at: doc.created_at,
        }
    }
}

impl From<MongoDocument> for KnowledgeDocument {
    fn from(doc: MongoDocument) -> Self {
        Self {
            id: doc.id,
            user_id: doc.user_id,
            file_name: doc.file_name,
            s3_key: doc.s3_key,
            kind: doc.kind,
            title: doc.title,
            description: doc.description,
            tags: doc.tags,
            is_starred: doc.is_starred,
            is_example: doc.is_example,
            is_deleted: doc.is_deleted,
            size_bytes: doc.size_bytes,
            metadata: doc.metadata,
            source_url: doc.source_url,
            created_at: doc.created_at,
        }
    }
}
