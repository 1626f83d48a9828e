use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Url,
    Txt,
    Docx,
    Pdf,
    Image,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub s3_key: String,
    #[serde(rename = "type")]
    pub kind: DocumentType,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_starred: bool,
    #[serde(default)]
    pub is_example: bool,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub size_bytes: Option<i64>,
    #[serde(default)]
    pub metadata: Value,
    #[serde(default)]
    pub source_url: String,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when inserting a document; the store assigns id and timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct NewKnowledgeDocument {
    pub user_id: String,
    pub file_name: String,
    pub s3_key: String,
    pub kind: DocumentType,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub size_bytes: Option<i64>,
    pub metadata: Value,
    pub source_url: String,
}

impl NewKnowledgeDocument {
    pub fn new(user_id: impl Into<String>, kind: DocumentType) -> Self {
        Self {
            user_id: user_id.into(),
            file_name: String::new(),
            s3_key: String::new(),
            kind,
            title: None,
            description: None,
            tags: Vec::new(),
            size_bytes: None,
            metadata: Value::Object(Default::default()),
            source_url: String::new(),
        }
    }

    pub fn into_document(self) -> KnowledgeDocument {
        KnowledgeDocument {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: self.user_id,
            file_name: self.file_name,
            s3_key: self.s3_key,
            kind: self.kind,
            title: self.title,
            description: self.description,
            tags: self.tags,
            is_starred: false,
            is_example: false,
            is_deleted: false,
            size_bytes: self.size_bytes,
            metadata: self.metadata,
            source_url: self.source_url,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentQuery {
    pub is_starred: Option<bool>,
    pub limit: i64,
    pub offset: u64,
}

impl Default for DocumentQuery {
    fn default() -> Self {
        Self {
            is_starred: None,
            limit: 100,
            offset: 0,
        }
    }
}

impl DocumentQuery {
    pub fn matches(&self, document: &KnowledgeDocument) -> bool {
        !document.is_deleted
            && self
                .is_starred
                .map_or(true, |starred| document.is_starred == starred)
    }
}
