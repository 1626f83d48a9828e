use std::sync::Arc;

use crate::dbs::memory::InMemoryStore;
use crate::error::{PersistError, Result};
use crate::trait_client::{KeyValueStore, RecordStore};

/// Both storage layers, usually backed by the same store
#[derive(Clone)]
pub struct Stores {
    pub records: Arc<dyn RecordStore>,
    pub kv: Arc<dyn KeyValueStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self::from_store(InMemoryStore::new())
    }

    pub fn from_store<S>(store: S) -> Self
    where
        S: RecordStore + KeyValueStore + 'static,
    {
        let store = Arc::new(store);
        Self {
            records: store.clone(),
            kv: store,
        }
    }
}

pub struct StoreBuilder {
    mongodb_uri: Option<String>,
    database: Option<String>,
    in_memory: bool,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self {
            mongodb_uri: None,
            database: None,
            in_memory: false,
        }
    }

    pub fn mongodb_uri(mut self, uri: impl Into<String>) -> Self {
        self.mongodb_uri = Some(uri.into());
        self
    }

    pub fn database(mut self, db: impl Into<String>) -> Self {
        self.database = Some(db.into());
        self
    }

    /// Use the process-local store instead of MongoDB
    pub fn in_memory(mut self, enabled: bool) -> Self {
        self.in_memory = enabled;
        self
    }

    pub async fn build(self) -> Result<Stores> {
        if self.in_memory {
            tracing::warn!("Using in-memory store; data is lost on restart");
            return Ok(Stores::in_memory());
        }

        let mongodb_uri = self
            .mongodb_uri
            .ok_or_else(|| PersistError::Internal("mongodb_uri is required".to_string()))?;
        let database = self
            .database
            .ok_or_else(|| PersistError::Internal("database is required".to_string()))?;

        Self::connect_mongo(&mongodb_uri, &database).await
    }

    #[cfg(feature = "mongodb")]
    async fn connect_mongo(uri: &str, database: &str) -> Result<Stores> {
        let store = crate::dbs::mongo::MongoStore::connect(uri, database).await?;
        Ok(Stores::from_store(store))
    }

    #[cfg(not(feature = "mongodb"))]
    async fn connect_mongo(_uri: &str, _database: &str) -> Result<Stores> {
        Err(PersistError::Connection(
            "built without the mongodb feature".to_string(),
        ))
    }
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
