use mongodb::bson::{self, doc, Bson, Document};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, IndexModel};
use serde_json::Value;
use std::time::Duration;

use crate::error::{PersistError, Result};

/// Key-value entries stored as `{_id: key, value, expires_at}`.
///
/// A TTL index on `expires_at` reaps entries in the background; reads also
/// filter on it since the reaper runs only about once a minute.
#[derive(Clone)]
pub struct MongoKeyValueRepository {
    collection: Collection<Document>,
}

fn expiry_from_now(ttl: Duration) -> bson::DateTime {
    let millis = bson::DateTime::now().timestamp_millis() + ttl.as_millis() as i64;
    bson::DateTime::from_millis(millis)
}

/// Matches entries that have no expiry or have not expired yet
fn live_filter(key: &str) -> Document {
    doc! {
        "_id": key,
        "$or": [
            { "expires_at": Bson::Null },
            { "expires_at": { "$gt": bson::DateTime::now() } },
        ],
    }
}

impl MongoKeyValueRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("kv");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "expires_at": 1 })
            .options(
                IndexOptions::builder()
                    .expire_after(Duration::from_secs(0))
                    .build(),
            )
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }

    pub async fn get(&self, key: &str) -> Result<Option<Value>> {
        let Some(entry) = self.collection.find_one(live_filter(key)).await? else {
            return Ok(None);
        };
        match entry.get("value") {
            Some(value) => Ok(Some(bson::from_bson(value.clone())?)),
            None => Ok(None),
        }
    }

    pub async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<()> {
        let mut entry = doc! {
            "_id": key,
            "value": bson::to_bson(&value)?,
        };
        if let Some(ttl) = ttl {
            entry.insert("expires_at", expiry_from_now(ttl));
        }

        self.collection
            .replace_one(doc! { "_id": key }, entry)
            .upsert(true)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<bool> {
        let result = self.collection.delete_one(live_filter(key)).await?;
        Ok(result.deleted_count > 0)
    }

    pub async fn incr_by(&self, key: &str, by: i64, ttl: Duration) -> Result<i64> {
        // An expired counter starts over
        self.collection
            .delete_one(doc! { "_id": key, "expires_at": { "$lte": bson::DateTime::now() } })
            .await?;

        let update = doc! {
            "$inc": { "value": by },
            "$setOnInsert": { "expires_at": expiry_from_now(ttl) },
        };
        let entry = self
            .collection
            .find_one_and_update(doc! { "_id": key }, update)
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| PersistError::Internal(format!("counter {} vanished", key)))?;

        match entry.get("value") {
            Some(Bson::Int64(n)) => Ok(*n),
            Some(Bson::Int32(n)) => Ok(i64::from(*n)),
            _ => Err(PersistError::Internal(format!(
                "value at {} is not an integer",
                key
            ))),
        }
    }
}
