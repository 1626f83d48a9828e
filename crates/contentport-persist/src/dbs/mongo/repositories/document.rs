use futures::TryStreamExt;
use mongodb::{bson::doc, Client, Collection};

use crate::dbs::mongo::models::MongoDocument;
use crate::error::Result;
use crate::models::DocumentQuery;

#[derive(Clone)]
pub struct MongoDocumentRepository {
    collection: Collection<MongoDocument>,
}

impl MongoDocumentRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("knowledge_documents");
        Self { collection }
    }

    pub async fn insert(&self, document: MongoDocument) -> Result<()> {
        self.collection.insert_one(&document).await?;
        Ok(())
    }

    pub async fn get(&self, user_id: &str, id: &str) -> Result<Option<MongoDocument>> {
        let filter = doc! { "_id": id, "user_id": user_id };
        Ok(self.collection.find_one(filter).await?)
    }

    /// Non-deleted documents, newest first
    pub async fn list(&self, user_id: &str, query: &DocumentQuery) -> Result<Vec<MongoDocument>> {
        let mut filter = doc! { "user_id": user_id, "is_deleted": false };
        if let Some(starred) = query.is_starred {
            filter.insert("is_starred", starred);
        }

        let documents = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .skip(query.offset)
            .limit(query.limit)
            .await?
            .try_collect()
            .await?;
        Ok(documents)
    }

    pub async fn soft_delete(&self, user_id: &str, id: &str) -> Result<bool> {
        let filter = doc! { "_id": id, "user_id": user_id };
        let update = doc! { "$set": { "is_deleted": true } };
        let result = self.collection.update_one(filter, update).await?;
        Ok(result.matched_count > 0)
    }
}
