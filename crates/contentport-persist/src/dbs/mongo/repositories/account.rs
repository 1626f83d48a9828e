use futures::TryStreamExt;
use mongodb::{bson::doc, Client, Collection};

use crate::dbs::mongo::models::MongoAccount;
use crate::error::Result;

#[derive(Clone)]
pub struct MongoAccountRepository {
    collection: Collection<MongoAccount>,
}

impl MongoAccountRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("accounts");
        Self { collection }
    }

    pub async fn save(&self, account: MongoAccount) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &account.id }, &account)
            .upsert(true)
            .await?;
        Ok(())
    }

    /// Accounts of one provider for a user, newest first
    pub async fn list(&self, user_id: &str, provider_id: &str) -> Result<Vec<MongoAccount>> {
        let filter = doc! { "user_id": user_id, "provider_id": provider_id };
        let accounts = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(accounts)
    }

    pub async fn get(&self, user_id: &str, account_id: &str) -> Result<Option<MongoAccount>> {
        let filter = doc! { "_id": account_id, "user_id": user_id };
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn delete(&self, user_id: &str, account_id: &str) -> Result<bool> {
        let filter = doc! { "_id": account_id, "user_id": user_id };
        let result = self.collection.delete_one(filter).await?;
        Ok(result.deleted_count > 0)
    }
}
