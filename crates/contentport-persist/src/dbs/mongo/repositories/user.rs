use chrono::Utc;
use mongodb::{bson::doc, Client, Collection};

use crate::dbs::mongo::models::{MongoSession, MongoUser};
use crate::error::Result;

#[derive(Clone)]
pub struct MongoUserRepository {
    users: Collection<MongoUser>,
    sessions: Collection<MongoSession>,
}

impl MongoUserRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let database = client.database(db_name);
        Self {
            users: database.collection("users"),
            sessions: database.collection("sessions"),
        }
    }

    /// Resolve a session token to its user; expired sessions resolve to nothing
    pub async fn find_session_user(&self, token: &str) -> Result<Option<MongoUser>> {
        let Some(session) = self.sessions.find_one(doc! { "_id": token }).await? else {
            return Ok(None);
        };
        if session.expires_at <= Utc::now() {
            return Ok(None);
        }

        Ok(self
            .users
            .find_one(doc! { "_id": &session.user_id })
            .await?)
    }

    pub async fn save_user(&self, user: MongoUser) -> Result<()> {
        self.users
            .replace_one(doc! { "_id": &user.id }, &user)
            .upsert(true)
            .await?;
        Ok(())
    }

    pub async fn save_session(&self, session: MongoSession) -> Result<()> {
        self.sessions
            .replace_one(doc! { "_id": &session.token }, &session)
            .upsert(true)
            .await?;
        Ok(())
    }
}
