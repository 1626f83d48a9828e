use std::sync::Arc;

use crate::error::Result;
use crate::keys;
use crate::models::AccountProfile;
use crate::trait_client::{KeyValueStore, KeyValueStoreExt};

/// Account profiles and the per-user active account
#[derive(Clone)]
pub struct AccountRepository {
    store: Arc<dyn KeyValueStore>,
}

impl AccountRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn get_profile(&self, email: &str, account_id: &str) -> Result<Option<AccountProfile>> {
        self.store
            .get_json(&keys::account_profile(email, account_id))
            .await
    }

    pub async fn save_profile(&self, email: &str, profile: &AccountProfile) -> Result<()> {
        self.store
            .set_json(&keys::account_profile(email, &profile.id), profile, None)
            .await
    }

    pub async fn delete_profile(&self, email: &str, account_id: &str) -> Result<bool> {
        self.store
            .delete(&keys::account_profile(email, account_id))
            .await
    }

    pub async fn active(&self, email: &str) -> Result<Option<AccountProfile>> {
        self.store.get_json(&keys::active_account(email)).await
    }

    /// Replaces the active account; a user has at most one
    pub async fn set_active(&self, email: &str, profile: &AccountProfile) -> Result<()> {
        self.store
            .set_json(&keys::active_account(email), profile, None)
            .await
    }

    pub async fn clear_active(&self, email: &str) -> Result<bool> {
        self.store.delete(&keys::active_account(email)).await
    }
}
