use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::keys;
use crate::trait_client::{KeyValueStore, KeyValueStoreExt};

/// Twitter discards uploaded media ids after a day
pub const MEDIA_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Upload timestamps (unix millis) of media ids handed out by Twitter
#[derive(Clone)]
pub struct MediaUploadRepository {
    store: Arc<dyn KeyValueStore>,
}

impl MediaUploadRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn record(&self, media_id: &str, uploaded_at_ms: i64) -> Result<()> {
        self.store
            .set_json(
                &keys::media_upload(media_id),
                &uploaded_at_ms,
                Some(MEDIA_MAX_AGE),
            )
            .await
    }

    pub async fn uploaded_at(&self, media_id: &str) -> Result<Option<i64>> {
        self.store.get_json(&keys::media_upload(media_id)).await
    }

    /// True iff a timestamp exists and is younger than [`MEDIA_MAX_AGE`]
    pub async fn is_fresh_at(&self, media_id: &str, now_ms: i64) -> Result<bool> {
        let Some(uploaded_at) = self.uploaded_at(media_id).await? else {
            return Ok(false);
        };
        Ok(now_ms - uploaded_at < MEDIA_MAX_AGE.as_millis() as i64)
    }
}
