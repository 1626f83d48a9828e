//! Twitter media ids expire a day after upload; stale ones are re-uploaded
//! from object storage before a tweet references them.

use chrono::Utc;
use contentport_integrations::{MediaKind, MediaUpload, StoredObject, UserTokens};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Media attached to a tweet: the stored object and its Twitter media id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub s3_key: String,
    pub media_id: String,
}

/// True iff the media id was uploaded less than 24 hours ago
pub async fn validate_media_upload_age(state: &AppState, media_id: &str) -> ApiResult<bool> {
    Ok(state
        .media_uploads()
        .is_fresh_at(media_id, Utc::now().timestamp_millis())
        .await?)
}

/// Upload a stored object to Twitter and remember when it happened
pub async fn upload_object(
    state: &AppState,
    tokens: &UserTokens,
    object: StoredObject,
    kind: MediaKind,
    additional_owners: Vec<String>,
) -> ApiResult<String> {
    let mime_type = kind.upload_mime(object.content_type.as_deref());
    let media_id = state
        .twitter
        .upload_media(
            tokens,
            MediaUpload {
                bytes: object.bytes,
                mime_type,
                kind,
                additional_owners,
            },
        )
        .await?;

    state
        .media_uploads()
        .record(&media_id, Utc::now().timestamp_millis())
        .await?;

    tracing::info!(media_id = %media_id, kind = kind.as_str(), "Uploaded media to Twitter");
    Ok(media_id)
}

/// Fetch `s3_key` and upload it as `kind`
pub async fn upload_media(
    state: &AppState,
    tokens: &UserTokens,
    s3_key: &str,
    kind: MediaKind,
    additional_owners: Vec<String>,
) -> ApiResult<String> {
    let object = state
        .storage
        .get_object(s3_key)
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to fetch media from S3: {}", e)))?;

    upload_object(state, tokens, object, kind, additional_owners).await
}

/// Re-upload every item whose media id is missing or older than 24 hours
pub async fn ensure_valid_media(
    state: &AppState,
    tokens: &UserTokens,
    items: Vec<MediaItem>,
) -> ApiResult<Vec<MediaItem>> {
    let mut valid = Vec::with_capacity(items.len());

    for item in items {
        if !item.media_id.is_empty() && validate_media_upload_age(state, &item.media_id).await? {
            valid.push(item);
            continue;
        }

        tracing::debug!(s3_key = %item.s3_key, "Media id expired, re-uploading");

        let object = state.storage.get_object(&item.s3_key).await.map_err(|e| {
            tracing::warn!(s3_key = %item.s3_key, "Failed to fetch media: {}", e);
            ApiError::BadRequest(format!("Failed to fetch media from S3: {}", item.s3_key))
        })?;

        let content_type = object.content_type.clone().unwrap_or_default();
        let kind = MediaKind::from_content_type(&content_type).ok_or_else(|| {
            ApiError::BadRequest(format!("Unsupported media type: {}", content_type))
        })?;

        let media_id = upload_object(state, tokens, object, kind, Vec::new()).await?;
        valid.push(MediaItem {
            s3_key: item.s3_key,
            media_id,
        });
    }

    Ok(valid)
}
