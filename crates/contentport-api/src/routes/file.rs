use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use contentport_integrations::{extract_text, preview, MediaKind};
use contentport_persist::{DocumentType, NewKnowledgeDocument, User};

use crate::{
    error::{ApiError, ApiResult},
    extract::ApiJson,
    services::{
        accounts::{account_tokens, require_active},
        file_types::{document_type, extension, is_allowed_upload, text_format, MAX_FILE_SIZE},
        media,
    },
    state::AppState,
};

const UPLOAD_EXPIRY: Duration = Duration::from_secs(60 * 60);
const DESCRIPTION_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadSource {
    Knowledge,
    Chat,
}

impl UploadSource {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Knowledge => "knowledge",
            Self::Chat => "chat",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub file_name: String,
    pub file_type: String,
    #[serde(default)]
    pub source: Option<UploadSource>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub fields: BTreeMap<String, String>,
    pub file_key: String,
    #[serde(rename = "type")]
    pub kind: Option<DocumentType>,
}

#[derive(Debug, Deserialize)]
pub struct TweetMediaUploadRequest {
    pub file_name: String,
    pub file_type: String,
}

#[derive(Debug, Serialize)]
pub struct TweetMediaUploadResponse {
    pub url: String,
    pub fields: BTreeMap<String, String>,
    pub file_key: String,
    pub media_type: MediaKind,
    pub size_limit: u64,
}

#[derive(Debug, Deserialize)]
pub struct UploadToTwitterRequest {
    pub s3_key: String,
    pub media_type: MediaKind,
}

#[derive(Debug, Serialize)]
pub struct UploadToTwitterResponse {
    pub media_id: String,
    pub media_key: String,
}

#[derive(Debug, Deserialize)]
pub struct PromoteRequest {
    pub file_key: String,
    pub file_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

fn object_key(prefix: &str, user_id: &str, file_name: &str) -> String {
    format!(
        "{}/{}/{}.{}",
        prefix,
        user_id,
        uuid::Uuid::new_v4().simple(),
        extension(file_name)
    )
}

/// Presigned POST for a knowledge or chat upload
pub async fn upload(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    ApiJson(req): ApiJson<UploadRequest>,
) -> ApiResult<Json<UploadResponse>> {
    if !is_allowed_upload(&req.file_type) {
        return Err(ApiError::BadRequest(
            "Invalid file type. Please upload a document (pdf, docx, txt) or image".to_string(),
        ));
    }

    let source = req.source.unwrap_or(UploadSource::Chat);
    let file_key = object_key(source.as_str(), &user.id, &req.file_name);
    let post = state
        .storage
        .presigned_post(&file_key, &req.file_type, MAX_FILE_SIZE, UPLOAD_EXPIRY)?;

    Ok(Json(UploadResponse {
        url: post.url,
        fields: post.fields,
        file_key,
        kind: document_type(&req.file_type),
    }))
}

/// Presigned POST for tweet media, limited to what Twitter accepts
pub async fn upload_tweet_media(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    ApiJson(req): ApiJson<TweetMediaUploadRequest>,
) -> ApiResult<Json<TweetMediaUploadResponse>> {
    let media_type = MediaKind::from_mime(&req.file_type).ok_or_else(|| {
        ApiError::BadRequest(
            "Invalid media type. Twitter supports JPG, PNG, WEBP, GIF, and MP4 files.".to_string(),
        )
    })?;

    let size_limit = media_type.size_limit();
    let file_key = object_key("tweet-media", &user.id, &req.file_name);
    let post = state
        .storage
        .presigned_post(&file_key, &req.file_type, size_limit, UPLOAD_EXPIRY)?;

    Ok(Json(TweetMediaUploadResponse {
        url: post.url,
        fields: post.fields,
        file_key,
        media_type,
        size_limit,
    }))
}

/// Upload a stored object to Twitter from the active account
pub async fn upload_media_to_twitter(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    ApiJson(req): ApiJson<UploadToTwitterRequest>,
) -> ApiResult<Json<UploadToTwitterResponse>> {
    let account = require_active(&state, &user.email, || {
        ApiError::BadRequest("No active account found".to_string())
    })
    .await?;

    let tokens = account_tokens(&state, &user.id, &account.id)
        .await?
        .ok_or_else(|| {
            ApiError::BadRequest(
                "Twitter account not connected or access token missing".to_string(),
            )
        })?;

    let owners = account.twitter_id.iter().cloned().collect();
    let media_id = media::upload_media(&state, &tokens, &req.s3_key, req.media_type, owners).await?;

    Ok(Json(UploadToTwitterResponse {
        media_key: format!("3_{}", media_id),
        media_id,
    }))
}

/// Turn an uploaded file into a knowledge document
pub async fn promote_to_knowledge_document(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    ApiJson(req): ApiJson<PromoteRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    let head = match state.storage.head_object(&req.file_key).await {
        Ok(Some(head)) => head,
        Ok(None) => return Err(ApiError::NotFound("File not found".to_string())),
        Err(e) => {
            tracing::warn!(file_key = %req.file_key, "HEAD failed: {}", e);
            return Err(ApiError::NotFound("File not found".to_string()));
        }
    };

    let content_type = head.content_type.unwrap_or_default();
    let kind = document_type(&content_type).ok_or_else(|| {
        ApiError::BadRequest(format!("Unsupported file type: {}", content_type))
    })?;

    let description = match text_format(kind) {
        Some(format) => {
            let object = state.storage.get_object(&req.file_key).await?;
            match extract_text(format, &object.bytes) {
                Ok(text) => Some(preview(&text, DESCRIPTION_CHARS)),
                Err(e) => {
                    tracing::warn!(file_key = %req.file_key, "Text extraction failed: {}", e);
                    Some("No preview available".to_string())
                }
            }
        }
        None if kind == DocumentType::Image => None,
        None => Some("No preview available".to_string()),
    };

    let mut document = NewKnowledgeDocument::new(user.id.clone(), kind);
    document.file_name = req.file_name;
    document.s3_key = req.file_key;
    document.tags = req.tags;
    document.title = req.title;
    document.description = description;
    document.size_bytes = head.content_length;

    let document = state.records.insert_document(document).await?;
    tracing::info!(document_id = %document.id, "Promoted upload to knowledge document");

    Ok(Json(SuccessResponse { success: true }))
}
