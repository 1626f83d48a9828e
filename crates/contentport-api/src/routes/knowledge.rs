use axum::{
    extract::State,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use url::Url;

use contentport_integrations::tweet_id_from_url;
use contentport_persist::{DocumentQuery, DocumentType, KnowledgeDocument, NewKnowledgeDocument, User};

use crate::{
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiQuery},
    routes::file::SuccessResponse,
    state::AppState,
};

const MAX_LIST_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct DocumentIdQuery {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub document: KnowledgeDocument,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub is_starred: Option<bool>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub documents: Vec<KnowledgeDocument>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct ImportUrlRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ImportUrlResponse {
    pub success: bool,
    pub document_id: String,
    pub title: String,
    pub url: String,
}

impl ListQuery {
    fn into_document_query(self) -> ApiResult<DocumentQuery> {
        let limit = self.limit.unwrap_or(MAX_LIST_LIMIT);
        if !(1..=MAX_LIST_LIMIT).contains(&limit) {
            return Err(ApiError::BadRequest(format!(
                "limit must be between 1 and {}",
                MAX_LIST_LIMIT
            )));
        }

        let offset = self.offset.unwrap_or(0);
        let offset = u64::try_from(offset)
            .map_err(|_| ApiError::BadRequest("offset must not be negative".to_string()))?;

        Ok(DocumentQuery {
            is_starred: self.is_starred,
            limit,
            offset,
        })
    }
}

pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    ApiQuery(query): ApiQuery<DocumentIdQuery>,
) -> ApiResult<Json<DocumentResponse>> {
    let document = state
        .records
        .get_document(&user.id, &query.id)
        .await?
        .filter(|document| !document.is_deleted)
        .ok_or_else(|| ApiError::NotFound("Document not found".to_string()))?;

    Ok(Json(DocumentResponse { document }))
}

/// Non-deleted documents of the user, newest first
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Json<ListResponse>> {
    let query = query.into_document_query()?;
    let documents = state.records.list_documents(&user.id, &query).await?;

    Ok(Json(ListResponse {
        total: documents.len(),
        documents,
    }))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    ApiJson(req): ApiJson<DeleteRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    if !state.records.soft_delete_document(&user.id, &req.id).await? {
        return Err(ApiError::NotFound("Document not found".to_string()));
    }

    tracing::info!(document_id = %req.id, "Knowledge document deleted");
    Ok(Json(SuccessResponse { success: true }))
}

async fn tweet_document(
    state: &AppState,
    user: &User,
    url: &Url,
    tweet_id: &str,
) -> ApiResult<NewKnowledgeDocument> {
    let tweet = match state.twitter.lookup_tweet(tweet_id).await {
        Ok(Some(tweet)) => tweet,
        Ok(None) => return Err(ApiError::BadRequest("Failed to fetch tweet".to_string())),
        Err(e) => {
            tracing::warn!(tweet_id, "Tweet lookup failed: {}", e);
            return Err(ApiError::BadRequest("Failed to fetch tweet".to_string()));
        }
    };

    let text = tweet.full_text().to_string();
    let title = match &tweet.author {
        Some(author) => format!("Tweet by @{}", author.username),
        None => format!("Tweet {}", tweet.id),
    };

    let mut document = NewKnowledgeDocument::new(user.id.clone(), DocumentType::Url);
    document.file_name = title.clone();
    document.title = Some(title);
    document.description = Some(text.clone());
    document.source_url = url.to_string();
    document.metadata = json!({
        "is_tweet": true,
        "author": tweet.author.as_ref().map(|author| json!({
            "name": author.name,
            "username": author.username,
            "profile_image_url": author.profile_image_url,
        })),
        "tweet": {
            "id": tweet.id,
            "text": text,
            "created_at": tweet.created_at,
        },
    });

    Ok(document)
}

async fn page_document(state: &AppState, user: &User, url: &Url) -> ApiResult<NewKnowledgeDocument> {
    let page = state
        .scraper
        .scrape(url.as_str())
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to fetch URL: {}", e)))?;

    let title = page
        .title
        .filter(|title| !title.trim().is_empty())
        .or_else(|| url.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string());

    let mut document = NewKnowledgeDocument::new(user.id.clone(), DocumentType::Url);
    document.file_name = title.clone();
    document.title = Some(title);
    document.description = page.description;
    document.source_url = url.to_string();
    document.metadata = json!({ "is_tweet": false });

    Ok(document)
}

/// Import a web page, or a tweet for twitter.com/x.com status links
pub async fn import_url(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    ApiJson(req): ApiJson<ImportUrlRequest>,
) -> ApiResult<Json<ImportUrlResponse>> {
    let url = Url::parse(req.url.trim())
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .ok_or_else(|| ApiError::BadRequest("Invalid URL".to_string()))?;

    let document = match tweet_id_from_url(url.as_str()) {
        Some(tweet_id) => tweet_document(&state, &user, &url, &tweet_id).await?,
        None => page_document(&state, &user, &url).await?,
    };

    let document = state.records.insert_document(document).await?;
    tracing::info!(document_id = %document.id, url = %url, "Imported URL into knowledge base");

    Ok(Json(ImportUrlResponse {
        success: true,
        title: document.title.clone().unwrap_or_default(),
        document_id: document.id,
        url: document.source_url,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(limit: Option<i64>, offset: Option<i64>) -> ListQuery {
        ListQuery {
            is_starred: None,
            limit,
            offset,
        }
    }

    #[test]
    fn test_list_query_defaults() {
        let q = query(None, None).into_document_query().unwrap();
        assert_eq!(q.limit, 100);
        assert_eq!(q.offset, 0);
    }

    #[test]
    fn test_list_query_bounds() {
        assert!(query(Some(0), None).into_document_query().is_err());
        assert!(query(Some(101), None).into_document_query().is_err());
        assert!(query(Some(10), Some(-1)).into_document_query().is_err());
        assert_eq!(query(Some(10), Some(5)).into_document_query().unwrap().offset, 5);
    }
}
