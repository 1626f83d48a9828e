use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

use super::sigv4::{self, Credentials, ALGORITHM, EMPTY_PAYLOAD_HASH};
use crate::error::{IntegrationError, Result};

/// Browser upload target: POST `fields` plus the file to `url`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresignedPost {
    pub url: String,
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectHead {
    pub content_type: Option<String>,
    pub content_length: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// POST policy limited to `max_bytes` and exactly `content_type`
    fn presigned_post(
        &self,
        key: &str,
        content_type: &str,
        max_bytes: u64,
        expires_in: Duration,
    ) -> Result<PresignedPost>;

    /// `None` when the object does not exist
    async fn head_object(&self, key: &str) -> Result<Option<ObjectHead>>;

    async fn get_object(&self, key: &str) -> Result<StoredObject>;

    fn public_url(&self, key: &str) -> String;
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    #[serde(default)]
    pub access_key_id: String,
    #[serde(default)]
    pub secret_access_key: String,
    /// Path-style endpoint for S3-compatible stores; AWS virtual-hosted URLs otherwise
    #[serde(default)]
    pub endpoint: Option<String>,
}

pub struct S3Client {
    http_client: reqwest::Client,
    config: S3Config,
}

fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

impl S3Client {
    pub fn new(config: S3Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            http_client,
            config,
        })
    }

    fn credentials(&self) -> Credentials {
        Credentials {
            access_key_id: self.config.access_key_id.clone(),
            secret_access_key: self.config.secret_access_key.clone(),
            region: self.config.region.clone(),
        }
    }

    /// Bucket root, with a trailing slash
    pub fn bucket_url(&self) -> String {
        match &self.config.endpoint {
            Some(endpoint) => format!(
                "{}/{}/",
                endpoint.trim_end_matches('/'),
                self.config.bucket
            ),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/",
                self.config.bucket, self.config.region
            ),
        }
    }

    fn object_url(&self, key: &str) -> Result<Url> {
        let raw = format!("{}{}", self.bucket_url(), encode_key(key));
        Url::parse(&raw).map_err(|e| IntegrationError::InvalidInput(format!("{}: {}", raw, e)))
    }

    pub fn presigned_post_at(
        &self,
        key: &str,
        content_type: &str,
        max_bytes: u64,
        expires_in: Duration,
        now: DateTime<Utc>,
    ) -> Result<PresignedPost> {
        let amz_date = sigv4::amz_date(now);
        let date = sigv4::short_date(now);
        let credential = format!(
            "{}/{}",
            self.config.access_key_id,
            sigv4::credential_scope(&date, &self.config.region, "s3")
        );
        let expiration = now
            + chrono::Duration::from_std(expires_in)
                .map_err(|e| IntegrationError::InvalidInput(e.to_string()))?;

        let policy = json!({
            "expiration": expiration.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            "conditions": [
                { "bucket": self.config.bucket },
                { "key": key },
                ["content-length-range", 0, max_bytes],
                ["eq", "$Content-Type", content_type],
                { "x-amz-algorithm": ALGORITHM },
                { "x-amz-credential": credential },
                { "x-amz-date": amz_date },
            ],
        });
        let policy = STANDARD.encode(serde_json::to_vec(&policy)?);

        let signing_key = sigv4::signing_key(
            &self.config.secret_access_key,
            &date,
            &self.config.region,
            "s3",
        )?;
        let signature = hex::encode(sigv4::hmac_sha256(&signing_key, policy.as_bytes())?);

        let fields = BTreeMap::from([
            ("bucket".to_string(), self.config.bucket.clone()),
            ("key".to_string(), key.to_string()),
            ("Content-Type".to_string(), content_type.to_string()),
            ("X-Amz-Algorithm".to_string(), ALGORITHM.to_string()),
            ("X-Amz-Credential".to_string(), credential),
            ("X-Amz-Date".to_string(), amz_date),
            ("Policy".to_string(), policy),
            ("X-Amz-Signature".to_string(), signature),
        ]);

        Ok(PresignedPost {
            url: self.bucket_url(),
            fields,
        })
    }

    async fn signed_request(&self, method: reqwest::Method, key: &str) -> Result<reqwest::Response> {
        let url = self.object_url(key)?;
        let signed = sigv4::sign_request(
            method.as_str(),
            &url,
            EMPTY_PAYLOAD_HASH,
            &self.credentials(),
            Utc::now(),
        )?;

        Ok(self
            .http_client
            .request(method, url)
            .header("Authorization", signed.authorization)
            .header("x-amz-date", signed.amz_date)
            .header("x-amz-content-sha256", signed.content_sha256)
            .send()
            .await?)
    }
}

fn header_string(headers: &reqwest::header::HeaderMap, name: reqwest::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

#[async_trait]
impl ObjectStorage for S3Client {
    fn presigned_post(
        &self,
        key: &str,
        content_type: &str,
        max_bytes: u64,
        expires_in: Duration,
    ) -> Result<PresignedPost> {
        self.presigned_post_at(key, content_type, max_bytes, expires_in, Utc::now())
    }

    async fn head_object(&self, key: &str) -> Result<Option<ObjectHead>> {
        let response = self.signed_request(reqwest::Method::HEAD, key).await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(IntegrationError::api("S3", status.as_u16(), format!("HEAD {}", key)));
        }

        let headers = response.headers();
        Ok(Some(ObjectHead {
            content_type: header_string(headers, CONTENT_TYPE),
            content_length: header_string(headers, CONTENT_LENGTH)
                .and_then(|value| value.parse().ok()),
        }))
    }

    async fn get_object(&self, key: &str) -> Result<StoredObject> {
        let response = self.signed_request(reqwest::Method::GET, key).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IntegrationError::api("S3", status.as_u16(), body));
        }

        let content_type = header_string(response.headers(), CONTENT_TYPE);
        let bytes = response.bytes().await?.to_vec();
        Ok(StoredObject {
            bytes,
            content_type,
        })
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}{}", self.bucket_url(), encode_key(key))
    }
}
