//! AWS Signature Version 4 for S3 requests and browser POST policies.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use url::Url;

use crate::error::{IntegrationError, Result};

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// SHA-256 of an empty body
pub const EMPTY_PAYLOAD_HASH: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

pub fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| IntegrationError::InvalidInput(format!("signing key: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

pub fn amz_date(now: DateTime<Utc>) -> String {
    now.format("%Y%m%dT%H%M%SZ").to_string()
}

pub fn short_date(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d").to_string()
}

pub fn credential_scope(date: &str, region: &str, service: &str) -> String {
    format!("{}/{}/{}/aws4_request", date, region, service)
}

/// `kSigning = HMAC(HMAC(HMAC(HMAC("AWS4" + secret, date), region), service), "aws4_request")`
pub fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Result<Vec<u8>> {
    let k_date = hmac_sha256(format!("AWS4{}", secret).as_bytes(), date.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
}

/// `host[:port]` as sent in the Host header
pub fn host_header(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

fn canonical_query(url: &Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            (
                urlencoding::encode(&k).into_owned(),
                urlencoding::encode(&v).into_owned(),
            )
        })
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Headers to attach to a request signed with [`sign_request`]
#[derive(Debug, Clone, PartialEq)]
pub struct SignedHeaders {
    pub authorization: String,
    pub amz_date: String,
    pub content_sha256: String,
}

/// Sign a request over `host`, `x-amz-content-sha256` and `x-amz-date`
pub fn sign_request(
    method: &str,
    url: &Url,
    payload_hash: &str,
    credentials: &Credentials,
    now: DateTime<Utc>,
) -> Result<SignedHeaders> {
    let amz_date = amz_date(now);
    let date = short_date(now);
    let scope = credential_scope(&date, &credentials.region, "s3");

    let canonical_headers = format!(
        "host:{}\nx-amz-content-sha256:{}\nx-amz-date:{}\n",
        host_header(url),
        payload_hash,
        amz_date
    );
    let signed_headers = "host;x-amz-content-sha256;x-amz-date";

    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        method,
        url.path(),
        canonical_query(url),
        canonical_headers,
        signed_headers,
        payload_hash
    );

    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        amz_date,
        scope,
        sha256_hex(canonical_request.as_bytes())
    );

    let key = signing_key(&credentials.secret_access_key, &date, &credentials.region, "s3")?;
    let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes())?);

    Ok(SignedHeaders {
        authorization: format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, credentials.access_key_id, scope, signed_headers, signature
        ),
        amz_date,
        content_sha256: payload_hash.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_signing_key_matches_aws_example() {
        let key = signing_key(
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            "20120215",
            "us-east-1",
            "iam",
        )
        .unwrap();
        assert_eq!(
            hex::encode(key),
            "f4780e2d9f65fa895f9c67b32ce1baf0b0d8a43505a000a1a9e090d414db404d"
        );
    }

    #[test]
    fn test_empty_payload_hash() {
        assert_eq!(sha256_hex(b""), EMPTY_PAYLOAD_HASH);
    }

    #[test]
    fn test_sign_request_header_shape() {
        let credentials = Credentials {
            access_key_id: "AKIDEXAMPLE".into(),
            secret_access_key: "secret".into(),
            region: "eu-west-1".into(),
        };
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap();
        let url = Url::parse("https://bucket.s3.eu-west-1.amazonaws.com/chat/u1/a.pdf").unwrap();

        let signed = sign_request("HEAD", &url, EMPTY_PAYLOAD_HASH, &credentials, now).unwrap();
        assert_eq!(signed.amz_date, "20250301T123000Z");
        assert!(signed.authorization.starts_with(
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20250301/eu-west-1/s3/aws4_request, \
             SignedHeaders=host;x-amz-content-sha256;x-amz-date, Signature="
        ));

        // Deterministic for identical inputs
        let again = sign_request("HEAD", &url, EMPTY_PAYLOAD_HASH, &credentials, now).unwrap();
        assert_eq!(signed, again);
    }

    #[test]
    fn test_host_header_keeps_explicit_port() {
        let url = Url::parse("http://127.0.0.1:9000/bucket/key").unwrap();
        assert_eq!(host_header(&url), "127.0.0.1:9000");
        let url = Url::parse("https://bucket.s3.amazonaws.com/key").unwrap();
        assert_eq!(host_header(&url), "bucket.s3.amazonaws.com");
    }
}
