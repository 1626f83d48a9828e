//! OAuth 1.0a request signing (HMAC-SHA1) for user-context Twitter calls.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::error::{IntegrationError, Result};

type HmacSha1 = Hmac<Sha1>;

/// App consumer keys plus the user's access token pair
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub token: String,
    pub token_secret: String,
}

/// RFC 3986 percent-encoding; only unreserved characters pass through
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Signature base string: `METHOD&url&params`, params sorted by encoded key
/// then value.
pub fn signature_base(method: &str, base_url: &str, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(base_url),
        percent_encode(&param_string)
    )
}

pub fn sign(base: &str, consumer_secret: &str, token_secret: &str) -> Result<String> {
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| IntegrationError::InvalidInput(format!("signing key: {}", e)))?;
    mac.update(base.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// `Authorization` header for a request. `params` are the query string or
/// form-encoded body parameters; JSON and multipart bodies are not signed.
pub fn authorization_header_with(
    method: &str,
    base_url: &str,
    credentials: &OAuthCredentials,
    params: &[(String, String)],
    nonce: &str,
    timestamp: i64,
) -> Result<String> {
    let mut oauth_params = vec![
        ("oauth_consumer_key".to_string(), credentials.consumer_key.clone()),
        ("oauth_nonce".to_string(), nonce.to_string()),
        ("oauth_signature_method".to_string(), "HMAC-SHA1".to_string()),
        ("oauth_timestamp".to_string(), timestamp.to_string()),
        ("oauth_token".to_string(), credentials.token.clone()),
        ("oauth_version".to_string(), "1.0".to_string()),
    ];

    let mut all_params = oauth_params.clone();
    all_params.extend(params.iter().cloned());

    let base = signature_base(method, base_url, &all_params);
    let signature = sign(&base, &credentials.consumer_secret, &credentials.token_secret)?;
    oauth_params.push(("oauth_signature".to_string(), signature));
    oauth_params.sort();

    let header = oauth_params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!("OAuth {}", header))
}

/// [`authorization_header_with`] using a fresh nonce and the current time
pub fn authorization_header(
    method: &str,
    base_url: &str,
    credentials: &OAuthCredentials,
    params: &[(String, String)],
) -> Result<String> {
    let nonce = uuid::Uuid::new_v4().simple().to_string();
    let timestamp = chrono::Utc::now().timestamp();
    authorization_header_with(method, base_url, credentials, params, &nonce, timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_credentials() -> OAuthCredentials {
        OAuthCredentials {
            consumer_key: "xvz1evFS4wEEPTGEFPHBog".into(),
            consumer_secret: "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw".into(),
            token: "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb".into(),
            token_secret: "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE".into(),
        }
    }

    #[test]
    fn test_percent_encode_reserved() {
        assert_eq!(percent_encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
        assert_eq!(percent_encode("An encoded string!"), "An%20encoded%20string%21");
        assert_eq!(percent_encode("a-b_c.d~e"), "a-b_c.d~e");
    }

    #[test]
    fn test_twitter_documentation_example() {
        let params = vec![
            ("include_entities".to_string(), "true".to_string()),
            (
                "status".to_string(),
                "Hello Ladies + Gentlemen, a signed OAuth request!".to_string(),
            ),
        ];

        let header = authorization_header_with(
            "POST",
            "https://api.twitter.com/1.1/statuses/update.json",
            &doc_credentials(),
            &params,
            "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg",
            1318622958,
        )
        .unwrap();

        assert!(header.starts_with("OAuth "));
        assert!(header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""));
        assert!(header.contains("oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\""));
    }
}
