use serde::{Deserialize, Serialize};

const MB: u64 = 1024 * 1024;

/// Kinds of media a tweet can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Gif,
    Video,
}

impl MediaKind {
    /// Kind for an upload MIME type, `None` when Twitter does not accept it
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" | "image/png" | "image/webp" => Some(Self::Image),
            "image/gif" => Some(Self::Gif),
            "video/mp4" | "video/quicktime" | "video/x-msvideo" => Some(Self::Video),
            _ => None,
        }
    }

    /// Classify a stored object by its `Content-Type` prefix
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        if content_type.starts_with("image/gif") {
            Some(Self::Gif)
        } else if content_type.starts_with("image/") {
            Some(Self::Image)
        } else if content_type.starts_with("video/") {
            Some(Self::Video)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Gif => "gif",
            Self::Video => "video",
        }
    }

    pub fn size_limit(&self) -> u64 {
        match self {
            Self::Image => 5 * MB,
            Self::Gif => 15 * MB,
            Self::Video => 512 * MB,
        }
    }

    /// MIME type sent to the upload endpoint, preferring the stored object's type
    pub fn upload_mime(&self, stored_content_type: Option<&str>) -> String {
        match self {
            Self::Image => stored_content_type.unwrap_or("image/png").to_string(),
            Self::Gif => "image/gif".to_string(),
            Self::Video => stored_content_type.unwrap_or("video/mp4").to_string(),
        }
    }

    /// `media_category` for chunked uploads
    pub fn category(&self) -> &'static str {
        match self {
            Self::Image => "tweet_image",
            Self::Gif => "tweet_gif",
            Self::Video => "tweet_video",
        }
    }

    /// Images go through the simple upload; gifs and videos are chunked
    pub fn is_chunked(&self) -> bool {
        !matches!(self, Self::Image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_mime_types() {
        assert_eq!(MediaKind::from_mime("image/webp"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_mime("image/gif"), Some(MediaKind::Gif));
        assert_eq!(MediaKind::from_mime("video/quicktime"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_mime("image/bmp"), None);
        assert_eq!(MediaKind::from_mime("application/pdf"), None);
    }

    #[test]
    fn test_content_type_classification() {
        assert_eq!(MediaKind::from_content_type("image/gif"), Some(MediaKind::Gif));
        assert_eq!(MediaKind::from_content_type("image/jpeg"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_content_type("video/mp4"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_content_type("application/octet-stream"), None);
    }

    #[test]
    fn test_limits_and_mime_fallbacks() {
        assert_eq!(MediaKind::Image.size_limit(), 5 * 1024 * 1024);
        assert_eq!(MediaKind::Gif.size_limit(), 15 * 1024 * 1024);
        assert_eq!(MediaKind::Video.size_limit(), 512 * 1024 * 1024);

        assert_eq!(MediaKind::Image.upload_mime(None), "image/png");
        assert_eq!(MediaKind::Gif.upload_mime(Some("image/png")), "image/gif");
        assert_eq!(MediaKind::Video.upload_mime(Some("video/quicktime")), "video/quicktime");
    }
}
