use contentport_integrations::DocumentFormat;
use contentport_persist::DocumentType;

pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub const ALLOWED_DOCUMENT_TYPES: [&str; 3] = ["application/pdf", DOCX_MIME, "text/plain"];

pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

pub fn is_allowed_upload(mime: &str) -> bool {
    ALLOWED_DOCUMENT_TYPES.contains(&mime) || ALLOWED_IMAGE_TYPES.contains(&mime)
}

/// Knowledge document type of an uploaded MIME type
pub fn document_type(mime: &str) -> Option<DocumentType> {
    match mime {
        "application/pdf" => Some(DocumentType::Pdf),
        DOCX_MIME => Some(DocumentType::Docx),
        "text/plain" => Some(DocumentType::Txt),
        mime if ALLOWED_IMAGE_TYPES.contains(&mime) => Some(DocumentType::Image),
        _ => None,
    }
}

/// Text extraction format of a document type; `None` for types without text
pub fn text_format(kind: DocumentType) -> Option<DocumentFormat> {
    match kind {
        DocumentType::Pdf => Some(DocumentFormat::Pdf),
        DocumentType::Docx => Some(DocumentFormat::Docx),
        DocumentType::Txt => Some(DocumentFormat::Txt),
        _ => None,
    }
}

/// Image MIME type guessed from a file name
pub fn image_mime_from_name(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "image/png",
    }
}

/// Extension of a file name, empty when it has none
pub fn extension(file_name: &str) -> &str {
    file_name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("")
}
