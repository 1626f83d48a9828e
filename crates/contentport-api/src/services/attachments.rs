//! Resolves attachment references of a chat message into prompt material.

use contentport_graph::prompt::XmlPrompt;
use contentport_integrations::extract_text;
use contentport_persist::{DocumentType, KnowledgeDocument, User};
use contentport_types::{Attachment, AttachmentType, AttachmentVariant, MessagePart};

use crate::{
    error::{ApiError, ApiResult},
    services::file_types::{image_mime_from_name, text_format},
    state::AppState,
};

/// Links to read plus parts appended to the user message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedAttachments {
    pub links: Vec<String>,
    pub parts: Vec<MessagePart>,
}

fn document_part(title: &str, text: &str) -> MessagePart {
    let mut prompt = XmlPrompt::new();
    prompt.tag("attached_document", text.trim(), &[("title", title.to_string())]);
    MessagePart::text(prompt.to_string())
}

fn video_part(title: &str, url: &str) -> MessagePart {
    let mut prompt = XmlPrompt::new();
    prompt.tag(
        "attached_video",
        "The user attached this video to use as tweet media. Its content is not available to you.",
        &[("title", title.to_string()), ("url", url.to_string())],
    );
    MessagePart::text(prompt.to_string())
}

async fn file_text(state: &AppState, key: &str, kind: DocumentType) -> ApiResult<Option<String>> {
    let Some(format) = text_format(kind) else {
        return Ok(None);
    };
    let object = state.storage.get_object(key).await?;
    Ok(Some(extract_text(format, &object.bytes)?))
}

async fn knowledge_attachment(
    state: &AppState,
    document: KnowledgeDocument,
    parsed: &mut ParsedAttachments,
) -> ApiResult<()> {
    let title = document
        .title
        .clone()
        .unwrap_or_else(|| document.file_name.clone());

    match document.kind {
        DocumentType::Url => {
            if !document.source_url.is_empty() {
                parsed.links.push(document.source_url);
            }
        }
        DocumentType::Image => parsed.parts.push(MessagePart::File {
            media_type: image_mime_from_name(&document.file_name).to_string(),
            url: state.storage.public_url(&document.s3_key),
            filename: Some(document.file_name),
        }),
        DocumentType::Manual => {
            let text = document.description.unwrap_or_default();
            parsed.parts.push(document_part(&title, &text));
        }
        kind => {
            if let Some(text) = file_text(state, &document.s3_key, kind).await? {
                parsed.parts.push(document_part(&title, &text));
            }
        }
    }

    Ok(())
}

async fn chat_attachment(
    state: &AppState,
    attachment: &Attachment,
    parsed: &mut ParsedAttachments,
) -> ApiResult<()> {
    let key = attachment.file_key.as_deref().ok_or_else(|| {
        ApiError::BadRequest(format!("Attachment {} has no file key", attachment.id))
    })?;
    let title = attachment.title.clone().unwrap_or_else(|| key.to_string());

    let kind = match attachment.kind {
        AttachmentType::Image => {
            parsed.parts.push(MessagePart::File {
                media_type: image_mime_from_name(key).to_string(),
                url: state.storage.public_url(key),
                filename: attachment.title.clone(),
            });
            return Ok(());
        }
        AttachmentType::Video => {
            parsed.parts.push(video_part(&title, &state.storage.public_url(key)));
            return Ok(());
        }
        AttachmentType::Pdf => DocumentType::Pdf,
        AttachmentType::Docx => DocumentType::Docx,
        AttachmentType::Txt => DocumentType::Txt,
        AttachmentType::Url | AttachmentType::Manual => {
            tracing::debug!(id = %attachment.id, "Ignoring chat attachment without file content");
            return Ok(());
        }
    };

    if let Some(text) = file_text(state, key, kind).await? {
        parsed.parts.push(document_part(&title, &text));
    }
    Ok(())
}

/// Knowledge documents are looked up for the user; an unknown id is a 404
pub async fn parse_attachments(
    state: &AppState,
    user: &User,
    attachments: &[Attachment],
) -> ApiResult<ParsedAttachments> {
    let mut parsed = ParsedAttachments::default();

    for attachment in attachments {
        match attachment.variant {
            AttachmentVariant::Knowledge => {
                let document = state
                    .records
                    .get_document(&user.id, &attachment.id)
                    .await?
                    .filter(|document| !document.is_deleted)
                    .ok_or_else(|| {
                        ApiError::NotFound(format!("Knowledge document {} not found", attachment.id))
                    })?;
                knowledge_attachment(state, document, &mut parsed).await?;
            }
            AttachmentVariant::Chat => chat_attachment(state, attachment, &mut parsed).await?,
        }
    }

    Ok(parsed)
}
