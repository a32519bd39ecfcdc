//! # Document Loader
//!
//! Reads uploaded or referenced files and extracts their plain-text content.
//! Text-like formats are decoded as UTF-8; PDF text extraction is available
//! with the `pdf` feature. Images are kept as raw bytes for vision models.

use crate::{errors::PromptError, types::ImageInput};
use std::path::Path;
use tracing::{info, instrument, warn};

/// File extensions read as plain text.
const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "text", "md", "markdown", "eml", "json", "csv", "tsv", "xml", "html", "htm", "log",
    "yaml", "yml",
];

/// Image extensions and the media type sent to the provider.
const IMAGE_MEDIA_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
];

/// The format a document was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    PlainText,
    Pdf,
    Image,
}

/// The content of a loaded document.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub name: String,
    pub format: DocumentFormat,
    /// Empty for images.
    pub content: String,
    pub image: Option<ImageInput>,
}

/// Reads a document from disk.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub async fn load_document(path: impl AsRef<Path>) -> Result<LoadedDocument, PromptError> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let bytes = tokio::fs::read(path).await?;
    load_bytes(&name, &bytes)
}

/// Decodes an in-memory document, choosing the format from the file name.
///
/// Names without an extension are treated as plain text.
pub fn load_bytes(name: &str, bytes: &[u8]) -> Result<LoadedDocument, PromptError> {
    let extension = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase());

    let (format, content) = match extension.as_deref() {
        None => (DocumentFormat::PlainText, decode_text(name, bytes)?),
        Some(ext) if TEXT_EXTENSIONS.contains(&ext) => {
            (DocumentFormat::PlainText, decode_text(name, bytes)?)
        }
        Some("pdf") => (DocumentFormat::Pdf, extract_text_from_pdf(bytes)?),
        Some(ext) => match image_media_type(ext) {
            Some(media_type) => {
                if bytes.is_empty() {
                    return Err(PromptError::DocumentParse(format!("'{name}' is an empty image")));
                }
                info!(document = name, media_type, bytes = bytes.len(), "Loaded image document");
                return Ok(LoadedDocument {
                    name: name.to_string(),
                    format: DocumentFormat::Image,
                    content: String::new(),
                    image: Some(ImageInput::new(media_type, bytes.to_vec())),
                });
            }
            None => {
                return Err(PromptError::UnsupportedDocument(format!(
                    "'{name}' has unsupported extension '.{ext}'"
                )))
            }
        },
    };

    if content.trim().is_empty() {
        warn!(document = name, "Loaded document has no text content");
    }
    info!(document = name, ?format, chars = content.chars().count(), "Loaded document");
    Ok(LoadedDocument {
        name: name.to_string(),
        format,
        content,
        image: None,
    })
}

fn image_media_type(extension: &str) -> Option<&'static str> {
    IMAGE_MEDIA_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, media_type)| *media_type)
}

fn decode_text(name: &str, bytes: &[u8]) -> Result<String, PromptError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    String::from_utf8(bytes.to_vec())
        .map_err(|e| PromptError::DocumentParse(format!("'{name}' is not valid UTF-8: {e}")))
}

/// Extracts text from all pages of a PDF.
#[cfg(feature = "pdf")]
fn extract_text_from_pdf(pdf_data: &[u8]) -> Result<String, PromptError> {
    use pdf::file::FileOptions;

    let file = FileOptions::cached()
        .load(pdf_data)
        .map_err(|e| PromptError::DocumentParse(e.to_string()))?;
    let resolver = file.resolver();
    let mut full_text = String::new();

    for page_num in 0..file.num_pages() {
        let page = file
            .get_page(page_num)
            .map_err(|e| PromptError::DocumentParse(e.to_string()))?;
        if let Some(content) = &page.contents {
            let operations = content
                .operations(&resolver)
                .map_err(|e| PromptError::DocumentParse(e.to_string()))?;
            for op in operations.iter() {
                match op {
                    pdf::content::Op::TextDraw { text } => {
                        full_text.push_str(&text.to_string_lossy())
                    }
                    pdf::content::Op::TextNewline => full_text.push('\n'),
                    _ => {}
                }
            }
        }
        full_text.push('\n');
    }
    Ok(full_text)
}

#[cfg(not(feature = "pdf"))]
fn extract_text_from_pdf(_pdf_data: &[u8]) -> Result<String, PromptError> {
    Err(PromptError::UnsupportedDocument(
        "PDF support is not enabled in this build".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_files_are_decoded() {
        let doc = load_bytes("invoice.TXT", b"\xEF\xBB\xBFInvoice INV-1").unwrap();
        assert_eq!(doc.format, DocumentFormat::PlainText);
        assert_eq!(doc.content, "Invoice INV-1");

        let doc = load_bytes("pasted", b"Dear team").unwrap();
        assert_eq!(doc.content, "Dear team");
    }

    #[test]
    fn unknown_extensions_are_rejected() {
        let err = load_bytes("minutes.docx", &[0x50, 0x4b]).unwrap_err();
        assert!(matches!(err, PromptError::UnsupportedDocument(_)));
    }

    #[test]
    fn images_keep_their_bytes_and_media_type() {
        let doc = load_bytes("Scan.JPG", &[0xff, 0xd8, 0xff]).unwrap();
        assert_eq!(doc.format, DocumentFormat::Image);
        assert!(doc.content.is_empty());
        let image = doc.image.unwrap();
        assert_eq!(image.media_type, "image/jpeg");
        assert_eq!(image.data, vec![0xff, 0xd8, 0xff]);

        let err = load_bytes("blank.png", &[]).unwrap_err();
        assert!(matches!(err, PromptError::DocumentParse(_)));
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        let err = load_bytes("mail.eml", &[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, PromptError::DocumentParse(_)));
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn garbage_pdf_is_a_parse_error() {
        let err = load_bytes("contract.pdf", b"not a pdf at all").unwrap_err();
        assert!(matches!(err, PromptError::DocumentParse(_)));
    }
}
