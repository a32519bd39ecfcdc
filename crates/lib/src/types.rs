use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A key selecting which extraction template and required schema apply.
///
/// Keys are normalized to trimmed lower-case so `"Invoice "` and `"invoice"`
/// resolve to the same template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct DocumentType(String);

impl DocumentType {
    pub const LEGAL: &'static str = "legal";
    pub const EMAIL: &'static str = "email";
    pub const INVOICE: &'static str = "invoice";

    pub fn new(key: impl AsRef<str>) -> Self {
        Self(key.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DocumentType {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for DocumentType {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<DocumentType> for String {
    fn from(value: DocumentType) -> Self {
        value.0
    }
}

/// A request to extract structured data from raw document text or an image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRequest {
    pub document_type: DocumentType,
    pub content: String,
    /// Set for scanned documents and photos; `content` is then unused.
    #[serde(skip)]
    pub image: Option<ImageInput>,
}

impl ExtractionRequest {
    pub fn new(document_type: impl Into<DocumentType>, content: impl Into<String>) -> Self {
        Self {
            document_type: document_type.into(),
            content: content.into(),
            image: None,
        }
    }

    /// A request that sends `image` to a vision-capable model.
    pub fn from_image(document_type: impl Into<DocumentType>, image: ImageInput) -> Self {
        Self {
            document_type: document_type.into(),
            content: String::new(),
            image: Some(image),
        }
    }
}

/// Raw image bytes with their media type, e.g. `image/png`.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub media_type: String,
    pub data: Vec<u8>,
}

impl ImageInput {
    pub fn new(media_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            media_type: media_type.into(),
            data,
        }
    }

    /// The base64 encoding of the image bytes.
    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.data)
    }

    /// A `data:` URL embedding the image, as accepted by `image_url` content parts.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.to_base64())
    }
}

impl fmt::Debug for ImageInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageInput")
            .field("media_type", &self.media_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// A fully substituted prompt, ready to be sent to a completion API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    document_type: DocumentType,
    text: String,
}

impl Prompt {
    pub(crate) fn new(document_type: DocumentType, text: String) -> Self {
        Self {
            document_type,
            text,
        }
    }

    pub fn document_type(&self) -> &DocumentType {
        &self.document_type
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// The structured output parsed from a model response.
///
/// The shape depends on the document type; only the presence of the required
/// top-level keys is guaranteed. Nested fields may be missing or `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionResult(Map<String, Value>);

impl ExtractionResult {
    pub(crate) fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Returns the value of a top-level key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Looks up a nested value with a JSON pointer, e.g. `/invoice/number`.
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        let path = pointer.strip_prefix('/')?;
        match path.split_once('/') {
            Some((head, rest)) => self.0.get(head)?.pointer(&format!("/{rest}")),
            None => self.0.get(path),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn document_type_is_normalized() {
        assert_eq!(DocumentType::new("  Invoice "), DocumentType::new("invoice"));
        let request: ExtractionRequest =
            serde_json::from_value(json!({"documentType": "EMAIL", "content": "hi"})).unwrap();
        assert_eq!(request.document_type.as_str(), DocumentType::EMAIL);
    }

    #[test]
    fn image_becomes_a_data_url() {
        let image = ImageInput::new("image/png", vec![0x89, b'P', b'N', b'G']);
        assert_eq!(image.to_data_url(), "data:image/png;base64,iVBORw==");
        assert!(format!("{image:?}").contains("bytes: 4"));
    }

    #[test]
    fn pointer_reaches_nested_values() {
        let Value::Object(map) = json!({"invoice": {"number": "INV-1"}, "items": [{"q": 2}]})
        else {
            unreachable!()
        };
        let result = ExtractionResult::from_map(map);
        assert_eq!(result.pointer("/invoice/number"), Some(&json!("INV-1")));
        assert_eq!(result.pointer("/items/0/q"), Some(&json!(2)));
        assert_eq!(result.pointer("/invoice"), result.get("invoice"));
        assert!(result.pointer("invoice").is_none());
    }
}
