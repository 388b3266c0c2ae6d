use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Descriptive fields extracted while normalizing an image to JPEG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub color_space: String,
    pub compression: String,
    pub dpi: u32,
    pub has_alpha: bool,
}

/// Descriptive fields extracted while normalizing a document to Markdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DocumentMetadata {
    pub page_count: u32,
    pub word_count: usize,
    pub language: String,
    pub author: String,
    pub title: String,
    pub keywords: Vec<String>,
    /// Conversion date as `YYYY-MM-DD`.
    pub creation_date: String,
}

/// Metadata of a finished conversion, one variant per file kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NormalizedMetadata {
    Image(ImageMetadata),
    Document(DocumentMetadata),
}

impl NormalizedMetadata {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            NormalizedMetadata::Image(meta) => serde_json::json!(meta),
            NormalizedMetadata::Document(meta) => serde_json::json!(meta),
        }
    }
}

impl From<ImageMetadata> for NormalizedMetadata {
    fn from(meta: ImageMetadata) -> Self {
        NormalizedMetadata::Image(meta)
    }
}

impl From<DocumentMetadata> for NormalizedMetadata {
    fn from(meta: DocumentMetadata) -> Self {
        NormalizedMetadata::Document(meta)
    }
}
