//! Document normalizer - text, Markdown and HTML to Markdown

use async_trait::async_trait;
use chrono::Utc;
use intake_core::models::{ConvertedFile, DocumentMetadata, FileRecord, NormalizedMetadata};
use intake_core::naming::{base_name, extension, file_stem};
use intake_storage::Storage;
use std::sync::Arc;

use super::markdown::{html_to_markdown, markdown_passthrough, text_to_markdown};
use crate::error::ConversionError;
use crate::normalizer::{Normalizer, OutputLayout};

pub struct DocumentNormalizer {
    storage: Arc<dyn Storage>,
    layout: OutputLayout,
}

impl DocumentNormalizer {
    pub fn new(storage: Arc<dyn Storage>, layout: OutputLayout) -> Self {
        Self { storage, layout }
    }
}

#[async_trait]
impl Normalizer for DocumentNormalizer {
    #[tracing::instrument(skip(self, record), fields(record_id = %record.id))]
    async fn normalize(&self, record: &FileRecord) -> Result<ConvertedFile, ConversionError> {
        let ext = extension(&record.original_file_path).unwrap_or_default();
        let title = file_stem(&record.original_filename);

        let data = self
            .storage
            .read(&record.original_file_path)
            .await
            .map_err(|source| ConversionError::ReadOriginal {
                path: record.original_file_path.clone(),
                source,
            })?;
        let content = String::from_utf8_lossy(&data);

        let document = match ext.as_str() {
            "txt" => text_to_markdown(&content, title),
            "md" => markdown_passthrough(&content, title),
            "html" | "htm" => html_to_markdown(&content, title),
            other => {
                return Err(ConversionError::UnsupportedDocumentFormat(format!(
                    ".{}",
                    other
                )))
            }
        };

        let output_key = self.layout.output_key(record, "md");
        let size = self
            .storage
            .write(&output_key, document.markdown.into_bytes())
            .await
            .map_err(|source| ConversionError::WriteOutput {
                path: output_key.clone(),
                source,
            })?;

        let metadata = DocumentMetadata {
            page_count: 1,
            word_count: document.word_count,
            language: "unknown".to_string(),
            author: String::new(),
            title: document.title,
            keywords: Vec::new(),
            creation_date: Utc::now().format("%Y-%m-%d").to_string(),
        };

        tracing::info!(
            output = %output_key,
            word_count = metadata.word_count,
            size_bytes = size,
            "Document normalized to Markdown"
        );

        Ok(ConvertedFile {
            file_name: base_name(&output_key).to_string(),
            file_path: output_key,
            size: size as i64,
            metadata: NormalizedMetadata::Document(metadata),
        })
    }
}
