//! Normalizer trait and per-kind dispatch.

use async_trait::async_trait;
use intake_core::models::{ConvertedFile, FileKind, FileRecord};
use intake_core::naming::{file_stem, join_key, processed_directory};
use intake_core::Config;
use intake_storage::Storage;
use std::sync::Arc;

use crate::document::DocumentNormalizer;
use crate::error::ConversionError;
use crate::image::ImageNormalizer;

/// Converts a record's original into the canonical format of its kind.
#[async_trait]
pub trait Normalizer: Send + Sync {
    async fn normalize(&self, record: &FileRecord) -> Result<ConvertedFile, ConversionError>;
}

/// Where normalized outputs are written.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub original_dir: String,
    pub processed_dir: String,
}

impl OutputLayout {
    pub fn new(original_dir: impl Into<String>, processed_dir: impl Into<String>) -> Self {
        Self {
            original_dir: original_dir.into(),
            processed_dir: processed_dir.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.original_dir, &config.processed_dir)
    }

    /// Output key for `record`: same bucket and stem as the original, new extension.
    pub fn output_key(&self, record: &FileRecord, extension: &str) -> String {
        let directory =
            processed_directory(&record.directory, &self.original_dir, &self.processed_dir);
        let name = format!("{}.{}", file_stem(&record.original_file_path), extension);
        join_key(&directory, &name)
    }
}

/// One normalizer per file kind.
#[derive(Clone)]
pub struct Normalizers {
    image: Arc<ImageNormalizer>,
    document: Arc<DocumentNormalizer>,
}

impl Normalizers {
    pub fn new(image: ImageNormalizer, document: DocumentNormalizer) -> Self {
        Self {
            image: Arc::new(image),
            document: Arc::new(document),
        }
    }

    pub fn from_config(storage: Arc<dyn Storage>, config: &Config) -> Self {
        let layout = OutputLayout::from_config(config);
        Self::new(
            ImageNormalizer::new(storage.clone(), layout.clone(), config.jpeg_quality),
            DocumentNormalizer::new(storage, layout),
        )
    }

    pub fn for_kind(&self, kind: FileKind) -> &dyn Normalizer {
        match kind {
            FileKind::Image => self.image.as_ref(),
            FileKind::Document => self.document.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_output_key_mirrors_original_bucket() {
        let now = Utc::now();
        let record = FileRecord {
            id: Uuid::new_v4(),
            original_filename: "Holiday.PNG".to_string(),
            content_type: "image/png".to_string(),
            file_name: "12.png".to_string(),
            directory: "original/2026/10/19".to_string(),
            slot: 12,
            original_file_path: "original/2026/10/19/12.png".to_string(),
            file_path: None,
            size: 1,
            file_kind: Some(FileKind::Image),
            metadata: None,
            caption: None,
            tag: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        };

        let layout = OutputLayout::new("original", "processed");
        assert_eq!(
            layout.output_key(&record, "jpg"),
            "processed/2026/10/19/12.jpg"
        );
    }
}
