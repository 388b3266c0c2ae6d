use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

use crate::constants::{DOCUMENT_EXTENSIONS, IMAGE_EXTENSIONS};

/// Normalization family of an upload. Assigned once, before the first conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "file_kind", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Document,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Image => "image",
            FileKind::Document => "document",
        }
    }

    /// Looks up a lowercase extension without the leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        if IMAGE_EXTENSIONS.contains(&ext) {
            Some(FileKind::Image)
        } else if DOCUMENT_EXTENSIONS.contains(&ext) {
            Some(FileKind::Document)
        } else {
            None
        }
    }

    /// Extension of the normalized output, without the leading dot.
    pub fn output_extension(&self) -> &'static str {
        match self {
            FileKind::Image => "jpg",
            FileKind::Document => "md",
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database row for the file_records table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct FileRecord {
    pub id: Uuid,
    pub original_filename: String,
    pub content_type: String,
    /// Current filename: `<slot>.<ext>` after upload, the normalized name after conversion.
    pub file_name: String,
    /// Storage key of the directory the slot was allocated in.
    pub directory: String,
    pub slot: i64,
    pub original_file_path: String,
    pub file_path: Option<String>,
    pub size: i64,
    pub file_kind: Option<FileKind>,
    pub metadata: Option<JsonValue>,
    pub caption: Option<String>,
    pub tag: Option<JsonValue>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FileRecord {
    pub fn is_converted(&self) -> bool {
        self.file_path.is_some() && self.error_message.is_none()
    }
}

/// Everything the upload coordinator knows when it commits a slot.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub original_filename: String,
    pub content_type: String,
    pub file_name: String,
    pub original_file_path: String,
    pub size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileRecordResponse {
    pub id: Uuid,
    pub original_filename: String,
    pub content_type: String,
    pub file_name: String,
    pub original_file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    pub size: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_kind: Option<FileKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FileRecord> for FileRecordResponse {
    fn from(record: FileRecord) -> Self {
        FileRecordResponse {
            id: record.id,
            original_filename: record.original_filename,
            content_type: record.content_type,
            file_name: record.file_name,
            original_file_path: record.original_file_path,
            file_path: record.file_path,
            size: record.size,
            file_kind: record.file_kind,
            metadata: record.metadata,
            error_message: record.error_message,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_from_extension() {
        assert_eq!(FileKind::from_extension("jpeg"), Some(FileKind::Image));
        assert_eq!(FileKind::from_extension("gif"), Some(FileKind::Image));
        assert_eq!(FileKind::from_extension("htm"), Some(FileKind::Document));
        assert_eq!(FileKind::from_extension("md"), Some(FileKind::Document));
        assert_eq!(FileKind::from_extension("webp"), None);
        assert_eq!(FileKind::from_extension(""), None);
    }

    #[test]
    fn test_file_kind_serializes_lowercase() {
        let json = serde_json::to_string(&FileKind::Document).unwrap();
        assert_eq!(json, "\"document\"");
    }

    #[test]
    fn test_response_omits_unset_conversion_fields() {
        let now = Utc::now();
        let record = FileRecord {
            id: Uuid::new_v4(),
            original_filename: "a.png".to_string(),
            content_type: "image/png".to_string(),
            file_name: "1.png".to_string(),
            directory: "original/2026/10/19".to_string(),
            slot: 1,
            original_file_path: "original/2026/10/19/1.png".to_string(),
            file_path: None,
            size: 10,
            file_kind: None,
            metadata: None,
            caption: None,
            tag: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        };
        assert!(!record.is_converted());

        let json = serde_json::to_value(FileRecordResponse::from(record)).unwrap();
        assert!(json.get("file_path").is_none());
        assert!(json.get("error_message").is_none());
        assert_eq!(json["file_name"], "1.png");
    }
}
