use super::metadata::NormalizedMetadata;

/// Result of one conversion attempt, ready to be written back onto its record.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionOutcome {
    Converted(ConvertedFile),
    Failed { reason: String },
}

/// Output of a successful normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedFile {
    /// Storage key of the normalized file.
    pub file_path: String,
    pub file_name: String,
    /// Byte size of the normalized file.
    pub size: i64,
    pub metadata: NormalizedMetadata,
}

impl ConversionOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        ConversionOutcome::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, ConversionOutcome::Converted(_))
    }
}
