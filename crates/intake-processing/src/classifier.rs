//! Extension based type classification.

use intake_core::models::FileKind;
use intake_core::naming::extension;
use intake_core::AppError;

/// Map a filename to its normalization family, ignoring extension case.
pub fn classify(filename: &str) -> Result<FileKind, AppError> {
    let ext = extension(filename);
    ext.as_deref()
        .and_then(FileKind::from_extension)
        .ok_or_else(|| {
            AppError::UnsupportedFileType(match ext {
                Some(ext) => format!(".{}", ext),
                None => filename.to_string(),
            })
        })
}
