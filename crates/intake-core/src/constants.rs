//! Constants shared across crates.

/// Content type stored when the client does not send one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Content type of every normalized image.
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// Content type of every normalized document.
pub const MARKDOWN_CONTENT_TYPE: &str = "text/markdown";

pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Nominal resolution reported for normalized images.
pub const NORMALIZED_IMAGE_DPI: u32 = 72;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];
pub const DOCUMENT_EXTENSIONS: &[&str] = &["txt", "md", "html", "htm"];

pub const API_VERSION: &str = "v1";
