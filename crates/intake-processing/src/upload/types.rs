//! Types for the upload coordinator.

/// Client supplied description of one uploaded file.
#[derive(Clone, Debug, Default)]
pub struct IncomingFile {
    pub filename: String,
    pub content_type: Option<String>,
    /// Size announced by the client, if any. The stored size is the observed one.
    pub declared_size: Option<u64>,
}

impl IncomingFile {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Self::default()
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}
