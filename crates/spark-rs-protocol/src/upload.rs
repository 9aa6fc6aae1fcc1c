use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A processed upload: the original file's identity plus its extracted text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Extracted text content.
    pub content: String,
    pub uploaded_at: DateTime<Utc>,
}
