//! Upload validation and text extraction.
//!
//! Uploads are checked by MIME type and size before any bytes are read, then
//! turned into `UploadedFile` records carrying extracted text.

mod error;
pub mod extract;

pub use error::FileError;
pub use extract::{FileKind, extract_text};

use chrono::Utc;
use log::{info, warn};
use spark_rs_config::UploadsConfig;
use spark_rs_protocol::UploadedFile;
use std::path::Path;

/// Validates and converts uploads under the configured limits.
#[derive(Debug, Clone, Default)]
pub struct FileProcessor {
    limits: UploadsConfig,
}

impl FileProcessor {
    pub fn new(limits: UploadsConfig) -> Self {
        Self { limits }
    }

    /// MIME type guessed from the file name.
    pub fn mime_type(name: &str) -> String {
        mime_guess::from_path(name)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }

    /// Check type and size without touching file contents.
    pub fn validate(&self, name: &str, size: u64) -> Result<FileKind, FileError> {
        let mime = Self::mime_type(name);
        let kind = FileKind::from_mime(&mime).ok_or_else(|| FileError::UnsupportedType {
            name: name.to_string(),
            mime: mime.clone(),
        })?;
        if size > self.limits.max_file_size_bytes() {
            return Err(FileError::TooLarge {
                name: name.to_string(),
                size: format_file_size(size),
                limit_mb: self.limits.max_file_size_mb,
            });
        }
        Ok(kind)
    }

    /// Validate and extract an in-memory upload.
    pub fn process_bytes(&self, name: &str, bytes: &[u8]) -> Result<UploadedFile, FileError> {
        let kind = self.validate(name, bytes.len() as u64)?;
        Ok(self.build(name, kind, bytes))
    }

    /// Validate an upload on disk, then read and extract it.
    pub fn process_path(&self, path: &Path) -> Result<UploadedFile, FileError> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let read_error = |source| FileError::Read {
            name: name.clone(),
            source,
        };
        let size = std::fs::metadata(path).map_err(read_error)?.len();
        let kind = self.validate(&name, size)?;
        let bytes = std::fs::read(path).map_err(read_error)?;
        Ok(self.build(&name, kind, &bytes))
    }

    /// Process a batch. More than `max_files` rejects the whole batch;
    /// otherwise each file succeeds or fails on its own.
    pub fn process_batch<P: AsRef<Path>>(
        &self,
        paths: &[P],
    ) -> Result<Vec<Result<UploadedFile, FileError>>, FileError> {
        if paths.len() > self.limits.max_files {
            return Err(FileError::TooManyFiles {
                count: paths.len(),
                max: self.limits.max_files,
            });
        }
        Ok(paths
            .iter()
            .map(|path| {
                let outcome = self.process_path(path.as_ref());
                if let Err(err) = &outcome {
                    warn!("upload rejected (err={})", err);
                }
                outcome
            })
            .collect())
    }

    fn build(&self, name: &str, kind: FileKind, bytes: &[u8]) -> UploadedFile {
        let content = extract_text(kind, name, bytes);
        let now = Utc::now();
        info!(
            "upload processed (name={}, kind={:?}, size={}, chars={})",
            name,
            kind,
            bytes.len(),
            content.chars().count()
        );
        UploadedFile {
            id: format!("{}-{}", name, now.timestamp_millis()),
            name: name.to_string(),
            mime_type: Self::mime_type(name),
            size: bytes.len() as u64,
            content,
            uploaded_at: now,
        }
    }
}

/// Human-readable size: `0 Bytes`, `1.5 KB`, `10 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}
