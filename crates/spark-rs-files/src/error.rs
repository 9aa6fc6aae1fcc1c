use thiserror::Error;

/// Errors raised while accepting an upload. Each names the file it concerns
/// so batch callers can report failures one by one.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("You can only upload up to {max} files at once (got {count}).")]
    TooManyFiles { count: usize, max: usize },
    #[error("{name} is not a supported file type ({mime}).")]
    UnsupportedType { name: String, mime: String },
    #[error("{name} is larger than {limit_mb}MB ({size}).")]
    TooLarge {
        name: String,
        size: String,
        limit_mb: u64,
    },
    #[error("failed to read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl FileError {
    /// File the error concerns; `None` for batch-level errors.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            FileError::TooManyFiles { .. } => None,
            FileError::UnsupportedType { name, .. }
            | FileError::TooLarge { name, .. }
            | FileError::Read { name, .. } => Some(name),
        }
    }
}
