//! Error types / 错误类型
//!
//! Ingestion errors abort only the job that raised them; the task queue
//! reports them back to that job's caller. Rebuild errors are logged only.

use thiserror::Error;

/// Storage collaborator failure / 存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("batch insert failed after {attempts} retries: {message}")]
    Busy { attempts: usize, message: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Ingestion / lookup error taxonomy / 导入错误分类
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("malformed header: {0}")]
    MalformedHeader(&'static str),

    #[error("ill-formed filename: {0}")]
    InvalidFilename(String),

    #[error("unsupported file extension: {0}")]
    UnsupportedFileType(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("task queue closed before the job finished")]
    QueueClosed,

    #[error("job panicked: {0}")]
    JobPanicked(String),
}

impl From<serde_json::Error> for IngestError {
    fn from(e: serde_json::Error) -> Self {
        IngestError::Validation(e.to_string())
    }
}

/// Autocomplete index rebuild failure, never surfaced to an ingestion caller
#[derive(Debug, Error)]
pub enum RebuildError {
    #[error("auto-complete rebuild failed: {0}")]
    Storage(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_errors_become_validation_errors() {
        let err: IngestError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, IngestError::Validation(_)));
    }

    #[test]
    fn test_messages_carry_context() {
        let err = IngestError::InvalidFilename("readme".to_string());
        assert_eq!(err.to_string(), "ill-formed filename: readme");
        let err = IngestError::MalformedHeader("missing header section");
        assert_eq!(err.to_string(), "malformed header: missing header section");
    }
}
