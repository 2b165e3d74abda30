//! Error handling module

use std::path::PathBuf;
use thiserror::Error;

use crate::aws::AwsError;

/// Result type alias for operations that can fail with `ResolverError`
pub type Result<T> = std::result::Result<T, ResolverError>;

/// Error type for identifier resolution.
///
/// Only two service conditions are anticipated and handled without an error:
/// a bucket without a policy, and a policy rejected as malformed. Everything
/// that surfaces as a `ResolverError` aborts the run.
#[derive(Error, Debug)]
pub enum ResolverError {
    /// File system operation errors with detailed context
    #[error("File system error during {operation} on path '{path}': {source}")]
    FileSystem {
        /// The operation that failed (e.g., "read")
        operation: String,
        /// The file path involved in the operation
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A policy document could not be parsed or serialized
    #[error("Malformed input in {context}: {source}")]
    MalformedInput {
        /// Where the document came from (e.g., "saved bucket policy")
        context: String,
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Input validation errors for user-provided data
    #[error("Validation error: {message}")]
    Validation {
        /// Detailed validation error message
        message: String,
        /// Optional field name that failed validation
        field: Option<String>,
    },

    /// The saved policy was rejected by the service when writing it back
    #[error("Original policy of bucket '{bucket}' was rejected during restore")]
    RestoreRejected {
        /// Bucket whose policy could not be restored
        bucket: String,
    },

    /// Fatal errors from the storage service
    #[error(transparent)]
    Aws(#[from] AwsError),
}

impl ResolverError {
    /// Create a file system error with operation context
    pub(crate) fn file_system(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create a malformed input error
    pub(crate) fn malformed_input(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::MalformedInput {
            context: context.into(),
            source,
        }
    }

    /// Create a validation error for a named field
    pub(crate) fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub(crate) fn restore_rejected(bucket: impl Into<String>) -> Self {
        Self::RestoreRejected {
            bucket: bucket.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_system_error_creation() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error = ResolverError::file_system("read", "/path/to/input.txt", io_error);

        assert!(matches!(error, ResolverError::FileSystem { .. }));
        assert!(error.to_string().contains("read"));
        assert!(error.to_string().contains("/path/to/input.txt"));
    }

    #[test]
    fn test_malformed_input_keeps_context() {
        let json_error = serde_json::from_str::<serde_json::Value>("{ not json").unwrap_err();
        let error = ResolverError::malformed_input("saved bucket policy", json_error);

        assert!(error.to_string().contains("saved bucket policy"));
    }

    #[test]
    fn test_aws_error_is_transparent() {
        let error: ResolverError = AwsError::S3 {
            operation: "PutBucketPolicy".to_string(),
            code: Some("AccessDenied".to_string()),
            message: "Access Denied".to_string(),
        }
        .into();

        assert!(error.to_string().contains("PutBucketPolicy"));
        assert!(error.to_string().contains("AccessDenied"));
    }
}
