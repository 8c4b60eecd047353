//! Errors raised while setting up the IAM client, and mapping of SDK
//! errors onto [`ServiceError`].

use aws_sdk_iam::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use roleclone::{Operation, ServiceError};
use thiserror::Error;

/// Error constructing an [`AwsIamService`](crate::AwsIamService).
#[derive(Debug, Error)]
pub enum AwsError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("no AWS credentials provider could be resolved (profile: {profile})")]
    NoCredentials { profile: String },

    #[error("failed to load AWS credentials (profile: {profile})")]
    Credentials {
        profile: String,
        source: aws_credential_types::provider::error::CredentialsError,
    },

    #[error("invalid page size {0}: must be between 1 and 1000")]
    InvalidPageSize(u32),
}

/// Result type for client setup.
pub type Result<T> = std::result::Result<T, AwsError>;

/// Converts an SDK error into the pipeline's opaque service error.
///
/// Keeps the IAM error code (`NoSuchEntity`, `EntityAlreadyExists`, ...)
/// when the service returned one; otherwise the full error chain becomes the
/// message.
pub(crate) fn service_error<E, R>(operation: Operation, err: SdkError<E, R>) -> ServiceError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = err.code().map(str::to_string);
    let message = match err.message() {
        Some(message) => message.to_string(),
        None => DisplayErrorContext(&err).to_string(),
    };

    let error = ServiceError::new(operation, message);
    match code {
        Some(code) => error.with_code(code),
        None => error,
    }
}
