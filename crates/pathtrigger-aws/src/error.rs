//! Adapter errors.

use aws_sdk_codecommit::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use std::fmt::Debug;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AwsError {
    /// The request never produced a service response: no credentials,
    /// connection refused, attempt timeout, unreadable response.
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("{code}: {message}")]
    Service { code: String, message: String },
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl<E, R> From<SdkError<E, R>> for AwsError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: Debug,
{
    fn from(err: SdkError<E, R>) -> Self {
        match err.as_service_error() {
            Some(service) => AwsError::Service {
                code: service.code().unwrap_or("Unknown").to_string(),
                message: service.message().unwrap_or_default().to_string(),
            },
            None => AwsError::Transport(DisplayErrorContext(&err).to_string()),
        }
    }
}

impl From<AwsError> for pathtrigger_core::Error {
    fn from(err: AwsError) -> Self {
        match err {
            AwsError::Transport(e) => pathtrigger_core::Error::Network(e),
            AwsError::InvalidEndpoint(e) => pathtrigger_core::Error::ConfigurationInvalid(e),
            other => pathtrigger_core::Error::Remote(other.to_string()),
        }
    }
}
