//! Error types for pathtrigger.

use crate::ids::PipelineIdentifier;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Fatal input errors, raised before any remote call
    #[error("Invalid configuration: {0}")]
    ConfigurationInvalid(String),

    #[error("Invalid event: {0}")]
    EventInvalid(String),

    // Change retrieval
    #[error("Cannot get file diff for repository \"{repository}\": {source}")]
    DiffRetrievalFailed {
        repository: String,
        #[source]
        source: Box<Error>,
    },

    // Dispatch
    #[error("Cannot start pipeline \"{pipeline}\": {source}")]
    TriggerFailed {
        pipeline: PipelineIdentifier,
        #[source]
        source: Box<Error>,
    },

    #[error("{} of {total} pipeline triggers failed: {}", .failed.len(), join(.failed))]
    DispatchFailed {
        failed: Vec<PipelineIdentifier>,
        total: usize,
    },

    #[error("Invocation timed out after {0:?}")]
    Timeout(Duration),

    // Causes raised by adapters
    #[error("Network error: {0}")]
    Network(String),

    #[error("Remote service error: {0}")]
    Remote(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap a page-fetch failure for `repository`.
    pub fn diff_retrieval(repository: impl Into<String>, source: Error) -> Self {
        Error::DiffRetrievalFailed {
            repository: repository.into(),
            source: Box::new(source),
        }
    }

    /// Wrap a trigger failure for `pipeline`.
    pub fn trigger(pipeline: PipelineIdentifier, source: Error) -> Self {
        Error::TriggerFailed {
            pipeline,
            source: Box::new(source),
        }
    }

    /// Whether the invocation aborted before any pipeline could be triggered.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::TriggerFailed { .. } | Error::DispatchFailed { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

fn join(ids: &[PipelineIdentifier]) -> String {
    ids.iter()
        .map(PipelineIdentifier::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
