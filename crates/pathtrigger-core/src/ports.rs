//! Port traits (hexagonal architecture).
//!
//! These traits define the interfaces between the dispatch engine and the
//! remote services it talks to.

use crate::Result;
use crate::events::CommitRange;
use crate::ids::{ExecutionId, PipelineIdentifier};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One changed file between two commits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffEntry {
    /// Path before the change; absent for additions.
    pub before_path: Option<String>,
    /// Path after the change; absent for deletions.
    pub after_path: Option<String>,
}

impl DiffEntry {
    pub fn modified(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            before_path: Some(path.clone()),
            after_path: Some(path),
        }
    }

    pub fn added(path: impl Into<String>) -> Self {
        Self {
            before_path: None,
            after_path: Some(path.into()),
        }
    }

    pub fn deleted(path: impl Into<String>) -> Self {
        Self {
            before_path: Some(path.into()),
            after_path: None,
        }
    }

    pub fn renamed(before: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            before_path: Some(before.into()),
            after_path: Some(after.into()),
        }
    }
}

/// One page of a diff listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffPage {
    pub entries: Vec<DiffEntry>,
    /// Continuation token; `None` on the last page.
    pub next_token: Option<String>,
}

impl DiffPage {
    pub fn new(entries: Vec<DiffEntry>) -> Self {
        Self {
            entries,
            next_token: None,
        }
    }

    pub fn with_next_token(mut self, token: impl Into<String>) -> Self {
        self.next_token = Some(token.into());
        self
    }
}

/// Source of changed paths for a commit range.
#[async_trait]
pub trait DiffSource: Send + Sync {
    /// Fetch one page of differences. `next_token` is `None` for the first page.
    async fn get_differences(
        &self,
        range: &CommitRange,
        next_token: Option<&str>,
    ) -> Result<DiffPage>;
}

/// Service that starts pipeline executions.
#[async_trait]
pub trait TriggerSink: Send + Sync {
    /// Start one execution of `pipeline`.
    async fn start_execution(&self, pipeline: &PipelineIdentifier) -> Result<ExecutionId>;
}
