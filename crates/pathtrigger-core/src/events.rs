//! Inbound commit events.
//!
//! The handler is fed EventBridge "CodeCommit Repository State Change"
//! envelopes. Only the `detail` object matters; everything else in the
//! envelope is ignored.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Raw envelope as delivered by the event bus.
#[derive(Debug, Clone, Deserialize)]
pub struct EventEnvelope {
    #[serde(rename = "detail-type", default)]
    pub detail_type: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    pub detail: Option<ReferenceUpdatedDetail>,
}

/// `detail` object of a repository state change. Every field is optional at
/// this layer; [`CommitEvent::from_detail`] decides what is required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceUpdatedDetail {
    pub event: Option<String>,
    pub repository_name: Option<String>,
    pub reference_type: Option<String>,
    pub reference_name: Option<String>,
    pub commit_id: Option<String>,
    pub old_commit_id: Option<String>,
}

/// Two commits of one repository whose difference is to be inspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRange {
    pub repository: String,
    pub before: String,
    pub after: String,
}

impl CommitRange {
    pub fn new(
        repository: impl Into<String>,
        before: impl Into<String>,
        after: impl Into<String>,
    ) -> Self {
        Self {
            repository: repository.into(),
            before: before.into(),
            after: after.into(),
        }
    }
}

/// A validated commit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitEvent {
    pub range: CommitRange,
    pub reference_name: Option<String>,
}

impl CommitEvent {
    pub fn new(range: CommitRange) -> Self {
        Self {
            range,
            reference_name: None,
        }
    }

    pub fn with_reference(mut self, reference_name: impl Into<String>) -> Self {
        self.reference_name = Some(reference_name.into());
        self
    }

    /// Parse and validate an envelope from JSON.
    pub fn from_json(raw: &str) -> Result<Self> {
        let envelope: EventEnvelope = serde_json::from_str(raw)
            .map_err(|e| Error::EventInvalid(format!("cannot parse event: {}", e)))?;
        Self::from_envelope(envelope)
    }

    /// Identifies this ref update: repository, reference and after-commit.
    /// Two references advanced to the same commit give different keys.
    pub fn idempotency_key(&self) -> String {
        [
            self.range.repository.as_str(),
            self.reference_name.as_deref().unwrap_or_default(),
            self.range.after.as_str(),
        ]
        .join("\0")
    }

    pub fn from_envelope(envelope: EventEnvelope) -> Result<Self> {
        let detail = envelope
            .detail
            .ok_or_else(|| Error::EventInvalid("event has no detail".to_string()))?;
        Self::from_detail(detail)
    }

    pub fn from_detail(detail: ReferenceUpdatedDetail) -> Result<Self> {
        let repository = required(detail.repository_name, "repositoryName")?;
        let before = required(detail.old_commit_id, "oldCommitId")?;
        let after = required(detail.commit_id, "commitId")?;

        Ok(Self {
            range: CommitRange::new(repository, before, after),
            reference_name: detail.reference_name.filter(|r| !r.is_empty()),
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::EventInvalid(format!(
            "required field \"{}\" is missing or empty",
            field
        ))),
    }
}
