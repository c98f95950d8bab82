//! Resolution and dispatch results.

use crate::ids::{ExecutionId, PipelineIdentifier};
use crate::{Error, Result};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

/// Deduplicated pipelines selected for triggering.
pub type TargetSet = BTreeSet<PipelineIdentifier>;

/// Result of triggering one pipeline.
#[derive(Debug)]
pub enum TriggerOutcome {
    Started(ExecutionId),
    /// Always an [`Error::TriggerFailed`].
    Failed(Error),
}

impl TriggerOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, TriggerOutcome::Started(_))
    }

    pub fn execution_id(&self) -> Option<&ExecutionId> {
        match self {
            TriggerOutcome::Started(id) => Some(id),
            TriggerOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            TriggerOutcome::Started(_) => None,
            TriggerOutcome::Failed(err) => Some(err),
        }
    }
}

impl Serialize for TriggerOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("TriggerOutcome", 2)?;
        match self {
            TriggerOutcome::Started(id) => {
                state.serialize_field("status", "started")?;
                state.serialize_field("execution_id", id)?;
            }
            TriggerOutcome::Failed(err) => {
                state.serialize_field("status", "failed")?;
                state.serialize_field("error", &err.to_string())?;
            }
        }
        state.end()
    }
}

/// Per-pipeline outcomes of one dispatch.
#[derive(Debug, Default)]
pub struct DispatchReport {
    outcomes: BTreeMap<PipelineIdentifier, TriggerOutcome>,
}

impl DispatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an outcome. A second record for the same pipeline replaces the first.
    pub fn record(&mut self, pipeline: PipelineIdentifier, outcome: TriggerOutcome) {
        self.outcomes.insert(pipeline, outcome);
    }

    pub fn get(&self, pipeline: &PipelineIdentifier) -> Option<&TriggerOutcome> {
        self.outcomes.get(pipeline)
    }

    pub fn outcomes(&self) -> impl Iterator<Item = (&PipelineIdentifier, &TriggerOutcome)> {
        self.outcomes.iter()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// True when every recorded trigger started. An empty report is a success.
    pub fn is_success(&self) -> bool {
        self.outcomes.values().all(TriggerOutcome::is_started)
    }

    pub fn succeeded(&self) -> Vec<&PipelineIdentifier> {
        self.outcomes
            .iter()
            .filter(|(_, o)| o.is_started())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn failed(&self) -> Vec<&PipelineIdentifier> {
        self.outcomes
            .iter()
            .filter(|(_, o)| !o.is_started())
            .map(|(id, _)| id)
            .collect()
    }

    /// Turn a report with failures into [`Error::DispatchFailed`].
    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        Err(Error::DispatchFailed {
            failed: self.failed().into_iter().cloned().collect(),
            total: self.len(),
        })
    }
}

impl Serialize for DispatchReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.outcomes.len()))?;
        for (pipeline, outcome) in &self.outcomes {
            map.serialize_entry(pipeline, outcome)?;
        }
        map.end()
    }
}
