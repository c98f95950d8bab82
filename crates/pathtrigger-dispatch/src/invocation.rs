//! One end-to-end handling of a commit event.

use crate::changes::collect_changed_paths;
use crate::dispatcher::{DEFAULT_MAX_CONCURRENCY, Dispatcher};
use crate::resolver::Resolver;
use chrono::{DateTime, Utc};
use pathtrigger_core::catalog::PipelineCatalog;
use pathtrigger_core::events::CommitEvent;
use pathtrigger_core::ids::InvocationId;
use pathtrigger_core::outcome::{DispatchReport, TargetSet};
use pathtrigger_core::paths::RemovedPathPolicy;
use pathtrigger_core::ports::{DiffSource, TriggerSink};
use pathtrigger_core::{Error, Result};
use pathtrigger_trace::{InvocationAttributes, invocation_span};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{Instrument, debug, info, warn};

/// Knobs for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationSettings {
    /// Upper bound on diff retrieval plus dispatch, measured from the start of
    /// the invocation.
    #[serde(default = "default_deadline")]
    pub deadline: Duration,
    /// Trigger calls in flight at once.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default)]
    pub removed_paths: RemovedPathPolicy,
}

fn default_deadline() -> Duration {
    Duration::from_secs(60)
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

impl Default for InvocationSettings {
    fn default() -> Self {
        Self {
            deadline: default_deadline(),
            max_concurrency: default_max_concurrency(),
            removed_paths: RemovedPathPolicy::default(),
        }
    }
}

impl InvocationSettings {
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max;
        self
    }

    pub fn with_removed_paths(mut self, policy: RemovedPathPolicy) -> Self {
        self.removed_paths = policy;
        self
    }
}

/// What one invocation resolved and how each trigger went.
#[derive(Debug, Serialize)]
pub struct InvocationReport {
    pub invocation_id: InvocationId,
    pub started_at: DateTime<Utc>,
    pub targets: TargetSet,
    pub outcomes: DispatchReport,
}

impl InvocationReport {
    /// Every resolved target triggered (vacuously true when nothing matched).
    pub fn is_success(&self) -> bool {
        self.outcomes.is_success()
    }
}

/// Wires diff retrieval, resolution and dispatch for one event.
pub struct Invocation {
    id: InvocationId,
    diffs: Arc<dyn DiffSource>,
    dispatcher: Dispatcher,
    resolver: Resolver,
    catalog: PipelineCatalog,
    settings: InvocationSettings,
}

impl Invocation {
    pub fn new(
        diffs: Arc<dyn DiffSource>,
        triggers: Arc<dyn TriggerSink>,
        catalog: PipelineCatalog,
        settings: InvocationSettings,
    ) -> Self {
        Self {
            id: InvocationId::new(),
            diffs,
            dispatcher: Dispatcher::new(triggers).with_max_concurrency(settings.max_concurrency),
            resolver: Resolver::new(),
            catalog,
            settings,
        }
    }

    pub fn id(&self) -> InvocationId {
        self.id
    }

    /// Handle one commit event within the configured deadline.
    ///
    /// Fatal errors (diff retrieval, or the deadline expiring before the
    /// targets are known) come back as `Err` with no report. Once dispatch
    /// has begun the report is always returned: trigger failures, including
    /// calls cut off by the deadline, are recorded inside it.
    pub async fn handle(&self, event: &CommitEvent) -> Result<InvocationReport> {
        let attrs = InvocationAttributes::new(self.id.to_string())
            .range(
                &event.range.repository,
                &event.range.before,
                &event.range.after,
            )
            .reference(event.reference_name.as_deref().unwrap_or(""));
        let span = invocation_span(&attrs);

        let deadline = Instant::now() + self.settings.deadline;
        self.run(event, deadline).instrument(span).await
    }

    async fn run(&self, event: &CommitEvent, deadline: Instant) -> Result<InvocationReport> {
        let started_at = Utc::now();
        let limit = self.settings.deadline;

        let collect = collect_changed_paths(self.diffs.as_ref(), &event.range, self.settings.removed_paths);
        let paths = match tokio::time::timeout_at(deadline, collect).await {
            Ok(paths) => paths?,
            Err(_) => {
                warn!(invocation_id = %self.id, ?limit, "Deadline expired during diff retrieval");
                return Err(Error::Timeout(limit));
            }
        };

        for m in self.resolver.matches(&paths, &self.catalog) {
            debug!(pipeline = %m.pipeline, prefix = m.prefix, path = m.path, "Rule matched");
        }
        let targets = self.resolver.resolve(&paths, &self.catalog);

        if targets.is_empty() {
            info!(paths = paths.len(), "No pipelines matched the changed paths");
            return Ok(InvocationReport {
                invocation_id: self.id,
                started_at,
                targets,
                outcomes: DispatchReport::new(),
            });
        }

        info!(
            paths = paths.len(),
            targets = ?targets.iter().map(|t| t.as_str()).collect::<Vec<_>>(),
            "Resolved target pipelines"
        );

        let outcomes = self.dispatcher.dispatch_until(&targets, deadline, limit).await;
        if outcomes.is_success() {
            info!(started = outcomes.len(), "All pipelines started successfully");
        } else {
            warn!(
                failed = outcomes.failed().len(),
                total = outcomes.len(),
                "Some pipelines failed to start"
            );
        }

        Ok(InvocationReport {
            invocation_id: self.id,
            started_at,
            targets,
            outcomes,
        })
    }
}
