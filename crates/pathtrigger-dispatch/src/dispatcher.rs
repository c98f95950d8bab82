//! Fan-out of trigger calls over the resolved target set.

use futures::stream::{self, StreamExt};
use pathtrigger_core::Error;
use pathtrigger_core::ids::PipelineIdentifier;
use pathtrigger_core::outcome::{DispatchReport, TargetSet, TriggerOutcome};
use pathtrigger_core::ports::TriggerSink;
use pathtrigger_trace::trigger_span;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{Instrument, error, info, warn};

/// Default number of trigger calls in flight at once.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Starts one execution per target and records every outcome.
pub struct Dispatcher {
    sink: Arc<dyn TriggerSink>,
    max_concurrency: usize,
}

impl Dispatcher {
    pub fn new(sink: Arc<dyn TriggerSink>) -> Self {
        Self {
            sink,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Bound the number of concurrent trigger calls. Values below 1 are raised to 1.
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Trigger every pipeline in `targets` exactly once.
    ///
    /// A failed trigger never stops the others; the report holds one outcome
    /// per target once all calls have completed.
    pub async fn dispatch(&self, targets: &TargetSet) -> DispatchReport {
        self.drain(targets, None).await
    }

    /// Like [`dispatch`](Self::dispatch), but stops waiting at `deadline`.
    ///
    /// Outcomes that completed in time are kept. Every target still pending
    /// is recorded as a trigger failure caused by `Error::Timeout(limit)`.
    pub async fn dispatch_until(
        &self,
        targets: &TargetSet,
        deadline: Instant,
        limit: Duration,
    ) -> DispatchReport {
        self.drain(targets, Some((deadline, limit))).await
    }

    async fn drain(&self, targets: &TargetSet, deadline: Option<(Instant, Duration)>) -> DispatchReport {
        let mut report = DispatchReport::new();
        if targets.is_empty() {
            return report;
        }

        let mut completions = stream::iter(targets.iter().cloned())
            .map(|pipeline| self.trigger(pipeline))
            .buffer_unordered(self.max_concurrency);

        loop {
            let next = match deadline {
                Some((at, limit)) => match tokio::time::timeout_at(at, completions.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        drop(completions);
                        expire(&mut report, targets, limit);
                        break;
                    }
                },
                None => completions.next().await,
            };
            match next {
                Some((pipeline, outcome)) => report.record(pipeline, outcome),
                None => break,
            }
        }

        report
    }

    async fn trigger(&self, pipeline: PipelineIdentifier) -> (PipelineIdentifier, TriggerOutcome) {
        let span = trigger_span(pipeline.as_str());
        let outcome = async {
            match self.sink.start_execution(&pipeline).await {
                Ok(execution_id) => {
                    info!(pipeline = %pipeline, execution_id = %execution_id, "Pipeline started");
                    TriggerOutcome::Started(execution_id)
                }
                Err(e) => {
                    error!(pipeline = %pipeline, error = %e, "Pipeline trigger failed");
                    TriggerOutcome::Failed(Error::trigger(pipeline.clone(), e))
                }
            }
        }
        .instrument(span)
        .await;

        (pipeline, outcome)
    }
}

fn expire(report: &mut DispatchReport, targets: &TargetSet, limit: Duration) {
    let pending: Vec<PipelineIdentifier> = targets
        .iter()
        .filter(|pipeline| report.get(pipeline).is_none())
        .cloned()
        .collect();
    warn!(
        pending = ?pending.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
        ?limit,
        "Deadline expired with triggers in flight"
    );
    for pipeline in pending {
        let cause = Error::Timeout(limit);
        report.record(pipeline.clone(), TriggerOutcome::Failed(Error::trigger(pipeline, cause)));
    }
}
