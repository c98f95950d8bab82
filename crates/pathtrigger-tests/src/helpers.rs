//! Test helper functions and utilities.

use pathtrigger_core::catalog::PipelineCatalog;
use pathtrigger_core::ports::{DiffSource, TriggerSink};
use pathtrigger_dispatch::{Invocation, InvocationSettings};
use std::sync::Arc;
use std::time::Duration;

/// Build an invocation over the given ports with default settings.
pub fn invocation<D, T>(diffs: Arc<D>, triggers: Arc<T>, catalog: PipelineCatalog) -> Invocation
where
    D: DiffSource + 'static,
    T: TriggerSink + 'static,
{
    invocation_with(diffs, triggers, catalog, InvocationSettings::default())
}

pub fn invocation_with<D, T>(
    diffs: Arc<D>,
    triggers: Arc<T>,
    catalog: PipelineCatalog,
    settings: InvocationSettings,
) -> Invocation
where
    D: DiffSource + 'static,
    T: TriggerSink + 'static,
{
    Invocation::new(diffs, triggers, catalog, settings)
}

/// Settings with a short deadline for timeout tests.
pub fn short_deadline(millis: u64) -> InvocationSettings {
    InvocationSettings::default().with_deadline(Duration::from_millis(millis))
}
