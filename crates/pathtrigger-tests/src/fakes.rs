//! In-memory implementations of the diff and trigger ports.

use async_trait::async_trait;
use pathtrigger_core::events::CommitRange;
use pathtrigger_core::ids::{ExecutionId, PipelineIdentifier};
use pathtrigger_core::ports::{DiffEntry, DiffPage, DiffSource, TriggerSink};
use pathtrigger_core::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Serves pre-scripted pages keyed by the continuation token they answer.
///
/// The first page is keyed by `None`. Asking for a token nothing was scripted
/// for is an error, so a wrong token in the pagination loop fails loudly.
#[derive(Default)]
pub struct ScriptedDiffSource {
    pages: HashMap<Option<String>, DiffPage>,
    failures: HashMap<Option<String>, String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<Option<String>>>,
}

impl ScriptedDiffSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// One page, no continuation.
    pub fn single_page(entries: Vec<DiffEntry>) -> Self {
        Self::new().with_page(None, DiffPage::new(entries))
    }

    /// Chain `pages` together with tokens `page-2`, `page-3`, ...
    pub fn paginated(pages: Vec<Vec<DiffEntry>>) -> Self {
        let count = pages.len();
        let mut source = Self::new();
        for (index, entries) in pages.into_iter().enumerate() {
            let token = (index > 0).then(|| page_token(index + 1));
            let mut page = DiffPage::new(entries);
            if index + 1 < count {
                page = page.with_next_token(page_token(index + 2));
            }
            source = source.with_page(token.as_deref(), page);
        }
        source
    }

    pub fn with_page(mut self, token: Option<&str>, page: DiffPage) -> Self {
        self.pages.insert(token.map(str::to_string), page);
        self
    }

    /// Fail the request made with `token`.
    pub fn failing_at(mut self, token: Option<&str>, message: impl Into<String>) -> Self {
        self.failures.insert(token.map(str::to_string), message.into());
        self
    }

    /// Sleep before answering every request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Tokens requested, in order.
    pub fn calls(&self) -> Vec<Option<String>> {
        self.calls.lock().expect("call log poisoned").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("call log poisoned").len()
    }
}

fn page_token(page: usize) -> String {
    format!("page-{}", page)
}

#[async_trait]
impl DiffSource for ScriptedDiffSource {
    async fn get_differences(&self, _range: &CommitRange, next_token: Option<&str>) -> Result<DiffPage> {
        let key = next_token.map(str::to_string);
        self.calls.lock().expect("call log poisoned").push(key.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = self.failures.get(&key) {
            return Err(Error::Remote(message.clone()));
        }
        self.pages
            .get(&key)
            .cloned()
            .ok_or_else(|| Error::Remote(format!("unknown continuation token {:?}", key)))
    }
}

/// Records every trigger and answers with a synthetic execution id.
///
/// Failures and delays can be injected per pipeline. The sink also tracks how
/// many calls were in flight at once.
#[derive(Default)]
pub struct RecordingTriggerSink {
    failures: HashSet<String>,
    delays: HashMap<String, Duration>,
    default_delay: Option<Duration>,
    calls: Mutex<Vec<PipelineIdentifier>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl RecordingTriggerSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, pipeline: impl Into<String>) -> Self {
        self.failures.insert(pipeline.into());
        self
    }

    pub fn with_delay(mut self, pipeline: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(pipeline.into(), delay);
        self
    }

    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = Some(delay);
        self
    }

    /// Pipelines triggered, in call order.
    pub fn calls(&self) -> Vec<PipelineIdentifier> {
        self.calls.lock().expect("call log poisoned").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("call log poisoned").len()
    }

    pub fn calls_for(&self, pipeline: &str) -> usize {
        self.calls
            .lock()
            .expect("call log poisoned")
            .iter()
            .filter(|p| p.as_str() == pipeline)
            .count()
    }

    /// Highest number of concurrent `start_execution` calls seen.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// The execution id returned for `pipeline`.
    pub fn execution_id_for(pipeline: &str) -> ExecutionId {
        ExecutionId::new(format!("exec-{}", pipeline))
    }
}

#[async_trait]
impl TriggerSink for RecordingTriggerSink {
    async fn start_execution(&self, pipeline: &PipelineIdentifier) -> Result<ExecutionId> {
        self.calls.lock().expect("call log poisoned").push(pipeline.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = self.delays.get(pipeline.as_str()).copied().or(self.default_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failures.contains(pipeline.as_str()) {
            return Err(Error::Remote(format!(
                "PipelineNotFoundException (400): {} does not exist",
                pipeline
            )));
        }
        Ok(Self::execution_id_for(pipeline.as_str()))
    }
}
