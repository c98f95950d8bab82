//! Span creation for trigger handling.

use tracing::{Level, Span, span};

/// Attributes attached to an invocation span.
#[derive(Debug, Default)]
pub struct InvocationAttributes {
    pub invocation_id: String,
    pub repository: Option<String>,
    pub before: Option<String>,
    pub after: Option<String>,
    pub reference: Option<String>,
}

impl InvocationAttributes {
    pub fn new(invocation_id: impl Into<String>) -> Self {
        Self {
            invocation_id: invocation_id.into(),
            ..Self::default()
        }
    }

    pub fn range(
        mut self,
        repository: impl Into<String>,
        before: impl Into<String>,
        after: impl Into<String>,
    ) -> Self {
        self.repository = Some(repository.into());
        self.before = Some(before.into());
        self.after = Some(after.into());
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

/// Create a span covering one event invocation.
pub fn invocation_span(attrs: &InvocationAttributes) -> Span {
    span!(
        Level::INFO,
        "invocation.handle",
        invocation.id = attrs.invocation_id.as_str(),
        vcs.repository = attrs.repository.as_deref().unwrap_or(""),
        vcs.reference = attrs.reference.as_deref().unwrap_or(""),
        vcs.before = attrs.before.as_deref().unwrap_or(""),
        vcs.after = attrs.after.as_deref().unwrap_or(""),
    )
}

/// Create a span for one pipeline trigger.
pub fn trigger_span(pipeline: &str) -> Span {
    span!(Level::INFO, "pipeline.trigger", pipeline.name = pipeline)
}

/// Create a span for one diff page request.
pub fn diff_page_span(repository: &str, page: usize) -> Span {
    span!(
        Level::DEBUG,
        "diff.page",
        vcs.repository = repository,
        page = page,
    )
}
