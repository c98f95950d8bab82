//! Test infrastructure for pathtrigger.
//!
//! In-memory fakes for the two ports ([`ScriptedDiffSource`],
//! [`RecordingTriggerSink`]) plus catalog and event fixtures. The HTTP
//! adapters are exercised against `wiremock` in `tests/`.
//!
//! # Usage
//!
//! ```ignore
//! use pathtrigger_tests::{CatalogFixture, EventFixture, RecordingTriggerSink, ScriptedDiffSource};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let diffs = ScriptedDiffSource::single_page(vec![DiffEntry::modified("services/api/main.go")]);
//!     let sink = RecordingTriggerSink::new();
//!     // Build an Invocation over Arc::new(diffs) and Arc::new(sink)...
//! }
//! ```

pub mod fakes;
pub mod fixtures;
pub mod helpers;

pub use fakes::*;
pub use fixtures::*;
pub use helpers::*;

/// Initialize test logging (call once per test binary).
pub fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,pathtrigger_dispatch=debug")),
        )
        .with_test_writer()
        .try_init();
}
