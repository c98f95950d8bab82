//! Logging and span helpers for pathtrigger.
//!
//! Installs a `tracing-subscriber` registry with an env filter and a text or
//! JSON formatter, and provides the spans the dispatch engine runs under.

pub mod spans;
pub mod tracer;

pub use spans::{InvocationAttributes, diff_page_span, invocation_span, trigger_span};
pub use tracer::{LogFormat, TracerError, TracingConfig, init_tracing};
