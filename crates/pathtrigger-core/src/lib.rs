//! pathtrigger Core
//!
//! Domain types, port traits, and error handling for pathtrigger.
//! This crate has minimal dependencies and defines the shared vocabulary
//! (changed paths, pipeline catalogs, trigger outcomes) used by the
//! dispatch engine and the remote adapters.

pub mod catalog;
pub mod error;
pub mod events;
pub mod ids;
pub mod outcome;
pub mod paths;
pub mod ports;

pub use catalog::{NamingConvention, PipelineCatalog, PipelineEntry, PipelineRule};
pub use error::{Error, Result};
pub use events::{CommitEvent, CommitRange};
pub use ids::*;
pub use outcome::{DispatchReport, TargetSet, TriggerOutcome};
pub use paths::{ChangedPath, PathSet, RemovedPathPolicy};
pub use ports::{DiffEntry, DiffPage, DiffSource, TriggerSink};
