//! Change-to-pipeline resolution and dispatch for pathtrigger.

pub mod changes;
pub mod dispatcher;
pub mod invocation;
pub mod resolver;

pub use changes::collect_changed_paths;
pub use dispatcher::{DEFAULT_MAX_CONCURRENCY, Dispatcher};
pub use invocation::{Invocation, InvocationReport, InvocationSettings};
pub use resolver::{Resolver, RuleMatch};
