//! Path-prefix matching of changed files against the pipeline catalog.

use pathtrigger_core::catalog::PipelineCatalog;
use pathtrigger_core::ids::PipelineIdentifier;
use pathtrigger_core::outcome::TargetSet;
use pathtrigger_core::paths::PathSet;

/// A rule that fired, with the first path that satisfied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch<'a> {
    pub pipeline: &'a PipelineIdentifier,
    pub prefix: &'a str,
    pub path: &'a str,
}

/// Maps changed paths to the pipelines they trigger.
///
/// Holds no state: the same paths and catalog always yield the same set.
pub struct Resolver;

impl Resolver {
    pub fn new() -> Self {
        Self
    }

    /// Pipelines with at least one rule whose prefix starts some changed path.
    pub fn resolve(&self, paths: &PathSet, catalog: &PipelineCatalog) -> TargetSet {
        self.matches(paths, catalog)
            .into_iter()
            .map(|m| m.pipeline.clone())
            .collect()
    }

    /// Every rule that fired, in catalog order. A rule stops at its first matching path.
    pub fn matches<'a>(&self, paths: &'a PathSet, catalog: &'a PipelineCatalog) -> Vec<RuleMatch<'a>> {
        catalog
            .rules()
            .iter()
            .filter_map(|rule| {
                paths.first_with_prefix(&rule.prefix).map(|path| RuleMatch {
                    pipeline: &rule.id,
                    prefix: &rule.prefix,
                    path: path.as_str(),
                })
            })
            .collect()
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}
