//! Test fixtures for catalogs and commit events.

use pathtrigger_core::catalog::{NamingConvention, PipelineCatalog, PipelineEntry, PipelineRule};
use pathtrigger_core::events::{CommitEvent, CommitRange};
use pathtrigger_core::ids::PipelineIdentifier;
use serde_json::json;

pub const REPOSITORY: &str = "monorepo";
pub const BEFORE_COMMIT: &str = "3e5a9bEXAMPLE";
pub const AFTER_COMMIT: &str = "3e5983EXAMPLE";

/// Factory for pipeline catalogs.
pub struct CatalogFixture;

impl CatalogFixture {
    /// A catalog whose identifiers are exactly the given names.
    pub fn rules(rules: &[(&str, &str)]) -> PipelineCatalog {
        PipelineCatalog::from_rules(
            rules
                .iter()
                .map(|(id, prefix)| PipelineRule {
                    id: PipelineIdentifier::new(*id),
                    prefix: prefix.to_string(),
                    kind: None,
                })
                .collect(),
        )
        .expect("fixture rules are valid")
    }

    /// The configured entries of a typical monorepo deployment.
    pub fn entries() -> Vec<PipelineEntry> {
        vec![
            PipelineEntry::new("api", "services/api/").with_kind("backend"),
            PipelineEntry::new("web", "services/web/").with_kind("frontend"),
            PipelineEntry::new("infra", "infra/").with_kind("infra"),
        ]
    }

    /// [`Self::entries`] under the `dev-app-` environment prefix.
    pub fn monorepo() -> PipelineCatalog {
        PipelineCatalog::load(&Self::entries(), &Self::naming()).expect("fixture entries are valid")
    }

    pub fn naming() -> NamingConvention {
        NamingConvention::from_handler_name(Some("dev-app-pipeline-handler"), "pipeline-handler")
    }

    /// `PIPELINES` JSON for [`Self::entries`].
    pub fn pipelines_json() -> String {
        serde_json::to_string(&Self::entries()).expect("entries serialize")
    }
}

/// Factory for commit events.
pub struct EventFixture;

impl EventFixture {
    pub fn range() -> CommitRange {
        CommitRange::new(REPOSITORY, BEFORE_COMMIT, AFTER_COMMIT)
    }

    pub fn push() -> CommitEvent {
        CommitEvent::new(Self::range()).with_reference("main")
    }

    /// EventBridge "CodeCommit Repository State Change" envelope for [`Self::push`].
    pub fn envelope_json() -> String {
        json!({
            "version": "0",
            "id": "01234567-0123-0123-0123-012345678901",
            "detail-type": "CodeCommit Repository State Change",
            "source": "aws.codecommit",
            "account": "123456789012",
            "time": "2026-01-01T00:00:00Z",
            "region": "us-east-1",
            "resources": ["arn:aws:codecommit:us-east-1:123456789012:monorepo"],
            "detail": {
                "event": "referenceUpdated",
                "repositoryName": REPOSITORY,
                "referenceType": "branch",
                "referenceName": "main",
                "referenceFullName": "refs/heads/main",
                "commitId": AFTER_COMMIT,
                "oldCommitId": BEFORE_COMMIT
            }
        })
        .to_string()
    }
}
