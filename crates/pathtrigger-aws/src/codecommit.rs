//! CodeCommit `GetDifferences` diff source.

use crate::config::AwsConfig;
use crate::error::AwsError;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_codecommit::Client;
use aws_sdk_codecommit::types::Difference;
use pathtrigger_core::events::CommitRange;
use pathtrigger_core::ports::{DiffEntry, DiffPage, DiffSource};
use tracing::debug;

/// Diff source backed by CodeCommit.
pub struct CodeCommitDiffSource {
    client: Client,
    page_size: Option<i32>,
}

impl CodeCommitDiffSource {
    pub fn new(sdk: &SdkConfig, config: &AwsConfig) -> Result<Self, AwsError> {
        let mut builder = aws_sdk_codecommit::config::Builder::from(sdk);
        if let Some(endpoint) = config.codecommit_url()? {
            builder = builder.endpoint_url(endpoint);
        }
        Ok(Self::from_client(Client::from_conf(builder.build())))
    }

    pub fn from_client(client: Client) -> Self {
        Self {
            client,
            page_size: None,
        }
    }

    /// Ask for at most `size` differences per page.
    pub fn with_page_size(mut self, size: i32) -> Self {
        self.page_size = Some(size);
        self
    }
}

fn entry(diff: &Difference) -> DiffEntry {
    DiffEntry {
        before_path: diff.before_blob().and_then(|b| b.path()).map(str::to_string),
        after_path: diff.after_blob().and_then(|b| b.path()).map(str::to_string),
    }
}

#[async_trait]
impl DiffSource for CodeCommitDiffSource {
    async fn get_differences(
        &self,
        range: &CommitRange,
        next_token: Option<&str>,
    ) -> pathtrigger_core::Result<DiffPage> {
        let output = self
            .client
            .get_differences()
            .repository_name(&range.repository)
            .before_commit_specifier(&range.before)
            .after_commit_specifier(&range.after)
            .set_max_results(self.page_size)
            .set_next_token(next_token.map(str::to_string))
            .send()
            .await
            .map_err(AwsError::from)?;

        let page = DiffPage {
            entries: output.differences().iter().map(entry).collect(),
            next_token: output.next_token().map(str::to_string),
        };
        debug!(
            repository = %range.repository,
            entries = page.entries.len(),
            more = page.next_token.is_some(),
            "Fetched differences page"
        );
        Ok(page)
    }
}
