//! CodePipeline `StartPipelineExecution` trigger sink.

use crate::config::AwsConfig;
use crate::error::AwsError;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_codepipeline::Client;
use pathtrigger_core::events::CommitEvent;
use pathtrigger_core::ids::{ExecutionId, PipelineIdentifier};
use pathtrigger_core::ports::TriggerSink;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Trigger sink backed by CodePipeline.
pub struct CodePipelineTriggerSink {
    client: Client,
    idempotency_seed: Option<String>,
}

impl CodePipelineTriggerSink {
    pub fn new(sdk: &SdkConfig, config: &AwsConfig) -> Result<Self, AwsError> {
        let mut builder = aws_sdk_codepipeline::config::Builder::from(sdk);
        if let Some(endpoint) = config.codepipeline_url()? {
            builder = builder.endpoint_url(endpoint);
        }
        Ok(Self::from_client(Client::from_conf(builder.build())))
    }

    pub fn from_client(client: Client) -> Self {
        Self {
            client,
            idempotency_seed: None,
        }
    }

    /// Derive a `clientRequestToken` per pipeline from `seed`, so a
    /// redelivered event cannot start a second execution.
    pub fn with_idempotency_seed(mut self, seed: impl Into<String>) -> Self {
        self.idempotency_seed = Some(seed.into());
        self
    }

    /// Seed tokens from the ref update `event` describes.
    pub fn for_event(self, event: &CommitEvent) -> Self {
        self.with_idempotency_seed(event.idempotency_key())
    }

    fn request_token(&self, pipeline: &PipelineIdentifier) -> Option<String> {
        self.idempotency_seed
            .as_deref()
            .map(|seed| request_token(seed, pipeline.as_str()))
    }
}

/// Hex SHA-256 of `seed` and `pipeline`; fits the `[a-zA-Z0-9-]{1,128}` token format.
pub fn request_token(seed: &str, pipeline: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    hasher.update([0u8]);
    hasher.update(pipeline.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl TriggerSink for CodePipelineTriggerSink {
    async fn start_execution(
        &self,
        pipeline: &PipelineIdentifier,
    ) -> pathtrigger_core::Result<ExecutionId> {
        let output = self
            .client
            .start_pipeline_execution()
            .name(pipeline.as_str())
            .set_client_request_token(self.request_token(pipeline))
            .send()
            .await
            .map_err(AwsError::from)?;

        let execution_id = output
            .pipeline_execution_id()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                AwsError::UnexpectedResponse(format!(
                    "no execution id returned for pipeline \"{}\"",
                    pipeline
                ))
            })?;

        debug!(pipeline = %pipeline, execution_id = %execution_id, "Pipeline execution accepted");
        Ok(ExecutionId::new(execution_id))
    }
}
