//! Service configuration for the AWS adapters.

use crate::error::AwsError;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, ConfigLoader, Region, SdkConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// AWS service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    pub region: String,
    /// Overrides the regional CodeCommit endpoint.
    #[serde(default)]
    pub codecommit_endpoint: Option<String>,
    /// Overrides the regional CodePipeline endpoint.
    #[serde(default)]
    pub codepipeline_endpoint: Option<String>,
    /// Per-attempt timeout.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: Duration,
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            codecommit_endpoint: None,
            codepipeline_endpoint: None,
            request_timeout: default_request_timeout(),
        }
    }
}

impl AwsConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Default::default()
        }
    }

    pub fn with_codecommit_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.codecommit_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_codepipeline_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.codepipeline_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// SDK loader with region and timeouts applied. Credentials come from the
    /// default provider chain unless the caller sets a provider.
    pub fn loader(&self) -> ConfigLoader {
        aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.region.clone()))
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_attempt_timeout(self.request_timeout)
                    .build(),
            )
    }

    pub async fn load(&self) -> SdkConfig {
        self.loader().load().await
    }

    /// Validated CodeCommit override, `None` for the regional endpoint.
    pub fn codecommit_url(&self) -> Result<Option<&str>, AwsError> {
        endpoint(self.codecommit_endpoint.as_deref())
    }

    /// Validated CodePipeline override, `None` for the regional endpoint.
    pub fn codepipeline_url(&self) -> Result<Option<&str>, AwsError> {
        endpoint(self.codepipeline_endpoint.as_deref())
    }
}

fn endpoint(raw: Option<&str>) -> Result<Option<&str>, AwsError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let url = Url::parse(raw).map_err(|e| AwsError::InvalidEndpoint(format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(Some(raw)),
        scheme => Err(AwsError::InvalidEndpoint(format!(
            "{}: unsupported scheme \"{}\"",
            raw, scheme
        ))),
    }
}

#[cfg(test)]
pub(crate) async fn test_sdk_config(config: &AwsConfig) -> SdkConfig {
    use aws_sdk_codecommit::config::Credentials;

    config
        .loader()
        .credentials_provider(Credentials::new("AKIDTEST", "secret", None, None, "test"))
        .load()
        .await
}
