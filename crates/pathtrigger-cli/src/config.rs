//! CLI configuration, read from flags or the environment.

use clap::Args;
use pathtrigger_aws::AwsConfig;
use pathtrigger_core::catalog::DEFAULT_HANDLER_MARKER;
use pathtrigger_core::paths::RemovedPathPolicy;
use pathtrigger_core::{Error, NamingConvention, PipelineCatalog};
use pathtrigger_dispatch::{DEFAULT_MAX_CONCURRENCY, InvocationSettings};
use pathtrigger_trace::{LogFormat, TracingConfig};
use std::time::Duration;

/// CLI configuration.
#[derive(Debug, Clone, Args)]
pub struct CliConfig {
    /// JSON array of `{name, path, type}` pipeline entries
    #[arg(long, env = "PIPELINES", global = true, hide_env_values = true)]
    pub pipelines: Option<String>,

    /// Name of the running handler; its part before the marker is the environment prefix
    #[arg(long, env = "AWS_LAMBDA_FUNCTION_NAME", global = true)]
    pub function_name: Option<String>,

    #[arg(long, env = "PATHTRIGGER_HANDLER_MARKER", default_value = DEFAULT_HANDLER_MARKER, global = true)]
    pub handler_marker: String,

    #[arg(long, env = "PATHTRIGGER_PIPELINE_SUFFIX", default_value = "-pipeline", global = true)]
    pub pipeline_suffix: String,

    #[arg(long, env = "AWS_REGION", default_value = "us-east-1", global = true)]
    pub region: String,

    #[arg(long, env = "PATHTRIGGER_CODECOMMIT_ENDPOINT", global = true)]
    pub codecommit_endpoint: Option<String>,

    #[arg(long, env = "PATHTRIGGER_CODEPIPELINE_ENDPOINT", global = true)]
    pub codepipeline_endpoint: Option<String>,

    /// Seconds allowed for diff retrieval plus dispatch
    #[arg(long, env = "PATHTRIGGER_DEADLINE_SECS", default_value_t = 60, global = true)]
    pub deadline_secs: u64,

    /// Trigger calls in flight at once
    #[arg(long, env = "PATHTRIGGER_MAX_CONCURRENCY", default_value_t = DEFAULT_MAX_CONCURRENCY, global = true)]
    pub max_concurrency: usize,

    /// Let deleted files trigger pipelines through their old path
    #[arg(long, env = "PATHTRIGGER_INCLUDE_REMOVED", global = true)]
    pub include_removed: bool,

    /// `text` or `json`
    #[arg(long, env = "PATHTRIGGER_LOG_FORMAT", default_value = "text", global = true)]
    pub log_format: LogFormat,
}

impl CliConfig {
    pub fn naming(&self) -> NamingConvention {
        NamingConvention::from_handler_name(self.function_name.as_deref(), &self.handler_marker)
            .with_suffix(self.pipeline_suffix.clone())
    }

    pub fn catalog(&self) -> pathtrigger_core::Result<PipelineCatalog> {
        let raw = self
            .pipelines
            .as_deref()
            .ok_or_else(|| Error::ConfigurationInvalid("PIPELINES is not set".to_string()))?;
        PipelineCatalog::from_json(raw, &self.naming())
    }

    pub fn settings(&self) -> InvocationSettings {
        let removed_paths = if self.include_removed {
            RemovedPathPolicy::IncludeBeforePath
        } else {
            RemovedPathPolicy::Skip
        };
        InvocationSettings::default()
            .with_deadline(Duration::from_secs(self.deadline_secs))
            .with_max_concurrency(self.max_concurrency)
            .with_removed_paths(removed_paths)
    }

    pub fn aws(&self) -> AwsConfig {
        let mut config = AwsConfig::new(self.region.clone());
        if let Some(endpoint) = &self.codecommit_endpoint {
            config = config.with_codecommit_endpoint(endpoint.clone());
        }
        if let Some(endpoint) = &self.codepipeline_endpoint {
            config = config.with_codepipeline_endpoint(endpoint.clone());
        }
        config
    }

    pub fn tracing(&self) -> TracingConfig {
        TracingConfig::default().with_format(self.log_format)
    }
}
