//! Command handlers.

use crate::config::CliConfig;
use anyhow::Context;
use console::style;
use pathtrigger_aws::{CodeCommitDiffSource, CodePipelineTriggerSink};
use pathtrigger_core::{CommitEvent, PathSet, PipelineCatalog, TargetSet};
use pathtrigger_dispatch::{Invocation, InvocationReport, Resolver};
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Every resolved pipeline started, or nothing matched.
pub const EXIT_OK: u8 = 0;
/// The invocation completed but at least one trigger failed.
pub const EXIT_TRIGGER_FAILED: u8 = 1;
/// Configuration, event or diff retrieval failure, or the deadline expiring
/// before dispatch began.
pub const EXIT_FATAL: u8 = 2;

#[derive(Serialize)]
struct ReportOutput<'a> {
    #[serde(flatten)]
    report: &'a InvocationReport,
    success: bool,
}

/// Handle one commit event against CodeCommit and CodePipeline.
pub async fn handle(config: &CliConfig, event_file: Option<&Path>) -> anyhow::Result<u8> {
    let catalog = config.catalog().context("Invalid pipeline configuration")?;
    let raw = read_event(event_file)?;
    let event = CommitEvent::from_json(&raw).context("Invalid commit event")?;

    let aws = config.aws();
    let sdk = aws.load().await;
    let diffs = CodeCommitDiffSource::new(&sdk, &aws)?;
    let triggers = CodePipelineTriggerSink::new(&sdk, &aws)?.for_event(&event);

    let invocation = Invocation::new(Arc::new(diffs), Arc::new(triggers), catalog, config.settings());
    info!(
        invocation_id = %invocation.id(),
        repository = %event.range.repository,
        "Handling commit event"
    );

    let report = invocation.handle(&event).await?;
    println!("{}", render_report(&report)?);

    Ok(exit_status(&report))
}

/// Resolve `paths` against the configured catalog without any remote call.
pub fn resolve(config: &CliConfig, paths: &[String], json: bool) -> anyhow::Result<u8> {
    let catalog = config.catalog().context("Invalid pipeline configuration")?;
    let paths: PathSet = paths.iter().map(String::as_str).collect();
    let targets = Resolver::new().resolve(&paths, &catalog);

    if json {
        println!("{}", serde_json::to_string_pretty(&targets)?);
    } else {
        for line in render_targets(&paths, &catalog, &targets) {
            println!("{}", line);
        }
    }

    Ok(EXIT_OK)
}

pub fn exit_status(report: &InvocationReport) -> u8 {
    if report.is_success() {
        EXIT_OK
    } else {
        EXIT_TRIGGER_FAILED
    }
}

pub fn render_report(report: &InvocationReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ReportOutput {
        report,
        success: report.is_success(),
    })
}

fn render_targets(paths: &PathSet, catalog: &PipelineCatalog, targets: &TargetSet) -> Vec<String> {
    if targets.is_empty() {
        return vec![format!("{} No pipelines match", style("i").blue())];
    }

    Resolver::new()
        .matches(paths, catalog)
        .into_iter()
        .map(|m| {
            format!(
                "{} {} ({} matched {})",
                style("✓").green(),
                style(m.pipeline).bold(),
                m.prefix,
                style(m.path).dim()
            )
        })
        .collect()
}

fn read_event(event_file: Option<&Path>) -> anyhow::Result<String> {
    match event_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event from {}", path.display())),
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read event from stdin")?;
            Ok(raw)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathtrigger_core::{
        DispatchReport, Error, ExecutionId, InvocationId, NamingConvention, PipelineEntry,
        PipelineIdentifier, TriggerOutcome,
    };
    use crate::Cli;
    use clap::Parser;
    use std::io::Write;
    use wiremock::matchers::any;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// A server that fails the test on drop if it saw any request.
    async fn untouched_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;
        server
    }

    fn event_file(raw: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", raw).unwrap();
        file
    }

    fn config(pipelines: &str, server: &MockServer) -> CliConfig {
        Cli::try_parse_from([
            "pathtrigger",
            "--pipelines",
            pipelines,
            "--codecommit-endpoint",
            &server.uri(),
            "--codepipeline-endpoint",
            &server.uri(),
            "handle",
        ])
        .unwrap()
        .config
    }

    const EVENT: &str = r#"{"detail": {"repositoryName": "monorepo", "oldCommitId": "a", "commitId": "b"}}"#;
    const PIPELINES: &str = r#"[{"name": "api", "path": "services/api/", "type": "backend"}]"#;

    fn report(outcomes: DispatchReport) -> InvocationReport {
        InvocationReport {
            invocation_id: InvocationId::new(),
            started_at: chrono::Utc::now(),
            targets: outcomes.outcomes().map(|(p, _)| p.clone()).collect(),
            outcomes,
        }
    }

    #[test]
    fn test_exit_status() {
        assert_eq!(exit_status(&report(DispatchReport::new())), EXIT_OK);

        let mut outcomes = DispatchReport::new();
        outcomes.record(
            PipelineIdentifier::new("dev-api-pipeline"),
            TriggerOutcome::Started(ExecutionId::new("exec-1")),
        );
        assert_eq!(exit_status(&report(outcomes)), EXIT_OK);

        let mut outcomes = DispatchReport::new();
        outcomes.record(
            PipelineIdentifier::new("dev-api-pipeline"),
            TriggerOutcome::Started(ExecutionId::new("exec-1")),
        );
        outcomes.record(
            PipelineIdentifier::new("dev-web-pipeline"),
            TriggerOutcome::Failed(Error::Remote("throttled".to_string())),
        );
        assert_eq!(exit_status(&report(outcomes)), EXIT_TRIGGER_FAILED);
    }

    #[test]
    fn test_render_report_carries_success() {
        let mut outcomes = DispatchReport::new();
        outcomes.record(
            PipelineIdentifier::new("dev-api-pipeline"),
            TriggerOutcome::Started(ExecutionId::new("exec-1")),
        );
        let rendered = render_report(&report(outcomes)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["targets"][0], "dev-api-pipeline");
        assert_eq!(value["outcomes"]["dev-api-pipeline"]["status"], "started");
        assert!(value["invocation_id"].is_string());
        assert!(value["started_at"].is_string());
    }

    #[test]
    fn test_render_targets() {
        console::set_colors_enabled(false);
        let catalog = PipelineCatalog::load(
            &[PipelineEntry::new("api", "services/api/")],
            &NamingConvention::default(),
        )
        .unwrap();
        let paths: PathSet = ["services/api/main.go"].into_iter().collect();
        let targets = Resolver::new().resolve(&paths, &catalog);

        let lines = render_targets(&paths, &catalog, &targets);
        assert_eq!(lines, vec!["✓ api-pipeline (services/api/ matched services/api/main.go)"]);

        let none: PathSet = ["docs/readme.md"].into_iter().collect();
        let lines = render_targets(&none, &catalog, &TargetSet::new());
        assert_eq!(lines, vec!["i No pipelines match"]);
    }

    #[test]
    fn test_read_event_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"detail\": {{}}}}").unwrap();

        let raw = read_event(Some(file.path())).unwrap();
        assert_eq!(raw, "{\"detail\": {}}");
    }

    #[tokio::test]
    async fn test_invalid_pipelines_stop_before_any_remote_call() {
        let server = untouched_server().await;
        let event = event_file(EVENT);

        let err = handle(&config("not json", &server), Some(event.path()))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<pathtrigger_core::Error>(),
            Some(Error::ConfigurationInvalid(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_event_stops_before_any_remote_call() {
        let server = untouched_server().await;
        let event = event_file(r#"{"detail": {"repositoryName": "monorepo", "commitId": "b"}}"#);

        let err = handle(&config(PIPELINES, &server), Some(event.path()))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<pathtrigger_core::Error>(),
            Some(Error::EventInvalid(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_endpoint_stops_before_any_remote_call() {
        let server = untouched_server().await;
        let event = event_file(EVENT);
        let mut config = config(PIPELINES, &server);
        config.codepipeline_endpoint = Some("localhost:4566".to_string());

        let err = handle(&config, Some(event.path())).await.unwrap_err();

        assert!(err.to_string().contains("Invalid endpoint"));
    }

    #[test]
    fn test_read_event_missing_file() {
        let err = read_event(Some(Path::new("/nonexistent/event.json"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/event.json"));
    }
}
