//! End-to-end tests of the AWS adapters against mock CodeCommit and CodePipeline servers.
//!
//! Run with: `cargo test -p pathtrigger-tests --test aws_tests`

use aws_sdk_codecommit::config::Credentials;
use pathtrigger_aws::codepipeline::request_token;
use pathtrigger_aws::{AwsConfig, CodeCommitDiffSource, CodePipelineTriggerSink};
use pathtrigger_core::{CommitEvent, Error, PipelineCatalog, PipelineIdentifier};
use pathtrigger_tests::{AFTER_COMMIT, CatalogFixture, EventFixture, init_test_logging, invocation};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, header_regex, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GET_DIFFERENCES: &str = "CodeCommit_20150413.GetDifferences";
const START_PIPELINE_EXECUTION: &str = "CodePipeline_20150709.StartPipelineExecution";

struct Services {
    codecommit: MockServer,
    codepipeline: MockServer,
}

impl Services {
    async fn start() -> Self {
        Self {
            codecommit: MockServer::start().await,
            codepipeline: MockServer::start().await,
        }
    }

    fn config(&self) -> AwsConfig {
        AwsConfig::new("us-east-1")
            .with_codecommit_endpoint(self.codecommit.uri())
            .with_codepipeline_endpoint(self.codepipeline.uri())
    }

    async fn adapters(
        &self,
        event: &CommitEvent,
    ) -> (Arc<CodeCommitDiffSource>, Arc<CodePipelineTriggerSink>) {
        adapters(&self.config(), event).await
    }

    async fn start_pipeline(&self, event: &CommitEvent, name: &str) {
        Mock::given(method("POST"))
            .and(header("X-Amz-Target", START_PIPELINE_EXECUTION))
            .and(header_regex("authorization", "^AWS4-HMAC-SHA256 "))
            .and(body_partial_json(json!({
                "name": name,
                "clientRequestToken": request_token(&event.idempotency_key(), name)
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"pipelineExecutionId": format!("exec-{}", name)})),
            )
            .expect(1)
            .mount(&self.codepipeline)
            .await;
    }
}

async fn adapters(
    config: &AwsConfig,
    event: &CommitEvent,
) -> (Arc<CodeCommitDiffSource>, Arc<CodePipelineTriggerSink>) {
    let sdk = config
        .loader()
        .credentials_provider(Credentials::new("AKIDTEST", "secret", None, None, "aws-tests"))
        .load()
        .await;
    let diffs = CodeCommitDiffSource::new(&sdk, config).expect("valid endpoint");
    let sink = CodePipelineTriggerSink::new(&sdk, config)
        .expect("valid endpoint")
        .for_event(event);
    (Arc::new(diffs), Arc::new(sink))
}

fn difference(path: &str) -> serde_json::Value {
    json!({
        "beforeBlob": {"blobId": "a", "path": path, "mode": "100644"},
        "afterBlob": {"blobId": "b", "path": path, "mode": "100644"},
        "changeType": "M"
    })
}

fn catalog() -> PipelineCatalog {
    CatalogFixture::monorepo()
}

#[tokio::test]
async fn test_paginated_diff_triggers_matching_pipelines() {
    init_test_logging();
    let services = Services::start().await;

    Mock::given(method("POST"))
        .and(header("X-Amz-Target", GET_DIFFERENCES))
        .and(body_partial_json(json!({"NextToken": "token-2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "differences": [
                difference("infra/network/vpc.tf"),
                {"beforeBlob": {"path": "services/web/old.ts"}, "changeType": "D"}
            ]
        })))
        .expect(1)
        .with_priority(1)
        .mount(&services.codecommit)
        .await;
    Mock::given(method("POST"))
        .and(header("X-Amz-Target", GET_DIFFERENCES))
        .and(body_partial_json(json!({
            "repositoryName": "monorepo",
            "beforeCommitSpecifier": "3e5a9bEXAMPLE",
            "afterCommitSpecifier": AFTER_COMMIT
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "differences": [difference("services/api/main.go"), difference("README.md")],
            "NextToken": "token-2"
        })))
        .expect(1)
        .with_priority(2)
        .mount(&services.codecommit)
        .await;

    let event = CommitEvent::from_json(&EventFixture::envelope_json()).unwrap();
    services.start_pipeline(&event, "dev-app-api-pipeline").await;
    services.start_pipeline(&event, "dev-app-infra-pipeline").await;

    let (diffs, sink) = services.adapters(&event).await;

    let report = invocation(diffs, sink, catalog()).handle(&event).await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(
        report
            .outcomes
            .get(&PipelineIdentifier::new("dev-app-api-pipeline"))
            .and_then(|o| o.execution_id())
            .map(|id| id.as_str()),
        Some("exec-dev-app-api-pipeline")
    );
    assert!(
        report
            .outcomes
            .get(&PipelineIdentifier::new("dev-app-web-pipeline"))
            .is_none()
    );
}

#[tokio::test]
async fn test_missing_pipeline_is_reported_not_fatal() {
    init_test_logging();
    let services = Services::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "differences": [
                difference("services/api/main.go"),
                difference("services/web/index.ts")
            ]
        })))
        .mount(&services.codecommit)
        .await;

    let event = EventFixture::push();
    services.start_pipeline(&event, "dev-app-api-pipeline").await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"name": "dev-app-web-pipeline"})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__type": "PipelineNotFoundException",
            "message": "Account '123456789012' does not have a pipeline with name 'dev-app-web-pipeline'"
        })))
        .expect(1)
        .mount(&services.codepipeline)
        .await;

    let (diffs, sink) = services.adapters(&event).await;

    let report = invocation(diffs, sink, catalog()).handle(&event).await.unwrap();

    assert!(!report.is_success());
    let failure = report
        .outcomes
        .get(&PipelineIdentifier::new("dev-app-web-pipeline"))
        .and_then(|o| o.error())
        .unwrap();
    assert!(!failure.is_fatal());
    assert!(failure.to_string().contains("PipelineNotFoundException"));
    assert!(
        report
            .outcomes
            .get(&PipelineIdentifier::new("dev-app-api-pipeline"))
            .unwrap()
            .is_started()
    );
}

#[tokio::test]
async fn test_diff_service_error_aborts_before_any_trigger() {
    init_test_logging();
    let services = Services::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__type": "CommitDoesNotExistException",
            "message": "Could not find commit 3e5a9bEXAMPLE"
        })))
        .mount(&services.codecommit)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"pipelineExecutionId": "x"})))
        .expect(0)
        .mount(&services.codepipeline)
        .await;

    let event = EventFixture::push();
    let (diffs, sink) = services.adapters(&event).await;

    let err = invocation(diffs, sink, catalog()).handle(&event).await.unwrap_err();

    assert!(matches!(err, Error::DiffRetrievalFailed { .. }));
    assert!(err.to_string().contains("CommitDoesNotExistException"));
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() {
    let config = AwsConfig::default()
        .with_codecommit_endpoint("http://127.0.0.1:1")
        .with_codepipeline_endpoint("http://127.0.0.1:1");
    let event = EventFixture::push();
    let (diffs, sink) = adapters(&config, &event).await;

    let err = invocation(diffs, sink, catalog()).handle(&event).await.unwrap_err();

    match err {
        Error::DiffRetrievalFailed { source, .. } => {
            assert!(matches!(*source, Error::Network(_)));
        }
        other => panic!("expected DiffRetrievalFailed, got {:?}", other),
    }
}
