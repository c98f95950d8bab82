//! AWS adapters for pathtrigger.
//!
//! Calls CodeCommit (`GetDifferences`) and CodePipeline
//! (`StartPipelineExecution`) through the AWS SDK. Requests are signed with
//! credentials from the default provider chain; endpoints can be pointed at
//! a local emulator.

pub mod codecommit;
pub mod codepipeline;
pub mod config;
pub mod error;

pub use codecommit::CodeCommitDiffSource;
pub use codepipeline::CodePipelineTriggerSink;
pub use config::AwsConfig;
pub use error::AwsError;
