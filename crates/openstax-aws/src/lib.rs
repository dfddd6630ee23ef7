//! openstax-aws - CloudFormation and S3 plumbing for OpenStax deployments
//!
//! Deployment descriptors describe *what* to deploy (stack ids, parameter
//! defaults, naming). This crate does the work: it keeps the process-wide
//! settings, uploads templates, resolves parameters, creates/updates/deletes
//! stacks and waits on them, and writes small text objects to S3.

mod configuration;
mod deployment;
mod error;
pub mod logging;
pub mod params;
mod secrets;
pub mod stack;
pub mod storage;
pub mod template;

pub use configuration::{configuration, configure, Configuration};
pub use deployment::{AwsContext, DeploymentBase};
pub use error::{AwsError, ErrorCode, Result};
pub use params::{ParameterDefaults, StackParams};
pub use secrets::{check_credentials, verify_secrets_populated, verify_template_bucket_access};
pub use stack::{CfnStack, ChangeSetOutcome, StackOperations, StackSpec};
pub use storage::{ObjectStoreFactory, S3ObjectStores, S3TextFile};
pub use template::Template;
