//! Deployment descriptors
//!
//! Each descriptor owns its stacks and decides names and parameter
//! defaults; the stack handles in `openstax_aws` do the CloudFormation work.

use async_trait::async_trait;
use clap::ValueEnum;
use tracing::info;

pub mod customized_pages;
pub mod hosted_edited;
pub mod names;

pub use customized_pages::CustomizedPages;
pub use hosted_edited::HostedEdited;

/// Constructor arguments shared by every descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentOptions {
    pub env_name: String,
    pub region: String,
    pub in_aws_sandbox: bool,
    pub dry_run: bool,
}

impl DeploymentOptions {
    /// Sandbox account, dry run
    pub fn new(env_name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            env_name: env_name.into(),
            region: region.into(),
            in_aws_sandbox: true,
            dry_run: true,
        }
    }

    pub fn in_aws_sandbox(mut self, in_aws_sandbox: bool) -> Self {
        self.in_aws_sandbox = in_aws_sandbox;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Stack lifecycle of a whole deployment
#[async_trait]
pub trait Deployment: Send + Sync {
    async fn create(&self) -> openstax_aws::Result<()>;
    async fn update(&self) -> openstax_aws::Result<()>;
    async fn delete(&self) -> openstax_aws::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Action {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Create => write!(f, "create"),
            Action::Update => write!(f, "update"),
            Action::Delete => write!(f, "delete"),
        }
    }
}

pub async fn run(deployment: &dyn Deployment, action: Action) -> openstax_aws::Result<()> {
    info!("Running {}", action);
    match action {
        Action::Create => deployment.create().await,
        Action::Update => deployment.update().await,
        Action::Delete => deployment.delete().await,
    }
}
