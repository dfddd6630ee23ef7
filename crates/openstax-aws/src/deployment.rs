//! Shared state of every deployment descriptor

use aws_config::{BehaviorVersion, Region, SdkConfig};
use std::sync::Arc;

use crate::stack::{CfnStack, StackSpec};
use crate::storage::{ObjectStoreFactory, S3ObjectStores};
use crate::template::Template;

/// Environment, region and dry-run flag of one deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentBase {
    env_name: String,
    region: String,
    name: String,
    dry_run: bool,
}

impl DeploymentBase {
    pub fn new(
        env_name: impl Into<String>,
        region: impl Into<String>,
        name: impl Into<String>,
        dry_run: bool,
    ) -> Self {
        Self {
            env_name: env_name.into(),
            region: region.into(),
            name: name.into(),
            dry_run,
        }
    }

    pub fn env_name(&self) -> &str {
        &self.env_name
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// `<env>-<deployment>-<stack id>`, underscores turned into hyphens
    pub fn stack_name(&self, stack_id: &str) -> String {
        format!("{}-{}-{}", self.env_name, self.name, stack_id).replace('_', "-")
    }

    pub fn stack_spec(&self, stack_id: &str, template: Template) -> StackSpec {
        StackSpec {
            id: stack_id.to_string(),
            name: self.stack_name(stack_id),
            deployment_name: self.name.clone(),
            template,
            dry_run: self.dry_run,
        }
    }

    pub fn cfn_stack(&self, stack_id: &str, template: Template, aws: &AwsContext) -> CfnStack {
        CfnStack::new(
            self.stack_spec(stack_id, template),
            aws_sdk_cloudformation::Client::new(&aws.sdk_config),
            Arc::clone(&aws.stores),
        )
    }
}

/// SDK configuration and object stores for one region
#[derive(Clone)]
pub struct AwsContext {
    pub sdk_config: SdkConfig,
    pub stores: Arc<dyn ObjectStoreFactory>,
}

impl AwsContext {
    /// Load credentials and settings from the standard AWS environment.
    /// Buckets are reached through `s3_endpoint` when given.
    pub async fn load(region: &str, s3_endpoint: Option<&str>) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        let stores = match s3_endpoint {
            Some(endpoint) => S3ObjectStores::with_endpoint(endpoint),
            None => S3ObjectStores::new(),
        };

        Self {
            sdk_config,
            stores: Arc::new(stores),
        }
    }
}
