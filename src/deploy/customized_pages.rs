//! customized_pages: static pages bucket behind a custom domain

use async_trait::async_trait;
use openstax_aws::{
    AwsContext, CfnStack, DeploymentBase, ObjectStoreFactory, ParameterDefaults, S3TextFile,
    StackOperations, StackParams, Template,
};
use std::sync::Arc;

use super::{names, Deployment, DeploymentOptions};

pub const DEPLOYMENT_NAME: &str = "customized_pages";
pub const MAIN_STACK_ID: &str = "main";

/// Object key of the crawler policy in the pages bucket
pub const ROBOTS_KEY: &str = "robots/robots.txt";
/// Keeps crawlers off every non-canonical copy of the pages
pub const ROBOTS_TXT: &str = "User-agent: *\nDisallow: /";

const TEMPLATE: &str = include_str!("../../templates/customized_pages/main.yml");

pub fn template() -> Template {
    Template::new("main.yml", TEMPLATE)
}

pub struct CustomizedPages<S = CfnStack> {
    base: DeploymentBase,
    in_aws_sandbox: bool,
    main_stack: S,
    stores: Arc<dyn ObjectStoreFactory>,
}

impl CustomizedPages<CfnStack> {
    pub fn new(options: DeploymentOptions, aws: &AwsContext) -> Self {
        let base = base(&options);
        let main_stack = base.cfn_stack(MAIN_STACK_ID, template(), aws);
        Self {
            base,
            in_aws_sandbox: options.in_aws_sandbox,
            main_stack,
            stores: Arc::clone(&aws.stores),
        }
    }
}

fn base(options: &DeploymentOptions) -> DeploymentBase {
    DeploymentBase::new(
        &options.env_name,
        &options.region,
        DEPLOYMENT_NAME,
        options.dry_run,
    )
}

impl<S: StackOperations> CustomizedPages<S> {
    /// Build around an existing stack handle and object store
    pub fn with_stack(
        options: DeploymentOptions,
        main_stack: S,
        stores: Arc<dyn ObjectStoreFactory>,
    ) -> Self {
        Self {
            base: base(&options),
            in_aws_sandbox: options.in_aws_sandbox,
            main_stack,
            stores,
        }
    }

    pub fn base(&self) -> &DeploymentBase {
        &self.base
    }

    pub fn main_stack(&self) -> &S {
        &self.main_stack
    }

    pub fn hosted_zone_name(&self) -> &'static str {
        names::hosted_zone_name(self.in_aws_sandbox)
    }

    pub fn domain(&self) -> String {
        names::domain(self.base.env_name(), self.in_aws_sandbox)
    }

    pub fn bucket_name(&self) -> String {
        names::bucket_name(self.base.env_name(), self.in_aws_sandbox)
    }

    pub fn robots_file(&self) -> S3TextFile {
        S3TextFile::new(self.bucket_name(), self.base.region(), ROBOTS_KEY)
    }
}

impl<S: StackOperations> ParameterDefaults for CustomizedPages<S> {
    fn parameter_default(&self, parameter_name: &str) -> Option<String> {
        match parameter_name {
            "HostedZoneName" => Some(self.hosted_zone_name().to_string()),
            "BucketName" => Some(self.bucket_name()),
            _ => None,
        }
    }
}

#[async_trait]
impl<S: StackOperations> Deployment for CustomizedPages<S> {
    async fn create(&self) -> openstax_aws::Result<()> {
        let params = StackParams::from([("domain".to_string(), self.domain())]);
        self.main_stack.create(&params, self, true).await?;

        if !self.base.dry_run() {
            self.robots_file()
                .write(self.stores.as_ref(), ROBOTS_TXT)
                .await?;
        }

        Ok(())
    }

    async fn update(&self) -> openstax_aws::Result<()> {
        self.main_stack
            .apply_change_set(&StackParams::new(), self)
            .await
            .map(|_| ())
    }

    async fn delete(&self) -> openstax_aws::Result<()> {
        self.main_stack.delete(true).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_declares_descriptor_parameters() {
        let body = template().body().to_string();
        for parameter in ["domain:", "HostedZoneName:", "BucketName:"] {
            assert!(body.contains(parameter), "missing {}", parameter);
        }
    }
}
