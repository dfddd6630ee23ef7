//! hosted_edited: DNS for the hosted edited site

use async_trait::async_trait;
use openstax_aws::{
    AwsContext, CfnStack, DeploymentBase, ParameterDefaults, StackOperations, StackParams,
    Template,
};

use super::{names, Deployment, DeploymentOptions};

pub const DEPLOYMENT_NAME: &str = "hosted_edited";
pub const STACK_ID: &str = "hosted_edited";

const TEMPLATE: &str = include_str!("../../templates/hosted_edited/hosted_edited.yml");

pub fn template() -> Template {
    Template::new("hosted_edited.yml", TEMPLATE)
}

pub struct HostedEdited<S = CfnStack> {
    base: DeploymentBase,
    in_aws_sandbox: bool,
    hosted_edited_stack: S,
}

impl HostedEdited<CfnStack> {
    pub fn new(options: DeploymentOptions, aws: &AwsContext) -> Self {
        let base = DeploymentBase::new(
            &options.env_name,
            &options.region,
            DEPLOYMENT_NAME,
            options.dry_run,
        );
        let hosted_edited_stack = base.cfn_stack(STACK_ID, template(), aws);
        Self::with_stack(options, hosted_edited_stack)
    }
}

impl<S: StackOperations> HostedEdited<S> {
    pub fn with_stack(options: DeploymentOptions, hosted_edited_stack: S) -> Self {
        Self {
            base: DeploymentBase::new(
                options.env_name,
                options.region,
                DEPLOYMENT_NAME,
                options.dry_run,
            ),
            in_aws_sandbox: options.in_aws_sandbox,
            hosted_edited_stack,
        }
    }

    pub fn base(&self) -> &DeploymentBase {
        &self.base
    }

    pub fn hosted_edited_stack(&self) -> &S {
        &self.hosted_edited_stack
    }

    pub fn hosted_zone_name(&self) -> &'static str {
        names::hosted_zone_name(self.in_aws_sandbox)
    }

    pub fn domain(&self) -> String {
        names::domain(self.base.env_name(), self.in_aws_sandbox)
    }
}

impl<S: StackOperations> ParameterDefaults for HostedEdited<S> {
    fn parameter_default(&self, parameter_name: &str) -> Option<String> {
        match parameter_name {
            "HostedZoneName" => Some(self.hosted_zone_name().to_string()),
            _ => None,
        }
    }
}

#[async_trait]
impl<S: StackOperations> Deployment for HostedEdited<S> {
    async fn create(&self) -> openstax_aws::Result<()> {
        let params = StackParams::from([("domain".to_string(), self.domain())]);
        self.hosted_edited_stack.create(&params, self, true).await
    }

    async fn update(&self) -> openstax_aws::Result<()> {
        self.hosted_edited_stack
            .apply_change_set(&StackParams::new(), self)
            .await
            .map(|_| ())
    }

    async fn delete(&self) -> openstax_aws::Result<()> {
        self.hosted_edited_stack.delete(true).await
    }
}
