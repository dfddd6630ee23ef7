// AWS account selection
//
// Deployments run either against the production account or the sandbox
// account. The choice drives the template bucket and the public DNS suffix.

use crate::{AwsConfig, TemplateBucketConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwsAccount {
    Production,
    Sandbox,
}

impl AwsAccount {
    /// Map the `--production_aws` flag to an account
    pub fn from_production_flag(production_aws: bool) -> Self {
        if production_aws {
            AwsAccount::Production
        } else {
            AwsAccount::Sandbox
        }
    }

    pub fn in_sandbox(&self) -> bool {
        matches!(self, AwsAccount::Sandbox)
    }

    pub fn template_bucket<'a>(&self, aws: &'a AwsConfig) -> &'a TemplateBucketConfig {
        match self {
            AwsAccount::Production => &aws.production,
            AwsAccount::Sandbox => &aws.sandbox,
        }
    }
}

impl std::fmt::Display for AwsAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AwsAccount::Production => write!(f, "production"),
            AwsAccount::Sandbox => write!(f, "sandbox"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_template_buckets() {
        let aws = AwsConfig::default();

        let production = AwsAccount::from_production_flag(true);
        assert!(!production.in_sandbox());
        assert_eq!(production.template_bucket(&aws).bucket, "openstax-cfn-templates");

        let sandbox = AwsAccount::from_production_flag(false);
        assert!(sandbox.in_sandbox());
        assert_eq!(sandbox.template_bucket(&aws).region, "us-west-2");
    }
}
