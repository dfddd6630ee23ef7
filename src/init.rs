// AWS environment setup
//
// Configures the template bucket and log output, then checks that this
// process can actually deploy: credentials must be present and the template
// bucket reachable. Either check failing stops the run.

use anyhow::{Context, Result};
use openstax_aws::AwsContext;
use openstax_deploy_config::{AwsAccount, DeployConfig};
use tracing::info;

/// Write the process-wide settings for the chosen account.
pub fn configure_openstax_aws(is_production: bool, config: &DeployConfig) {
    let account = AwsAccount::from_production_flag(is_production);
    let bucket = config.template_bucket(account).clone();

    openstax_aws::configure(|aws| {
        aws.cfn_template_bucket_name = bucket.bucket;
        aws.cfn_template_bucket_region = bucket.region;
        aws.logger = config.logging.clone();
        aws.stack_poll_interval = config.stacks.poll_interval();
    });

    openstax_aws::logging::init_logging(&openstax_aws::configuration().logger);
}

pub async fn init_openstax_aws(
    is_production: bool,
    config: &DeployConfig,
    aws: &AwsContext,
) -> Result<()> {
    openstax_aws::verify_secrets_populated(&aws.sdk_config)
        .await
        .context("AWS credentials check failed")?;

    configure_openstax_aws(is_production, config);

    openstax_aws::verify_template_bucket_access(aws.stores.as_ref())
        .await
        .context("Template bucket check failed")?;

    let settings = openstax_aws::configuration();
    info!(
        "Using {} AWS account, templates in s3://{} ({})",
        AwsAccount::from_production_flag(is_production),
        settings.cfn_template_bucket_name,
        settings.cfn_template_bucket_region
    );
    Ok(())
}
