// Configuration validation
//
// Validates that required fields are present and values are sensible

use crate::*;
use anyhow::{bail, Result};
use tracing::warn;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

pub fn validate_config(config: &DeployConfig) -> Result<()> {
    validate_aws_config(&config.aws)?;
    validate_logging_config(&config.logging)?;
    validate_stack_config(&config.stacks)?;
    Ok(())
}

fn validate_aws_config(config: &AwsConfig) -> Result<()> {
    if config.default_region.is_empty() {
        bail!("aws.default_region must not be empty");
    }

    validate_template_bucket("aws.production", &config.production)?;
    validate_template_bucket("aws.sandbox", &config.sandbox)?;

    if config.production.bucket == config.sandbox.bucket {
        warn!(
            bucket = %config.production.bucket,
            "production and sandbox share a template bucket"
        );
    }

    Ok(())
}

fn validate_template_bucket(section: &str, bucket: &TemplateBucketConfig) -> Result<()> {
    if bucket.bucket.is_empty() {
        bail!("{}.bucket must not be empty", section);
    }

    if bucket.region.is_empty() {
        bail!("{}.region must not be empty", section);
    }

    Ok(())
}

fn validate_logging_config(config: &LoggingConfig) -> Result<()> {
    // Only `target=level` names a level to check; bare levels and bare
    // targets are left to EnvFilter
    for directive in config.level.split(',') {
        let Some((_, level)) = directive.rsplit_once('=') else {
            continue;
        };
        let level = level.trim();
        if !LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            bail!(
                "logging.level '{}' has unknown level '{}'; expected one of: {}",
                config.level,
                level,
                LOG_LEVELS.join(", ")
            );
        }
    }

    Ok(())
}

fn validate_stack_config(config: &StackConfig) -> Result<()> {
    if config.poll_interval_secs == 0 {
        bail!("stacks.poll_interval_secs must be greater than 0");
    }

    if config.poll_interval_secs > 300 {
        warn!(
            poll_interval_secs = config.poll_interval_secs,
            "stacks.poll_interval_secs is very large; stack waits will be slow to notice completion"
        );
    }

    Ok(())
}
