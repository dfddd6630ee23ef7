use crate::{DeployConfig, LogFormat};
use anyhow::{anyhow, Context, Result};

pub const ENV_PREFIX: &str = "OPENSTAX_DEPLOY_";

/// Abstraction over environment-variable lookups so tests can supply their
/// own source of overrides.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;

    /// Get an environment variable WITHOUT the OPENSTAX_DEPLOY_ prefix
    /// Used for AWS standard variables (AWS_REGION, etc.)
    fn get_raw(&self, key: &str) -> Option<String>;
}

/// Apply environment-variable overrides (highest priority) to the config.
pub fn apply_env_overrides<E: EnvSource>(config: &mut DeployConfig, env: &E) -> Result<()> {
    // Region: our own variable wins over the AWS standard one
    if let Some(region) = get_env_string(env, "REGION") {
        config.aws.default_region = region;
    } else if let Some(region) = env.get_raw("AWS_REGION") {
        config.aws.default_region = region;
    }

    // Template buckets
    if let Some(bucket) = get_env_string(env, "PRODUCTION_TEMPLATE_BUCKET") {
        config.aws.production.bucket = bucket;
    }
    if let Some(region) = get_env_string(env, "PRODUCTION_TEMPLATE_BUCKET_REGION") {
        config.aws.production.region = region;
    }
    if let Some(bucket) = get_env_string(env, "SANDBOX_TEMPLATE_BUCKET") {
        config.aws.sandbox.bucket = bucket;
    }
    if let Some(region) = get_env_string(env, "SANDBOX_TEMPLATE_BUCKET_REGION") {
        config.aws.sandbox.region = region;
    }

    if let Some(endpoint) = get_env_string(env, "S3_ENDPOINT") {
        config.aws.s3_endpoint = Some(endpoint);
    }

    // Logging
    if let Some(level) = get_env_string(env, "LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(format) = get_env_string(env, "LOG_FORMAT") {
        config.logging.format = format
            .parse::<LogFormat>()
            .context("Invalid OPENSTAX_DEPLOY_LOG_FORMAT value")?;
    }

    // Stacks
    if let Some(secs) = get_env_u64(env, "POLL_INTERVAL_SECS")? {
        config.stacks.poll_interval_secs = secs;
    }

    Ok(())
}

fn get_env_string<E: EnvSource>(env: &E, key: &str) -> Option<String> {
    env.get(key).filter(|val| !val.is_empty())
}

fn get_env_u64<E: EnvSource>(env: &E, key: &str) -> Result<Option<u64>> {
    match get_env_string(env, key) {
        Some(val) => {
            let parsed = val
                .parse::<u64>()
                .map_err(|e| anyhow!("Failed to parse {}{}: {}", ENV_PREFIX, key, e))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}
