//! Process-wide settings shared by every stack and storage handle
//!
//! Written once at startup through [`configure`], read afterwards through
//! [`configuration`].

use once_cell::sync::Lazy;
use openstax_deploy_config::LoggingConfig;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use crate::{AwsError, Result};

static CONFIGURATION: Lazy<RwLock<Configuration>> =
    Lazy::new(|| RwLock::new(Configuration::default()));

#[derive(Debug, Clone)]
pub struct Configuration {
    /// Bucket that CloudFormation templates are uploaded to before use
    pub cfn_template_bucket_name: String,
    pub cfn_template_bucket_region: String,
    pub logger: LoggingConfig,
    /// Delay between status checks while waiting on a stack
    pub stack_poll_interval: Duration,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            cfn_template_bucket_name: String::new(),
            cfn_template_bucket_region: String::new(),
            logger: LoggingConfig::default(),
            stack_poll_interval: Duration::from_secs(10),
        }
    }
}

impl Configuration {
    /// Template bucket name and region, or an error if `configure` never set them
    pub fn template_bucket(&self) -> Result<(&str, &str)> {
        if self.cfn_template_bucket_name.is_empty() || self.cfn_template_bucket_region.is_empty() {
            return Err(AwsError::invalid_config(
                "CloudFormation template bucket is not configured",
            ));
        }
        Ok((
            &self.cfn_template_bucket_name,
            &self.cfn_template_bucket_region,
        ))
    }
}

/// Mutate the global configuration.
pub fn configure<F>(f: F)
where
    F: FnOnce(&mut Configuration),
{
    let mut guard = CONFIGURATION
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    f(&mut guard);
}

/// Snapshot of the global configuration
pub fn configuration() -> Configuration {
    CONFIGURATION
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}
