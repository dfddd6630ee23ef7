// openstax-deploy-config - Runtime configuration for the deployment tooling
//
// Supports configuration from multiple sources:
// 1. Environment variables (highest priority)
// 2. Config file path from OPENSTAX_DEPLOY_CONFIG env var
// 3. Config file contents from OPENSTAX_DEPLOY_CONFIG_CONTENT env var
// 4. Default config file location (./openstax-deploy.toml)
// 5. Built-in defaults (lowest priority)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

mod account;
pub mod env_overrides;
mod sources;
mod validation;

pub use account::AwsAccount;
pub use env_overrides::{EnvSource, ENV_PREFIX};

/// Main deployment configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub aws: AwsConfig,
    pub logging: LoggingConfig,
    pub stacks: StackConfig,
}

/// AWS account settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    /// Region used when `--region` is not given on the command line
    pub default_region: String,
    pub production: TemplateBucketConfig,
    pub sandbox: TemplateBucketConfig,
    /// S3-compatible endpoint for template and site buckets (localstack, minio)
    pub s3_endpoint: Option<String>,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            default_region: "us-east-1".to_string(),
            production: TemplateBucketConfig {
                bucket: "openstax-cfn-templates".to_string(),
                region: "us-east-1".to_string(),
            },
            sandbox: TemplateBucketConfig {
                bucket: "openstax-sandbox-cfn-templates".to_string(),
                region: "us-west-2".to_string(),
            },
            s3_endpoint: None,
        }
    }
}

/// Bucket holding uploaded CloudFormation templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateBucketConfig {
    pub bucket: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Openstax,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// `[2024-01-01 12:00:00.000] INFO  | message`
    Openstax,
    Text,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Openstax => write!(f, "openstax"),
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openstax" | "default" => Ok(LogFormat::Openstax),
            "text" | "plain" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Unsupported log format: {}. Supported: openstax, text, json", s),
        }
    }
}

/// Stack operation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    pub poll_interval_secs: u64,
}

impl StackConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 10,
        }
    }
}

impl DeployConfig {
    /// Load configuration from all sources with priority
    pub fn load() -> Result<Self> {
        sources::load_config()
    }

    /// Load configuration from an explicit file (for the CLI --config flag)
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        sources::load_from_file_path(path)
    }

    /// Load configuration using a caller-supplied environment (useful for testing)
    pub fn load_with_env<E: EnvSource>(env: &E) -> Result<Self> {
        sources::load_with_env(env)
    }

    /// Template bucket for the given account
    pub fn template_bucket(&self, account: AwsAccount) -> &TemplateBucketConfig {
        account.template_bucket(&self.aws)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}
