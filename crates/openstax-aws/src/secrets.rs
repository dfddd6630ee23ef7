//! Startup preconditions: credentials and template bucket access

use aws_config::SdkConfig;
use aws_credential_types::provider::ProvideCredentials;
use aws_credential_types::Credentials;
use tracing::debug;

use crate::storage::{self, ObjectStoreFactory};
use crate::{configuration, AwsError, Result};

/// Resolve credentials from the SDK's provider chain and require that both
/// halves of the key pair are present.
pub async fn verify_secrets_populated(sdk_config: &SdkConfig) -> Result<()> {
    let provider = sdk_config
        .credentials_provider()
        .ok_or_else(|| AwsError::secrets_not_populated("no AWS credentials provider configured"))?;

    let credentials = provider
        .provide_credentials()
        .await
        .map_err(|e| AwsError::secrets_not_populated(e.to_string()))?;

    check_credentials(&credentials)?;
    debug!("AWS credentials populated");
    Ok(())
}

pub fn check_credentials(credentials: &Credentials) -> Result<()> {
    if credentials.access_key_id().trim().is_empty() {
        return Err(AwsError::secrets_not_populated("access key id is empty"));
    }
    if credentials.secret_access_key().trim().is_empty() {
        return Err(AwsError::secrets_not_populated("secret access key is empty"));
    }
    Ok(())
}

/// The configured template bucket must be listable.
pub async fn verify_template_bucket_access(stores: &dyn ObjectStoreFactory) -> Result<()> {
    let config = configuration();
    let (bucket, region) = config.template_bucket()?;
    storage::verify_bucket_access(stores, bucket, region).await
}
