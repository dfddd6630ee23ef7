//! S3 access through OpenDAL operators
//!
//! Every bucket touched by a deployment (template bucket, site buckets) is
//! reached through an [`ObjectStoreFactory`], so tests can swap S3 for the
//! in-memory service.

use opendal::Operator;
use tracing::{debug, info};

use crate::{AwsError, Result};

/// Builds an operator rooted at a bucket
pub trait ObjectStoreFactory: Send + Sync {
    fn operator(&self, bucket: &str, region: &str) -> Result<Operator>;
}

/// Real S3 buckets, credentials taken from the standard AWS environment
#[derive(Debug, Clone, Default)]
pub struct S3ObjectStores {
    endpoint: Option<String>,
}

impl S3ObjectStores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point at an S3-compatible endpoint (localstack, minio)
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
        }
    }
}

impl ObjectStoreFactory for S3ObjectStores {
    fn operator(&self, bucket: &str, region: &str) -> Result<Operator> {
        let mut s3_builder = opendal::services::S3::default()
            .bucket(bucket)
            .region(region);

        if let Some(endpoint) = &self.endpoint {
            s3_builder = s3_builder.endpoint(endpoint);
        }

        let operator = Operator::new(s3_builder)
            .map_err(|e| {
                AwsError::storage(format!(
                    "Failed to create S3 operator for bucket {}: {}",
                    bucket, e
                ))
            })?
            .finish();

        debug!(bucket, region, "S3 operator initialized");
        Ok(operator)
    }
}

/// A text object at a fixed bucket/key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3TextFile {
    pub bucket_name: String,
    pub bucket_region: String,
    pub key: String,
}

impl S3TextFile {
    pub fn new(
        bucket_name: impl Into<String>,
        bucket_region: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            bucket_region: bucket_region.into(),
            key: key.into(),
        }
    }

    pub async fn write(&self, stores: &dyn ObjectStoreFactory, string_contents: &str) -> Result<()> {
        let operator = stores.operator(&self.bucket_name, &self.bucket_region)?;
        operator
            .write(&self.key, string_contents.to_owned())
            .await
            .map_err(|e| {
                AwsError::storage(format!(
                    "Failed to write s3://{}/{}: {}",
                    self.bucket_name, self.key, e
                ))
            })?;

        info!(
            "Wrote {} bytes to s3://{}/{}",
            string_contents.len(),
            self.bucket_name,
            self.key
        );
        Ok(())
    }

    pub async fn read(&self, stores: &dyn ObjectStoreFactory) -> Result<String> {
        let operator = stores.operator(&self.bucket_name, &self.bucket_region)?;
        let buffer = operator.read(&self.key).await?;
        String::from_utf8(buffer.to_vec()).map_err(|e| {
            AwsError::storage(format!(
                "s3://{}/{} is not valid UTF-8: {}",
                self.bucket_name, self.key, e
            ))
        })
    }
}

/// Confirm the current credentials can list `bucket`
pub async fn verify_bucket_access(
    stores: &dyn ObjectStoreFactory,
    bucket: &str,
    region: &str,
) -> Result<()> {
    let operator = stores
        .operator(bucket, region)
        .map_err(|e| AwsError::template_bucket_access(bucket, region, e.to_string()))?;

    operator
        .check()
        .await
        .map_err(|e| AwsError::template_bucket_access(bucket, region, e.to_string()))?;

    debug!(bucket, region, "Bucket access verified");
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// One in-memory operator per bucket
    #[derive(Default)]
    pub(crate) struct MemoryStores {
        buckets: Mutex<HashMap<String, Operator>>,
    }

    impl ObjectStoreFactory for MemoryStores {
        fn operator(&self, bucket: &str, _region: &str) -> Result<Operator> {
            let mut buckets = self.buckets.lock().unwrap();
            if let Some(operator) = buckets.get(bucket) {
                return Ok(operator.clone());
            }
            let operator = Operator::new(opendal::services::Memory::default())?.finish();
            buckets.insert(bucket.to_string(), operator.clone());
            Ok(operator)
        }
    }

    #[test]
    fn test_endpoint_operator_targets_bucket() {
        let stores = S3ObjectStores::with_endpoint("http://localhost:4566");
        let operator = stores
            .operator("qa-sandbox-customized-pages", "us-east-1")
            .unwrap();
        assert_eq!(operator.info().name(), "qa-sandbox-customized-pages");
    }

    #[tokio::test]
    async fn test_text_file_write_then_read() {
        let stores = MemoryStores::default();
        let file = S3TextFile::new("qa-customized-pages", "us-east-1", "robots/robots.txt");

        file.write(&stores, "User-agent: *\nDisallow: /").await.unwrap();

        assert_eq!(
            file.read(&stores).await.unwrap(),
            "User-agent: *\nDisallow: /"
        );
    }

    #[tokio::test]
    async fn test_read_missing_object_is_storage_error() {
        let stores = MemoryStores::default();
        let file = S3TextFile::new("qa-customized-pages", "us-east-1", "missing.txt");
        let err = file.read(&stores).await.unwrap_err();
        assert_eq!(err.code(), "E107");
    }

    #[tokio::test]
    async fn test_verify_bucket_access_on_reachable_bucket() {
        let stores = MemoryStores::default();
        verify_bucket_access(&stores, "openstax-sandbox-cfn-templates", "us-west-2")
            .await
            .unwrap();
    }
}
