//! Descriptor behavior against a recording stack and in-memory S3

use async_trait::async_trait;
use opendal::Operator;
use openstax_aws::{
    AwsError, ChangeSetOutcome, ObjectStoreFactory, ParameterDefaults, S3TextFile,
    StackOperations, StackParams,
};
use openstax_deploy::deploy::customized_pages::{ROBOTS_KEY, ROBOTS_TXT};
use openstax_deploy::{CustomizedPages, Deployment, DeploymentOptions, HostedEdited};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Create {
        params: StackParams,
        hosted_zone: Option<String>,
        bucket: Option<String>,
        wait: bool,
    },
    ApplyChangeSet {
        params: StackParams,
    },
    Delete {
        wait: bool,
    },
}

#[derive(Default)]
struct RecordingStack {
    calls: Mutex<Vec<Call>>,
    fail_create: bool,
}

impl RecordingStack {
    fn failing() -> Self {
        Self {
            fail_create: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StackOperations for RecordingStack {
    async fn create(
        &self,
        params: &StackParams,
        defaults: &dyn ParameterDefaults,
        wait: bool,
    ) -> openstax_aws::Result<()> {
        self.calls.lock().unwrap().push(Call::Create {
            params: params.clone(),
            hosted_zone: defaults.parameter_default("HostedZoneName"),
            bucket: defaults.parameter_default("BucketName"),
            wait,
        });
        if self.fail_create {
            return Err(AwsError::stack_failed(
                "recording",
                "ROLLBACK_COMPLETE",
                Some("Bucket already exists"),
            ));
        }
        Ok(())
    }

    async fn apply_change_set(
        &self,
        params: &StackParams,
        _defaults: &dyn ParameterDefaults,
    ) -> openstax_aws::Result<ChangeSetOutcome> {
        self.calls.lock().unwrap().push(Call::ApplyChangeSet {
            params: params.clone(),
        });
        Ok(ChangeSetOutcome::Executed)
    }

    async fn delete(&self, wait: bool) -> openstax_aws::Result<()> {
        self.calls.lock().unwrap().push(Call::Delete { wait });
        Ok(())
    }
}

/// One in-memory bucket per name; remembers every bucket it was asked for
#[derive(Default)]
struct MemoryStores {
    buckets: Mutex<HashMap<String, Operator>>,
}

impl MemoryStores {
    fn requested(&self) -> usize {
        self.buckets.lock().unwrap().len()
    }
}

impl ObjectStoreFactory for MemoryStores {
    fn operator(&self, bucket: &str, _region: &str) -> openstax_aws::Result<Operator> {
        let mut buckets = self.buckets.lock().unwrap();
        if let Some(operator) = buckets.get(bucket) {
            return Ok(operator.clone());
        }
        let operator = Operator::new(opendal::services::Memory::default())?.finish();
        buckets.insert(bucket.to_string(), operator.clone());
        Ok(operator)
    }
}

fn customized_pages(
    options: DeploymentOptions,
) -> (CustomizedPages<RecordingStack>, Arc<MemoryStores>) {
    let stores = Arc::new(MemoryStores::default());
    let deployment = CustomizedPages::with_stack(options, RecordingStack::default(), stores.clone());
    (deployment, stores)
}

#[tokio::test]
async fn customized_pages_create_writes_robots_txt() {
    let (deployment, stores) =
        customized_pages(DeploymentOptions::new("qa", "us-east-1").dry_run(false));

    deployment.create().await.unwrap();

    assert_eq!(
        deployment.main_stack().calls(),
        vec![Call::Create {
            params: StackParams::from([(
                "domain".to_string(),
                "customized-qa.sandbox.openstax.org".to_string()
            )]),
            hosted_zone: Some("sandbox.openstax.org".to_string()),
            bucket: Some("qa-sandbox-customized-pages".to_string()),
            wait: true,
        }]
    );

    let robots = S3TextFile::new("qa-sandbox-customized-pages", "us-east-1", ROBOTS_KEY);
    assert_eq!(robots.read(stores.as_ref()).await.unwrap(), "User-agent: *\nDisallow: /");
    assert_eq!(ROBOTS_TXT, "User-agent: *\nDisallow: /");
}

#[tokio::test]
async fn customized_pages_dry_run_create_skips_robots_txt() {
    let (deployment, stores) = customized_pages(DeploymentOptions::new("qa", "us-east-1"));

    deployment.create().await.unwrap();

    assert_eq!(deployment.main_stack().calls().len(), 1);
    assert_eq!(stores.requested(), 0);
}

#[tokio::test]
async fn customized_pages_failed_create_skips_robots_txt() {
    let stores = Arc::new(MemoryStores::default());
    let deployment = CustomizedPages::with_stack(
        DeploymentOptions::new("qa", "us-east-1").dry_run(false),
        RecordingStack::failing(),
        stores.clone(),
    );

    let err = deployment.create().await.unwrap_err();

    assert!(matches!(err, AwsError::StackFailed { .. }));
    assert_eq!(stores.requested(), 0);
}

#[tokio::test]
async fn customized_pages_production_names() {
    let (deployment, stores) = customized_pages(
        DeploymentOptions::new("production", "us-east-1")
            .in_aws_sandbox(false)
            .dry_run(false),
    );

    assert_eq!(deployment.domain(), "customized.openstax.org");
    assert_eq!(deployment.bucket_name(), "production-customized-pages");
    assert_eq!(
        deployment.base().stack_name("main"),
        "production-customized-pages-main"
    );

    deployment.create().await.unwrap();
    let robots = S3TextFile::new("production-customized-pages", "us-east-1", ROBOTS_KEY);
    assert!(robots.read(stores.as_ref()).await.is_ok());
}

#[tokio::test]
async fn customized_pages_update_and_delete_pass_through() {
    let (deployment, _stores) =
        customized_pages(DeploymentOptions::new("staging", "us-west-2").dry_run(false));

    deployment.update().await.unwrap();
    deployment.delete().await.unwrap();

    assert_eq!(
        deployment.main_stack().calls(),
        vec![
            Call::ApplyChangeSet {
                params: StackParams::new()
            },
            Call::Delete { wait: true },
        ]
    );
}

#[test]
fn customized_pages_parameter_defaults() {
    let (sandbox, _) = customized_pages(DeploymentOptions::new("dev", "us-east-1"));
    assert_eq!(
        sandbox.parameter_default("HostedZoneName").as_deref(),
        Some("sandbox.openstax.org")
    );
    assert_eq!(
        sandbox.parameter_default("BucketName").as_deref(),
        Some("dev-sandbox-customized-pages")
    );
    assert_eq!(sandbox.parameter_default("PriceClass"), None);

    let (production, _) =
        customized_pages(DeploymentOptions::new("dev", "us-east-1").in_aws_sandbox(false));
    assert_eq!(
        production.parameter_default("HostedZoneName").as_deref(),
        Some("openstax.org")
    );
    assert_eq!(
        production.parameter_default("BucketName").as_deref(),
        Some("dev-customized-pages")
    );
}

#[test]
fn hosted_edited_parameter_defaults() {
    let sandbox = HostedEdited::with_stack(
        DeploymentOptions::new("qa", "us-east-1"),
        RecordingStack::default(),
    );
    assert_eq!(
        sandbox.parameter_default("HostedZoneName").as_deref(),
        Some("sandbox.openstax.org")
    );
    assert_eq!(sandbox.parameter_default("BucketName"), None);
    assert_eq!(sandbox.domain(), "customized-qa.sandbox.openstax.org");

    let production = HostedEdited::with_stack(
        DeploymentOptions::new("production", "us-east-1").in_aws_sandbox(false),
        RecordingStack::default(),
    );
    assert_eq!(
        production.parameter_default("HostedZoneName").as_deref(),
        Some("openstax.org")
    );
    assert_eq!(production.domain(), "customized.openstax.org");
    assert_eq!(
        production.base().stack_name("hosted_edited"),
        "production-hosted-edited-hosted-edited"
    );
}

#[tokio::test]
async fn hosted_edited_lifecycle_passes_through() {
    let deployment = HostedEdited::with_stack(
        DeploymentOptions::new("qa", "us-east-1").dry_run(false),
        RecordingStack::default(),
    );

    deployment.create().await.unwrap();
    deployment.update().await.unwrap();
    deployment.delete().await.unwrap();

    assert_eq!(
        deployment.hosted_edited_stack().calls(),
        vec![
            Call::Create {
                params: StackParams::from([(
                    "domain".to_string(),
                    "customized-qa.sandbox.openstax.org".to_string()
                )]),
                hosted_zone: Some("sandbox.openstax.org".to_string()),
                bucket: None,
                wait: true,
            },
            Call::ApplyChangeSet {
                params: StackParams::new()
            },
            Call::Delete { wait: true },
        ]
    );
}

#[tokio::test]
async fn run_dispatches_actions() {
    let deployment = HostedEdited::with_stack(
        DeploymentOptions::new("qa", "us-east-1"),
        RecordingStack::default(),
    );

    openstax_deploy::deploy::run(&deployment, openstax_deploy::Action::Delete)
        .await
        .unwrap();

    assert_eq!(
        deployment.hosted_edited_stack().calls(),
        vec![Call::Delete { wait: true }]
    );
}
