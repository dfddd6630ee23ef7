//! CloudFormation stack handle
//!
//! A [`CfnStack`] knows one stack name and one template. Operations upload
//! the template to the configured template bucket, resolve parameters and
//! drive the CloudFormation API, optionally blocking until the stack
//! reaches a terminal status. In dry-run mode every mutating call is
//! replaced by a log line.

use async_trait::async_trait;
use aws_sdk_cloudformation::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_cloudformation::types::{Capability, ChangeSetType, Parameter, Stack};
use aws_sdk_cloudformation::Client;
use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::params::{self, ParameterDefaults, ParameterValue, StackParams, TemplateParameter};
use crate::storage::ObjectStoreFactory;
use crate::template::{template_url, Template};
use crate::{configuration, AwsError, Result};

const CREATE_COMPLETE: &str = "CREATE_COMPLETE";
const UPDATE_COMPLETE: &str = "UPDATE_COMPLETE";
const DELETE_COMPLETE: &str = "DELETE_COMPLETE";

/// Lifecycle operations a deployment performs on one of its stacks
#[async_trait]
pub trait StackOperations: Send + Sync {
    async fn create(
        &self,
        params: &StackParams,
        defaults: &dyn ParameterDefaults,
        wait: bool,
    ) -> Result<()>;

    /// Create, execute and wait on a change set against the live stack
    async fn apply_change_set(
        &self,
        params: &StackParams,
        defaults: &dyn ParameterDefaults,
    ) -> Result<ChangeSetOutcome>;

    async fn delete(&self, wait: bool) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSetOutcome {
    Executed,
    NoChanges,
    DryRun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackPhase {
    InProgress,
    Succeeded,
    Failed,
}

/// Where a stack status sits relative to the status being waited for
pub fn classify_status(status: &str, expected: &str) -> StackPhase {
    if status == expected {
        StackPhase::Succeeded
    } else if status.ends_with("_IN_PROGRESS") {
        StackPhase::InProgress
    } else {
        StackPhase::Failed
    }
}

/// Where a change set status sits while waiting for it to become executable
pub fn classify_change_set_status(status: &str) -> StackPhase {
    match status {
        "CREATE_COMPLETE" => StackPhase::Succeeded,
        "CREATE_PENDING" | "CREATE_IN_PROGRESS" => StackPhase::InProgress,
        _ => StackPhase::Failed,
    }
}

/// CloudFormation fails change sets that would do nothing; that is not an error here
pub fn is_empty_change_set(status_reason: &str) -> bool {
    status_reason.contains("didn't contain changes")
        || status_reason.contains("No updates are to be performed")
}

fn is_missing_stack(message: &str) -> bool {
    message.contains("does not exist")
}

/// Identity and behavior of one stack
#[derive(Debug, Clone)]
pub struct StackSpec {
    /// Stack id within the deployment (`main`, `hosted_edited`)
    pub id: String,
    /// CloudFormation stack name
    pub name: String,
    pub deployment_name: String,
    pub template: Template,
    pub dry_run: bool,
}

pub struct CfnStack {
    spec: StackSpec,
    client: Client,
    stores: Arc<dyn ObjectStoreFactory>,
}

impl CfnStack {
    pub fn new(spec: StackSpec, client: Client, stores: Arc<dyn ObjectStoreFactory>) -> Self {
        Self {
            spec,
            client,
            stores,
        }
    }

    async fn template_parameters(&self) -> Result<Vec<TemplateParameter>> {
        let output = self
            .client
            .validate_template()
            .template_body(self.spec.template.body())
            .send()
            .await
            .map_err(|e| self.api_error("ValidateTemplate", &e))?;

        Ok(output
            .parameters()
            .iter()
            .filter_map(|p| {
                p.parameter_key().map(|key| TemplateParameter {
                    key: key.to_string(),
                    has_default: p.default_value().is_some(),
                })
            })
            .collect())
    }

    async fn upload_template(&self) -> Result<String> {
        let config = configuration();
        let (bucket, region) = config.template_bucket()?;
        let key = self
            .spec
            .template
            .object_key(&self.spec.deployment_name, &self.spec.id);

        let operator = self.stores.operator(bucket, region)?;
        operator
            .write(&key, self.spec.template.body().to_owned())
            .await
            .map_err(|e| {
                AwsError::storage(format!(
                    "Failed to upload template {} to s3://{}/{}: {}",
                    self.spec.template.file_name(),
                    bucket,
                    key,
                    e
                ))
            })?;

        debug!("Uploaded template to s3://{}/{}", bucket, key);
        Ok(template_url(bucket, region, &key))
    }

    async fn describe(&self, stack_ref: &str) -> Result<Option<Stack>> {
        match self
            .client
            .describe_stacks()
            .stack_name(stack_ref)
            .send()
            .await
        {
            Ok(output) => Ok(output.stacks().first().cloned()),
            Err(err) => {
                let missing = err
                    .as_service_error()
                    .and_then(|e| e.message())
                    .is_some_and(is_missing_stack);
                if missing {
                    Ok(None)
                } else {
                    Err(self.api_error("DescribeStacks", &err))
                }
            }
        }
    }

    async fn wait_for_status(&self, stack_ref: &str, expected: &str) -> Result<()> {
        let poll_interval = configuration().stack_poll_interval;
        let mut last_status = String::new();

        loop {
            let Some(stack) = self.describe(stack_ref).await? else {
                if expected == DELETE_COMPLETE {
                    return Ok(());
                }
                return Err(AwsError::stack_operation(
                    &self.spec.name,
                    "DescribeStacks",
                    "stack disappeared while waiting",
                ));
            };

            let status = stack
                .stack_status()
                .map(|s| s.as_str().to_string())
                .unwrap_or_else(|| "UNKNOWN".to_string());

            if status != last_status {
                info!("Stack {} is {}", self.spec.name, status);
                last_status.clone_from(&status);
            }

            match classify_status(&status, expected) {
                StackPhase::Succeeded => return Ok(()),
                StackPhase::Failed => {
                    return Err(AwsError::stack_failed(
                        &self.spec.name,
                        &status,
                        stack.stack_status_reason(),
                    ))
                }
                StackPhase::InProgress => tokio::time::sleep(poll_interval).await,
            }
        }
    }

    /// Returns `Ok(true)` once the change set is ready to execute and
    /// `Ok(false)` when CloudFormation found nothing to change.
    async fn wait_for_change_set(&self, change_set_id: &str) -> Result<bool> {
        let poll_interval = configuration().stack_poll_interval;

        loop {
            let output = self
                .client
                .describe_change_set()
                .change_set_name(change_set_id)
                .stack_name(&self.spec.name)
                .send()
                .await
                .map_err(|e| self.api_error("DescribeChangeSet", &e))?;

            let status = output.status().map(|s| s.as_str()).unwrap_or("UNKNOWN");
            match classify_change_set_status(status) {
                StackPhase::Succeeded => {
                    for change in output.changes() {
                        if let Some(rc) = change.resource_change() {
                            info!(
                                "  {} {} ({}){}",
                                rc.action().map(|a| a.as_str()).unwrap_or("?"),
                                rc.logical_resource_id().unwrap_or("?"),
                                rc.resource_type().unwrap_or("?"),
                                match rc.replacement().map(|r| r.as_str()) {
                                    Some("True") => " [replacement]",
                                    Some("Conditional") => " [conditional replacement]",
                                    _ => "",
                                }
                            );
                        }
                    }
                    return Ok(true);
                }
                StackPhase::Failed => {
                    let reason = output.status_reason();
                    if status == "FAILED" && reason.is_some_and(is_empty_change_set) {
                        return Ok(false);
                    }
                    return Err(AwsError::stack_failed(&self.spec.name, status, reason));
                }
                StackPhase::InProgress => tokio::time::sleep(poll_interval).await,
            }
        }
    }

    fn api_error<E>(&self, operation: &'static str, err: &E) -> AwsError
    where
        E: std::error::Error,
    {
        AwsError::stack_operation(
            &self.spec.name,
            operation,
            DisplayErrorContext(err).to_string(),
        )
    }
}

fn to_sdk_parameters(resolved: &[(String, ParameterValue)]) -> Vec<Parameter> {
    resolved
        .iter()
        .map(|(key, value)| {
            let builder = Parameter::builder().parameter_key(key);
            match value {
                ParameterValue::Value(v) => builder.parameter_value(v),
                ParameterValue::UsePrevious => builder.use_previous_value(true),
            }
            .build()
        })
        .collect()
}

/// `key=value` pairs for log lines
pub fn describe_parameters(resolved: &[(String, ParameterValue)]) -> String {
    resolved
        .iter()
        .map(|(key, value)| match value {
            ParameterValue::Value(v) => format!("{}={}", key, v),
            ParameterValue::UsePrevious => format!("{}=<previous>", key),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl StackOperations for CfnStack {
    async fn create(
        &self,
        params: &StackParams,
        defaults: &dyn ParameterDefaults,
        wait: bool,
    ) -> Result<()> {
        let template_parameters = self.template_parameters().await?;
        let resolved = params::resolve(
            &self.spec.name,
            &template_parameters,
            params,
            defaults,
            None,
        )?;

        if self.spec.dry_run {
            info!(
                "Dry run: would create stack {} with {}",
                self.spec.name,
                describe_parameters(&resolved)
            );
            return Ok(());
        }

        let template_url = self.upload_template().await?;

        info!("Creating stack {}", self.spec.name);
        let output = self
            .client
            .create_stack()
            .stack_name(&self.spec.name)
            .template_url(template_url)
            .set_parameters(Some(to_sdk_parameters(&resolved)))
            .capabilities(Capability::CapabilityIam)
            .capabilities(Capability::CapabilityNamedIam)
            .send()
            .await
            .map_err(|e| self.api_error("CreateStack", &e))?;

        if wait {
            let stack_ref = output.stack_id().unwrap_or(self.spec.name.as_str()).to_string();
            self.wait_for_status(&stack_ref, CREATE_COMPLETE).await?;
            info!("Stack {} created", self.spec.name);
        }

        Ok(())
    }

    async fn apply_change_set(
        &self,
        params: &StackParams,
        defaults: &dyn ParameterDefaults,
    ) -> Result<ChangeSetOutcome> {
        let existing = self.describe(&self.spec.name).await?.ok_or_else(|| {
            AwsError::stack_operation(
                &self.spec.name,
                "CreateChangeSet",
                "stack does not exist; create it first",
            )
        })?;
        let previous_keys: BTreeSet<String> = existing
            .parameters()
            .iter()
            .filter_map(|p| p.parameter_key().map(str::to_string))
            .collect();

        let template_parameters = self.template_parameters().await?;
        let resolved = params::resolve(
            &self.spec.name,
            &template_parameters,
            params,
            defaults,
            Some(&previous_keys),
        )?;

        if self.spec.dry_run {
            info!(
                "Dry run: would apply a change set to stack {} with {}",
                self.spec.name,
                describe_parameters(&resolved)
            );
            return Ok(ChangeSetOutcome::DryRun);
        }

        let template_url = self.upload_template().await?;
        let change_set_name = format!(
            "{}-{}",
            self.spec.name,
            Utc::now().format("%Y%m%d%H%M%S")
        );

        info!("Creating change set {}", change_set_name);
        let output = self
            .client
            .create_change_set()
            .stack_name(&self.spec.name)
            .change_set_name(&change_set_name)
            .change_set_type(ChangeSetType::Update)
            .template_url(template_url)
            .set_parameters(Some(to_sdk_parameters(&resolved)))
            .capabilities(Capability::CapabilityIam)
            .capabilities(Capability::CapabilityNamedIam)
            .send()
            .await
            .map_err(|e| self.api_error("CreateChangeSet", &e))?;
        let change_set_id = output.id().unwrap_or(change_set_name.as_str()).to_string();

        if !self.wait_for_change_set(&change_set_id).await? {
            info!("No changes to apply to stack {}", self.spec.name);
            if let Err(e) = self
                .client
                .delete_change_set()
                .change_set_name(&change_set_id)
                .stack_name(&self.spec.name)
                .send()
                .await
            {
                warn!(
                    "Could not delete empty change set {}: {}",
                    change_set_name,
                    DisplayErrorContext(&e)
                );
            }
            return Ok(ChangeSetOutcome::NoChanges);
        }

        info!("Executing change set {}", change_set_name);
        self.client
            .execute_change_set()
            .change_set_name(&change_set_id)
            .stack_name(&self.spec.name)
            .send()
            .await
            .map_err(|e| self.api_error("ExecuteChangeSet", &e))?;

        let stack_ref = existing
            .stack_id()
            .unwrap_or(self.spec.name.as_str())
            .to_string();
        self.wait_for_status(&stack_ref, UPDATE_COMPLETE).await?;
        info!("Stack {} updated", self.spec.name);

        Ok(ChangeSetOutcome::Executed)
    }

    async fn delete(&self, wait: bool) -> Result<()> {
        let Some(existing) = self.describe(&self.spec.name).await? else {
            info!("Stack {} does not exist; nothing to delete", self.spec.name);
            return Ok(());
        };

        if self.spec.dry_run {
            info!("Dry run: would delete stack {}", self.spec.name);
            return Ok(());
        }

        info!("Deleting stack {}", self.spec.name);
        self.client
            .delete_stack()
            .stack_name(&self.spec.name)
            .send()
            .await
            .map_err(|e| self.api_error("DeleteStack", &e))?;

        if wait {
            // Deleted stacks are only visible by id
            let stack_ref = existing
                .stack_id()
                .unwrap_or(self.spec.name.as_str())
                .to_string();
            self.wait_for_status(&stack_ref, DELETE_COMPLETE).await?;
            info!("Stack {} deleted", self.spec.name);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_create() {
        assert_eq!(
            classify_status("CREATE_IN_PROGRESS", CREATE_COMPLETE),
            StackPhase::InProgress
        );
        assert_eq!(
            classify_status("CREATE_COMPLETE", CREATE_COMPLETE),
            StackPhase::Succeeded
        );
        assert_eq!(
            classify_status("ROLLBACK_IN_PROGRESS", CREATE_COMPLETE),
            StackPhase::InProgress
        );
        assert_eq!(
            classify_status("ROLLBACK_COMPLETE", CREATE_COMPLETE),
            StackPhase::Failed
        );
        assert_eq!(
            classify_status("CREATE_FAILED", CREATE_COMPLETE),
            StackPhase::Failed
        );
    }

    #[test]
    fn test_classify_update_cleanup_keeps_waiting() {
        assert_eq!(
            classify_status("UPDATE_COMPLETE_CLEANUP_IN_PROGRESS", UPDATE_COMPLETE),
            StackPhase::InProgress
        );
        assert_eq!(
            classify_status("UPDATE_ROLLBACK_COMPLETE", UPDATE_COMPLETE),
            StackPhase::Failed
        );
    }

    #[test]
    fn test_classify_delete() {
        assert_eq!(
            classify_status("DELETE_FAILED", DELETE_COMPLETE),
            StackPhase::Failed
        );
        assert_eq!(
            classify_status("DELETE_COMPLETE", DELETE_COMPLETE),
            StackPhase::Succeeded
        );
    }

    #[test]
    fn test_classify_change_set() {
        assert_eq!(
            classify_change_set_status("CREATE_PENDING"),
            StackPhase::InProgress
        );
        assert_eq!(
            classify_change_set_status("CREATE_IN_PROGRESS"),
            StackPhase::InProgress
        );
        assert_eq!(
            classify_change_set_status("CREATE_COMPLETE"),
            StackPhase::Succeeded
        );
        for terminal in ["FAILED", "DELETE_COMPLETE", "DELETE_FAILED", "DELETE_PENDING", "UNKNOWN"] {
            assert_eq!(
                classify_change_set_status(terminal),
                StackPhase::Failed,
                "{}",
                terminal
            );
        }
    }

    #[test]
    fn test_empty_change_set_reasons() {
        assert!(is_empty_change_set(
            "The submitted information didn't contain changes. Submit different information to create a change set."
        ));
        assert!(is_empty_change_set("No updates are to be performed."));
        assert!(!is_empty_change_set("Template format error: unsupported structure."));
    }

    #[test]
    fn test_missing_stack_message() {
        assert!(is_missing_stack("Stack with id qa-customized-pages-main does not exist"));
        assert!(!is_missing_stack("Rate exceeded"));
    }

    #[test]
    fn test_sdk_parameters() {
        let resolved = vec![
            ("domain".to_string(), ParameterValue::Value("customized.openstax.org".to_string())),
            ("BucketName".to_string(), ParameterValue::UsePrevious),
        ];
        let sdk = to_sdk_parameters(&resolved);

        assert_eq!(sdk[0].parameter_key(), Some("domain"));
        assert_eq!(sdk[0].parameter_value(), Some("customized.openstax.org"));
        assert_eq!(sdk[1].use_previous_value(), Some(true));
        assert_eq!(sdk[1].parameter_value(), None);

        assert_eq!(
            describe_parameters(&resolved),
            "domain=customized.openstax.org, BucketName=<previous>"
        );
    }
}
