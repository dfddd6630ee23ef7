//! Stack parameter resolution
//!
//! Each template parameter gets its value from, in order: the explicit
//! params passed to the operation, the stack's previous value (updates
//! only), the deployment's `parameter_default`, and finally the template's
//! own `Default`. A parameter with none of these is an error.

use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::{AwsError, Result};

/// Explicit parameters passed to a stack operation
pub type StackParams = BTreeMap<String, String>;

/// Supplies fallback values for template parameters by name
pub trait ParameterDefaults: Send + Sync {
    fn parameter_default(&self, parameter_name: &str) -> Option<String>;
}

/// A parameter declared by a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateParameter {
    pub key: String,
    pub has_default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterValue {
    Value(String),
    UsePrevious,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Explicit,
    Previous,
    DeploymentDefault,
}

/// Resolve values for every template parameter.
///
/// `previous_keys` is `None` for creates and holds the keys present on the
/// live stack for updates. Parameters left to their template default are
/// omitted from the result.
pub fn resolve(
    stack_name: &str,
    template_parameters: &[TemplateParameter],
    explicit: &StackParams,
    defaults: &dyn ParameterDefaults,
    previous_keys: Option<&BTreeSet<String>>,
) -> Result<Vec<(String, ParameterValue)>> {
    let declared: BTreeSet<&str> = template_parameters.iter().map(|p| p.key.as_str()).collect();
    if let Some(unknown) = explicit.keys().find(|key| !declared.contains(key.as_str())) {
        return Err(AwsError::unknown_parameter(stack_name, unknown));
    }

    let mut resolved = Vec::with_capacity(template_parameters.len());
    for parameter in template_parameters {
        let key = parameter.key.as_str();

        let (value, source) = if let Some(value) = explicit.get(key) {
            (ParameterValue::Value(value.clone()), Source::Explicit)
        } else if previous_keys.is_some_and(|keys| keys.contains(key)) {
            (ParameterValue::UsePrevious, Source::Previous)
        } else if let Some(value) = defaults.parameter_default(key) {
            (ParameterValue::Value(value), Source::DeploymentDefault)
        } else if parameter.has_default {
            debug!(stack = stack_name, parameter = key, "using template default");
            continue;
        } else {
            return Err(AwsError::missing_parameter(stack_name, key));
        };

        debug!(stack = stack_name, parameter = key, source = ?source, "resolved parameter");
        resolved.push((key.to_string(), value));
    }

    Ok(resolved)
}
