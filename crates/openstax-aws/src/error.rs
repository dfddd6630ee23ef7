//! Error types for the OpenStax AWS crate

use thiserror::Error;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E101: AWS credentials missing or empty
    E101SecretsNotPopulated,
    /// E102: Template bucket unreachable or forbidden
    E102TemplateBucketAccess,
    /// E103: Configuration missing or invalid
    E103InvalidConfig,
    /// E104: CloudFormation API call failed
    E104StackOperation,
    /// E105: Stack reached a failed terminal status
    E105StackFailed,
    /// E106: Template parameter could not be resolved
    E106Parameter,
    /// E107: Object storage read or write failed
    E107Storage,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E101SecretsNotPopulated => "E101",
            Self::E102TemplateBucketAccess => "E102",
            Self::E103InvalidConfig => "E103",
            Self::E104StackOperation => "E104",
            Self::E105StackFailed => "E105",
            Self::E106Parameter => "E106",
            Self::E107Storage => "E107",
        }
    }
}

/// Errors raised by stack, storage and environment operations
#[derive(Debug, Error)]
pub enum AwsError {
    /// Credentials could not be resolved or are blank
    #[error("[{code}] AWS secrets are not populated: {reason}\n\nTroubleshooting:\n  • Export AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY, or\n  • Set AWS_PROFILE to a profile in ~/.aws/credentials")]
    SecretsNotPopulated { code: &'static str, reason: String },

    /// The template bucket cannot be listed with the current credentials
    #[error("[{code}] Cannot access template bucket '{bucket}' in {region}: {reason}\n\nTroubleshooting:\n  • Check that --production_aws matches the account of your credentials\n  • Verify s3:ListBucket on the bucket")]
    TemplateBucketAccess {
        code: &'static str,
        bucket: String,
        region: String,
        reason: String,
    },

    #[error("[{code}] Invalid configuration: {message}")]
    InvalidConfig { code: &'static str, message: String },

    /// A CloudFormation API call returned an error
    #[error("[{code}] {operation} failed for stack '{stack}': {reason}")]
    StackOperation {
        code: &'static str,
        stack: String,
        operation: &'static str,
        reason: String,
    },

    /// A stack ended in a status other than the one waited for
    #[error("[{code}] Stack '{stack}' ended in {status}: {reason}")]
    StackFailed {
        code: &'static str,
        stack: String,
        status: String,
        reason: String,
    },

    #[error("[{code}] Stack '{stack}' requires parameter '{parameter}' but no value or default is available")]
    MissingParameter {
        code: &'static str,
        stack: String,
        parameter: String,
    },

    #[error("[{code}] Stack '{stack}' template does not declare parameter '{parameter}'")]
    UnknownParameter {
        code: &'static str,
        stack: String,
        parameter: String,
    },

    #[error("[{code}] Storage operation failed: {message}")]
    Storage { code: &'static str, message: String },
}

impl AwsError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::SecretsNotPopulated { code, .. }
            | Self::TemplateBucketAccess { code, .. }
            | Self::InvalidConfig { code, .. }
            | Self::StackOperation { code, .. }
            | Self::StackFailed { code, .. }
            | Self::MissingParameter { code, .. }
            | Self::UnknownParameter { code, .. }
            | Self::Storage { code, .. } => *code,
        }
    }

    pub fn secrets_not_populated(reason: impl Into<String>) -> Self {
        Self::SecretsNotPopulated {
            code: ErrorCode::E101SecretsNotPopulated.as_str(),
            reason: reason.into(),
        }
    }

    pub fn template_bucket_access(bucket: &str, region: &str, reason: impl Into<String>) -> Self {
        Self::TemplateBucketAccess {
            code: ErrorCode::E102TemplateBucketAccess.as_str(),
            bucket: bucket.to_string(),
            region: region.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            code: ErrorCode::E103InvalidConfig.as_str(),
            message: message.into(),
        }
    }

    pub fn stack_operation(stack: &str, operation: &'static str, reason: impl Into<String>) -> Self {
        Self::StackOperation {
            code: ErrorCode::E104StackOperation.as_str(),
            stack: stack.to_string(),
            operation,
            reason: reason.into(),
        }
    }

    pub fn stack_failed(stack: &str, status: &str, reason: Option<&str>) -> Self {
        Self::StackFailed {
            code: ErrorCode::E105StackFailed.as_str(),
            stack: stack.to_string(),
            status: status.to_string(),
            reason: reason.unwrap_or("no status reason reported").to_string(),
        }
    }

    pub fn missing_parameter(stack: &str, parameter: &str) -> Self {
        Self::MissingParameter {
            code: ErrorCode::E106Parameter.as_str(),
            stack: stack.to_string(),
            parameter: parameter.to_string(),
        }
    }

    pub fn unknown_parameter(stack: &str, parameter: &str) -> Self {
        Self::UnknownParameter {
            code: ErrorCode::E106Parameter.as_str(),
            stack: stack.to_string(),
            parameter: parameter.to_string(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            code: ErrorCode::E107Storage.as_str(),
            message: message.into(),
        }
    }
}

impl From<opendal::Error> for AwsError {
    fn from(err: opendal::Error) -> Self {
        Self::storage(err.to_string())
    }
}

/// Result type alias for AwsError
pub type Result<T> = std::result::Result<T, AwsError>;
