use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigMissingKey,
    ConfigInvalidValue,

    ValidationInvalidArgument,

    ToolNotFound,
    ToolCommandFailed,

    BuildOutputMissing,

    VerifyFailed,

    RemoteRequestFailed,
    StorageRequestFailed,
    CdnRequestFailed,

    InternalIoError,
    InternalJsonError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigMissingKey => "config.missing_key",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",

            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",

            ErrorCode::ToolNotFound => "tool.not_found",
            ErrorCode::ToolCommandFailed => "tool.command_failed",

            ErrorCode::BuildOutputMissing => "build.output_missing",

            ErrorCode::VerifyFailed => "verify.failed",

            ErrorCode::RemoteRequestFailed => "remote.request_failed",
            ErrorCode::StorageRequestFailed => "storage.request_failed",
            ErrorCode::CdnRequestFailed => "cdn.request_failed",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMissingKeyDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidValueDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCommandFailedDetails {
    pub command: String,
    pub exit_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRequestDetails {
    pub operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
        }
    }

    pub fn config_missing_key(key: impl Into<String>, path: Option<String>) -> Self {
        let key = key.into();
        let message = format!("{} missing in .env", key);
        Self::new(
            ErrorCode::ConfigMissingKey,
            message,
            to_details(ConfigMissingKeyDetails { key, path }),
        )
    }

    pub fn config_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        let problem = problem.into();
        Self::new(
            ErrorCode::ConfigInvalidValue,
            problem.clone(),
            to_details(ConfigInvalidValueDetails {
                key: key.into(),
                value,
                problem,
            }),
        )
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
    ) -> Self {
        let problem = problem.into();
        Self::new(
            ErrorCode::ValidationInvalidArgument,
            problem.clone(),
            to_details(InvalidArgumentDetails {
                field: field.into(),
                problem,
            }),
        )
    }

    pub fn tool_not_found(tool: impl Into<String>, error: impl Into<String>) -> Self {
        let tool = tool.into();
        Self::new(
            ErrorCode::ToolNotFound,
            format!("Missing {}. Install it.", tool),
            serde_json::json!({ "tool": tool, "error": error.into() }),
        )
        .with_hint(format!("Install {} and make sure it is on PATH", tool))
    }

    pub fn tool_command_failed(details: ToolCommandFailedDetails) -> Self {
        let message = format!(
            "Command '{}' failed with exit code {}",
            details.command, details.exit_code
        );
        Self::new(ErrorCode::ToolCommandFailed, message, to_details(details))
    }

    pub fn build_output_missing(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(
            ErrorCode::BuildOutputMissing,
            format!("Build OK, but {} not found", path),
            serde_json::json!({ "path": path }),
        )
        .with_hint("Ensure next.config.js has: output: 'export'")
    }

    pub fn verify_failed(failed: Vec<String>) -> Self {
        Self::new(
            ErrorCode::VerifyFailed,
            "Health verification failed",
            serde_json::json!({ "failed": failed }),
        )
        .with_hint("Unset STRICT_VERIFY to continue past unhealthy services")
    }

    pub fn remote_request_failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::RemoteRequestFailed,
            format!("HTTP request failed: {}", error.into()),
            serde_json::json!({ "url": url.into() }),
        )
    }

    pub fn storage_request_failed(
        operation: impl Into<String>,
        status: Option<u16>,
        body: impl Into<String>,
    ) -> Self {
        let operation = operation.into();
        let message = match status {
            Some(code) => format!("S3 {} failed: HTTP {}", operation, code),
            None => format!("S3 {} failed", operation),
        };
        Self::new(
            ErrorCode::StorageRequestFailed,
            message,
            to_details(ProviderRequestDetails {
                operation,
                status,
                body: body.into(),
            }),
        )
    }

    pub fn cdn_request_failed(
        operation: impl Into<String>,
        status: Option<u16>,
        body: impl Into<String>,
    ) -> Self {
        let operation = operation.into();
        let message = match status {
            Some(code) => format!("CloudFront {} failed: HTTP {}", operation, code),
            None => format!("CloudFront {} failed", operation),
        };
        Self::new(
            ErrorCode::CdnRequestFailed,
            message,
            to_details(ProviderRequestDetails {
                operation,
                status,
                body: body.into(),
            }),
        )
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        Self::new(
            ErrorCode::InternalIoError,
            "IO error",
            to_details(InternalIoErrorDetails {
                error: error.into(),
                context,
            }),
        )
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        Self::new(
            ErrorCode::InternalJsonError,
            "JSON error",
            serde_json::json!({ "error": error.into(), "context": context }),
        )
    }

    pub fn internal_unexpected(error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InternalUnexpected,
            "Unexpected error",
            serde_json::json!({ "error": error.into() }),
        )
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }

    /// Exit status reported by a failed external command, if this error carries one.
    pub fn tool_exit_code(&self) -> Option<i32> {
        if self.code != ErrorCode::ToolCommandFailed {
            return None;
        }
        self.details
            .get("exitCode")
            .and_then(Value::as_i64)
            .map(|code| code as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_names_the_setting() {
        let err = Error::config_missing_key("S3_BUCKET", None);
        assert_eq!(err.code.as_str(), "config.missing_key");
        assert!(err.message.contains("S3_BUCKET"));
        assert_eq!(err.details["key"], "S3_BUCKET");
    }

    #[test]
    fn tool_exit_code_round_trips_through_details() {
        let err = Error::tool_command_failed(ToolCommandFailedDetails {
            command: "npm ci".to_string(),
            exit_code: 7,
            working_dir: None,
        });
        assert_eq!(err.tool_exit_code(), Some(7));
        assert_eq!(Error::internal_unexpected("x").tool_exit_code(), None);
    }

    #[test]
    fn build_output_missing_carries_export_hint() {
        let err = Error::build_output_missing("./out");
        assert_eq!(err.hints.len(), 1);
        assert!(err.hints[0].message.contains("output: 'export'"));
    }
}
