//! CLI response formatting and output.
//!
//! Provides JSON envelope, printing, and exit code mapping.

use launchpad::error::Hint;
use launchpad::{Error, ErrorCode, Result};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CliResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CliError>,
}

#[derive(Debug, Serialize)]
pub struct CliError {
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints: Option<Vec<Hint>>,
}

impl<T: Serialize> CliResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            Error::internal_json(e.to_string(), Some("serialize response".to_string()))
        })
    }
}

impl CliResponse<()> {
    pub fn from_error(err: &Error) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(CliError {
                code: err.code.as_str().to_string(),
                message: err.message.clone(),
                details: err.details.clone(),
                hints: if err.hints.is_empty() {
                    None
                } else {
                    Some(err.hints.clone())
                },
            }),
        }
    }
}

fn print_response<T: Serialize>(response: &CliResponse<T>) -> Result<()> {
    use std::io::{self, Write};

    let payload = response.to_json()?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", payload) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(Error::internal_io(
            e.to_string(),
            Some("write stdout".to_string()),
        ));
    }
    Ok(())
}

pub fn map_cmd_result_to_json<T: Serialize>(
    result: Result<(T, i32)>,
) -> (Result<serde_json::Value>, i32) {
    match result {
        Ok((data, exit_code)) => match serde_json::to_value(data) {
            Ok(value) => (Ok(value), exit_code),
            Err(err) => (
                Err(Error::internal_json(
                    err.to_string(),
                    Some("serialize response".to_string()),
                )),
                1,
            ),
        },
        Err(err) => {
            let exit_code = exit_code_for_error(&err);
            (Err(err), exit_code)
        }
    }
}

/// A failed tool run keeps the tool's own status; everything else maps by code.
pub fn exit_code_for_error(err: &Error) -> i32 {
    match err.code {
        ErrorCode::VerifyFailed => 2,

        ErrorCode::ConfigMissingKey
        | ErrorCode::ConfigInvalidValue
        | ErrorCode::ValidationInvalidArgument => 3,

        ErrorCode::ToolNotFound => 4,
        ErrorCode::BuildOutputMissing => 5,
        ErrorCode::ToolCommandFailed => match err.tool_exit_code() {
            Some(code) if code > 0 => code,
            _ => 1,
        },

        ErrorCode::RemoteRequestFailed
        | ErrorCode::StorageRequestFailed
        | ErrorCode::CdnRequestFailed => 20,

        ErrorCode::InternalIoError
        | ErrorCode::InternalJsonError
        | ErrorCode::InternalUnexpected => 1,
    }
}

pub fn print_json_result(result: Result<serde_json::Value>) -> Result<()> {
    match result {
        Ok(data) => print_response(&CliResponse::success(data)),
        Err(err) => print_response(&CliResponse::<()>::from_error(&err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use launchpad::error::ToolCommandFailedDetails;

    #[test]
    fn tool_failures_keep_the_tool_status() {
        let err = Error::tool_command_failed(ToolCommandFailedDetails {
            command: "npm run build".to_string(),
            exit_code: 7,
            working_dir: None,
        });
        assert_eq!(exit_code_for_error(&err), 7);
    }

    #[test]
    fn config_and_provider_errors_have_distinct_codes() {
        assert_eq!(exit_code_for_error(&Error::config_missing_key("S3_BUCKET", None)), 3);
        assert_eq!(exit_code_for_error(&Error::build_output_missing("out")), 5);
        assert_eq!(exit_code_for_error(&Error::verify_failed(vec!["monte".into()])), 2);
        assert_eq!(
            exit_code_for_error(&Error::storage_request_failed("put_object", Some(403), "denied")),
            20
        );
    }

    #[test]
    fn error_envelope_omits_data() {
        let err = Error::config_missing_key("S3_BUCKET", None);
        let value = serde_json::to_value(CliResponse::<()>::from_error(&err)).unwrap();
        assert_eq!(value["success"], false);
        assert!(value.get("data").is_none());
        assert_eq!(value["error"]["code"], "config.missing_key");
        assert_eq!(value["error"]["details"]["key"], "S3_BUCKET");
    }
}
