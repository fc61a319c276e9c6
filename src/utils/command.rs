//! Command execution primitives with consistent error handling.

use std::path::Path;
use std::process::{Command, Output, Stdio};

use crate::error::{Error, Result, ToolCommandFailedDetails};

/// Runs external programs on behalf of a stage.
///
/// Child stdout is routed to our stderr: stdout is reserved for the JSON
/// response envelope.
pub trait ProcessRunner {
    /// Run a program to completion and return its exit code.
    ///
    /// Errors only when the program could not be started at all.
    fn run(&self, program: &str, args: &[&str], dir: &Path) -> Result<i32>;

    /// Check that a program is invocable (exits zero for the given args).
    fn probe(&self, program: &str, args: &[&str], dir: &Path) -> Result<()>;
}

/// `std::process` implementation of [`ProcessRunner`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str], dir: &Path) -> Result<i32> {
        crate::log_status!("run", "$ {}", display_command(program, args));

        let status = Command::new(program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(std::io::stderr()))
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| {
                Error::internal_io(
                    format!("Failed to run {}: {}", program, e),
                    Some(display_command(program, args)),
                )
            })?;

        Ok(status.code().unwrap_or(-1))
    }

    fn probe(&self, program: &str, args: &[&str], dir: &Path) -> Result<()> {
        crate::log_status!("run", "$ {}", display_command(program, args));

        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::tool_not_found(program, e.to_string()))?;

        if !output.status.success() {
            return Err(Error::tool_not_found(program, error_text(&output)));
        }

        let version = String::from_utf8_lossy(&output.stdout);
        if !version.trim().is_empty() {
            crate::log_status!("run", "{}", version.trim());
        }
        Ok(())
    }
}

/// Run a program and turn a non-zero exit into a `tool.command_failed` error
/// that carries the program's exit status.
pub fn run_checked(runner: &dyn ProcessRunner, program: &str, args: &[&str], dir: &Path) -> Result<()> {
    let exit_code = runner.run(program, args, dir)?;
    if exit_code == 0 {
        return Ok(());
    }

    Err(Error::tool_command_failed(ToolCommandFailedDetails {
        command: display_command(program, args),
        exit_code,
        working_dir: Some(dir.display().to_string()),
    }))
}

pub fn display_command(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract error text from command output.
///
/// Prefers stderr, falls back to stdout if stderr is empty.
pub fn error_text(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        stderr.trim().to_string()
    } else {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }
}
