//! Shell command execution utilities.
//!
//! Used to drive init scripts after a configuration commit. Arguments are
//! quoted with [`shellquote`] so user-controlled values never reach the
//! shell unescaped.
//!
//! # Example
//!
//! ```ignore
//! use snmpd_cfgmgr_common::shell::{self, init_script_cmd};
//!
//! let cmd = init_script_cmd("/etc/init.d/snmpd", "reload");
//! let result = shell::exec(&cmd).await?;
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{CfgMgrError, CfgMgrResult};

/// Shell used to run commands.
pub const SH_CMD: &str = "/bin/sh";

/// Regex for characters that need escaping in shell double-quotes.
/// Matches: $, `, ", \, and newline
static SHELL_ESCAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([$`"\\\n])"#).expect("Invalid regex pattern"));

/// Quotes a string for safe use in shell commands.
///
/// The string is wrapped in double quotes and the characters that keep a
/// special meaning inside double quotes are escaped.
///
/// ```
/// use snmpd_cfgmgr_common::shell::shellquote;
///
/// assert_eq!(shellquote("reload"), "\"reload\"");
/// assert_eq!(shellquote("with$var"), "\"with\\$var\"");
/// ```
pub fn shellquote(s: &str) -> String {
    let escaped = SHELL_ESCAPE_RE.replace_all(s, r"\$1");
    format!("\"{}\"", escaped)
}

/// Builds the command line invoking an init script action.
pub fn init_script_cmd(script: &str, action: &str) -> String {
    format!("{} {}", shellquote(script), shellquote(action))
}

/// Result of a shell command execution.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// The exit code of the command (0 = success).
    pub exit_code: i32,
    /// The stdout output.
    pub stdout: String,
    /// The stderr output.
    pub stderr: String,
}

impl ExecResult {
    /// Returns true if the command succeeded (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Returns the combined output (stdout + stderr) for error messages.
    pub fn combined_output(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
        }
    }
}

/// Executes a shell command asynchronously through `/bin/sh -c`.
pub async fn exec(cmd: &str) -> CfgMgrResult<ExecResult> {
    tracing::debug!(command = %cmd, "Executing shell command");

    let output = Command::new(SH_CMD)
        .arg("-c")
        .arg(cmd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| CfgMgrError::ShellExec {
            command: cmd.to_string(),
            source: e,
        })?;

    let result = ExecResult {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    };

    if result.success() {
        tracing::trace!(command = %cmd, "Command succeeded");
    } else {
        tracing::warn!(
            command = %cmd,
            exit_code = result.exit_code,
            stderr = %result.stderr,
            "Command failed"
        );
    }

    Ok(result)
}

/// Executes a shell command and returns an error on non-zero exit.
///
/// Returns the stdout output on success.
pub async fn exec_or_throw(cmd: &str) -> CfgMgrResult<String> {
    let result = exec(cmd).await?;
    if result.success() {
        Ok(result.stdout)
    } else {
        Err(CfgMgrError::ShellCommandFailed {
            command: cmd.to_string(),
            exit_code: result.exit_code,
            output: result.combined_output(),
        })
    }
}
