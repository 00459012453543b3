//! Error types for snmpd configuration management.
//!
//! This module defines the error types used throughout the cfgmgr crates.
//! All errors implement `std::error::Error` via `thiserror`.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cfgmgr operations.
pub type CfgMgrResult<T> = Result<T, CfgMgrError>;

/// Errors that can occur during cfgmgr operations.
#[derive(Debug, Error)]
pub enum CfgMgrError {
    /// Failed to execute a shell command (spawn error).
    #[error("Failed to execute shell command '{command}': {source}")]
    ShellExec {
        /// The command that failed to execute.
        command: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Shell command returned non-zero exit code.
    #[error("Shell command failed: '{command}' (exit code {exit_code}): {output}")]
    ShellCommandFailed {
        /// The command that failed.
        command: String,
        /// The exit code.
        exit_code: i32,
        /// Combined stdout/stderr output.
        output: String,
    },

    /// Reading or writing a configuration file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// A configuration file could not be parsed.
    #[error("Parse error in {}:{line}: {message}", .path.display())]
    Parse {
        /// The file being parsed.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// Error message.
        message: String,
    },

    /// Configuration validation error.
    #[error("Invalid configuration for {field}: {message}")]
    InvalidConfig {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },

    /// Several fields failed validation at once.
    #[error("{} field(s) failed validation: {}", .0.len(), join_errors(.0))]
    Validation(Vec<CfgMgrError>),

    /// Section not found in a package.
    #[error("Section not found: {config}.{section}")]
    SectionNotFound {
        /// The package name.
        config: String,
        /// The section name or type.
        section: String,
    },

    /// Form payload could not be decoded.
    #[error("Invalid form payload: {0}")]
    Payload(#[from] serde_json::Error),
}

fn join_errors(errors: &[CfgMgrError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl CfgMgrError {
    /// Creates an I/O error bound to a path.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a parse error.
    pub fn parse(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a section not found error.
    pub fn section_not_found(config: impl Into<String>, section: impl Into<String>) -> Self {
        Self::SectionNotFound {
            config: config.into(),
            section: section.into(),
        }
    }

    /// Returns true if this error was caused by the submitted values
    /// rather than by the environment.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            CfgMgrError::InvalidConfig { .. }
                | CfgMgrError::Validation(_)
                | CfgMgrError::Payload(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CfgMgrError::section_not_found("snmpd", "general");
        assert_eq!(err.to_string(), "Section not found: snmpd.general");
    }

    #[test]
    fn test_parse_error() {
        let err = CfgMgrError::parse("/etc/config/snmpd", 12, "unterminated quote");
        assert_eq!(
            err.to_string(),
            "Parse error in /etc/config/snmpd:12: unterminated quote"
        );
    }

    #[test]
    fn test_shell_command_failed() {
        let err = CfgMgrError::ShellCommandFailed {
            command: "/etc/init.d/snmpd reload".to_string(),
            exit_code: 2,
            output: "not found".to_string(),
        };
        assert!(err.to_string().contains("/etc/init.d/snmpd"));
        assert!(err.to_string().contains("exit code 2"));
    }

    #[test]
    fn test_validation_joins_messages() {
        let err = CfgMgrError::Validation(vec![
            CfgMgrError::invalid_config("snmp_port", "must be a port"),
            CfgMgrError::invalid_config("trap_host", "must be a host"),
        ]);
        let text = err.to_string();
        assert!(text.starts_with("2 field(s) failed validation"));
        assert!(text.contains("snmp_port"));
        assert!(text.contains("trap_host"));
    }

    #[test]
    fn test_is_user_error() {
        assert!(CfgMgrError::invalid_config("enabled", "bad").is_user_error());
        assert!(CfgMgrError::Validation(vec![]).is_user_error());
        assert!(!CfgMgrError::parse("/etc/config/snmpd", 1, "bad").is_user_error());
        assert!(!CfgMgrError::section_not_found("snmpd", "agent").is_user_error());
    }
}
