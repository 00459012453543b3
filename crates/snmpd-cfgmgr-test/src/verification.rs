//! Verification helpers for testing configuration managers
//!
//! Provides assertion helpers to verify section store state and command
//! execution

use snmpd_cfgmgr_common::{CfgMgrError, SectionStore};
use thiserror::Error;

/// Verification error types
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] CfgMgrError),

    #[error("Expected section '{section}' not found in {config}")]
    SectionNotFound { config: String, section: String },

    #[error("Unexpected section '{section}' in {config}")]
    UnexpectedSection { config: String, section: String },

    #[error("Section '{section}' has type '{actual}', expected '{expected}'")]
    TypeMismatch {
        section: String,
        expected: String,
        actual: String,
    },

    #[error("Expected option '{option}' not found in section '{section}'")]
    OptionNotFound { section: String, option: String },

    #[error("Value mismatch for {section}.{option}: expected '{expected}', got '{actual}'")]
    ValueMismatch {
        section: String,
        option: String,
        expected: String,
        actual: String,
    },

    #[error("Expected {expected} sections of type '{section_type}', found {actual}")]
    SectionCountMismatch {
        section_type: String,
        expected: usize,
        actual: usize,
    },

    #[error("Expected command '{expected}' not captured (captured: {captured:?})")]
    CommandNotCaptured {
        expected: String,
        captured: Vec<String>,
    },

    #[error("Expected {expected} commands, captured {actual}")]
    CommandCountMismatch { expected: usize, actual: usize },
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerificationError>;

/// Section store verification helper
pub struct StoreVerifier<'a, S: SectionStore> {
    store: &'a S,
    config: String,
}

impl<'a, S: SectionStore> StoreVerifier<'a, S> {
    /// Create a new verifier for one package
    pub fn new(store: &'a S, config: impl Into<String>) -> Self {
        Self {
            store,
            config: config.into(),
        }
    }

    /// Verify that a section exists with the given type
    pub fn assert_section(&self, section: &str, section_type: &str) -> VerifyResult<()> {
        match self.store.section_type(&self.config, section) {
            None => Err(VerificationError::SectionNotFound {
                config: self.config.clone(),
                section: section.to_string(),
            }),
            Some(actual) if actual == section_type => Ok(()),
            Some(actual) => Err(VerificationError::TypeMismatch {
                section: section.to_string(),
                expected: section_type.to_string(),
                actual,
            }),
        }
    }

    /// Verify that a section does not exist
    pub fn assert_no_section(&self, section: &str) -> VerifyResult<()> {
        if self.store.exists(&self.config, section) {
            return Err(VerificationError::UnexpectedSection {
                config: self.config.clone(),
                section: section.to_string(),
            });
        }
        Ok(())
    }

    /// Verify that an option has a specific value
    pub fn assert_option(&self, section: &str, option: &str, expected: &str) -> VerifyResult<()> {
        if !self.store.exists(&self.config, section) {
            return Err(VerificationError::SectionNotFound {
                config: self.config.clone(),
                section: section.to_string(),
            });
        }

        match self.store.get(&self.config, section, option) {
            None => Err(VerificationError::OptionNotFound {
                section: section.to_string(),
                option: option.to_string(),
            }),
            Some(actual) if actual == expected => Ok(()),
            Some(actual) => Err(VerificationError::ValueMismatch {
                section: section.to_string(),
                option: option.to_string(),
                expected: expected.to_string(),
                actual,
            }),
        }
    }

    /// Verify that all options match expected values
    pub fn assert_options(&self, section: &str, expected: &[(&str, &str)]) -> VerifyResult<()> {
        for (option, value) in expected {
            self.assert_option(section, option, value)?;
        }
        Ok(())
    }

    /// Verify that an option is absent
    pub fn assert_no_option(&self, section: &str, option: &str) -> VerifyResult<()> {
        match self.store.get(&self.config, section, option) {
            None => Ok(()),
            Some(actual) => Err(VerificationError::ValueMismatch {
                section: section.to_string(),
                option: option.to_string(),
                expected: "<unset>".to_string(),
                actual,
            }),
        }
    }

    /// Verify the number of sections of a type
    pub fn assert_section_count(&self, section_type: &str, expected: usize) -> VerifyResult<()> {
        let actual = self.store.sections(&self.config, section_type).len();
        if actual != expected {
            return Err(VerificationError::SectionCountMismatch {
                section_type: section_type.to_string(),
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Verify the derived sections of a community
    ///
    /// Checks the mapping, group and access sections written for a
    /// community with v1/v2c enabled on the given families.
    pub fn assert_community(
        &self,
        community: &str,
        secname: &str,
        source: &str,
        ipv4: bool,
        ipv6: bool,
    ) -> VerifyResult<()> {
        let mapping = [("secname", secname), ("source", source), ("community", community)];

        let com2sec = community.to_string();
        if ipv4 {
            self.assert_section(&com2sec, "com2sec")?;
            self.assert_options(&com2sec, &mapping)?;
        }

        let com2sec6 = format!("{}6", community);
        if ipv6 {
            self.assert_section(&com2sec6, "com2sec6")?;
            self.assert_options(&com2sec6, &mapping)?;
        }

        for version in ["v1", "v2c"] {
            let group = format!("{}_{}", community, version);
            self.assert_section(&group, "group")?;
            self.assert_options(
                &group,
                &[("group", community), ("version", version), ("secname", secname)],
            )?;
        }

        let (write, notify) = if secname == "rw" {
            ("all", "all")
        } else {
            ("none", "none")
        };
        let access = format!("{}_access", community);
        self.assert_section(&access, "access")?;
        self.assert_options(
            &access,
            &[
                ("group", community),
                ("context", "none"),
                ("version", "any"),
                ("level", "noauth"),
                ("prefix", "exact"),
                ("read", "all"),
                ("write", write),
                ("notify", notify),
            ],
        )
    }

    /// Verify that no section derived from a community remains
    pub fn assert_community_deleted(&self, community: &str) -> VerifyResult<()> {
        for suffix in ["", "6", "_v1", "_v2c", "_usm", "_access"] {
            self.assert_no_section(&format!("{}{}", community, suffix))?;
        }
        Ok(())
    }
}

/// Captured command verification helper
pub struct CommandVerifier<'a> {
    captured: &'a [String],
}

impl<'a> CommandVerifier<'a> {
    /// Create a verifier over captured commands
    pub fn new(captured: &'a [String]) -> Self {
        Self { captured }
    }

    /// Verify that a command was captured
    pub fn assert_captured(&self, expected: &str) -> VerifyResult<()> {
        if self.captured.iter().any(|c| c == expected) {
            Ok(())
        } else {
            Err(VerificationError::CommandNotCaptured {
                expected: expected.to_string(),
                captured: self.captured.to_vec(),
            })
        }
    }

    /// Verify that a captured command contains a fragment
    pub fn assert_captured_containing(&self, fragment: &str) -> VerifyResult<()> {
        if self.captured.iter().any(|c| c.contains(fragment)) {
            Ok(())
        } else {
            Err(VerificationError::CommandNotCaptured {
                expected: fragment.to_string(),
                captured: self.captured.to_vec(),
            })
        }
    }

    /// Verify the number of captured commands
    pub fn assert_count(&self, expected: usize) -> VerifyResult<()> {
        if self.captured.len() != expected {
            return Err(VerificationError::CommandCountMismatch {
                expected,
                actual: self.captured.len(),
            });
        }
        Ok(())
    }
}
