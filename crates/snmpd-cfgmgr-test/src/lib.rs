//! Integration test infrastructure for the snmpd configuration manager
//!
//! Provides:
//! - Temporary configuration directories holding UCI packages
//! - Test fixtures for packages, section edits and form submissions
//! - Section store verification helpers
//! - Captured service command verification

pub mod fixtures;
mod uci_env;
mod verification;

pub use fixtures::*;
pub use uci_env::UciTestEnv;
pub use verification::*;
