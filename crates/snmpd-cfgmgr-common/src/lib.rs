//! Common infrastructure for the snmpd configuration manager.
//!
//! This crate provides the pieces shared by the manager, its binary and
//! its test crate:
//!
//! - [`store`]: the [`SectionStore`] abstraction and [`MemoryStore`]
//! - [`uci`]: loading and saving packages in UCI text format
//! - [`CfgMgr`]: base trait for configuration managers
//! - [`shell`]: shell command execution with proper quoting
//! - [`error`]: error types for cfgmgr operations
//!
//! # Architecture
//!
//! A configuration manager follows this pattern:
//!
//! 1. Load the packages it depends on into a [`MemoryStore`]
//! 2. Translate submitted settings into section mutations through the
//!    [`SectionStore`] trait
//! 3. Save the package when the store revision changed
//! 4. Optionally reload the daemon through its init script
//!
//! # Example
//!
//! ```ignore
//! use snmpd_cfgmgr_common::{uci, MemoryStore, SectionStore};
//!
//! let mut store = MemoryStore::new();
//! uci::load_package(&mut store, "/etc/config".as_ref(), "snmpd")?;
//! if let Some(agent) = store.get_first("snmpd", "agent") {
//!     store.set("snmpd", &agent.name, "agentaddress", "UDP:161");
//! }
//! uci::save_package(&store, "/etc/config".as_ref(), "snmpd")?;
//! ```

pub mod error;
pub mod manager;
pub mod shell;
pub mod store;
pub mod uci;

// Re-export commonly used items at crate root
pub use error::{CfgMgrError, CfgMgrResult};
pub use manager::{defaults, CfgMgr, FieldValue, FieldValues, FieldValuesExt};
pub use store::{MemoryStore, Package, Section, SectionStore};
