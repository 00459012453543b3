//! # snmpd-cfgmgr - SNMP daemon configuration manager
//!
//! Translates the settings of the snmpd web form into the section layout
//! the daemon's configuration loader reads.
//!
//! ## Responsibilities
//! - Community name/source to com2sec, com2sec6, group and access sections
//! - Trap destination to a single trapsink or trap2sink section
//! - IP protocol and port to the agent listen address
//! - AgentX socket and system identification sections
//! - Form field validation, defaults and the ordered apply pass
//! - MIB file download and daemon reload
//!
//! ## Configuration Sources
//! - `snmpd` package: daemon configuration and the form's own options
//!   (first `snmpd` section, conventionally `general`)
//! - `luci_snmpd` package: form settings such as the MIB download path
//!
//! ## Key Features
//! - Reconciliation is in-memory and synchronous against a [`SectionStore`]
//! - Community sections are rewritten only when their inputs changed
//! - Validation runs before the first write; a failed apply leaves the
//!   store untouched
//!
//! [`SectionStore`]: snmpd_cfgmgr_common::SectionStore

mod address;
pub mod form;
mod mib;
mod service;
mod snmpd_mgr;
mod tables;
mod types;
pub mod validate;

pub use address::{encode as encode_agent_address, parse_port, parse_protocols};
pub use form::{ApplySummary, FieldSpec, FormValues, StoredValues, Tab, FIELDS};
pub use mib::MibFile;
pub use service::ServiceCtl;
pub use snmpd_mgr::SnmpdMgr;
pub use tables::*;
pub use types::*;
