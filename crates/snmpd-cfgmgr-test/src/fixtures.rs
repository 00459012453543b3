//! Test fixtures for common snmpd configuration patterns
//!
//! Provides reusable packages, section edits and form submissions

use snmpd_cfgmgr::FormValues;
use snmpd_cfgmgr_common::{FieldValues, FieldValuesExt, SectionStore};

/// Section edit operation type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionOp {
    /// Add the section if missing, then set its options
    Set,
    /// Remove the section
    Del,
}

/// Represents an edit of one section of a package
#[derive(Debug, Clone)]
pub struct SectionChange {
    /// Section type (e.g., "com2sec", "agent")
    pub section_type: String,
    /// Section name; `None` targets the first section of the type, or a
    /// new anonymous one
    pub name: Option<String>,
    /// Operation type
    pub op: SectionOp,
    /// Options to set (for SET operations)
    pub options: FieldValues,
}

impl SectionChange {
    /// Create a SET operation on a named section
    pub fn set(section_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            section_type: section_type.into(),
            name: Some(name.into()),
            op: SectionOp::Set,
            options: FieldValues::new(),
        }
    }

    /// Create a SET operation on the first anonymous section of a type
    pub fn set_first(section_type: impl Into<String>) -> Self {
        Self {
            section_type: section_type.into(),
            name: None,
            op: SectionOp::Set,
            options: FieldValues::new(),
        }
    }

    /// Create a DEL operation
    pub fn del(section_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            section_type: section_type.into(),
            name: Some(name.into()),
            op: SectionOp::Del,
            options: FieldValues::new(),
        }
    }

    /// Add an option to a SET operation
    pub fn with_option(mut self, option: &str, value: &str) -> Self {
        self.options.set_field(option, value);
        self
    }

    /// Apply the edit to a package of the store, returning the section name
    pub fn apply<S: SectionStore>(&self, store: &mut S, config: &str) -> String {
        let name = match (&self.name, &self.op) {
            (Some(name), SectionOp::Del) => {
                store.remove(config, name);
                return name.clone();
            }
            (Some(name), SectionOp::Set) => store.add(config, &self.section_type, Some(name)),
            (None, _) => match store.get_first(config, &self.section_type) {
                Some(section) => section.name,
                None => store.add(config, &self.section_type, None),
            },
        };

        for (option, value) in &self.options {
            store.set(config, &name, option, value);
        }
        name
    }
}

/// Package texts as shipped by distributions
pub mod package_fixtures {
    /// `/etc/config/snmpd` as installed by the OpenWrt net-snmp package
    pub const OPENWRT_DEFAULT_SNMPD: &str = "\
config agent
\toption agentaddress UDP:161,UDP6:161

config agentx
\toption agentxsocket /var/run/agentx.sock

config com2sec public
\toption secname ro
\toption source default
\toption community public

config com2sec private
\toption secname rw
\toption source localhost
\toption community private

config com2sec6 public6
\toption secname ro
\toption source default
\toption community public

config com2sec6 private6
\toption secname rw
\toption source localhost
\toption community private

config group public_v1
\toption group public
\toption version v1
\toption secname ro

config group public_v2c
\toption group public
\toption version v2c
\toption secname ro

config group public_usm
\toption group public
\toption version usm
\toption secname ro

config group private_v1
\toption group private
\toption version v1
\toption secname rw

config group private_v2c
\toption group private
\toption version v2c
\toption secname rw

config group private_usm
\toption group private
\toption version usm
\toption secname rw

config view all
\toption viewname all
\toption type included
\toption oid .1

config access public_access
\toption group public
\toption context none
\toption version any
\toption level noauth
\toption prefix exact
\toption read all
\toption write none
\toption notify none

config access private_access
\toption group private
\toption context none
\toption version any
\toption level noauth
\toption prefix exact
\toption read all
\toption write all
\toption notify all

config system
\toption sysLocation\t'office'
\toption sysContact\t'bofh@example.com'
\toption sysName\t'HeartOfGold'

config exec
\toption name\tfiledescriptors
\toption prog\t/bin/cat
\toption args\t/proc/sys/fs/file-nr
\toption miboid\t1.3.6.1.4.1.2021.18

config engineid
\toption engineidtype '3'
\toption engineidnic 'eth0'

config snmpd general
\toption enabled '1'
\tlist network 'wan'
";

    /// `/etc/config/luci_snmpd` pointing at a MIB file
    pub fn luci_snmpd(mib_path: &str) -> String {
        format!(
            "\nconfig snmpd 'snmpd'\n\toption download_mib '{}'\n",
            mib_path
        )
    }
}

/// Common section edits
pub mod section_fixtures {
    use super::*;

    /// Agent listening on the given address
    pub fn agent(address: &str) -> SectionChange {
        SectionChange::set_first("agent").with_option("agentaddress", address)
    }

    /// Settings section with the previous version/protocol recorded
    pub fn general(snmp_version: &str, ip_protocol: &str) -> SectionChange {
        SectionChange::set("snmpd", "general")
            .with_option("snmp_version", snmp_version)
            .with_option("ip_protocol", ip_protocol)
    }

    /// IPv4 community mapping
    pub fn com2sec(community: &str, secname: &str, source: &str) -> SectionChange {
        SectionChange::set("com2sec", community)
            .with_option("secname", secname)
            .with_option("source", source)
            .with_option("community", community)
    }
}

/// Common form submissions
pub mod form_fixtures {
    use super::*;

    fn patch(fields: &[(&str, &str)]) -> FormValues {
        let mut values = FormValues::new();
        for (field, value) in fields {
            values.set(*field, *value);
        }
        values
    }

    /// Enable the service with the current community settings
    pub fn enable_service() -> FormValues {
        patch(&[("enabled", "1")])
    }

    /// Rename both communities
    pub fn communities(ro: &str, rw: &str) -> FormValues {
        patch(&[("enabled", "1"), ("ro_community", ro), ("rw_community", rw)])
    }

    /// Switch IP protocols and port
    pub fn listen(ip_protocol: &str, port: &str) -> FormValues {
        patch(&[("ip_protocol", ip_protocol), ("snmp_port", port)])
    }

    /// Enable traps of the given version towards `host`
    pub fn traps(version: &str, host: &str) -> FormValues {
        patch(&[
            ("trap_enabled", "1"),
            ("trap_snmp_version", version),
            ("trap_host", host),
            ("trap_port", "162"),
            ("trap_community", "public"),
        ])
    }

    /// Disable traps
    pub fn traps_disabled() -> FormValues {
        patch(&[("trap_enabled", "0")])
    }
}
