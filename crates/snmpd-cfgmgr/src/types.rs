//! Type definitions for the snmpd configuration manager

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::tables::sections;

/// Access level of a community; doubles as its security name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessLevel {
    /// Read-only (`ro`)
    #[serde(rename = "ro")]
    ReadOnly,
    /// Read-write (`rw`)
    #[serde(rename = "rw")]
    ReadWrite,
}

impl AccessLevel {
    /// Returns the security name written to `secname` options
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::ReadOnly => "ro",
            AccessLevel::ReadWrite => "rw",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of SNMP protocol versions, parsed from values like `v1/v2c/v3`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnmpVersions {
    pub v1: bool,
    pub v2c: bool,
    pub v3: bool,
}

impl SnmpVersions {
    /// Parses a `/`-separated version list. Unknown tokens are ignored.
    pub fn parse(value: &str) -> Self {
        let mut versions = Self::default();
        for token in value.split('/').map(str::trim).filter(|t| !t.is_empty()) {
            match token {
                "v1" => versions.v1 = true,
                "v2c" => versions.v2c = true,
                "v3" => versions.v3 = true,
                other => warn!("Ignoring unknown SNMP version '{}'", other),
            }
        }
        versions
    }

    /// True when community based access (`v1/v2c`) is enabled
    pub fn includes_v1v2c(&self) -> bool {
        self.v1 && self.v2c
    }

    /// True when user based access (`v3`) is enabled
    pub fn includes_v3(&self) -> bool {
        self.v3
    }
}

impl fmt::Display for SnmpVersions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<&str> = [(self.v1, "v1"), (self.v2c, "v2c"), (self.v3, "v3")]
            .into_iter()
            .filter_map(|(on, token)| on.then_some(token))
            .collect();
        f.write_str(&tokens.join("/"))
    }
}

/// Set of IP protocols the agent listens on, parsed from `ipv4/ipv6`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IpProtocols {
    pub ipv4: bool,
    pub ipv6: bool,
}

impl IpProtocols {
    /// IPv4 only
    pub const IPV4: Self = Self {
        ipv4: true,
        ipv6: false,
    };

    /// IPv6 only
    pub const IPV6: Self = Self {
        ipv4: false,
        ipv6: true,
    };

    /// Both families
    pub const DUAL: Self = Self {
        ipv4: true,
        ipv6: true,
    };

    /// Parses a `/`-separated protocol list. Unknown tokens are ignored.
    pub fn parse(value: &str) -> Self {
        let mut protocols = Self::default();
        for token in value.split('/').map(str::trim).filter(|t| !t.is_empty()) {
            match token {
                "ipv4" => protocols.ipv4 = true,
                "ipv6" => protocols.ipv6 = true,
                other => warn!("Ignoring unknown IP protocol '{}'", other),
            }
        }
        protocols
    }

    /// True when no protocol is selected
    pub fn is_empty(&self) -> bool {
        !self.ipv4 && !self.ipv6
    }

    /// Section type holding community mappings for these protocols
    ///
    /// IPv6 wins when both are selected.
    pub fn community_section_type(&self) -> &'static str {
        if self.ipv6 {
            sections::COM2SEC6
        } else {
            sections::COM2SEC
        }
    }
}

impl fmt::Display for IpProtocols {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<&str> = [(self.ipv4, "ipv4"), (self.ipv6, "ipv6")]
            .into_iter()
            .filter_map(|(on, token)| on.then_some(token))
            .collect();
        f.write_str(&tokens.join("/"))
    }
}

/// Community settings submitted together with the enable flag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunityOptions {
    pub ro_community: String,
    pub ro_community_src: String,
    pub rw_community: String,
    pub rw_community_src: String,
    pub snmp_version: String,
    pub ip_protocol: String,
}

/// Trap settings submitted together with the trap enable flag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrapOptions {
    pub enabled: bool,
    pub version: String,
    pub host: String,
    pub port: String,
    pub community: String,
}

impl TrapOptions {
    /// Sink section type matching the trap version
    pub fn sink_type(&self) -> &'static str {
        if self.version == "v1" {
            sections::TRAPSINK
        } else {
            sections::TRAP2SINK
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snmp_versions_parse() {
        let v = SnmpVersions::parse("v1/v2c");
        assert!(v.includes_v1v2c());
        assert!(!v.includes_v3());

        let v = SnmpVersions::parse("v1/v2c/v3");
        assert!(v.includes_v1v2c());
        assert!(v.includes_v3());
        assert_eq!(v.to_string(), "v1/v2c/v3");

        let v = SnmpVersions::parse("v3");
        assert!(!v.includes_v1v2c());
        assert!(v.includes_v3());

        assert_eq!(SnmpVersions::parse(""), SnmpVersions::default());
    }

    #[test]
    fn test_snmp_versions_no_substring_match() {
        // "v2c" alone does not enable the v1/v2c community mapping
        assert!(!SnmpVersions::parse("v2c").includes_v1v2c());
        assert!(!SnmpVersions::parse("v33").includes_v3());
    }

    #[test]
    fn test_ip_protocols_parse_and_display() {
        assert_eq!(IpProtocols::parse("ipv4"), IpProtocols::IPV4);
        assert_eq!(IpProtocols::parse("ipv6"), IpProtocols::IPV6);
        assert_eq!(IpProtocols::parse("ipv4/ipv6"), IpProtocols::DUAL);
        assert!(IpProtocols::parse("").is_empty());
        assert_eq!(IpProtocols::DUAL.to_string(), "ipv4/ipv6");
        assert_eq!(IpProtocols::default().to_string(), "");
    }

    #[test]
    fn test_community_section_type() {
        assert_eq!(IpProtocols::IPV4.community_section_type(), "com2sec");
        assert_eq!(IpProtocols::IPV6.community_section_type(), "com2sec6");
        assert_eq!(IpProtocols::DUAL.community_section_type(), "com2sec6");
        assert_eq!(IpProtocols::default().community_section_type(), "com2sec");
    }

    #[test]
    fn test_trap_sink_type() {
        let mut trap = TrapOptions {
            version: "v1".to_string(),
            ..Default::default()
        };
        assert_eq!(trap.sink_type(), "trapsink");

        trap.version = "v2c".to_string();
        assert_eq!(trap.sink_type(), "trap2sink");

        trap.version = String::new();
        assert_eq!(trap.sink_type(), "trap2sink");
    }

    #[test]
    fn test_access_level_serde() {
        assert_eq!(AccessLevel::ReadOnly.to_string(), "ro");
        let parsed: AccessLevel = serde_json::from_str("\"rw\"").unwrap();
        assert_eq!(parsed, AccessLevel::ReadWrite);
    }
}
