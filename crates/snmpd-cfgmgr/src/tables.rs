//! Section type and option name constants for the snmpd package

/// Package holding the daemon configuration
pub const SNMPD_CONFIG: &str = snmpd_cfgmgr_common::defaults::SNMPD_CONFIG;

/// Section holding the form's own options
pub const GENERAL_SECTION: &str = "general";

/// Section types of the snmpd package
pub mod sections {
    /// Form settings
    pub const SNMPD: &str = "snmpd";
    /// Agent listen address
    pub const AGENT: &str = "agent";
    /// AgentX master socket
    pub const AGENTX: &str = "agentx";
    /// IPv4 community to security name mapping
    pub const COM2SEC: &str = "com2sec";
    /// IPv6 community to security name mapping
    pub const COM2SEC6: &str = "com2sec6";
    /// Security name to group mapping
    pub const GROUP: &str = "group";
    /// Group access rights
    pub const ACCESS: &str = "access";
    /// SNMPv1 trap destination
    pub const TRAPSINK: &str = "trapsink";
    /// SNMPv2c trap destination
    pub const TRAP2SINK: &str = "trap2sink";
    /// sysName/sysContact/sysLocation
    pub const SYSTEM: &str = "system";
}

/// Option names used in snmpd sections
pub mod fields {
    pub const SECNAME: &str = "secname";
    pub const SOURCE: &str = "source";
    pub const COMMUNITY: &str = "community";
    pub const GROUP: &str = "group";
    pub const VERSION: &str = "version";
    pub const CONTEXT: &str = "context";
    pub const LEVEL: &str = "level";
    pub const PREFIX: &str = "prefix";
    pub const READ: &str = "read";
    pub const WRITE: &str = "write";
    pub const NOTIFY: &str = "notify";
    pub const HOST: &str = "host";
    pub const PORT: &str = "port";
    pub const AGENTADDRESS: &str = "agentaddress";
    pub const AGENTXSOCKET: &str = "agentxsocket";
}

/// Option names of the general section, as submitted by the form
pub mod form_fields {
    pub const ENABLED: &str = "enabled";
    pub const IP_PROTOCOL: &str = "ip_protocol";
    pub const SNMP_PORT: &str = "snmp_port";
    pub const SNMP_VERSION: &str = "snmp_version";
    pub const AGENTX_SOCKET: &str = "__agentxsocket";
    pub const RO_COMMUNITY: &str = "ro_community";
    pub const RO_COMMUNITY_SRC: &str = "ro_community_src";
    pub const RW_COMMUNITY: &str = "rw_community";
    pub const RW_COMMUNITY_SRC: &str = "rw_community_src";
    pub const TRAP_ENABLED: &str = "trap_enabled";
    pub const TRAP_SNMP_VERSION: &str = "trap_snmp_version";
    pub const TRAP_HOST: &str = "trap_host";
    pub const TRAP_PORT: &str = "trap_port";
    pub const TRAP_COMMUNITY: &str = "trap_community";
    pub const SNMP_V3_USERNAME: &str = "snmp_v3_username";
    pub const SNMP_V3_ALLOW_WRITE: &str = "snmp_v3_allow_write";
    pub const SNMP_V3_AUTH_TYPE: &str = "snmp_v3_auth_type";
    pub const SNMP_V3_AUTH_PASS: &str = "snmp_v3_auth_pass";
    pub const SNMP_V3_PRIVACY_TYPE: &str = "snmp_v3_privacy_type";
    pub const SNMP_V3_PRIVACY_PASS: &str = "snmp_v3_privacy_pass";
    pub const SYS_NAME: &str = "sysName";
    pub const SYS_CONTACT: &str = "sysContact";
    pub const SYS_LOCATION: &str = "sysLocation";
    pub const LOG_FILE: &str = "log_file";
    pub const LOG_FILE_PATH: &str = "log_file_path";
    pub const LOG_FILE_PRIORITY: &str = "log_file_priority";
    pub const LOG_SYSLOG: &str = "log_syslog";
    pub const LOG_SYSLOG_FACILITY: &str = "log_syslog_facility";
    pub const LOG_SYSLOG_PRIORITY: &str = "log_syslog_priority";
}

/// Settings of the form itself, kept in the `luci_snmpd` package
pub mod form_config {
    /// Package name
    pub const CONFIG: &str = snmpd_cfgmgr_common::defaults::FORM_CONFIG;
    /// Section holding the settings
    pub const SECTION: &str = "snmpd";
    /// Path of the MIB file offered for download
    pub const DOWNLOAD_MIB: &str = "download_mib";
}

/// Suffixes of the sections derived from a community name
pub mod suffixes {
    pub const COM2SEC6: &str = "6";
    pub const GROUP_V1: &str = "_v1";
    pub const GROUP_V2C: &str = "_v2c";
    pub const GROUP_USM: &str = "_usm";
    pub const ACCESS: &str = "_access";

    /// All suffixes, in deletion order (the com2sec section has none)
    pub const ALL: [&str; 6] = ["", COM2SEC6, GROUP_V1, GROUP_V2C, GROUP_USM, ACCESS];
}

/// Fixed values written by the reconciler
pub mod constants {
    /// Access rule context
    pub const ACCESS_CONTEXT: &str = "none";

    /// Access rule version
    pub const ACCESS_VERSION: &str = "any";

    /// Access rule security level
    pub const ACCESS_LEVEL: &str = "noauth";

    /// Access rule context match
    pub const ACCESS_PREFIX: &str = "exact";

    /// View granting everything
    pub const VIEW_ALL: &str = "all";

    /// View granting nothing
    pub const VIEW_NONE: &str = "none";

    /// Flag value for "on"
    pub const FLAG_ON: &str = "1";

    /// Flag value for "off"
    pub const FLAG_OFF: &str = "0";
}
