//! Settings form: field table, submitted values and the apply pass
//!
//! The form edits the first `snmpd` section. Most fields are stored as
//! plain options of that section; the rest are bound to other sections
//! through [`Binding`].
//!
//! Apply semantics, per field in declaration order:
//! - fields whose dependency is unmet are removed
//! - non-empty values are written when forced or when they differ from
//!   the stored value; an absent option always differs
//! - empty values are removed when the field allows it
//!
//! Validation of every field runs before the first write.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use snmpd_cfgmgr_common::{CfgMgrError, CfgMgrResult, SectionStore};

use crate::constants::{FLAG_OFF, FLAG_ON};
use crate::form_fields::*;
use crate::snmpd_mgr::SnmpdMgr;
use crate::types::{AccessLevel, CommunityOptions, IpProtocols, TrapOptions};
use crate::validate::{self, Datatype};
use crate::GENERAL_SECTION;

/// Form tabs, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Global,
    V1v2c,
    V3,
    Traps,
    System,
    Log,
}

impl Tab {
    /// All tabs in display order
    pub const ALL: [Tab; 6] = [Tab::Global, Tab::V1v2c, Tab::V3, Tab::Traps, Tab::System, Tab::Log];

    /// Returns the tab identifier
    pub fn id(&self) -> &'static str {
        match self {
            Tab::Global => "global",
            Tab::V1v2c => "v1v2c",
            Tab::V3 => "v3",
            Tab::Traps => "traps",
            Tab::System => "system",
            Tab::Log => "log",
        }
    }

    /// Returns the tab title
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Global => "Global",
            Tab::V1v2c => "SNMPv1/SNMPv2c",
            Tab::V3 => "SNMPv3",
            Tab::Traps => "Traps",
            Tab::System => "System",
            Tab::Log => "Logging",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Widget kind of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `1`/`0` checkbox
    Flag,
    /// Free text
    Value,
    /// Free text, masked on display
    Password,
    /// One of a fixed set of values
    List,
}

/// Where a field reads its current value from and writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Option of the general section
    General,
    /// Service enable flag, persisted only after the communities reconcile
    ServiceEnable,
    /// IP protocol, read back from the agent address when not stored
    IpProtocol,
    /// Port, mirrored into the agent address
    Port,
    /// Socket of the first agentx section
    AgentxSocket,
    /// Community name, read back from the mapping sections
    Community(AccessLevel),
    /// Community source, read back from the community's mapping section
    CommunitySource(AccessLevel),
    /// Trap enable flag, reconciles the trap sinks
    TrapEnable,
    /// Option of the first system section
    System,
}

/// Static description of one form field
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub tab: Tab,
    pub name: &'static str,
    pub kind: FieldKind,
    pub default: &'static str,
    /// Written even when unchanged
    pub force: bool,
    /// An empty value removes the option
    pub rmempty: bool,
    pub datatype: Option<Datatype>,
    /// Allowed values; empty means any
    pub choices: &'static [&'static str],
    /// Field is active only when another field has the given value
    pub depends: Option<(&'static str, &'static str)>,
    pub binding: Binding,
}

const FLAG_CHOICES: &[&str] = &[FLAG_OFF, FLAG_ON];
const LOG_PRIORITIES: &[&str] = &["!", "a", "c", "e", "w", "n", "i", "d"];
const SYSLOG_FACILITIES: &[&str] = &["d", "u", "0", "1", "2", "3", "4", "5", "6", "7"];

impl FieldSpec {
    const fn new(tab: Tab, name: &'static str, kind: FieldKind, default: &'static str) -> Self {
        Self {
            tab,
            name,
            kind,
            default,
            force: false,
            rmempty: false,
            datatype: None,
            choices: match kind {
                FieldKind::Flag => FLAG_CHOICES,
                _ => &[],
            },
            depends: None,
            binding: Binding::General,
        }
    }

    const fn force(self) -> Self {
        Self {
            force: true,
            ..self
        }
    }

    const fn rmempty(self) -> Self {
        Self {
            rmempty: true,
            ..self
        }
    }

    const fn datatype(self, datatype: Datatype) -> Self {
        Self {
            datatype: Some(datatype),
            ..self
        }
    }

    const fn choices(self, choices: &'static [&'static str]) -> Self {
        Self { choices, ..self }
    }

    const fn depends(self, field: &'static str, value: &'static str) -> Self {
        Self {
            depends: Some((field, value)),
            ..self
        }
    }

    const fn binding(self, binding: Binding) -> Self {
        Self { binding, ..self }
    }
}

use FieldKind::{Flag, List, Password, Value};

/// All form fields in declaration (and write) order
pub static FIELDS: &[FieldSpec] = &[
    // Global
    FieldSpec::new(Tab::Global, ENABLED, Flag, FLAG_OFF)
        .force()
        .binding(Binding::ServiceEnable),
    FieldSpec::new(Tab::Global, IP_PROTOCOL, List, "ipv4")
        .force()
        .choices(&["ipv4", "ipv6", "ipv4/ipv6"])
        .binding(Binding::IpProtocol),
    FieldSpec::new(Tab::Global, SNMP_PORT, Value, "161")
        .force()
        .datatype(Datatype::Port)
        .binding(Binding::Port),
    FieldSpec::new(Tab::Global, SNMP_VERSION, List, "v1/v2c")
        .force()
        .choices(&["v1/v2c", "v1/v2c/v3", "v3"]),
    FieldSpec::new(Tab::Global, AGENTX_SOCKET, Value, "")
        .force()
        .rmempty()
        .binding(Binding::AgentxSocket),
    // SNMPv1/SNMPv2c
    FieldSpec::new(Tab::V1v2c, RO_COMMUNITY, Value, "public")
        .binding(Binding::Community(AccessLevel::ReadOnly)),
    FieldSpec::new(Tab::V1v2c, RO_COMMUNITY_SRC, Value, "default")
        .datatype(Datatype::HostOrIpmask)
        .binding(Binding::CommunitySource(AccessLevel::ReadOnly)),
    FieldSpec::new(Tab::V1v2c, RW_COMMUNITY, Value, "private")
        .binding(Binding::Community(AccessLevel::ReadWrite)),
    FieldSpec::new(Tab::V1v2c, RW_COMMUNITY_SRC, Value, "localhost")
        .datatype(Datatype::HostOrIpmask)
        .binding(Binding::CommunitySource(AccessLevel::ReadWrite)),
    // SNMPv3
    FieldSpec::new(Tab::V3, SNMP_V3_USERNAME, Value, "writeuser"),
    FieldSpec::new(Tab::V3, SNMP_V3_ALLOW_WRITE, Flag, FLAG_OFF),
    FieldSpec::new(Tab::V3, SNMP_V3_AUTH_TYPE, List, "SHA").choices(&["none", "SHA", "MD5"]),
    FieldSpec::new(Tab::V3, SNMP_V3_AUTH_PASS, Password, "passphrase"),
    FieldSpec::new(Tab::V3, SNMP_V3_PRIVACY_TYPE, List, "AES").choices(&["none", "AES", "DES"]),
    FieldSpec::new(Tab::V3, SNMP_V3_PRIVACY_PASS, Password, "passphrase").rmempty(),
    // Traps
    FieldSpec::new(Tab::Traps, TRAP_ENABLED, Flag, FLAG_OFF)
        .force()
        .binding(Binding::TrapEnable),
    FieldSpec::new(Tab::Traps, TRAP_SNMP_VERSION, List, "v2c")
        .rmempty()
        .choices(&["v1", "v2c"]),
    FieldSpec::new(Tab::Traps, TRAP_HOST, Value, "localhost").datatype(Datatype::Host),
    FieldSpec::new(Tab::Traps, TRAP_PORT, Value, "162").datatype(Datatype::Port),
    FieldSpec::new(Tab::Traps, TRAP_COMMUNITY, Value, "public"),
    // System
    FieldSpec::new(Tab::System, SYS_NAME, Value, "")
        .rmempty()
        .binding(Binding::System),
    FieldSpec::new(Tab::System, SYS_CONTACT, Value, "")
        .rmempty()
        .binding(Binding::System),
    FieldSpec::new(Tab::System, SYS_LOCATION, Value, "")
        .rmempty()
        .binding(Binding::System),
    // Logging
    FieldSpec::new(Tab::Log, LOG_FILE, Flag, FLAG_OFF),
    FieldSpec::new(Tab::Log, LOG_FILE_PATH, Value, "/var/log/snmpd.log").depends(LOG_FILE, FLAG_ON),
    FieldSpec::new(Tab::Log, LOG_FILE_PRIORITY, List, "i")
        .rmempty()
        .choices(LOG_PRIORITIES)
        .depends(LOG_FILE, FLAG_ON),
    FieldSpec::new(Tab::Log, LOG_SYSLOG, Flag, FLAG_OFF),
    FieldSpec::new(Tab::Log, LOG_SYSLOG_FACILITY, List, "d")
        .rmempty()
        .choices(SYSLOG_FACILITIES)
        .depends(LOG_SYSLOG, FLAG_ON),
    FieldSpec::new(Tab::Log, LOG_SYSLOG_PRIORITY, List, "i")
        .rmempty()
        .choices(LOG_PRIORITIES)
        .depends(LOG_SYSLOG, FLAG_ON),
];

/// Looks up a field by name
pub fn field(name: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|spec| spec.name == name)
}

fn community_field(access: AccessLevel) -> &'static str {
    match access {
        AccessLevel::ReadOnly => RO_COMMUNITY,
        AccessLevel::ReadWrite => RW_COMMUNITY,
    }
}

/// Current stored value of a field, if any
fn cfgvalue<S: SectionStore>(spec: &FieldSpec, mgr: &SnmpdMgr<S>, section: &str) -> Option<String> {
    let stored = || mgr.get(section, spec.name).filter(|v| !v.is_empty());

    let value = match spec.binding {
        Binding::General | Binding::ServiceEnable | Binding::TrapEnable => stored(),
        Binding::IpProtocol => {
            stored().or_else(|| mgr.agent_protocols().map(|p| p.to_string()))
        }
        Binding::Port => stored().or_else(|| mgr.agent_port()),
        Binding::AgentxSocket => mgr.agentx_socket(),
        Binding::Community(access) => mgr.community_get(spec.name, section, access.as_str()),
        Binding::CommunitySource(access) => {
            let name = community_field(access);
            let default = field(name).map(|f| f.default).unwrap_or_default();
            let community = mgr.community_cfg_value(name, section, access.as_str(), default);
            mgr.community_src_get(spec.name, section, Some(community.as_str()))
        }
        Binding::System => mgr.system_option(spec.name),
    };

    value.filter(|v| !v.is_empty())
}

/// Value a submission is compared against to decide whether it changed
///
/// This is the raw stored value, absent when the option is not set. The
/// enable flag and the community fields resolve to their default instead,
/// so an untouched submission of them never counts as a change.
fn stored_value<S: SectionStore>(
    spec: &FieldSpec,
    mgr: &SnmpdMgr<S>,
    section: &str,
) -> Option<String> {
    match spec.binding {
        Binding::ServiceEnable | Binding::Community(_) | Binding::CommunitySource(_) => {
            Some(cfgvalue(spec, mgr, section).unwrap_or_else(|| spec.default.to_string()))
        }
        Binding::General | Binding::TrapEnable => mgr.get(section, spec.name),
        Binding::IpProtocol | Binding::Port | Binding::AgentxSocket | Binding::System => {
            cfgvalue(spec, mgr, section)
        }
    }
}

/// Stored values of all fields, taken before an apply pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredValues {
    values: BTreeMap<&'static str, Option<String>>,
}

impl StoredValues {
    pub fn load<S: SectionStore>(mgr: &SnmpdMgr<S>) -> Self {
        let section = mgr
            .general_section()
            .unwrap_or_else(|| GENERAL_SECTION.to_string());

        let values = FIELDS
            .iter()
            .map(|spec| (spec.name, stored_value(spec, mgr, &section)))
            .collect();
        Self { values }
    }

    /// Stored value of a field, `None` when absent
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).and_then(|v| v.as_deref())
    }

    /// True when `value` differs from the stored value
    pub fn changed(&self, field: &str, value: &str) -> bool {
        self.get(field) != Some(value)
    }
}

/// Outcome of an apply pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplySummary {
    /// Fields written, in order
    pub written: Vec<String>,
    /// Fields removed, in order
    pub removed: Vec<String>,
    /// Whether the service enable flag reached the store
    pub enabled_persisted: bool,
}

/// Form field values keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues {
    values: BTreeMap<String, String>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a JSON object of field name to value
    pub fn from_json(text: &str) -> CfgMgrResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads the value every field currently shows
    ///
    /// Fields without a stored value show their default.
    pub fn load<S: SectionStore>(mgr: &SnmpdMgr<S>) -> Self {
        let section = mgr
            .general_section()
            .unwrap_or_else(|| GENERAL_SECTION.to_string());

        let mut values = Self::new();
        for spec in FIELDS {
            let value = cfgvalue(spec, mgr, &section).unwrap_or_else(|| spec.default.to_string());
            values.set(spec.name, value);
        }
        values
    }

    /// Returns a field value, empty when unset
    pub fn get(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or_default()
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.values.insert(field.into(), value.into());
    }

    /// Overlays submitted values
    pub fn merge(&mut self, patch: FormValues) {
        self.values.extend(patch.values);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when the field's dependency is met
    pub fn is_active(&self, spec: &FieldSpec) -> bool {
        match spec.depends {
            Some((field, value)) => self.get(field) == value,
            None => true,
        }
    }

    /// Field values grouped by tab, in declaration order
    pub fn grouped(&self) -> Vec<(Tab, Vec<(&'static FieldSpec, &str)>)> {
        Tab::ALL
            .iter()
            .map(|tab| {
                let fields = FIELDS
                    .iter()
                    .filter(|spec| spec.tab == *tab)
                    .map(|spec| (spec, self.get(spec.name)))
                    .collect();
                (*tab, fields)
            })
            .collect()
    }

    /// Community settings as submitted
    pub fn community_options(&self) -> CommunityOptions {
        CommunityOptions {
            ro_community: self.get(RO_COMMUNITY).to_string(),
            ro_community_src: self.get(RO_COMMUNITY_SRC).to_string(),
            rw_community: self.get(RW_COMMUNITY).to_string(),
            rw_community_src: self.get(RW_COMMUNITY_SRC).to_string(),
            snmp_version: self.get(SNMP_VERSION).to_string(),
            ip_protocol: self.get(IP_PROTOCOL).to_string(),
        }
    }

    /// Trap settings as submitted
    pub fn trap_options(&self) -> TrapOptions {
        TrapOptions {
            enabled: self.get(TRAP_ENABLED) == FLAG_ON,
            version: self.get(TRAP_SNMP_VERSION).to_string(),
            host: self.get(TRAP_HOST).to_string(),
            port: self.get(TRAP_PORT).to_string(),
            community: self.get(TRAP_COMMUNITY).to_string(),
        }
    }

    /// Checks every active field; `stored` holds the values before editing
    ///
    /// All failures are reported together.
    pub fn validate(&self, stored: &StoredValues) -> CfgMgrResult<()> {
        let mut errors = Vec::new();

        for (name, _) in self.iter() {
            if field(name).is_none() {
                errors.push(CfgMgrError::invalid_config(name, "unknown field"));
            }
        }

        for spec in FIELDS {
            if !self.is_active(spec) {
                continue;
            }

            let value = self.get(spec.name);
            if value.is_empty() {
                if !spec.rmempty && stored.changed(spec.name, value) {
                    errors.push(CfgMgrError::invalid_config(
                        spec.name,
                        "required field is empty",
                    ));
                }
                continue;
            }

            let checked = if spec.choices.is_empty() {
                Ok(())
            } else {
                validate::choice(value, spec.choices)
            };
            let checked = checked.and_then(|_| match spec.datatype {
                Some(datatype) => datatype.check(value),
                None => Ok(()),
            });

            if let Err(message) = checked {
                errors.push(CfgMgrError::invalid_config(spec.name, message));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(CfgMgrError::Validation(errors))
        }
    }

    /// Validates and writes the values into the store
    ///
    /// Nothing is written when validation fails.
    #[instrument(skip_all)]
    pub fn apply<S: SectionStore>(&self, mgr: &mut SnmpdMgr<S>) -> CfgMgrResult<ApplySummary> {
        let stored = StoredValues::load(&*mgr);
        self.validate(&stored)?;

        let section = mgr.ensure_general_section();
        let mut summary = ApplySummary::default();

        for spec in FIELDS {
            let value = self.get(spec.name);

            if !self.is_active(spec) {
                debug!("Field {} inactive, removing", spec.name);
                Self::remove(spec, mgr, &section);
                summary.removed.push(spec.name.to_string());
                continue;
            }

            if !value.is_empty() {
                if spec.force || stored.changed(spec.name, value) {
                    let persisted = self.write(spec, mgr, &section, value)?;
                    if spec.binding == Binding::ServiceEnable {
                        summary.enabled_persisted = persisted;
                    }
                    if persisted {
                        summary.written.push(spec.name.to_string());
                    }
                }
            } else if spec.rmempty {
                Self::remove(spec, mgr, &section);
                summary.removed.push(spec.name.to_string());
            }
        }

        info!(
            "Applied form: {} written, {} removed",
            summary.written.len(),
            summary.removed.len()
        );
        Ok(summary)
    }

    /// Writes one field. Returns false when the value was not persisted.
    fn write<S: SectionStore>(
        &self,
        spec: &FieldSpec,
        mgr: &mut SnmpdMgr<S>,
        section: &str,
        value: &str,
    ) -> CfgMgrResult<bool> {
        match spec.binding {
            Binding::ServiceEnable => {
                if !mgr.communities_configure(&self.community_options()) {
                    warn!("Communities not configured, {} left unchanged", spec.name);
                    return Ok(false);
                }
                mgr.set(section, spec.name, value);
            }
            Binding::Port => {
                let port = validate::port(value)
                    .map_err(|message| CfgMgrError::invalid_config(spec.name, message))?;
                let protocols = IpProtocols::parse(self.get(IP_PROTOCOL));
                mgr.write_agent_address(protocols, port);
                mgr.set(section, spec.name, value);
            }
            Binding::AgentxSocket => mgr.set_agentx_socket(value),
            Binding::TrapEnable => {
                mgr.traps_configure(&self.trap_options());
                mgr.set(section, spec.name, value);
            }
            Binding::System => mgr.set_system_option(spec.name, value),
            Binding::General
            | Binding::IpProtocol
            | Binding::Community(_)
            | Binding::CommunitySource(_) => mgr.set(section, spec.name, value),
        }

        Ok(true)
    }

    fn remove<S: SectionStore>(spec: &FieldSpec, mgr: &mut SnmpdMgr<S>, section: &str) {
        match spec.binding {
            Binding::AgentxSocket => mgr.remove_agentx(),
            Binding::System => mgr.unset_system_option(spec.name),
            _ => mgr.unset(section, spec.name),
        }
    }
}
