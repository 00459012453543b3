//! SnmpdMgr - Core snmpd community/trap reconciler

use tracing::{debug, info, instrument};

use snmpd_cfgmgr_common::{CfgMgr, SectionStore};

use crate::address;
use crate::constants::*;
use crate::fields;
use crate::sections;
use crate::suffixes;
use crate::types::{AccessLevel, CommunityOptions, IpProtocols, SnmpVersions, TrapOptions};
use crate::{form_fields, GENERAL_SECTION, SNMPD_CONFIG};

/// Community and source recovered from the previous configuration
#[derive(Debug, Clone, PartialEq, Eq)]
struct PreviousBinding {
    community: Option<String>,
    source: Option<String>,
}

impl Default for PreviousBinding {
    fn default() -> Self {
        Self {
            community: Some(String::new()),
            source: Some(String::new()),
        }
    }
}

/// SnmpdMgr translates form settings into snmpd sections
///
/// Configuration flow:
/// 1. Communities: enable flag → com2sec/com2sec6/group/access sections
/// 2. Traps: trap enable flag → trapsink/trap2sink section
/// 3. Listen address: IP protocol + port → agent section
/// 4. AgentX and system settings → agentx/system sections
pub struct SnmpdMgr<S: SectionStore> {
    /// Backing section store
    store: S,

    /// Package the daemon reads (normally "snmpd")
    config: String,
}

impl<S: SectionStore> SnmpdMgr<S> {
    /// Creates a manager working on the `snmpd` package
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: SNMPD_CONFIG.to_string(),
        }
    }

    /// Returns the backing store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the backing store for direct edits
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Gets an option of a section of the managed package
    pub fn get(&self, section: &str, option: &str) -> Option<String> {
        self.store.get(&self.config, section, option)
    }

    /// Sets an option of a section of the managed package
    pub fn set(&mut self, section: &str, option: &str, value: &str) {
        self.store.set(&self.config, section, option, value);
    }

    /// Removes an option of a section of the managed package
    pub fn unset(&mut self, section: &str, option: &str) {
        self.store.unset(&self.config, section, option);
    }

    /// Returns the name of the section holding the form settings
    ///
    /// This is the first `snmpd` section, conventionally `general`.
    pub fn general_section(&self) -> Option<String> {
        self.store
            .get_first(&self.config, sections::SNMPD)
            .map(|s| s.name)
    }

    /// Returns the settings section, creating `general` if absent
    pub fn ensure_general_section(&mut self) -> String {
        match self.general_section() {
            Some(name) => name,
            None => {
                info!("Creating missing {} section", GENERAL_SECTION);
                self.store
                    .add(&self.config, sections::SNMPD, Some(GENERAL_SECTION))
            }
        }
    }

    /// Adds a named section unless a section with that name exists
    fn ensure_section(&mut self, section_type: &str, name: &str) {
        if !self.store.exists(&self.config, name) {
            self.store.add(&self.config, section_type, Some(name));
        }
    }

    fn set_fields(&mut self, section: &str, fvs: &[(&str, &str)]) {
        for (field, value) in fvs {
            self.store.set(&self.config, section, field, value);
        }
    }

    /// Returns the community of the first mapping section of `section_type`
    /// bound to `secname`
    fn mapped_community(&self, section_type: &str, secname: &str) -> Option<String> {
        self.store
            .find_by_field(&self.config, section_type, fields::SECNAME, secname)
            .and_then(|s| s.get(fields::COMMUNITY).map(str::to_string))
            .filter(|c| !c.is_empty())
    }

    /// Resolves a community name
    ///
    /// Looks at `option` of `section` first, then at the first com2sec and
    /// then com2sec6 section whose security name is `secname`.
    #[instrument(skip(self))]
    pub fn community_get(&self, option: &str, section: &str, secname: &str) -> Option<String> {
        self.get(section, option)
            .filter(|c| !c.is_empty())
            .or_else(|| self.mapped_community(sections::COM2SEC, secname))
            .or_else(|| self.mapped_community(sections::COM2SEC6, secname))
    }

    /// Resolves a community name, falling back to `default`
    pub fn community_cfg_value(
        &self,
        option: &str,
        section: &str,
        secname: &str,
        default: &str,
    ) -> String {
        self.community_get(option, section, secname)
            .unwrap_or_else(|| default.to_string())
    }

    /// Resolves a community source restriction
    ///
    /// Looks at `option` of `section` first, then at the `source` option of
    /// the mapping section named after `community`.
    #[instrument(skip(self))]
    pub fn community_src_get(
        &self,
        option: &str,
        section: &str,
        community: Option<&str>,
    ) -> Option<String> {
        self.get(section, option)
            .filter(|s| !s.is_empty())
            .or_else(|| community.and_then(|c| self.get(c, fields::SOURCE)))
            .filter(|s| !s.is_empty())
    }

    /// Resolves a community source restriction, falling back to `default`
    pub fn community_src_cfg_value(
        &self,
        option: &str,
        section: &str,
        community: Option<&str>,
        default: &str,
    ) -> String {
        self.community_src_get(option, section, community)
            .unwrap_or_else(|| default.to_string())
    }

    /// Deletes every section derived from a community
    ///
    /// Does nothing for an absent or empty name.
    #[instrument(skip(self))]
    pub fn community_delete(&mut self, community: Option<&str>) {
        let Some(community) = community.filter(|c| !c.is_empty()) else {
            return;
        };

        info!("Deleting sections of community {}", community);
        for suffix in suffixes::ALL {
            let name = format!("{}{}", community, suffix);
            self.store.remove(&self.config, &name);
        }
    }

    /// Creates or updates the sections of one community
    ///
    /// Re-running with the same arguments leaves the store unchanged.
    #[instrument(skip(self))]
    pub fn community_update(
        &mut self,
        community: &str,
        access: AccessLevel,
        source: &str,
        versions: SnmpVersions,
        protocols: IpProtocols,
    ) {
        let secname = access.as_str();
        info!(
            "Updating community {} ({}, source {}, versions {}, protocols {})",
            community, secname, source, versions, protocols
        );

        if versions.includes_v1v2c() {
            let mut mappings = Vec::new();
            if protocols.ipv4 {
                mappings.push((sections::COM2SEC, community.to_string()));
            }
            if protocols.ipv6 {
                mappings.push((
                    sections::COM2SEC6,
                    format!("{}{}", community, suffixes::COM2SEC6),
                ));
            }

            for (section_type, name) in mappings {
                self.ensure_section(section_type, &name);
                self.set_fields(
                    &name,
                    &[
                        (fields::SECNAME, secname),
                        (fields::SOURCE, source),
                        (fields::COMMUNITY, community),
                    ],
                );
            }

            self.update_group(community, suffixes::GROUP_V1, "v1", secname);
            self.update_group(community, suffixes::GROUP_V2C, "v2c", secname);
        }

        if versions.includes_v3() {
            self.update_group(community, suffixes::GROUP_USM, "usm", secname);
        }

        let name = format!("{}{}", community, suffixes::ACCESS);
        self.ensure_section(sections::ACCESS, &name);
        self.set_fields(
            &name,
            &[
                (fields::GROUP, community),
                (fields::CONTEXT, ACCESS_CONTEXT),
                (fields::VERSION, ACCESS_VERSION),
                (fields::LEVEL, ACCESS_LEVEL),
                (fields::PREFIX, ACCESS_PREFIX),
            ],
        );

        let (write, notify) = match access {
            AccessLevel::ReadOnly => (VIEW_NONE, VIEW_NONE),
            AccessLevel::ReadWrite => (VIEW_ALL, VIEW_ALL),
        };
        self.set_fields(
            &name,
            &[
                (fields::READ, VIEW_ALL),
                (fields::WRITE, write),
                (fields::NOTIFY, notify),
            ],
        );
    }

    fn update_group(&mut self, community: &str, suffix: &str, version: &str, secname: &str) {
        let name = format!("{}{}", community, suffix);
        self.ensure_section(sections::GROUP, &name);
        self.set_fields(
            &name,
            &[
                (fields::GROUP, community),
                (fields::VERSION, version),
                (fields::SECNAME, secname),
            ],
        );
    }

    /// Community and source of the last mapping section bound to `access`
    fn previous_binding(&self, mapping_type: &str, access: AccessLevel) -> PreviousBinding {
        self.store
            .sections_where(&self.config, mapping_type, |s| {
                s.get(fields::SECNAME) == Some(access.as_str())
            })
            .pop()
            .map(|section| PreviousBinding {
                community: section.get(fields::COMMUNITY).map(str::to_string),
                source: section.get(fields::SOURCE).map(str::to_string),
            })
            .unwrap_or_default()
    }

    /// Reconciles the community sections with the submitted settings
    ///
    /// Returns false without touching the store when either community name
    /// is empty. Otherwise rewrites each binding whose community or source
    /// changed, and both of them when the SNMP version or IP protocol
    /// changed, then returns true.
    #[instrument(skip(self))]
    pub fn communities_configure(&mut self, opts: &CommunityOptions) -> bool {
        if opts.ro_community.is_empty() || opts.rw_community.is_empty() {
            info!("Refusing to configure communities: community name is empty");
            return false;
        }

        let general = self
            .general_section()
            .unwrap_or_else(|| GENERAL_SECTION.to_string());
        let version_prev = self.get(&general, form_fields::SNMP_VERSION);
        let protocol_prev = self.get(&general, form_fields::IP_PROTOCOL);

        let mapping_type = protocol_prev
            .as_deref()
            .map(IpProtocols::parse)
            .unwrap_or_default()
            .community_section_type();

        let ro_prev = self.previous_binding(mapping_type, AccessLevel::ReadOnly);
        let rw_prev = self.previous_binding(mapping_type, AccessLevel::ReadWrite);

        let mut ro_update = ro_prev.source.as_deref() != Some(opts.ro_community_src.as_str());
        let mut rw_update = rw_prev.source.as_deref() != Some(opts.rw_community_src.as_str());

        if ro_prev.community.as_deref() != Some(opts.ro_community.as_str()) {
            self.community_delete(ro_prev.community.as_deref());
            ro_update = true;
        }

        if rw_prev.community.as_deref() != Some(opts.rw_community.as_str()) {
            self.community_delete(rw_prev.community.as_deref());
            rw_update = true;
        }

        if version_prev.as_deref() != Some(opts.snmp_version.as_str())
            || protocol_prev.as_deref() != Some(opts.ip_protocol.as_str())
        {
            debug!(
                "Version/protocol changed ({:?}/{:?} -> {}/{})",
                version_prev, protocol_prev, opts.snmp_version, opts.ip_protocol
            );
            ro_update = true;
            rw_update = true;
        }

        let versions = SnmpVersions::parse(&opts.snmp_version);
        let protocols = IpProtocols::parse(&opts.ip_protocol);

        if ro_update {
            self.community_update(
                &opts.ro_community,
                AccessLevel::ReadOnly,
                &opts.ro_community_src,
                versions,
                protocols,
            );
        }

        if rw_update {
            self.community_update(
                &opts.rw_community,
                AccessLevel::ReadWrite,
                &opts.rw_community_src,
                versions,
                protocols,
            );
        }

        if !ro_update && !rw_update {
            debug!("Communities unchanged");
        }

        true
    }

    /// Reconciles the trap sink sections with the submitted settings
    ///
    /// Afterwards at most one sink exists, of the type matching the trap
    /// version, and none when traps are disabled.
    #[instrument(skip(self))]
    pub fn traps_configure(&mut self, trap: &TrapOptions) {
        for (sink_type, version) in [(sections::TRAPSINK, "v1"), (sections::TRAP2SINK, "v2c")] {
            let existing = self.store.sections(&self.config, sink_type);
            for (index, section) in existing.iter().enumerate() {
                if index > 0 || !trap.enabled || trap.version != version {
                    debug!("Removing {} section {}", sink_type, section.name);
                    self.store.remove(&self.config, &section.name);
                }
            }
        }

        if !trap.enabled {
            return;
        }

        let sink_type = trap.sink_type();
        let sid = match self.store.get_first(&self.config, sink_type) {
            Some(section) => section.name,
            None => self.store.add(&self.config, sink_type, None),
        };

        info!("Configuring {} {} -> {}:{}", sink_type, sid, trap.host, trap.port);
        self.set_fields(
            &sid,
            &[
                (fields::COMMUNITY, trap.community.as_str()),
                (fields::HOST, trap.host.as_str()),
                (fields::PORT, trap.port.as_str()),
            ],
        );
    }

    /// Returns the listen address of the first agent section
    pub fn agent_address(&self) -> Option<String> {
        let agent = self.store.get_first(&self.config, sections::AGENT)?;
        agent
            .get(fields::AGENTADDRESS)
            .filter(|a| !a.is_empty())
            .map(str::to_string)
    }

    /// IP protocols the agent listens on, derived from its address
    pub fn agent_protocols(&self) -> Option<IpProtocols> {
        self.agent_address().map(|a| address::parse_protocols(&a))
    }

    /// Port the agent listens on, derived from its address
    pub fn agent_port(&self) -> Option<String> {
        self.agent_address().and_then(|a| address::parse_port(&a))
    }

    /// Rewrites the listen address of the first agent section
    ///
    /// Returns false when nothing was written (no protocol selected or no
    /// agent section).
    #[instrument(skip(self))]
    pub fn write_agent_address(&mut self, protocols: IpProtocols, port: u16) -> bool {
        let Some(value) = address::encode(protocols, port) else {
            return false;
        };

        match self.store.get_first(&self.config, sections::AGENT) {
            Some(agent) => {
                self.set(&agent.name, fields::AGENTADDRESS, &value);
                true
            }
            None => {
                debug!("No agent section, listen address not written");
                false
            }
        }
    }

    /// Returns the AgentX socket path
    pub fn agentx_socket(&self) -> Option<String> {
        let agentx = self.store.get_first(&self.config, sections::AGENTX)?;
        agentx
            .get(fields::AGENTXSOCKET)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Sets the AgentX socket path, creating the agentx section if needed
    pub fn set_agentx_socket(&mut self, socket: &str) {
        let sid = match self.store.get_first(&self.config, sections::AGENTX) {
            Some(section) => section.name,
            None => self.store.add(&self.config, sections::AGENTX, None),
        };
        self.set(&sid, fields::AGENTXSOCKET, socket);
    }

    /// Disables AgentX by removing the agentx section
    pub fn remove_agentx(&mut self) {
        if let Some(section) = self.store.get_first(&self.config, sections::AGENTX) {
            info!("Removing agentx section {}", section.name);
            self.store.remove(&self.config, &section.name);
        }
    }

    /// Returns an option of the first system section
    pub fn system_option(&self, option: &str) -> Option<String> {
        let system = self.store.get_first(&self.config, sections::SYSTEM)?;
        system.get(option).map(str::to_string)
    }

    /// Sets an option of the first system section, creating it if needed
    pub fn set_system_option(&mut self, option: &str, value: &str) {
        let sid = match self.store.get_first(&self.config, sections::SYSTEM) {
            Some(section) => section.name,
            None => self.store.add(&self.config, sections::SYSTEM, None),
        };
        self.set(&sid, option, value);
    }

    /// Removes an option of the first system section
    pub fn unset_system_option(&mut self, option: &str) {
        if let Some(section) = self.store.get_first(&self.config, sections::SYSTEM) {
            self.unset(&section.name, option);
        }
    }
}

/// CfgMgr trait implementation
impl<S: SectionStore> CfgMgr for SnmpdMgr<S> {
    fn daemon_name(&self) -> &str {
        "snmpd"
    }

    fn config_name(&self) -> &str {
        &self.config
    }

    fn section_types(&self) -> &[&str] {
        &[
            sections::SNMPD,
            sections::AGENT,
            sections::AGENTX,
            sections::COM2SEC,
            sections::COM2SEC6,
            sections::GROUP,
            sections::ACCESS,
            sections::TRAPSINK,
            sections::TRAP2SINK,
            sections::SYSTEM,
        ]
    }
}
