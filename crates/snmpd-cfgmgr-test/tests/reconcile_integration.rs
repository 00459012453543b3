//! Reconciliation integration tests
//!
//! Drives the form and the reconciler against complete snmpd packages

use pretty_assertions::assert_eq;

use snmpd_cfgmgr::{CommunityOptions, FormValues, MibFile, ServiceCtl, SnmpdMgr, SNMPD_CONFIG};
use snmpd_cfgmgr_common::{CfgMgrError, MemoryStore, Section, SectionStore};
use snmpd_cfgmgr_test::{
    fixtures::{form_fixtures, package_fixtures, section_fixtures},
    CommandVerifier, StoreVerifier, UciTestEnv,
};

fn submit(mgr: &mut SnmpdMgr<MemoryStore>, patch: FormValues) -> Result<(), CfgMgrError> {
    let mut values = FormValues::load(&*mgr);
    values.merge(patch);
    values.apply(mgr).map(|_| ())
}

fn daemon_sections(mgr: &SnmpdMgr<MemoryStore>) -> Vec<Section> {
    mgr.store()
        .package(SNMPD_CONFIG)
        .map(|p| p.sections().to_vec())
        .unwrap_or_default()
        .into_iter()
        .filter(|s| s.section_type != "snmpd")
        .collect()
}

/// Applying the form unchanged over a stock package only records the
/// form's own options
#[test]
fn test_unchanged_submit_keeps_daemon_sections() {
    let env = UciTestEnv::with_snmpd(package_fixtures::OPENWRT_DEFAULT_SNMPD).unwrap();
    let mut mgr = env.load_mgr().unwrap();
    let before = daemon_sections(&mgr);

    submit(&mut mgr, FormValues::new()).unwrap();

    assert_eq!(daemon_sections(&mgr), before);
    let verifier = StoreVerifier::new(mgr.store(), SNMPD_CONFIG);
    verifier
        .assert_options(
            "general",
            &[
                ("enabled", "1"),
                ("ip_protocol", "ipv4/ipv6"),
                ("snmp_port", "161"),
                ("snmp_version", "v1/v2c"),
                ("trap_enabled", "0"),
            ],
        )
        .unwrap();
}

/// Scenario:
/// 1. Load the stock package (public/private on both families)
/// 2. Rename both communities
/// 3. Verify the old sections are gone and the new ones are complete
#[test]
fn test_rename_communities() {
    let env = UciTestEnv::with_snmpd(package_fixtures::OPENWRT_DEFAULT_SNMPD).unwrap();
    let mut mgr = env.load_mgr().unwrap();

    submit(&mut mgr, form_fixtures::communities("monitor", "admin")).unwrap();

    let verifier = StoreVerifier::new(mgr.store(), SNMPD_CONFIG);
    verifier.assert_community_deleted("public").unwrap();
    verifier.assert_community_deleted("private").unwrap();
    verifier
        .assert_community("monitor", "ro", "default", true, true)
        .unwrap();
    verifier
        .assert_community("admin", "rw", "localhost", true, true)
        .unwrap();
    verifier.assert_section_count("com2sec", 2).unwrap();
    verifier.assert_section_count("com2sec6", 2).unwrap();
    verifier.assert_section_count("view", 1).unwrap();

    env.save(&mgr).unwrap();
    let reloaded = FormValues::load(&env.load_mgr().unwrap());
    assert_eq!(reloaded.get("ro_community"), "monitor");
    assert_eq!(reloaded.get("rw_community"), "admin");
}

/// Changing only the IP protocol rewrites both bindings
#[test]
fn test_protocol_change_adds_ipv6_mappings() {
    let mut store = MemoryStore::new();
    for change in [
        section_fixtures::agent("UDP:161"),
        section_fixtures::general("v1/v2c", "ipv4"),
        section_fixtures::com2sec("public", "ro", "default"),
        section_fixtures::com2sec("private", "rw", "localhost"),
    ] {
        change.apply(&mut store, SNMPD_CONFIG);
    }
    let mut mgr = SnmpdMgr::new(store);

    let configured = mgr.communities_configure(&CommunityOptions {
        ro_community: "public".to_string(),
        ro_community_src: "default".to_string(),
        rw_community: "private".to_string(),
        rw_community_src: "localhost".to_string(),
        snmp_version: "v1/v2c".to_string(),
        ip_protocol: "ipv4/ipv6".to_string(),
    });
    assert!(configured);

    let verifier = StoreVerifier::new(mgr.store(), SNMPD_CONFIG);
    verifier.assert_section_count("com2sec", 2).unwrap();
    verifier.assert_section_count("com2sec6", 2).unwrap();
    verifier
        .assert_community("public", "ro", "default", true, true)
        .unwrap();
    verifier
        .assert_community("private", "rw", "localhost", true, true)
        .unwrap();
}

/// Scenario:
/// 1. Enable v1 traps, then switch to v2c
/// 2. Add a stray second sink and resubmit
/// 3. Disable traps
#[test]
fn test_trap_sink_lifecycle() {
    let env = UciTestEnv::with_snmpd(package_fixtures::OPENWRT_DEFAULT_SNMPD).unwrap();
    let mut mgr = env.load_mgr().unwrap();

    submit(&mut mgr, form_fixtures::traps("v1", "10.0.0.1")).unwrap();
    {
        let verifier = StoreVerifier::new(mgr.store(), SNMPD_CONFIG);
        verifier.assert_section_count("trapsink", 1).unwrap();
        verifier.assert_section_count("trap2sink", 0).unwrap();
    }

    submit(&mut mgr, form_fixtures::traps("v2c", "10.0.0.1")).unwrap();
    mgr.store_mut().add(SNMPD_CONFIG, "trap2sink", None);
    submit(&mut mgr, FormValues::new()).unwrap();
    {
        let verifier = StoreVerifier::new(mgr.store(), SNMPD_CONFIG);
        verifier.assert_section_count("trapsink", 0).unwrap();
        verifier.assert_section_count("trap2sink", 1).unwrap();
        let sink = mgr.store().get_first(SNMPD_CONFIG, "trap2sink").unwrap();
        verifier
            .assert_options(
                &sink.name,
                &[("host", "10.0.0.1"), ("port", "162"), ("community", "public")],
            )
            .unwrap();
    }

    submit(&mut mgr, form_fixtures::traps_disabled()).unwrap();
    let verifier = StoreVerifier::new(mgr.store(), SNMPD_CONFIG);
    verifier.assert_section_count("trapsink", 0).unwrap();
    verifier.assert_section_count("trap2sink", 0).unwrap();
    verifier.assert_option("general", "trap_enabled", "0").unwrap();
}

#[test]
fn test_listen_address_follows_protocol_and_port() {
    let env = UciTestEnv::with_snmpd(package_fixtures::OPENWRT_DEFAULT_SNMPD).unwrap();
    let mut mgr = env.load_mgr().unwrap();

    submit(&mut mgr, form_fixtures::listen("ipv6", "1161")).unwrap();

    assert_eq!(mgr.agent_address().as_deref(), Some("UDP6:1161"));
    let values = FormValues::load(&mgr);
    assert_eq!(values.get("ip_protocol"), "ipv6");
    assert_eq!(values.get("snmp_port"), "1161");
}

#[test]
fn test_invalid_submit_leaves_package_untouched() {
    let env = UciTestEnv::with_snmpd(package_fixtures::OPENWRT_DEFAULT_SNMPD).unwrap();
    let mut mgr = env.load_mgr().unwrap();
    let revision = mgr.store().revision();

    let mut patch = form_fixtures::communities("monitor", "admin");
    patch.set("snmp_port", "not-a-port");
    let err = submit(&mut mgr, patch).unwrap_err();

    assert!(matches!(err, CfgMgrError::Validation(ref errors) if errors.len() == 1));
    assert!(err.is_user_error());
    assert_eq!(mgr.store().revision(), revision);
    StoreVerifier::new(mgr.store(), SNMPD_CONFIG)
        .assert_community_deleted("monitor")
        .unwrap();
}

#[tokio::test]
async fn test_save_and_reload() {
    let env = UciTestEnv::with_snmpd(package_fixtures::OPENWRT_DEFAULT_SNMPD).unwrap();
    let mut mgr = env.load_mgr().unwrap();
    submit(&mut mgr, form_fixtures::enable_service()).unwrap();
    env.save(&mgr).unwrap();

    let mut service = ServiceCtl::default().with_mock_mode();
    service.reload().await.unwrap();

    let verifier = CommandVerifier::new(service.captured_commands());
    verifier.assert_count(1).unwrap();
    verifier
        .assert_captured("\"/etc/init.d/snmpd\" \"reload\"")
        .unwrap();

    let saved = env.read_package(SNMPD_CONFIG).unwrap();
    assert!(saved.contains("config snmpd 'general'"));
    assert!(saved.contains("\toption snmp_version 'v1/v2c'"));
}

#[test]
fn test_mib_download() {
    let env = UciTestEnv::with_snmpd(package_fixtures::OPENWRT_DEFAULT_SNMPD).unwrap();
    env.write_package(
        "luci_snmpd",
        &package_fixtures::luci_snmpd("/usr/share/snmp/mibs/TANO-MIB.txt"),
    )
    .unwrap();
    env.write_file("/usr/share/snmp/mibs/TANO-MIB.txt", &[b'm'; 2048])
        .unwrap();

    let store = env.load_store().unwrap();
    let mib = MibFile::locate(&store, env.root()).unwrap();
    assert_eq!(mib.file_name(), "TANO-MIB.txt");
    assert_eq!(mib.size_label(), "2.00 KiB");

    let out = env.root().join("download");
    let dest = mib.download_to(&out).unwrap();
    assert_eq!(std::fs::read(dest).unwrap().len(), 2048);
}
