//! UCI package persistence tests
//!
//! Verifies that packages survive parse/export and save/load cycles with
//! form edits in between

use std::path::Path;

use pretty_assertions::assert_eq;

use snmpd_cfgmgr::{FormValues, SNMPD_CONFIG};
use snmpd_cfgmgr_common::{uci, SectionStore};
use snmpd_cfgmgr_test::{
    fixtures::{form_fixtures, package_fixtures},
    StoreVerifier, UciTestEnv,
};

#[test]
fn test_stock_package_export_is_stable() {
    let path = Path::new("/etc/config/snmpd");
    let package = uci::parse_package(path, package_fixtures::OPENWRT_DEFAULT_SNMPD).unwrap();
    assert_eq!(package.sections().len(), 19);

    let exported = uci::export_package(&package);
    let reparsed = uci::parse_package(path, &exported).unwrap();
    assert_eq!(uci::export_package(&reparsed), exported);

    assert!(exported.contains("\nconfig snmpd 'general'\n\toption enabled '1'\n\tlist network 'wan'\n"));
    assert!(exported.contains("\nconfig agent\n\toption agentaddress 'UDP:161,UDP6:161'\n"));
}

#[test]
fn test_save_load_preserves_unmanaged_sections() {
    let env = UciTestEnv::with_snmpd(package_fixtures::OPENWRT_DEFAULT_SNMPD).unwrap();
    let mut mgr = env.load_mgr().unwrap();

    let mut values = FormValues::load(&mgr);
    values.merge(form_fixtures::communities("monitor", "admin"));
    values.apply(&mut mgr).unwrap();
    env.save(&mgr).unwrap();

    let reloaded = env.load_mgr().unwrap();
    let verifier = StoreVerifier::new(reloaded.store(), SNMPD_CONFIG);
    verifier.assert_section("all", "view").unwrap();
    verifier.assert_option("all", "oid", ".1").unwrap();
    verifier.assert_section_count("exec", 1).unwrap();
    verifier.assert_section_count("engineid", 1).unwrap();
    verifier
        .assert_community("monitor", "ro", "default", true, true)
        .unwrap();

    let general = reloaded
        .store()
        .sections(SNMPD_CONFIG, "snmpd")
        .into_iter()
        .next()
        .unwrap();
    assert_eq!(
        general.lists,
        vec![("network".to_string(), "wan".to_string())]
    );

    assert_eq!(FormValues::load(&reloaded), FormValues::load(&mgr));
}

#[test]
fn test_quoted_values_survive_save() {
    let env = UciTestEnv::with_snmpd(package_fixtures::OPENWRT_DEFAULT_SNMPD).unwrap();
    let mut mgr = env.load_mgr().unwrap();

    let mut values = FormValues::load(&mgr);
    values.set("sysLocation", "Bob's rack");
    values.set("sysContact", "noc \"24/7\"");
    values.apply(&mut mgr).unwrap();
    env.save(&mgr).unwrap();

    let saved = env.read_package(SNMPD_CONFIG).unwrap();
    assert!(saved.contains("\toption sysLocation 'Bob'\\''s rack'\n"), "{}", saved);

    let reloaded = env.load_mgr().unwrap();
    assert_eq!(
        reloaded.system_option("sysLocation").as_deref(),
        Some("Bob's rack")
    );
    assert_eq!(
        reloaded.system_option("sysContact").as_deref(),
        Some("noc \"24/7\"")
    );
    assert_eq!(reloaded.system_option("sysName").as_deref(), Some("HeartOfGold"));
}

#[test]
fn test_missing_package_starts_empty() {
    let env = UciTestEnv::new().unwrap();
    let mut mgr = env.load_mgr().unwrap();

    let values = FormValues::load(&mgr);
    assert_eq!(values.get("enabled"), "0");
    assert_eq!(values.get("ro_community"), "public");

    let mut values = values;
    values.merge(form_fixtures::enable_service());
    let summary = values.apply(&mut mgr).unwrap();
    assert!(summary.enabled_persisted);

    env.save(&mgr).unwrap();
    let reloaded = env.load_mgr().unwrap();
    let verifier = StoreVerifier::new(reloaded.store(), SNMPD_CONFIG);
    verifier.assert_option("general", "enabled", "1").unwrap();
    verifier
        .assert_community("public", "ro", "default", true, false)
        .unwrap();
    verifier.assert_section_count("com2sec6", 0).unwrap();
    // No agent section, so the listen address is not written
    verifier.assert_section_count("agent", 0).unwrap();
}
