//! Configuration manager trait and common abstractions.
//!
//! This module provides the base trait for configuration managers that
//! translate settings edited in a form into the section layout a daemon's
//! configuration loader expects.

/// Default locations and names used by the managers.
pub mod defaults {
    /// Directory holding UCI packages.
    pub const CONFIG_DIR: &str = "/etc/config";

    /// Package holding the snmpd daemon configuration.
    pub const SNMPD_CONFIG: &str = "snmpd";

    /// Package holding settings of the web form itself.
    pub const FORM_CONFIG: &str = "luci_snmpd";

    /// Init script used to reload the daemon after a commit.
    pub const SNMPD_INIT_SCRIPT: &str = "/etc/init.d/snmpd";
}

/// Base trait for configuration managers.
///
/// A manager owns one package of a section store and knows which section
/// types it reads and writes.
///
/// # Example
///
/// ```ignore
/// use snmpd_cfgmgr_common::CfgMgr;
///
/// struct MyMgr;
///
/// impl CfgMgr for MyMgr {
///     fn daemon_name(&self) -> &str { "mydaemon" }
///     fn config_name(&self) -> &str { "mydaemon" }
///     fn section_types(&self) -> &[&str] { &["agent"] }
/// }
/// ```
pub trait CfgMgr {
    /// Returns the name of the daemon consuming the configuration.
    ///
    /// This is used for logging and service control.
    fn daemon_name(&self) -> &str;

    /// Returns the package this manager reads and writes.
    fn config_name(&self) -> &str;

    /// Returns the section types this manager may create or modify.
    fn section_types(&self) -> &[&str];

    /// Returns true if the manager may touch sections of the given type.
    fn manages(&self, section_type: &str) -> bool {
        self.section_types().contains(&section_type)
    }
}

/// Key-value tuple representing an option and its value.
pub type FieldValue = (String, String);

/// Collection of option-value pairs for a section.
pub type FieldValues = Vec<FieldValue>;

/// Helper trait for working with field-value collections.
pub trait FieldValuesExt {
    /// Gets the value for a field, if present.
    fn get_field(&self, field: &str) -> Option<&str>;

    /// Sets a field, replacing an existing value in place.
    fn set_field(&mut self, field: &str, value: &str);

    /// Removes a field. Returns true if it was present.
    fn remove_field(&mut self, field: &str) -> bool;
}

impl FieldValuesExt for FieldValues {
    fn get_field(&self, field: &str) -> Option<&str> {
        self.iter()
            .find(|(f, _)| f == field)
            .map(|(_, v)| v.as_str())
    }

    fn set_field(&mut self, field: &str, value: &str) {
        match self.iter_mut().find(|(f, _)| f == field) {
            Some((_, v)) => *v = value.to_string(),
            None => self.push((field.to_string(), value.to_string())),
        }
    }

    fn remove_field(&mut self, field: &str) -> bool {
        let before = self.len();
        self.retain(|(f, _)| f != field);
        self.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestMgr;

    impl CfgMgr for TestMgr {
        fn daemon_name(&self) -> &str {
            "testd"
        }

        fn config_name(&self) -> &str {
            "testd"
        }

        fn section_types(&self) -> &[&str] {
            &["agent", "system"]
        }
    }

    #[test]
    fn test_cfgmgr_manages() {
        let mgr = TestMgr;
        assert!(mgr.manages("agent"));
        assert!(!mgr.manages("com2sec"));
    }

    #[test]
    fn test_field_values_ext() {
        let fvs: FieldValues = vec![
            ("secname".to_string(), "ro".to_string()),
            ("source".to_string(), "default".to_string()),
        ];

        assert_eq!(fvs.get_field("secname"), Some("ro"));
        assert_eq!(fvs.get_field("source"), Some("default"));
        assert_eq!(fvs.get_field("nonexistent"), None);
    }

    #[test]
    fn test_set_and_remove_field() {
        let mut fvs = FieldValues::new();
        fvs.set_field("host", "localhost");
        fvs.set_field("port", "162");

        fvs.set_field("host", "10.0.0.1");
        fvs.set_field("community", "public");
        assert_eq!(fvs.len(), 3);
        assert_eq!(fvs[0], ("host".to_string(), "10.0.0.1".to_string()));
        assert_eq!(fvs.get_field("community"), Some("public"));

        assert!(fvs.remove_field("port"));
        assert!(!fvs.remove_field("port"));
        assert_eq!(fvs.len(), 2);
    }
}
