//! Section store abstraction.
//!
//! Configuration lives in packages (e.g. `snmpd`) made of typed sections.
//! A section is either named (`config com2sec 'public'`) or anonymous
//! (`config agent`), in which case the store generates an id for it.
//! Sections hold ordered options.
//!
//! [`SectionStore`] is the interface managers program against;
//! [`MemoryStore`] is the in-memory implementation backing the UCI codec
//! and the tests.

use std::collections::BTreeMap;
use tracing::debug;

use crate::manager::{FieldValues, FieldValuesExt};

/// A section snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Section name, generated for anonymous sections.
    pub name: String,
    /// Section type (`com2sec`, `agent`, ...).
    pub section_type: String,
    /// Whether the name was generated by the store.
    pub anonymous: bool,
    /// Options in insertion order.
    pub options: FieldValues,
    /// `list` entries, kept verbatim for round trips.
    pub lists: FieldValues,
}

impl Section {
    /// Creates an empty section.
    pub fn new(name: impl Into<String>, section_type: impl Into<String>, anonymous: bool) -> Self {
        Self {
            name: name.into(),
            section_type: section_type.into(),
            anonymous,
            options: FieldValues::new(),
            lists: FieldValues::new(),
        }
    }

    /// Gets an option value.
    pub fn get(&self, option: &str) -> Option<&str> {
        self.options.get_field(option)
    }
}

/// Ordered collection of sections of one package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Package {
    sections: Vec<Section>,
}

impl Package {
    /// Returns all sections in file order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Appends a section.
    ///
    /// A section with the same name as an existing one is merged into it:
    /// its options override, its list entries are appended and the
    /// existing type and position are kept.
    pub fn push(&mut self, section: Section) {
        match self.sections.iter_mut().find(|s| s.name == section.name) {
            Some(existing) => {
                for (option, value) in &section.options {
                    existing.options.set_field(option, value);
                }
                existing.lists.extend(section.lists);
            }
            None => self.sections.push(section),
        }
    }

    fn find(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.name == name)
    }
}

/// Key-value section store.
///
/// Mutations are infallible: setting an option on a missing section and
/// removing a missing section are silent no-ops.
pub trait SectionStore {
    /// Gets an option value.
    fn get(&self, config: &str, section: &str, option: &str) -> Option<String>;

    /// Returns the type of a section, or `None` if it does not exist.
    fn section_type(&self, config: &str, section: &str) -> Option<String>;

    /// Returns the first section of a type.
    fn get_first(&self, config: &str, section_type: &str) -> Option<Section>;

    /// Returns a snapshot of all sections of a type, in store order.
    fn sections(&self, config: &str, section_type: &str) -> Vec<Section>;

    /// Sets an option value.
    fn set(&mut self, config: &str, section: &str, option: &str, value: &str);

    /// Removes an option.
    fn unset(&mut self, config: &str, section: &str, option: &str);

    /// Adds a section and returns its id.
    ///
    /// With `name` the section is named; if a section with that name
    /// already exists it is kept as is. Without a name an id is generated.
    fn add(&mut self, config: &str, section_type: &str, name: Option<&str>) -> String;

    /// Removes a section.
    fn remove(&mut self, config: &str, section: &str);

    /// Returns true if the section exists.
    fn exists(&self, config: &str, section: &str) -> bool {
        self.section_type(config, section).is_some()
    }

    /// Returns the sections of a type accepted by a predicate.
    fn sections_where<P>(&self, config: &str, section_type: &str, mut predicate: P) -> Vec<Section>
    where
        Self: Sized,
        P: FnMut(&Section) -> bool,
    {
        self.sections(config, section_type)
            .into_iter()
            .filter(|s| predicate(s))
            .collect()
    }

    /// Returns the first section of a type whose option equals `value`.
    fn find_by_field(
        &self,
        config: &str,
        section_type: &str,
        field: &str,
        value: &str,
    ) -> Option<Section>
    where
        Self: Sized,
    {
        self.sections(config, section_type)
            .into_iter()
            .find(|s| s.get(field) == Some(value))
    }
}

/// In-memory section store holding any number of packages.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    packages: BTreeMap<String, Package>,
    next_anonymous: u32,
    revision: u64,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a package, replacing any previous content.
    pub fn insert_package(&mut self, config: impl Into<String>, package: Package) {
        self.packages.insert(config.into(), package);
    }

    /// Returns a package.
    pub fn package(&self, config: &str) -> Option<&Package> {
        self.packages.get(config)
    }

    /// Returns a counter bumped on every effective mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Generates an id for an anonymous section, unique within the package.
    fn anonymous_id(&mut self, config: &str) -> String {
        loop {
            self.next_anonymous += 1;
            let id = format!("cfg{:06x}", self.next_anonymous);
            if !self.exists(config, &id) {
                return id;
            }
        }
    }

    fn section_mut(&mut self, config: &str, section: &str) -> Option<&mut Section> {
        self.packages
            .get_mut(config)
            .and_then(|p| p.find_mut(section))
    }
}

impl SectionStore for MemoryStore {
    fn get(&self, config: &str, section: &str, option: &str) -> Option<String> {
        self.packages
            .get(config)?
            .find(section)?
            .get(option)
            .map(str::to_string)
    }

    fn section_type(&self, config: &str, section: &str) -> Option<String> {
        self.packages
            .get(config)?
            .find(section)
            .map(|s| s.section_type.clone())
    }

    fn get_first(&self, config: &str, section_type: &str) -> Option<Section> {
        self.packages
            .get(config)?
            .sections
            .iter()
            .find(|s| s.section_type == section_type)
            .cloned()
    }

    fn sections(&self, config: &str, section_type: &str) -> Vec<Section> {
        self.packages
            .get(config)
            .map(|p| {
                p.sections
                    .iter()
                    .filter(|s| s.section_type == section_type)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn set(&mut self, config: &str, section: &str, option: &str, value: &str) {
        let changed = match self.section_mut(config, section) {
            Some(s) if s.get(option) == Some(value) => false,
            Some(s) => {
                s.options.set_field(option, value);
                true
            }
            None => {
                debug!(config, section, option, "Ignoring set on missing section");
                false
            }
        };

        if changed {
            self.revision += 1;
        }
    }

    fn unset(&mut self, config: &str, section: &str, option: &str) {
        let removed = self
            .section_mut(config, section)
            .map(|s| s.options.remove_field(option))
            .unwrap_or(false);

        if removed {
            self.revision += 1;
        }
    }

    fn add(&mut self, config: &str, section_type: &str, name: Option<&str>) -> String {
        let (id, anonymous) = match name {
            Some(name) if self.exists(config, name) => {
                debug!(config, section = name, "Section already exists");
                return name.to_string();
            }
            Some(name) => (name.to_string(), false),
            None => (self.anonymous_id(config), true),
        };

        debug!(config, section = %id, section_type, "Adding section");
        self.packages
            .entry(config.to_string())
            .or_default()
            .sections
            .push(Section::new(id.clone(), section_type, anonymous));
        self.revision += 1;
        id
    }

    fn remove(&mut self, config: &str, section: &str) {
        let Some(package) = self.packages.get_mut(config) else {
            return;
        };

        let before = package.sections.len();
        package.sections.retain(|s| s.name != section);
        if package.sections.len() != before {
            debug!(config, section, "Removed section");
            self.revision += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_named_and_get() {
        let mut store = MemoryStore::new();
        let id = store.add("snmpd", "com2sec", Some("public"));
        assert_eq!(id, "public");

        store.set("snmpd", "public", "secname", "ro");
        assert_eq!(store.get("snmpd", "public", "secname").as_deref(), Some("ro"));
        assert_eq!(store.section_type("snmpd", "public").as_deref(), Some("com2sec"));
        assert!(store.exists("snmpd", "public"));
        assert!(!store.exists("snmpd", "private"));
    }

    #[test]
    fn test_add_existing_name_keeps_section() {
        let mut store = MemoryStore::new();
        store.add("snmpd", "com2sec", Some("public"));
        store.set("snmpd", "public", "source", "default");
        let revision = store.revision();

        let id = store.add("snmpd", "group", Some("public"));
        assert_eq!(id, "public");
        assert_eq!(store.section_type("snmpd", "public").as_deref(), Some("com2sec"));
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_add_anonymous_generates_unique_ids() {
        let mut store = MemoryStore::new();
        let a = store.add("snmpd", "trapsink", None);
        let b = store.add("snmpd", "trapsink", None);
        assert_ne!(a, b);
        assert!(a.starts_with("cfg"));

        let sections = store.sections("snmpd", "trapsink");
        assert_eq!(sections.len(), 2);
        assert!(sections.iter().all(|s| s.anonymous));
    }

    #[test]
    fn test_sections_preserve_order_and_filter_by_type() {
        let mut store = MemoryStore::new();
        store.add("snmpd", "com2sec", Some("public"));
        store.add("snmpd", "group", Some("public_v1"));
        store.add("snmpd", "com2sec", Some("private"));

        let names: Vec<_> = store
            .sections("snmpd", "com2sec")
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["public", "private"]);
        assert_eq!(store.get_first("snmpd", "group").map(|s| s.name).as_deref(), Some("public_v1"));
        assert!(store.get_first("snmpd", "agent").is_none());
        assert!(store.sections("missing", "agent").is_empty());
    }

    #[test]
    fn test_sections_where_and_find_by_field() {
        let mut store = MemoryStore::new();
        for (name, secname) in [("public", "ro"), ("private", "rw")] {
            store.add("snmpd", "com2sec", Some(name));
            store.set("snmpd", name, "secname", secname);
        }

        let rw = store.sections_where("snmpd", "com2sec", |s| s.get("secname") == Some("rw"));
        assert_eq!(rw.len(), 1);
        assert_eq!(rw[0].name, "private");

        let ro = store.find_by_field("snmpd", "com2sec", "secname", "ro");
        assert_eq!(ro.map(|s| s.name).as_deref(), Some("public"));
        assert!(store.find_by_field("snmpd", "com2sec", "secname", "usm").is_none());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut store = MemoryStore::new();
        store.add("snmpd", "agent", None);
        let revision = store.revision();

        store.remove("snmpd", "nonexistent");
        store.remove("other", "nonexistent");
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_set_on_missing_section_is_ignored() {
        let mut store = MemoryStore::new();
        store.set("snmpd", "general", "enabled", "1");
        assert_eq!(store.revision(), 0);
        assert!(store.get("snmpd", "general", "enabled").is_none());
    }

    #[test]
    fn test_revision_tracks_effective_changes() {
        let mut store = MemoryStore::new();
        store.add("snmpd", "snmpd", Some("general"));
        store.set("snmpd", "general", "enabled", "1");
        let revision = store.revision();

        store.set("snmpd", "general", "enabled", "1");
        store.unset("snmpd", "general", "missing");
        assert_eq!(store.revision(), revision);

        store.unset("snmpd", "general", "enabled");
        assert_eq!(store.revision(), revision + 1);
    }
}
