//! UCI text format codec.
//!
//! Reads and writes packages in the format used under `/etc/config`:
//!
//! ```text
//! config agent
//! 	option agentaddress 'UDP:161,UDP6:161'
//!
//! config com2sec 'public'
//! 	option secname 'ro'
//! 	option source 'default'
//! 	option community 'public'
//! ```
//!
//! Values may be single-quoted, double-quoted (with backslash escapes) or
//! bare; adjacent quoted parts concatenate (`'it'\''s'`).

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{CfgMgrError, CfgMgrResult};
use crate::manager::FieldValuesExt;
use crate::store::{MemoryStore, Package, Section};

/// Splits one line into words, honouring quotes and comments.
fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current: Option<String> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if let Some(word) = current.take() {
                    words.push(word);
                }
            }
            '#' if current.is_none() => break,
            '\'' => {
                let word = current.get_or_insert_with(String::new);
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => word.push(c),
                        None => return Err("unterminated single quote".to_string()),
                    }
                }
            }
            '"' => {
                let word = current.get_or_insert_with(String::new);
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(c) => word.push(c),
                            None => return Err("dangling escape".to_string()),
                        },
                        Some(c) => word.push(c),
                        None => return Err("unterminated double quote".to_string()),
                    }
                }
            }
            '\\' => match chars.next() {
                Some(c) => current.get_or_insert_with(String::new).push(c),
                None => return Err("dangling escape".to_string()),
            },
            c => current.get_or_insert_with(String::new).push(c),
        }
    }

    if let Some(word) = current {
        words.push(word);
    }
    Ok(words)
}

/// Generates the name of the `index`-th anonymous section, in the spirit
/// of libuci's `cfgXXYYYY` ids.
fn anonymous_name(index: usize, section_type: &str) -> String {
    let hash = section_type
        .bytes()
        .fold(0u16, |acc, b| acc.rotate_left(5) ^ u16::from(b));
    format!("cfg{:02x}{:04x}", index & 0xff, hash)
}

/// Parses the text of a package.
///
/// `path` is only used for error messages.
pub fn parse_package(path: &Path, text: &str) -> CfgMgrResult<Package> {
    let mut package = Package::default();
    let mut current: Option<Section> = None;
    let mut anonymous_count = 0usize;

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let words = tokenize(line).map_err(|msg| CfgMgrError::parse(path, line_no, msg))?;
        let Some(keyword) = words.first() else {
            continue;
        };

        match (keyword.as_str(), words.len()) {
            ("package", 2) => {}
            ("config", 2) | ("config", 3) => {
                if let Some(section) = current.take() {
                    package.push(section);
                }

                let section_type = &words[1];
                current = Some(match words.get(2) {
                    Some(name) => Section::new(name.clone(), section_type.clone(), false),
                    None => {
                        let mut name = anonymous_name(anonymous_count, section_type);
                        while package.sections().iter().any(|s| s.name == name) {
                            anonymous_count += 1;
                            name = anonymous_name(anonymous_count, section_type);
                        }
                        anonymous_count += 1;
                        Section::new(name, section_type.clone(), true)
                    }
                });
            }
            ("option", 3) | ("list", 3) => {
                let section = current.as_mut().ok_or_else(|| {
                    CfgMgrError::parse(path, line_no, format!("'{}' outside of a section", keyword))
                })?;

                if keyword == "option" {
                    section.options.set_field(&words[1], &words[2]);
                } else {
                    section.lists.push((words[1].clone(), words[2].clone()));
                }
            }
            _ => {
                return Err(CfgMgrError::parse(
                    path,
                    line_no,
                    format!("unexpected statement '{}'", line.trim()),
                ));
            }
        }
    }

    if let Some(section) = current {
        package.push(section);
    }

    Ok(package)
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// Serializes a package.
pub fn export_package(package: &Package) -> String {
    let mut out = String::new();

    for section in package.sections() {
        out.push('\n');
        out.push_str("config ");
        out.push_str(&section.section_type);
        if !section.anonymous {
            out.push(' ');
            out.push_str(&quote(&section.name));
        }
        out.push('\n');

        for (option, value) in &section.options {
            out.push_str(&format!("\toption {} {}\n", option, quote(value)));
        }
        for (option, value) in &section.lists {
            out.push_str(&format!("\tlist {} {}\n", option, quote(value)));
        }
    }

    out
}

fn package_path(dir: &Path, config: &str) -> PathBuf {
    dir.join(config)
}

/// Loads `<dir>/<config>` into the store.
///
/// Returns false when the file does not exist; the package is then left
/// empty.
pub fn load_package(store: &mut MemoryStore, dir: &Path, config: &str) -> CfgMgrResult<bool> {
    let path = package_path(dir, config);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "Package file not found");
            store.insert_package(config, Package::default());
            return Ok(false);
        }
        Err(e) => return Err(CfgMgrError::io(path, e)),
    };

    let package = parse_package(&path, &text)?;
    info!(
        path = %path.display(),
        sections = package.sections().len(),
        "Loaded package"
    );
    store.insert_package(config, package);
    Ok(true)
}

/// Writes the package back to `<dir>/<config>`.
///
/// The content goes to a temporary file first and is renamed into place.
pub fn save_package(store: &MemoryStore, dir: &Path, config: &str) -> CfgMgrResult<()> {
    let package = store
        .package(config)
        .ok_or_else(|| CfgMgrError::section_not_found(config, "*"))?;

    let path = package_path(dir, config);
    let tmp = dir.join(format!(".{}.tmp", config));
    fs::write(&tmp, export_package(package)).map_err(|e| CfgMgrError::io(&tmp, e))?;
    fs::rename(&tmp, &path).map_err(|e| CfgMgrError::io(&path, e))?;

    info!(path = %path.display(), "Saved package");
    Ok(())
}
