//! MIB file offered for download by the settings form

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use snmpd_cfgmgr_common::{CfgMgrError, CfgMgrResult, SectionStore};

use crate::form_config;

const SIZE_UNITS: [&str; 5] = ["", "Ki", "Mi", "Gi", "Ti"];

/// A MIB file present on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MibFile {
    path: PathBuf,
    size: u64,
}

impl MibFile {
    /// Finds the configured MIB file below `root`
    ///
    /// Returns `None` when no file is configured or it cannot be read.
    pub fn locate<S: SectionStore>(store: &S, root: &Path) -> Option<Self> {
        let configured = store
            .get(form_config::CONFIG, form_config::SECTION, form_config::DOWNLOAD_MIB)
            .filter(|p| !p.is_empty())?;

        let path = root.join(configured.trim_start_matches('/'));
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => Some(Self {
                path,
                size: meta.len(),
            }),
            Ok(_) => {
                debug!("MIB path {} is not a file", path.display());
                None
            }
            Err(e) => {
                debug!("MIB file {} unavailable: {}", path.display(), e);
                None
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// File name without directories
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Size with base-1024 units, e.g. `1.50 KiB`
    pub fn size_label(&self) -> String {
        let mut value = self.size as f64;
        let mut unit = 0;
        while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
            value /= 1024.0;
            unit += 1;
        }
        format!("{:.2} {}B", value, SIZE_UNITS[unit])
    }

    /// Copies the file into `dir`, returning the destination
    pub fn download_to(&self, dir: &Path) -> CfgMgrResult<PathBuf> {
        fs::create_dir_all(dir).map_err(|e| CfgMgrError::io(dir, e))?;

        let dest = dir.join(self.file_name());
        fs::copy(&self.path, &dest).map_err(|e| CfgMgrError::io(&self.path, e))?;

        info!("Copied MIB {} to {}", self.path.display(), dest.display());
        Ok(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snmpd_cfgmgr_common::{MemoryStore, SectionStore};
    use tempfile::TempDir;

    fn store_with_mib(path: &str) -> MemoryStore {
        let mut store = MemoryStore::new();
        store.add(form_config::CONFIG, "snmpd", Some(form_config::SECTION));
        store.set(
            form_config::CONFIG,
            form_config::SECTION,
            form_config::DOWNLOAD_MIB,
            path,
        );
        store
    }

    #[test]
    fn test_locate_and_download() {
        let root = TempDir::new().unwrap();
        let mib_dir = root.path().join("usr/share/snmp/mibs");
        fs::create_dir_all(&mib_dir).unwrap();
        fs::write(mib_dir.join("TANO-MIB.txt"), vec![b'x'; 1536]).unwrap();

        let store = store_with_mib("/usr/share/snmp/mibs/TANO-MIB.txt");
        let mib = MibFile::locate(&store, root.path()).unwrap();
        assert_eq!(mib.size(), 1536);
        assert_eq!(mib.file_name(), "TANO-MIB.txt");
        assert_eq!(mib.size_label(), "1.50 KiB");

        let out = TempDir::new().unwrap();
        let dest = mib.download_to(&out.path().join("mibs")).unwrap();
        assert_eq!(fs::read(dest).unwrap().len(), 1536);
    }

    #[test]
    fn test_locate_missing() {
        let root = TempDir::new().unwrap();
        assert_eq!(MibFile::locate(&MemoryStore::new(), root.path()), None);

        let store = store_with_mib("/nonexistent.mib");
        assert_eq!(MibFile::locate(&store, root.path()), None);
    }

    #[test]
    fn test_size_label_units() {
        let label = |size| {
            MibFile {
                path: PathBuf::from("x"),
                size,
            }
            .size_label()
        };
        assert_eq!(label(512), "512.00 B");
        assert_eq!(label(1024 * 1024 * 3), "3.00 MiB");
    }
}
