//! Temporary configuration directory for integration tests

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use snmpd_cfgmgr::{form_config, SnmpdMgr, SNMPD_CONFIG};
use snmpd_cfgmgr_common::{uci, CfgMgrResult, MemoryStore};

use crate::VerifyResult;

/// A throwaway `/etc/config` plus a filesystem root for MIB files
pub struct UciTestEnv {
    dir: TempDir,
}

impl UciTestEnv {
    /// Create an empty environment
    pub fn new() -> VerifyResult<Self> {
        let dir = TempDir::new()?;
        fs::create_dir_all(dir.path().join("etc/config"))?;
        debug!("Test environment at {}", dir.path().display());
        Ok(Self { dir })
    }

    /// Create an environment holding the given snmpd package text
    pub fn with_snmpd(text: &str) -> VerifyResult<Self> {
        let env = Self::new()?;
        env.write_package(SNMPD_CONFIG, text)?;
        Ok(env)
    }

    /// Filesystem root
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Directory holding the packages
    pub fn config_dir(&self) -> PathBuf {
        self.root().join("etc/config")
    }

    /// Write a package file
    pub fn write_package(&self, config: &str, text: &str) -> VerifyResult<()> {
        fs::write(self.config_dir().join(config), text)?;
        Ok(())
    }

    /// Read a package file back
    pub fn read_package(&self, config: &str) -> VerifyResult<String> {
        Ok(fs::read_to_string(self.config_dir().join(config))?)
    }

    /// Write a file below the root
    pub fn write_file(&self, path: &str, contents: &[u8]) -> VerifyResult<PathBuf> {
        let path = self.root().join(path.trim_start_matches('/'));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Load the packages the form reads into a fresh store
    pub fn load_store(&self) -> CfgMgrResult<MemoryStore> {
        let mut store = MemoryStore::new();
        for config in [SNMPD_CONFIG, form_config::CONFIG] {
            uci::load_package(&mut store, &self.config_dir(), config)?;
        }
        Ok(store)
    }

    /// Load a manager over the packages
    pub fn load_mgr(&self) -> CfgMgrResult<SnmpdMgr<MemoryStore>> {
        Ok(SnmpdMgr::new(self.load_store()?))
    }

    /// Save the snmpd package of a manager
    pub fn save(&self, mgr: &SnmpdMgr<MemoryStore>) -> CfgMgrResult<()> {
        uci::save_package(mgr.store(), &self.config_dir(), SNMPD_CONFIG)
    }
}
