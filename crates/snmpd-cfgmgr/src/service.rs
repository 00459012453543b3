//! snmpd service control through its init script

use tracing::{error, info, instrument, warn};

use snmpd_cfgmgr_common::shell::{self, init_script_cmd};
use snmpd_cfgmgr_common::{defaults, CfgMgrError, CfgMgrResult};

/// Runs init script actions for the daemon
#[derive(Debug, Clone)]
pub struct ServiceCtl {
    /// Init script path
    script: String,

    /// Capture commands instead of executing them
    mock_mode: bool,

    /// Commands captured in mock mode
    captured_commands: Vec<String>,
}

impl Default for ServiceCtl {
    fn default() -> Self {
        Self::new(defaults::SNMPD_INIT_SCRIPT)
    }
}

impl ServiceCtl {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            mock_mode: false,
            captured_commands: Vec::new(),
        }
    }

    /// Enables mock mode for testing
    pub fn with_mock_mode(mut self) -> Self {
        self.mock_mode = true;
        self
    }

    /// Gets captured commands (for testing)
    pub fn captured_commands(&self) -> &[String] {
        &self.captured_commands
    }

    /// Reloads the daemon configuration
    pub async fn reload(&mut self) -> CfgMgrResult<()> {
        self.run("reload").await
    }

    /// Runs an init script action
    #[instrument(skip(self))]
    pub async fn run(&mut self, action: &str) -> CfgMgrResult<()> {
        let cmd = init_script_cmd(&self.script, action);

        if self.mock_mode {
            info!("Mock mode: captured service command: {}", cmd);
            self.captured_commands.push(cmd);
            return Ok(());
        }

        match shell::exec_or_throw(&cmd).await {
            Ok(_) => {
                info!("Service command succeeded: {}", cmd);
                Ok(())
            }
            Err(e @ CfgMgrError::ShellCommandFailed { .. }) => {
                warn!("Service command failed: {}", e);
                Err(e)
            }
            Err(e) => {
                error!("Failed to execute service command: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reload_mock_mode() {
        let mut ctl = ServiceCtl::default().with_mock_mode();
        ctl.reload().await.unwrap();

        assert_eq!(
            ctl.captured_commands(),
            &["\"/etc/init.d/snmpd\" \"reload\"".to_string()]
        );
    }

    #[tokio::test]
    async fn test_failing_script() {
        let mut ctl = ServiceCtl::new("false");
        let err = ctl.run("reload").await.unwrap_err();
        assert!(matches!(err, CfgMgrError::ShellCommandFailed { .. }));
    }
}
