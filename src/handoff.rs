use std::path::Path;
use tracing::info;

use crate::config::HandoffConfig;
use crate::error::{PlanError, Result};

/// Triggers the downstream automation with a persisted plan
#[derive(Debug, Clone)]
pub struct DownstreamHandoff {
    command: String,
    args: Vec<String>,
}

impl DownstreamHandoff {
    /// Returns `None` when the hand-off is disabled
    pub fn from_config(config: &HandoffConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        config.command.as_ref().map(|command| Self {
            command: command.clone(),
            args: config.args.clone(),
        })
    }

    /// Run the downstream command with the plan path as its last argument
    pub async fn trigger(&self, plan_file: &Path) -> Result<()> {
        info!("🚚 Handing off {} to {}", plan_file.display(), self.command);

        let status = tokio::process::Command::new(&self.command)
            .args(&self.args)
            .arg(plan_file)
            .status()
            .await
            .map_err(|e| PlanError::Handoff(format!("failed to run {}: {}", self.command, e)))?;

        if !status.success() {
            return Err(PlanError::Handoff(format!("{} exited with {}", self.command, status)));
        }

        info!("✅ Downstream automation accepted the plan");
        Ok(())
    }
}
