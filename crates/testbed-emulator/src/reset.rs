//! Clears emulator state left over from a previous run.

use anyhow::{Context, Result};
use tracing::info;

use crate::command;
use crate::config::EmulatorConfig;

/// Run the configured cleanup command (`mn -c` by default) once.
///
/// Idempotent on the emulator side; a failing command aborts the run.
pub fn clean(config: &EmulatorConfig) -> Result<()> {
    info!(
        command = %command::command_line(&config.reset_command, config.runner.sudo),
        "clearing leftover emulator state"
    );
    command::run_checked(&config.reset_command, config.runner.sudo)
        .context("environment reset")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(reset: &[&str]) -> EmulatorConfig {
        let mut cfg = EmulatorConfig::default();
        cfg.runner.sudo = false;
        cfg.reset_command = reset.iter().map(|s| s.to_string()).collect();
        cfg
    }

    #[test]
    fn successful_reset() {
        clean(&config(&["true"])).unwrap();
    }

    #[test]
    fn failed_reset_is_reported() {
        let err = clean(&config(&["false"])).unwrap_err();
        assert!(err.to_string().contains("environment reset"), "{err:#}");
    }
}
