use std::io::Write as _;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tempfile::TempPath;
use tracing::{debug, info};

use crate::command;
use crate::config::RunnerConfig;

/// Executes a rendered emulator program with the terminal attached.
pub struct ScriptRunner<'a> {
    config: &'a RunnerConfig,
}

impl<'a> ScriptRunner<'a> {
    pub fn new(config: &'a RunnerConfig) -> Self {
        Self { config }
    }

    /// Write `source` to a fresh file and run it to completion.
    ///
    /// Blocks for the whole interactive session. A non-zero exit is an error.
    /// The file is removed afterwards unless `keep_script` is set.
    pub fn run(&self, source: &str, tag: &str) -> Result<()> {
        let script = write_script(&self.config.script_dir, tag, source)?;

        let argv = vec![
            self.config.python.clone(),
            script.to_string_lossy().into_owned(),
        ];
        info!(
            command = %command::command_line(&argv, self.config.sudo),
            "starting emulator"
        );

        let status = command::run_interactive(&argv, self.config.sudo);

        let shown = script.display().to_string();
        if self.config.keep_script {
            let kept = script.keep().context("keep emulator program")?;
            info!(path = %kept.display(), "keeping emulator program");
        }

        let status = status?;
        if !status.success() {
            bail!("emulator exited with {status} (program: {shown})");
        }
        info!("emulator stopped");
        Ok(())
    }
}

/// Create `testbed-<tag>-<random>.py` exclusively in `dir`, owner-only.
///
/// The returned path deletes the file when dropped.
fn write_script(dir: &Path, tag: &str, source: &str) -> Result<TempPath> {
    let mut file = tempfile::Builder::new()
        .prefix(&format!("testbed-{tag}-"))
        .suffix(".py")
        .tempfile_in(dir)
        .with_context(|| format!("create emulator program in {}", dir.display()))?;
    file.write_all(source.as_bytes())
        .and_then(|()| file.flush())
        .with_context(|| format!("write emulator program {}", file.path().display()))?;
    debug!(path = %file.path().display(), bytes = source.len(), "wrote emulator program");
    Ok(file.into_temp_path())
}
