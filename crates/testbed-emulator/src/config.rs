use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unsupported config version {0}")]
    UnsupportedVersion(u32),
    #[error("{0} command must not be empty")]
    EmptyCommand(&'static str),
    #[error("python interpreter must not be empty")]
    EmptyInterpreter,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmulatorConfigInput {
    pub version: u32,
    pub runner: RunnerConfigInput,
    pub reset: CommandConfigInput,
    pub post_build: CommandConfigInput,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RunnerConfigInput {
    pub python: Option<String>,
    pub sudo: Option<bool>,
    pub keep_script: Option<bool>,
    pub script_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommandConfigInput {
    pub command: Option<Vec<String>>,
}

/// How the generated emulator program is executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    pub python: String,
    /// Run the program (and the reset command) under `sudo`.
    pub sudo: bool,
    /// Leave the generated program on disk after the run.
    pub keep_script: bool,
    pub script_dir: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            python: "python3".into(),
            sudo: true,
            keep_script: false,
            script_dir: std::env::temp_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmulatorConfig {
    pub version: u32,
    pub runner: RunnerConfig,
    pub reset_command: Vec<String>,
    /// Runs inside the emulator program, which already has the runner's
    /// privileges.
    pub post_build_command: Vec<String>,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            runner: RunnerConfig::default(),
            reset_command: vec!["mn".into(), "-c".into()],
            post_build_command: vec!["./config.sh".into()],
        }
    }
}

impl EmulatorConfigInput {
    pub fn resolve(self) -> Result<EmulatorConfig, ConfigError> {
        let version = if self.version == 0 {
            CONFIG_VERSION
        } else {
            self.version
        };
        if version != CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion(version));
        }

        let defaults = EmulatorConfig::default();

        let python = match self.runner.python {
            Some(p) if p.trim().is_empty() => return Err(ConfigError::EmptyInterpreter),
            Some(p) => p.trim().to_string(),
            None => defaults.runner.python,
        };

        let runner = RunnerConfig {
            python,
            sudo: self.runner.sudo.unwrap_or(defaults.runner.sudo),
            keep_script: self.runner.keep_script.unwrap_or(defaults.runner.keep_script),
            script_dir: self.runner.script_dir.unwrap_or(defaults.runner.script_dir),
        };

        Ok(EmulatorConfig {
            version,
            runner,
            reset_command: command_or(self.reset.command, defaults.reset_command, "reset")?,
            post_build_command: command_or(
                self.post_build.command,
                defaults.post_build_command,
                "post_build",
            )?,
        })
    }
}

fn command_or(
    input: Option<Vec<String>>,
    default: Vec<String>,
    section: &'static str,
) -> Result<Vec<String>, ConfigError> {
    match input {
        None => Ok(default),
        Some(cmd) => {
            let cmd: Vec<String> = cmd
                .into_iter()
                .map(|arg| arg.trim().to_string())
                .filter(|arg| !arg.is_empty())
                .collect();
            if cmd.is_empty() {
                Err(ConfigError::EmptyCommand(section))
            } else {
                Ok(cmd)
            }
        }
    }
}

impl EmulatorConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        if input.trim().is_empty() {
            return Ok(EmulatorConfig::default());
        }
        let parsed: EmulatorConfigInput = toml::from_str(input)?;
        parsed.resolve()
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&input)
    }
}
