//! Runs testbed topologies on Mininet-WiFi.
//!
//! - [`driver`]: the [`EmulatorDriver`](driver::EmulatorDriver) seam and the
//!   fixed lifecycle order ([`launch`](driver::launch))
//! - [`mininet`]: renders the lifecycle as an `mn_wifi` Python program
//! - [`runner`]: executes the rendered program with the terminal attached
//! - [`reset`]: clears leftover emulator state before a run
//! - [`config`]: TOML runner configuration
//! - [`cli`]: shared entry point for the `interference` and `latency` binaries

pub mod cli;
pub mod command;
pub mod config;
pub mod driver;
pub mod mininet;
pub mod reset;
pub mod runner;

/// Environment checks for tests that need a real emulator.
#[doc(hidden)]
pub mod test_util;

pub use config::{ConfigError, EmulatorConfig, RunnerConfig};
pub use driver::{launch, EmulatorDriver, PostBuildHook};
pub use mininet::MininetScript;
pub use runner::ScriptRunner;
