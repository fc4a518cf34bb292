//! Command-line entry points shared by the `interference` and `latency`
//! binaries.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser};
use testbed_topology::Resolver;
use tracing_subscriber::EnvFilter;

use crate::config::EmulatorConfig;
use crate::driver::{self, PostBuildHook};
use crate::mininet::MininetScript;
use crate::reset;
use crate::runner::ScriptRunner;

/// Run a wmediumd interference scenario on Mininet-WiFi.
#[derive(Parser, Debug)]
#[command(name = "interference", about = "Run a wmediumd interference scenario on Mininet-WiFi")]
pub struct InterferenceCli {
    /// 0 = no interference, 1 = interference, 2 = interference plus 15 extra stations.
    #[arg(
        short = 's',
        long = "scenario",
        visible_alias = "sc",
        value_parser = clap::value_parser!(u8).range(0..=2)
    )]
    pub scenario: u8,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Run an end-to-end latency scenario on Mininet-WiFi.
#[derive(Parser, Debug)]
#[command(name = "latency", about = "Run an end-to-end latency scenario on Mininet-WiFi")]
pub struct LatencyCli {
    /// Minimum h1-h2 RTT: 3 = 5ms, 4 = 10ms, 5 = 50ms, 6 = 100ms, 7 = 150ms.
    #[arg(
        short = 's',
        long = "scenario",
        visible_alias = "sc",
        value_parser = clap::value_parser!(u8).range(3..=7)
    )]
    pub scenario: u8,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Emulator runner configuration (TOML).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the generated Mininet-WiFi program instead of running it.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Print the resolved topology as JSON and exit.
    #[arg(long, default_value_t = false, conflicts_with = "dry_run")]
    pub json: bool,

    /// Do not clear leftover emulator state before the run.
    #[arg(long, default_value_t = false)]
    pub skip_reset: bool,
}

/// Install the `tracing` subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// What a run produced, before anything is executed.
#[derive(Debug)]
pub enum Plan {
    /// Descriptor as pretty JSON.
    Json(String),
    /// Rendered emulator program.
    Program(String),
}

/// Resolve `scenario` and render it, without touching the system.
pub fn plan(
    resolver: Resolver,
    scenario: u8,
    args: &CommonArgs,
    config: &EmulatorConfig,
) -> Result<Plan> {
    let topology = resolver
        .resolve(i64::from(scenario))
        .with_context(|| format!("resolve {} scenario", resolver.name()))?;

    if args.json {
        return Ok(Plan::Json(serde_json::to_string_pretty(&topology)?));
    }

    let hook = PostBuildHook::new(config.post_build_command.clone());
    let mut script = MininetScript::new();
    driver::launch(&mut script, &topology, &hook)?;
    Ok(Plan::Program(script.into_source()))
}

/// Full run: config → reset → resolve → render → execute.
pub fn run(resolver: Resolver, scenario: u8, args: &CommonArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => EmulatorConfig::load(path)?,
        None => EmulatorConfig::default(),
    };

    tracing::info!(
        resolver = resolver.name(),
        scenario,
        dry_run = args.dry_run,
        "testbed run starting"
    );

    let offline = args.dry_run || args.json;
    if !offline && !args.skip_reset {
        reset::clean(&config)?;
    }

    match plan(resolver, scenario, args, &config)? {
        Plan::Json(json) => println!("{json}"),
        Plan::Program(program) if args.dry_run => print!("{program}"),
        Plan::Program(program) => {
            let tag = format!("{}-{scenario}", resolver.name());
            ScriptRunner::new(&config.runner).run(&program, &tag)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interference_accepts_only_its_scenarios() {
        for ok in ["0", "1", "2"] {
            let cli = InterferenceCli::try_parse_from(["interference", "-s", ok]).unwrap();
            assert_eq!(cli.scenario.to_string(), ok);
        }
        for bad in ["3", "-1", "x"] {
            assert!(InterferenceCli::try_parse_from(["interference", "-s", bad]).is_err());
        }
    }

    #[test]
    fn latency_accepts_only_its_scenarios() {
        let cli = LatencyCli::try_parse_from(["latency", "--sc", "5"]).unwrap();
        assert_eq!(cli.scenario, 5);
        for bad in ["2", "8"] {
            assert!(LatencyCli::try_parse_from(["latency", "--scenario", bad]).is_err());
        }
    }

    #[test]
    fn scenario_is_required() {
        assert!(InterferenceCli::try_parse_from(["interference"]).is_err());
        assert!(LatencyCli::try_parse_from(["latency", "--dry-run"]).is_err());
    }

    #[test]
    fn json_and_dry_run_conflict() {
        let parsed = LatencyCli::try_parse_from(["latency", "-s", "3", "--json", "--dry-run"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn plan_renders_program() {
        let args = CommonArgs {
            dry_run: true,
            ..Default::default()
        };
        match plan(Resolver::Latency, 6, &args, &EmulatorConfig::default()).unwrap() {
            Plan::Program(src) => assert!(src.contains("delay=\"10ms\"")),
            other => panic!("unexpected plan {other:?}"),
        }
    }

    #[test]
    fn plan_exports_json() {
        let args = CommonArgs {
            json: true,
            ..Default::default()
        };
        match plan(Resolver::Interference, 2, &args, &EmulatorConfig::default()).unwrap() {
            Plan::Json(json) => {
                let value: serde_json::Value = serde_json::from_str(&json).unwrap();
                assert_eq!(value["post_build"], true);
            }
            other => panic!("unexpected plan {other:?}"),
        }
    }

    #[test]
    fn plan_rejects_out_of_range_scenario() {
        let err = plan(
            Resolver::Interference,
            9,
            &CommonArgs::default(),
            &EmulatorConfig::default(),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("invalid interference scenario 9"));
    }
}
