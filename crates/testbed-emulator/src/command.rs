//! External process helpers, optionally under `sudo`.

use std::process::{Command, ExitStatus, Output};

use anyhow::{bail, Context, Result};
use tracing::debug;

fn command(args: &[String], sudo: bool) -> Result<Command> {
    let Some((program, rest)) = args.split_first() else {
        bail!("empty command line");
    };
    let cmd = if sudo {
        let mut cmd = Command::new("sudo");
        cmd.arg(program).args(rest);
        cmd
    } else {
        let mut cmd = Command::new(program);
        cmd.args(rest);
        cmd
    };
    Ok(cmd)
}

/// Human-readable form of the command line, for logs and errors.
pub fn command_line(args: &[String], sudo: bool) -> String {
    let line = args.join(" ");
    if sudo {
        format!("sudo {line}")
    } else {
        line
    }
}

/// Run to completion, capturing output.
pub fn run(args: &[String], sudo: bool) -> Result<Output> {
    debug!(command = %command_line(args, sudo), "running");
    command(args, sudo)?
        .output()
        .with_context(|| command_line(args, sudo))
}

/// Run to completion, bailing with stderr on non-zero exit.
pub fn run_checked(args: &[String], sudo: bool) -> Result<Output> {
    let output = run(args, sudo)?;
    if !output.status.success() {
        bail!(
            "command failed: {}\n{}",
            command_line(args, sudo),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(output)
}

/// Run with the terminal inherited, for interactive programs.
pub fn run_interactive(args: &[String], sudo: bool) -> Result<ExitStatus> {
    debug!(command = %command_line(args, sudo), "running interactively");
    command(args, sudo)?
        .status()
        .with_context(|| command_line(args, sudo))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn command_line_prefixes_sudo() {
        assert_eq!(command_line(&argv(&["mn", "-c"]), true), "sudo mn -c");
        assert_eq!(command_line(&argv(&["mn", "-c"]), false), "mn -c");
    }

    #[test]
    fn empty_command_is_an_error() {
        assert!(run(&[], false).is_err());
    }

    #[test]
    fn run_checked_reports_failure() {
        let err = run_checked(&argv(&["sh", "-c", "echo boom >&2; exit 3"]), false).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("boom"), "stderr missing: {msg}");
    }

    #[test]
    fn run_interactive_returns_exit_status() {
        assert!(run_interactive(&argv(&["true"]), false).unwrap().success());
        let status = run_interactive(&argv(&["sh", "-c", "exit 5"]), false).unwrap();
        assert_eq!(status.code(), Some(5));
    }

    #[test]
    fn run_checked_passes_output_through() {
        let out = run_checked(&argv(&["sh", "-c", "echo ok"]), false).unwrap();
        assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "ok");
    }
}
