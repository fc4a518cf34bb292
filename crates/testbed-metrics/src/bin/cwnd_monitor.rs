//! Follows the kernel log and writes the CWND time series.
//!
//! ```bash
//! sudo cwnd-monitor results/bbr
//! cwnd-monitor --input saved-dmesg.log results/bbr
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};
use clap::Parser;
use testbed_metrics::kernel_log::{self, CwndSeries};
use testbed_metrics::CWND_SERIES_FILE;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "cwnd-monitor",
    about = "Write the kernel-reported congestion window as an elapsed/cwnd series"
)]
struct Args {
    /// Directory the series file is written to.
    output_dir: PathBuf,

    /// Read records from a saved log instead of following `dmesg`.
    #[arg(long)]
    input: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    testbed_metrics::init_tracing();

    let path = args.output_dir.join(CWND_SERIES_FILE);
    let file = File::create(&path).with_context(|| format!("create {}", path.display()))?;
    let mut series = CwndSeries::new(BufWriter::new(file));
    info!(output = %path.display(), "recording cwnd series");

    match &args.input {
        Some(input) => {
            let log = File::open(input).with_context(|| format!("open {}", input.display()))?;
            kernel_log::follow(BufReader::new(log), &mut series)
                .with_context(|| format!("read {}", input.display()))?;
        }
        None => {
            let mut child = Command::new("dmesg")
                .arg("--follow")
                .stdout(Stdio::piped())
                .spawn()
                .context("spawn dmesg --follow")?;
            let stdout = child.stdout.take().context("dmesg stdout not captured")?;
            kernel_log::follow(BufReader::new(stdout), &mut series).context("read kernel log")?;
            let status = child.wait().context("wait for dmesg")?;
            if !status.success() {
                bail!("dmesg exited with {status}");
            }
        }
    }

    info!(samples = series.samples(), "cwnd series complete");
    Ok(())
}
