//! Latency scenarios 3–7 on Mininet-WiFi.
//!
//! ```bash
//! latency --sc 5
//! ```

use clap::Parser;
use testbed_emulator::cli::{self, LatencyCli};
use testbed_topology::Resolver;

fn main() -> anyhow::Result<()> {
    let args = LatencyCli::parse();
    cli::init_tracing();
    cli::run(Resolver::Latency, args.scenario, &args.common)
}
