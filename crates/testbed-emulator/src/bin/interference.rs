//! Interference scenarios 0–2 on Mininet-WiFi.
//!
//! ```bash
//! interference --sc 1
//! ```

use clap::Parser;
use testbed_emulator::cli::{self, InterferenceCli};
use testbed_topology::Resolver;

fn main() -> anyhow::Result<()> {
    let args = InterferenceCli::parse();
    cli::init_tracing();
    cli::run(Resolver::Interference, args.scenario, &args.common)
}
