//! Sends a bulk payload to the sink and records RTT, sending rate and flow
//! completion time.
//!
//! ```bash
//! tcp-sender bbr results/bbr
//! tcp-sender cubic results/cubic --server 10.0.0.2:1234
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use testbed_metrics::sender::{self, SenderConfig, DEFAULT_CHUNK_BYTES, DEFAULT_PAYLOAD_BYTES};

#[derive(Parser, Debug)]
#[command(
    name = "tcp-sender",
    about = "Send a bulk TCP payload with a chosen congestion control scheme"
)]
struct Args {
    /// Kernel congestion control scheme, e.g. `cubic` or `bbr`.
    congestion: String,

    /// Directory the series files are written to.
    output_dir: PathBuf,

    #[arg(long, default_value_t = sender::DEFAULT_SERVER)]
    server: SocketAddr,

    /// Payload size in bytes.
    #[arg(long, default_value_t = DEFAULT_PAYLOAD_BYTES)]
    bytes: usize,

    /// Bytes per write.
    #[arg(long, default_value_t = DEFAULT_CHUNK_BYTES)]
    chunk: usize,

    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    testbed_metrics::init_tracing();

    let config = SenderConfig {
        server: args.server,
        congestion: Some(args.congestion),
        payload_bytes: args.bytes,
        chunk_bytes: args.chunk,
        seed: args.seed,
    };
    sender::run(&config, &args.output_dir)?;
    Ok(())
}
