//! Measurement side of a testbed run.
//!
//! - [`codes`]: record codes written by the instrumented kernel
//! - [`kernel_log`]: parses kernel log records into the CWND time series
//! - [`sender`]: bulk TCP sender that samples RTT and sending rate

pub mod codes;
pub mod kernel_log;
pub mod sender;

pub use codes::{BbrPhase, Metric, RecordCode, UnknownCode};
pub use kernel_log::{CwndSeries, KernelRecord};
pub use sender::{SenderConfig, TransferSummary};

/// Series file names written into the output directory.
pub const CWND_SERIES_FILE: &str = "H1-H2-KERNEL-CWND.dat";
pub const RTT_SERIES_FILE: &str = "H1-H2-RTT.dat";
pub const SENDING_RATE_FILE: &str = "H1-H2-SENDING-RATE.dat";
pub const FLOW_COMPLETION_FILE: &str = "H1-H2-FLOW-COMPLETION-TIME.dat";

/// Install the `tracing` subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
