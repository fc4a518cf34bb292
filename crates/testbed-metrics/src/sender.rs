//! Bulk TCP sender recording RTT, sending rate and flow completion time.
//!
//! Runs on the mobile station (`h1`) against a sink on `h2`. The kernel's
//! smoothed RTT is sampled after every write.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, TcpStream};
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::{RngExt as _, SeedableRng};
use tracing::{debug, info};

use crate::{FLOW_COMPLETION_FILE, RTT_SERIES_FILE, SENDING_RATE_FILE};

pub const DEFAULT_SERVER: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 2), 1234));
pub const DEFAULT_PAYLOAD_BYTES: usize = 120 * 1024 * 1024;
pub const DEFAULT_CHUNK_BYTES: usize = 1024;

#[derive(Debug, Clone)]
pub struct SenderConfig {
    pub server: SocketAddr,
    /// Kernel congestion control name (`cubic`, `bbr`, ...). `None` keeps
    /// the system default.
    pub congestion: Option<String>,
    pub payload_bytes: usize,
    pub chunk_bytes: usize,
    /// Seed for the payload bytes.
    pub seed: u64,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER,
            congestion: None,
            payload_bytes: DEFAULT_PAYLOAD_BYTES,
            chunk_bytes: DEFAULT_CHUNK_BYTES,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferSummary {
    pub bytes_sent: usize,
    pub completion: Duration,
    pub rtt_samples: usize,
}

struct SeriesFiles {
    rtt: BufWriter<File>,
    rate: BufWriter<File>,
    completion: BufWriter<File>,
}

impl SeriesFiles {
    fn create(dir: &Path) -> Result<Self> {
        let open = |name: &str| -> Result<BufWriter<File>> {
            let path = dir.join(name);
            let file =
                File::create(&path).with_context(|| format!("create {}", path.display()))?;
            Ok(BufWriter::new(file))
        };
        Ok(Self {
            rtt: open(RTT_SERIES_FILE)?,
            rate: open(SENDING_RATE_FILE)?,
            completion: open(FLOW_COMPLETION_FILE)?,
        })
    }

    fn flush(&mut self) -> io::Result<()> {
        self.rtt.flush()?;
        self.rate.flush()?;
        self.completion.flush()
    }
}

fn payload(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut buf = vec![0u8; len];
    rng.fill(buf.as_mut_slice());
    buf
}

/// Connect to `config.server`, send the payload and write the three series
/// into `out_dir`.
///
/// The sending rate is averaged over whole elapsed seconds, so no rate
/// sample is written during the first second.
pub fn run(config: &SenderConfig, out_dir: &Path) -> Result<TransferSummary> {
    if config.chunk_bytes == 0 {
        bail!("chunk size must be positive");
    }
    let mut files = SeriesFiles::create(out_dir)?;
    let payload = payload(config.payload_bytes, config.seed);

    let mut stream = TcpStream::connect(config.server)
        .with_context(|| format!("connect to {}", config.server))?;
    if let Some(name) = &config.congestion {
        socket::set_congestion(&stream, name)
            .with_context(|| format!("set congestion control {name}"))?;
    }
    info!(
        server = %config.server,
        congestion = config.congestion.as_deref().unwrap_or("default"),
        bytes = payload.len(),
        "connected to server"
    );

    writeln!(files.rate, "{:.6}\t{:.2}", 0.0, 0.0)?;
    let start = Instant::now();
    let mut sent = 0usize;
    let mut rtt_samples = 0usize;

    while sent < payload.len() {
        let end = (sent + config.chunk_bytes).min(payload.len());
        let n = stream
            .write(&payload[sent..end])
            .with_context(|| format!("send after {sent} bytes"))?;
        if n == 0 {
            bail!("connection closed after {sent} bytes");
        }
        sent += n;

        let elapsed = start.elapsed();
        let secs = elapsed.as_secs_f64();

        let rtt = socket::smoothed_rtt(&stream).context("read TCP_INFO")?;
        writeln!(files.rtt, "{secs:.6}\t{:.2}", rtt.as_secs_f64() * 1000.0)?;
        rtt_samples += 1;

        let whole_secs = elapsed.as_secs();
        if whole_secs != 0 {
            let mbps = (sent as f64 * 8.0) / whole_secs as f64 / 1_000_000.0;
            writeln!(files.rate, "{secs:.6}\t{mbps:.2}")?;
        }
    }

    let completion = start.elapsed();
    write!(files.completion, "{:.6}", completion.as_secs_f64())?;
    files.flush().context("flush series files")?;
    debug!(rtt_samples, "series written");
    info!(
        megabytes = %format!("{:.2}", sent as f64 / (1024.0 * 1024.0)),
        seconds = completion.as_secs_f64(),
        "payload sent"
    );

    Ok(TransferSummary {
        bytes_sent: sent,
        completion,
        rtt_samples,
    })
}

#[cfg(target_os = "linux")]
mod socket {
    use std::io;
    use std::net::TcpStream;
    use std::os::unix::io::AsRawFd;
    use std::time::Duration;

    pub fn set_congestion(stream: &TcpStream, name: &str) -> io::Result<()> {
        let ret = unsafe {
            libc::setsockopt(
                stream.as_raw_fd(),
                libc::IPPROTO_TCP,
                libc::TCP_CONGESTION,
                name.as_ptr() as *const libc::c_void,
                name.len() as libc::socklen_t,
            )
        };
        if ret != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    pub fn smoothed_rtt(stream: &TcpStream) -> io::Result<Duration> {
        let mut info: libc::tcp_info = unsafe { std::mem::zeroed() };
        let mut len = std::mem::size_of::<libc::tcp_info>() as libc::socklen_t;
        let ret = unsafe {
            libc::getsockopt(
                stream.as_raw_fd(),
                libc::SOL_TCP,
                libc::TCP_INFO,
                &mut info as *mut libc::tcp_info as *mut libc::c_void,
                &mut len,
            )
        };
        if ret != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Duration::from_micros(u64::from(info.tcpi_rtt)))
    }
}

#[cfg(not(target_os = "linux"))]
mod socket {
    use std::io;
    use std::net::TcpStream;
    use std::time::Duration;

    pub fn set_congestion(_: &TcpStream, _: &str) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "TCP_CONGESTION requires Linux",
        ))
    }

    pub fn smoothed_rtt(_: &TcpStream) -> io::Result<Duration> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "TCP_INFO requires Linux",
        ))
    }
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread;
    use tempfile::TempDir;

    fn sink() -> (SocketAddr, thread::JoinHandle<usize>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut conn, _) = listener.accept().unwrap();
            let mut received = Vec::new();
            conn.read_to_end(&mut received).unwrap();
            received.len()
        });
        (addr, handle)
    }

    #[test]
    fn payload_is_seeded() {
        assert_eq!(payload(64, 7), payload(64, 7));
        assert_ne!(payload(64, 7), payload(64, 8));
        assert_eq!(payload(0, 7).len(), 0);
    }

    #[test]
    fn sends_payload_and_writes_series() {
        let dir = TempDir::new().unwrap();
        let (server, handle) = sink();
        let config = SenderConfig {
            server,
            payload_bytes: 64 * 1024,
            ..Default::default()
        };

        let summary = run(&config, dir.path()).unwrap();
        assert_eq!(summary.bytes_sent, 64 * 1024);
        assert_eq!(handle.join().unwrap(), 64 * 1024);

        let rtt = std::fs::read_to_string(dir.path().join(RTT_SERIES_FILE)).unwrap();
        assert_eq!(rtt.lines().count(), summary.rtt_samples);
        assert!(summary.rtt_samples >= 64);
        for line in rtt.lines() {
            let (t, ms) = line.split_once('\t').unwrap();
            t.parse::<f64>().unwrap();
            assert!(ms.parse::<f64>().unwrap() >= 0.0);
        }

        let rate = std::fs::read_to_string(dir.path().join(SENDING_RATE_FILE)).unwrap();
        assert_eq!(rate.lines().next(), Some("0.000000\t0.00"));

        let fct = std::fs::read_to_string(dir.path().join(FLOW_COMPLETION_FILE)).unwrap();
        assert!(!fct.contains('\n'));
        assert!(fct.parse::<f64>().unwrap() >= 0.0);
    }

    #[test]
    fn unknown_congestion_control_is_rejected() {
        let dir = TempDir::new().unwrap();
        let (server, _handle) = sink();
        let config = SenderConfig {
            server,
            congestion: Some("no-such-scheme".into()),
            payload_bytes: 1024,
            ..Default::default()
        };
        let err = run(&config, dir.path()).unwrap_err();
        assert!(
            format!("{err:#}").contains("set congestion control no-such-scheme"),
            "{err:#}"
        );
    }

    #[test]
    fn zero_chunk_is_rejected() {
        let dir = TempDir::new().unwrap();
        let config = SenderConfig {
            chunk_bytes: 0,
            ..Default::default()
        };
        assert!(run(&config, dir.path()).is_err());
    }
}
