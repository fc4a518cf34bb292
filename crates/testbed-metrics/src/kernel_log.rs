//! Kernel log records and the CWND time series derived from them.

use std::io::{self, BufRead, Write};

use tracing::trace;

use crate::codes::{Metric, RecordCode};

/// One `[<seconds>] <code> <value> [<extra>]` kernel log line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelRecord {
    /// Kernel timestamp in seconds since boot.
    pub timestamp: f64,
    pub code: i64,
    pub value: u64,
    /// Connection hash for metrics, cwnd gain for BBR phases.
    pub extra: Option<u64>,
}

impl KernelRecord {
    /// Parse a log line. Lines that are not instrumentation records
    /// yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.trim_start().strip_prefix('[')?;
        let (stamp, rest) = rest.split_once(']')?;
        let timestamp: f64 = stamp.trim().parse().ok()?;
        if !timestamp.is_finite() || timestamp < 0.0 {
            return None;
        }

        let mut fields = rest.split_whitespace();
        let code = fields.next()?.parse().ok()?;
        let value = fields.next()?.parse().ok()?;
        let extra = fields.next().and_then(|f| f.parse().ok());
        Some(Self {
            timestamp,
            code,
            value,
            extra,
        })
    }

    /// The decoded code, if it is one the kernel module defines.
    pub fn kind(&self) -> Option<RecordCode> {
        RecordCode::try_from(self.code).ok()
    }
}

/// Writes `elapsed\tcwnd` lines, elapsed seconds counted from the first
/// CWND sample. Each line is flushed as it is written.
#[derive(Debug)]
pub struct CwndSeries<W> {
    out: W,
    origin: Option<f64>,
    samples: usize,
}

impl<W: Write> CwndSeries<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            origin: None,
            samples: 0,
        }
    }

    /// Append `record` if it is a CWND sample. Returns whether it was written.
    pub fn record(&mut self, record: &KernelRecord) -> io::Result<bool> {
        if record.kind() != Some(RecordCode::Metric(Metric::Cwnd)) {
            return Ok(false);
        }
        let origin = *self.origin.get_or_insert(record.timestamp);
        writeln!(
            self.out,
            "{:.6}\t{}",
            record.timestamp - origin,
            record.value
        )?;
        self.out.flush()?;
        self.samples += 1;
        Ok(true)
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Feed every line of `input` to `series` until end of input.
///
/// Non-UTF-8 bytes are replaced rather than treated as errors. Returns the
/// number of samples written.
pub fn follow<R: BufRead, W: Write>(
    mut input: R,
    series: &mut CwndSeries<W>,
) -> io::Result<usize> {
    let mut written = 0;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(written);
        }
        let line = String::from_utf8_lossy(&buf);
        match KernelRecord::parse(&line) {
            Some(record) => {
                if series.record(&record)? {
                    written += 1;
                }
            }
            None => trace!(line = %line.trim_end(), "skipping non-record line"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series_of(input: &str) -> String {
        let mut series = CwndSeries::new(Vec::new());
        follow(input.as_bytes(), &mut series).unwrap();
        String::from_utf8(series.into_inner()).unwrap()
    }

    #[test]
    fn parses_metric_record() {
        let r = KernelRecord::parse("[ 1523.004211] 1\t14480\t3735928559").unwrap();
        assert_eq!(r.timestamp, 1523.004211);
        assert_eq!(r.code, 1);
        assert_eq!(r.value, 14480);
        assert_eq!(r.extra, Some(3_735_928_559));
        assert_eq!(r.kind(), Some(RecordCode::Metric(Metric::Cwnd)));
    }

    #[test]
    fn parses_phase_record() {
        let r = KernelRecord::parse("[12.5] 33\t256\t512\n").unwrap();
        assert_eq!(r.kind(), Some(RecordCode::Phase(crate::codes::BbrPhase::ProbeBw)));
        assert_eq!((r.value, r.extra), (256, Some(512)));
    }

    #[test]
    fn rejects_other_kernel_lines() {
        for line in [
            "",
            "[    0.000000] Linux version 6.1.0",
            "[    3.2] eth0: link up",
            "no timestamp 1 2",
            "[abc] 1 2",
            "[1.0] 1",
            "[inf] 1 2",
            "[-1.0] 1 2",
        ] {
            assert_eq!(KernelRecord::parse(line), None, "{line:?}");
        }
    }

    #[test]
    fn series_is_relative_to_first_cwnd_sample() {
        let out = series_of(
            "[100.250000] 6\t900\t1\n\
             [100.500000] 1\t10\t1\n\
             [    101.0] usb 1-1: new device\n\
             [101.750000] 1\t20\t1\n\
             [102.000000] 44\t1\t1\n\
             [102.500000] 1\t30\t1\n",
        );
        assert_eq!(out, "0.000000\t10\n1.250000\t20\n2.000000\t30\n");
    }

    #[test]
    fn first_sample_at_time_zero_stays_the_origin() {
        let out = series_of("[0.000000] 1\t5\t0\n[0.500000] 1\t6\t0\n");
        assert_eq!(out, "0.000000\t5\n0.500000\t6\n");
    }

    #[test]
    fn invalid_utf8_is_skipped_not_fatal() {
        let mut input = b"[1.0] 1\t7\t0\n".to_vec();
        input.extend_from_slice(&[0xff, 0xfe, b'\n']);
        input.extend_from_slice(b"[2.0] 1\t8\t0\n");

        let mut series = CwndSeries::new(Vec::new());
        assert_eq!(follow(input.as_slice(), &mut series).unwrap(), 2);
        assert_eq!(series.samples(), 2);
    }
}
