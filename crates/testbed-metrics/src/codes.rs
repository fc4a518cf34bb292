//! Record codes emitted by the instrumented kernel.
//!
//! Metric records carry `<code>\t<value>\t<connection hash>`; BBR phase
//! records carry `<code>\t<pacing gain>\t<cwnd gain>`.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown kernel record code {0}")]
pub struct UnknownCode(pub i64);

/// Per-connection metric tracked by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Cwnd,
    Bdp,
    Bandwidth,
    Inflight,
    Rate,
    Rtt,
    MinRtt,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::Cwnd,
        Metric::Bdp,
        Metric::Bandwidth,
        Metric::Inflight,
        Metric::Rate,
        Metric::Rtt,
        Metric::MinRtt,
    ];

    pub const fn code(self) -> i64 {
        match self {
            Metric::Cwnd => 1,
            Metric::Bdp => 2,
            Metric::Bandwidth => 3,
            Metric::Inflight => 4,
            Metric::Rate => 5,
            Metric::Rtt => 6,
            Metric::MinRtt => 7,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Metric::Cwnd => "CWND",
            Metric::Bdp => "BDP",
            Metric::Bandwidth => "BW",
            Metric::Inflight => "INFLIGHT",
            Metric::Rate => "RATE",
            Metric::Rtt => "RTT",
            Metric::MinRtt => "MIN_RTT",
        }
    }
}

impl TryFrom<i64> for Metric {
    type Error = UnknownCode;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        Metric::ALL
            .into_iter()
            .find(|m| m.code() == code)
            .ok_or(UnknownCode(code))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// BBR state machine phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BbrPhase {
    Startup,
    Drain,
    ProbeBw,
    ProbeRtt,
}

impl BbrPhase {
    pub const ALL: [BbrPhase; 4] = [
        BbrPhase::Startup,
        BbrPhase::Drain,
        BbrPhase::ProbeBw,
        BbrPhase::ProbeRtt,
    ];

    pub const fn code(self) -> i64 {
        match self {
            BbrPhase::Startup => 11,
            BbrPhase::Drain => 22,
            BbrPhase::ProbeBw => 33,
            BbrPhase::ProbeRtt => 44,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            BbrPhase::Startup => "STARTUP",
            BbrPhase::Drain => "DRAIN",
            BbrPhase::ProbeBw => "PROBE_BW",
            BbrPhase::ProbeRtt => "PROBE_RTT",
        }
    }
}

impl TryFrom<i64> for BbrPhase {
    type Error = UnknownCode;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        BbrPhase::ALL
            .into_iter()
            .find(|p| p.code() == code)
            .ok_or(UnknownCode(code))
    }
}

impl fmt::Display for BbrPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Either kind of record code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordCode {
    Metric(Metric),
    Phase(BbrPhase),
}

impl TryFrom<i64> for RecordCode {
    type Error = UnknownCode;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        Metric::try_from(code)
            .map(RecordCode::Metric)
            .or_else(|_| BbrPhase::try_from(code).map(RecordCode::Phase))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_codes_match_kernel_header() {
        let codes: Vec<i64> = Metric::ALL.iter().map(|m| m.code()).collect();
        assert_eq!(codes, [1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(Metric::try_from(1), Ok(Metric::Cwnd));
        assert_eq!(Metric::try_from(7), Ok(Metric::MinRtt));
        assert_eq!(Metric::try_from(0), Err(UnknownCode(0)));
    }

    #[test]
    fn phase_codes_match_kernel_header() {
        let codes: Vec<i64> = BbrPhase::ALL.iter().map(|p| p.code()).collect();
        assert_eq!(codes, [11, 22, 33, 44]);
        assert_eq!(BbrPhase::try_from(33), Ok(BbrPhase::ProbeBw));
        assert!(BbrPhase::try_from(3).is_err());
    }

    #[test]
    fn metric_and_phase_codes_are_disjoint() {
        for m in Metric::ALL {
            assert!(BbrPhase::try_from(m.code()).is_err());
        }
        assert_eq!(
            RecordCode::try_from(44),
            Ok(RecordCode::Phase(BbrPhase::ProbeRtt))
        );
        assert_eq!(
            RecordCode::try_from(6),
            Ok(RecordCode::Metric(Metric::Rtt))
        );
        assert_eq!(RecordCode::try_from(12), Err(UnknownCode(12)));
    }

    #[test]
    fn names() {
        assert_eq!(Metric::MinRtt.to_string(), "MIN_RTT");
        assert_eq!(BbrPhase::ProbeBw.to_string(), "PROBE_BW");
    }
}
