//! Latency scenarios (3–7).
//!
//! Each scenario sets one delay on the five access-path links. A packet
//! from `h1` to `h2` and back crosses those links twice, so the minimum RTT
//! is ten times the per-link delay:
//!
//! | scenario | per-link delay | min RTT |
//! |----------|----------------|---------|
//! | 3        | 0.5 ms         | 5 ms    |
//! | 4        | 1 ms           | 10 ms   |
//! | 5        | 5 ms           | 50 ms   |
//! | 6        | 10 ms          | 100 ms  |
//! | 7        | 15 ms          | 150 ms  |

use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::baseline::{self, ACCESS_PATH_LINKS, FIXED_LINKS};
use crate::error::TopologyError;
use crate::model::{format_delay, TopologyDescriptor};

pub const RESOLVER: &str = "latency";
pub const VALID_SCENARIOS: &[u8] = &[3, 4, 5, 6, 7];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LatencyScenario {
    Rtt5ms,
    Rtt10ms,
    Rtt50ms,
    Rtt100ms,
    Rtt150ms,
}

impl LatencyScenario {
    pub const ALL: [Self; 5] = [
        Self::Rtt5ms,
        Self::Rtt10ms,
        Self::Rtt50ms,
        Self::Rtt100ms,
        Self::Rtt150ms,
    ];

    pub const fn id(self) -> u8 {
        match self {
            Self::Rtt5ms => 3,
            Self::Rtt10ms => 4,
            Self::Rtt50ms => 5,
            Self::Rtt100ms => 6,
            Self::Rtt150ms => 7,
        }
    }

    /// Delay applied to each access-path link.
    pub const fn link_delay(self) -> Duration {
        match self {
            Self::Rtt5ms => Duration::from_micros(500),
            Self::Rtt10ms => Duration::from_millis(1),
            Self::Rtt50ms => Duration::from_millis(5),
            Self::Rtt100ms => Duration::from_millis(10),
            Self::Rtt150ms => Duration::from_millis(15),
        }
    }

    /// Propagation-only RTT between `h1` and `h2`.
    pub fn min_rtt(self) -> Duration {
        self.link_delay() * (2 * ACCESS_PATH_LINKS.len() as u32)
    }
}

impl TryFrom<i64> for LatencyScenario {
    type Error = TopologyError;

    fn try_from(scenario: i64) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|s| i64::from(s.id()) == scenario)
            .ok_or(TopologyError::InvalidScenario {
                resolver: RESOLVER,
                scenario,
                valid: VALID_SCENARIOS,
            })
    }
}

/// Resolve a latency scenario number into a topology.
pub fn resolve(scenario: i64) -> Result<TopologyDescriptor, TopologyError> {
    let scenario = LatencyScenario::try_from(scenario)?;
    resolve_scenario(scenario)
}

pub fn resolve_scenario(scenario: LatencyScenario) -> Result<TopologyDescriptor, TopologyError> {
    let delay = scenario.link_delay();
    let mut builder = baseline::builder();

    for spec in &ACCESS_PATH_LINKS {
        builder.add_link(spec.link_with_delay(delay));
    }
    for spec in &FIXED_LINKS {
        builder.add_link(spec.link());
    }

    let topology = builder.build()?;
    info!(
        resolver = RESOLVER,
        scenario = scenario.id(),
        link_delay = %format_delay(delay),
        min_rtt = %format_delay(scenario.min_rtt()),
        links = topology.links().len(),
        "resolved topology"
    );
    Ok(topology)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_rtt_matches_table() {
        let expected_ms = [5, 10, 50, 100, 150];
        for (s, ms) in LatencyScenario::ALL.into_iter().zip(expected_ms) {
            assert_eq!(s.min_rtt(), Duration::from_millis(ms), "{s:?}");
        }
    }

    #[test]
    fn scenario_ids_are_contiguous() {
        let ids: Vec<u8> = LatencyScenario::ALL.iter().map(|s| s.id()).collect();
        assert_eq!(ids, VALID_SCENARIOS);
    }

    #[test]
    fn interference_ids_are_rejected() {
        for bad in [0, 1, 2, 8, -3] {
            assert!(matches!(
                resolve(bad),
                Err(TopologyError::InvalidScenario { scenario, .. }) if scenario == bad
            ));
        }
    }

    #[test]
    fn never_enables_interference_or_post_build() {
        for s in LatencyScenario::ALL {
            let topo = resolve_scenario(s).unwrap();
            assert!(topo.interference().is_none());
            assert!(!topo.post_build());
        }
    }
}
