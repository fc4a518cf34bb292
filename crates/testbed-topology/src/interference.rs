//! Interference scenarios (0–2).
//!
//! | scenario | wmediumd interference | extra stations | post-build step |
//! |----------|-----------------------|----------------|-----------------|
//! | 0        | off                   | no             | no              |
//! | 1        | −91 dBm, fading 3     | no             | no              |
//! | 2        | −91 dBm, fading 3     | `h11..h25`     | yes             |
//!
//! Every scenario uses the baseline links with their default delays.

use std::ops::RangeInclusive;

use serde::Serialize;
use tracing::{debug, info};

use crate::baseline::{self, ACCESS_PATH_LINKS, FIXED_LINKS};
use crate::error::TopologyError;
use crate::model::{
    Area, InterferenceConfig, MacAddr, Node, Station, TopologyDescriptor, Velocity,
};

pub const RESOLVER: &str = "interference";
pub const VALID_SCENARIOS: &[u8] = &[0, 1, 2];

pub const NOISE_THRESHOLD_DBM: i32 = -91;
pub const FADING_COEFFICIENT: u32 = 3;

/// Suffixes of the extra stations added by the crowded scenario.
pub const EXTRA_STATIONS: RangeInclusive<u8> = 11..=25;

const INTERFERENCE: InterferenceConfig = InterferenceConfig {
    noise_threshold_dbm: NOISE_THRESHOLD_DBM,
    fading_coefficient: FADING_COEFFICIENT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InterferenceScenario {
    /// Scenario 0.
    Clean,
    /// Scenario 1.
    Interference,
    /// Scenario 2: interference plus a crowd of mobile stations.
    Crowded,
}

/// The per-scenario fields of the descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterferenceParams {
    pub interference: Option<InterferenceConfig>,
    pub extra_stations: bool,
    pub post_build: bool,
}

impl InterferenceScenario {
    pub const ALL: [Self; 3] = [Self::Clean, Self::Interference, Self::Crowded];

    pub const fn id(self) -> u8 {
        match self {
            Self::Clean => 0,
            Self::Interference => 1,
            Self::Crowded => 2,
        }
    }

    pub const fn params(self) -> InterferenceParams {
        match self {
            Self::Clean => InterferenceParams {
                interference: None,
                extra_stations: false,
                post_build: false,
            },
            Self::Interference => InterferenceParams {
                interference: Some(INTERFERENCE),
                extra_stations: false,
                post_build: false,
            },
            Self::Crowded => InterferenceParams {
                interference: Some(INTERFERENCE),
                extra_stations: true,
                post_build: true,
            },
        }
    }
}

impl TryFrom<i64> for InterferenceScenario {
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

/// Resolve an interference scenario number into a topology.
pub fn resolve(scenario: i64) -> Result<TopologyDescriptor, TopologyError> {
    let scenario = InterferenceScenario::try_from(scenario)?;
    resolve_scenario(scenario)
}

pub fn resolve_scenario(
    scenario: InterferenceScenario,
) -> Result<TopologyDescriptor, TopologyError> {
    let params = scenario.params();
    let mut builder = baseline::builder();

    if params.extra_stations {
        for suffix in EXTRA_STATIONS {
            builder.add_extra_station(extra_station(suffix));
        }
        debug!(count = EXTRA_STATIONS.len(), "added extra mobile stations");
    }

    for spec in ACCESS_PATH_LINKS.iter().chain(FIXED_LINKS.iter()) {
        builder.add_link(spec.link());
    }

    builder
        .interference(params.interference)
        .post_build(params.post_build);

    let topology = builder.build()?;
    info!(
        resolver = RESOLVER,
        scenario = scenario.id(),
        nodes = topology.nodes().len(),
        links = topology.links().len(),
        interference = params.interference.is_some(),
        "resolved topology"
    );
    Ok(topology)
}

/// Station `h<n>` at `10.0.0.<n>`. The decimal suffix doubles as the last
/// hardware-address octet read as hex, so `h11` gets `00:00:00:00:01:11`.
fn extra_station(n: u8) -> Node {
    Node::station(
        &format!("h{n}"),
        MacAddr::from_tail(0x01, decimal_as_hex(n)),
        Station {
            address: baseline::testbed_addr(n),
            area: Area {
                min_x: 358,
                max_x: 600,
                min_y: 1140,
                max_y: 1400,
            },
            velocity: Velocity { min: 5, max: 15 },
            range: 100,
        },
    )
}

/// `25` → `0x25`. Only defined for two-digit values.
fn decimal_as_hex(n: u8) -> u8 {
    ((n / 10) << 4) | (n % 10)
}
