//! Scenario-to-topology resolution for the wireless testbed.
//!
//! A scenario is a small integer that selects one fixed combination of
//! topology parameters. Two independent resolvers exist:
//!
//! - [`interference`]: scenarios 0–2, toggling wmediumd interference and
//!   a crowd of 15 extra mobile stations
//! - [`latency`]: scenarios 3–7, varying the delay of the five links on the
//!   access path between `h1` and `h2`
//!
//! Both produce a [`TopologyDescriptor`] on top of the shared
//! [`baseline`] layout. Resolution is pure: no I/O, no shared state.

pub mod baseline;
pub mod error;
pub mod interference;
pub mod latency;
pub mod model;

pub use error::TopologyError;
pub use interference::{InterferenceParams, InterferenceScenario};
pub use latency::LatencyScenario;
pub use model::{
    AccessPoint, Area, Controller, Host, InterferenceConfig, Link, MacAddr, MobilityKind,
    MobilityModel, NetAddr, Node, NodeKind, Position, PropagationKind, PropagationModel, Role,
    Station, TopologyBuilder, TopologyDescriptor, Velocity, WifiMode,
};

/// Which resolver a run uses. Exactly one is selected per run, by entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolver {
    Interference,
    Latency,
}

impl Resolver {
    pub fn name(self) -> &'static str {
        match self {
            Resolver::Interference => interference::RESOLVER,
            Resolver::Latency => latency::RESOLVER,
        }
    }

    pub fn valid_scenarios(self) -> &'static [u8] {
        match self {
            Resolver::Interference => interference::VALID_SCENARIOS,
            Resolver::Latency => latency::VALID_SCENARIOS,
        }
    }

    pub fn resolve(self, scenario: i64) -> Result<TopologyDescriptor, TopologyError> {
        match self {
            Resolver::Interference => interference::resolve(scenario),
            Resolver::Latency => latency::resolve(scenario),
        }
    }
}
