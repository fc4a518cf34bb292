use thiserror::Error;

use crate::model::MacAddr;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// Scenario outside the resolver's table. Raised before any node exists.
    #[error("invalid {resolver} scenario {scenario}, expected one of {valid:?}")]
    InvalidScenario {
        resolver: &'static str,
        scenario: i64,
        valid: &'static [u8],
    },
    #[error("duplicate node name '{0}'")]
    DuplicateNode(String),
    #[error("hardware address {mac} assigned to both '{first}' and '{second}'")]
    DuplicateMac {
        mac: MacAddr,
        first: String,
        second: String,
    },
    #[error("link {a} <-> {b} references undeclared node '{missing}'")]
    UnknownEndpoint {
        a: String,
        b: String,
        missing: String,
    },
    #[error("extra station '{0}' is not a station")]
    NotAStation(String),
    #[error("link {a} <-> {b} has zero bandwidth")]
    ZeroBandwidth { a: String, b: String },
}
