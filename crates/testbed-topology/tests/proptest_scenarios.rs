//! Property-based tests for scenario validation.

use proptest::prelude::*;
use testbed_topology::{Resolver, TopologyError};

fn outside(valid: &'static [u8]) -> impl Strategy<Value = i64> {
    any::<i64>().prop_filter("scenario must be invalid", move |s| {
        !valid.iter().any(|&v| i64::from(v) == *s)
    })
}

proptest! {
    #[test]
    fn interference_rejects_everything_else(s in outside(Resolver::Interference.valid_scenarios())) {
        let err = Resolver::Interference.resolve(s).unwrap_err();
        let is_invalid_scenario = matches!(err, TopologyError::InvalidScenario { scenario, .. } if scenario == s);
        prop_assert!(is_invalid_scenario);
    }

    #[test]
    fn latency_rejects_everything_else(s in outside(Resolver::Latency.valid_scenarios())) {
        let err = Resolver::Latency.resolve(s).unwrap_err();
        let is_invalid_scenario = matches!(err, TopologyError::InvalidScenario { scenario, .. } if scenario == s);
        prop_assert!(is_invalid_scenario);
    }

    #[test]
    fn small_values_partition_between_resolvers(s in -5i64..12) {
        let interference = Resolver::Interference.resolve(s).is_ok();
        let latency = Resolver::Latency.resolve(s).is_ok();
        prop_assert!(!(interference && latency));
        prop_assert_eq!(interference, (0..=2).contains(&s));
        prop_assert_eq!(latency, (3..=7).contains(&s));
    }
}
