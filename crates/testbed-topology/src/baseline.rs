//! Fixed node and link layout shared by every scenario.
//!
//! The five links on the `ap1 → h2` path are the access path; the latency
//! scenarios vary their delay. The remaining eight are fixed.

use std::net::Ipv4Addr;
use std::time::Duration;

use crate::model::{
    AccessPoint, Area, Controller, Link, MacAddr, MobilityKind, MobilityModel, NetAddr, Node,
    Position, PropagationKind, PropagationModel, Station, TopologyBuilder, Velocity, WifiMode,
};

pub const CONTROLLER: &str = "c0";
pub const CONTROLLER_PORT: u16 = 6653;
pub const ACCESS_POINT: &str = "ap1";
pub const MOBILE_STATION: &str = "h1";
pub const HOSTS: [&str; 3] = ["h2", "h3", "h4"];
pub const SWITCHES: [&str; 8] = ["s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9"];

/// Every testbed address lives in 10.0.0.0/8.
pub const PREFIX_LEN: u8 = 8;

/// Endpoints, bandwidth and default delay of one baseline link.
#[derive(Debug, Clone, Copy)]
pub struct LinkSpec {
    pub a: &'static str,
    pub b: &'static str,
    pub bandwidth_mbps: u32,
    pub delay: Duration,
}

impl LinkSpec {
    const fn new(a: &'static str, b: &'static str, bandwidth_mbps: u32, delay_ms: u64) -> Self {
        Self {
            a,
            b,
            bandwidth_mbps,
            delay: Duration::from_millis(delay_ms),
        }
    }

    pub fn link(&self) -> Link {
        Link::new(self.a, self.b, self.bandwidth_mbps, self.delay)
    }

    pub fn link_with_delay(&self, delay: Duration) -> Link {
        Link::new(self.a, self.b, self.bandwidth_mbps, delay)
    }
}

/// Links between the access point and `h2`, with their default delays.
pub const ACCESS_PATH_LINKS: [LinkSpec; 5] = [
    LinkSpec::new("s2", "ap1", 80, 25),
    LinkSpec::new("s2", "s9", 70, 15),
    LinkSpec::new("s9", "s3", 50, 20),
    LinkSpec::new("s3", "s4", 50, 5),
    LinkSpec::new("h2", "s4", 50, 20),
];

/// Links whose delay never changes.
pub const FIXED_LINKS: [LinkSpec; 8] = [
    LinkSpec::new("s4", "s7", 50, 5),
    LinkSpec::new("s7", "s5", 70, 10),
    LinkSpec::new("s5", "h3", 50, 5),
    LinkSpec::new("s4", "s8", 50, 5),
    LinkSpec::new("s8", "s6", 60, 5),
    LinkSpec::new("s6", "h4", 60, 12),
    LinkSpec::new("s5", "s9", 50, 10),
    LinkSpec::new("s9", "s6", 50, 5),
];

pub fn propagation() -> PropagationModel {
    PropagationModel {
        kind: PropagationKind::LogDistance,
        exponent: 4.0,
    }
}

pub fn mobility() -> MobilityModel {
    MobilityModel {
        kind: MobilityKind::RandomDirection,
        seed: 10,
        start_time: 0,
    }
}

/// `10.0.0.<last>/8`
pub fn testbed_addr(last: u8) -> NetAddr {
    NetAddr::new(Ipv4Addr::new(10, 0, 0, last), PREFIX_LEN)
}

/// A builder pre-populated with the baseline nodes and no links.
///
/// Node order follows the emulator's instantiation order: controller,
/// access point, mobile station, hosts, switches.
pub fn builder() -> TopologyBuilder {
    let mut builder = TopologyBuilder::new(propagation(), mobility());

    builder.add_node(Node::controller(
        CONTROLLER,
        Controller {
            ip: Ipv4Addr::LOCALHOST,
            port: CONTROLLER_PORT,
        },
    ));

    builder.add_node(Node::access_point(
        ACCESS_POINT,
        MacAddr::from_tail(0x00, 0x01),
        AccessPoint {
            ssid: ACCESS_POINT.to_string(),
            mode: WifiMode::G,
            channel: 5,
            position: Position {
                x: 500,
                y: 1250,
                z: 0,
            },
            range: 200,
            address: None,
        },
    ));

    builder.add_node(Node::station(
        MOBILE_STATION,
        MacAddr::from_tail(0x01, 0x01),
        Station {
            address: testbed_addr(1),
            area: Area {
                min_x: 400,
                max_x: 600,
                min_y: 1220,
                max_y: 1280,
            },
            velocity: Velocity { min: 10, max: 10 },
            range: 100,
        },
    ));

    // h2..h4 → 10.0.0.2..4, 00:..:01:02..04
    for (last, name) in (2u8..).zip(HOSTS) {
        builder.add_node(Node::host(
            name,
            MacAddr::from_tail(0x01, last),
            testbed_addr(last),
        ));
    }

    // s2..s9 → 00:..:00:02..09
    for (last, name) in (2u8..).zip(SWITCHES) {
        builder.add_node(Node::switch(name, MacAddr::from_tail(0x00, last)));
    }

    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_switch_is_wired() {
        let endpoints: HashSet<&str> = ACCESS_PATH_LINKS
            .iter()
            .chain(FIXED_LINKS.iter())
            .flat_map(|l| [l.a, l.b])
            .collect();
        for switch in SWITCHES {
            assert!(endpoints.contains(switch), "{switch} has no link");
        }
    }

    #[test]
    fn access_path_connects_ap_to_h2() {
        // Walk the path ap1 → s2 → s9 → s3 → s4 → h2 through the link table.
        let hops = ["ap1", "s2", "s9", "s3", "s4", "h2"];
        for pair in hops.windows(2) {
            assert!(
                ACCESS_PATH_LINKS
                    .iter()
                    .any(|l| (l.a == pair[0] && l.b == pair[1]) || (l.a == pair[1] && l.b == pair[0])),
                "missing hop {} - {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn baseline_builds_without_links() {
        let topo = builder().build().expect("baseline is valid");
        assert_eq!(topo.nodes().len(), 1 + 1 + 1 + HOSTS.len() + SWITCHES.len());
        assert!(topo.links().is_empty());
        assert!(topo.interference().is_none());
        assert!(!topo.post_build());
    }
}
