//! Topology descriptor types.
//!
//! A [`TopologyDescriptor`] is the complete, emulator-agnostic description of
//! one run: nodes, links, the propagation and mobility models, and optional
//! interference parameters. Descriptors are only produced through
//! [`TopologyBuilder::build`], which enforces the structural invariants.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::error::TopologyError;

// ── Addresses ───────────────────────────────────────────────────────

/// A 48-bit hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    /// `00:00:00:00:hi:lo`, the only shape the testbed uses.
    pub const fn from_tail(hi: u8, lo: u8) -> Self {
        MacAddr([0, 0, 0, 0, hi, lo])
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl Serialize for MacAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// IPv4 interface address with prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetAddr {
    pub ip: Ipv4Addr,
    pub prefix: u8,
}

impl NetAddr {
    pub const fn new(ip: Ipv4Addr, prefix: u8) -> Self {
        Self { ip, prefix }
    }
}

impl fmt::Display for NetAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.ip, self.prefix)
    }
}

impl Serialize for NetAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ── Nodes ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Rectangle a mobile station may move within.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Area {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

/// Speed bounds for a mobile station. `min == max` means fixed speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Velocity {
    pub min: u32,
    pub max: u32,
}

/// IEEE 802.11 mode of an access point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WifiMode {
    A,
    B,
    G,
    N,
}

impl WifiMode {
    pub fn as_str(self) -> &'static str {
        match self {
            WifiMode::A => "a",
            WifiMode::B => "b",
            WifiMode::G => "g",
            WifiMode::N => "n",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessPoint {
    pub ssid: String,
    pub mode: WifiMode,
    pub channel: u8,
    pub position: Position,
    pub range: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<NetAddr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Station {
    pub address: NetAddr,
    pub area: Area,
    pub velocity: Velocity,
    pub range: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Host {
    pub address: NetAddr,
}

/// A remote OpenFlow controller the datapaths attach to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Controller {
    pub ip: Ipv4Addr,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    AccessPoint(AccessPoint),
    Station(Station),
    Host(Host),
    Switch,
    Controller(Controller),
}

/// Payload-free discriminant of [`NodeKind`], for queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    AccessPoint,
    Station,
    Host,
    Switch,
    Controller,
}

impl NodeKind {
    pub fn role(&self) -> Role {
        match self {
            NodeKind::AccessPoint(_) => Role::AccessPoint,
            NodeKind::Station(_) => Role::Station,
            NodeKind::Host(_) => Role::Host,
            NodeKind::Switch => Role::Switch,
            NodeKind::Controller(_) => Role::Controller,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac: Option<MacAddr>,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl Node {
    pub fn access_point(name: &str, mac: MacAddr, ap: AccessPoint) -> Self {
        Self {
            name: name.to_string(),
            mac: Some(mac),
            kind: NodeKind::AccessPoint(ap),
        }
    }

    pub fn station(name: &str, mac: MacAddr, station: Station) -> Self {
        Self {
            name: name.to_string(),
            mac: Some(mac),
            kind: NodeKind::Station(station),
        }
    }

    pub fn host(name: &str, mac: MacAddr, address: NetAddr) -> Self {
        Self {
            name: name.to_string(),
            mac: Some(mac),
            kind: NodeKind::Host(Host { address }),
        }
    }

    pub fn switch(name: &str, mac: MacAddr) -> Self {
        Self {
            name: name.to_string(),
            mac: Some(mac),
            kind: NodeKind::Switch,
        }
    }

    pub fn controller(name: &str, controller: Controller) -> Self {
        Self {
            name: name.to_string(),
            mac: None,
            kind: NodeKind::Controller(controller),
        }
    }

    pub fn role(&self) -> Role {
        self.kind.role()
    }

    /// Network address, for the node kinds that carry one.
    pub fn address(&self) -> Option<NetAddr> {
        match &self.kind {
            NodeKind::AccessPoint(ap) => ap.address,
            NodeKind::Station(sta) => Some(sta.address),
            NodeKind::Host(host) => Some(host.address),
            NodeKind::Switch | NodeKind::Controller(_) => None,
        }
    }
}

// ── Links ───────────────────────────────────────────────────────────

/// A wired link between two declared nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub a: String,
    pub b: String,
    pub bandwidth_mbps: u32,
    #[serde(serialize_with = "serialize_delay")]
    pub delay: Duration,
}

impl Link {
    pub fn new(a: &str, b: &str, bandwidth_mbps: u32, delay: Duration) -> Self {
        Self {
            a: a.to_string(),
            b: b.to_string(),
            bandwidth_mbps,
            delay,
        }
    }

    /// Delay in the `tc` notation the emulator expects (`25ms`, `0.5ms`).
    pub fn delay_str(&self) -> String {
        format_delay(self.delay)
    }
}

pub fn format_delay(delay: Duration) -> String {
    let micros = delay.as_micros();
    if micros % 1000 == 0 {
        format!("{}ms", micros / 1000)
    } else {
        format!("{}ms", micros as f64 / 1000.0)
    }
}

fn serialize_delay<S: Serializer>(delay: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_delay(*delay))
}

// ── Models ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PropagationKind {
    #[serde(rename = "logDistance")]
    LogDistance,
}

impl PropagationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PropagationKind::LogDistance => "logDistance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PropagationModel {
    pub kind: PropagationKind,
    pub exponent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MobilityKind {
    RandomDirection,
}

impl MobilityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MobilityKind::RandomDirection => "RandomDirection",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MobilityModel {
    pub kind: MobilityKind,
    pub seed: u64,
    /// Seconds after start at which stations begin moving.
    pub start_time: u32,
}

/// wmediumd interference parameters. Absent means interference is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InterferenceConfig {
    pub noise_threshold_dbm: i32,
    pub fading_coefficient: u32,
}

// ── Descriptor ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopologyDescriptor {
    nodes: Vec<Node>,
    links: Vec<Link>,
    propagation: PropagationModel,
    mobility: MobilityModel,
    interference: Option<InterferenceConfig>,
    post_build: bool,
    /// Names of the stations added on top of the baseline layout.
    extra_stations: Vec<String>,
}

impl TopologyDescriptor {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn propagation(&self) -> &PropagationModel {
        &self.propagation
    }

    pub fn mobility(&self) -> &MobilityModel {
        &self.mobility
    }

    pub fn interference(&self) -> Option<&InterferenceConfig> {
        self.interference.as_ref()
    }

    /// Whether the post-build configuration step must run after the start
    /// sequence and before the interactive session.
    pub fn post_build(&self) -> bool {
        self.post_build
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// The link declared with exactly these ordered endpoints.
    pub fn link(&self, a: &str, b: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.a == a && l.b == b)
    }

    pub fn nodes_of(&self, role: Role) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().filter(move |n| n.role() == role)
    }

    pub fn count(&self, role: Role) -> usize {
        self.nodes_of(role).count()
    }

    /// OpenFlow datapaths: switches plus access points.
    pub fn datapath_count(&self) -> usize {
        self.count(Role::Switch) + self.count(Role::AccessPoint)
    }

    /// Stations added on top of the baseline layout, in declaration order.
    pub fn extra_stations(&self) -> impl Iterator<Item = &Node> + '_ {
        self.extra_stations.iter().filter_map(|name| self.node(name))
    }

    /// Stations that have no wired link; they take part only over the air.
    pub fn unlinked_stations(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes_of(Role::Station)
            .filter(move |n| !self.links.iter().any(|l| l.a == n.name || l.b == n.name))
    }

    /// Start sequence: controllers first, then access points, then switches.
    /// Datapaths within a role are ordered by name, numeric suffixes compared
    /// numerically (`s2` before `s10`).
    pub fn start_order(&self) -> Vec<&Node> {
        let mut order: Vec<&Node> = self.nodes_of(Role::Controller).collect();
        for role in [Role::AccessPoint, Role::Switch] {
            let mut group: Vec<&Node> = self.nodes_of(role).collect();
            group.sort_by(|x, y| natural_key(&x.name).cmp(&natural_key(&y.name)));
            order.extend(group);
        }
        order
    }

    /// Checks name and hardware-address uniqueness, link endpoints and
    /// link bandwidth.
    pub fn validate(&self) -> Result<(), TopologyError> {
        let mut names = HashSet::with_capacity(self.nodes.len());
        let mut macs: HashMap<MacAddr, &str> = HashMap::with_capacity(self.nodes.len());

        for node in &self.nodes {
            if !names.insert(node.name.as_str()) {
                return Err(TopologyError::DuplicateNode(node.name.clone()));
            }
            if let Some(mac) = node.mac {
                if let Some(first) = macs.insert(mac, node.name.as_str()) {
                    return Err(TopologyError::DuplicateMac {
                        mac,
                        first: first.to_string(),
                        second: node.name.clone(),
                    });
                }
            }
        }

        for name in &self.extra_stations {
            if self.node(name).map(Node::role) != Some(Role::Station) {
                return Err(TopologyError::NotAStation(name.clone()));
            }
        }

        for link in &self.links {
            for end in [&link.a, &link.b] {
                if !names.contains(end.as_str()) {
                    return Err(TopologyError::UnknownEndpoint {
                        a: link.a.clone(),
                        b: link.b.clone(),
                        missing: end.clone(),
                    });
                }
            }
            if link.bandwidth_mbps == 0 {
                return Err(TopologyError::ZeroBandwidth {
                    a: link.a.clone(),
                    b: link.b.clone(),
                });
            }
        }

        Ok(())
    }
}

fn natural_key(name: &str) -> (&str, u64) {
    let prefix = name.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &name[prefix.len()..];
    (prefix, digits.parse().unwrap_or(0))
}

// ── Builder ─────────────────────────────────────────────────────────

/// Accumulates nodes and links; [`build`](Self::build) validates.
#[derive(Debug)]
pub struct TopologyBuilder {
    nodes: Vec<Node>,
    links: Vec<Link>,
    propagation: PropagationModel,
    mobility: MobilityModel,
    interference: Option<InterferenceConfig>,
    post_build: bool,
    extra_stations: Vec<String>,
}

impl TopologyBuilder {
    pub fn new(propagation: PropagationModel, mobility: MobilityModel) -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            propagation,
            mobility,
            interference: None,
            post_build: false,
            extra_stations: Vec::new(),
        }
    }

    pub fn add_node(&mut self, node: Node) -> &mut Self {
        self.nodes.push(node);
        self
    }

    /// Add a station that is not part of the baseline layout.
    pub fn add_extra_station(&mut self, node: Node) -> &mut Self {
        self.extra_stations.push(node.name.clone());
        self.add_node(node)
    }

    pub fn add_link(&mut self, link: Link) -> &mut Self {
        self.links.push(link);
        self
    }

    pub fn interference(&mut self, config: Option<InterferenceConfig>) -> &mut Self {
        self.interference = config;
        self
    }

    pub fn post_build(&mut self, enabled: bool) -> &mut Self {
        self.post_build = enabled;
        self
    }

    pub fn build(self) -> Result<TopologyDescriptor, TopologyError> {
        let topology = TopologyDescriptor {
            nodes: self.nodes,
            links: self.links,
            propagation: self.propagation,
            mobility: self.mobility,
            interference: self.interference,
            post_build: self.post_build,
            extra_stations: self.extra_stations,
        };
        topology.validate()?;
        Ok(topology)
    }
}
