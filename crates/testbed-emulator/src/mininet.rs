//! Mininet-WiFi driver.
//!
//! Renders each driver step as Python against the `mn_wifi` API. The result
//! is a standalone program that [`ScriptRunner`](crate::runner::ScriptRunner)
//! executes; the Mininet CLI it ends in is the interactive session.

use std::fmt::Write as _;

use anyhow::{bail, Result};
use testbed_topology::{
    InterferenceConfig, Link, MobilityModel, Node, NodeKind, PropagationModel,
};
use tracing::debug;

use crate::driver::{EmulatorDriver, PostBuildHook};

const PRELUDE: &str = r#"#!/usr/bin/env python3
# Generated by testbed-emulator.
import subprocess

from mininet.node import Controller, RemoteController
from mininet.log import setLogLevel, info
from mn_wifi.cli import CLI
from mn_wifi.net import Mininet_wifi
from mn_wifi.link import wmediumd
from mn_wifi.wmediumdConnector import interference

setLogLevel("info")
nodes = {}
"#;

/// Python program under construction.
#[derive(Debug, Clone)]
pub struct MininetScript {
    source: String,
    network_created: bool,
    links_started: bool,
    session_open: bool,
}

impl Default for MininetScript {
    fn default() -> Self {
        Self::new()
    }
}

impl MininetScript {
    pub fn new() -> Self {
        Self {
            source: PRELUDE.to_string(),
            network_created: false,
            links_started: false,
            session_open: false,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn into_source(self) -> String {
        self.source
    }

    fn banner(&mut self, text: &str) -> Result<()> {
        self.banner_at("", text)
    }

    fn banner_at(&mut self, indent: &str, text: &str) -> Result<()> {
        writeln!(
            self.source,
            "{indent}info({})",
            py_str(&format!("*** {text}\n"))?
        )?;
        Ok(())
    }

    fn ensure_network(&self) -> Result<()> {
        if !self.network_created {
            bail!("network must be created before adding to it");
        }
        Ok(())
    }
}

/// Python string literal. JSON string escapes are valid Python escapes.
fn py_str(s: &str) -> Result<String> {
    Ok(serde_json::to_string(s)?)
}

fn node_ref(name: &str) -> Result<String> {
    Ok(format!("nodes[{}]", py_str(name)?))
}

impl EmulatorDriver for MininetScript {
    fn create_network(&mut self, interference: Option<&InterferenceConfig>) -> Result<()> {
        if self.network_created {
            bail!("network already created");
        }
        match interference {
            None => writeln!(
                self.source,
                "net = Mininet_wifi(controller=Controller, link=wmediumd)"
            )?,
            Some(cfg) => writeln!(
                self.source,
                "net = Mininet_wifi(controller=Controller, link=wmediumd, \
                 wmediumd_mode=interference, noise_th={}, fading_cof={})",
                cfg.noise_threshold_dbm, cfg.fading_coefficient
            )?,
        }
        self.network_created = true;
        self.banner("Creating nodes")
    }

    fn add_node(&mut self, node: &Node) -> Result<()> {
        self.ensure_network()?;
        let name = py_str(&node.name)?;
        let mac = match node.mac {
            Some(mac) => format!(", mac={}", py_str(&mac.to_string())?),
            None => String::new(),
        };

        let call = match &node.kind {
            NodeKind::Controller(c) => format!(
                "net.addController({name}, controller=RemoteController, ip={}, port={})",
                py_str(&c.ip.to_string())?,
                c.port
            ),
            NodeKind::AccessPoint(ap) => {
                let ip = match ap.address {
                    Some(addr) => format!(", ip={}", py_str(&addr.to_string())?),
                    None => String::new(),
                };
                format!(
                    "net.addAccessPoint({name}, ssid={}{mac}{ip}, mode={}, channel={}, \
                     position={}, range={})",
                    py_str(&ap.ssid)?,
                    py_str(ap.mode.as_str())?,
                    py_str(&ap.channel.to_string())?,
                    py_str(&format!(
                        "{},{},{}",
                        ap.position.x, ap.position.y, ap.position.z
                    ))?,
                    ap.range
                )
            }
            NodeKind::Station(sta) => format!(
                "net.addStation({name}, ip={}{mac}, min_x={}, max_x={}, min_y={}, max_y={}, \
                 min_v={}, max_v={}, range={})",
                py_str(&sta.address.to_string())?,
                sta.area.min_x,
                sta.area.max_x,
                sta.area.min_y,
                sta.area.max_y,
                sta.velocity.min,
                sta.velocity.max,
                sta.range
            ),
            NodeKind::Host(host) => format!(
                "net.addHost({name}, ip={}{mac})",
                py_str(&host.address.to_string())?
            ),
            NodeKind::Switch => format!("net.addSwitch({name}{mac})"),
        };

        debug!(node = %node.name, role = ?node.role(), "rendered node");
        writeln!(self.source, "nodes[{name}] = {call}")?;
        Ok(())
    }

    fn set_propagation_model(&mut self, model: &PropagationModel) -> Result<()> {
        self.ensure_network()?;
        self.banner("Configuring propagation model")?;
        writeln!(
            self.source,
            "net.setPropagationModel(model={}, exp={})",
            py_str(model.kind.as_str())?,
            model.exponent
        )?;
        Ok(())
    }

    fn set_mobility_model(&mut self, model: &MobilityModel) -> Result<()> {
        self.ensure_network()?;
        writeln!(
            self.source,
            "net.setMobilityModel(time={}, model={}, seed={})",
            model.start_time,
            py_str(model.kind.as_str())?,
            model.seed
        )?;
        Ok(())
    }

    fn configure_wireless(&mut self) -> Result<()> {
        self.ensure_network()?;
        self.banner("Configuring wifi nodes")?;
        writeln!(self.source, "net.configureWifiNodes()")?;
        Ok(())
    }

    fn add_link(&mut self, link: &Link) -> Result<()> {
        self.ensure_network()?;
        if !self.links_started {
            self.banner("Creating links")?;
            self.links_started = true;
        }
        writeln!(
            self.source,
            "net.addLink({}, {}, bw={}, delay={})",
            node_ref(&link.a)?,
            node_ref(&link.b)?,
            link.bandwidth_mbps,
            py_str(&link.delay_str())?
        )?;
        Ok(())
    }

    fn build(&mut self) -> Result<()> {
        self.ensure_network()?;
        self.banner("Starting network")?;
        writeln!(self.source, "net.build()")?;
        Ok(())
    }

    fn start_controller(&mut self, controller: &Node) -> Result<()> {
        writeln!(self.source, "{}.start()", node_ref(&controller.name)?)?;
        Ok(())
    }

    fn start_datapath(&mut self, datapath: &Node, controllers: &[&Node]) -> Result<()> {
        let refs = controllers
            .iter()
            .map(|c| node_ref(&c.name))
            .collect::<Result<Vec<_>>>()?;
        writeln!(
            self.source,
            "{}.start([{}])",
            node_ref(&datapath.name)?,
            refs.join(", ")
        )?;
        Ok(())
    }

    fn post_build(&mut self, hook: &PostBuildHook) -> Result<()> {
        if hook.command.is_empty() {
            bail!("post-build command is empty");
        }
        // The hook's outcome is not consumed; a missing or unusable
        // command must not abort the session.
        self.banner("Running post-build configuration")?;
        writeln!(self.source, "try:")?;
        writeln!(
            self.source,
            "    subprocess.call({})",
            serde_json::to_string(&hook.command)?
        )?;
        writeln!(self.source, "except OSError as exc:")?;
        writeln!(
            self.source,
            "    info({} % exc)",
            py_str("*** Post-build configuration failed: %s\n")?
        )?;
        Ok(())
    }

    fn interact(&mut self) -> Result<()> {
        writeln!(self.source, "try:")?;
        writeln!(self.source, "    CLI(net)")?;
        self.session_open = true;
        Ok(())
    }

    fn teardown(&mut self) -> Result<()> {
        let indent = if self.session_open {
            writeln!(self.source, "finally:")?;
            self.session_open = false;
            "    "
        } else {
            ""
        };
        self.banner_at(indent, "Stopping network")?;
        writeln!(self.source, "{indent}net.stop()")?;
        Ok(())
    }
}
