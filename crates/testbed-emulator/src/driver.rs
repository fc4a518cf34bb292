//! The emulator driver seam and the fixed order it is driven in.

use anyhow::Result;
use testbed_topology::{
    InterferenceConfig, Link, MobilityModel, Node, PropagationModel, Role, TopologyDescriptor,
};
use tracing::{info, warn};

/// External configuration step run after the network is started and before
/// the interactive session. Its outcome is not consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostBuildHook {
    pub command: Vec<String>,
}

impl PostBuildHook {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

/// One method per emulator step. [`launch`] calls them in order; drivers
/// never see a descriptor directly.
pub trait EmulatorDriver {
    fn create_network(&mut self, interference: Option<&InterferenceConfig>) -> Result<()>;
    fn add_node(&mut self, node: &Node) -> Result<()>;
    fn set_propagation_model(&mut self, model: &PropagationModel) -> Result<()>;
    fn set_mobility_model(&mut self, model: &MobilityModel) -> Result<()>;
    fn configure_wireless(&mut self) -> Result<()>;
    fn add_link(&mut self, link: &Link) -> Result<()>;
    fn build(&mut self) -> Result<()>;
    fn start_controller(&mut self, controller: &Node) -> Result<()>;
    fn start_datapath(&mut self, datapath: &Node, controllers: &[&Node]) -> Result<()>;
    fn post_build(&mut self, hook: &PostBuildHook) -> Result<()>;
    fn interact(&mut self) -> Result<()>;
    fn teardown(&mut self) -> Result<()>;
}

/// Drive `driver` through the full lifecycle of `topology`.
///
/// Teardown runs after the interactive step even when that step fails; the
/// interactive error wins if both fail.
pub fn launch<D: EmulatorDriver + ?Sized>(
    driver: &mut D,
    topology: &TopologyDescriptor,
    hook: &PostBuildHook,
) -> Result<()> {
    driver.create_network(topology.interference())?;

    for node in topology.nodes() {
        driver.add_node(node)?;
    }

    driver.set_propagation_model(topology.propagation())?;
    driver.set_mobility_model(topology.mobility())?;
    driver.configure_wireless()?;

    for link in topology.links() {
        driver.add_link(link)?;
    }

    driver.build()?;

    let order = topology.start_order();
    let (controllers, datapaths): (Vec<&Node>, Vec<&Node>) = order
        .into_iter()
        .partition(|n| n.role() == Role::Controller);
    for controller in &controllers {
        driver.start_controller(controller)?;
    }
    for datapath in &datapaths {
        driver.start_datapath(datapath, &controllers)?;
    }
    info!(
        controllers = controllers.len(),
        datapaths = datapaths.len(),
        "start sequence issued"
    );

    if topology.post_build() {
        driver.post_build(hook)?;
    }

    let session = driver.interact();
    if let Err(e) = driver.teardown() {
        if session.is_ok() {
            return Err(e);
        }
        warn!("teardown failed after session error: {e:#}");
    }
    session
}
