//! Topology assembler.
//!
//! Turns a validated [`Config`] into a [`Scenario`] in a fixed sequence of
//! stages:
//!
//! ```text
//! Unconfigured -> Wired -> Segmented -> Addressed -> AppsInstalled -> Traced
//! ```
//!
//! followed by `Run -> Destroyed`, which belong to the engine (see
//! `ns3::runner`). Each stage runs exactly once and only from the stage
//! before it; calling a step out of order is an error and nothing is rolled
//! back. Builders receive the node registry and channel counter explicitly
//! from the assembler context and return descriptors the context collects.

use log::{debug, info};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use crate::apps::{EchoApplications, EchoClient, EchoServer};
use crate::config::{Config, MemberSelector, SegmentKind, ValidationError, BACKBONE};
use crate::ip::{AddressError, AddressPlanner, AddressRegistry};
use crate::scenario::{NodeInfo, Scenario, TracingPlan};
use crate::topology::types::{
    CsmaSegment, NodeId, PointToPointLink, Segment, TopologyError, WifiCell, WirelessChannel,
};
use crate::topology::{
    animation_positions, BackboneBuilder, CsmaSegmentBuilder, NodeRegistry, WifiCellBuilder,
};
use crate::utils::duration::parse_duration_to_seconds;

/// Lifecycle of one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AssemblyStage {
    Unconfigured,
    Wired,
    Segmented,
    Addressed,
    AppsInstalled,
    Traced,
    Run,
    Destroyed,
}

impl fmt::Display for AssemblyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error("cannot {action} in stage {found}, it requires stage {expected}")]
    OutOfOrder {
        action: &'static str,
        expected: AssemblyStage,
        found: AssemblyStage,
    },
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error("failed to address '{segment}': {source}")]
    Address {
        segment: String,
        #[source]
        source: AddressError,
    },
    #[error("address plan conflict: {0}")]
    AddressConflict(String),
    #[error("no subnet configured for '{0}'")]
    MissingSubnet(String),
    #[error("selector {segment}[{member:?}] does not match any node")]
    UnknownNode {
        segment: String,
        member: MemberSelector,
    },
    #[error("echo server node {0} has no IPv4 address")]
    Unaddressed(NodeId),
    #[error("animation position given for node {node}, but only {count} nodes exist")]
    UnknownPositionNode { node: NodeId, count: usize },
    #[error(transparent)]
    Config(#[from] ValidationError),
}

/// State threaded through the stages. Owns every descriptor built so far.
#[derive(Debug, Default)]
struct AssemblerContext {
    registry: NodeRegistry,
    planner: AddressPlanner,
    next_channel: u32,
    spines: Vec<NodeId>,
    links: Vec<PointToPointLink>,
    lans: Vec<CsmaSegment>,
    cells: Vec<WifiCell>,
    addresses: AddressRegistry,
    applications: Option<EchoApplications>,
    tracing: Option<TracingPlan>,
}

impl AssemblerContext {
    /// A fresh channel for the next cell; cells never share one.
    fn new_channel(&mut self) -> WirelessChannel {
        let channel = WirelessChannel { id: self.next_channel };
        self.next_channel += 1;
        channel
    }
}

/// Drives one [`Config`] through the assembly stages.
#[derive(Debug)]
pub struct TopologyAssembler<'a> {
    config: &'a Config,
    stage: AssemblyStage,
    ctx: AssemblerContext,
}

impl<'a> TopologyAssembler<'a> {
    pub fn new(config: &'a Config) -> Self {
        TopologyAssembler { config, stage: AssemblyStage::Unconfigured, ctx: AssemblerContext::default() }
    }

    pub fn stage(&self) -> AssemblyStage {
        self.stage
    }

    fn require_stage(&self, action: &'static str, expected: AssemblyStage) -> Result<(), AssemblyError> {
        if self.stage != expected {
            return Err(AssemblyError::OutOfOrder { action, expected, found: self.stage });
        }
        Ok(())
    }

    /// `Unconfigured -> Wired`: create the spine nodes and link them in a chain.
    pub fn wire_backbone(&mut self) -> Result<(), AssemblyError> {
        self.require_stage("wire the backbone", AssemblyStage::Unconfigured)?;
        let config = self.config;
        let backbone_config = &config.backbone;

        let backbone = BackboneBuilder::new(backbone_config.data_rate, backbone_config.delay)
            .build(&mut self.ctx.registry, backbone_config.spine_count)?;
        info!(
            "Wired backbone: {} spine nodes, {} links at {} / {}",
            backbone.spines.len(),
            backbone.links.len(),
            backbone_config.data_rate,
            backbone_config.delay
        );

        self.ctx.spines = backbone.spines;
        self.ctx.links = backbone.links;
        self.stage = AssemblyStage::Wired;
        Ok(())
    }

    /// `Wired -> Segmented`: attach every CSMA segment, then every WiFi cell.
    pub fn attach_segments(&mut self) -> Result<(), AssemblyError> {
        self.require_stage("attach segments", AssemblyStage::Wired)?;
        let config = self.config;

        for lan_config in &config.csma_segments {
            let anchor = self.spine(lan_config.anchor, &lan_config.name)?;
            let lan = CsmaSegmentBuilder::new(&lan_config.name, lan_config.data_rate, lan_config.delay)
                .build(&mut self.ctx.registry, anchor, lan_config.extra_nodes)?;
            self.ctx.lans.push(lan);
        }

        for cell_config in &config.wifi_cells {
            let anchor = self.spine(cell_config.anchor, &cell_config.name)?;
            let builder = WifiCellBuilder {
                name: cell_config.name.clone(),
                ssid: cell_config.ssid.clone(),
                grid: cell_config.grid,
                walk_bounds: cell_config.walk_bounds,
                rate_control: cell_config.rate_control,
            };
            let channel = self.ctx.new_channel();
            let cell = builder.build(&mut self.ctx.registry, channel, anchor, cell_config.stations)?;
            self.ctx.cells.push(cell);
        }

        info!(
            "Attached {} CSMA segments and {} WiFi cells ({} nodes total)",
            self.ctx.lans.len(),
            self.ctx.cells.len(),
            self.ctx.registry.len()
        );
        self.stage = AssemblyStage::Segmented;
        Ok(())
    }

    fn spine(&self, index: u32, segment: &str) -> Result<NodeId, AssemblyError> {
        self.ctx.spines.get(index as usize).copied().ok_or_else(|| {
            TopologyError::UnknownAnchor { segment: segment.to_string(), anchor: index }.into()
        })
    }

    /// `Segmented -> Addressed`: one subnet per link/segment, in the configured order.
    pub fn assign_addresses(&mut self) -> Result<(), AssemblyError> {
        self.require_stage("assign addresses", AssemblyStage::Segmented)?;
        let config = self.config;
        let mask = config.addressing.mask.as_str();
        let ctx = &mut self.ctx;

        for kind in &config.addressing.order {
            match kind {
                SegmentKind::Backbone => {
                    for (i, link) in ctx.links.iter_mut().enumerate() {
                        let base = config
                            .backbone
                            .subnets
                            .get(i)
                            .ok_or_else(|| AssemblyError::MissingSubnet(link.segment.name.clone()))?;
                        plan_segment(&mut ctx.planner, &mut link.segment, base, mask)?;
                    }
                }
                SegmentKind::Csma => {
                    for (lan, lan_config) in ctx.lans.iter_mut().zip(&config.csma_segments) {
                        plan_segment(&mut ctx.planner, &mut lan.segment, &lan_config.subnet, mask)?;
                    }
                }
                SegmentKind::Wifi => {
                    for (cell, cell_config) in ctx.cells.iter_mut().zip(&config.wifi_cells) {
                        plan_segment(&mut ctx.planner, &mut cell.segment, &cell_config.subnet, mask)?;
                    }
                }
            }
        }

        ctx.addresses = AddressRegistry::from_blocks(ctx.planner.allocations())
            .map_err(AssemblyError::AddressConflict)?;
        info!(
            "Assigned {} subnets, {} interface addresses",
            ctx.planner.allocations().len(),
            ctx.addresses.total_assigned()
        );
        self.stage = AssemblyStage::Addressed;
        Ok(())
    }

    /// `Addressed -> AppsInstalled`: place the echo server and client.
    pub fn install_applications(&mut self) -> Result<(), AssemblyError> {
        self.require_stage("install applications", AssemblyStage::Addressed)?;
        let config = self.config;
        let apps = &config.applications;

        let server_node = self.resolve(&apps.echo_server.node.segment, apps.echo_server.node.member)?;
        let client_node = self.resolve(&apps.echo_client.node.segment, apps.echo_client.node.member)?;
        let remote = self
            .ctx
            .addresses
            .primary_address(server_node)
            .ok_or(AssemblyError::Unaddressed(server_node))?;

        let server_window = apps.echo_server.window().map_err(ValidationError::InvalidApplication)?;
        let client_window = apps.echo_client.window().map_err(ValidationError::InvalidApplication)?;
        let interval = parse_duration_to_seconds(&apps.echo_client.interval)
            .map_err(ValidationError::InvalidApplication)?;

        let applications = EchoApplications {
            server: EchoServer { node: server_node, port: apps.echo_server.port, window: server_window },
            client: EchoClient {
                node: client_node,
                remote,
                port: apps.echo_server.port,
                max_packets: apps.echo_client.max_packets,
                interval,
                packet_size: apps.echo_client.packet_size,
                window: client_window,
            },
        };
        info!(
            "Echo server on node {} ({}:{}), client on node {}",
            server_node, remote, applications.server.port, client_node
        );

        self.ctx.applications = Some(applications);
        self.stage = AssemblyStage::AppsInstalled;
        Ok(())
    }

    fn resolve(&self, segment: &str, member: MemberSelector) -> Result<NodeId, AssemblyError> {
        let members: Option<&[NodeId]> = if segment == BACKBONE {
            Some(&self.ctx.spines)
        } else {
            self.ctx
                .lans
                .iter()
                .map(|l| &l.segment)
                .chain(self.ctx.cells.iter().map(|c| &c.segment))
                .find(|s| s.name == segment)
                .map(|s| s.members.as_slice())
        };

        members
            .and_then(|m| member.pick(m))
            .ok_or_else(|| AssemblyError::UnknownNode { segment: segment.to_string(), member })
    }

    /// `AppsInstalled -> Traced`: capture files and animation coordinates, if enabled.
    pub fn configure_tracing(&mut self) -> Result<(), AssemblyError> {
        self.require_stage("configure tracing", AssemblyStage::AppsInstalled)?;
        let config = self.config;
        let tracing = &config.tracing;

        let plan = if tracing.enabled {
            if let Some(&node) = tracing.positions.keys().find(|&&n| !self.ctx.registry.contains(n)) {
                return Err(AssemblyError::UnknownPositionNode { node, count: self.ctx.registry.len() });
            }
            let mobile: HashSet<NodeId> = self
                .ctx
                .cells
                .iter()
                .flat_map(|c| c.mobility.iter().map(|m| m.node))
                .collect();
            let positions =
                animation_positions(&self.ctx.spines, &self.ctx.lans, &mobile, &tracing.positions);
            debug!("Animation positions for {} fixed nodes", positions.len());

            TracingPlan {
                enabled: true,
                pcap: tracing.pcap,
                pcap_prefix: tracing.pcap_prefix.clone(),
                animation_file: tracing.animation_file.clone(),
                ascii_file: tracing.ascii_file.clone(),
                animation_positions: if tracing.animation_file.is_some() {
                    positions
                } else {
                    Default::default()
                },
            }
        } else {
            info!("Tracing disabled");
            TracingPlan::disabled(tracing.pcap_prefix.clone())
        };

        self.ctx.tracing = Some(plan);
        self.stage = AssemblyStage::Traced;
        Ok(())
    }

    /// Freeze the scenario. Requires the `Traced` stage.
    pub fn into_scenario(self) -> Result<Scenario, AssemblyError> {
        self.require_stage("finish the scenario", AssemblyStage::Traced)?;
        let config = self.config;
        let ctx = self.ctx;

        let owner_of = |node: NodeId| -> Option<String> {
            ctx.lans
                .iter()
                .map(|l| &l.segment)
                .chain(ctx.cells.iter().map(|c| &c.segment))
                .find(|s| s.anchor() != Some(node) && s.contains(node))
                .map(|s| s.name.clone())
        };
        let nodes = ctx
            .registry
            .iter()
            .map(|(id, role)| NodeInfo { id, role, segment: owner_of(id) })
            .collect();

        let (Some(applications), Some(tracing)) = (ctx.applications, ctx.tracing) else {
            return Err(AssemblyError::OutOfOrder {
                action: "finish the scenario",
                expected: AssemblyStage::Traced,
                found: AssemblyStage::Unconfigured,
            });
        };

        Ok(Scenario {
            name: config.general.name.clone(),
            stop_time: config.general.stop_seconds()?,
            verbose: config.general.verbose,
            nodes,
            spines: ctx.spines,
            links: ctx.links,
            csma_segments: ctx.lans,
            wifi_cells: ctx.cells,
            address_plan: ctx.planner.into_allocations(),
            applications,
            tracing,
        })
    }
}

fn plan_segment(
    planner: &mut AddressPlanner,
    segment: &mut Segment,
    base: &str,
    mask: &str,
) -> Result<(), AssemblyError> {
    planner
        .assign_segment(segment, base, mask)
        .map(|_| ())
        .map_err(|source| AssemblyError::Address { segment: segment.name.clone(), source })
}

/// Validate `config` and run every assembly stage in order.
pub fn assemble(config: &Config) -> Result<Scenario, AssemblyError> {
    config.validate()?;
    let mut assembler = TopologyAssembler::new(config);
    assembler.wire_backbone()?;
    assembler.attach_segments()?;
    assembler.assign_addresses()?;
    assembler.install_applications()?;
    assembler.configure_tracing()?;
    assembler.into_scenario()
}
