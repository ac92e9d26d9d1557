//! The assembled scenario.
//!
//! Everything the engine needs, fully resolved: node ids, segments with
//! their planned addresses, mobility, the echo workload, and the tracing
//! plan. It is serialized as the scenario manifest and rendered into the
//! ns-3 program.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::apps::EchoApplications;
use crate::topology::mobility::{MobilityAssignment, Position};
use crate::topology::types::{AddressBlock, CsmaSegment, NodeId, NodeRole, PointToPointLink, WifiCell};

/// One node of the scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeInfo {
    pub id: NodeId,
    pub role: NodeRole,
    /// CSMA segment or WiFi cell the node was created for; `None` for spine nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
}

/// Capture and animation outputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TracingPlan {
    pub enabled: bool,
    pub pcap: bool,
    pub pcap_prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ascii_file: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub animation_positions: BTreeMap<NodeId, Position>,
}

impl TracingPlan {
    pub fn disabled(pcap_prefix: impl Into<String>) -> Self {
        TracingPlan {
            enabled: false,
            pcap: false,
            pcap_prefix: pcap_prefix.into(),
            animation_file: None,
            ascii_file: None,
            animation_positions: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    pub name: String,
    /// Simulated seconds after which the engine stops.
    pub stop_time: f64,
    pub verbose: bool,
    pub nodes: Vec<NodeInfo>,
    pub spines: Vec<NodeId>,
    pub links: Vec<PointToPointLink>,
    pub csma_segments: Vec<CsmaSegment>,
    pub wifi_cells: Vec<WifiCell>,
    /// Address blocks in the order they were planned.
    pub address_plan: Vec<AddressBlock>,
    pub applications: EchoApplications,
    pub tracing: TracingPlan,
}

impl Scenario {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn mobility_of(&self, node: NodeId) -> Option<&MobilityAssignment> {
        self.wifi_cells.iter().find_map(|c| c.mobility_of(node))
    }

    pub fn nodes_with_role(&self, role: NodeRole) -> impl Iterator<Item = &NodeInfo> + '_ {
        self.nodes.iter().filter(move |n| n.role == role)
    }
}
