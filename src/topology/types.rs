//! Topology type definitions.
//!
//! Descriptors returned by the builders and collected by the assembler. None
//! of them hold references into each other; everything is addressed by node
//! id so the finished scenario can be serialized as-is.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

use super::mobility::{GridSpec, MobilityAssignment, Rectangle};
use crate::utils::units::{DataRate, Delay};

/// Index of a node in the scenario; equals the ns-3 node id.
pub type NodeId = u32;

/// What a node is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// Member of the point-to-point backbone chain.
    Spine,
    /// Extra host on a CSMA segment.
    CsmaHost,
    /// WiFi station.
    Station,
}

/// Kind of shared medium behind a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediumKind {
    PointToPoint,
    Bus,
    Wireless,
}

/// Logical interface group within a segment. Addressing walks groups in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupLabel {
    Endpoints,
    Hosts,
    AccessPoint,
    Stations,
}

impl fmt::Display for GroupLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GroupLabel::Endpoints => "endpoints",
            GroupLabel::Hosts => "hosts",
            GroupLabel::AccessPoint => "ap",
            GroupLabel::Stations => "stations",
        };
        f.write_str(s)
    }
}

/// Devices installed on one medium for one group of nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceGroup {
    pub label: GroupLabel,
    pub nodes: Vec<NodeId>,
}

/// Addresses handed to one interface group, in device order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceAddresses {
    pub group: GroupLabel,
    pub entries: Vec<(NodeId, Ipv4Addr)>,
}

impl InterfaceAddresses {
    pub fn address_of(&self, node: NodeId) -> Option<Ipv4Addr> {
        self.entries.iter().find(|(n, _)| *n == node).map(|(_, a)| *a)
    }
}

/// One planned subnet and everything assigned inside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressBlock {
    pub segment: String,
    pub network: Ipv4Addr,
    pub mask: Ipv4Addr,
    pub prefix_len: u8,
    pub interfaces: Vec<InterfaceAddresses>,
}

impl AddressBlock {
    pub fn address_of(&self, node: NodeId) -> Option<Ipv4Addr> {
        self.interfaces.iter().find_map(|g| g.address_of(node))
    }

    pub fn cidr(&self) -> String {
        format!("{}/{}", self.network, self.prefix_len)
    }
}

/// A set of nodes sharing one communication medium.
///
/// Members are ordered anchor first. `addresses` stays `None` until the
/// address planner has run over the segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub name: String,
    pub medium: MediumKind,
    pub members: Vec<NodeId>,
    pub groups: Vec<InterfaceGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<AddressBlock>,
}

impl Segment {
    pub fn anchor(&self) -> Option<NodeId> {
        self.members.first().copied()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.members.contains(&node)
    }
}

/// One backbone hop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointToPointLink {
    pub segment: Segment,
    pub data_rate: DataRate,
    pub delay: Delay,
}

/// A shared-bus Ethernet segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsmaSegment {
    pub segment: Segment,
    pub data_rate: DataRate,
    pub delay: Delay,
}

/// Station manager installed on every device in a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RateControl {
    #[default]
    Aarf,
    Arf,
    Minstrel,
    Ideal,
}

impl RateControl {
    pub fn type_id(&self) -> &'static str {
        match self {
            RateControl::Aarf => "ns3::AarfWifiManager",
            RateControl::Arf => "ns3::ArfWifiManager",
            RateControl::Minstrel => "ns3::MinstrelWifiManager",
            RateControl::Ideal => "ns3::IdealWifiManager",
        }
    }
}

/// The wireless channel and PHY owned by exactly one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct WirelessChannel {
    pub id: u32,
}

/// A WiFi infrastructure cell: one access point on a spine node plus stations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WifiCell {
    pub segment: Segment,
    pub ssid: String,
    pub channel: WirelessChannel,
    pub rate_control: RateControl,
    pub access_point: NodeId,
    pub stations: Vec<NodeId>,
    /// Grid the access point and stations were placed on, AP in slot 0.
    pub grid: GridSpec,
    pub walk_bounds: Rectangle,
    pub mobility: Vec<MobilityAssignment>,
}

impl WifiCell {
    pub fn ap_group(&self) -> Option<&InterfaceGroup> {
        self.segment.groups.iter().find(|g| g.label == GroupLabel::AccessPoint)
    }

    pub fn station_group(&self) -> Option<&InterfaceGroup> {
        self.segment.groups.iter().find(|g| g.label == GroupLabel::Stations)
    }

    pub fn mobility_of(&self, node: NodeId) -> Option<&MobilityAssignment> {
        self.mobility.iter().find(|m| m.node == node)
    }
}

/// Preconditions the builders enforce before touching the registry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TopologyError {
    #[error("segment '{segment}' is anchored on node {anchor}, which does not exist")]
    UnknownAnchor { segment: String, anchor: NodeId },
    #[error("segment '{segment}' must be anchored on a spine node, node {anchor} is not one")]
    AnchorNotSpine { segment: String, anchor: NodeId },
    #[error("backbone needs at least one spine node")]
    EmptyBackbone,
    #[error("cannot create {requested} more nodes after {existing}: node ids would overflow")]
    TooManyNodes { requested: u32, existing: usize },
    #[error("cell '{cell}': station {station} starts at {position}, outside its random-walk bounds")]
    StationOutsideBounds {
        cell: String,
        station: NodeId,
        position: super::mobility::Position,
    },
}
