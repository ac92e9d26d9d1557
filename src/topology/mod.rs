//! Network topology module.
//!
//! This module contains the node registry, the segment builders (backbone,
//! CSMA, WiFi), mobility, and animation layout.

pub mod types;
pub mod registry;
pub mod mobility;
pub mod backbone;
pub mod csma;
pub mod wifi;
pub mod layout;

// Re-export key types and functions for easier access
pub use types::{
    AddressBlock, CsmaSegment, GroupLabel, InterfaceAddresses, InterfaceGroup, MediumKind, NodeId,
    NodeRole, PointToPointLink, RateControl, Segment, TopologyError, WifiCell, WirelessChannel,
};
pub use registry::NodeRegistry;
pub use backbone::{Backbone, BackboneBuilder};
pub use csma::CsmaSegmentBuilder;
pub use wifi::WifiCellBuilder;
pub use layout::animation_positions;
