//! CSMA segment construction.

use log::debug;

use super::registry::NodeRegistry;
use super::types::{
    CsmaSegment, GroupLabel, InterfaceGroup, MediumKind, NodeId, NodeRole, Segment, TopologyError,
};
use crate::utils::units::{DataRate, Delay};

/// Builds a shared-bus segment around an existing spine node.
#[derive(Debug, Clone)]
pub struct CsmaSegmentBuilder {
    pub name: String,
    pub data_rate: DataRate,
    pub delay: Delay,
}

impl CsmaSegmentBuilder {
    pub fn new(name: impl Into<String>, data_rate: DataRate, delay: Delay) -> Self {
        CsmaSegmentBuilder { name: name.into(), data_rate, delay }
    }

    /// Create `extra_count` hosts and put them on one bus with `anchor`.
    ///
    /// The member list is `[anchor] + new hosts`; all members form a single
    /// interface group.
    pub fn build(
        &self,
        registry: &mut NodeRegistry,
        anchor: NodeId,
        extra_count: u32,
    ) -> Result<CsmaSegment, TopologyError> {
        match registry.role(anchor) {
            None => {
                return Err(TopologyError::UnknownAnchor { segment: self.name.clone(), anchor });
            }
            Some(NodeRole::Spine) => {}
            Some(_) => {
                return Err(TopologyError::AnchorNotSpine { segment: self.name.clone(), anchor });
            }
        }

        let hosts = registry.create(extra_count, NodeRole::CsmaHost)?;
        let mut members = Vec::with_capacity(hosts.len() + 1);
        members.push(anchor);
        members.extend(hosts);

        debug!(
            "CSMA segment '{}' on spine {}: members {:?} ({}, {})",
            self.name, anchor, members, self.data_rate, self.delay
        );

        Ok(CsmaSegment {
            segment: Segment {
                name: self.name.clone(),
                medium: MediumKind::Bus,
                groups: vec![InterfaceGroup { label: GroupLabel::Hosts, nodes: members.clone() }],
                members,
                addresses: None,
            },
            data_rate: self.data_rate,
            delay: self.delay,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> CsmaSegmentBuilder {
        CsmaSegmentBuilder::new(
            "lan1",
            DataRate::parse("100Mbps").unwrap(),
            Delay::parse("6560ns").unwrap(),
        )
    }

    #[test]
    fn test_members_are_anchor_then_extras() {
        for extra in [0u32, 1, 3, 7] {
            let mut registry = NodeRegistry::new();
            registry.create(4, NodeRole::Spine).unwrap();

            let lan = builder().build(&mut registry, 1, extra).unwrap();
            assert_eq!(lan.segment.len(), 1 + extra as usize);
            assert_eq!(lan.segment.anchor(), Some(1));
            assert_eq!(lan.segment.medium, MediumKind::Bus);
            assert_eq!(lan.segment.groups.len(), 1);
            assert_eq!(lan.segment.groups[0].nodes, lan.segment.members);
            assert_eq!(registry.len(), 4 + extra as usize);
        }
    }

    #[test]
    fn test_unknown_anchor() {
        let mut registry = NodeRegistry::new();
        registry.create(2, NodeRole::Spine).unwrap();
        let err = builder().build(&mut registry, 9, 3).unwrap_err();
        assert_eq!(err, TopologyError::UnknownAnchor { segment: "lan1".to_string(), anchor: 9 });
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_anchor_must_be_spine() {
        let mut registry = NodeRegistry::new();
        registry.create(1, NodeRole::Spine).unwrap();
        let station = registry.create(1, NodeRole::Station).unwrap()[0];
        let err = builder().build(&mut registry, station, 2).unwrap_err();
        assert!(matches!(err, TopologyError::AnchorNotSpine { anchor, .. } if anchor == station));
    }
}
