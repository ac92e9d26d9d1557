//! Point-to-point backbone.
//!
//! The spine nodes form a path: node `i` is linked to node `i + 1`. Every
//! link gets the same data rate and delay.

use log::debug;

use super::registry::NodeRegistry;
use super::types::{
    GroupLabel, InterfaceGroup, MediumKind, NodeId, NodeRole, PointToPointLink, Segment,
    TopologyError,
};
use crate::utils::units::{DataRate, Delay};

/// The wired spine and its links, in chain order.
#[derive(Debug, Clone)]
pub struct Backbone {
    pub spines: Vec<NodeId>,
    pub links: Vec<PointToPointLink>,
}

/// Builds a backbone chain.
#[derive(Debug, Clone)]
pub struct BackboneBuilder {
    pub data_rate: DataRate,
    pub delay: Delay,
}

impl BackboneBuilder {
    pub fn new(data_rate: DataRate, delay: Delay) -> Self {
        BackboneBuilder { data_rate, delay }
    }

    /// Create `spine_count` spine nodes and link consecutive pairs.
    pub fn build(
        &self,
        registry: &mut NodeRegistry,
        spine_count: u32,
    ) -> Result<Backbone, TopologyError> {
        if spine_count == 0 {
            return Err(TopologyError::EmptyBackbone);
        }

        let spines = registry.create(spine_count, NodeRole::Spine)?;
        let links = spines
            .windows(2)
            .enumerate()
            .map(|(i, pair)| {
                debug!("Linking spine {} <-> {} ({}, {})", pair[0], pair[1], self.data_rate, self.delay);
                PointToPointLink {
                    segment: Segment {
                        name: link_name(i),
                        medium: MediumKind::PointToPoint,
                        members: pair.to_vec(),
                        groups: vec![InterfaceGroup {
                            label: GroupLabel::Endpoints,
                            nodes: pair.to_vec(),
                        }],
                        addresses: None,
                    },
                    data_rate: self.data_rate,
                    delay: self.delay,
                }
            })
            .collect();

        Ok(Backbone { spines, links })
    }
}

/// Name of the `index`-th backbone hop.
pub fn link_name(index: usize) -> String {
    format!("link{}", index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> BackboneBuilder {
        BackboneBuilder::new(DataRate::parse("5Mbps").unwrap(), Delay::parse("2ms").unwrap())
    }

    #[test]
    fn test_four_spines_make_three_links() {
        let mut registry = NodeRegistry::new();
        let backbone = builder().build(&mut registry, 4).unwrap();

        assert_eq!(backbone.spines, vec![0, 1, 2, 3]);
        assert_eq!(backbone.links.len(), 3);
        assert_eq!(backbone.links[0].segment.members, vec![0, 1]);
        assert_eq!(backbone.links[2].segment.members, vec![2, 3]);
        assert_eq!(backbone.links[1].segment.name, "link1");
        assert!(backbone.links.iter().all(|l| l.data_rate.bps() == 5_000_000));
        assert!(backbone.links.iter().all(|l| l.delay.nanos() == 2_000_000));
    }

    #[test]
    fn test_single_spine_has_no_links() {
        let mut registry = NodeRegistry::new();
        let backbone = builder().build(&mut registry, 1).unwrap();
        assert_eq!(backbone.spines.len(), 1);
        assert!(backbone.links.is_empty());
    }

    #[test]
    fn test_empty_backbone_is_rejected() {
        let mut registry = NodeRegistry::new();
        assert_eq!(builder().build(&mut registry, 0).unwrap_err(), TopologyError::EmptyBackbone);
        assert!(registry.is_empty());
    }
}
