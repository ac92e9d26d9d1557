//! IPv4 address planning.
//!
//! Works like the ns-3 `Ipv4AddressHelper`: pick a base network, then hand
//! out consecutive host addresses to devices in the order they are given.
//! The planner keeps an ordered log of every block it has assigned.
//!
//! The planner does not look for overlap between blocks. Callers choose the
//! bases; `utils::validation::validate_distinct_subnets` checks them.

use log::debug;
use std::net::Ipv4Addr;

use crate::topology::types::{AddressBlock, InterfaceAddresses, InterfaceGroup, Segment};

/// Errors raised while planning addresses.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AddressError {
    #[error("invalid network address '{0}'")]
    InvalidNetwork(String),
    #[error("invalid network mask '{0}'")]
    InvalidMask(String),
    #[error("network {network} has host bits set for mask {mask}")]
    HostBitsSet { network: Ipv4Addr, mask: Ipv4Addr },
    #[error("no base network set before assigning addresses")]
    NoBase,
    #[error("network {network}/{prefix_len} has no host addresses left")]
    HostsExhausted { network: Ipv4Addr, prefix_len: u8 },
}

/// Parse a dotted mask and return its prefix length, rejecting non-contiguous masks.
pub fn mask_prefix_len(mask: &str) -> Result<(Ipv4Addr, u8), AddressError> {
    let parsed: Ipv4Addr = mask
        .trim()
        .parse()
        .map_err(|_| AddressError::InvalidMask(mask.to_string()))?;
    let bits = u32::from(parsed);
    let prefix_len = bits.leading_ones();
    // Contiguous masks have no ones after the first zero
    if bits.checked_shl(prefix_len).unwrap_or(0) != 0 {
        return Err(AddressError::InvalidMask(mask.to_string()));
    }
    Ok((parsed, prefix_len as u8))
}

/// Number of assignable host addresses in one subnet of `mask`.
pub fn host_capacity(mask: &str) -> Result<u32, AddressError> {
    let (mask_addr, _) = mask_prefix_len(mask)?;
    // Host 0 is the network address and the all-ones host is broadcast
    Ok((!u32::from(mask_addr)).saturating_sub(1))
}

#[derive(Debug, Clone, Copy)]
struct Base {
    network: u32,
    mask: u32,
    prefix_len: u8,
}

/// Sequential subnet and host allocator.
#[derive(Debug)]
pub struct AddressPlanner {
    base: Option<Base>,
    next_host: u32,
    allocations: Vec<AddressBlock>,
}

impl Default for AddressPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressPlanner {
    pub fn new() -> Self {
        AddressPlanner { base: None, next_host: 1, allocations: Vec::new() }
    }

    /// Select the network subsequent `assign` calls draw from; host numbering restarts at 1.
    pub fn set_base(&mut self, network: &str, mask: &str) -> Result<(), AddressError> {
        let parsed: Ipv4Addr = network
            .trim()
            .parse()
            .map_err(|_| AddressError::InvalidNetwork(network.to_string()))?;
        let (mask_addr, prefix_len) = mask_prefix_len(mask)?;

        let network_bits = u32::from(parsed);
        let mask_bits = u32::from(mask_addr);
        if network_bits & !mask_bits != 0 {
            return Err(AddressError::HostBitsSet { network: parsed, mask: mask_addr });
        }

        self.base = Some(Base { network: network_bits, mask: mask_bits, prefix_len });
        self.next_host = 1;
        Ok(())
    }

    /// Hand one address per device in `group`, in order.
    pub fn assign(&mut self, group: &InterfaceGroup) -> Result<InterfaceAddresses, AddressError> {
        let base = self.base.ok_or(AddressError::NoBase)?;
        // The all-ones host part is the broadcast address
        let broadcast_host = !base.mask;

        let mut entries = Vec::with_capacity(group.nodes.len());
        for &node in &group.nodes {
            if self.next_host >= broadcast_host {
                return Err(AddressError::HostsExhausted {
                    network: Ipv4Addr::from(base.network),
                    prefix_len: base.prefix_len,
                });
            }
            let address = Ipv4Addr::from(base.network | self.next_host);
            self.next_host += 1;
            entries.push((node, address));
        }

        Ok(InterfaceAddresses { group: group.label, entries })
    }

    /// Set `base`/`mask`, address every interface group of `segment` in order, and
    /// record the block on the segment and in the allocation log.
    pub fn assign_segment(
        &mut self,
        segment: &mut Segment,
        base: &str,
        mask: &str,
    ) -> Result<AddressBlock, AddressError> {
        self.set_base(base, mask)?;
        let interfaces = segment
            .groups
            .iter()
            .map(|group| self.assign(group))
            .collect::<Result<Vec<_>, _>>()?;

        let Some(current) = self.base else {
            return Err(AddressError::NoBase);
        };
        let block = AddressBlock {
            segment: segment.name.clone(),
            network: Ipv4Addr::from(current.network),
            mask: Ipv4Addr::from(current.mask),
            prefix_len: current.prefix_len,
            interfaces,
        };

        debug!("Assigned {} to segment '{}'", block.cidr(), segment.name);
        segment.addresses = Some(block.clone());
        self.allocations.push(block.clone());
        Ok(block)
    }

    /// Every block assigned so far, in assignment order.
    pub fn allocations(&self) -> &[AddressBlock] {
        &self.allocations
    }

    pub fn into_allocations(self) -> Vec<AddressBlock> {
        self.allocations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::types::{GroupLabel, MediumKind};

    fn segment(name: &str, groups: Vec<(GroupLabel, Vec<u32>)>) -> Segment {
        let members = groups.iter().flat_map(|(_, n)| n.clone()).collect();
        Segment {
            name: name.to_string(),
            medium: MediumKind::Bus,
            members,
            groups: groups
                .into_iter()
                .map(|(label, nodes)| InterfaceGroup { label, nodes })
                .collect(),
            addresses: None,
        }
    }

    #[test]
    fn test_mask_prefix_len() {
        assert_eq!(mask_prefix_len("255.255.255.0").unwrap().1, 24);
        assert_eq!(mask_prefix_len("255.255.0.0").unwrap().1, 16);
        assert_eq!(mask_prefix_len("255.255.255.252").unwrap().1, 30);
        assert_eq!(mask_prefix_len("0.0.0.0").unwrap().1, 0);
        assert!(mask_prefix_len("255.0.255.0").is_err());
        assert!(mask_prefix_len("not-a-mask").is_err());
    }

    #[test]
    fn test_host_capacity() {
        assert_eq!(host_capacity("255.255.255.0").unwrap(), 254);
        assert_eq!(host_capacity("255.255.255.252").unwrap(), 2);
        assert_eq!(host_capacity("255.255.255.254").unwrap(), 0);
        assert_eq!(host_capacity("255.255.255.255").unwrap(), 0);
        assert!(host_capacity("255.0.255.0").is_err());
    }

    #[test]
    fn test_sequential_hosts_in_group_order() {
        let mut planner = AddressPlanner::new();
        let mut cell = segment(
            "cell0",
            vec![(GroupLabel::AccessPoint, vec![0]), (GroupLabel::Stations, vec![10, 11, 12])],
        );

        let block = planner.assign_segment(&mut cell, "10.1.6.0", "255.255.255.0").unwrap();
        assert_eq!(block.cidr(), "10.1.6.0/24");
        assert_eq!(block.interfaces.len(), 2);
        assert_eq!(block.address_of(0), Some(Ipv4Addr::new(10, 1, 6, 1)));
        assert_eq!(block.address_of(10), Some(Ipv4Addr::new(10, 1, 6, 2)));
        assert_eq!(block.address_of(12), Some(Ipv4Addr::new(10, 1, 6, 4)));
        assert_eq!(cell.addresses.as_ref(), Some(&block));
    }

    #[test]
    fn test_new_base_restarts_host_numbering() {
        let mut planner = AddressPlanner::new();
        let mut a = segment("link0", vec![(GroupLabel::Endpoints, vec![0, 1])]);
        let mut b = segment("link1", vec![(GroupLabel::Endpoints, vec![1, 2])]);

        planner.assign_segment(&mut a, "10.1.1.0", "255.255.255.0").unwrap();
        let block = planner.assign_segment(&mut b, "10.1.2.0", "255.255.255.0").unwrap();
        assert_eq!(block.address_of(1), Some(Ipv4Addr::new(10, 1, 2, 1)));
        assert_eq!(block.address_of(2), Some(Ipv4Addr::new(10, 1, 2, 2)));

        let names: Vec<&str> = planner.allocations().iter().map(|b| b.segment.as_str()).collect();
        assert_eq!(names, vec!["link0", "link1"]);
    }

    #[test]
    fn test_assign_without_base() {
        let mut planner = AddressPlanner::new();
        let group = InterfaceGroup { label: GroupLabel::Hosts, nodes: vec![0] };
        assert_eq!(planner.assign(&group).unwrap_err(), AddressError::NoBase);
    }

    #[test]
    fn test_host_bits_rejected() {
        let mut planner = AddressPlanner::new();
        let err = planner.set_base("10.1.1.5", "255.255.255.0").unwrap_err();
        assert!(matches!(err, AddressError::HostBitsSet { .. }));
        assert!(matches!(
            planner.set_base("10.1.300.0", "255.255.255.0").unwrap_err(),
            AddressError::InvalidNetwork(_)
        ));
    }

    #[test]
    fn test_hosts_exhausted() {
        let mut planner = AddressPlanner::new();
        // A /30 has two usable hosts
        let mut lan = segment("lan", vec![(GroupLabel::Hosts, vec![0, 1, 2])]);
        let err = planner.assign_segment(&mut lan, "10.0.0.0", "255.255.255.252").unwrap_err();
        assert_eq!(
            err,
            AddressError::HostsExhausted { network: Ipv4Addr::new(10, 0, 0, 0), prefix_len: 30 }
        );
        assert!(lan.addresses.is_none());
        assert!(planner.allocations().is_empty());

        let mut full = segment("full", vec![(GroupLabel::Hosts, (0..253).collect())]);
        assert!(planner.assign_segment(&mut full, "10.0.1.0", "255.255.255.0").is_ok());
        let mut over = segment("over", vec![(GroupLabel::Hosts, (0..254).collect())]);
        assert!(planner.assign_segment(&mut over, "10.0.2.0", "255.255.255.0").is_ok());
        let mut too_many = segment("too_many", vec![(GroupLabel::Hosts, (0..255).collect())]);
        assert!(planner.assign_segment(&mut too_many, "10.0.3.0", "255.255.255.0").is_err());
    }
}
