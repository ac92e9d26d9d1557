//! IP address registry.
//!
//! This file indexes planned addresses by node so the assembler can look up
//! where to send traffic, and flags any address handed out twice.

use std::collections::{BTreeMap, HashMap};
use std::net::Ipv4Addr;

use crate::topology::types::{AddressBlock, NodeId};

/// Every planned interface address and the node that owns it
#[derive(Debug, Default)]
pub struct AddressRegistry {
    /// Address -> owning node
    assigned_ips: HashMap<Ipv4Addr, NodeId>,
    /// Node -> its addresses in assignment order
    node_addresses: BTreeMap<NodeId, Vec<Ipv4Addr>>,
    /// Network (CIDR) -> number of interfaces in it
    subnet_counts: BTreeMap<String, usize>,
}

impl AddressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from the planner's allocation log
    pub fn from_blocks(blocks: &[AddressBlock]) -> Result<Self, String> {
        let mut registry = Self::new();
        for block in blocks {
            registry.register_block(block)?;
        }
        Ok(registry)
    }

    /// Register every interface of a block
    pub fn register_block(&mut self, block: &AddressBlock) -> Result<(), String> {
        for group in &block.interfaces {
            for &(node, address) in &group.entries {
                self.register(address, node)?;
            }
        }
        *self.subnet_counts.entry(block.cidr()).or_insert(0) +=
            block.interfaces.iter().map(|g| g.entries.len()).sum::<usize>();
        Ok(())
    }

    /// Register one address. The same address on two different nodes is an error.
    pub fn register(&mut self, address: Ipv4Addr, node: NodeId) -> Result<(), String> {
        if let Some(&existing) = self.assigned_ips.get(&address) {
            if existing != node {
                return Err(format!(
                    "IP {} already assigned to node {}, cannot assign it to node {}",
                    address, existing, node
                ));
            }
            return Ok(());
        }
        self.assigned_ips.insert(address, node);
        self.node_addresses.entry(node).or_default().push(address);
        Ok(())
    }

    /// First address assigned to a node, which is what applications target
    pub fn primary_address(&self, node: NodeId) -> Option<Ipv4Addr> {
        self.node_addresses.get(&node).and_then(|a| a.first().copied())
    }

    pub fn addresses_of(&self, node: NodeId) -> &[Ipv4Addr] {
        self.node_addresses.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get_node_for_ip(&self, address: &Ipv4Addr) -> Option<NodeId> {
        self.assigned_ips.get(address).copied()
    }

    pub fn is_ip_assigned(&self, address: &Ipv4Addr) -> bool {
        self.assigned_ips.contains_key(address)
    }

    pub fn total_assigned(&self) -> usize {
        self.assigned_ips.len()
    }

    /// Interfaces per subnet, for the summary printed after generation
    pub fn get_allocation_stats(&self) -> &BTreeMap<String, usize> {
        &self.subnet_counts
    }
}
