//! Node registry.
//!
//! Hands out node ids in creation order. The assembler owns the only
//! instance; builders receive it explicitly.

use super::types::{NodeId, NodeRole, TopologyError};

/// Every node created so far and its role.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    roles: Vec<NodeRole>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        NodeRegistry { roles: Vec::new() }
    }

    /// Create `count` nodes with the given role and return their ids.
    ///
    /// Fails without creating anything when the new ids would not fit a
    /// [`NodeId`].
    pub fn create(&mut self, count: u32, role: NodeRole) -> Result<Vec<NodeId>, TopologyError> {
        let overflow = TopologyError::TooManyNodes { requested: count, existing: self.roles.len() };
        let first = NodeId::try_from(self.roles.len()).map_err(|_| overflow.clone())?;
        let end = first.checked_add(count).ok_or(overflow)?;
        self.roles.extend(std::iter::repeat(role).take(count as usize));
        Ok((first..end).collect())
    }

    pub fn contains(&self, node: NodeId) -> bool {
        (node as usize) < self.roles.len()
    }

    pub fn role(&self, node: NodeId) -> Option<NodeRole> {
        self.roles.get(node as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn count_role(&self, role: NodeRole) -> usize {
        self.roles.iter().filter(|r| **r == role).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, NodeRole)> + '_ {
        self.roles.iter().enumerate().map(|(i, r)| (i as NodeId, *r))
    }
}
