//! Fixed coordinates for the animation output.
//!
//! Only nodes without a mobility model get a coordinate here; WiFi nodes are
//! positioned by their cell and moving them for the animation would change
//! the radio geometry.

use log::warn;
use std::collections::{BTreeMap, HashSet};

use super::mobility::Position;
use super::types::{CsmaSegment, NodeId};

const SPINE_ORIGIN_X: f64 = 10.0;
const SPINE_SPACING: f64 = 20.0;
const SPINE_ROW_Y: f64 = 20.0;
const HOST_SPACING: f64 = 5.0;
const HOST_ROW_OFFSET: f64 = 15.0;

/// Compute animation coordinates.
///
/// Spine nodes go on one row, CSMA hosts on a row below their anchor.
/// `overrides` replaces the computed coordinate of any listed node; overrides
/// naming a mobile node are ignored with a warning.
pub fn animation_positions(
    spines: &[NodeId],
    lans: &[CsmaSegment],
    mobile: &HashSet<NodeId>,
    overrides: &BTreeMap<NodeId, [f64; 2]>,
) -> BTreeMap<NodeId, Position> {
    let mut positions = BTreeMap::new();

    for (i, &spine) in spines.iter().enumerate() {
        if !mobile.contains(&spine) {
            positions.insert(spine, Position::new(SPINE_ORIGIN_X + SPINE_SPACING * i as f64, SPINE_ROW_Y));
        }
    }

    for lan in lans {
        let Some(anchor) = lan.segment.anchor() else { continue };
        let base = spines
            .iter()
            .position(|&s| s == anchor)
            .map(|i| SPINE_ORIGIN_X + SPINE_SPACING * i as f64)
            .unwrap_or(SPINE_ORIGIN_X);
        for (k, &host) in lan.segment.members.iter().skip(1).enumerate() {
            positions.insert(
                host,
                Position::new(base + HOST_SPACING * k as f64, SPINE_ROW_Y + HOST_ROW_OFFSET),
            );
        }
    }

    for (&node, &[x, y]) in overrides {
        if mobile.contains(&node) {
            warn!("Ignoring animation position for node {}: it has a mobility model", node);
            continue;
        }
        positions.insert(node, Position::new(x, y));
    }

    positions
}
