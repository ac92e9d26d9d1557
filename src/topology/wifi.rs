//! WiFi infrastructure cell construction.
//!
//! A cell is an access point on an existing spine node plus `sta_count` new
//! station nodes sharing one channel. Every cell carries its own channel,
//! PHY, SSID and grid allocator, so two cells built in the same scenario
//! never share configuration.
//!
//! Placement follows a grid allocator owned by the cell: the access point
//! takes the first slot and stays there, stations take the following slots
//! and random-walk inside the cell bounds from there.

use log::debug;

use super::mobility::{
    GridPositionAllocator, GridSpec, MobilityAssignment, MobilityModel, Rectangle,
};
use super::registry::NodeRegistry;
use super::types::{
    GroupLabel, InterfaceGroup, MediumKind, NodeId, NodeRole, RateControl, Segment, TopologyError,
    WifiCell, WirelessChannel,
};

/// Builds one WiFi cell.
#[derive(Debug, Clone)]
pub struct WifiCellBuilder {
    pub name: String,
    pub ssid: String,
    pub grid: GridSpec,
    pub walk_bounds: Rectangle,
    pub rate_control: RateControl,
}

impl WifiCellBuilder {
    pub fn new(name: impl Into<String>, ssid: impl Into<String>) -> Self {
        WifiCellBuilder {
            name: name.into(),
            ssid: ssid.into(),
            grid: GridSpec::default(),
            walk_bounds: super::mobility::default_walk_bounds(),
            rate_control: RateControl::default(),
        }
    }

    /// Build the cell on `ap_anchor` with `sta_count` stations on `channel`.
    ///
    /// Stations whose first grid slot falls outside the walk bounds are
    /// rejected before any node is created.
    pub fn build(
        &self,
        registry: &mut NodeRegistry,
        channel: WirelessChannel,
        ap_anchor: NodeId,
        sta_count: u32,
    ) -> Result<WifiCell, TopologyError> {
        match registry.role(ap_anchor) {
            None => {
                return Err(TopologyError::UnknownAnchor {
                    segment: self.name.clone(),
                    anchor: ap_anchor,
                });
            }
            Some(NodeRole::Spine) => {}
            Some(_) => {
                return Err(TopologyError::AnchorNotSpine {
                    segment: self.name.clone(),
                    anchor: ap_anchor,
                });
            }
        }

        let mut grid = GridPositionAllocator::new(self.grid);
        let ap_position = grid.next_position();

        let first_station = registry.len() as NodeId;
        let mut station_positions = Vec::new();
        for offset in 0..sta_count {
            let position = grid.next_position();
            if !self.walk_bounds.contains(&position) {
                return Err(TopologyError::StationOutsideBounds {
                    cell: self.name.clone(),
                    station: first_station.saturating_add(offset),
                    position,
                });
            }
            station_positions.push(position);
        }

        let stations = registry.create(sta_count, NodeRole::Station)?;

        let mut mobility = Vec::with_capacity(stations.len() + 1);
        mobility.push(MobilityAssignment {
            node: ap_anchor,
            model: MobilityModel::ConstantPosition,
            initial_position: ap_position,
        });
        let walk = MobilityModel::RandomWalk2d { bounds: self.walk_bounds };
        mobility.extend(stations.iter().zip(station_positions).map(|(&node, position)| {
            MobilityAssignment { node, model: walk, initial_position: position }
        }));

        let mut members = Vec::with_capacity(stations.len() + 1);
        members.push(ap_anchor);
        members.extend(stations.iter().copied());

        debug!(
            "WiFi cell '{}' (ssid {}, channel {}): ap {} at {}, stations {:?}",
            self.name, self.ssid, channel.id, ap_anchor, ap_position, stations
        );

        Ok(WifiCell {
            segment: Segment {
                name: self.name.clone(),
                medium: MediumKind::Wireless,
                members,
                groups: vec![
                    InterfaceGroup { label: GroupLabel::AccessPoint, nodes: vec![ap_anchor] },
                    InterfaceGroup { label: GroupLabel::Stations, nodes: stations.clone() },
                ],
                addresses: None,
            },
            ssid: self.ssid.clone(),
            channel,
            rate_control: self.rate_control,
            access_point: ap_anchor,
            stations,
            grid: self.grid,
            walk_bounds: self.walk_bounds,
            mobility,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::mobility::{default_walk_bounds, Position};

    fn spines(count: u32) -> NodeRegistry {
        let mut registry = NodeRegistry::new();
        registry.create(count, NodeRole::Spine).unwrap();
        registry
    }

    #[test]
    fn test_cell_has_one_ap_and_stations() {
        for sta_count in [0u32, 1, 3, 10] {
            let mut registry = spines(4);
            let cell = WifiCellBuilder::new("cell0", "ns-3-ssid")
                .build(&mut registry, WirelessChannel { id: 0 }, 0, sta_count)
                .unwrap();

            assert_eq!(cell.ap_group().unwrap().nodes, vec![0]);
            assert_eq!(cell.station_group().unwrap().nodes.len(), sta_count as usize);
            assert_eq!(cell.stations.len(), sta_count as usize);
            assert_eq!(cell.segment.len(), 1 + sta_count as usize);
            assert_eq!(cell.segment.anchor(), Some(0));
            assert_eq!(cell.ssid, "ns-3-ssid");
            assert_eq!(cell.rate_control, RateControl::Aarf);
            assert_eq!(cell.segment.medium, MediumKind::Wireless);
        }
    }

    #[test]
    fn test_mobility_per_role() {
        let mut registry = spines(4);
        let cell = WifiCellBuilder::new("cell3", "ns-3-ssid")
            .build(&mut registry, WirelessChannel { id: 1 }, 3, 3)
            .unwrap();

        let ap = cell.mobility_of(3).unwrap();
        assert_eq!(ap.model, MobilityModel::ConstantPosition);
        assert_eq!(ap.initial_position, Position::new(0.0, 0.0));

        for &sta in &cell.stations {
            let m = cell.mobility_of(sta).unwrap();
            assert_eq!(m.model, MobilityModel::RandomWalk2d { bounds: default_walk_bounds() });
        }
        assert_eq!(cell.mobility_of(cell.stations[0]).unwrap().initial_position, Position::new(5.0, 0.0));
        assert_eq!(cell.mobility_of(cell.stations[2]).unwrap().initial_position, Position::new(0.0, 10.0));
    }

    #[test]
    fn test_station_outside_bounds_is_rejected() {
        let mut registry = spines(1);
        // 3 columns, 10m rows: slot 18 sits at y = 60
        let err = WifiCellBuilder::new("cell0", "ssid")
            .build(&mut registry, WirelessChannel { id: 0 }, 0, 18)
            .unwrap_err();
        assert!(matches!(err, TopologyError::StationOutsideBounds { station: 18, .. }));
        assert_eq!(registry.len(), 1);

        let mut registry = spines(1);
        assert!(WifiCellBuilder::new("cell0", "ssid")
            .build(&mut registry, WirelessChannel { id: 0 }, 0, 17)
            .is_ok());
    }

    #[test]
    fn test_huge_station_count_stops_at_first_bad_slot() {
        let mut registry = spines(1);
        let err = WifiCellBuilder::new("cell0", "ssid")
            .build(&mut registry, WirelessChannel { id: 0 }, 0, u32::MAX)
            .unwrap_err();
        assert!(matches!(err, TopologyError::StationOutsideBounds { station: 18, .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_ap_anchor() {
        let mut registry = spines(2);
        let err = WifiCellBuilder::new("cell0", "ssid")
            .build(&mut registry, WirelessChannel { id: 0 }, 5, 1)
            .unwrap_err();
        assert!(matches!(err, TopologyError::UnknownAnchor { anchor: 5, .. }));
    }
}
