//! Node placement and mobility.
//!
//! Mirrors the ns-3 `GridPositionAllocator` so that the positions recorded in
//! the scenario manifest are the ones the engine will actually use when the
//! rendered program installs mobility in the same order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point on the simulation plane. `z` is always 0 for these topologies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned rectangle, same argument order as ns-3's `Rectangle(xMin, xMax, yMin, yMax)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Rectangle {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Rectangle { x_min, x_max, y_min, y_max }
    }

    /// Closed-interval containment, matching ns-3's `Rectangle::IsInside`.
    pub fn contains(&self, position: &Position) -> bool {
        position.x >= self.x_min
            && position.x <= self.x_max
            && position.y >= self.y_min
            && position.y <= self.y_max
    }

    pub fn is_well_formed(&self) -> bool {
        self.x_min < self.x_max && self.y_min < self.y_max
    }
}

/// Default random-walk area for WiFi stations.
pub fn default_walk_bounds() -> Rectangle {
    Rectangle::new(-50.0, 50.0, -50.0, 50.0)
}

/// Fill order of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GridLayout {
    #[default]
    RowFirst,
    ColumnFirst,
}

impl GridLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            GridLayout::RowFirst => "RowFirst",
            GridLayout::ColumnFirst => "ColumnFirst",
        }
    }
}

/// Grid allocator parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    #[serde(default)]
    pub min_x: f64,
    #[serde(default)]
    pub min_y: f64,
    #[serde(default = "default_delta_x")]
    pub delta_x: f64,
    #[serde(default = "default_delta_y")]
    pub delta_y: f64,
    #[serde(default = "default_grid_width")]
    pub grid_width: u32,
    #[serde(default)]
    pub layout: GridLayout,
}

fn default_delta_x() -> f64 {
    5.0
}

fn default_delta_y() -> f64 {
    10.0
}

fn default_grid_width() -> u32 {
    3
}

impl Default for GridSpec {
    fn default() -> Self {
        GridSpec {
            min_x: 0.0,
            min_y: 0.0,
            delta_x: default_delta_x(),
            delta_y: default_delta_y(),
            grid_width: default_grid_width(),
            layout: GridLayout::RowFirst,
        }
    }
}

/// Hands out grid slots in order. Each WiFi cell owns one.
#[derive(Debug, Clone)]
pub struct GridPositionAllocator {
    spec: GridSpec,
    current: u32,
}

impl GridPositionAllocator {
    pub fn new(spec: GridSpec) -> Self {
        GridPositionAllocator { spec, current: 0 }
    }

    /// Position of the next slot; advances the allocator.
    pub fn next_position(&mut self) -> Position {
        let n = self.spec.grid_width.max(1);
        let (col, row) = match self.spec.layout {
            GridLayout::RowFirst => (self.current % n, self.current / n),
            GridLayout::ColumnFirst => (self.current / n, self.current % n),
        };
        self.current += 1;
        Position::new(
            self.spec.min_x + self.spec.delta_x * col as f64,
            self.spec.min_y + self.spec.delta_y * row as f64,
        )
    }
}

/// Mobility model kinds used by the topologies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MobilityModel {
    /// Pinned in place for the whole run.
    ConstantPosition,
    /// 2-D random walk reflected at the rectangle edges.
    RandomWalk2d { bounds: Rectangle },
}

impl MobilityModel {
    /// ns-3 TypeId of the model.
    pub fn type_id(&self) -> &'static str {
        match self {
            MobilityModel::ConstantPosition => "ns3::ConstantPositionMobilityModel",
            MobilityModel::RandomWalk2d { .. } => "ns3::RandomWalk2dMobilityModel",
        }
    }

    pub fn is_mobile(&self) -> bool {
        !matches!(self, MobilityModel::ConstantPosition)
    }
}

/// Mobility installed on one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MobilityAssignment {
    pub node: u32,
    pub model: MobilityModel,
    pub initial_position: Position,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_first_grid() {
        let mut grid = GridPositionAllocator::new(GridSpec::default());
        let positions: Vec<Position> = (0..5).map(|_| grid.next_position()).collect();
        assert_eq!(positions[0], Position::new(0.0, 0.0));
        assert_eq!(positions[1], Position::new(5.0, 0.0));
        assert_eq!(positions[2], Position::new(10.0, 0.0));
        assert_eq!(positions[3], Position::new(0.0, 10.0));
        assert_eq!(positions[4], Position::new(5.0, 10.0));
    }

    #[test]
    fn test_column_first_grid() {
        let spec = GridSpec {
            layout: GridLayout::ColumnFirst,
            grid_width: 2,
            ..GridSpec::default()
        };
        let mut grid = GridPositionAllocator::new(spec);
        assert_eq!(grid.next_position(), Position::new(0.0, 0.0));
        assert_eq!(grid.next_position(), Position::new(0.0, 10.0));
        assert_eq!(grid.next_position(), Position::new(5.0, 0.0));
    }

    #[test]
    fn test_rectangle_contains_edges() {
        let bounds = default_walk_bounds();
        assert!(bounds.contains(&Position::new(50.0, -50.0)));
        assert!(bounds.contains(&Position::new(0.0, 0.0)));
        assert!(!bounds.contains(&Position::new(0.0, 60.0)));
        assert!(bounds.is_well_formed());
        assert!(!Rectangle::new(1.0, 1.0, 0.0, 2.0).is_well_formed());
    }

    #[test]
    fn test_model_type_ids() {
        assert_eq!(
            MobilityModel::ConstantPosition.type_id(),
            "ns3::ConstantPositionMobilityModel"
        );
        let walk = MobilityModel::RandomWalk2d { bounds: default_walk_bounds() };
        assert_eq!(walk.type_id(), "ns3::RandomWalk2dMobilityModel");
        assert!(walk.is_mobile());
        assert!(!MobilityModel::ConstantPosition.is_mobile());
    }
}
