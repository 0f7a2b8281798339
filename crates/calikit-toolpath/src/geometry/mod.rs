//! Trajectory planning
//!
//! Planners produce ordered [`Move`] lists; they never format G-code and
//! never touch the motion state. All inputs are assumed validated.

pub mod sawtooth;
pub mod tower;
pub mod zigzag;

pub use sawtooth::{plan_sawtooth_layer, SawtoothLayer, SawtoothParams, Tooth};
pub use tower::{plan_tower_layer, TowerParams};
pub use zigzag::{generate_zigzag_trajectory, ZigZagTrajectory};

use calikit_core::Point;
use calikit_settings::{Configuration, Kinematics, PURGE_EDGE_MARGIN};

/// A straight move of the nozzle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Move {
    pub start: Point,
    pub end: Point,
    /// Line width, zero for travel (mm)
    pub width: f64,
    /// Speed (mm/s)
    pub speed: u32,
}

impl Move {
    pub fn is_travel(&self) -> bool {
        self.width <= 0.0
    }
}

/// Chains moves from a running cursor
#[derive(Debug, Clone)]
pub struct PathBuilder {
    cursor: Point,
    moves: Vec<Move>,
}

impl PathBuilder {
    pub fn new(start: Point) -> Self {
        Self {
            cursor: start,
            moves: Vec::new(),
        }
    }

    /// Current end of the path
    pub fn cursor(&self) -> Point {
        self.cursor
    }

    /// Print or travel to an absolute point
    pub fn line_to(&mut self, end: Point, width: f64, speed: u32) -> &mut Self {
        self.moves.push(Move {
            start: self.cursor,
            end,
            width,
            speed,
        });
        self.cursor = end;
        self
    }

    /// Travel to an absolute point without extruding
    pub fn travel_to(&mut self, end: Point, speed: u32) -> &mut Self {
        self.line_to(end, 0.0, speed)
    }

    /// Print or travel relative to the cursor
    pub fn relative(&mut self, dx: f64, dy: f64, width: f64, speed: u32) -> &mut Self {
        let end = self.cursor.offset(dx, dy, 0.0);
        self.line_to(end, width, speed)
    }

    pub fn into_moves(self) -> Vec<Move> {
        self.moves
    }
}

/// Bed center at the height of the first layer
///
/// Delta printers have their origin in the middle of the bed.
pub fn bed_center(config: &Configuration) -> Point {
    let z = config.model.layer_height;
    match config.machine.kinematics {
        Kinematics::Cartesian => Point::new(config.machine.bed_x / 2.0, config.machine.bed_y / 2.0, z),
        Kinematics::Delta => Point::new(0.0, 0.0, z),
    }
}

/// Corner points of the purge line
///
/// The line runs across the bed at `center.y - y_offset`, steps one line
/// width in +Y and comes back. Returns `[start, turn, turn, end]`.
pub fn purge_points(center: Point, bed_x: f64, y_offset: f64, line_width: f64) -> [Point; 4] {
    let start = Point::new(
        center.x - bed_x / 2.0 + PURGE_EDGE_MARGIN,
        center.y - y_offset,
        center.z,
    );
    let second = Point::new(center.x + bed_x / 2.0 - PURGE_EDGE_MARGIN, start.y, center.z);
    let third = second.offset(0.0, line_width, 0.0);
    let end = Point::new(start.x, third.y, center.z);
    [start, second, third, end]
}

/// Travel from `from` to the purge start, then print the purge line
pub fn plan_purge(
    from: Point,
    points: &[Point; 4],
    line_width: f64,
    print_speed: u32,
    travel_speed: u32,
) -> Vec<Move> {
    let mut path = PathBuilder::new(from);
    path.travel_to(points[0], travel_speed);
    for p in &points[1..] {
        path.line_to(*p, line_width, print_speed);
    }
    path.into_moves()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bed_center() {
        let mut config = Configuration::default();
        assert_eq!(bed_center(&config), Point::new(110.0, 110.0, 0.2));
        config.machine.kinematics = Kinematics::Delta;
        assert_eq!(bed_center(&config), Point::new(0.0, 0.0, 0.2));
    }

    #[test]
    fn test_purge_points() {
        let center = Point::new(110.0, 110.0, 0.2);
        let pts = purge_points(center, 220.0, 50.0, 0.5);
        assert_eq!(pts[0], Point::new(15.0, 60.0, 0.2));
        assert_eq!(pts[1], Point::new(205.0, 60.0, 0.2));
        assert_eq!(pts[2], Point::new(205.0, 60.5, 0.2));
        assert_eq!(pts[3], Point::new(15.0, 60.5, 0.2));
    }

    #[test]
    fn test_plan_purge_starts_with_travel() {
        let center = Point::new(110.0, 110.0, 0.2);
        let pts = purge_points(center, 220.0, 50.0, 0.5);
        let moves = plan_purge(Point::new(0.0, 0.0, 0.2), &pts, 0.5, 30, 150);
        assert_eq!(moves.len(), 4);
        assert!(moves[0].is_travel());
        assert_eq!(moves[0].end, pts[0]);
        assert!(moves[1..].iter().all(|m| !m.is_travel() && m.speed == 30));
        assert!(moves.windows(2).all(|w| w[0].end == w[1].start));
    }

    #[test]
    fn test_path_builder_relative() {
        let mut path = PathBuilder::new(Point::new(1.0, 1.0, 0.4));
        path.relative(2.0, 0.0, 0.4, 50).relative(0.0, -3.0, 0.0, 100);
        assert_eq!(path.cursor(), Point::new(3.0, -2.0, 0.4));
        let moves = path.into_moves();
        assert_eq!(moves[1].start, Point::new(3.0, 1.0, 0.4));
        assert!(moves[1].is_travel());
    }
}
