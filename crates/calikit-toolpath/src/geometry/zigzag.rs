//! Zigzag raft covering a square
//!
//! Points are laid out clockwise on the square boundary with a spacing of
//! `line_width * √2`, then re-ordered so that consecutive points sit on
//! opposite sides. Connecting them in order fills the square with 45°
//! diagonal lines in a single continuous path.

use crate::error::{ToolpathError, ToolpathResult};
use calikit_core::Point;
use std::f64::consts::SQRT_2;

/// Raft path and the line width it actually achieves
#[derive(Debug, Clone, PartialEq)]
pub struct ZigZagTrajectory {
    /// Visiting order, all at the height of the centre point
    pub points: Vec<Point>,
    /// Line width implied by the final point spacing
    pub line_width: f64,
    /// Points on each side of the square, corners included
    pub points_on_one_side: usize,
}

/// Generate a zigzag covering a `square_width` square around `center`
///
/// `line_width_hint` is the requested first layer width. The number of points
/// per side is rounded down so that `points_on_one_side - 1` is even, which
/// makes the path close symmetrically; the achieved width is derived back from
/// the resulting spacing.
pub fn generate_zigzag_trajectory(
    center: Point,
    line_width_hint: f64,
    square_width: f64,
) -> ToolpathResult<ZigZagTrajectory> {
    let side_length = square_width - line_width_hint;
    if side_length <= 0.0 || line_width_hint <= 0.0 {
        return Err(ToolpathError::Geometry(format!(
            "raft of width {:.2} cannot hold lines of width {:.2}",
            square_width, line_width_hint
        )));
    }

    let raw = (side_length / (line_width_hint * SQRT_2)).floor() as usize;
    if raw < 3 {
        return Err(ToolpathError::Geometry(format!(
            "raft side holds only {} points",
            raw
        )));
    }
    let n = raw - (raw - 1) % 2;
    let spacing = side_length / (n - 1) as f64;

    let min_x = center.x - side_length / 2.0;
    let min_y = center.y - side_length / 2.0;
    let max_x = center.x + side_length / 2.0;
    let max_y = center.y + side_length / 2.0;
    let z = center.z;

    let total = 4 * n - 4;
    let mut boundary = Vec::with_capacity(total);
    // top, left to right
    for i in 0..n {
        boundary.push(Point::new(min_x + spacing * i as f64, max_y, z));
    }
    // right, downwards
    for i in 1..n {
        boundary.push(Point::new(max_x, max_y - spacing * i as f64, z));
    }
    // bottom, right to left
    for i in 1..n {
        boundary.push(Point::new(max_x - spacing * i as f64, min_y, z));
    }
    // left, upwards, corners excluded
    for i in 1..n - 1 {
        boundary.push(Point::new(min_x, min_y + spacing * i as f64, z));
    }
    debug_assert_eq!(boundary.len(), total);

    let mut points = Vec::with_capacity(total);
    points.extend([boundary[0], boundary[total - 1], boundary[1], boundary[2]]);
    for i in (4..total).step_by(4) {
        let j = i / 2;
        points.extend([
            boundary[total - j],
            boundary[total - j - 1],
            boundary[j + 1],
            boundary[j + 2],
        ]);
    }

    Ok(ZigZagTrajectory {
        points,
        line_width: spacing / SQRT_2,
        points_on_one_side: n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn same(a: &Point, b: &Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn test_point_count_and_odd_side() {
        let center = Point::new(110.0, 110.0, 0.2);
        let raft = generate_zigzag_trajectory(center, 0.4, 50.0).unwrap();
        // 49.6 / (0.4 * √2) = 87.68 -> 87, already odd
        assert_eq!(raft.points_on_one_side, 87);
        assert_eq!(raft.points.len(), 4 * 87 - 4);
        assert_eq!((raft.points_on_one_side - 1) % 2, 0);
    }

    #[test]
    fn test_even_count_is_reduced() {
        let center = Point::new(0.0, 0.0, 0.2);
        // 49.5 / (0.5 * √2) = 70.0 -> 70 -> 69
        let raft = generate_zigzag_trajectory(center, 0.5, 50.0).unwrap();
        assert_eq!(raft.points_on_one_side, 69);
        let spacing = 49.5 / 68.0;
        assert!((raft.line_width - spacing / SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn test_no_point_is_visited_twice() {
        let center = Point::new(100.0, 80.0, 0.3);
        for hint in [0.3, 0.4, 0.45, 0.5, 0.8] {
            let raft = generate_zigzag_trajectory(center, hint, 50.0).unwrap();
            for (i, a) in raft.points.iter().enumerate() {
                for b in &raft.points[i + 1..] {
                    assert!(!same(a, b), "duplicate point {} for hint {}", a, hint);
                }
            }
        }
    }

    #[test]
    fn test_points_stay_on_boundary() {
        let center = Point::new(110.0, 110.0, 0.2);
        let raft = generate_zigzag_trajectory(center, 0.5, 50.0).unwrap();
        let half = 49.5 / 2.0;
        for p in &raft.points {
            let on_x = (p.x - center.x).abs() - half;
            let on_y = (p.y - center.y).abs() - half;
            assert!(on_x.abs() < 1e-9 || on_y.abs() < 1e-9);
            assert!(on_x < 1e-9 && on_y < 1e-9);
            assert_eq!(p.z, 0.2);
        }
    }

    #[test]
    fn test_visiting_order_starts_in_corner() {
        let center = Point::new(0.0, 0.0, 0.2);
        let raft = generate_zigzag_trajectory(center, 0.5, 50.0).unwrap();
        let half = 49.5 / 2.0;
        assert!(same(&raft.points[0], &Point::new(-half, half, 0.2)));
        // last boundary point sits on the left side just below the corner
        let spacing = 49.5 / 68.0;
        assert!(same(&raft.points[1], &Point::new(-half, half - spacing, 0.2)));
        assert!(same(&raft.points[2], &Point::new(-half + spacing, half, 0.2)));
    }

    #[test]
    fn test_too_small_raft() {
        let center = Point::new(0.0, 0.0, 0.2);
        assert!(matches!(
            generate_zigzag_trajectory(center, 2.0, 8.0),
            Err(ToolpathError::Geometry(_))
        ));
        assert!(generate_zigzag_trajectory(center, 0.5, 0.4).is_err());
    }
}
