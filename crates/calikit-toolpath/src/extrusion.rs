//! Filament length calculation
//!
//! The extruded volume of a line is its cross section (line width times
//! layer height) times its length in the XY plane. Dividing by the filament
//! cross section gives the length of filament to push.

use calikit_core::Point;
use std::f64::consts::PI;

/// Filament diameter (mm)
pub const FILAMENT_DIAMETER: f64 = 1.75;

/// Lines shorter than this do not extrude (mm)
pub const MIN_EXTRUSION_DISTANCE: f64 = 0.8;

/// Converts line geometry into filament length
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrusionCalculator {
    layer_height: f64,
    filament_diameter: f64,
}

impl ExtrusionCalculator {
    /// Create a calculator for the given layer height and 1.75 mm filament
    pub fn new(layer_height: f64) -> Self {
        Self {
            layer_height,
            filament_diameter: FILAMENT_DIAMETER,
        }
    }

    /// Filament length needed to print from `start` to `end` with `width`
    ///
    /// Travel moves (`width == 0`) and lines shorter than
    /// [`MIN_EXTRUSION_DISTANCE`] return zero. Z never contributes.
    pub fn extrusion(&self, start: &Point, end: &Point, width: f64) -> f64 {
        if width <= 0.0 {
            return 0.0;
        }
        let distance = start.planar_distance(end);
        if distance < MIN_EXTRUSION_DISTANCE {
            return 0.0;
        }
        width * self.layer_height * distance * 4.0 / PI / self.filament_diameter.powi(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_value() {
        let calc = ExtrusionCalculator::new(0.2);
        let a = Point::new(0.0, 0.0, 0.2);
        let b = Point::new(10.0, 0.0, 0.2);
        // 0.4 * 0.2 * 10 / (pi * 0.875^2)
        let expected = 0.8 / (PI * 0.875 * 0.875);
        assert!((calc.extrusion(&a, &b, 0.4) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_symmetric() {
        let calc = ExtrusionCalculator::new(0.3);
        let a = Point::new(12.5, 40.0, 0.3);
        let b = Point::new(-7.25, 3.5, 0.6);
        assert_eq!(calc.extrusion(&a, &b, 0.45), calc.extrusion(&b, &a, 0.45));
    }

    #[test]
    fn test_zero_cases() {
        let calc = ExtrusionCalculator::new(0.2);
        let a = Point::new(5.0, 5.0, 0.2);
        assert_eq!(calc.extrusion(&a, &a, 0.4), 0.0);
        // Z only
        assert_eq!(calc.extrusion(&a, &a.offset(0.0, 0.0, 5.0), 0.4), 0.0);
        // travel
        assert_eq!(calc.extrusion(&a, &a.offset(50.0, 0.0, 0.0), 0.0), 0.0);
        // below threshold
        let origin = Point::new(0.0, 0.0, 0.2);
        assert_eq!(calc.extrusion(&origin, &Point::new(0.79, 0.0, 0.2), 0.4), 0.0);
        assert!(calc.extrusion(&origin, &Point::new(0.8, 0.0, 0.2), 0.4) > 0.0);
    }
}
