//! Linear parameter ramp across calibration segments
//!
//! Values always run from the larger bound down to the smaller one, whichever
//! of the two the user called "start". Segment `i` of the ramp is labelled
//! `count - i`, so segment 1 carries the smallest value and is printed first.

use crate::error::{ToolpathError, ToolpathResult};

/// `count` values from `max(start, end)` down to `min(start, end)`
pub fn linear_ramp(start: f64, end: f64, count: u32) -> ToolpathResult<Vec<f64>> {
    if count < 2 {
        return Err(ToolpathError::InvalidRamp { segments: count });
    }
    let max = start.max(end);
    let step = (end - start).abs() / (count - 1) as f64;
    Ok((0..count).map(|i| max - i as f64 * step).collect())
}

/// One calibration segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Position in the ramp, 0 holds the largest value
    pub index: u32,
    /// Label printed in the header, `count - index`
    pub number: u32,
    /// Control value used while printing this segment
    pub value: f64,
    /// Layers printed with this value
    pub layers: u32,
}

/// A ramp of control values split into labelled segments
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRamp {
    segments: Vec<Segment>,
}

impl ParameterRamp {
    /// Build a ramp where every segment spans `layers_per_segment` layers
    pub fn new(start: f64, end: f64, count: u32, layers_per_segment: u32) -> ToolpathResult<Self> {
        let values = linear_ramp(start, end, count)?;
        let segments = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| Segment {
                index: i as u32,
                number: count - i as u32,
                value,
                layers: layers_per_segment,
            })
            .collect();
        Ok(Self { segments })
    }

    /// Segments in ramp order, largest value first
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Segment printed in position `k`, counting from the first printed one
    ///
    /// Printing starts with segment number 1, the smallest value.
    pub fn printed(&self, k: usize) -> Option<&Segment> {
        self.segments.len().checked_sub(k + 1).map(|i| &self.segments[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascending_sweep() {
        let values = linear_ramp(0.0, 0.5, 5).unwrap();
        assert_eq!(values, vec![0.5, 0.375, 0.25, 0.125, 0.0]);
    }

    #[test]
    fn test_descending_sweep_matches_ascending() {
        assert_eq!(
            linear_ramp(0.5, 0.0, 5).unwrap(),
            linear_ramp(0.0, 0.5, 5).unwrap()
        );
    }

    #[test]
    fn test_two_segments_and_flat() {
        assert_eq!(linear_ramp(1000.0, 3000.0, 2).unwrap(), vec![3000.0, 1000.0]);
        assert_eq!(linear_ramp(0.1, 0.1, 3).unwrap(), vec![0.1, 0.1, 0.1]);
    }

    #[test]
    fn test_invalid_count() {
        assert!(matches!(
            linear_ramp(0.0, 1.0, 1),
            Err(ToolpathError::InvalidRamp { segments: 1 })
        ));
        assert!(linear_ramp(0.0, 1.0, 0).is_err());
    }

    #[test]
    fn test_monotonic_and_bounded() {
        for count in 2..40 {
            let values = linear_ramp(0.02, 1.3, count).unwrap();
            assert_eq!(values.len(), count as usize);
            assert_eq!(values[0], 1.3);
            assert!((values[values.len() - 1] - 0.02).abs() < 1e-12);
            assert!(values.windows(2).all(|w| w[0] > w[1]));
        }
    }

    #[test]
    fn test_segment_labels() {
        let ramp = ParameterRamp::new(0.0, 0.5, 5, 15).unwrap();
        let labels: Vec<(u32, f64)> = ramp.segments().iter().map(|s| (s.number, s.value)).collect();
        assert_eq!(
            labels,
            vec![(5, 0.5), (4, 0.375), (3, 0.25), (2, 0.125), (1, 0.0)]
        );
        assert_eq!(ramp.segments()[0].layers, 15);
    }

    #[test]
    fn test_print_order() {
        let ramp = ParameterRamp::new(1000.0, 5000.0, 5, 1).unwrap();
        assert_eq!(ramp.printed(0).map(|s| s.number), Some(1));
        assert_eq!(ramp.printed(0).map(|s| s.value), Some(1000.0));
        assert_eq!(ramp.printed(4).map(|s| s.value), Some(5000.0));
        assert_eq!(ramp.printed(5), None);
    }
}
