//! Rectangular tower used for pressure advance calibration
//!
//! Every perimeter is traced clockwise starting from the middle of the back
//! side. Each side is split into long, short, long parts; the short part is
//! printed slowly so the speed change shows the pressure advance artifact.

use super::{Move, PathBuilder};
use calikit_core::Point;
use calikit_settings::{Configuration, PressureAdvanceSettings, TOWER_MODEL_WIDTH};

/// Short part of the right side (mm)
const RIGHT_SHORT_LINE: f64 = 20.0;
/// Short part of the front side (mm)
const FRONT_SHORT_LINE: f64 = 2.0;
/// Short part of the left side (mm)
const LEFT_SHORT_LINE: f64 = 0.2;

/// Inputs of the tower planner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TowerParams {
    pub center: Point,
    pub model_width: f64,
    pub line_width: f64,
    pub num_perimeters: u32,
    pub fast_speed: u32,
    pub slow_speed: u32,
    pub travel_speed: u32,
}

impl TowerParams {
    pub fn new(config: &Configuration, pa: &PressureAdvanceSettings, center: Point) -> Self {
        Self {
            center,
            model_width: TOWER_MODEL_WIDTH,
            line_width: config.model.line_width,
            num_perimeters: pa.num_perimeters,
            fast_speed: pa.fast_print_speed,
            slow_speed: pa.slow_print_speed,
            travel_speed: config.machine.travel_speed,
        }
    }

    /// Extra width of a layer that starts a new segment
    pub fn addition(&self, segment_start: bool) -> f64 {
        if segment_start {
            self.line_width / 2.0
        } else {
            0.0
        }
    }

    /// Start point of a layer at height `z`
    pub fn layer_start(&self, z: f64, segment_start: bool) -> Point {
        let dy = if segment_start {
            (self.model_width - self.line_width / 2.0) / 2.0
        } else {
            (self.model_width - self.line_width) / 2.0
        };
        Point::new(self.center.x, self.center.y + dy, z)
    }

    /// Width of perimeter `index`, counting from the outside
    pub fn perimeter_width(&self, index: u32, segment_start: bool) -> f64 {
        self.model_width + self.addition(segment_start) - self.line_width * 2.0 * (index + 1) as f64
    }
}

/// Plan one tower layer at height `z`, starting with a travel from `from`
///
/// Layers that start a new segment are widened by half a line width so the
/// segment boundary is visible on the finished tower.
pub fn plan_tower_layer(params: &TowerParams, from: Point, z: f64, segment_start: bool) -> Vec<Move> {
    let lw = params.line_width;
    let fast = params.fast_speed;
    let slow = params.slow_speed;

    let mut path = PathBuilder::new(from);
    path.travel_to(params.layer_start(z, segment_start), params.travel_speed);

    for j in 0..params.num_perimeters {
        let w = params.perimeter_width(j, segment_start);
        let right_long = (w - RIGHT_SHORT_LINE) / 2.0;
        let front_long = (w - FRONT_SHORT_LINE) / 2.0;
        let left_long = (w - LEFT_SHORT_LINE) / 2.0;

        // back, right half
        path.relative(w / 2.0, 0.0, lw, fast);
        // right
        path.relative(0.0, -right_long, lw, fast)
            .relative(0.0, -RIGHT_SHORT_LINE, lw, slow)
            .relative(0.0, -right_long, lw, fast);
        // front
        path.relative(-front_long, 0.0, lw, fast)
            .relative(-FRONT_SHORT_LINE, 0.0, lw, slow)
            .relative(-front_long, 0.0, lw, fast);
        // left
        path.relative(0.0, left_long, lw, fast)
            .relative(0.0, LEFT_SHORT_LINE, lw, slow)
            .relative(0.0, left_long, lw, fast);
        // back, left half
        path.relative(w / 2.0, 0.0, lw, fast);

        if j + 1 != params.num_perimeters {
            path.relative(0.0, -lw, 0.0, fast);
        }
    }

    path.into_moves()
}
