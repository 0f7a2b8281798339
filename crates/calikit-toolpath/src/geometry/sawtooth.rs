//! Sawtooth body used for acceleration calibration
//!
//! A layer is one closed loop. The upper run climbs and descends one tooth
//! per segment from left to right; each tooth is printed with its own
//! acceleration. A short connector drops to the lower run, which follows the
//! same teeth back from right to left at a constant slow acceleration, and a
//! second connector closes the loop.

use super::{Move, PathBuilder};
use calikit_core::Point;
use calikit_settings::{sawtooth_width, AccelerationSettings, Configuration, TOOTH_EDGE_LENGTH};
use std::f64::consts::SQRT_2;

/// Smallest vertical distance between the upper and the lower run (mm)
pub const MIN_RUN_SPACING: f64 = 2.0;

/// Horizontal width of one tooth with a 90° apex (mm)
pub fn tooth_width() -> f64 {
    TOOTH_EDGE_LENGTH * SQRT_2
}

/// Height of one tooth with a 90° apex (mm)
pub fn tooth_height() -> f64 {
    TOOTH_EDGE_LENGTH / SQRT_2
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SawtoothParams {
    pub center: Point,
    pub num_teeth: u32,
    pub line_width: f64,
    pub print_speed: u32,
    pub travel_speed: u32,
}

impl SawtoothParams {
    pub fn new(config: &Configuration, acc: &AccelerationSettings, center: Point) -> Self {
        Self {
            center,
            num_teeth: acc.num_segments,
            line_width: config.model.line_width,
            print_speed: acc.print_speed,
            travel_speed: config.machine.travel_speed,
        }
    }

    pub fn body_width(&self) -> f64 {
        sawtooth_width(self.num_teeth)
    }

    /// Vertical distance between the upper and the lower run (mm)
    ///
    /// The diagonal edges of the two runs are `spacing / √2` apart, which must
    /// leave one free line width between them.
    pub fn run_spacing(&self) -> f64 {
        MIN_RUN_SPACING.max(2.0 * self.line_width * SQRT_2)
    }

    /// Baseline of the lower run
    fn lower_base(&self) -> f64 {
        self.center.y - (tooth_height() + self.run_spacing()) / 2.0
    }

    /// Left end of both runs at height `z`
    pub fn layer_start(&self, z: f64) -> Point {
        Point::new(
            self.center.x - self.body_width() / 2.0,
            self.lower_base() + self.run_spacing(),
            z,
        )
    }
}

/// One tooth of the upper run
#[derive(Debug, Clone, PartialEq)]
pub struct Tooth {
    /// Position from the left, which is also the print order of its segment
    pub position: usize,
    /// Rising and falling edge
    pub moves: [Move; 2],
}

/// Planned moves of a sawtooth layer
#[derive(Debug, Clone, PartialEq)]
pub struct SawtoothLayer {
    /// Loop start and end point
    pub start: Point,
    /// Upper run, left to right
    pub teeth: Vec<Tooth>,
    /// Drop from the upper to the lower run
    pub down: Move,
    /// Lower run, right to left
    pub lower_run: Vec<Move>,
    /// Rise back to the loop start
    pub up: Move,
}

impl SawtoothLayer {
    /// Every move of the layer in print order
    pub fn moves(&self) -> Vec<Move> {
        let mut moves: Vec<Move> = self.teeth.iter().flat_map(|t| t.moves).collect();
        moves.push(self.down);
        moves.extend(self.lower_run.iter().copied());
        moves.push(self.up);
        moves
    }
}

/// Plan the sawtooth loop at height `z`
pub fn plan_sawtooth_layer(params: &SawtoothParams, z: f64) -> SawtoothLayer {
    let lw = params.line_width;
    let speed = params.print_speed;
    let tw = tooth_width();
    let th = tooth_height();
    let start = params.layer_start(z);
    let edge = |from: Point, to: Point| Move {
        start: from,
        end: to,
        width: lw,
        speed,
    };

    let mut cursor = start;
    let mut teeth = Vec::with_capacity(params.num_teeth as usize);
    for position in 0..params.num_teeth as usize {
        let apex = cursor.offset(tw / 2.0, th, 0.0);
        let foot = cursor.offset(tw, 0.0, 0.0);
        teeth.push(Tooth {
            position,
            moves: [edge(cursor, apex), edge(apex, foot)],
        });
        cursor = foot;
    }

    let down = edge(cursor, cursor.offset(0.0, -params.run_spacing(), 0.0));
    let mut lower = PathBuilder::new(down.end);
    for _ in 0..params.num_teeth {
        lower
            .relative(-tw / 2.0, th, lw, speed)
            .relative(-tw / 2.0, -th, lw, speed);
    }
    let up = edge(lower.cursor(), start);

    SawtoothLayer {
        start,
        teeth,
        down,
        lower_run: lower.into_moves(),
        up,
    }
}
