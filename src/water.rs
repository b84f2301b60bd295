//! Water update rule - free-surface flow over the bed.
//!
//! Per-cell transition function, evaluated for every cell from the same
//! previous-frame snapshot. Surface height (water + terrain) diffuses
//! toward the 4-neighbor average, with a constant downhill bias from the
//! bed tilt, viscous damping, and obstacle drag. A fixed inflow strip at
//! the top edge feeds the stream and drains at the bottom and sides bleed
//! it off so water never piles up against the walls.

use glam::Vec2;

use crate::cell::{ObstacleCell, TerrainCell, WaterCell};
use crate::tool::Brush;

const GRAVITY: f32 = 9.8;
const SLOPE_GAIN: f32 = 5.0;

/// Inflow strip: constant spray bar across the top edge, always active.
const INFLOW_MIN_V: f32 = 0.96;
/// Bottom drain strip with exponential decay per step.
const DRAIN_MAX_V: f32 = 0.02;
const DRAIN_FACTOR: f32 = 0.9;
/// Side walls bleed off harder to prevent unbounded buildup.
const SIDE_MARGIN: f32 = 0.02;
const SIDE_FACTOR: f32 = 0.5;

/// Global scalars for one water pass.
#[derive(Clone, Copy, Debug)]
pub struct WaterParams {
    pub delta: f32,
    /// Velocity damping factor, sensible range [0.9, 0.999].
    pub viscosity: f32,
    /// Inflow strip fill rate.
    pub flow_rate: f32,
    /// Downhill forcing derived from the bed tilt.
    pub slope: f32,
    /// Water-tool brush, present only while the tool is held.
    pub brush: Option<Brush>,
}

#[inline]
fn clamped_index(width: usize, x: i32, y: i32) -> usize {
    // Edge cells treat out-of-bounds neighbors as themselves
    let max = width as i32 - 1;
    y.clamp(0, max) as usize * width + x.clamp(0, max) as usize
}

/// Transition function for one water cell. Pure with respect to the
/// snapshot; all writes saturate, no error paths.
pub fn update_cell(
    x: usize,
    y: usize,
    width: usize,
    water: &[WaterCell],
    terrain: &[TerrainCell],
    obstacles: &[ObstacleCell],
    params: &WaterParams,
) -> WaterCell {
    let idx = y * width + x;
    let cell = water[idx];
    let mut height = cell.height;
    let mut velocity = cell.velocity;

    let surface = height + terrain[idx].height;
    let (xi, yi) = (x as i32, y as i32);
    let neighbors = [
        clamped_index(width, xi - 1, yi),
        clamped_index(width, xi + 1, yi),
        clamped_index(width, xi, yi - 1),
        clamped_index(width, xi, yi + 1),
    ];
    let average = neighbors
        .iter()
        .map(|&n| water[n].height + terrain[n].height)
        .sum::<f32>()
        * 0.25;

    // Laplacian-driven acceleration toward the neighbor average,
    // plus constant downhill bias from the tilt
    velocity += (average - surface) * GRAVITY * params.delta;
    velocity += params.slope * params.delta * SLOPE_GAIN;

    // Damping and obstacle drag; resistance 1.0 fully kills velocity
    velocity *= params.viscosity * (1.0 - obstacles[idx].resistance);

    // Flux only redistributes water that exists: a dry cell in a dry
    // neighborhood stays dry no matter how steep the bare terrain is
    let wet = height > 0.0 || neighbors.iter().any(|&n| water[n].height > 0.0);
    if wet {
        height += velocity * params.delta;
        if height < 0.0 {
            // Lossy floor: velocity is intentionally not re-clamped here,
            // matching the reference behavior
            height = 0.0;
        }
    }

    let w = width as f32;
    let uv = Vec2::new((x as f32 + 0.5) / w, (y as f32 + 0.5) / w);

    // Flat brush, no falloff inside the circle
    if let Some(brush) = params.brush {
        if uv.distance(brush.center) < brush.radius {
            height += brush.strength * params.delta;
        }
    }

    if uv.y > INFLOW_MIN_V {
        height += params.flow_rate * params.delta;
    }
    if uv.y < DRAIN_MAX_V {
        height *= DRAIN_FACTOR;
    }
    if uv.x < SIDE_MARGIN || uv.x > 1.0 - SIDE_MARGIN {
        height *= SIDE_FACTOR;
    }

    WaterCell { height, velocity }
}
