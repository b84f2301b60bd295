//! Terrain update rule - bed height, suspended sediment, loose sand.
//!
//! Per-cell transition function over the previous-frame snapshot, in order:
//! sand settling, tool brush, height/sand reconciliation, clamps, then
//! erosion/deposition exchange with the water column.
//!
//! Settling is reciprocal: a donor's outflow and its receivers' inflow are
//! both derived from the single pure `settle_move` decision on the same
//! snapshot, so the transfer is exactly conservative even though every
//! cell is evaluated independently.

use glam::Vec2;

use crate::cell::{TerrainCell, WaterCell};
use crate::hash::{cell_coin, cell_hash01};
use crate::tool::{Brush, BrushAction};

const MAX_HEIGHT: f32 = 5.0;
const MAX_SAND: f32 = 100.0;

/// Bed height contributed by one unit of loose sand.
const SAND_HEIGHT: f32 = 0.02;
const SAND_PER_HEIGHT: f32 = 1.0 / SAND_HEIGHT;

/// Settling only runs on cells with a real sand pile that are dry-ish.
const SETTLE_MIN_SAND: f32 = 0.1;
const SETTLE_MAX_WATER: f32 = 0.5;
/// Height gap that must be exceeded before sand moves. Prevents perpetual
/// jitter on near-flat terrain.
const STABILITY_THRESHOLD: f32 = 0.15;
/// Sand units transferred per second once a slope is unstable.
const SETTLE_RATE: f32 = 20.0;

/// Dig/Sand brushes move height at strength * delta * this gain.
const DIG_GAIN: f32 = 10.0;

/// Erosion/deposition only runs under a meaningful water column.
const EROSION_MIN_WATER: f32 = 0.05;
/// Sediment capacity per unit of water speed.
const CAPACITY_FACTOR: f32 = 2.0;
/// Fraction of deposited material that lands as loose sand.
const DEPOSIT_SAND_FRACTION: f32 = 0.5;

/// Below this the cell counts as sand-free and its color seed resets.
const SAND_EPS: f32 = 0.01;

/// Global scalars for one terrain pass.
#[derive(Clone, Copy, Debug)]
pub struct TerrainParams {
    pub delta: f32,
    pub erosion_rate: f32,
    pub deposition_rate: f32,
    /// Dig or Sand brush, present only while the tool is held.
    pub brush: Option<(BrushAction, Brush)>,
    /// Frame counter seeding the per-cell pseudo-randomness.
    pub frame: u64,
}

/// The settling decision for one donor cell: where its sand goes this step
/// and how much. Pure function of the snapshot, so receivers can replay it.
///
/// "Down" is the -y direction, toward the drain edge of the tilted bed.
/// Straight down is preferred; when blocked, the two lower diagonals are
/// tried in a per-cell per-frame pseudo-random order to avoid bias.
pub fn settle_move(
    x: usize,
    y: usize,
    width: usize,
    terrain: &[TerrainCell],
    water: &[WaterCell],
    frame: u64,
    delta: f32,
) -> Option<(usize, usize, f32)> {
    let idx = y * width + x;
    let donor = terrain[idx];

    if donor.sand <= SETTLE_MIN_SAND || water[idx].height >= SETTLE_MAX_WATER || y == 0 {
        return None;
    }

    let candidates: [i32; 3] = if cell_coin(x, y, frame) {
        [0, -1, 1]
    } else {
        [0, 1, -1]
    };

    for dx in candidates {
        let tx = x as i32 + dx;
        if tx < 0 || tx >= width as i32 {
            continue;
        }
        let tx = tx as usize;
        let ty = y - 1;
        let target = terrain[ty * width + tx];

        let gap = donor.height - target.height;
        if gap > STABILITY_THRESHOLD && target.sand < donor.sand {
            // Cap so neither the donor's sand nor its height goes negative,
            // and so one transfer cannot invert the slope
            let amount = (SETTLE_RATE * delta)
                .min(donor.sand)
                .min(donor.height * SAND_PER_HEIGHT)
                .min(gap * 0.5 * SAND_PER_HEIGHT);
            if amount > 0.0 {
                return Some((tx, ty, amount));
            }
            return None;
        }
    }

    None
}

/// Transition function for one terrain cell.
pub fn update_cell(
    x: usize,
    y: usize,
    width: usize,
    terrain: &[TerrainCell],
    water: &[WaterCell],
    params: &TerrainParams,
) -> TerrainCell {
    let idx = y * width + x;
    let mut cell = terrain[idx];

    // 1. Sand settling: own outflow, then inflow from the row above.
    //    Each donor decision is replayed from the same snapshot at both
    //    ends, so mass moves exactly once.
    if let Some((_, _, amount)) = settle_move(x, y, width, terrain, water, params.frame, params.delta)
    {
        cell.sand -= amount;
        cell.height = (cell.height - amount * SAND_HEIGHT).max(0.0);
    }
    if y + 1 < width {
        for dx in [-1i32, 0, 1] {
            let sx = x as i32 + dx;
            if sx < 0 || sx >= width as i32 {
                continue;
            }
            if let Some((tx, ty, amount)) =
                settle_move(sx as usize, y + 1, width, terrain, water, params.frame, params.delta)
            {
                if tx == x && ty == y {
                    cell.sand += amount;
                    cell.height += amount * SAND_HEIGHT;
                }
            }
        }
    }

    // 2. Tool brush
    if let Some((action, brush)) = params.brush {
        let w = width as f32;
        let uv = Vec2::new((x as f32 + 0.5) / w, (y as f32 + 0.5) / w);
        if uv.distance(brush.center) < brush.radius {
            let dh = brush.strength * params.delta * DIG_GAIN;
            match action {
                BrushAction::Dig => {
                    cell.height = (cell.height - dh).max(0.0);
                    cell.sand = (cell.sand - dh * SAND_PER_HEIGHT).max(0.0);
                }
                BrushAction::Sand => {
                    cell.height += dh;
                    cell.sand += dh * SAND_PER_HEIGHT;
                }
            }
        }
    }

    // 3. Accumulated sand always implies a minimum bed height
    cell.height = cell.height.max(cell.sand * SAND_HEIGHT);

    // 4. Clamps
    cell.height = cell.height.clamp(0.0, MAX_HEIGHT);
    cell.sand = cell.sand.clamp(0.0, MAX_SAND);

    // 5. Erosion/deposition exchange with the water column
    let column = water[idx];
    if column.height > EROSION_MIN_WATER {
        let capacity = column.velocity.abs() * CAPACITY_FACTOR;
        if capacity > cell.sediment {
            let amount = ((capacity - cell.sediment) * params.erosion_rate * params.delta)
                .min(cell.height);
            cell.height -= amount;
            cell.sediment += amount;
            // Loose sand dissolves along with the eroded bed
            cell.sand = (cell.sand - amount * SAND_PER_HEIGHT).max(0.0);
        } else {
            let amount = ((cell.sediment - capacity) * params.deposition_rate * params.delta)
                .min(cell.sediment);
            cell.height += amount;
            cell.sediment -= amount;
            cell.sand =
                (cell.sand + amount * SAND_PER_HEIGHT * DEPOSIT_SAND_FRACTION).min(MAX_SAND);
        }
        cell.height = cell.height.clamp(0.0, MAX_HEIGHT);
    }

    // 6. Lazy color seed: assigned once when sand first appears, cleared
    //    when the pile is gone
    if cell.sand > SAND_EPS {
        if cell.color_seed == 0.0 {
            cell.color_seed = cell_hash01(x, y, params.frame);
        }
    } else {
        cell.color_seed = 0.0;
    }

    cell
}
