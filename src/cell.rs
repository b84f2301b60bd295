//! Per-cell state records for the three coupled fields.

/// Water state at one cell.
///
/// `velocity` is a signed scalar net flux rate - flow direction is implicit
/// in neighbor surface comparison, not stored as a vector.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WaterCell {
    /// Water column height, never negative.
    pub height: f32,
    pub velocity: f32,
}

/// Terrain state at one cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TerrainCell {
    /// Bed height, clamped to [0, 5].
    pub height: f32,
    /// Dissolved material suspended in moving water.
    pub sediment: f32,
    /// Loose deposited sand subject to gravity settling, clamped to [0, 100].
    pub sand: f32,
    /// Per-cell render variation, assigned once when sand first appears.
    /// 0.0 means unassigned.
    pub color_seed: f32,
}

impl TerrainCell {
    /// Flat initial bed of the given height.
    pub fn flat(height: f32) -> Self {
        Self {
            height,
            ..Self::default()
        }
    }
}

/// Static drag factor painted by the plant tool. Never updated by physics.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ObstacleCell {
    /// 0.0 = open water, 1.0 = fully kills velocity.
    pub resistance: f32,
}
