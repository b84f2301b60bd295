//! Simulation clock - owns the fields, drives one step per external tick.
//!
//! Each step computes the full-grid water and terrain outputs from the
//! same immutable previous-frame snapshot (row-parallel, every cell
//! independent), then swaps both fields together. Obstacle paints and
//! plant placements requested mid-frame are queued and applied between
//! steps so they never interleave with a pass.

use glam::Vec2;
use rayon::prelude::*;

use crate::cell::{TerrainCell, WaterCell};
use crate::error::{SimError, SimResult};
use crate::field::Field;
use crate::obstacle::ObstacleField;
use crate::terrain::{self, TerrainParams};
use crate::tool::{PlantAction, PlantMarker, ToolState};
use crate::water::{self, WaterParams};

/// Uniform initial bed height.
const INITIAL_TERRAIN: f32 = 1.0;

/// Deltas beyond this are almost certainly a stalled tab or debugger pause.
/// They are still passed through verbatim, only flagged.
const DELTA_WARN: f32 = 1.0;

/// Static configuration, validated once at construction.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Grid resolution per side, at least 2.
    pub resolution: usize,
    /// Physical plane dimensions for UV-to-world mapping.
    pub plane_size: Vec2,
    /// Seed for plant species selection and anything else stochastic.
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resolution: 128,
            plane_size: Vec2::new(3.8, 7.8),
            seed: 0,
        }
    }
}

impl Config {
    fn validate(&self) -> SimResult<()> {
        if self.resolution < 2 {
            return Err(SimError::InvalidConfiguration(format!(
                "grid resolution must be at least 2, got {}",
                self.resolution
            )));
        }
        if !(self.plane_size.x.is_finite() && self.plane_size.x > 0.0)
            || !(self.plane_size.y.is_finite() && self.plane_size.y > 0.0)
        {
            return Err(SimError::InvalidConfiguration(format!(
                "plane size must be positive and finite, got {:?}",
                self.plane_size
            )));
        }
        Ok(())
    }
}

/// Tunable rate constants, adjustable every step from the parameter UI.
#[derive(Clone, Copy, Debug)]
pub struct RateConstants {
    pub viscosity: f32,
    pub flow_rate: f32,
    pub erosion_rate: f32,
    pub deposition_rate: f32,
}

impl Default for RateConstants {
    fn default() -> Self {
        Self {
            viscosity: 0.98,
            flow_rate: 2.0,
            erosion_rate: 0.5,
            deposition_rate: 0.5,
        }
    }
}

/// Everything the embedding application supplies for one tick.
#[derive(Clone, Copy, Debug)]
pub struct StepInput {
    /// Frame time in seconds. Passed through uncapped.
    pub delta: f32,
    /// Bed tilt in degrees; forcing is the sine of this angle.
    pub slope_degrees: f32,
    pub tool: ToolState,
    pub rates: RateConstants,
}

impl StepInput {
    fn validate(&self) -> SimResult<()> {
        SimError::check_finite("delta", self.delta)?;
        SimError::check_finite("slope_degrees", self.slope_degrees)?;
        SimError::check_finite("viscosity", self.rates.viscosity)?;
        SimError::check_finite("flow_rate", self.rates.flow_rate)?;
        SimError::check_finite("erosion_rate", self.rates.erosion_rate)?;
        SimError::check_finite("deposition_rate", self.rates.deposition_rate)?;
        SimError::check_finite("pointer_u", self.tool.pointer.x)?;
        SimError::check_finite("pointer_v", self.tool.pointer.y)?;
        SimError::check_finite("brush_radius", self.tool.radius)?;
        SimError::check_finite("brush_strength", self.tool.strength)?;
        Ok(())
    }
}

/// The simulation core: coupled water and terrain grids, the obstacle map,
/// and the session's plant list.
pub struct Simulation {
    width: usize,
    plane_size: Vec2,
    water: Field<WaterCell>,
    terrain: Field<TerrainCell>,
    obstacles: ObstacleField,
    plants: Vec<PlantMarker>,
    /// Obstacle stamps requested mid-frame, applied between steps.
    pending_paints: Vec<Vec2>,
    frame: u64,
    time: f32,
}

impl Simulation {
    pub fn new(config: Config) -> SimResult<Self> {
        config.validate()?;
        log::info!(
            "simulation grid {0}x{0}, plane {1}x{2}",
            config.resolution,
            config.plane_size.x,
            config.plane_size.y
        );
        Ok(Self {
            width: config.resolution,
            plane_size: config.plane_size,
            water: Field::new(config.resolution),
            terrain: Field::filled(config.resolution, TerrainCell::flat(INITIAL_TERRAIN)),
            obstacles: ObstacleField::new(config.resolution),
            plants: Vec::new(),
            pending_paints: Vec::new(),
            frame: 0,
            time: 0.0,
        })
    }

    /// Record a plant placement: marker now, obstacle stamp before the
    /// next step (paints must not interleave with an in-progress pass).
    pub fn place_plant(&mut self, action: PlantAction) {
        self.plants.push(PlantMarker {
            uv: action.uv,
            species: action.species,
        });
        self.pending_paints.push(action.uv);
    }

    /// Advance exactly one step.
    pub fn step(&mut self, input: &StepInput) -> SimResult<()> {
        input.validate()?;
        if input.delta > DELTA_WARN {
            log::warn!("unusually large delta {}s passed through", input.delta);
        }

        for uv in self.pending_paints.drain(..) {
            self.obstacles.paint_uv(uv);
        }

        let width = self.width;
        let water_params = WaterParams {
            delta: input.delta,
            viscosity: input.rates.viscosity,
            flow_rate: input.rates.flow_rate,
            slope: input.slope_degrees.to_radians().sin(),
            brush: input.tool.water_brush(),
        };
        let terrain_params = TerrainParams {
            delta: input.delta,
            erosion_rate: input.rates.erosion_rate,
            deposition_rate: input.rates.deposition_rate,
            brush: input.tool.terrain_brush(),
            frame: self.frame,
        };

        // Water pass: reads previous water + terrain + obstacles
        {
            let (water_cur, water_next) = self.water.buffers();
            let terrain_cur = self.terrain.current();
            let obstacles = self.obstacles.cells();
            water_next
                .par_chunks_mut(width)
                .enumerate()
                .for_each(|(y, row)| {
                    for (x, out) in row.iter_mut().enumerate() {
                        *out = water::update_cell(
                            x,
                            y,
                            width,
                            water_cur,
                            terrain_cur,
                            obstacles,
                            &water_params,
                        );
                    }
                });
        }

        // Terrain pass: reads the SAME previous water snapshot (the water
        // field has not been swapped yet)
        {
            let (terrain_cur, terrain_next) = self.terrain.buffers();
            let water_cur = self.water.current();
            terrain_next
                .par_chunks_mut(width)
                .enumerate()
                .for_each(|(y, row)| {
                    for (x, out) in row.iter_mut().enumerate() {
                        *out = terrain::update_cell(
                            x,
                            y,
                            width,
                            terrain_cur,
                            water_cur,
                            &terrain_params,
                        );
                    }
                });
        }

        // Publish both fields together
        self.water.swap();
        self.terrain.swap();
        self.frame += 1;
        self.time += input.delta;
        Ok(())
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Render sources: current (post-swap) field states.
    pub fn water(&self) -> &Field<WaterCell> {
        &self.water
    }

    pub fn terrain(&self) -> &Field<TerrainCell> {
        &self.terrain
    }

    pub fn obstacles(&self) -> &ObstacleField {
        &self.obstacles
    }

    pub fn plants(&self) -> &[PlantMarker] {
        &self.plants
    }

    /// Map a UV position to world coordinates on the configured plane,
    /// centered at the origin.
    pub fn uv_to_world(&self, uv: Vec2) -> Vec2 {
        (uv - Vec2::splat(0.5)) * self.plane_size
    }

    /// Direct terrain edit for scenario setup and tests. Writes both
    /// buffers; never call during a pass.
    pub fn set_terrain(&mut self, x: usize, y: usize, cell: TerrainCell) -> SimResult<()> {
        if x >= self.width || y >= self.width {
            return Err(SimError::OutOfRange {
                x,
                y,
                width: self.width,
            });
        }
        self.terrain.set_both(x, y, cell);
        Ok(())
    }

    /// Direct water edit, same contract as `set_terrain`.
    pub fn set_water(&mut self, x: usize, y: usize, cell: WaterCell) -> SimResult<()> {
        if x >= self.width || y >= self.width {
            return Err(SimError::OutOfRange {
                x,
                y,
                width: self.width,
            });
        }
        self.water.set_both(x, y, cell);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::ToolKind;

    fn idle_tool() -> ToolState {
        ToolState {
            kind: ToolKind::Water,
            pointer: Vec2::ZERO,
            active: false,
            radius: 0.05,
            strength: 5.0,
        }
    }

    #[test]
    fn rejects_degenerate_resolution() {
        let config = Config {
            resolution: 1,
            ..Config::default()
        };
        assert!(matches!(
            Simulation::new(config),
            Err(SimError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn rejects_non_finite_plane() {
        let config = Config {
            plane_size: Vec2::new(f32::NAN, 7.8),
            ..Config::default()
        };
        assert!(Simulation::new(config).is_err());
    }

    #[test]
    fn rejects_non_finite_delta() {
        let mut sim = Simulation::new(Config::default()).unwrap();
        let input = StepInput {
            delta: f32::NAN,
            slope_degrees: 0.0,
            tool: idle_tool(),
            rates: RateConstants::default(),
        };
        assert!(matches!(
            sim.step(&input),
            Err(SimError::InvalidStepInput { name: "delta", .. })
        ));
        assert_eq!(sim.frame(), 0);
    }

    #[test]
    fn paint_applies_before_next_step_not_immediately() {
        let mut sim = Simulation::new(Config {
            resolution: 16,
            ..Config::default()
        })
        .unwrap();

        sim.place_plant(PlantAction {
            uv: Vec2::new(0.5, 0.5),
            species: crate::tool::Species::Grass,
        });
        assert_eq!(sim.plants().len(), 1);
        assert_eq!(sim.obstacles().get(8, 8).resistance, 0.0);

        let input = StepInput {
            delta: 0.016,
            slope_degrees: 0.0,
            tool: idle_tool(),
            rates: RateConstants::default(),
        };
        sim.step(&input).unwrap();
        assert_eq!(sim.obstacles().get(8, 8).resistance, 1.0);
    }

    #[test]
    fn uv_to_world_is_centered() {
        let sim = Simulation::new(Config::default()).unwrap();
        assert_eq!(sim.uv_to_world(Vec2::new(0.5, 0.5)), Vec2::ZERO);
        assert_eq!(
            sim.uv_to_world(Vec2::new(1.0, 1.0)),
            Vec2::new(1.9, 3.9)
        );
    }
}
