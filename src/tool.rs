//! Pointer/tool interpretation - turns UI pointer state into the forcing
//! terms the update rules consume.
//!
//! Continuous tools (Water, Dig, Sand) follow an Idle -> Active state
//! machine driven by pointer down/up/leave. Plant is edge-triggered: one
//! obstacle stamp and one vegetation marker per pointer-down, never held.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{SimError, SimResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolKind {
    Water,
    Dig,
    Sand,
    Plant,
}

/// Vegetation species for placed plants. Purely a placement record for
/// the rendering collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Species {
    Tree,
    Bush,
    Grass,
}

/// A placed plant. The list is append-only for the session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlantMarker {
    pub uv: Vec2,
    pub species: Species,
}

/// Circular pointer brush in UV space. Flat strength, no falloff.
#[derive(Clone, Copy, Debug)]
pub struct Brush {
    pub center: Vec2,
    pub radius: f32,
    pub strength: f32,
}

/// Which terrain brush a held tool maps to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrushAction {
    Dig,
    Sand,
}

/// Per-frame tool forcing sampled by the simulation step.
#[derive(Clone, Copy, Debug)]
pub struct ToolState {
    pub kind: ToolKind,
    pub pointer: Vec2,
    pub active: bool,
    pub radius: f32,
    pub strength: f32,
}

impl ToolState {
    /// Forcing for the water rule, if any.
    pub fn water_brush(&self) -> Option<Brush> {
        if self.active && self.kind == ToolKind::Water {
            Some(Brush {
                center: self.pointer,
                radius: self.radius,
                strength: self.strength,
            })
        } else {
            None
        }
    }

    /// Forcing for the terrain rule, if any.
    pub fn terrain_brush(&self) -> Option<(BrushAction, Brush)> {
        if !self.active {
            return None;
        }
        let action = match self.kind {
            ToolKind::Dig => BrushAction::Dig,
            ToolKind::Sand => BrushAction::Sand,
            _ => return None,
        };
        Some((
            action,
            Brush {
                center: self.pointer,
                radius: self.radius,
                strength: self.strength,
            },
        ))
    }
}

/// A plant placement produced by an edge-triggered Plant pointer-down.
/// The simulation stamps the obstacle field and records the marker.
#[derive(Clone, Copy, Debug)]
pub struct PlantAction {
    pub uv: Vec2,
    pub species: Species,
}

/// Pointer state machine. The embedding UI forwards pointer events here
/// and samples `state()` once per frame before stepping the simulation.
#[derive(Debug)]
pub struct ToolController {
    kind: ToolKind,
    pointer: Vec2,
    active: bool,
    radius: f32,
    strength: f32,
    rng: StdRng,
}

impl ToolController {
    pub fn new(seed: u64) -> Self {
        Self {
            kind: ToolKind::Water,
            pointer: Vec2::ZERO,
            active: false,
            radius: 0.05,
            strength: 5.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn select(&mut self, kind: ToolKind) {
        // Switching tools mid-drag drops the drag
        if self.kind != kind {
            self.active = false;
        }
        self.kind = kind;
    }

    pub fn kind(&self) -> ToolKind {
        self.kind
    }

    pub fn set_brush(&mut self, radius: f32, strength: f32) -> SimResult<()> {
        SimError::check_finite("brush_radius", radius)?;
        SimError::check_finite("brush_strength", strength)?;
        self.radius = radius;
        self.strength = strength;
        Ok(())
    }

    fn check_uv(uv: Vec2) -> SimResult<Vec2> {
        SimError::check_finite("pointer_u", uv.x)?;
        SimError::check_finite("pointer_v", uv.y)?;
        Ok(uv.clamp(Vec2::ZERO, Vec2::ONE))
    }

    /// Pointer-down. Continuous tools go Active; Plant fires exactly once
    /// and stays Idle.
    pub fn pointer_down(&mut self, uv: Vec2) -> SimResult<Option<PlantAction>> {
        let uv = Self::check_uv(uv)?;
        self.pointer = uv;

        if self.kind == ToolKind::Plant {
            let species = match self.rng.gen_range(0..3) {
                0 => Species::Tree,
                1 => Species::Bush,
                _ => Species::Grass,
            };
            log::debug!("plant placed at ({:.3}, {:.3}): {:?}", uv.x, uv.y, species);
            return Ok(Some(PlantAction { uv, species }));
        }

        self.active = true;
        Ok(None)
    }

    pub fn pointer_move(&mut self, uv: Vec2) -> SimResult<()> {
        self.pointer = Self::check_uv(uv)?;
        Ok(())
    }

    /// Pointer-up or pointer-leave both end the drag.
    pub fn pointer_up(&mut self) {
        self.active = false;
    }

    pub fn state(&self) -> ToolState {
        ToolState {
            kind: self.kind,
            pointer: self.pointer,
            active: self.active,
            radius: self.radius,
            strength: self.strength,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continuous_tool_drag_cycle() {
        let mut tools = ToolController::new(1);
        tools.select(ToolKind::Dig);
        assert!(!tools.state().active);

        let action = tools.pointer_down(Vec2::new(0.5, 0.5)).unwrap();
        assert!(action.is_none());
        assert!(tools.state().active);

        tools.pointer_move(Vec2::new(0.6, 0.5)).unwrap();
        assert_eq!(tools.state().pointer, Vec2::new(0.6, 0.5));

        tools.pointer_up();
        assert!(!tools.state().active);
    }

    #[test]
    fn plant_is_edge_triggered() {
        let mut tools = ToolController::new(1);
        tools.select(ToolKind::Plant);

        let action = tools.pointer_down(Vec2::new(0.25, 0.75)).unwrap();
        assert!(action.is_some());
        // Holding the pointer does not keep firing
        assert!(!tools.state().active);
    }

    #[test]
    fn species_sequence_is_deterministic_per_seed() {
        let draw = |seed| {
            let mut tools = ToolController::new(seed);
            tools.select(ToolKind::Plant);
            (0..8)
                .map(|_| {
                    tools
                        .pointer_down(Vec2::new(0.5, 0.5))
                        .unwrap()
                        .unwrap()
                        .species
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(42), draw(42));
    }

    #[test]
    fn rejects_non_finite_pointer() {
        let mut tools = ToolController::new(1);
        assert!(tools.pointer_down(Vec2::new(f32::NAN, 0.5)).is_err());
        assert!(tools.pointer_move(Vec2::new(0.5, f32::INFINITY)).is_err());
        assert!(!tools.state().active);
    }

    #[test]
    fn water_and_terrain_brushes_are_exclusive() {
        let mut tools = ToolController::new(1);
        tools.select(ToolKind::Water);
        tools.pointer_down(Vec2::new(0.5, 0.5)).unwrap();

        let state = tools.state();
        assert!(state.water_brush().is_some());
        assert!(state.terrain_brush().is_none());

        tools.select(ToolKind::Sand);
        tools.pointer_down(Vec2::new(0.5, 0.5)).unwrap();
        let state = tools.state();
        assert!(state.water_brush().is_none());
        assert!(matches!(
            state.terrain_brush(),
            Some((BrushAction::Sand, _))
        ));
    }
}
