//! Streambed - miniature hydrology simulation core
//!
//! Grid-based water flow over a deformable sand/sediment bed:
//! - Double-buffered height/velocity fields on a fixed-size grid
//! - Free-surface flow toward neighbor average with slope forcing
//! - Erosion/deposition exchange between moving water and the bed
//! - Sand settling cellular automaton for loose deposited material
//! - Pointer-driven tools (water, dig, sand, plant)
//!
//! This crate is framework-agnostic - it handles simulation only.
//! Rendering, camera, and UI live with the embedding application, which
//! feeds per-frame parameters in and reads the field views back out.

pub mod cell;
pub mod error;
pub mod field;
pub mod hash;
pub mod obstacle;
pub mod sim;
pub mod terrain;
pub mod tool;
pub mod water;

pub use cell::{ObstacleCell, TerrainCell, WaterCell};
pub use error::{SimError, SimResult};
pub use field::Field;
pub use obstacle::ObstacleField;
pub use sim::{Config, RateConstants, Simulation, StepInput};
pub use tool::{
    Brush, BrushAction, PlantAction, PlantMarker, Species, ToolController, ToolKind, ToolState,
};
