//! Interactive erosion sandbox: a height field with shallow water, carried
//! sediment, per-cell hardness and point springs.
//!
//! [`Simulation`] is the entry point. Front ends call [`Simulation::tick`]
//! once per frame and apply brush strokes between ticks; every field is
//! readable through [`Simulation::grid`].
pub mod config;
pub mod coords;
pub mod deform;
pub mod error;
pub mod generator;
pub mod grid;
pub mod hydraulic;
pub mod metrics;
pub mod normals;
pub mod simulation;
pub mod water;

pub use config::{KernelWeights, SimConfig};
pub use coords::{CellCoord, GridMapping, WorldPoint};
pub use deform::Brush;
pub use error::{Result, SandboxError};
pub use grid::{Region, SimulationGrid};
pub use metrics::FieldSummary;
pub use normals::Normal;
pub use simulation::{Simulation, SourceToggle, TickInput, TickReport};
pub use water::{RainSettings, SourceId, WaterSource};
