//! Terrain deformation: brush strokes and slope relaxation.
pub mod brush;
pub mod slump;

pub use brush::{falloff, lower, raise, Brush, LOWER_STRENGTH_FACTOR};
pub use slump::{max_slope_excess, slump};
