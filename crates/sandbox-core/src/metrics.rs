//! Whole-grid summary statistics for logging and headless runs.
use serde::{Deserialize, Serialize};

use crate::grid::SimulationGrid;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldSummary {
    pub tick: u64,
    pub total_water: f64,
    pub total_sediment: f64,
    pub wet_cells: usize,
    pub min_height: f32,
    pub max_height: f32,
    pub mean_height: f64,
    pub mean_hardness: f64,
}

/// Summarise every field of `grid`.
pub fn summarize(grid: &SimulationGrid, tick: u64) -> FieldSummary {
    let n = grid.len().max(1) as f64;
    let h = grid.height();
    FieldSummary {
        tick,
        total_water: grid.water_depth().iter().map(|&v| v as f64).sum(),
        total_sediment: grid.sediment().iter().map(|&v| v as f64).sum(),
        wet_cells: grid.water_depth().iter().filter(|&&w| w > 0.0).count(),
        min_height: h.iter().cloned().fold(f32::INFINITY, f32::min),
        max_height: h.iter().cloned().fold(f32::NEG_INFINITY, f32::max),
        mean_height: h.iter().map(|&v| v as f64).sum::<f64>() / n,
        mean_hardness: grid.hardness().iter().map(|&v| v as f64).sum::<f64>() / n,
    }
}

/// Water-weighted mean x index; `None` when the grid is dry.
pub fn water_centroid_x(grid: &SimulationGrid) -> Option<f64> {
    let mut mass = 0.0f64;
    let mut moment = 0.0f64;
    for (i, &w) in grid.water_depth().iter().enumerate() {
        mass += w as f64;
        moment += w as f64 * grid.coord(i).x as f64;
    }
    (mass > 0.0).then(|| moment / mass)
}
