//! Hydrology step: outflow → erosion/deposition → commit → slumping.
//!
//! Injection (rain and sources) happens before this step and writes straight
//! into the committed water depth; see `crate::water`.
pub mod erosion;
pub mod flow;

use crate::config::SimConfig;
use crate::deform::slump;
use crate::grid::{Region, SimulationGrid};
use erosion::erode_and_deposit;
use flow::compute_outflow;

/// What one hydrology step did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepOutcome {
    pub height_changed: bool,
    /// Cells that emitted flow this tick.
    pub emitting_cells: usize,
    /// Interior cells still holding water after commit.
    pub wet_cells: usize,
    pub eroded: f32,
    pub deposited: f32,
}

/// Run one full hydrology step on already-injected water.
///
/// Phases, strictly in order:
/// 1. Outflow into the `next` buffers.
/// 2. Erosion / deposition against the post-flow state, mutating height in place.
/// 3. Commit: boundary ring drained, evaporation subtracted, negatives clamped.
/// 4. One full-grid slumping pass if any height changed.
pub fn step(grid: &mut SimulationGrid, config: &SimConfig) -> StepOutcome {
    let emitting_cells = compute_outflow(grid, config);
    let erosion = erode_and_deposit(grid, config);
    let wet_cells = commit(grid, config);

    if erosion.height_changed {
        slump(grid, config.max_slope, config.slump_rate, Region::full(grid.segments()));
    }

    StepOutcome {
        height_changed: erosion.height_changed,
        emitting_cells,
        wet_cells,
        eroded: erosion.eroded,
        deposited: erosion.deposited,
    }
}

/// Copy the `next` buffers into the committed fields.
///
/// Boundary-ring cells are forced dry and sediment-free; interior water loses
/// a constant `evaporation` per tick. Returns the number of wet interior cells.
pub fn commit(grid: &mut SimulationGrid, config: &SimConfig) -> usize {
    let mapping = *grid.mapping();
    let side = mapping.side();
    let on_ring = |i: usize| {
        let (x, z) = (i % side, i / side);
        x == 0 || z == 0 || x == mapping.segments || z == mapping.segments
    };

    let mut wet = 0;
    grid.water.commit_with(|i, next| {
        if on_ring(i) {
            return 0.0;
        }
        let d = (next - config.evaporation).max(0.0);
        if d > 0.0 {
            wet += 1;
        }
        d
    });
    grid.sediment.commit_with(|i, next| if on_ring(i) { 0.0 } else { next.max(0.0) });
    wet
}
