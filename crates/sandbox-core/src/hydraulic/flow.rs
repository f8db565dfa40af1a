//! Outflow phase: moves water and suspended sediment between cells.
//!
//! Every interior cell holding more than `flow_epsilon` of water compares its
//! hydraulic head (`height + depth`) against its four cardinal neighbours and
//! splits `depth · maxFlowFactor` among the downhill ones in proportion to the
//! head drop. Heads and sediment fractions are read from the committed
//! buffers and all transfers land in the `next` buffers, so the result does
//! not depend on visiting order.
use crate::config::SimConfig;
use crate::grid::{Direction, SimulationGrid};

/// Compute this tick's outflow into the `next` buffers and the flux table.
///
/// Stages both double buffers first. Returns how many cells emitted water.
pub fn compute_outflow(grid: &mut SimulationGrid, config: &SimConfig) -> usize {
    let side = grid.side();
    let segments = grid.segments();

    grid.water.stage();
    grid.sediment.stage();
    grid.flux.fill([0.0; 4]);

    let height = &grid.height;
    let flux = &mut grid.flux;
    let (w_old, w_new) = grid.water.split();
    let (s_old, s_new) = grid.sediment.split();

    let mut emitting = 0;
    for z in 1..segments {
        for x in 1..segments {
            let i = z * side + x;
            let d = w_old[i];
            if d <= config.flow_epsilon {
                continue;
            }
            let head = height[i] + d;

            let mut drops = [0.0f32; 4];
            let mut total_drop = 0.0f32;
            for (k, dir) in Direction::ALL.iter().enumerate() {
                let n = (i as isize + dir.offset(side)) as usize;
                let dh = head - (height[n] + w_old[n]);
                if dh > 0.0 {
                    drops[k] = dh;
                    total_drop += dh;
                }
            }
            if total_drop <= 0.0 {
                continue;
            }

            let max_flow = d * config.max_flow_factor;
            for (k, dir) in Direction::ALL.iter().enumerate() {
                if drops[k] <= 0.0 {
                    continue;
                }
                let n = (i as isize + dir.offset(side)) as usize;
                let flow = drops[k] / total_drop * max_flow;
                w_new[i] -= flow;
                w_new[n] += flow;

                if s_old[i] > 0.0 {
                    let carried = flow / d * s_old[i];
                    s_new[i] -= carried;
                    s_new[n] += carried;
                }
                flux[i][k] = flow;
            }
            emitting += 1;
        }
    }
    emitting
}
