//! Slope-limited relaxation ("slumping").
//!
//! Any interior cell standing more than `max_slope` above one of its eight
//! neighbours sheds `(diff − max_slope) · rate · 0.5` to that neighbour. The
//! transfer is symmetric, so total height is conserved. One call is a single
//! sweep in row-major order with each transfer visible to later cells; it
//! reduces violations but does not iterate to an angle of repose.
use crate::grid::{Region, SimulationGrid};

/// W, E, N, S, then diagonals.
const NEIGHBOURS_8: [(isize, isize); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

/// Run one slumping sweep over the interior cells of `region`.
///
/// Neighbours may lie on the boundary ring or just outside `region`; they can
/// receive material but are never sources. Returns `true` if anything moved.
pub fn slump(grid: &mut SimulationGrid, max_slope: f32, rate: f32, region: Region) -> bool {
    let segments = grid.segments();
    let Some(region) = region.clip_interior(segments) else {
        return false;
    };
    let side = grid.side() as isize;
    let mut moved = false;

    for c in region.cells() {
        let i = grid.idx(c.x, c.z);
        let mut h = grid.height[i];
        for (dx, dz) in NEIGHBOURS_8 {
            let n = (i as isize + dz * side + dx) as usize;
            let diff = h - grid.height[n];
            if diff > max_slope {
                let transfer = (diff - max_slope) * rate * 0.5;
                h -= transfer;
                grid.height[n] += transfer;
                moved = true;
            }
        }
        grid.height[i] = h;
    }
    moved
}

/// Largest height step above `max_slope` between an interior cell in
/// `region` and any of its eight neighbours; 0 when the region is relaxed.
pub fn max_slope_excess(grid: &SimulationGrid, max_slope: f32, region: Region) -> f32 {
    let Some(region) = region.clip_interior(grid.segments()) else {
        return 0.0;
    };
    let side = grid.side() as isize;
    let mut worst = 0.0f32;
    for c in region.cells() {
        let i = grid.idx(c.x, c.z);
        for (dx, dz) in NEIGHBOURS_8 {
            let n = (i as isize + dz * side + dx) as usize;
            worst = worst.max(grid.height[i] - grid.height[n] - max_slope);
        }
    }
    worst
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    fn grid(segments: usize, fill: f32) -> SimulationGrid {
        let cfg = SimConfig {
            segments,
            terrain_width: segments as f64,
            terrain_depth: segments as f64,
            ..SimConfig::default()
        };
        SimulationGrid::flat(&cfg, fill)
    }

    #[test]
    fn spike_is_lowered_and_mass_conserved() {
        let mut g = grid(8, 0.0);
        let peak = g.idx(4, 4);
        g.set_height(peak, 40.0);
        let total_before: f64 = g.height().iter().map(|&v| v as f64).sum();

        let moved = slump(&mut g, 5.0, 0.8, Region::full(8));

        let total_after: f64 = g.height().iter().map(|&v| v as f64).sum();
        assert!(moved);
        assert!(g.height()[peak] < 40.0, "spike should shed material");
        assert!(
            (total_after - total_before).abs() < 1e-3,
            "mass conservation error: {total_before} → {total_after}"
        );
    }

    #[test]
    fn single_pass_reduces_worst_violation() {
        let mut g = grid(12, 0.0);
        for z in 0..=12 {
            for x in 6..=12 {
                let i = g.idx(x, z);
                g.set_height(i, 30.0);
            }
        }
        let before = max_slope_excess(&g, 5.0, Region::full(12));
        slump(&mut g, 5.0, 0.8, Region::full(12));
        let after = max_slope_excess(&g, 5.0, Region::full(12));
        assert!(before > 0.0);
        assert!(after < before, "worst excess should shrink: {before} → {after}");
    }

    #[test]
    fn gentle_terrain_unchanged() {
        let mut g = grid(8, 0.0);
        g.shape_heights(|c| c.x as f32 * 2.0);
        let before = g.height().to_vec();
        assert!(!slump(&mut g, 5.0, 0.8, Region::full(8)));
        assert_eq!(g.height(), before.as_slice());
    }

    #[test]
    fn window_leaves_far_cells_alone() {
        let mut g = grid(20, 0.0);
        let near = g.idx(3, 3);
        let far = g.idx(15, 15);
        g.set_height(near, 50.0);
        g.set_height(far, 50.0);
        slump(&mut g, 5.0, 0.8, Region { x0: 1, z0: 1, x1: 6, z1: 6 });
        assert!(g.height()[near] < 50.0);
        assert_eq!(g.height()[far], 50.0, "cells outside the window are not sources");
    }

    #[test]
    fn boundary_cells_are_never_sources() {
        let mut g = grid(6, 0.0);
        let edge = g.idx(0, 3);
        g.set_height(edge, 50.0);
        assert!(!slump(&mut g, 5.0, 0.8, Region::full(6)));
        assert_eq!(g.height()[edge], 50.0);
    }
}
