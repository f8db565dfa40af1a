//! Per-cell surface normals derived from the height field.
//!
//! Central differences in the interior, one-sided at the grid edge. The
//! engine refreshes only the window a brush touched; a tick that changed
//! height refreshes the whole grid.
use crate::grid::{Region, SimulationGrid};

pub type Normal = [f32; 3];

pub const UP: Normal = [0.0, 1.0, 0.0];

/// Recompute normals for every cell in `region`.
pub fn recompute(grid: &SimulationGrid, normals: &mut [Normal], region: Region) {
    debug_assert_eq!(normals.len(), grid.len());
    let segments = grid.segments();
    let sx = grid.mapping().cell_size_x() as f32;
    let sz = grid.mapping().cell_size_z() as f32;
    let h = grid.height();

    for c in region.cells() {
        let xl = c.x.saturating_sub(1);
        let xr = (c.x + 1).min(segments);
        let zu = c.z.saturating_sub(1);
        let zd = (c.z + 1).min(segments);

        let dhdx = (h[grid.idx(xr, c.z)] - h[grid.idx(xl, c.z)]) / ((xr - xl) as f32 * sx);
        let dhdz = (h[grid.idx(c.x, zd)] - h[grid.idx(c.x, zu)]) / ((zd - zu) as f32 * sz);

        let n = [-dhdx, 1.0, -dhdz];
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        normals[grid.idx(c.x, c.z)] = [n[0] / len, n[1] / len, n[2] / len];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use approx::assert_abs_diff_eq;

    fn cfg() -> SimConfig {
        SimConfig { segments: 10, terrain_width: 10.0, terrain_depth: 10.0, ..SimConfig::default() }
    }

    #[test]
    fn flat_ground_points_up() {
        let grid = SimulationGrid::flat(&cfg(), 3.0);
        let mut normals = vec![[0.0; 3]; grid.len()];
        recompute(&grid, &mut normals, Region::full(10));
        for n in &normals {
            assert_abs_diff_eq!(n[1], 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn slope_tilts_away_from_uphill() {
        let mut grid = SimulationGrid::flat(&cfg(), 0.0);
        // Rises one unit per cell toward +x: 45° slope.
        grid.shape_heights(|c| c.x as f32);
        let mut normals = vec![UP; grid.len()];
        recompute(&grid, &mut normals, Region::full(10));
        let n = normals[grid.idx(5, 5)];
        let s = std::f32::consts::FRAC_1_SQRT_2;
        assert_abs_diff_eq!(n[0], -s, epsilon = 1e-5);
        assert_abs_diff_eq!(n[1], s, epsilon = 1e-5);
        assert_abs_diff_eq!(n[2], 0.0, epsilon = 1e-6);
        // One-sided difference at the edge gives the same tilt.
        let e = normals[grid.idx(0, 5)];
        assert_abs_diff_eq!(e[0], -s, epsilon = 1e-5);
    }

    #[test]
    fn only_region_is_touched() {
        let grid = SimulationGrid::flat(&cfg(), 0.0);
        let mut normals = vec![[9.0; 3]; grid.len()];
        recompute(&grid, &mut normals, Region { x0: 2, z0: 2, x1: 3, z1: 3 });
        assert_eq!(normals[grid.idx(1, 1)], [9.0; 3]);
        assert_eq!(normals[grid.idx(2, 3)], UP);
    }
}
