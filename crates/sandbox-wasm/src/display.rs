//! Translation from engine fields to what the browser draws.
//!
//! The engine only knows water depth. A renderer wants a water *surface*
//! that is continuous across puddle edges and hides entirely where the
//! ground is dry.
use sandbox_core::SimulationGrid;

/// Depth (own or 3×3 mean) above which a cell shows water.
pub const VISIBLE_DEPTH: f32 = 0.01;

/// Lift applied to visible water so it never z-fights the terrain.
pub const SURFACE_LIFT: f32 = 0.05;

/// How far below ground dry cells are pushed.
pub const HIDDEN_DROP: f32 = 10.0;

/// Fill `out` with one surface height per cell.
pub fn water_surface(grid: &SimulationGrid, out: &mut Vec<f32>) {
    let side = grid.side();
    let depth = grid.water_depth();
    let height = grid.height();
    out.clear();
    out.reserve(grid.len());

    for z in 0..side {
        for x in 0..side {
            let i = grid.idx(x, z);
            let mut sum = 0.0f32;
            let mut count = 0u32;
            for nz in z.saturating_sub(1)..=(z + 1).min(side - 1) {
                for nx in x.saturating_sub(1)..=(x + 1).min(side - 1) {
                    sum += depth[grid.idx(nx, nz)];
                    count += 1;
                }
            }
            let mean = sum / count as f32;
            let d = depth[i];
            out.push(if mean > VISIBLE_DEPTH || d > VISIBLE_DEPTH {
                height[i] + d.max(mean * 0.5) + SURFACE_LIFT
            } else {
                height[i] - HIDDEN_DROP
            });
        }
    }
}

/// Flatten `[x, y, z]` normals for a `Float32Array`.
pub fn flatten_normals(normals: &[[f32; 3]]) -> Vec<f32> {
    normals.iter().flat_map(|n| n.iter().copied()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sandbox_core::SimConfig;

    fn grid() -> SimulationGrid {
        let cfg = SimConfig { segments: 6, terrain_width: 6.0, terrain_depth: 6.0, ..SimConfig::default() };
        SimulationGrid::flat(&cfg, 3.0)
    }

    #[test]
    fn dry_ground_hides_water() {
        let g = grid();
        let mut out = Vec::new();
        water_surface(&g, &mut out);
        assert_eq!(out.len(), g.len());
        assert!(out.iter().all(|&s| s == 3.0 - HIDDEN_DROP));
    }

    #[test]
    fn puddle_edges_are_smoothed() {
        let mut g = grid();
        let c = g.idx(3, 3);
        g.set_water_depth(c, 0.9);
        let mut out = Vec::new();
        water_surface(&g, &mut out);

        assert!((out[c] - (3.0 + 0.9 + SURFACE_LIFT)).abs() < 1e-6);
        // Dry neighbour sees a 3×3 mean of 0.1 and shows half of it.
        let n = g.idx(4, 3);
        assert!((out[n] - (3.0 + 0.05 + SURFACE_LIFT)).abs() < 1e-6);
        // Two cells away the mean is zero again.
        assert_eq!(out[g.idx(5, 3)], 3.0 - HIDDEN_DROP);
    }

    #[test]
    fn normals_flatten_in_order() {
        let flat = flatten_normals(&[[0.0, 1.0, 0.0], [0.5, 0.5, 0.0]]);
        assert_eq!(flat, vec![0.0, 1.0, 0.0, 0.5, 0.5, 0.0]);
    }
}
