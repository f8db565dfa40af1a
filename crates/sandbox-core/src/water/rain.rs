//! Stochastic rain injection.
//!
//! Two modes, both pure addition into the committed water depth of interior
//! cells: a cluster of drops scattered around a focus point, and a uniform
//! scatter over the whole domain. Drops that land on the boundary ring or
//! outside the grid are lost.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::coords::WorldPoint;
use crate::error::{Result, SandboxError};
use crate::grid::SimulationGrid;

/// User-adjustable rain controls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RainSettings {
    /// Half-width of the square drops scatter over around the focus point.
    pub radius: f64,
    /// Drops per tick for focused rain; also scales global rain (10 = nominal).
    pub count: u32,
}

impl Default for RainSettings {
    fn default() -> Self {
        Self { radius: 1.0, count: 10 }
    }
}

impl RainSettings {
    pub fn new(radius: f64, count: u32) -> Result<Self> {
        if !(radius.is_finite() && radius >= 0.0) {
            return Err(SandboxError::InvalidRain(format!("radius {radius} must be non-negative")));
        }
        Ok(Self { radius, count })
    }
}

/// Scatter `settings.count` drops of `rainDropAmount` around `focus`.
/// Returns the number of drops that landed on interior cells.
pub fn rain_at<R: Rng + ?Sized>(
    grid: &mut SimulationGrid,
    config: &SimConfig,
    rng: &mut R,
    focus: WorldPoint,
    settings: &RainSettings,
) -> usize {
    if !grid.mapping().contains(focus) {
        return 0;
    }
    let spread = settings.radius * 2.0;
    let mut landed = 0;
    for _ in 0..settings.count {
        let p = WorldPoint::new(
            focus.x + (rng.gen::<f64>() - 0.5) * spread,
            focus.z + (rng.gen::<f64>() - 0.5) * spread,
        );
        if let Some(i) = grid.interior_index_at(p) {
            grid.add_water(i, config.rain_drop_amount);
            landed += 1;
        }
    }
    landed
}

/// Drops scattered per tick by global rain.
pub fn global_drop_count(config: &SimConfig, settings: &RainSettings) -> usize {
    let n = config.segments as f64 * config.global_rain_density as f64 * (settings.count as f64 / 10.0);
    n.ceil() as usize
}

/// Scatter drops of `globalRainDropAmount` uniformly over the domain.
/// Returns the number of drops that landed on interior cells.
pub fn global_rain<R: Rng + ?Sized>(
    grid: &mut SimulationGrid,
    config: &SimConfig,
    rng: &mut R,
    settings: &RainSettings,
) -> usize {
    let width = grid.mapping().width;
    let depth = grid.mapping().depth;
    let mut landed = 0;
    for _ in 0..global_drop_count(config, settings) {
        let p = WorldPoint::new(
            (rng.gen::<f64>() - 0.5) * width,
            (rng.gen::<f64>() - 0.5) * depth,
        );
        if let Some(i) = grid.interior_index_at(p) {
            grid.add_water(i, config.global_rain_drop_amount);
            landed += 1;
        }
    }
    landed
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn setup() -> (SimConfig, SimulationGrid) {
        let cfg = SimConfig { segments: 20, terrain_width: 20.0, terrain_depth: 20.0, ..SimConfig::default() };
        let grid = SimulationGrid::flat(&cfg, 2.0);
        (cfg, grid)
    }

    fn total_water(grid: &SimulationGrid) -> f32 {
        grid.water_depth().iter().sum()
    }

    #[test]
    fn focused_rain_stays_near_focus() {
        let (cfg, mut grid) = setup();
        let mut rng = StdRng::seed_from_u64(7);
        let settings = RainSettings::new(2.0, 25).unwrap();
        let landed = rain_at(&mut grid, &cfg, &mut rng, WorldPoint::new(1.0, -1.0), &settings);
        assert_eq!(landed, 25, "all drops fall well inside the interior");
        assert_abs_diff_eq!(total_water(&grid), 25.0 * cfg.rain_drop_amount, epsilon = 1e-4);
        for i in 0..grid.len() {
            if grid.water_depth()[i] > 0.0 {
                let p = grid.mapping().cell_to_world(grid.coord(i));
                assert!((p.x - 1.0).abs() <= 2.5 && (p.z + 1.0).abs() <= 2.5, "drop at {p:?}");
            }
        }
    }

    #[test]
    fn zero_radius_rain_hits_one_cell() {
        let (cfg, mut grid) = setup();
        let mut rng = StdRng::seed_from_u64(1);
        let settings = RainSettings::new(0.0, 4).unwrap();
        rain_at(&mut grid, &cfg, &mut rng, WorldPoint::new(0.0, 0.0), &settings);
        let c = grid.idx(10, 10);
        assert_abs_diff_eq!(grid.water_depth()[c], 4.0 * cfg.rain_drop_amount, epsilon = 1e-6);
    }

    #[test]
    fn focus_outside_domain_is_ignored() {
        let (cfg, mut grid) = setup();
        let mut rng = StdRng::seed_from_u64(3);
        let landed = rain_at(&mut grid, &cfg, &mut rng, WorldPoint::new(40.0, 0.0), &RainSettings::default());
        assert_eq!(landed, 0);
        assert_eq!(total_water(&grid), 0.0);
    }

    #[test]
    fn global_rain_never_wets_the_ring() {
        let (cfg, mut grid) = setup();
        let mut rng = StdRng::seed_from_u64(11);
        let settings = RainSettings::default();
        let mut landed = 0;
        for _ in 0..20 {
            landed += global_rain(&mut grid, &cfg, &mut rng, &settings);
        }
        assert!(landed > 0);
        assert!(landed <= 20 * global_drop_count(&cfg, &settings));
        for i in 0..grid.len() {
            if !grid.is_interior(i) {
                assert_eq!(grid.water_depth()[i], 0.0);
            }
        }
        assert_abs_diff_eq!(total_water(&grid), landed as f32 * cfg.global_rain_drop_amount, epsilon = 1e-3);
    }

    #[test]
    fn global_drop_count_scales_with_rain_count() {
        let cfg = SimConfig::default();
        assert_eq!(global_drop_count(&cfg, &RainSettings { radius: 1.0, count: 10 }), 100);
        assert_eq!(global_drop_count(&cfg, &RainSettings { radius: 1.0, count: 5 }), 50);
        assert_eq!(global_drop_count(&cfg, &RainSettings { radius: 1.0, count: 0 }), 0);
    }

    #[test]
    fn negative_radius_rejected() {
        assert!(RainSettings::new(-1.0, 3).is_err());
    }
}
