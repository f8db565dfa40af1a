//! Radial raise / lower brushes.
//!
//! A brush touches every cell whose vertex lies strictly inside `radius` of
//! the stroke point. Intensity follows `cos(d / r · π/2)^sharpness`: 1 at the
//! centre, 0 at the rim, with higher sharpness concentrating the effect.
use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::coords::{CellCoord, WorldPoint};
use crate::error::{Result, SandboxError};
use crate::grid::{Region, SimulationGrid};

/// Digging removes this many times the raise strength.
pub const LOWER_STRENGTH_FACTOR: f32 = 2.0;

/// Brush shape and intensity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brush {
    /// World units.
    pub radius: f64,
    pub strength: f32,
    /// Falloff exponent.
    pub sharpness: f32,
}

impl Default for Brush {
    fn default() -> Self {
        Self { radius: 15.0, strength: 0.5, sharpness: 2.0 }
    }
}

impl Brush {
    pub fn new(radius: f64, strength: f32, sharpness: f32) -> Result<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(SandboxError::InvalidBrush(format!("radius {radius} must be positive")));
        }
        if !(strength.is_finite() && strength >= 0.0) {
            return Err(SandboxError::InvalidBrush(format!("strength {strength} must be non-negative")));
        }
        if !(sharpness.is_finite() && sharpness > 0.0) {
            return Err(SandboxError::InvalidBrush(format!("sharpness {sharpness} must be positive")));
        }
        Ok(Self { radius, strength, sharpness })
    }
}

/// Radial intensity at `distance` from the brush centre; 0 outside the radius.
pub fn falloff(distance: f64, radius: f64, sharpness: f32) -> f32 {
    if distance >= radius {
        return 0.0;
    }
    ((distance / radius * FRAC_PI_2).cos() as f32).max(0.0).powf(sharpness)
}

/// Raise terrain under the brush. Returns the touched region, or `None` if
/// the point lies outside the domain or no cell was inside the radius.
///
/// Growth is damped by `1 − (h / maxHeight)²` so repeated strokes form a
/// dome instead of a spike, and touched interior cells soften toward
/// `looseHardness`.
pub fn raise(
    grid: &mut SimulationGrid,
    config: &SimConfig,
    point: WorldPoint,
    brush: &Brush,
) -> Option<Region> {
    let max_h = config.max_height;
    apply(grid, point, brush, |grid, idx, interior, f| {
        let h = grid.height[idx];
        let damping = (1.0 - (h / max_h) * (h / max_h)).max(0.0);
        let delta = brush.strength * f * damping;
        grid.height[idx] = (h + delta).min(max_h);
        if interior {
            grid.hardness[idx] = (grid.hardness[idx] - delta).max(config.loose_hardness);
        }
    })
}

/// Lower terrain under the brush at twice the brush strength, never below
/// `bedrockLimit`. Touched interior cells trend toward `rockHardness`.
pub fn lower(
    grid: &mut SimulationGrid,
    config: &SimConfig,
    point: WorldPoint,
    brush: &Brush,
) -> Option<Region> {
    let strength = brush.strength * LOWER_STRENGTH_FACTOR;
    apply(grid, point, brush, |grid, idx, interior, f| {
        let h = grid.height[idx];
        grid.height[idx] = (h - strength * f).max(config.bedrock_limit);
        if interior {
            let hd = grid.hardness[idx];
            grid.hardness[idx] = hd + (config.rock_hardness - hd) * f;
        }
    })
}

/// Visit every cell inside the brush radius with its falloff.
fn apply(
    grid: &mut SimulationGrid,
    point: WorldPoint,
    brush: &Brush,
    mut op: impl FnMut(&mut SimulationGrid, usize, bool, f32),
) -> Option<Region> {
    let mapping = *grid.mapping();
    if !mapping.contains(point) {
        return None;
    }
    let segments = mapping.segments;
    let to_col = |w: f64, extent: f64| (w + extent / 2.0) / extent * segments as f64;
    let x_lo = to_col(point.x - brush.radius, mapping.width).floor().max(0.0) as usize;
    let x_hi = (to_col(point.x + brush.radius, mapping.width).ceil() as usize).min(segments);
    let z_lo = to_col(point.z - brush.radius, mapping.depth).floor().max(0.0) as usize;
    let z_hi = (to_col(point.z + brush.radius, mapping.depth).ceil() as usize).min(segments);

    let mut touched: Option<Region> = None;
    for z in z_lo..=z_hi {
        for x in x_lo..=x_hi {
            let c = CellCoord::new(x, z);
            let d = mapping.cell_to_world(c).distance(point);
            if d >= brush.radius {
                continue;
            }
            let f = falloff(d, brush.radius, brush.sharpness);
            let idx = grid.idx(x, z);
            op(grid, idx, mapping.is_interior(c), f);
            let cell = Region { x0: x, z0: z, x1: x, z1: z };
            touched = Some(touched.map_or(cell, |r| r.union(cell)));
        }
    }
    touched
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn flat(height: f32) -> (SimConfig, SimulationGrid) {
        let cfg = SimConfig {
            segments: 40,
            terrain_width: 40.0,
            terrain_depth: 40.0,
            bedrock_limit: 0.0,
            ..SimConfig::default()
        };
        let grid = SimulationGrid::flat(&cfg, height);
        (cfg, grid)
    }

    #[test]
    fn falloff_profile() {
        assert_abs_diff_eq!(falloff(0.0, 10.0, 2.0), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(falloff(5.0, 10.0, 2.0), 0.5, epsilon = 1e-6);
        assert_eq!(falloff(10.0, 10.0, 2.0), 0.0);
        assert_eq!(falloff(12.0, 10.0, 2.0), 0.0);
        // Sharper brushes fall off faster.
        assert!(falloff(5.0, 10.0, 6.0) < falloff(5.0, 10.0, 2.0));
    }

    #[test]
    fn invalid_brushes_rejected() {
        assert!(Brush::new(0.0, 1.0, 2.0).is_err());
        assert!(Brush::new(5.0, -1.0, 2.0).is_err());
        assert!(Brush::new(5.0, 1.0, 0.0).is_err());
        assert!(Brush::new(f64::NAN, 1.0, 2.0).is_err());
        assert!(Brush::new(5.0, 0.0, 2.0).is_ok());
    }

    #[test]
    fn raise_peaks_at_centre_and_vanishes_at_rim() {
        let (cfg, mut grid) = flat(0.0);
        let brush = Brush::new(10.0, 1.0, 2.0).unwrap();
        let region = raise(&mut grid, &cfg, WorldPoint::new(0.0, 0.0), &brush).expect("stroke inside domain");
        let centre = grid.idx(20, 20);
        assert_abs_diff_eq!(grid.height()[centre], 1.0, epsilon = 1e-6);
        // Exactly one radius away along x.
        assert_eq!(grid.height()[grid.idx(30, 20)], 0.0);
        assert_eq!(region, Region { x0: 11, z0: 11, x1: 29, z1: 29 });
        // Raised ground is loose.
        assert!(grid.hardness()[centre] < 1.0);
    }

    #[test]
    fn raise_is_damped_near_max_height() {
        let (cfg, mut grid) = flat(0.0);
        let centre = grid.idx(20, 20);
        grid.set_height(centre, cfg.max_height * 0.9);
        let brush = Brush::new(3.0, 50.0, 2.0).unwrap();
        raise(&mut grid, &cfg, WorldPoint::new(0.0, 0.0), &brush);
        let expected = cfg.max_height * 0.9 + 50.0 * (1.0 - 0.81);
        assert_abs_diff_eq!(grid.height()[centre], expected, epsilon = 1e-2);
        assert!(grid.height()[centre] <= cfg.max_height);
    }

    #[test]
    fn lower_digs_twice_as_hard_and_stops_at_bedrock() {
        let (cfg, mut grid) = flat(5.0);
        let brush = Brush::new(4.0, 1.0, 2.0).unwrap();
        lower(&mut grid, &cfg, WorldPoint::new(0.0, 0.0), &brush);
        let centre = grid.idx(20, 20);
        assert_abs_diff_eq!(grid.height()[centre], 3.0, epsilon = 1e-6);
        assert_abs_diff_eq!(grid.hardness()[centre], cfg.rock_hardness, epsilon = 1e-6);

        let deep = Brush::new(4.0, 100.0, 2.0).unwrap();
        lower(&mut grid, &cfg, WorldPoint::new(0.0, 0.0), &deep);
        assert!(grid.height().iter().all(|&h| h >= cfg.bedrock_limit));
    }

    #[test]
    fn boundary_hardness_untouched() {
        let (cfg, mut grid) = flat(5.0);
        let brush = Brush::new(6.0, 1.0, 2.0).unwrap();
        raise(&mut grid, &cfg, WorldPoint::new(-20.0, 0.0), &brush);
        let edge = grid.idx(0, 20);
        assert!(grid.height()[edge] > 5.0, "edge height still changes");
        assert_eq!(grid.hardness()[edge], 1.0, "edge hardness must stay untouched");
    }

    #[test]
    fn out_of_domain_stroke_is_noop() {
        let (cfg, mut grid) = flat(5.0);
        let before = grid.height().to_vec();
        let brush = Brush::new(30.0, 1.0, 2.0).unwrap();
        assert!(raise(&mut grid, &cfg, WorldPoint::new(25.0, 0.0), &brush).is_none());
        assert!(lower(&mut grid, &cfg, WorldPoint::new(0.0, -100.0), &brush).is_none());
        assert_eq!(grid.height(), before.as_slice());
    }
}
