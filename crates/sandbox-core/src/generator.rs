//! Random landscape generation: a batch of raise strokes at random spots.
//!
//! Hills are planned here and applied by `Simulation::generate_random_terrain`
//! through the ordinary raise path, so each hill is slumped and re-normalled
//! exactly like a brush stroke. Nothing is reset first; hills stack on the
//! current terrain.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::coords::WorldPoint;
use crate::deform::Brush;

/// Hill centres are drawn from this fraction of the domain extents.
pub const HILL_SPREAD: f64 = 0.8;

/// Falloff exponent used for generated hills.
pub const HILL_SHARPNESS: f32 = 2.0;

/// One planned raise stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hill {
    pub centre: WorldPoint,
    pub brush: Brush,
}

/// Draw `N ∈ [randomHillCountMin, randomHillCountMax]` hills with uniform
/// centres, radii and strengths.
pub fn plan_hills<R: Rng + ?Sized>(config: &SimConfig, rng: &mut R) -> Vec<Hill> {
    let count = rng.gen_range(config.random_hill_count_min..=config.random_hill_count_max);
    (0..count)
        .map(|_| {
            let centre = WorldPoint::new(
                (rng.gen::<f64>() - 0.5) * config.terrain_width * HILL_SPREAD,
                (rng.gen::<f64>() - 0.5) * config.terrain_depth * HILL_SPREAD,
            );
            let radius = uniform_f64(rng, config.random_hill_radius_min, config.random_hill_radius_max);
            let strength = uniform_f32(rng, config.random_hill_strength_min, config.random_hill_strength_max);
            Hill { centre, brush: Brush { radius, strength, sharpness: HILL_SHARPNESS } }
        })
        .collect()
}

// `gen_range` panics on an empty range, and min == max is a valid config.
fn uniform_f64<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    lo + rng.gen::<f64>() * (hi - lo)
}

fn uniform_f32<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    lo + rng.gen::<f32>() * (hi - lo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn hills_respect_configured_ranges() {
        let cfg = SimConfig::default();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let hills = plan_hills(&cfg, &mut rng);
            assert!((cfg.random_hill_count_min..=cfg.random_hill_count_max).contains(&hills.len()));
            for h in &hills {
                assert!(h.centre.x.abs() <= cfg.terrain_width * 0.4);
                assert!(h.centre.z.abs() <= cfg.terrain_depth * 0.4);
                assert!(h.brush.radius >= cfg.random_hill_radius_min && h.brush.radius <= cfg.random_hill_radius_max);
                assert!(
                    h.brush.strength >= cfg.random_hill_strength_min
                        && h.brush.strength <= cfg.random_hill_strength_max
                );
            }
        }
    }

    #[test]
    fn degenerate_ranges_are_fixed_values() {
        let cfg = SimConfig {
            random_hill_count_min: 3,
            random_hill_count_max: 3,
            random_hill_radius_min: 7.0,
            random_hill_radius_max: 7.0,
            random_hill_strength_min: 1.5,
            random_hill_strength_max: 1.5,
            ..SimConfig::default()
        };
        let hills = plan_hills(&cfg, &mut StdRng::seed_from_u64(0));
        assert_eq!(hills.len(), 3);
        assert!(hills.iter().all(|h| h.brush.radius == 7.0 && h.brush.strength == 1.5));
    }

    #[test]
    fn same_seed_same_plan() {
        let cfg = SimConfig::default();
        let a = plan_hills(&cfg, &mut StdRng::seed_from_u64(9));
        let b = plan_hills(&cfg, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
