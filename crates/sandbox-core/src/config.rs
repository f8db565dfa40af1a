use serde::{Deserialize, Serialize};

use crate::error::{Result, SandboxError};

/// Largest accepted `segments`; the grid holds `(segments + 1)²` cells.
pub const MAX_SEGMENTS: usize = 4096;

// ── Erosion kernel ────────────────────────────────────────────────────────────

/// 3×3 weights used to spread eroded or deposited material around a cell.
///
/// Hand-tuned, not derived from any transport law. The defaults sum to 0.8,
/// so a fifth of each eroded amount never leaves the terrain; validation only
/// requires the total to lie in (0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KernelWeights {
    pub center: f32,
    /// Weight for each of the four edge-adjacent cells.
    pub edge: f32,
    /// Weight for each of the four diagonal cells.
    pub corner: f32,
}

impl Default for KernelWeights {
    fn default() -> Self {
        Self { center: 0.60, edge: 0.04, corner: 0.01 }
    }
}

impl KernelWeights {
    /// Weight at offset `(dx, dz)` with both components in `-1..=1`.
    #[inline]
    pub fn at(&self, dx: i32, dz: i32) -> f32 {
        match (dx.abs(), dz.abs()) {
            (0, 0) => self.center,
            (1, 1) => self.corner,
            _ => self.edge,
        }
    }

    pub fn total(&self) -> f32 {
        self.center + 4.0 * self.edge + 4.0 * self.corner
    }
}

// ── Simulation config ─────────────────────────────────────────────────────────

/// Every numeric option recognised by the engine.
///
/// Field names serialise in camelCase so a browser front end can hand its
/// settings object over unchanged. Missing fields take the default tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimConfig {
    // Domain
    pub terrain_width: f64,
    pub terrain_depth: f64,
    /// Grid subdivisions per side; the grid holds `(segments + 1)²` cells.
    pub segments: usize,

    // Height limits
    pub dome_height: f32,
    pub max_height: f32,
    pub bedrock_limit: f32,

    // Slumping
    pub max_slope: f32,
    /// Fraction of the excess height difference moved per pass (0-1).
    pub slump_rate: f32,

    // Hydrology
    /// Constant depth removed from every wet cell per tick.
    pub evaporation: f32,
    pub sediment_capacity_factor: f32,
    pub erosion_rate: f32,
    /// Upper bound on material eroded at one cell per tick.
    pub erosion_max: f32,
    pub deposition_rate: f32,
    /// Fraction of a cell's depth allowed to leave it per tick, in (0, 1].
    pub max_flow_factor: f32,
    pub min_slope_for_erosion: f32,
    pub erosion_kernel: KernelWeights,

    // Stabilisation epsilons
    /// Cells at or below this depth do not emit flow.
    pub flow_epsilon: f32,
    /// Minimum committed depth for erosion or deposition.
    pub wet_threshold: f32,
    /// Minimum total outflow for erosion or deposition.
    pub flux_threshold: f32,

    // Hardness
    /// Floor that freshly raised material softens toward.
    pub loose_hardness: f32,
    /// Value that dug ground trends toward.
    pub rock_hardness: f32,
    /// Hardness removed per unit of deposited material.
    pub deposit_softening: f32,

    // Injection
    pub rain_drop_amount: f32,
    pub global_rain_drop_amount: f32,
    pub global_rain_density: f32,
    /// Depth added by each registered source per tick.
    pub source_flow_amount: f32,

    // Random terrain
    pub random_hill_count_min: usize,
    pub random_hill_count_max: usize,
    pub random_hill_radius_min: f64,
    pub random_hill_radius_max: f64,
    pub random_hill_strength_min: f32,
    pub random_hill_strength_max: f32,

    /// RNG seed for rain scatter and random terrain. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            terrain_width: 100.0,
            terrain_depth: 100.0,
            segments: 100,
            dome_height: 10.0,
            max_height: 1000.0,
            bedrock_limit: 1.0,
            max_slope: 5.0,
            slump_rate: 0.8,
            evaporation: 0.0002,
            sediment_capacity_factor: 4.0,
            erosion_rate: 0.4,
            erosion_max: 0.3,
            deposition_rate: 0.1,
            max_flow_factor: 0.25,
            min_slope_for_erosion: 0.05,
            erosion_kernel: KernelWeights::default(),
            flow_epsilon: 0.001,
            wet_threshold: 0.01,
            flux_threshold: 0.001,
            loose_hardness: 0.0,
            rock_hardness: 0.6,
            deposit_softening: 2.0,
            rain_drop_amount: 0.2,
            global_rain_drop_amount: 0.03,
            global_rain_density: 1.0,
            source_flow_amount: 0.5,
            random_hill_count_min: 5,
            random_hill_count_max: 10,
            random_hill_radius_min: 10.0,
            random_hill_radius_max: 40.0,
            random_hill_strength_min: 2.0,
            random_hill_strength_max: 40.0,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Parse a (possibly partial) JSON settings object and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Width of one grid cell in world units along x.
    pub fn cell_width(&self) -> f64 {
        self.terrain_width / self.segments as f64
    }

    /// Reject configurations that would break the engine's invariants.
    pub fn validate(&self) -> Result<()> {
        if self.segments < 2 {
            return Err(SandboxError::config("segments", "must be at least 2 (one interior cell)"));
        }
        let side = self.segments.checked_add(1);
        if self.segments > MAX_SEGMENTS || side.and_then(|s| s.checked_mul(s)).is_none() {
            return Err(SandboxError::config(
                "segments",
                format!("{} exceeds the maximum of {MAX_SEGMENTS}", self.segments),
            ));
        }
        positive_f64("terrainWidth", self.terrain_width)?;
        positive_f64("terrainDepth", self.terrain_depth)?;

        let non_negative = [
            ("domeHeight", self.dome_height),
            ("maxSlope", self.max_slope),
            ("evaporation", self.evaporation),
            ("sedimentCapacityFactor", self.sediment_capacity_factor),
            ("erosionRate", self.erosion_rate),
            ("erosionMax", self.erosion_max),
            ("depositionRate", self.deposition_rate),
            ("minSlopeForErosion", self.min_slope_for_erosion),
            ("flowEpsilon", self.flow_epsilon),
            ("wetThreshold", self.wet_threshold),
            ("fluxThreshold", self.flux_threshold),
            ("depositSoftening", self.deposit_softening),
            ("rainDropAmount", self.rain_drop_amount),
            ("globalRainDropAmount", self.global_rain_drop_amount),
            ("globalRainDensity", self.global_rain_density),
            ("sourceFlowAmount", self.source_flow_amount),
        ];
        for (field, value) in non_negative {
            non_negative_f32(field, value)?;
        }

        finite_f32("maxHeight", self.max_height)?;
        finite_f32("bedrockLimit", self.bedrock_limit)?;
        if self.bedrock_limit >= self.max_height {
            return Err(SandboxError::config(
                "bedrockLimit",
                format!("{} must be below maxHeight {}", self.bedrock_limit, self.max_height),
            ));
        }
        if self.bedrock_limit + self.dome_height > self.max_height {
            return Err(SandboxError::config(
                "domeHeight",
                "bedrockLimit + domeHeight exceeds maxHeight",
            ));
        }

        unit_interval("slumpRate", self.slump_rate)?;
        unit_interval("looseHardness", self.loose_hardness)?;
        unit_interval("rockHardness", self.rock_hardness)?;
        if !(self.max_flow_factor > 0.0 && self.max_flow_factor <= 1.0) {
            return Err(SandboxError::config("maxFlowFactor", "must lie in (0, 1]"));
        }

        let k = &self.erosion_kernel;
        for (field, value) in [
            ("erosionKernel.center", k.center),
            ("erosionKernel.edge", k.edge),
            ("erosionKernel.corner", k.corner),
        ] {
            non_negative_f32(field, value)?;
        }
        let total = k.total();
        if !(total > 0.0 && total <= 1.0 + 1e-4) {
            return Err(SandboxError::config(
                "erosionKernel",
                format!("weights sum to {total}, expected a total in (0, 1]"),
            ));
        }

        if self.random_hill_count_min > self.random_hill_count_max {
            return Err(SandboxError::config("randomHillCountMin", "exceeds randomHillCountMax"));
        }
        positive_f64("randomHillRadiusMin", self.random_hill_radius_min)?;
        positive_f64("randomHillRadiusMax", self.random_hill_radius_max)?;
        if self.random_hill_radius_min > self.random_hill_radius_max {
            return Err(SandboxError::config("randomHillRadiusMin", "exceeds randomHillRadiusMax"));
        }
        non_negative_f32("randomHillStrengthMin", self.random_hill_strength_min)?;
        non_negative_f32("randomHillStrengthMax", self.random_hill_strength_max)?;
        if self.random_hill_strength_min > self.random_hill_strength_max {
            return Err(SandboxError::config(
                "randomHillStrengthMin",
                "exceeds randomHillStrengthMax",
            ));
        }

        Ok(())
    }
}

// ── Validation helpers ────────────────────────────────────────────────────────

fn finite_f32(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SandboxError::config(field, format!("{value} is not finite")))
    }
}

fn non_negative_f32(field: &'static str, value: f32) -> Result<()> {
    finite_f32(field, value)?;
    if value < 0.0 {
        return Err(SandboxError::config(field, format!("{value} is negative")));
    }
    Ok(())
}

fn unit_interval(field: &'static str, value: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(SandboxError::config(field, format!("{value} is outside [0, 1]")));
    }
    Ok(())
}

fn positive_f64(field: &'static str, value: f64) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(SandboxError::config(field, format!("{value} must be positive and finite")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        SimConfig::default().validate().expect("default tuning must be valid");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = SimConfig::from_json_str(r#"{ "segments": 40, "maxFlowFactor": 0.5 }"#)
            .expect("partial config should parse");
        assert_eq!(cfg.segments, 40);
        assert_eq!(cfg.max_flow_factor, 0.5);
        assert_eq!(cfg.evaporation, SimConfig::default().evaporation);
    }

    #[test]
    fn zero_segments_rejected() {
        let cfg = SimConfig { segments: 0, ..SimConfig::default() };
        let err = cfg.validate().unwrap_err();
        assert!(
            matches!(err, SandboxError::InvalidConfig { field: "segments", .. }),
            "unexpected error {err}"
        );
    }

    #[test]
    fn oversized_grid_rejected() {
        let err = SimConfig::from_json_str(r#"{ "segments": 100000 }"#).unwrap_err();
        assert!(
            matches!(err, SandboxError::InvalidConfig { field: "segments", .. }),
            "unexpected error {err}"
        );
        let cfg = SimConfig { segments: usize::MAX, ..SimConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = SimConfig { segments: MAX_SEGMENTS, ..SimConfig::default() };
        cfg.validate().expect("the cap itself is accepted");
    }

    #[test]
    fn inverted_hill_ranges_rejected() {
        let cfg = SimConfig {
            random_hill_radius_min: 50.0,
            random_hill_radius_max: 10.0,
            ..SimConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = SimConfig { random_hill_count_min: 11, ..SimConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn negative_rate_rejected() {
        let cfg = SimConfig { erosion_rate: -0.1, ..SimConfig::default() };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("erosionRate"), "message should name the field: {err}");
    }

    #[test]
    fn oversized_kernel_rejected() {
        let cfg = SimConfig {
            erosion_kernel: KernelWeights { center: 0.9, edge: 0.1, corner: 0.0 },
            ..SimConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = SimConfig::from_json_str("{ segments: }").unwrap_err();
        assert!(matches!(err, SandboxError::ConfigParse(_)));
    }

    #[test]
    fn kernel_weight_lookup() {
        let k = KernelWeights::default();
        assert_eq!(k.at(0, 0), 0.60);
        assert_eq!(k.at(1, 0), 0.04);
        assert_eq!(k.at(0, -1), 0.04);
        assert_eq!(k.at(-1, 1), 0.01);
        approx::assert_abs_diff_eq!(k.total(), 0.8, epsilon = 1e-6);
    }
}
