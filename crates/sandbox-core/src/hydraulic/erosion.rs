//! Capacity-based erosion and deposition.
//!
//! Runs after the outflow phase on cells that are still wet and actually
//! moved water this tick. Carrying capacity is `slope · velocity · factor`,
//! where velocity is total outflow per unit wetted cross-section and slope is
//! the gap to the highest cardinal neighbour. Below capacity the bed is
//! eroded (scaled by `1 − hardness`); above it the excess settles. Either way
//! the material is spread over the 3×3 kernel directly in the height field.
use crate::config::SimConfig;
use crate::grid::{Direction, SimulationGrid};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ErosionOutcome {
    pub height_changed: bool,
    /// Material picked up this tick.
    pub eroded: f32,
    /// Material dropped this tick.
    pub deposited: f32,
}

pub fn erode_and_deposit(grid: &mut SimulationGrid, config: &SimConfig) -> ErosionOutcome {
    let side = grid.side();
    let segments = grid.segments();
    let cell_width = config.cell_width() as f32;
    let kernel = config.erosion_kernel;
    let mut outcome = ErosionOutcome::default();

    for z in 1..segments {
        for x in 1..segments {
            let i = z * side + x;
            let total_out: f32 = grid.flux[i].iter().sum();
            let water_level = grid.water.next()[i];
            if water_level <= config.wet_threshold || total_out <= config.flux_threshold {
                continue;
            }

            let velocity = total_out / (water_level * cell_width);
            let h = grid.height[i];
            let highest = Direction::ALL
                .iter()
                .map(|d| grid.height[(i as isize + d.offset(side)) as usize])
                .fold(f32::NEG_INFINITY, f32::max);
            let slope = (h - highest).abs();
            let capacity = (slope * velocity * config.sediment_capacity_factor).max(0.0);
            let carried = grid.sediment.next()[i];

            if carried < capacity && slope > config.min_slope_for_erosion {
                let softness = (1.0 - grid.hardness[i]).max(0.0);
                let amount = ((capacity - carried) * config.erosion_rate).min(config.erosion_max) * softness;
                if amount <= 0.0 || h - amount <= config.bedrock_limit {
                    continue;
                }
                for dz in -1i32..=1 {
                    for dx in -1i32..=1 {
                        let n = ((z as i32 + dz) as usize) * side + (x as i32 + dx) as usize;
                        let take = amount * kernel.at(dx, dz);
                        if grid.height[n] - take > config.bedrock_limit {
                            grid.height[n] -= take;
                            if n == i {
                                grid.sediment.next_mut()[i] += amount;
                            }
                        }
                    }
                }
                outcome.eroded += amount;
                outcome.height_changed = true;
            } else if carried > capacity {
                let amount = ((carried - capacity) * config.deposition_rate).min(water_level.max(0.0));
                if amount <= 0.0 {
                    continue;
                }
                for dz in -1i32..=1 {
                    for dx in -1i32..=1 {
                        let nx = (x as i32 + dx) as usize;
                        let nz = (z as i32 + dz) as usize;
                        let n = nz * side + nx;
                        let drop = amount * kernel.at(dx, dz);
                        grid.height[n] = (grid.height[n] + drop).min(config.max_height);
                        if n == i {
                            grid.sediment.next_mut()[i] -= amount;
                        }
                        if nx > 0 && nx < segments && nz > 0 && nz < segments {
                            grid.hardness[n] = (grid.hardness[n] - drop * config.deposit_softening).max(0.0);
                        }
                    }
                }
                outcome.deposited += amount;
                outcome.height_changed = true;
            }
        }
    }
    outcome
}
