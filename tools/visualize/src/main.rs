//! Diagnostic visualizer: runs a fixed erosion script and writes five PNG
//! debug images to data/debug/.
//! Not part of the main pipeline; no clippy target.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use sandbox_core::{SimConfig, Simulation, SimulationGrid, TickInput, WorldPoint};

const SEGMENTS: usize = 256;
const TICKS: u64 = 400;
const SEED: u64 = 42;

// ── Colour helpers ────────────────────────────────────────────────────────────

/// Value in [0, 1] → grayscale.
fn gray(v: f32) -> [u8; 3] {
    let c = (v.clamp(0.0, 1.0) * 255.0) as u8;
    [c, c, c]
}

/// Water depth → blue heatmap over white: 0 = white, ≥ 1 = deep blue.
fn depth_to_rgb(d: f32) -> [u8; 3] {
    let t = d.clamp(0.0, 1.0);
    let lo = (255.0 * (1.0 - t)) as u8;
    let b = (255.0 - 75.0 * t) as u8;
    [lo, lo, b]
}

/// Hardness → rock / sand / grass-like classes for a quick read.
fn hardness_to_rgb(h: f32) -> [u8; 3] {
    if h > 0.5 {
        [128, 128, 128]
    } else if h < 0.2 {
        [210, 180, 140]
    } else {
        [90, 150, 70]
    }
}

fn save(out_dir: &Path, name: &str, grid: &SimulationGrid, pixel: impl Fn(usize) -> [u8; 3]) -> Result<()> {
    let side = grid.side();
    let mut img = image::RgbImage::new(side as u32, side as u32);
    for z in 0..side {
        for x in 0..side {
            img.put_pixel(x as u32, z as u32, image::Rgb(pixel(grid.idx(x, z))));
        }
    }
    let path = out_dir.join(name);
    img.save(&path).with_context(|| format!("failed to save {}", path.display()))?;
    info!("wrote {}", path.display());
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();

    let config = SimConfig {
        segments: SEGMENTS,
        seed: Some(SEED),
        ..SimConfig::default()
    };
    let mut sim = Simulation::new(config)?;

    info!("raising {} random hills", sim.generate_random_terrain());
    for p in [WorldPoint::new(-20.0, -20.0), WorldPoint::new(15.0, -25.0), WorldPoint::new(0.0, 10.0)] {
        sim.add_source(p);
    }

    info!("running {TICKS} ticks with global rain");
    let input = TickInput { rain_focus: None, global_rain: true };
    for _ in 0..TICKS {
        sim.tick(&input);
    }
    let summary = sim.summary();
    info!(
        "water {:.2}, sediment {:.3}, heights {:.2}..{:.2}",
        summary.total_water, summary.total_sediment, summary.min_height, summary.max_height
    );

    let out_dir = Path::new("data/debug");
    fs::create_dir_all(out_dir).context("cannot create data/debug/")?;
    let grid = sim.grid();

    // ── 1. height.png ────────────────────────────────────────────────────────
    let range = (summary.max_height - summary.min_height).max(1e-3);
    save(out_dir, "height.png", grid, |i| gray((grid.height()[i] - summary.min_height) / range))?;

    // ── 2. water_depth.png ───────────────────────────────────────────────────
    save(out_dir, "water_depth.png", grid, |i| depth_to_rgb(grid.water_depth()[i]))?;

    // ── 3. sediment.png (log-scaled) ─────────────────────────────────────────
    let max_log = grid.sediment().iter().map(|&s| s.ln_1p()).fold(0.0f32, f32::max).max(1e-6);
    save(out_dir, "sediment.png", grid, |i| gray(grid.sediment()[i].ln_1p() / max_log))?;

    // ── 4. hardness.png ──────────────────────────────────────────────────────
    save(out_dir, "hardness.png", grid, |i| hardness_to_rgb(grid.hardness()[i]))?;

    // ── 5. shaded.png (hillshade with water overlay) ─────────────────────────
    let normals = sim.normals();
    let light = [-0.5f32, 0.7, -0.5];
    let norm = (light[0] * light[0] + light[1] * light[1] + light[2] * light[2]).sqrt();
    save(out_dir, "shaded.png", grid, |i| {
        if grid.water_depth()[i] > 0.01 {
            return depth_to_rgb(0.3 + grid.water_depth()[i]);
        }
        let n = normals[i];
        let lambert = (n[0] * light[0] + n[1] * light[1] + n[2] * light[2]) / norm;
        gray(lambert.max(0.0))
    })?;

    info!("done");
    Ok(())
}
