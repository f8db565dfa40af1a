//! Headless runner for the erosion sandbox.
//!
//! Scripts a simulation from the command line and streams `FieldSummary`
//! records as JSON lines on stdout. `--batch N` runs N seeds in parallel and
//! prints only each run's final summary.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use rayon::prelude::*;
use sandbox_core::{FieldSummary, RainSettings, SimConfig, Simulation, TickInput, WorldPoint};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "erosion-sandbox", about = "Run the erosion sandbox headlessly and report field summaries")]
struct Args {
    /// JSON settings file; missing keys take their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of ticks to simulate.
    #[arg(short, long, default_value = "500")]
    ticks: u64,

    /// RNG seed (overrides the config file; entropy if neither sets one).
    #[arg(short, long)]
    seed: Option<u64>,

    /// Stack random hills on the dome before the first tick.
    #[arg(long)]
    random_terrain: bool,

    /// Rain over the whole domain every tick.
    #[arg(long)]
    global_rain: bool,

    /// Rain around this point every tick, as `x,z` in world units.
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    rain_at: Option<WorldPoint>,

    /// Scatter radius for focused rain.
    #[arg(long, default_value = "1.0")]
    rain_radius: f64,

    /// Drops per tick for focused rain (also scales global rain).
    #[arg(long, default_value = "10")]
    rain_count: u32,

    /// Place a spring at `x,z`. Repeatable.
    #[arg(long = "source", value_parser = parse_point, allow_hyphen_values = true)]
    sources: Vec<WorldPoint>,

    /// Emit a summary every N ticks (0 = final summary only).
    #[arg(long, default_value = "50")]
    report_every: u64,

    /// Run N independent seeds in parallel, starting at `--seed` (or 0).
    #[arg(long)]
    batch: Option<u64>,
}

fn parse_point(s: &str) -> std::result::Result<WorldPoint, String> {
    let (x, z) = s.split_once(',').ok_or_else(|| format!("expected `x,z`, got `{s}`"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad x in `{s}`: {e}"))?;
    let z: f64 = z.trim().parse().map_err(|e| format!("bad z in `{s}`: {e}"))?;
    Ok(WorldPoint::new(x, z))
}

// ── Runs ──────────────────────────────────────────────────────────────────────

fn load_config(path: Option<&Path>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    SimConfig::from_json_str(&text).with_context(|| format!("Invalid settings in {}", path.display()))
}

/// Build and drive one simulation, handing every due summary to `report`.
fn run(args: &Args, config: SimConfig, mut report: impl FnMut(&FieldSummary) -> Result<()>) -> Result<FieldSummary> {
    let mut sim = Simulation::new(config).context("Cannot start simulation")?;
    sim.set_rain_settings(RainSettings::new(args.rain_radius, args.rain_count)?)?;

    if args.random_terrain {
        let hills = sim.generate_random_terrain();
        info!("raised {hills} random hills");
    }
    for &p in &args.sources {
        if sim.add_source(p).is_none() {
            bail!("source at ({}, {}) is not on interior terrain", p.x, p.z);
        }
    }

    let input = TickInput { rain_focus: args.rain_at, global_rain: args.global_rain };
    for _ in 0..args.ticks {
        let tick = sim.tick(&input);
        if args.report_every > 0 && tick.tick % args.report_every == 0 {
            report(&sim.summary())?;
        }
    }
    Ok(sim.summary())
}

/// Seeds `first..first + n`, refusing ranges that run past `u64::MAX`.
fn batch_seeds(first: u64, n: u64) -> Result<Range<u64>> {
    match first.checked_add(n) {
        Some(end) => Ok(first..end),
        None => bail!("--batch {n} starting at seed {first} overflows the seed range"),
    }
}

fn write_line(out: &mut impl Write, summary: &FieldSummary) -> Result<()> {
    serde_json::to_writer(&mut *out, summary)?;
    writeln!(out)?;
    Ok(())
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match args.batch {
        None => {
            let last = run(&args, config, |s| write_line(&mut out, s))?;
            if args.report_every == 0 || args.ticks % args.report_every != 0 {
                write_line(&mut out, &last)?;
            }
        }
        Some(n) => {
            let first = config.seed.unwrap_or(0);
            info!("batch of {n} runs from seed {first}");
            let results: Vec<Result<FieldSummary>> = batch_seeds(first, n)?
                .into_par_iter()
                .map(|seed| run(&args, SimConfig { seed: Some(seed), ..config.clone() }, |_| Ok(())))
                .collect();
            for res in results {
                write_line(&mut out, &res?)?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_parse_with_signs_and_spaces() {
        let p = parse_point("-12.5, 3").unwrap();
        assert_eq!((p.x, p.z), (-12.5, 3.0));
        assert!(parse_point("4").is_err());
        assert!(parse_point("a,1").is_err());
    }

    #[test]
    fn short_run_reports_on_schedule() {
        let args = Args::parse_from([
            "erosion-sandbox",
            "--ticks",
            "20",
            "--report-every",
            "5",
            "--source",
            "0,0",
            "--seed",
            "1",
        ]);
        let cfg = SimConfig { segments: 20, terrain_width: 20.0, terrain_depth: 20.0, seed: args.seed, ..SimConfig::default() };
        let mut seen = Vec::new();
        let last = run(&args, cfg, |s| {
            seen.push(s.tick);
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec![5, 10, 15, 20]);
        assert_eq!(last.tick, 20);
        assert!(last.total_water > 0.0);
    }

    #[test]
    fn batch_seed_range_must_fit() {
        assert_eq!(batch_seeds(5, 3).unwrap(), 5..8);
        assert!(batch_seeds(u64::MAX - 1, 2).is_err());
        assert_eq!(batch_seeds(u64::MAX, 0).unwrap().count(), 0);
    }

    #[test]
    fn off_grid_source_is_an_error() {
        let args = Args::parse_from(["erosion-sandbox", "--ticks", "1", "--source", "500,0"]);
        assert!(run(&args, SimConfig::default(), |_| Ok(())).is_err());
    }
}
