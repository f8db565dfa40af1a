//! The engine facade: owns the grid, sources, RNG and derived normals, and
//! sequences every operation a front end can request.
//!
//! Per tick, in order:
//!   1. Injection: focused rain, global rain, sources.
//!   2. Hydrology step (outflow → erosion/deposition → commit → slumping).
//!   3. Normals refreshed and the grid marked dirty if height changed.
//!
//! Brush strokes are not tick-gated. Each stroke slumps and re-normals only
//! the window it touched.
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::coords::{GridMapping, WorldPoint};
use crate::deform::{self, Brush};
use crate::error::{Result, SandboxError};
use crate::generator::plan_hills;
use crate::grid::{Region, SimulationGrid};
use crate::hydraulic::{self, StepOutcome};
use crate::metrics::{summarize, FieldSummary};
use crate::normals::{self, Normal, UP};
use crate::water::{self, RainSettings, SourceId, SourceRegistry, WaterSource};

/// External triggers read once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Rain around this point (e.g. under the cursor) when set.
    pub rain_focus: Option<WorldPoint>,
    pub global_rain: bool,
}

impl TickInput {
    pub fn idle() -> Self {
        Self::default()
    }
}

/// What a tick did, for logging and front-end bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: u64,
    pub drops_injected: usize,
    pub sources_fed: usize,
    pub height_changed: bool,
    pub wet_cells: usize,
}

/// Whether a toggle added or removed a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceToggle {
    Added(SourceId),
    Removed(SourceId),
    /// The point did not land on interior terrain.
    Rejected,
}

pub struct Simulation {
    config: SimConfig,
    grid: SimulationGrid,
    sources: SourceRegistry,
    rain: RainSettings,
    rng: StdRng,
    normals: Vec<Normal>,
    dirty: Option<Region>,
    tick: u64,
}

impl Simulation {
    /// Validate `config` and build a simulation on the initial dome.
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        let grid = SimulationGrid::new(&config);
        Ok(Self::assemble(config, grid))
    }

    /// Start from a prepared grid, e.g. a test scenario. The grid must have
    /// been built from a config with the same domain and segments.
    pub fn from_grid(config: SimConfig, grid: SimulationGrid) -> Result<Self> {
        config.validate()?;
        let expected = GridMapping::new(config.terrain_width, config.terrain_depth, config.segments);
        if *grid.mapping() != expected {
            let m = grid.mapping();
            return Err(SandboxError::config(
                "segments",
                format!(
                    "grid is {}×{} world units at {} segments, config expects {}×{} at {}",
                    m.width, m.depth, m.segments, expected.width, expected.depth, expected.segments
                ),
            ));
        }
        Ok(Self::assemble(config, grid))
    }

    fn assemble(config: SimConfig, grid: SimulationGrid) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        debug!(
            "simulation ready: {0}×{0} cells, {1}×{2} world units",
            grid.side(),
            config.terrain_width,
            config.terrain_depth
        );
        let mut sim = Self {
            normals: vec![UP; grid.len()],
            dirty: Some(Region::full(grid.segments())),
            sources: SourceRegistry::new(),
            rain: RainSettings::default(),
            tick: 0,
            rng,
            config,
            grid,
        };
        sim.refresh_normals(Region::full(sim.grid.segments()));
        sim
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Read-only view of every field.
    pub fn grid(&self) -> &SimulationGrid {
        &self.grid
    }

    pub fn normals(&self) -> &[Normal] {
        &self.normals
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn rain_settings(&self) -> RainSettings {
        self.rain
    }

    pub fn set_rain_settings(&mut self, settings: RainSettings) -> Result<()> {
        self.rain = RainSettings::new(settings.radius, settings.count)?;
        Ok(())
    }

    pub fn sources(&self) -> impl Iterator<Item = &WaterSource> {
        self.sources.iter()
    }

    pub fn summary(&self) -> FieldSummary {
        summarize(&self.grid, self.tick)
    }

    /// Cells changed since the last call, if any.
    pub fn take_dirty(&mut self) -> Option<Region> {
        self.dirty.take()
    }

    // ── Tick ─────────────────────────────────────────────────────────────────

    pub fn tick(&mut self, input: &TickInput) -> TickReport {
        let mut drops = 0;
        if let Some(focus) = input.rain_focus {
            drops += water::rain_at(&mut self.grid, &self.config, &mut self.rng, focus, &self.rain);
        }
        if input.global_rain {
            drops += water::global_rain(&mut self.grid, &self.config, &mut self.rng, &self.rain);
        }
        let sources_fed = self.sources.inject(&mut self.grid, self.config.source_flow_amount);

        let StepOutcome { height_changed, wet_cells, eroded, deposited, .. } =
            hydraulic::step(&mut self.grid, &self.config);

        if height_changed {
            let full = Region::full(self.grid.segments());
            self.refresh_normals(full);
            self.mark_dirty(full);
        }

        self.tick += 1;
        trace!(
            "tick {}: {drops} drops, {wet_cells} wet, eroded {eroded:.4}, deposited {deposited:.4}",
            self.tick
        );
        TickReport { tick: self.tick, drops_injected: drops, sources_fed, height_changed, wet_cells }
    }

    // ── Brushes ──────────────────────────────────────────────────────────────

    /// Raise terrain under `brush` at `point`. Returns `false` for strokes
    /// that touched nothing (e.g. outside the domain).
    pub fn apply_raise(&mut self, point: WorldPoint, brush: &Brush) -> bool {
        let touched = deform::raise(&mut self.grid, &self.config, point, brush);
        self.settle_stroke(touched)
    }

    /// Lower terrain under `brush` at `point`.
    pub fn apply_lower(&mut self, point: WorldPoint, brush: &Brush) -> bool {
        let touched = deform::lower(&mut self.grid, &self.config, point, brush);
        self.settle_stroke(touched)
    }

    /// Slump and re-normal the stroke window.
    fn settle_stroke(&mut self, touched: Option<Region>) -> bool {
        let Some(region) = touched else {
            return false;
        };
        let segments = self.grid.segments();
        let window = region.expand(1, segments);
        deform::slump(&mut self.grid, self.config.max_slope, self.config.slump_rate, window);
        // Slumping can push material one cell past the window; normals read one further.
        let affected = window.expand(2, segments);
        self.refresh_normals(affected);
        self.mark_dirty(affected);
        true
    }

    /// Add random hills on top of the current terrain. Returns the hill count.
    pub fn generate_random_terrain(&mut self) -> usize {
        let hills = plan_hills(&self.config, &mut self.rng);
        for hill in &hills {
            self.apply_raise(hill.centre, &hill.brush);
        }
        debug!("random terrain: {} hills", hills.len());
        hills.len()
    }

    // ── Sources ──────────────────────────────────────────────────────────────

    /// Place a spring at `point`; `None` unless it lands on interior terrain.
    pub fn add_source(&mut self, point: WorldPoint) -> Option<SourceId> {
        let id = self.sources.add(&self.grid, point);
        if let Some(id) = id {
            debug!("source {} added at ({:.2}, {:.2})", id.0, point.x, point.z);
        }
        id
    }

    pub fn remove_source(&mut self, id: SourceId) -> bool {
        let removed = self.sources.remove(id).is_some();
        if removed {
            debug!("source {} removed", id.0);
        }
        removed
    }

    /// Remove the nearest source within `pick_radius` of `point`, or place a
    /// new one there if none is close enough.
    pub fn toggle_source(&mut self, point: WorldPoint, pick_radius: f64) -> SourceToggle {
        if let Some(id) = self.sources.nearest(point, pick_radius) {
            self.remove_source(id);
            return SourceToggle::Removed(id);
        }
        match self.add_source(point) {
            Some(id) => SourceToggle::Added(id),
            None => SourceToggle::Rejected,
        }
    }

    pub fn clear_sources(&mut self) {
        debug!("clearing {} sources", self.sources.len());
        self.sources.clear();
    }

    // ── Reset ────────────────────────────────────────────────────────────────

    /// Restore the initial dome, drop all water and sediment, and clear
    /// sources. Call between ticks only.
    pub fn reset(&mut self) {
        self.grid.reset(&self.config);
        self.sources.clear();
        let full = Region::full(self.grid.segments());
        self.refresh_normals(full);
        self.mark_dirty(full);
        debug!("terrain reset after {} ticks", self.tick);
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn refresh_normals(&mut self, region: Region) {
        normals::recompute(&self.grid, &mut self.normals, region);
    }

    fn mark_dirty(&mut self, region: Region) {
        self.dirty = Some(self.dirty.map_or(region, |d| d.union(region)));
    }
}
