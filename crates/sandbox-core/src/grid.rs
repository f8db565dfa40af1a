//! Flat per-cell field storage for the simulation.
//!
//! All fields are row-major over the `(segments + 1)²` vertex grid with
//! `idx = z * (segments + 1) + x`. Arrays are allocated once and re-initialised
//! in place on reset.
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::coords::{CellCoord, GridMapping, WorldPoint};

// ── Double buffer ─────────────────────────────────────────────────────────────

/// A field with a committed `current` array and a `next` array written
/// during the explicit step.
#[derive(Debug, Clone)]
pub struct FieldBuffer {
    current: Vec<f32>,
    next: Vec<f32>,
}

impl FieldBuffer {
    pub fn new(len: usize, fill: f32) -> Self {
        Self { current: vec![fill; len], next: vec![fill; len] }
    }

    #[inline]
    pub fn current(&self) -> &[f32] {
        &self.current
    }

    #[inline]
    pub fn current_mut(&mut self) -> &mut [f32] {
        &mut self.current
    }

    #[inline]
    pub fn next(&self) -> &[f32] {
        &self.next
    }

    #[inline]
    pub fn next_mut(&mut self) -> &mut [f32] {
        &mut self.next
    }

    /// Seed `next` with the committed values before a step writes into it.
    pub fn stage(&mut self) {
        self.next.copy_from_slice(&self.current);
    }

    /// Old values for reading, new values for writing.
    pub fn split(&mut self) -> (&[f32], &mut [f32]) {
        (&self.current, &mut self.next)
    }

    /// Overwrite `current[i]` with `f(i, next[i])` for every cell.
    pub fn commit_with(&mut self, mut f: impl FnMut(usize, f32) -> f32) {
        for (i, (cur, &nxt)) in self.current.iter_mut().zip(self.next.iter()).enumerate() {
            *cur = f(i, nxt);
        }
    }

    pub fn fill(&mut self, value: f32) {
        self.current.fill(value);
        self.next.fill(value);
    }
}

// ── Region ────────────────────────────────────────────────────────────────────

/// Inclusive rectangle of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x0: usize,
    pub z0: usize,
    pub x1: usize,
    pub z1: usize,
}

impl Region {
    /// Every cell of a grid with `segments` subdivisions.
    pub fn full(segments: usize) -> Self {
        Self { x0: 0, z0: 0, x1: segments, z1: segments }
    }

    /// Square of half-width `reach` cells around `centre`, clipped to the grid.
    pub fn around(centre: CellCoord, reach: usize, segments: usize) -> Self {
        Self {
            x0: centre.x.saturating_sub(reach),
            z0: centre.z.saturating_sub(reach),
            x1: (centre.x + reach).min(segments),
            z1: (centre.z + reach).min(segments),
        }
    }

    pub fn union(self, other: Region) -> Region {
        Region {
            x0: self.x0.min(other.x0),
            z0: self.z0.min(other.z0),
            x1: self.x1.max(other.x1),
            z1: self.z1.max(other.z1),
        }
    }

    /// Grow by `by` cells on every side, clipped to the grid.
    pub fn expand(self, by: usize, segments: usize) -> Region {
        Region {
            x0: self.x0.saturating_sub(by),
            z0: self.z0.saturating_sub(by),
            x1: (self.x1 + by).min(segments),
            z1: (self.z1 + by).min(segments),
        }
    }

    /// Intersection with the interior, or `None` if nothing interior remains.
    pub fn clip_interior(self, segments: usize) -> Option<Region> {
        let r = Region {
            x0: self.x0.max(1),
            z0: self.z0.max(1),
            x1: self.x1.min(segments - 1),
            z1: self.z1.min(segments - 1),
        };
        (r.x0 <= r.x1 && r.z0 <= r.z1).then_some(r)
    }

    pub fn contains(&self, c: CellCoord) -> bool {
        (self.x0..=self.x1).contains(&c.x) && (self.z0..=self.z1).contains(&c.z)
    }

    pub fn cell_count(&self) -> usize {
        (self.x1 - self.x0 + 1) * (self.z1 - self.z0 + 1)
    }

    /// Cells in row-major order.
    pub fn cells(self) -> impl Iterator<Item = CellCoord> {
        (self.z0..=self.z1).flat_map(move |z| (self.x0..=self.x1).map(move |x| CellCoord::new(x, z)))
    }
}

// ── Simulation grid ───────────────────────────────────────────────────────────

/// Outflow directions in flux-slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    West,
    East,
    North,
    South,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::West, Direction::East, Direction::North, Direction::South];

    /// Signed index offset to the neighbour on a grid with `side` cells per row.
    #[inline]
    pub fn offset(self, side: usize) -> isize {
        match self {
            Direction::West => -1,
            Direction::East => 1,
            Direction::North => -(side as isize),
            Direction::South => side as isize,
        }
    }
}

/// Owns every per-cell field of the simulation.
#[derive(Debug, Clone)]
pub struct SimulationGrid {
    mapping: GridMapping,
    pub(crate) height: Vec<f32>,
    pub(crate) hardness: Vec<f32>,
    pub(crate) water: FieldBuffer,
    pub(crate) sediment: FieldBuffer,
    /// Per-tick outflow per direction, indexed by `Direction as usize`.
    pub(crate) flux: Vec<[f32; 4]>,
}

impl SimulationGrid {
    /// Allocate a grid and shape it with the initial dome.
    pub fn new(config: &SimConfig) -> Self {
        let mut grid = Self::flat(config, config.bedrock_limit);
        grid.reset(config);
        grid
    }

    /// Allocate a grid with uniform height, full hardness and no water.
    pub fn flat(config: &SimConfig, height: f32) -> Self {
        let mapping = GridMapping::new(config.terrain_width, config.terrain_depth, config.segments);
        let len = mapping.side() * mapping.side();
        Self {
            mapping,
            height: vec![height; len],
            hardness: vec![1.0; len],
            water: FieldBuffer::new(len, 0.0),
            sediment: FieldBuffer::new(len, 0.0),
            flux: vec![[0.0; 4]; len],
        }
    }

    /// Restore the initial dome, hard ground, and dry cells. No reallocation.
    pub fn reset(&mut self, config: &SimConfig) {
        let half_w = self.mapping.width / 2.0;
        let half_d = self.mapping.depth / 2.0;
        let max_dist = (half_w * half_w + half_d * half_d).sqrt();
        for i in 0..self.len() {
            let p = self.mapping.cell_to_world(self.coord(i));
            let t = p.distance(WorldPoint::new(0.0, 0.0)) / max_dist;
            let dome = config.dome_height * (1.0 - (t * t) as f32);
            self.height[i] = config.bedrock_limit + dome;
        }
        self.hardness.fill(1.0);
        self.water.fill(0.0);
        self.sediment.fill(0.0);
        self.flux.fill([0.0; 4]);
    }

    // ── Geometry ─────────────────────────────────────────────────────────────

    #[inline]
    pub fn mapping(&self) -> &GridMapping {
        &self.mapping
    }

    #[inline]
    pub fn segments(&self) -> usize {
        self.mapping.segments
    }

    /// Cells per side.
    #[inline]
    pub fn side(&self) -> usize {
        self.mapping.side()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.height.len()
    }

    pub fn is_empty(&self) -> bool {
        self.height.is_empty()
    }

    #[inline]
    pub fn idx(&self, x: usize, z: usize) -> usize {
        debug_assert!(x < self.side() && z < self.side());
        z * self.side() + x
    }

    #[inline]
    pub fn coord(&self, idx: usize) -> CellCoord {
        CellCoord::new(idx % self.side(), idx / self.side())
    }

    #[inline]
    pub fn is_interior(&self, idx: usize) -> bool {
        self.mapping.is_interior(self.coord(idx))
    }

    /// Index of the interior cell nearest to `p`, if any.
    pub fn interior_index_at(&self, p: WorldPoint) -> Option<usize> {
        let c = self.mapping.world_to_cell(p)?;
        self.mapping.is_interior(c).then(|| self.idx(c.x, c.z))
    }

    // ── Read-only field access ───────────────────────────────────────────────

    pub fn height(&self) -> &[f32] {
        &self.height
    }

    pub fn water_depth(&self) -> &[f32] {
        self.water.current()
    }

    pub fn sediment(&self) -> &[f32] {
        self.sediment.current()
    }

    pub fn hardness(&self) -> &[f32] {
        &self.hardness
    }

    /// Outflow recorded by the most recent flow phase.
    pub fn flux(&self) -> &[[f32; 4]] {
        &self.flux
    }

    /// Height plus standing water.
    #[inline]
    pub fn head(&self, idx: usize) -> f32 {
        self.height[idx] + self.water.current()[idx]
    }

    // ── Mutation (engine and scenario setup) ─────────────────────────────────

    pub fn set_height(&mut self, idx: usize, value: f32) {
        self.height[idx] = value;
    }

    pub fn set_water_depth(&mut self, idx: usize, value: f32) {
        self.water.current_mut()[idx] = value.max(0.0);
    }

    pub fn add_water(&mut self, idx: usize, amount: f32) {
        self.water.current_mut()[idx] += amount;
    }

    pub fn set_sediment(&mut self, idx: usize, value: f32) {
        self.sediment.current_mut()[idx] = value.max(0.0);
    }

    pub fn set_hardness(&mut self, idx: usize, value: f32) {
        self.hardness[idx] = value.clamp(0.0, 1.0);
    }

    /// Fill every height from a function of the cell address.
    pub fn shape_heights(&mut self, mut f: impl FnMut(CellCoord) -> f32) {
        for i in 0..self.len() {
            self.height[i] = f(self.coord(i));
        }
    }
}
