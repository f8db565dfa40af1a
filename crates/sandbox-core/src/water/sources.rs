//! Persistent point springs.
//!
//! Ids come from a monotonic counter, so two sources placed in the same
//! frame never collide. Sources are kept ordered by id, which is also
//! creation order.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::coords::WorldPoint;
use crate::grid::SimulationGrid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterSource {
    pub id: SourceId,
    pub position: WorldPoint,
    /// Grid index the spring feeds.
    pub cell: usize,
}

/// Springs keyed by id.
///
/// Add, remove and lookup are O(log n) rather than amortised O(1). Source
/// counts stay small (well under 100), and the ordered map gives a
/// deterministic injection order without another dependency.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: BTreeMap<SourceId, WaterSource>,
    next_id: u64,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a spring at `position`. Rejected (`None`) unless the point
    /// maps to an interior cell.
    pub fn add(&mut self, grid: &SimulationGrid, position: WorldPoint) -> Option<SourceId> {
        let cell = grid.interior_index_at(position)?;
        let id = SourceId(self.next_id);
        self.next_id += 1;
        self.sources.insert(id, WaterSource { id, position, cell });
        Some(id)
    }

    pub fn remove(&mut self, id: SourceId) -> Option<WaterSource> {
        self.sources.remove(&id)
    }

    pub fn get(&self, id: SourceId) -> Option<&WaterSource> {
        self.sources.get(&id)
    }

    /// Closest source within `radius` world units of `point`.
    pub fn nearest(&self, point: WorldPoint, radius: f64) -> Option<SourceId> {
        self.sources
            .values()
            .map(|s| (s.id, s.position.distance(point)))
            .filter(|&(_, d)| d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    pub fn clear(&mut self) {
        self.sources.clear();
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Sources in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &WaterSource> {
        self.sources.values()
    }

    /// Add `amount` of water at every source cell. Returns the source count.
    pub fn inject(&self, grid: &mut SimulationGrid, amount: f32) -> usize {
        for s in self.sources.values() {
            grid.add_water(s.cell, amount);
        }
        self.sources.len()
    }
}
