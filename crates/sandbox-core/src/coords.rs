/// Planar coordinate types and grid addressing.
/// World positions use f64; field values stay f32.
use serde::{Deserialize, Serialize};

/// A point on the horizontal plane in world units, origin at the domain centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub z: f64,
}

impl WorldPoint {
    pub fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    pub fn distance(self, other: WorldPoint) -> f64 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }
}

/// Integer grid address of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: usize,
    pub z: usize,
}

impl CellCoord {
    pub fn new(x: usize, z: usize) -> Self {
        Self { x, z }
    }
}

/// Maps between world space and the `(segments + 1)²` vertex grid that spans
/// a `width × depth` square centred on the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMapping {
    pub width: f64,
    pub depth: f64,
    pub segments: usize,
}

impl GridMapping {
    pub fn new(width: f64, depth: f64, segments: usize) -> Self {
        Self { width, depth, segments }
    }

    /// Cells per side.
    #[inline]
    pub fn side(&self) -> usize {
        self.segments + 1
    }

    /// Nearest grid cell to a world point, or `None` when the point falls
    /// outside the grid.
    pub fn world_to_cell(&self, p: WorldPoint) -> Option<CellCoord> {
        let s = self.segments as f64;
        let gx = ((p.x + self.width / 2.0) / self.width * s).round();
        let gz = ((p.z + self.depth / 2.0) / self.depth * s).round();
        if !(gx >= 0.0 && gx <= s && gz >= 0.0 && gz <= s) {
            return None;
        }
        Some(CellCoord::new(gx as usize, gz as usize))
    }

    /// World position of a cell's vertex.
    pub fn cell_to_world(&self, c: CellCoord) -> WorldPoint {
        let s = self.segments as f64;
        WorldPoint::new(
            c.x as f64 / s * self.width - self.width / 2.0,
            c.z as f64 / s * self.depth - self.depth / 2.0,
        )
    }

    /// True if the point lies inside the domain rectangle (edges included).
    pub fn contains(&self, p: WorldPoint) -> bool {
        p.x.abs() <= self.width / 2.0 && p.z.abs() <= self.depth / 2.0
    }

    /// Interior cells exclude the one-cell boundary ring.
    #[inline]
    pub fn is_interior(&self, c: CellCoord) -> bool {
        c.x > 0 && c.x < self.segments && c.z > 0 && c.z < self.segments
    }

    pub fn cell_size_x(&self) -> f64 {
        self.width / self.segments as f64
    }

    pub fn cell_size_z(&self) -> f64 {
        self.depth / self.segments as f64
    }
}
