//! Water injection: rain and persistent sources.
pub mod rain;
pub mod sources;

pub use rain::{global_drop_count, global_rain, rain_at, RainSettings};
pub use sources::{SourceId, SourceRegistry, WaterSource};
