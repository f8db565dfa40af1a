//! Browser bridge for the erosion sandbox.
//!
//! The page owns the frame clock and the mesh. Each frame it calls `tick`,
//! forwards pointer strokes to `raise`/`lower`, then pulls `take_dirty` and
//! whichever field arrays it renders. Arrays are copied out as
//! `Float32Array`s; the engine never shares its buffers with JS.
pub mod display;

use js_sys::Float32Array;
use sandbox_core::{Brush, RainSettings, SimConfig, Simulation, SourceId, TickInput, WorldPoint};
use wasm_bindgen::prelude::*;

fn to_js<E: std::fmt::Display>(e: E) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn serialize<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(to_js)
}

#[wasm_bindgen]
pub struct Sandbox {
    sim: Simulation,
    surface: Vec<f32>,
}

#[wasm_bindgen]
impl Sandbox {
    /// Build a sandbox from a (possibly empty) JSON settings object.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<Sandbox, JsValue> {
        let json = if config_json.trim().is_empty() { "{}" } else { config_json };
        let config = SimConfig::from_json_str(json).map_err(to_js)?;
        let sim = Simulation::new(config).map_err(to_js)?;
        Ok(Sandbox { sim, surface: Vec::new() })
    }

    /// Current settings as JSON.
    pub fn config_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.sim.config()).map_err(to_js)
    }

    /// Cells per side, `segments + 1`.
    pub fn side(&self) -> u32 {
        self.sim.grid().side() as u32
    }

    // ── Per-frame ────────────────────────────────────────────────────────────

    /// Advance one tick. Rain falls around `(focus_x, focus_z)` when
    /// `raining` is set. Returns the tick report.
    pub fn tick(&mut self, raining: bool, focus_x: f64, focus_z: f64, global_rain: bool) -> Result<JsValue, JsValue> {
        let input = TickInput {
            rain_focus: raining.then(|| WorldPoint::new(focus_x, focus_z)),
            global_rain,
        };
        serialize(&self.sim.tick(&input))
    }

    pub fn raise(&mut self, x: f64, z: f64, radius: f64, strength: f32, sharpness: f32) -> Result<bool, JsValue> {
        let brush = Brush::new(radius, strength, sharpness).map_err(to_js)?;
        Ok(self.sim.apply_raise(WorldPoint::new(x, z), &brush))
    }

    pub fn lower(&mut self, x: f64, z: f64, radius: f64, strength: f32, sharpness: f32) -> Result<bool, JsValue> {
        let brush = Brush::new(radius, strength, sharpness).map_err(to_js)?;
        Ok(self.sim.apply_lower(WorldPoint::new(x, z), &brush))
    }

    pub fn set_rain(&mut self, radius: f64, count: u32) -> Result<(), JsValue> {
        self.sim.set_rain_settings(RainSettings { radius, count }).map_err(to_js)
    }

    // ── Sources ──────────────────────────────────────────────────────────────

    /// Returns the new source id, or `undefined` off the interior.
    pub fn add_source(&mut self, x: f64, z: f64) -> Option<f64> {
        self.sim.add_source(WorldPoint::new(x, z)).map(|id| id.0 as f64)
    }

    pub fn remove_source(&mut self, id: f64) -> bool {
        if !(id.is_finite() && id >= 0.0) {
            return false;
        }
        self.sim.remove_source(SourceId(id as u64))
    }

    /// Click handler: removes a nearby source or places a new one.
    pub fn toggle_source(&mut self, x: f64, z: f64, pick_radius: f64) -> Result<JsValue, JsValue> {
        serialize(&self.sim.toggle_source(WorldPoint::new(x, z), pick_radius))
    }

    pub fn clear_sources(&mut self) {
        self.sim.clear_sources();
    }

    /// Array of `{ id, position: {x, z}, cell }`.
    pub fn sources(&self) -> Result<JsValue, JsValue> {
        let list: Vec<_> = self.sim.sources().copied().collect();
        serialize(&list)
    }

    // ── Terrain ──────────────────────────────────────────────────────────────

    pub fn reset(&mut self) {
        self.sim.reset();
    }

    /// Stack random hills on the current terrain; returns how many.
    pub fn random_terrain(&mut self) -> u32 {
        self.sim.generate_random_terrain() as u32
    }

    // ── Field readback ───────────────────────────────────────────────────────

    pub fn heights(&self) -> Float32Array {
        Float32Array::from(self.sim.grid().height())
    }

    pub fn water(&self) -> Float32Array {
        Float32Array::from(self.sim.grid().water_depth())
    }

    pub fn sediment(&self) -> Float32Array {
        Float32Array::from(self.sim.grid().sediment())
    }

    pub fn hardness(&self) -> Float32Array {
        Float32Array::from(self.sim.grid().hardness())
    }

    /// Interleaved `x, y, z` per cell.
    pub fn normals(&self) -> Float32Array {
        Float32Array::from(display::flatten_normals(self.sim.normals()).as_slice())
    }

    /// Smoothed water surface heights; dry cells sit below the terrain.
    pub fn water_surface(&mut self) -> Float32Array {
        display::water_surface(self.sim.grid(), &mut self.surface);
        Float32Array::from(self.surface.as_slice())
    }

    /// `{x0, z0, x1, z1}` (inclusive) changed since the last call, or `null`.
    pub fn take_dirty(&mut self) -> Result<JsValue, JsValue> {
        serialize(&self.sim.take_dirty())
    }

    pub fn summary(&self) -> Result<JsValue, JsValue> {
        serialize(&self.sim.summary())
    }
}
