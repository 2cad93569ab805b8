//! Browser binding
//!
//! `WebField` owns one simulation and the render data of its last tick. The
//! host calls `tick` from its animation-frame callback and reads the flat
//! buffers back for drawing; UI controls go through `apply_configuration`.

use glam::Vec2;
use wasm_bindgen::prelude::*;

use super::SETTINGS_STORAGE_KEY;
use crate::persistence::SettingsSnapshot;
use crate::renderer::FrameData;
use crate::settings::{Config, ConfigError};
use crate::sim::{FieldState, TickInput, tick};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Logger already set by an earlier module instance
        return;
    }
    log::info!("Pattern particles starting...");
}

fn js_error(err: ConfigError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
}

#[wasm_bindgen]
pub struct WebField {
    state: FieldState,
    frame: FrameData,
    /// Influence radius override for the pointer
    mouse_radius: Option<f32>,
}

#[wasm_bindgen]
impl WebField {
    /// Create a field; a seed of 0 seeds from the clock
    #[wasm_bindgen(constructor)]
    pub fn new(seed: f64, width: f32, height: f32) -> WebField {
        let seed = if seed > 0.0 {
            seed as u64
        } else {
            js_sys::Date::now() as u64
        };
        let state = FieldState::new(seed, Vec2::new(width, height), Config::default());
        let frame = FrameData::capture(&state);
        log::info!("Field created ({}x{}, seed {})", width, height, seed);
        WebField {
            state,
            frame,
            mouse_radius: None,
        }
    }

    /// Advance one frame
    pub fn tick(&mut self, mouse_x: f32, mouse_y: f32, has_mouse: bool) {
        let input = TickInput {
            mouse: has_mouse.then(|| Vec2::new(mouse_x, mouse_y)),
            mouse_radius: self.mouse_radius,
            canvas_size: None,
        };
        tick(&mut self.state, &input);
        self.refresh_frame();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.state.set_canvas_size(Vec2::new(width, height));
        self.refresh_frame();
    }

    /// Pointer influence radius; zero or negative falls back to `attractionDistance`
    pub fn set_mouse_radius(&mut self, radius: f32) {
        self.mouse_radius = (radius > 0.0).then_some(radius);
    }

    /// Merge a partial configuration (JSON object). Returns whether anything changed.
    pub fn apply_configuration(&mut self, json: &str) -> Result<bool, JsValue> {
        let change = self.state.apply_configuration_json(json).map_err(js_error)?;
        self.refresh_frame();
        Ok(change.changed)
    }

    /// Current configuration as a settings file
    pub fn snapshot(&self) -> Result<String, JsValue> {
        let timestamp: String = js_sys::Date::new_0().to_iso_string().into();
        SettingsSnapshot::new(self.state.config().clone())
            .with_timestamp(timestamp)
            .to_json()
            .map_err(js_error)
    }

    /// Load a settings file, replacing the whole configuration
    pub fn load_snapshot(&mut self, json: &str) -> Result<(), JsValue> {
        let snapshot = SettingsSnapshot::from_json(json).map_err(js_error)?;
        self.state.replace_configuration(snapshot.config);
        self.refresh_frame();
        Ok(())
    }

    /// Persist the configuration to LocalStorage
    pub fn save_settings(&self) -> Result<(), JsValue> {
        let Some(storage) = local_storage() else {
            return Ok(());
        };
        let json = self.snapshot()?;
        storage.set_item(SETTINGS_STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Restore the configuration from LocalStorage. Returns false if nothing was saved.
    pub fn load_settings(&mut self) -> Result<bool, JsValue> {
        let Some(json) = local_storage().and_then(|s| s.get_item(SETTINGS_STORAGE_KEY).ok().flatten())
        else {
            log::info!("No saved settings");
            return Ok(false);
        };
        self.load_snapshot(&json)?;
        Ok(true)
    }

    pub fn reset_population(&mut self) {
        self.state.reset_population();
        self.refresh_frame();
    }

    pub fn toggle_pattern_overlay(&mut self) -> bool {
        let visible = self.state.toggle_pattern_overlay();
        self.refresh_frame();
        visible
    }

    pub fn recolor(&mut self) {
        self.state.recolor();
        self.refresh_frame();
    }

    pub fn particle_count(&self) -> u32 {
        self.frame.particles.len() as u32
    }

    pub fn edge_count(&self) -> u32 {
        self.frame.edges.len() as u32
    }

    /// `[x, y, radius, alpha, r, g, b, _]` per particle
    pub fn particle_data(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(self.frame.particle_floats())
    }

    /// `[x1, y1, x2, y2, opacity, thickness]` per edge
    pub fn edge_data(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(self.frame.edge_floats())
    }

    /// Overlay triangles, `[x, y, r, g, b, a]` per vertex
    pub fn overlay_data(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(self.frame.overlay_floats())
    }

    /// Tolerance band triangles, same layout as the overlay
    pub fn band_data(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(self.frame.band_floats())
    }

    /// Raw `Globals` uniform bytes
    pub fn globals(&self) -> js_sys::Uint8Array {
        js_sys::Uint8Array::from(bytemuck::bytes_of(&self.frame.globals))
    }
}

impl WebField {
    fn refresh_frame(&mut self) {
        self.frame = FrameData::capture(&self.state);
    }
}
