//! Runtime configuration
//!
//! A single owned `Config` per simulation session. External controls never
//! mutate it directly: they send partial JSON patches through
//! `Config::merge_patch`, which ignores unknown keys and sanitises the result.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::consts::{MAX_FRACTAL_ITERATIONS, MAX_PARTICLE_COUNT, TOLERANCE_BAND_PX};
use crate::parse_hex_color;

/// Geometric pattern particles are spawned along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PatternKind {
    #[default]
    Mandelbrot,
    Spiral,
    Target,
    Grid,
    Triangle,
}

impl PatternKind {
    pub const ALL: [PatternKind; 5] = [
        PatternKind::Mandelbrot,
        PatternKind::Spiral,
        PatternKind::Target,
        PatternKind::Grid,
        PatternKind::Triangle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::Mandelbrot => "mandelbrot",
            PatternKind::Spiral => "spiral",
            PatternKind::Target => "target",
            PatternKind::Grid => "grid",
            PatternKind::Triangle => "triangle",
        }
    }

    /// Parse a pattern name; anything unrecognised behaves as Mandelbrot
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "spiral" => PatternKind::Spiral,
            "target" => PatternKind::Target,
            "grid" => PatternKind::Grid,
            "triangle" => PatternKind::Triangle,
            _ => PatternKind::Mandelbrot,
        }
    }
}

impl From<String> for PatternKind {
    fn from(s: String) -> Self {
        PatternKind::parse(&s)
    }
}

impl From<PatternKind> for String {
    fn from(kind: PatternKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Errors raised while reading a configuration patch
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration patch is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("configuration patch must be a JSON object")]
    NotAnObject,
}

/// What a configuration update touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfigChange {
    /// Any field differs
    pub changed: bool,
    /// Pattern geometry inputs differ (kind, scale or fractal window)
    pub geometry_changed: bool,
    /// Target particle count differs
    pub count_changed: bool,
}

impl ConfigChange {
    pub fn between(before: &Config, after: &Config) -> Self {
        Self {
            changed: before != after,
            geometry_changed: before.pattern != after.pattern
                || before.pattern_scale != after.pattern_scale
                || before.max_iterations != after.max_iterations
                || before.zoom != after.zoom
                || before.seahorse_x != after.seahorse_x
                || before.seahorse_y != after.seahorse_y,
            count_changed: before.particle_count != after.particle_count,
        }
    }
}

/// Complete simulation configuration
///
/// Field names serialize to the camelCase keys used by saved settings files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    // === Particles ===
    pub particle_count: u32,
    /// Render multiplier on each particle's sampled size
    pub particle_size: f32,
    /// Particle opacity percentage (0-100)
    pub particle_opacity: f32,
    pub particle_color: String,
    /// Color attached to non-fractal pattern samples
    pub dot_color: String,
    pub dot_opacity: f32,
    /// Use per-sample hues instead of `particle_color`
    pub colorful_mode: bool,
    pub particles_on_top: bool,
    pub glow_intensity: f32,
    pub min_opacity: f32,
    pub max_opacity: f32,

    // === Lifecycle ===
    /// Life accumulated per tick
    pub fade_speed: f32,
    pub min_particle_life: f32,
    pub max_particle_life: f32,
    /// Fraction of life spent fading in
    pub fade_in_duration: f32,
    /// Fraction of life spent fading out
    pub fade_out_duration: f32,
    /// Maximum particles spawned per tick when topping up
    pub particle_spawn_rate: u32,

    // === Connections ===
    pub connection_distance: f32,
    pub line_thickness: f32,
    /// Line opacity percentage (0-100)
    pub line_opacity: f32,
    pub line_color: String,
    pub connection_fade_speed: f32,
    pub full_matrix_mode: bool,
    pub persistent_connections: bool,

    // === Forces ===
    pub attraction_strength: f32,
    pub attraction_distance: f32,
    pub repulsion_strength: f32,
    /// Velocity retained on wall bounces
    pub momentum: f32,
    /// Velocity retained while under mouse influence
    pub attraction_momentum: f32,
    pub friction: f32,

    // === Movement ===
    /// Distance from spawn point before the return force kicks in (0 = unlimited)
    pub max_travel_distance: f32,
    pub travel_speed: f32,

    // === Fractal ===
    pub max_iterations: u32,
    pub zoom: f64,
    pub seahorse_x: f64,
    pub seahorse_y: f64,

    // === Pattern ===
    pub pattern: PatternKind,
    pub pattern_scale: f32,
    /// Spawn tolerance around pattern lines, percentage (0-100)
    pub pattern_distance: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            particle_count: 600,
            particle_size: 1.0,
            particle_opacity: 100.0,
            particle_color: "#00ffff".to_string(),
            dot_color: "#00ffff".to_string(),
            dot_opacity: 100.0,
            colorful_mode: false,
            particles_on_top: false,
            glow_intensity: 0.5,
            min_opacity: 0.1,
            max_opacity: 0.8,

            fade_speed: 0.001,
            min_particle_life: 0.5,
            max_particle_life: 2.0,
            fade_in_duration: 0.2,
            fade_out_duration: 0.3,
            particle_spawn_rate: 10,

            connection_distance: 200.0,
            line_thickness: 2.5,
            line_opacity: 15.0,
            line_color: "#00ffff".to_string(),
            connection_fade_speed: 0.01,
            full_matrix_mode: false,
            persistent_connections: false,

            attraction_strength: 0.0,
            attraction_distance: 240.0,
            repulsion_strength: 0.0,
            momentum: 1.0,
            attraction_momentum: 0.95,
            friction: 0.01,

            max_travel_distance: 100.0,
            travel_speed: 1.0,

            max_iterations: 100,
            zoom: 1.0,
            seahorse_x: -0.745,
            seahorse_y: 0.1,

            pattern: PatternKind::Mandelbrot,
            pattern_scale: 1.0,
            pattern_distance: 50.0,
        }
    }
}

/// Replace a non-finite value with its default
fn finite_or<T: Copy + Into<f64>>(value: T, default: T) -> T {
    if value.into().is_finite() { value } else { default }
}

fn non_negative(value: f32, default: f32) -> f32 {
    finite_or(value, default).max(0.0)
}

fn positive_or(value: f32, default: f32) -> f32 {
    let v = finite_or(value, default);
    if v > 0.0 { v } else { default }
}

fn color_or(color: &str, default: &str) -> String {
    if parse_hex_color(color).is_some() {
        color.to_string()
    } else {
        default.to_string()
    }
}

impl Config {
    /// Copy with every implausible value clamped or replaced by its default
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        let mut c = self.clone();

        c.particle_count = c.particle_count.min(MAX_PARTICLE_COUNT);
        c.particle_spawn_rate = c.particle_spawn_rate.min(MAX_PARTICLE_COUNT);
        c.particle_size = non_negative(c.particle_size, d.particle_size);
        c.particle_opacity = non_negative(c.particle_opacity, d.particle_opacity).min(100.0);
        c.dot_opacity = non_negative(c.dot_opacity, d.dot_opacity).min(100.0);
        c.glow_intensity = non_negative(c.glow_intensity, d.glow_intensity);
        c.min_opacity = non_negative(c.min_opacity, d.min_opacity).min(1.0);
        c.max_opacity = non_negative(c.max_opacity, d.max_opacity).min(1.0);
        c.particle_color = color_or(&c.particle_color, &d.particle_color);
        c.dot_color = color_or(&c.dot_color, &d.dot_color);
        c.line_color = color_or(&c.line_color, &d.line_color);

        c.fade_speed = non_negative(c.fade_speed, d.fade_speed);
        c.min_particle_life = positive_or(c.min_particle_life, d.min_particle_life);
        c.max_particle_life = positive_or(c.max_particle_life, d.max_particle_life);
        if c.min_particle_life > c.max_particle_life {
            std::mem::swap(&mut c.min_particle_life, &mut c.max_particle_life);
        }
        c.fade_in_duration = non_negative(c.fade_in_duration, d.fade_in_duration).min(1.0);
        c.fade_out_duration = non_negative(c.fade_out_duration, d.fade_out_duration).min(1.0);
        let fade_total = c.fade_in_duration + c.fade_out_duration;
        if fade_total > 1.0 {
            c.fade_in_duration /= fade_total;
            c.fade_out_duration /= fade_total;
        }

        c.connection_distance = non_negative(c.connection_distance, d.connection_distance);
        c.line_thickness = non_negative(c.line_thickness, d.line_thickness);
        c.line_opacity = non_negative(c.line_opacity, d.line_opacity).min(100.0);
        c.connection_fade_speed = non_negative(c.connection_fade_speed, d.connection_fade_speed);

        c.attraction_strength = non_negative(c.attraction_strength, d.attraction_strength);
        c.attraction_distance = non_negative(c.attraction_distance, d.attraction_distance);
        c.repulsion_strength = non_negative(c.repulsion_strength, d.repulsion_strength);
        c.momentum = non_negative(c.momentum, d.momentum).min(1.001);
        c.attraction_momentum =
            non_negative(c.attraction_momentum, d.attraction_momentum).min(1.0);
        c.friction = non_negative(c.friction, d.friction).min(1.0);

        c.max_travel_distance = non_negative(c.max_travel_distance, d.max_travel_distance);
        c.travel_speed = non_negative(c.travel_speed, d.travel_speed);

        c.max_iterations = c.max_iterations.clamp(1, MAX_FRACTAL_ITERATIONS);
        c.zoom = finite_or(c.zoom, d.zoom);
        if c.zoom <= 0.0 {
            c.zoom = d.zoom;
        }
        c.seahorse_x = finite_or(c.seahorse_x, d.seahorse_x);
        c.seahorse_y = finite_or(c.seahorse_y, d.seahorse_y);

        c.pattern_scale = positive_or(c.pattern_scale, d.pattern_scale);
        c.pattern_distance = non_negative(c.pattern_distance, d.pattern_distance).min(100.0);

        if c != *self {
            log::warn!("Configuration contained out-of-range values; clamped");
        }
        c
    }

    /// Spawn acceptance band around pattern lines, in pixels
    pub fn pattern_tolerance(&self) -> f32 {
        (self.pattern_distance / 100.0) * TOLERANCE_BAND_PX
    }

    pub fn particle_rgb(&self) -> [f32; 3] {
        parse_hex_color(&self.particle_color).unwrap_or([0.0, 1.0, 1.0])
    }

    pub fn dot_rgb(&self) -> [f32; 3] {
        parse_hex_color(&self.dot_color).unwrap_or([0.0, 1.0, 1.0])
    }

    pub fn line_rgb(&self) -> [f32; 3] {
        parse_hex_color(&self.line_color).unwrap_or([0.0, 1.0, 1.0])
    }

    /// Flat key -> value view of every field
    pub fn snapshot(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Merge a partial configuration field by field
    ///
    /// Unknown keys are ignored, known keys overwrite. A known key whose
    /// value has the wrong type is skipped.
    pub fn merge_patch(&mut self, patch: &Map<String, Value>) -> ConfigChange {
        let before = self.clone();
        let mut merged = self.clone();

        for (key, value) in patch {
            let mut fields = merged.snapshot();
            if !fields.contains_key(key) {
                continue;
            }
            fields.insert(key.clone(), value.clone());
            match serde_json::from_value::<Config>(Value::Object(fields)) {
                Ok(config) => merged = config,
                Err(err) => log::warn!("Ignoring setting {key}={value}: {err}"),
            }
        }

        *self = merged.sanitized();
        let change = ConfigChange::between(&before, self);
        if change.changed {
            log::info!("Configuration updated ({} keys in patch)", patch.len());
        }
        change
    }

    /// Parse and merge a JSON object patch
    pub fn merge_json(&mut self, json: &str) -> Result<ConfigChange, ConfigError> {
        match serde_json::from_str::<Value>(json)? {
            Value::Object(patch) => Ok(self.merge_patch(&patch)),
            _ => Err(ConfigError::NotAnObject),
        }
    }
}
