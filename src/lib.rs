//! Pattern Particles - an animated particle field gated by geometric patterns
//!
//! Core modules:
//! - `sim`: Frame-synchronous simulation (sampling, physics, lifecycle, connections)
//! - `settings`: Runtime configuration value object
//! - `renderer`: GPU-uploadable instance data built from simulation state
//! - `persistence`: Settings snapshot import/export envelope
//! - `platform`: Browser binding for the simulation core

pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::{Config, ConfigChange, ConfigError, PatternKind};

use glam::Vec2;

/// Simulation constants
pub mod consts {
    /// Rejection sampling bound for a single spawn point
    pub const MAX_SAMPLE_ATTEMPTS: u32 = 50;
    /// Pixel band that `patternDistance = 100` maps to
    pub const TOLERANCE_BAND_PX: f32 = 50.0;

    /// Half-width of the fractal sampling window at zoom 1
    pub const FRACTAL_WINDOW: f64 = 0.001;
    /// Squared escape radius for z <- z² + c
    pub const ESCAPE_RADIUS_SQ: f64 = 4.0;
    /// Hue used for fractal samples outside colorful mode
    pub const FRACTAL_FIXED_HUE: f32 = 180.0;

    /// Number of reference points for parametric and fractal patterns
    pub const PATTERN_POINT_COUNT: usize = 100;
    /// Fractal pattern points closer than this are linked into the mesh
    pub const MANDELBROT_LINK_DISTANCE: f32 = 50.0;
    /// Draws allowed per fractal pattern point before giving up
    pub const MANDELBROT_ATTEMPTS_PER_POINT: usize = 200;
    /// Spiral pattern turns (in units of 2π before the 3x angular multiplier)
    pub const SPIRAL_TURNS: f32 = 4.0;
    /// Concentric rings in the target pattern
    pub const TARGET_RINGS: usize = 8;
    /// Points per target ring
    pub const TARGET_RING_POINTS: usize = 13;
    /// Base grid cell size in pixels (scaled by `patternScale`)
    pub const GRID_CELL: f32 = 50.0;
    /// Internal lines parallel to each triangle edge
    pub const TRIANGLE_SUBDIVISIONS: usize = 5;

    /// Base drift speed range (scaled by `travelSpeed`)
    pub const DRIFT_SPEED_MIN: f32 = 0.3;
    pub const DRIFT_SPEED_RANGE: f32 = 0.3;
    /// Gain of the return-to-start acceleration
    pub const RETURN_GAIN: f32 = 0.05;

    /// Spawn attempts per particle during a full repopulation
    pub const RESET_ATTEMPTS_PER_PARTICLE: usize = 20;

    /// Upper bound on `particleCount` (and on `particleSpawnRate`)
    pub const MAX_PARTICLE_COUNT: u32 = 5_000;
    /// Upper bound on `maxIterations`
    pub const MAX_FRACTAL_ITERATIONS: u32 = 10_000;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Linear interpolation between two points
#[inline]
pub fn lerp_point(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    a + (b - a) * t
}

/// Convert HSL (h in degrees, s/l in 0..1) to linear RGB in 0..1
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    let h = h.rem_euclid(360.0) / 60.0;
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    [r + m, g + m, b + m]
}

/// Parse a `#rrggbb` color string into RGB in 0..1
pub fn parse_hex_color(hex: &str) -> Option<[f32; 3]> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([
        channel(0)? as f32 / 255.0,
        channel(2)? as f32 / 255.0,
        channel(4)? as f32 / 255.0,
    ])
}
