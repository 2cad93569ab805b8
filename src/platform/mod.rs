//! Platform bindings
//!
//! The simulation itself is platform independent. On wasm32 this module
//! exposes it to a browser host; natively the headless runner in `main.rs`
//! drives it directly.

#[cfg(target_arch = "wasm32")]
pub mod web;

/// LocalStorage key for the saved settings file
pub const SETTINGS_STORAGE_KEY: &str = "pattern_particles_settings";
