//! Simulation state
//!
//! `FieldState` is the single owner of the live particles, the pattern field
//! and the connection graph. Everything random is drawn from its seeded RNG,
//! so two states built from the same seed and inputs evolve identically.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde_json::{Map, Value};
use std::f32::consts::TAU;

use super::connections::{ConnectionGraph, Edge};
use super::particle::Particle;
use super::pattern::PatternField;
use super::sampler::PositionSampler;
use crate::consts::*;
use crate::polar_to_cartesian;
use crate::settings::{Config, ConfigChange, ConfigError};

/// Running spawn counters (diagnostics only)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnStats {
    pub spawned: u64,
    pub sampling_failures: u64,
}

/// Complete simulation state for one viewport
#[derive(Debug, Clone)]
pub struct FieldState {
    /// Session seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub(crate) config: Config,
    /// Canvas size in pixels
    pub canvas: Vec2,
    /// Reference geometry for the active pattern
    pub pattern: PatternField,
    /// Live particles, ordered by id
    pub particles: Vec<Particle>,
    pub connections: ConnectionGraph,
    pub sampler: PositionSampler,
    /// Whether the pattern overlay is drawn
    pub show_pattern: bool,
    /// Tick counter
    pub time_ticks: u64,
    pub stats: SpawnStats,
    next_id: u32,
}

impl FieldState {
    /// Create a populated field for the given canvas
    pub fn new(seed: u64, canvas: Vec2, config: Config) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            config: config.sanitized(),
            canvas,
            pattern: PatternField::empty(),
            particles: Vec::new(),
            connections: ConnectionGraph::new(),
            sampler: PositionSampler::default(),
            show_pattern: false,
            time_ticks: 0,
            stats: SpawnStats::default(),
            next_id: 1,
        };
        state.regenerate_pattern();
        state.reset_population();
        state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Allocate a new particle id
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn edges(&self) -> &[Edge] {
        self.connections.edges()
    }

    /// Pattern geometry, when the overlay is visible
    pub fn pattern_overlay(&self) -> Option<&PatternField> {
        self.show_pattern.then_some(&self.pattern)
    }

    /// Flip overlay visibility; turning it on rebuilds the field
    pub fn toggle_pattern_overlay(&mut self) -> bool {
        self.show_pattern = !self.show_pattern;
        if self.show_pattern {
            self.regenerate_pattern();
        }
        self.show_pattern
    }

    /// Rebuild the pattern field and swap it in whole
    pub fn regenerate_pattern(&mut self) {
        let field = PatternField::generate(self.canvas, &self.config, &mut self.rng);
        log::info!(
            "Pattern '{}' regenerated for {}x{} ({} segments)",
            field.kind.as_str(),
            self.canvas.x,
            self.canvas.y,
            field.segments.len()
        );
        self.pattern = field;
    }

    /// Track a new canvas size; the pattern field follows it
    pub fn set_canvas_size(&mut self, canvas: Vec2) {
        if canvas != self.canvas && canvas.is_finite() {
            self.canvas = canvas.max(Vec2::ZERO);
            self.regenerate_pattern();
        }
    }

    /// Merge a partial configuration. Any effective change repopulates the field.
    pub fn apply_configuration(&mut self, patch: &Map<String, Value>) -> ConfigChange {
        let mut config = self.config.clone();
        let change = config.merge_patch(patch);
        self.commit_config(config, change);
        change
    }

    /// Parse and merge a JSON configuration patch
    pub fn apply_configuration_json(&mut self, json: &str) -> Result<ConfigChange, ConfigError> {
        let mut config = self.config.clone();
        let change = config.merge_json(json)?;
        self.commit_config(config, change);
        Ok(change)
    }

    /// Replace the whole configuration
    pub fn replace_configuration(&mut self, config: Config) -> ConfigChange {
        let config = config.sanitized();
        let change = ConfigChange::between(&self.config, &config);
        self.commit_config(config, change);
        change
    }

    fn commit_config(&mut self, config: Config, change: ConfigChange) {
        self.config = config;
        if change.count_changed {
            log::info!("Particle target now {}", self.config.particle_count);
        }
        if change.geometry_changed {
            self.regenerate_pattern();
        }
        if change.changed {
            self.reset_population();
        }
    }

    /// Flat key -> value view of the active configuration
    pub fn configuration_snapshot(&self) -> Map<String, Value> {
        self.config.snapshot()
    }

    /// Discard every particle and refill to the target count
    pub fn reset_population(&mut self) {
        self.particles.clear();
        self.connections.clear();

        let target = self.config.particle_count as usize;
        let max_attempts = target.saturating_mul(RESET_ATTEMPTS_PER_PARTICLE);
        let mut attempts = 0;
        while self.particles.len() < target && attempts < max_attempts {
            attempts += 1;
            self.spawn_particle(true);
        }

        if self.particles.len() < target {
            log::warn!(
                "Population reset short: {}/{} particles after {} attempts",
                self.particles.len(),
                target,
                attempts
            );
        } else {
            log::info!("Population reset: {} particles", self.particles.len());
        }
    }

    /// Top up toward the target count, at most `particleSpawnRate` per call.
    /// Returns the number of particles added.
    pub fn maintain_population(&mut self) -> usize {
        let target = self.config.particle_count as usize;
        if self.particles.len() > target {
            self.particles.truncate(target);
            return 0;
        }
        let wanted = (target - self.particles.len()).min(self.config.particle_spawn_rate as usize);
        (0..wanted).filter(|_| self.spawn_particle(false)).count()
    }

    /// Sample a position and push a new particle. Returns false when sampling
    /// was exhausted; the caller simply tries again later.
    pub fn spawn_particle(&mut self, staggered: bool) -> bool {
        let Some(spawn) =
            self.sampler
                .sample(self.canvas, &self.config, &self.pattern, &mut self.rng)
        else {
            self.stats.sampling_failures += 1;
            return false;
        };

        let id = self.next_entity_id();
        let config = &self.config;
        let rng = &mut self.rng;

        let max_life = rng.random_range(config.min_particle_life..=config.max_particle_life);
        let life = if staggered {
            rng.random::<f32>() * max_life
        } else {
            0.0
        };
        let speed = (DRIFT_SPEED_MIN + rng.random::<f32>() * DRIFT_SPEED_RANGE) * config.travel_speed;
        let vel = polar_to_cartesian(speed, rng.random::<f32>() * TAU);
        let color = if config.colorful_mode {
            spawn.color
        } else {
            config.particle_rgb()
        };

        self.particles
            .push(Particle::new(id, &spawn, color, vel, life, max_life, config));
        self.stats.spawned += 1;
        true
    }

    /// Reapply `particleColor` to every particle outside colorful mode
    pub fn recolor(&mut self) {
        if self.config.colorful_mode {
            return;
        }
        let color = self.config.particle_rgb();
        for p in &mut self.particles {
            p.color = color;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::PatternKind;
    use serde_json::json;

    fn grid_config(count: u32) -> Config {
        Config {
            pattern: PatternKind::Grid,
            pattern_scale: 1.0,
            pattern_distance: 100.0,
            particle_count: count,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_state_is_populated() {
        let state = FieldState::new(1, Vec2::new(800.0, 600.0), grid_config(50));
        assert_eq!(state.particles.len(), 50);
        assert!(!state.pattern.is_empty());
        // Ids are unique and ascending
        for pair in state.particles.windows(2) {
            assert!(pair[0].id < pair[1].id);
        }
    }

    #[test]
    fn test_staggered_initial_life() {
        let state = FieldState::new(4, Vec2::new(800.0, 600.0), grid_config(100));
        let config = state.config();
        assert!(state.particles.iter().all(|p| {
            p.max_life >= config.min_particle_life
                && p.max_life <= config.max_particle_life
                && p.life >= 0.0
                && p.life < p.max_life
        }));
        let fresh = state.particles.iter().filter(|p| p.life == 0.0).count();
        assert!(fresh < 100);
    }

    #[test]
    fn test_apply_configuration_resets_on_change() {
        let mut state = FieldState::new(2, Vec2::new(800.0, 600.0), grid_config(50));
        let patch = json!({ "particleCount": 20, "pattern": "triangle" });
        let change = state.apply_configuration(patch.as_object().unwrap());
        assert!(change.changed && change.geometry_changed && change.count_changed);
        assert_eq!(state.pattern.kind, PatternKind::Triangle);
        assert!(state.particles.len() <= 20);
    }

    #[test]
    fn test_apply_same_configuration_keeps_particles() {
        let mut state = FieldState::new(3, Vec2::new(800.0, 600.0), grid_config(30));
        let before: Vec<(u32, Vec2)> = state.particles.iter().map(|p| (p.id, p.pos)).collect();
        let snapshot = state.configuration_snapshot();
        let change = state.apply_configuration(&snapshot);
        assert!(!change.changed);
        let after: Vec<(u32, Vec2)> = state.particles.iter().map(|p| (p.id, p.pos)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_apply_configuration_json_error_leaves_state() {
        let mut state = FieldState::new(3, Vec2::new(800.0, 600.0), grid_config(10));
        assert!(state.apply_configuration_json("not json").is_err());
        assert_eq!(state.particles.len(), 10);
        assert_eq!(state.config().pattern, PatternKind::Grid);
    }

    #[test]
    fn test_maintain_population_respects_spawn_rate() {
        let mut state = FieldState::new(5, Vec2::new(800.0, 600.0), grid_config(40));
        state.particles.truncate(5);
        let added = state.maintain_population();
        assert_eq!(added, state.config().particle_spawn_rate as usize);
        assert_eq!(state.particles.len(), 15);
    }

    #[test]
    fn test_maintain_population_trims_excess() {
        let mut state = FieldState::new(5, Vec2::new(800.0, 600.0), grid_config(40));
        state.config.particle_count = 10;
        state.maintain_population();
        assert_eq!(state.particles.len(), 10);
    }

    #[test]
    fn test_resize_regenerates_pattern() {
        let mut state = FieldState::new(6, Vec2::new(800.0, 600.0), grid_config(10));
        let before = state.pattern.segments.len();
        state.set_canvas_size(Vec2::new(400.0, 300.0));
        assert_eq!(state.pattern.canvas, Vec2::new(400.0, 300.0));
        assert!(state.pattern.segments.len() < before);
    }

    #[test]
    fn test_overlay_toggle() {
        let mut state = FieldState::new(7, Vec2::new(800.0, 600.0), grid_config(10));
        assert!(state.pattern_overlay().is_none());
        assert!(state.toggle_pattern_overlay());
        assert!(state.pattern_overlay().is_some());
        assert!(!state.toggle_pattern_overlay());
        assert!(state.pattern_overlay().is_none());
    }

    #[test]
    fn test_recolor_uses_particle_color() {
        let mut state = FieldState::new(8, Vec2::new(800.0, 600.0), grid_config(10));
        state.config.particle_color = "#ff0000".to_string();
        state.recolor();
        assert!(state.particles.iter().all(|p| p.color == [1.0, 0.0, 0.0]));
    }

    #[test]
    fn test_exhausted_sampling_is_counted() {
        let config = Config {
            pattern_distance: 0.0,
            ..grid_config(5)
        };
        let state = FieldState::new(9, Vec2::new(800.0, 600.0), config);
        assert!(state.particles.len() < 5);
        assert!(state.stats.sampling_failures > 0);
    }
}
