//! Pattern-constrained spawn point sampling
//!
//! A candidate is drawn from the active pattern's generator and accepted only
//! if it lies within the configured tolerance band of the pattern field.

use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;

use super::fractal::sample_near_boundary;
use super::pattern::{PatternField, canvas_center, grid_cell, max_radius, triangle_vertices};
use crate::consts::MAX_SAMPLE_ATTEMPTS;
use crate::polar_to_cartesian;
use crate::settings::{Config, PatternKind};

/// An accepted spawn location with its sampled size and color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPoint {
    pub pos: Vec2,
    pub size: f32,
    /// RGB in 0..1
    pub color: [f32; 3],
}

/// Draw one raw candidate for the configured pattern
///
/// Only the Mandelbrot generator can fail (its candidate did not escape).
pub fn raw_candidate<R: Rng>(canvas: Vec2, config: &Config, rng: &mut R) -> Option<SpawnPoint> {
    let pos = match config.pattern {
        PatternKind::Mandelbrot => return sample_near_boundary(canvas, config, rng),
        PatternKind::Spiral => {
            let theta = rng.random::<f32>() * TAU * config.pattern_scale;
            let radius = rng.random::<f32>() * max_radius(canvas, config);
            canvas_center(canvas) + polar_to_cartesian(radius, theta * 3.0)
        }
        PatternKind::Target => {
            // Sum of two uniforms covers the whole disk, peaking mid-radius
            let spread = (rng.random::<f32>() + rng.random::<f32>()) * 0.5;
            let theta = rng.random::<f32>() * TAU;
            canvas_center(canvas) + polar_to_cartesian(spread * max_radius(canvas, config), theta)
        }
        PatternKind::Grid => {
            let cell = grid_cell(config);
            Vec2::new(
                lattice_coord(canvas.x, cell, rng),
                lattice_coord(canvas.y, cell, rng),
            )
        }
        PatternKind::Triangle => {
            let [v0, v1, v2] = triangle_vertices(canvas, config);
            let a = rng.random::<f32>();
            let b = rng.random::<f32>() * (1.0 - a);
            let c = 1.0 - a - b;
            v0 * a + v1 * b + v2 * c
        }
    };

    Some(SpawnPoint {
        pos,
        size: 1.0,
        color: config.dot_rgb(),
    })
}

/// Pick a cell along one axis of the `k * cell` lattice, then a point inside
/// it. The trailing partial cell is cut at the canvas edge.
fn lattice_coord<R: Rng>(extent: f32, cell: f32, rng: &mut R) -> f32 {
    let extent = extent.max(0.0);
    let cells = ((extent / cell).ceil() as u32).max(1);
    let origin = rng.random_range(0..cells) as f32 * cell;
    let width = (extent - origin).clamp(0.0, cell);
    origin + rng.random::<f32>() * width
}

/// Rejection sampler gating candidates by distance to the pattern field
#[derive(Debug, Clone, Copy)]
pub struct PositionSampler {
    /// Candidates drawn before giving up
    pub max_attempts: u32,
}

impl Default for PositionSampler {
    fn default() -> Self {
        Self {
            max_attempts: MAX_SAMPLE_ATTEMPTS,
        }
    }
}

impl PositionSampler {
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    /// Sample a spawn point within tolerance of `field`
    ///
    /// Returns `None` when the generator rejects a candidate outright or no
    /// candidate lands within tolerance in `max_attempts` draws.
    pub fn sample<R: Rng>(
        &self,
        canvas: Vec2,
        config: &Config,
        field: &PatternField,
        rng: &mut R,
    ) -> Option<SpawnPoint> {
        let tolerance = config.pattern_tolerance();
        for _ in 0..self.max_attempts {
            let candidate = raw_candidate(canvas, config, rng)?;
            if field.min_distance(candidate.pos) <= tolerance {
                return Some(candidate);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const CANVAS: Vec2 = Vec2::new(800.0, 600.0);

    fn config_for(pattern: PatternKind) -> Config {
        Config {
            pattern,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_field_accepts_first_candidate() {
        let config = config_for(PatternKind::Grid);
        let sampler = PositionSampler::new(1);

        // Same seed: the sampler must return exactly the first raw candidate
        let mut rng_a = Pcg32::seed_from_u64(9);
        let mut rng_b = Pcg32::seed_from_u64(9);
        let sampled = sampler.sample(CANVAS, &config, &PatternField::empty(), &mut rng_a);
        let raw = raw_candidate(CANVAS, &config, &mut rng_b);
        assert_eq!(sampled, raw);
    }

    #[test]
    fn test_accepted_points_are_within_tolerance() {
        let mut rng = Pcg32::seed_from_u64(11);
        for kind in PatternKind::ALL {
            let config = Config {
                pattern: kind,
                pattern_distance: 20.0,
                ..Default::default()
            };
            let field = PatternField::generate(CANVAS, &config, &mut rng);
            let sampler = PositionSampler::default();
            for _ in 0..50 {
                if let Some(spawn) = sampler.sample(CANVAS, &config, &field, &mut rng) {
                    assert!(field.min_distance(spawn.pos) <= config.pattern_tolerance());
                }
            }
        }
    }

    #[test]
    fn test_zero_tolerance_exhausts() {
        // Grid candidates are continuous, so landing exactly on a line is
        // vanishingly unlikely with zero tolerance
        let config = Config {
            pattern: PatternKind::Grid,
            pattern_distance: 0.0,
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(5);
        let field = PatternField::generate(CANVAS, &config, &mut rng);
        let sampler = PositionSampler::default();
        assert!(sampler.sample(CANVAS, &config, &field, &mut rng).is_none());
    }

    #[test]
    fn test_raw_candidates_stay_in_shape() {
        let mut rng = Pcg32::seed_from_u64(3);
        let center = canvas_center(CANVAS);

        let target = config_for(PatternKind::Target);
        for _ in 0..100 {
            let p = raw_candidate(CANVAS, &target, &mut rng).map(|s| s.pos);
            let r = p.map(|p| p.distance(center)).unwrap_or(f32::MAX);
            assert!(r <= max_radius(CANVAS, &target) + 1e-3);
        }

        let grid = config_for(PatternKind::Grid);
        for _ in 0..100 {
            let p = raw_candidate(CANVAS, &grid, &mut rng).map(|s| s.pos);
            assert!(p.is_some_and(|p| p.x >= 0.0 && p.x <= 800.0 && p.y >= 0.0 && p.y <= 600.0));
        }

        let triangle = config_for(PatternKind::Triangle);
        let [v0, v1, _] = triangle_vertices(CANVAS, &triangle);
        for _ in 0..100 {
            let p = raw_candidate(CANVAS, &triangle, &mut rng).map(|s| s.pos);
            assert!(p.is_some_and(|p| p.y >= v0.y - 1e-3 && p.y <= v1.y + 1e-3));
        }
    }

    #[test]
    fn test_target_spawns_fill_tolerance_band() {
        // Rings 37.5 px apart with a 50 px tolerance: accepted points must
        // spread between the rings, not sit on them
        let config = Config {
            pattern: PatternKind::Target,
            pattern_scale: 2.0,
            pattern_distance: 100.0,
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(21);
        let field = PatternField::generate(CANVAS, &config, &mut rng);
        let sampler = PositionSampler::default();

        let mut farthest: f32 = 0.0;
        for _ in 0..2000 {
            if let Some(spawn) = sampler.sample(CANVAS, &config, &field, &mut rng) {
                let d = field.min_distance(spawn.pos);
                assert!(d <= config.pattern_tolerance());
                farthest = farthest.max(d);
            }
        }
        assert!(farthest > 12.0, "farthest accepted distance {farthest}");
    }

    #[test]
    fn test_grid_candidates_follow_field_lattice() {
        // 820 px wide: 16 full 50 px cells plus a 20 px strip past the last line
        let canvas = Vec2::new(820.0, 610.0);
        let config = config_for(PatternKind::Grid);
        let cell = grid_cell(&config);
        let mut rng = Pcg32::seed_from_u64(8);
        let field = PatternField::generate(canvas, &config, &mut rng);

        let mut in_strip = 0;
        for _ in 0..3400 {
            let p = raw_candidate(canvas, &config, &mut rng)
                .map(|s| s.pos)
                .unwrap_or(Vec2::NAN);
            assert!(p.x >= 0.0 && p.x <= canvas.x && p.y >= 0.0 && p.y <= canvas.y);
            assert!(field.min_distance(p) <= cell / 2.0 + 1e-3);
            if p.x >= 800.0 {
                in_strip += 1;
            }
        }
        // The strip is one of 17 columns, so it draws about 200 candidates
        assert!((120..300).contains(&in_strip), "strip got {in_strip}");
    }

    #[test]
    fn test_grid_candidates_on_canvas_smaller_than_cell() {
        let canvas = Vec2::new(30.0, 20.0);
        let config = config_for(PatternKind::Grid);
        let mut rng = Pcg32::seed_from_u64(4);
        for _ in 0..100 {
            let p = raw_candidate(canvas, &config, &mut rng).map(|s| s.pos);
            assert!(p.is_some_and(|p| p.x >= 0.0 && p.x <= 30.0 && p.y >= 0.0 && p.y <= 20.0));
        }
    }

    #[test]
    fn test_non_fractal_samples_use_dot_color() {
        let config = Config {
            pattern: PatternKind::Spiral,
            dot_color: "#ff0000".to_string(),
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(2);
        let spawn = raw_candidate(CANVAS, &config, &mut rng);
        assert_eq!(spawn.map(|s| s.color), Some([1.0, 0.0, 0.0]));
        assert_eq!(spawn.map(|s| s.size), Some(1.0));
    }
}
