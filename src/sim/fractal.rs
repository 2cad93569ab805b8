//! Escape-time sampling near the Mandelbrot set boundary
//!
//! Spawn candidates are drawn from a small square window of the complex plane
//! centered on a fixed region (the "seahorse valley" by default). Points that
//! escape before the iteration cap lie near the boundary and are accepted;
//! points that never escape are rejected.

use glam::Vec2;
use rand::Rng;

use super::sampler::SpawnPoint;
use crate::consts::{ESCAPE_RADIUS_SQ, FRACTAL_FIXED_HUE, FRACTAL_WINDOW};
use crate::hsl_to_rgb;
use crate::settings::Config;

/// Iterations of z <- z² + c until |z|² > 4, capped at `max_iterations`
///
/// The orbit starts at z = c, so the first squaring is already counted as
/// iteration 0. Returns `max_iterations` for points that never escape.
pub fn escape_iterations(c_re: f64, c_im: f64, max_iterations: u32) -> u32 {
    let mut re = c_re;
    let mut im = c_im;
    let mut i = 0;
    while i < max_iterations {
        let next_re = re * re - im * im + c_re;
        im = 2.0 * re * im + c_im;
        re = next_re;
        if re * re + im * im > ESCAPE_RADIUS_SQ {
            break;
        }
        i += 1;
    }
    i
}

/// Half-width of the sampling window in the complex plane
#[inline]
pub fn window_half_width(config: &Config) -> f64 {
    FRACTAL_WINDOW / config.zoom
}

/// Map a complex coordinate inside the sampling window to canvas pixels
pub fn to_screen(c_re: f64, c_im: f64, canvas: Vec2, config: &Config) -> Vec2 {
    let half = window_half_width(config);
    let w = canvas.x as f64;
    let h = canvas.y as f64;
    let x = (c_re - config.seahorse_x) / half * w / 2.0 + w / 2.0;
    let y = (c_im - config.seahorse_y) / half * h / 2.0 + h / 2.0;
    Vec2::new(x as f32, y as f32)
}

/// Draw one candidate near the set boundary
///
/// Returns `None` when the candidate does not escape before the cap; the
/// caller decides whether to retry.
pub fn sample_near_boundary<R: Rng>(
    canvas: Vec2,
    config: &Config,
    rng: &mut R,
) -> Option<SpawnPoint> {
    let half = window_half_width(config);
    if !half.is_finite() {
        return None;
    }
    let c_re = config.seahorse_x + (rng.random::<f64>() * 2.0 - 1.0) * half;
    let c_im = config.seahorse_y + (rng.random::<f64>() * 2.0 - 1.0) * half;

    let max = config.max_iterations.max(1);
    let m = escape_iterations(c_re, c_im, max);
    if m >= max {
        return None;
    }

    let depth = (max - m) as f32 / max as f32;
    let size = (depth * 3.0).max(0.5);
    let hue = if config.colorful_mode {
        m as f32 / max as f32 * 360.0
    } else {
        FRACTAL_FIXED_HUE
    };

    Some(SpawnPoint {
        pos: to_screen(c_re, c_im, canvas, config),
        size,
        color: hsl_to_rgb(hue, 1.0, 0.5),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_origin_never_escapes() {
        for n in [1, 10, 100, 1000] {
            assert_eq!(escape_iterations(0.0, 0.0, n), n);
        }
    }

    #[test]
    fn test_two_escapes_immediately() {
        // z starts at c = 2 (|z|² = 4, not > 4); first update gives
        // z = 2² + 2 = 6, |z|² = 36 > 4, so the loop breaks at i = 0.
        for n in [1, 5, 100] {
            assert_eq!(escape_iterations(2.0, 0.0, n), 0);
        }
    }

    #[test]
    fn test_zero_cap() {
        assert_eq!(escape_iterations(2.0, 0.0, 0), 0);
    }

    #[test]
    fn test_far_point_escapes_fast() {
        assert_eq!(escape_iterations(10.0, 10.0, 50), 0);
    }

    #[test]
    fn test_minus_one_is_periodic() {
        // -1 -> 0 -> -1 ... never escapes
        assert_eq!(escape_iterations(-1.0, 0.0, 200), 200);
    }

    #[test]
    fn test_window_center_maps_to_canvas_center() {
        let config = Config::default();
        let canvas = Vec2::new(800.0, 600.0);
        let p = to_screen(config.seahorse_x, config.seahorse_y, canvas, &config);
        assert!((p.x - 400.0).abs() < 1e-3);
        assert!((p.y - 300.0).abs() < 1e-3);

        let half = window_half_width(&config);
        let corner = to_screen(config.seahorse_x + half, config.seahorse_y - half, canvas, &config);
        assert!((corner.x - 800.0).abs() < 1e-2);
        assert!(corner.y.abs() < 1e-2);
    }

    #[test]
    fn test_samples_are_on_canvas_with_valid_size() {
        let config = Config::default();
        let canvas = Vec2::new(800.0, 600.0);
        let mut rng = Pcg32::seed_from_u64(7);
        let mut accepted = 0;
        for _ in 0..500 {
            if let Some(spawn) = sample_near_boundary(canvas, &config, &mut rng) {
                accepted += 1;
                assert!(spawn.pos.x >= 0.0 && spawn.pos.x <= 800.0);
                assert!(spawn.pos.y >= 0.0 && spawn.pos.y <= 600.0);
                assert!(spawn.size >= 0.5 && spawn.size <= 3.0);
            }
        }
        // The default window straddles the boundary, so some candidates escape
        assert!(accepted > 0);
    }

    #[test]
    fn test_window_inside_set_rejects() {
        // Tiny window around the origin: every point is inside the main cardioid
        let config = Config {
            seahorse_x: 0.0,
            seahorse_y: 0.0,
            zoom: 100.0,
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..50 {
            assert!(sample_near_boundary(Vec2::new(100.0, 100.0), &config, &mut rng).is_none());
        }
    }
}
