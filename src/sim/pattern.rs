//! Pattern field generation
//!
//! A pattern field is the reference geometry particles spawn along: a set of
//! line segments at canvas scale plus the points they were built from. It is
//! rebuilt from scratch whenever the pattern kind, scale, fractal window or
//! canvas size changes.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::fractal::sample_near_boundary;
use super::geometry::{LineSegment, min_distance_to_segments};
use crate::consts::*;
use crate::settings::{Config, PatternKind};
use crate::{lerp_point, polar_to_cartesian};

/// Smallest grid cell, keeps tiny scales from exploding the segment count
pub const GRID_MIN_CELL: f32 = 5.0;

/// Reference geometry for the active pattern
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternField {
    pub kind: PatternKind,
    /// Canvas size the field was generated for
    pub canvas: Vec2,
    pub segments: Vec<LineSegment>,
    pub points: Vec<Vec2>,
}

impl PatternField {
    /// Field with no geometry; every candidate is within tolerance of it
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the field for `config.pattern` at canvas scale
    pub fn generate<R: Rng>(canvas: Vec2, config: &Config, rng: &mut R) -> Self {
        let mut field = Self {
            kind: config.pattern,
            canvas,
            segments: Vec::new(),
            points: Vec::new(),
        };
        if canvas.x <= 0.0 || canvas.y <= 0.0 {
            return field;
        }

        match config.pattern {
            PatternKind::Spiral => field.build_spiral(config),
            PatternKind::Target => field.build_target(config),
            PatternKind::Grid => field.build_grid(config),
            PatternKind::Triangle => field.build_triangle(config),
            PatternKind::Mandelbrot => field.build_mandelbrot(config, rng),
        }

        log::debug!(
            "Generated {} pattern: {} segments, {} points",
            field.kind.as_str(),
            field.segments.len(),
            field.points.len()
        );
        field
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Minimum distance from `p` to the field (0 for an empty field)
    pub fn min_distance(&self, p: Vec2) -> f32 {
        min_distance_to_segments(p, &self.segments)
    }

    /// Join consecutive points of a run starting at `start` into segments
    fn connect_run(&mut self, start: usize, closed: bool) {
        let run = &self.points[start..];
        let mut segments: Vec<LineSegment> = run
            .windows(2)
            .map(|w| LineSegment::new(w[0], w[1]))
            .collect();
        if closed && run.len() > 2 {
            segments.push(LineSegment::new(run[run.len() - 1], run[0]));
        }
        self.segments.extend(segments);
    }

    fn build_spiral(&mut self, config: &Config) {
        let center = canvas_center(self.canvas);
        let max_r = max_radius(self.canvas, config);
        let n = PATTERN_POINT_COUNT;

        for i in 0..n {
            let t = i as f32 / n as f32;
            let theta = t * TAU * SPIRAL_TURNS;
            self.points
                .push(center + polar_to_cartesian(t * max_r, theta * 3.0));
        }
        self.connect_run(0, false);
    }

    fn build_target(&mut self, config: &Config) {
        let center = canvas_center(self.canvas);
        let max_r = max_radius(self.canvas, config);

        for ring in 1..=TARGET_RINGS {
            let radius = ring as f32 / TARGET_RINGS as f32 * max_r;
            let start = self.points.len();
            for j in 0..TARGET_RING_POINTS {
                let theta = j as f32 / TARGET_RING_POINTS as f32 * TAU;
                self.points.push(center + polar_to_cartesian(radius, theta));
            }
            self.connect_run(start, true);
        }
    }

    fn build_grid(&mut self, config: &Config) {
        let cell = grid_cell(config);
        let (w, h) = (self.canvas.x, self.canvas.y);
        let cols = (w / cell).floor() as usize;
        let rows = (h / cell).floor() as usize;

        for col in 0..=cols {
            let x = col as f32 * cell;
            self.segments
                .push(LineSegment::new(Vec2::new(x, 0.0), Vec2::new(x, h)));
        }
        for row in 0..=rows {
            let y = row as f32 * cell;
            self.segments
                .push(LineSegment::new(Vec2::new(0.0, y), Vec2::new(w, y)));
        }
        for row in 0..=rows {
            for col in 0..=cols {
                self.points
                    .push(Vec2::new(col as f32 * cell, row as f32 * cell));
            }
        }
    }

    fn build_triangle(&mut self, config: &Config) {
        let vertices = triangle_vertices(self.canvas, config);
        self.points.extend_from_slice(&vertices);

        for i in 0..3 {
            self.segments
                .push(LineSegment::new(vertices[i], vertices[(i + 1) % 3]));
        }

        // Lines parallel to each edge, stepping in from the opposite vertex
        for i in 0..3 {
            let apex = vertices[i];
            let left = vertices[(i + 1) % 3];
            let right = vertices[(i + 2) % 3];
            for k in 1..=TRIANGLE_SUBDIVISIONS {
                let t = k as f32 / (TRIANGLE_SUBDIVISIONS + 1) as f32;
                self.segments.push(LineSegment::new(
                    lerp_point(apex, left, t),
                    lerp_point(apex, right, t),
                ));
            }
        }
    }

    fn build_mandelbrot<R: Rng>(&mut self, config: &Config, rng: &mut R) {
        let target = PATTERN_POINT_COUNT;
        let max_attempts = target * MANDELBROT_ATTEMPTS_PER_POINT;

        let mut attempts = 0;
        while self.points.len() < target && attempts < max_attempts {
            attempts += 1;
            if let Some(spawn) = sample_near_boundary(self.canvas, config, rng) {
                self.points.push(spawn.pos);
            }
        }
        if self.points.len() < target {
            log::warn!(
                "Fractal window yielded {}/{} boundary points after {} draws",
                self.points.len(),
                target,
                attempts
            );
        }

        for i in 0..self.points.len() {
            for j in (i + 1)..self.points.len() {
                let (a, b) = (self.points[i], self.points[j]);
                if a.distance(b) < MANDELBROT_LINK_DISTANCE {
                    self.segments.push(LineSegment::new(a, b));
                }
            }
        }
    }
}

#[inline]
pub fn canvas_center(canvas: Vec2) -> Vec2 {
    canvas * 0.5
}

/// Outer radius shared by the spiral and target patterns
#[inline]
pub fn max_radius(canvas: Vec2, config: &Config) -> f32 {
    canvas.x.min(canvas.y) / 4.0 * config.pattern_scale
}

#[inline]
pub fn grid_cell(config: &Config) -> f32 {
    (GRID_CELL * config.pattern_scale).max(GRID_MIN_CELL)
}

/// Apex at the top, base along the bottom, half-size `width/4 * scale`
pub fn triangle_vertices(canvas: Vec2, config: &Config) -> [Vec2; 3] {
    let c = canvas_center(canvas);
    let s = canvas.x / 4.0 * config.pattern_scale;
    [
        Vec2::new(c.x, c.y - s),
        Vec2::new(c.x - s, c.y + s),
        Vec2::new(c.x + s, c.y + s),
    ]
}
