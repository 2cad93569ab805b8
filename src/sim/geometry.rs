//! Line segment geometry for pattern fields
//!
//! Spawn candidates are gated by their distance to the pattern's segments,
//! and the same segments are drawn as the pattern overlay.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A straight segment between two screen-space points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub from: Vec2,
    pub to: Vec2,
}

impl LineSegment {
    pub fn new(from: Vec2, to: Vec2) -> Self {
        Self { from, to }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.from.distance(self.to)
    }

    /// Closest point on the segment to `p`
    ///
    /// The projection parameter is clamped to [0, 1]. A zero-length segment
    /// collapses to its start point.
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        let dir = self.to - self.from;
        let len_sq = dir.length_squared();
        if len_sq == 0.0 {
            return self.from;
        }
        let t = ((p - self.from).dot(dir) / len_sq).clamp(0.0, 1.0);
        self.from + dir * t
    }

    /// Euclidean distance from `p` to the segment
    #[inline]
    pub fn distance_to(&self, p: Vec2) -> f32 {
        p.distance(self.closest_point(p))
    }
}

/// Distance from a point to a segment given by its endpoints
#[inline]
pub fn point_segment_distance(p: Vec2, from: Vec2, to: Vec2) -> f32 {
    LineSegment::new(from, to).distance_to(p)
}

/// Minimum distance from `p` to any segment
///
/// An empty segment set imposes no constraint, so the distance is 0.
pub fn min_distance_to_segments(p: Vec2, segments: &[LineSegment]) -> f32 {
    if segments.is_empty() {
        return 0.0;
    }
    segments
        .iter()
        .map(|s| s.distance_to(p))
        .fold(f32::INFINITY, f32::min)
}
