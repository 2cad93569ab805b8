//! Triangle geometry for the pattern overlay

use glam::Vec2;

use super::vertex::Vertex;
use crate::sim::{LineSegment, PatternField};

/// Two triangles covering a segment widened by `half_width` on each side
pub fn line_quad(segment: &LineSegment, half_width: f32, color: [f32; 4]) -> [Vertex; 6] {
    let dir = (segment.to - segment.from).normalize_or_zero();
    // Degenerate segments collapse to a zero-area quad
    let perp = Vec2::new(-dir.y, dir.x) * half_width;

    let a1 = segment.from + perp;
    let a2 = segment.from - perp;
    let b1 = segment.to + perp;
    let b2 = segment.to - perp;

    [
        Vertex::new(a1.x, a1.y, color),
        Vertex::new(a2.x, a2.y, color),
        Vertex::new(b1.x, b1.y, color),
        Vertex::new(b1.x, b1.y, color),
        Vertex::new(a2.x, a2.y, color),
        Vertex::new(b2.x, b2.y, color),
    ]
}

/// Quads for every segment of a pattern field
pub fn field_lines(field: &PatternField, width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let half = (width * 0.5).max(0.0);
    let mut vertices = Vec::with_capacity(field.segments.len() * 6);
    for segment in &field.segments {
        vertices.extend_from_slice(&line_quad(segment, half, color));
    }
    vertices
}

/// Band of width `2 * tolerance` around every segment
pub fn tolerance_band(field: &PatternField, tolerance: f32, color: [f32; 4]) -> Vec<Vertex> {
    field_lines(field, 2.0 * tolerance, color)
}
