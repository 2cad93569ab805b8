//! Vertex types for overlay line geometry

use bytemuck::{Pod, Zeroable};

/// 2D vertex with position (canvas pixels) and RGBA color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    /// Floats per vertex when flattened for upload
    pub const FLOATS: usize = std::mem::size_of::<Vertex>() / std::mem::size_of::<f32>();
}

/// Fixed overlay colors
pub mod colors {
    /// Pattern lines
    pub const PATTERN: [f32; 4] = [1.0, 1.0, 1.0, 0.35];
    /// Translucent band showing where spawns are accepted
    pub const TOLERANCE_BAND: [f32; 4] = [0.0, 1.0, 1.0, 0.08];
}
