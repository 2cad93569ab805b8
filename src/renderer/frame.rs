//! Per-frame render data
//!
//! Flattens the simulation state into plain `Pod` arrays that a host can
//! upload as instance buffers (or copy into a `Float32Array`) without
//! touching the simulation types.

use bytemuck::{Pod, Zeroable};

use super::shapes;
use super::vertex::{Vertex, colors};
use crate::sim::FieldState;

// ============================================================================
// GPU DATA STRUCTURES (layout shared with the host's shaders)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Globals {
    pub resolution: [f32; 2],  // offset 0
    pub particle_count: u32,   // offset 8
    pub edge_count: u32,       // offset 12
    pub line_color: [f32; 3],  // offset 16
    pub line_thickness: f32,   // offset 28
    pub glow_intensity: f32,   // offset 32
    pub min_opacity: f32,      // offset 36
    pub max_opacity: f32,      // offset 40
    pub particles_on_top: u32, // offset 44 - 1 draws particles after edges
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 2],
    pub radius: f32,
    pub alpha: f32,
    pub color: [f32; 3],
    pub _pad: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct EdgeInstance {
    pub from: [f32; 2],
    pub to: [f32; 2],
    pub opacity: f32,
    pub thickness: f32,
}

impl ParticleInstance {
    pub const FLOATS: usize = std::mem::size_of::<Self>() / std::mem::size_of::<f32>();
}

impl EdgeInstance {
    pub const FLOATS: usize = std::mem::size_of::<Self>() / std::mem::size_of::<f32>();
}

/// Everything a host needs to draw one frame
#[derive(Debug, Clone, Default)]
pub struct FrameData {
    pub globals: Globals,
    pub particles: Vec<ParticleInstance>,
    pub edges: Vec<EdgeInstance>,
    /// Pattern lines, empty unless the overlay is visible
    pub overlay: Vec<Vertex>,
    /// Acceptance band around the pattern, empty unless the overlay is visible
    pub band: Vec<Vertex>,
}

impl FrameData {
    pub fn capture(state: &FieldState) -> Self {
        let config = state.config();
        let opacity = config.particle_opacity / 100.0;

        let particles: Vec<ParticleInstance> = state
            .particles()
            .iter()
            .map(|p| ParticleInstance {
                position: p.pos.to_array(),
                radius: p.size * config.particle_size,
                alpha: p.alpha * opacity,
                color: p.color,
                _pad: 0.0,
            })
            .collect();

        let edges: Vec<EdgeInstance> = state
            .edges()
            .iter()
            .map(|e| EdgeInstance {
                from: e.from.to_array(),
                to: e.to.to_array(),
                opacity: e.opacity,
                thickness: config.line_thickness,
            })
            .collect();

        let (overlay, band) = match state.pattern_overlay() {
            Some(field) => (
                shapes::field_lines(field, 1.0, colors::PATTERN),
                shapes::tolerance_band(field, config.pattern_tolerance(), colors::TOLERANCE_BAND),
            ),
            None => (Vec::new(), Vec::new()),
        };

        let globals = Globals {
            resolution: state.canvas.to_array(),
            particle_count: particles.len() as u32,
            edge_count: edges.len() as u32,
            line_color: config.line_rgb(),
            line_thickness: config.line_thickness,
            glow_intensity: config.glow_intensity,
            min_opacity: config.min_opacity,
            max_opacity: config.max_opacity,
            particles_on_top: config.particles_on_top as u32,
        };

        Self {
            globals,
            particles,
            edges,
            overlay,
            band,
        }
    }

    /// Particle instances as a flat float slice
    pub fn particle_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.particles)
    }

    pub fn edge_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.edges)
    }

    pub fn overlay_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.overlay)
    }

    pub fn band_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.band)
    }
}
