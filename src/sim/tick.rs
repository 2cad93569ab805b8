//! Per-frame simulation step
//!
//! One tick integrates every particle, replaces the ones that expired, tops
//! the population back up and rebuilds the connection graph. The pattern
//! field is never touched mid-tick except when the canvas size changes.

use glam::Vec2;

use super::particle::MouseInfluence;
use super::state::FieldState;

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer position in canvas pixels, when the pointer is over the canvas
    pub mouse: Option<Vec2>,
    /// Override for the mouse influence radius (defaults to `attractionDistance`)
    pub mouse_radius: Option<f32>,
    /// New canvas size, if it changed since the last tick
    pub canvas_size: Option<Vec2>,
}

impl TickInput {
    pub fn with_mouse(mouse: Vec2) -> Self {
        Self {
            mouse: Some(mouse),
            ..Default::default()
        }
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Particles whose life ran out
    pub expired: usize,
    /// Particles spawned (replacements plus top-up)
    pub spawned: usize,
    /// Connection edges drawn this tick
    pub edges: usize,
}

/// Advance the field by one step
pub fn tick(state: &mut FieldState, input: &TickInput) -> TickSummary {
    let mut summary = TickSummary::default();

    if let Some(size) = input.canvas_size {
        state.set_canvas_size(size);
    }

    let mouse = input.mouse.map(|pos| MouseInfluence {
        pos,
        radius: input
            .mouse_radius
            .unwrap_or(state.config.attraction_distance),
    });

    // Integrate; expired particles drop out in place so id order is kept
    let canvas = state.canvas;
    let before = state.particles.len();
    state
        .particles
        .retain_mut(|p| p.update(mouse, canvas, &state.config));
    summary.expired = before - state.particles.len();

    // Dead particles are replaced right away, regardless of spawn rate
    for _ in 0..summary.expired {
        if state.spawn_particle(false) {
            summary.spawned += 1;
        }
    }
    summary.spawned += state.maintain_population();

    state
        .connections
        .rebuild(&mut state.particles, &state.config);
    summary.edges = state.connections.edges().len();

    state.time_ticks += 1;

    if summary.expired > 0 && summary.spawned < summary.expired {
        log::debug!(
            "Tick {}: {} expired, only {} respawned",
            state.time_ticks,
            summary.expired,
            summary.spawned
        );
    }

    summary
}
