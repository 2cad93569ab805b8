//! Deterministic particle field simulation
//!
//! Everything that moves lives here. The module is pure:
//! - Seeded RNG only
//! - Stable iteration order (by particle id)
//! - No rendering or platform dependencies

pub mod connections;
pub mod fractal;
pub mod geometry;
pub mod particle;
pub mod pattern;
pub mod sampler;
pub mod state;
pub mod tick;

pub use connections::{BruteForcePairs, ConnectionGraph, Edge, PairQuery};
pub use fractal::{escape_iterations, sample_near_boundary};
pub use geometry::{LineSegment, min_distance_to_segments, point_segment_distance};
pub use particle::{LifePhase, MouseInfluence, Particle, lifecycle_alpha};
pub use pattern::PatternField;
pub use sampler::{PositionSampler, SpawnPoint};
pub use state::{FieldState, SpawnStats};
pub use tick::{TickInput, TickSummary, tick};
