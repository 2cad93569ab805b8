//! Render output
//!
//! The simulation does not draw. This module turns a `FieldState` into flat
//! instance buffers for whatever host does the drawing.

pub mod frame;
pub mod shapes;
pub mod vertex;

pub use frame::{EdgeInstance, FrameData, Globals, ParticleInstance};
pub use vertex::Vertex;
