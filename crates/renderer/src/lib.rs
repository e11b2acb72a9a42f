//! Rendering side of mountain generation: CPU mesh finalization and wgpu upload.

pub mod gpu;
pub mod mesh;
pub mod vertex;

pub use gpu::*;
pub use mesh::*;
pub use vertex::*;
