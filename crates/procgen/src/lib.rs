//! Procedural generation of ring-extruded mountain terrain.

pub mod boundary;
pub mod mountain;

pub use boundary::*;
pub use mountain::*;
