//! Charts - Evaluation charts for the report exports
//!
//! This crate provides:
//! - The five fixed chart slots and their lookup keys
//! - Vector chart scenes built from an evaluation record
//! - Offscreen rasterization of scenes with tiny-skia
//! - Mounting helpers that register scenes on a capture board

mod error;
mod slot;
mod scene;
mod render;
mod builders;

pub use error::*;
pub use slot::*;
pub use scene::*;
pub use render::*;
pub use builders::*;
