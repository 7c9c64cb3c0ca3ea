//! Capture - Chart bitmap capture
//!
//! Two ways to obtain pixels from a mounted chart:
//! - a synchronous read of a live [`Canvas`] surface
//! - an asynchronous offscreen rasterization of a [`ChartElement`] at an
//!   oversampling factor, after a settle delay and under a timeout
//!
//! Charts are registered on a [`ChartBoard`] under logical keys; a missing
//! key, a timeout or a failed render yields [`CaptureOutcome::Unavailable`]
//! instead of an error, so one bad chart never aborts a multi-chart export.

mod error;
mod raster;
mod source;
mod capture;

pub use error::*;
pub use raster::*;
pub use source::*;
pub use capture::*;
