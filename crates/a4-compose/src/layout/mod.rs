//! Layout of document blocks into pages
//!
//! - Measurement capability (block heights at a width and font size)
//! - Pagination (greedy fill of fixed-height regions, never splitting blocks)

mod engine;
mod measure;

pub use engine::*;
pub use measure::*;
