//! Presentation adapters fed by the engine
//!
//! - `palettes.rs`: stable category colors
//! - `excerpt.rs`: feedback shortening
//! - `frame_convert.rs`: aggregates and pages as Polars DataFrames

pub mod excerpt;
pub mod frame_convert;
pub mod palettes;

pub use excerpt::{excerpt, ExcerptOptions};
pub use palettes::color_for;
