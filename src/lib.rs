//! Review Facet Engine Library
//!
//! Cascading facet filters, zero-filled chart aggregates, paging and
//! drilldown keys over an immutable table of vehicle review mentions.
//! The binary in `main.rs` drives it through `pipeline`.

pub mod charts;
pub mod config;
pub mod engine;
pub mod pipeline;
