//! Facet filter engine
//!
//! Structure:
//! - `dataset.rs`: rows, columns and cached domains
//! - `loader.rs`: CSV/record sources into a `Dataset`
//! - `facets.rs`: cascading facet selections and options
//! - `filter.rs`: filter state resolution into row subsets
//! - `aggregate.rs`: zero-filled chart aggregates
//! - `pages.rs`: offset/limit paging
//! - `drilldown.rs`: route keys for chart drilldowns
//! - `properties.rs`: property registry (engine.json) and reader
//! - `error.rs`: error types

pub mod aggregate;
pub mod dataset;
pub mod dates;
pub mod drilldown;
pub mod error;
pub mod facets;
pub mod filter;
pub mod loader;
pub mod pages;
pub mod properties;

pub use dataset::{Column, Dataset, Row, Sentiment};
pub use dates::{DateBound, DateRange};
pub use drilldown::{DrilldownKey, DrilldownScope, DrilldownTarget};
pub use error::{EngineError, Result};
pub use facets::{Dimension, FacetGraph, FacetSelection, FilterState};
pub use filter::{resolve, RowSubset};
pub use loader::{load_dataset, CsvSource, LoadOptions, RowSource};
pub use pages::{page, Page};
