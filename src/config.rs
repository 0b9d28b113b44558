//! Engine configuration from properties
//!
//! Every default lives in engine.json; this module only maps property
//! strings onto typed settings. User overrides come from an optional flat
//! JSON file (`engine_config.json`).

use crate::charts::excerpt::ExcerptOptions;
use crate::engine::drilldown::DrilldownScope;
use crate::engine::error::{EngineError, Result};
use crate::engine::facets::AllLabel;
use crate::engine::loader::{LoadOptions, TextEncoding};
use crate::engine::properties::{registry, PropertyReader};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// `chrono` format of the CSV date column
    pub date_format: String,

    /// CSV text encoding: "latin1" or "utf8"
    pub encoding: TextEncoding,

    /// Half-width of the price comparison band
    pub price_band: f64,

    /// Rows per page of the feedback table
    pub page_size: usize,

    /// Rows returned by a drilldown view
    pub drilldown_top_n: usize,

    pub drilldown_scope: DrilldownScope,

    /// Label style of the synthetic select-everything option
    pub all_label: AllLabel,

    pub excerpt_words: usize,
    pub excerpt_width: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_properties(&PropertyReader::default())
    }
}

impl EngineConfig {
    /// Create config from properties (user override or engine.json default)
    pub fn from_properties(props: &PropertyReader) -> Self {
        let date_format = props.get_string("date.format");
        let encoding = TextEncoding::parse(&props.get_enum("encoding"));

        // A zero-width band compares nothing; fall back to the registry default
        let price_band = props.get_f64("price.band");
        let price_band = if price_band > 0.0 {
            price_band
        } else {
            tracing::warn!("price.band must be positive, using the engine.json default");
            registry()
                .get_default("price.band")
                .and_then(|d| d.parse::<f64>().ok())
                .unwrap_or(0.0)
        };

        // A page of zero rows would make the table unusable
        let page_size = props.get_usize("page.size").max(1);
        let drilldown_top_n = props.get_usize("drilldown.top.n");

        let drilldown_scope = DrilldownScope::parse(&props.get_enum("drilldown.scope"));
        let all_label = AllLabel::parse(&props.get_enum("facet.all.label"));

        let excerpt_words = props.get_usize("feedback.excerpt.words");
        let excerpt_width = props.get_usize("feedback.excerpt.width");

        Self {
            date_format,
            encoding,
            price_band,
            page_size,
            drilldown_top_n,
            drilldown_scope,
            all_label,
            excerpt_words,
            excerpt_width,
        }
    }

    /// Load overrides from `path` (if any) on top of the registry defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let props = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    EngineError::Config(format!("cannot read {}: {}", path.display(), e))
                })?;
                PropertyReader::from_json(&text)?
            }
            None => PropertyReader::default(),
        };
        let config = Self::from_properties(&props);
        tracing::debug!("engine config: {:?}", config);
        Ok(config)
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            date_format: self.date_format.clone(),
            encoding: self.encoding,
        }
    }

    pub fn excerpt_options(&self) -> ExcerptOptions {
        ExcerptOptions {
            max_words: self.excerpt_words,
            width: self.excerpt_width,
        }
    }
}
