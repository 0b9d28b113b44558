//! Drilldown route keys
//!
//! A click on a chart bar becomes a route fragment that the detail view
//! can decode and resolve on its own:
//!
//! ```text
//! /feedback/<target>/<from>/<to>     feature drilldown
//! /sentiment/<target>/<from>/<to>    sentiment (fact) drilldown
//! ```
//!
//! `<target>` is the URL-safe, unpadded base64 of the label so that any
//! label (including ones containing `/`) survives routing. Dates are
//! `YYYY-MM-DD`, or `None` when the endpoint is not set.
//!
//! The key carries only the target and the date range. Whether the
//! caller's other facet selections are re-applied is decided by
//! `DrilldownScope`.

use super::dataset::Dataset;
use super::dates::{DateBound, DateRange, ISO_DATE_FORMAT};
use super::error::{EngineError, Result};
use super::facets::{Dimension, FilterState};
use super::filter::RowSubset;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::NaiveDate;
use serde::Serialize;

/// Sentinel for an unset date endpoint
pub const UNSET_DATE: &str = "None";

const FEATURE_ROUTE: &str = "feedback";
const SENTIMENT_ROUTE: &str = "sentiment";

/// What was clicked
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "label", rename_all = "snake_case")]
pub enum DrilldownTarget {
    /// A bar of the feature chart; matches `row.feature`
    Feature(String),
    /// A bar of the sentiment chart; matches `row.fact`
    Sentiment(String),
}

impl DrilldownTarget {
    pub fn label(&self) -> &str {
        match self {
            DrilldownTarget::Feature(label) | DrilldownTarget::Sentiment(label) => label,
        }
    }

    fn route(&self) -> &'static str {
        match self {
            DrilldownTarget::Feature(_) => FEATURE_ROUTE,
            DrilldownTarget::Sentiment(_) => SENTIMENT_ROUTE,
        }
    }
}

/// Whether a drilldown re-applies the overview's facet selections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrilldownScope {
    /// Target and date range only
    #[default]
    TargetOnly,
    /// Target, date range and every explicit facet selection of the caller
    FullContext,
}

impl DrilldownScope {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "full-context" => Self::FullContext,
            _ => Self::TargetOnly,
        }
    }
}

/// Decoded drilldown route
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrilldownKey {
    pub target: DrilldownTarget,
    pub date_from: DateBound,
    pub date_to: DateBound,
}

fn encode_bound(bound: &DateBound) -> String {
    match bound {
        DateBound::On(date) => date.format(ISO_DATE_FORMAT).to_string(),
        // A malformed endpoint resolves to nothing either way
        DateBound::Unset | DateBound::Malformed(_) => UNSET_DATE.to_string(),
    }
}

fn decode_bound(segment: &str, key: &str) -> Result<DateBound> {
    if segment == UNSET_DATE {
        return Ok(DateBound::Unset);
    }
    // Only the zero-padded form `encode` writes is accepted
    NaiveDate::parse_from_str(segment, ISO_DATE_FORMAT)
        .ok()
        .filter(|date| date.format(ISO_DATE_FORMAT).to_string() == segment)
        .map(DateBound::On)
        .ok_or_else(|| EngineError::MalformedKey(format!("bad date '{}' in '{}'", segment, key)))
}

impl DrilldownKey {
    pub fn new(target: DrilldownTarget, range: &DateRange) -> Self {
        let normalize = |bound: &DateBound| match bound {
            DateBound::On(date) => DateBound::On(*date),
            _ => DateBound::Unset,
        };
        DrilldownKey {
            target,
            date_from: normalize(&range.from),
            date_to: normalize(&range.to),
        }
    }

    pub fn range(&self) -> DateRange {
        DateRange {
            from: self.date_from.clone(),
            to: self.date_to.clone(),
        }
    }

    /// Route fragment for this key
    pub fn encode(&self) -> String {
        format!(
            "/{}/{}/{}/{}",
            self.target.route(),
            URL_SAFE_NO_PAD.encode(self.target.label().as_bytes()),
            encode_bound(&self.date_from),
            encode_bound(&self.date_to)
        )
    }

    /// Parse a route fragment produced by `encode`
    pub fn decode(key: &str) -> Result<Self> {
        let parts: Vec<&str> = key.split('/').collect();
        if parts.len() != 5 || !parts[0].is_empty() {
            return Err(EngineError::MalformedKey(format!(
                "expected /<kind>/<target>/<from>/<to>, got '{}'",
                key
            )));
        }

        let bytes = URL_SAFE_NO_PAD
            .decode(parts[2])
            .map_err(|e| EngineError::MalformedKey(format!("bad target in '{}': {}", key, e)))?;
        let label = String::from_utf8(bytes)
            .map_err(|_| EngineError::MalformedKey(format!("target is not UTF-8 in '{}'", key)))?;

        let target = match parts[1] {
            FEATURE_ROUTE => DrilldownTarget::Feature(label),
            SENTIMENT_ROUTE => DrilldownTarget::Sentiment(label),
            other => {
                return Err(EngineError::MalformedKey(format!(
                    "unknown drilldown kind '{}'",
                    other
                )))
            }
        };

        Ok(DrilldownKey {
            target,
            date_from: decode_bound(parts[3], key)?,
            date_to: decode_bound(parts[4], key)?,
        })
    }

    /// Rows behind this key
    ///
    /// With `DrilldownScope::FullContext` and a context state, explicit
    /// selections of the context are applied as well; `SelectAll` and
    /// unconstrained facets do not narrow.
    pub fn resolve<'a>(
        &self,
        dataset: &'a Dataset,
        scope: DrilldownScope,
        context: Option<&FilterState>,
    ) -> RowSubset<'a> {
        let range = self.range();
        if !range.is_valid() {
            return RowSubset::empty(dataset);
        }

        let subset = RowSubset::filter(dataset, |row| {
            let on_target = match &self.target {
                DrilldownTarget::Feature(label) => row.feature == *label,
                DrilldownTarget::Sentiment(label) => row.fact == *label,
            };
            on_target && range.contains(row.date)
        });

        match (scope, context) {
            (DrilldownScope::FullContext, Some(state)) => subset.refine(|row| {
                Dimension::CHAIN.iter().all(|dim| {
                    state
                        .get(*dim)
                        .explicit_values()
                        .map_or(true, |values| values.contains(dim.column().value(row)))
                })
            }),
            _ => subset,
        }
    }
}

/// Encode a click on `target` under `range`
pub fn encode(target: DrilldownTarget, range: &DateRange) -> String {
    DrilldownKey::new(target, range).encode()
}

/// Decode a route fragment
pub fn decode(key: &str) -> Result<DrilldownKey> {
    DrilldownKey::decode(key)
}
