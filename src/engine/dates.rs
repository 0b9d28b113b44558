//! Date normalization and inclusive date ranges
//!
//! Dataset dates arrive as `DD-MM-YYYY` strings and are normalized to
//! `chrono::NaiveDate` at load. All comparisons use the normalized value,
//! never the original string.
//!
//! Filter endpoints come from the UI and may be:
//! - `YYYY-MM-DD` (date picker)
//! - `DD-MM-YYYY` (free text input)
//! - empty / missing → `Unset`
//! - anything else → `Malformed` (resolves to the empty subset)

use chrono::NaiveDate;
use serde::Serialize;

/// Default input format of the dataset's date column
pub const DATASET_DATE_FORMAT: &str = "%d-%m-%Y";

/// Canonical format used for drilldown keys and serialized rows
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a dataset date with the given `chrono` format string
pub fn parse_dataset_date(value: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), format).ok()
}

/// Parse a filter endpoint typed or picked in the UI
///
/// ISO is tried first because the picker always emits it.
pub fn parse_input_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, DATASET_DATE_FORMAT))
        .ok()
}

/// One endpoint of a date range
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DateBound {
    /// No date chosen yet
    Unset,
    /// A concrete calendar date
    On(NaiveDate),
    /// Input that could not be parsed (kept for diagnostics)
    Malformed(String),
}

impl DateBound {
    /// Build a bound from optional raw UI input
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => DateBound::Unset,
            Some(s) => match parse_input_date(s) {
                Some(date) => DateBound::On(date),
                None => DateBound::Malformed(s.to_string()),
            },
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            DateBound::On(date) => Some(*date),
            _ => None,
        }
    }
}

impl From<NaiveDate> for DateBound {
    fn from(date: NaiveDate) -> Self {
        DateBound::On(date)
    }
}

/// Inclusive date range `[from, to]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub from: DateBound,
    pub to: DateBound,
}

impl DateRange {
    pub fn new(from: impl Into<DateBound>, to: impl Into<DateBound>) -> Self {
        DateRange {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Range with both endpoints unset
    pub fn unset() -> Self {
        DateRange {
            from: DateBound::Unset,
            to: DateBound::Unset,
        }
    }

    /// Build a range from raw UI strings
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Self {
        DateRange {
            from: DateBound::parse(from),
            to: DateBound::parse(to),
        }
    }

    /// Both endpoints as dates, if the range is usable
    ///
    /// Returns `None` when an endpoint is unset or malformed, or when
    /// `from > to`.
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let from = self.from.date()?;
        let to = self.to.date()?;
        if from > to {
            return None;
        }
        Some((from, to))
    }

    pub fn is_valid(&self) -> bool {
        self.bounds().is_some()
    }

    /// Inclusive membership test; rows without a date never match
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        match (self.bounds(), date) {
            (Some((from, to)), Some(d)) => from <= d && d <= to,
            _ => false,
        }
    }
}
