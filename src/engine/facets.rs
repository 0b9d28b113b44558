//! Cascading facet options
//!
//! Filterable dimensions form a fixed chain:
//!
//! ```text
//! brand → model → fact → country → source
//! ```
//!
//! The options offered for a dimension are the distinct values of its
//! column among rows matching the explicit selections of the dimensions it
//! depends on. Downstream selections never narrow upstream options.
//!
//! | dimension | depends on              |
//! |-----------|-------------------------|
//! | brand     | -                       |
//! | model     | brand                   |
//! | fact      | model                   |
//! | country   | model, fact             |
//! | source    | model, fact, country    |
//!
//! If any dependency is unconstrained or `SelectAll`, the full domain is
//! offered.

use super::dataset::{Column, Dataset, Domain};
use super::dates::DateRange;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Selection state of one facet
///
/// `SelectAll` is a tagged variant, never a magic label, so a real
/// category named "All" cannot collide with it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "values", rename_all = "snake_case")]
pub enum FacetSelection {
    /// Nothing chosen yet
    #[default]
    Unconstrained,
    /// Every value of the live domain
    SelectAll,
    /// A specific set of values
    Explicit(BTreeSet<String>),
}

impl FacetSelection {
    pub fn explicit<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FacetSelection::Explicit(values.into_iter().map(Into::into).collect())
    }

    /// True for `SelectAll` and non-empty `Explicit`
    ///
    /// A cleared multi-select (`Explicit` with no values) counts as
    /// unconstrained.
    pub fn is_constrained(&self) -> bool {
        match self {
            FacetSelection::Unconstrained => false,
            FacetSelection::SelectAll => true,
            FacetSelection::Explicit(values) => !values.is_empty(),
        }
    }

    /// The explicit values, when this selection narrows anything
    pub fn explicit_values(&self) -> Option<&BTreeSet<String>> {
        match self {
            FacetSelection::Explicit(values) if !values.is_empty() => Some(values),
            _ => None,
        }
    }

    /// Membership test with `SelectAll` expanded against the live domain
    pub fn admits(&self, value: &str, domain: &Domain) -> bool {
        match self {
            FacetSelection::Unconstrained => false,
            FacetSelection::SelectAll => domain.contains(value),
            FacetSelection::Explicit(values) => values.contains(value),
        }
    }
}

/// A filterable dimension of the facet chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Brand,
    Model,
    Fact,
    Country,
    Source,
}

impl Dimension {
    /// Chain order, upstream first
    pub const CHAIN: [Dimension; 5] = [
        Dimension::Brand,
        Dimension::Model,
        Dimension::Fact,
        Dimension::Country,
        Dimension::Source,
    ];

    fn ordinal(self) -> usize {
        match self {
            Dimension::Brand => 0,
            Dimension::Model => 1,
            Dimension::Fact => 2,
            Dimension::Country => 3,
            Dimension::Source => 4,
        }
    }

    pub fn column(self) -> Column {
        match self {
            Dimension::Brand => Column::Brand,
            Dimension::Model => Column::Model,
            Dimension::Fact => Column::Fact,
            Dimension::Country => Column::Country,
            Dimension::Source => Column::Source,
        }
    }

    /// Declared dependency set (always strictly upstream)
    pub fn dependencies(self) -> &'static [Dimension] {
        match self {
            Dimension::Brand => &[],
            Dimension::Model => &[Dimension::Brand],
            Dimension::Fact => &[Dimension::Model],
            Dimension::Country => &[Dimension::Model, Dimension::Fact],
            Dimension::Source => &[Dimension::Model, Dimension::Fact, Dimension::Country],
        }
    }

    fn plural(self) -> &'static str {
        match self {
            Dimension::Brand => "Brands",
            Dimension::Model => "Models",
            Dimension::Fact => "Facts",
            Dimension::Country => "Countries",
            Dimension::Source => "Sources",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column().name())
    }
}

/// Complete filter input: one selection per dimension plus a date range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterState {
    selections: [FacetSelection; 5],
    pub range: DateRange,
}

impl Default for FilterState {
    fn default() -> Self {
        FilterState {
            selections: Default::default(),
            range: DateRange::unset(),
        }
    }
}

impl FilterState {
    pub fn new(range: DateRange) -> Self {
        FilterState {
            selections: Default::default(),
            range,
        }
    }

    /// Every dimension set to `SelectAll`
    pub fn select_all(range: DateRange) -> Self {
        FilterState {
            selections: std::array::from_fn(|_| FacetSelection::SelectAll),
            range,
        }
    }

    pub fn get(&self, dimension: Dimension) -> &FacetSelection {
        &self.selections[dimension.ordinal()]
    }

    pub fn set(&mut self, dimension: Dimension, selection: FacetSelection) {
        self.selections[dimension.ordinal()] = selection;
    }

    /// Builder-style `set`
    pub fn with(mut self, dimension: Dimension, selection: FacetSelection) -> Self {
        self.set(dimension, selection);
        self
    }

    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }

    /// Every facet constrained and the date range usable
    pub fn is_resolvable(&self) -> bool {
        self.selections.iter().all(FacetSelection::is_constrained) && self.range.is_valid()
    }
}

/// Style of the synthetic "select everything" option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AllLabel {
    /// `"All"` on every dimension
    #[default]
    All,
    /// `"Select All Brands"`, `"Select All Models"`, ...
    SelectAllPerDimension,
}

impl AllLabel {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "select-all" => Self::SelectAllPerDimension,
            _ => Self::All,
        }
    }

    pub fn label(self, dimension: Dimension) -> String {
        match self {
            AllLabel::All => "All".to_string(),
            AllLabel::SelectAllPerDimension => format!("Select All {}", dimension.plural()),
        }
    }
}

/// Value carried by a dropdown option
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum OptionValue {
    SelectAll,
    Value(String),
}

/// One dropdown entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetOption {
    pub label: String,
    pub value: OptionValue,
}

/// Computes legal options for each dimension of the chain
#[derive(Debug, Clone, Copy)]
pub struct FacetGraph<'a> {
    dataset: &'a Dataset,
    all_label: AllLabel,
}

impl<'a> FacetGraph<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        FacetGraph {
            dataset,
            all_label: AllLabel::default(),
        }
    }

    pub fn with_all_label(mut self, all_label: AllLabel) -> Self {
        self.all_label = all_label;
        self
    }

    /// Distinct values selectable for `dimension` given upstream state
    ///
    /// Only the dimension's declared dependencies are consulted; the
    /// result is in first-seen dataset order.
    pub fn values(&self, dimension: Dimension, state: &FilterState) -> Vec<String> {
        let column = dimension.column();

        // Any dependency without an explicit set → full domain
        let filters: Option<Vec<(Column, &BTreeSet<String>)>> = dimension
            .dependencies()
            .iter()
            .map(|dep| state.get(*dep).explicit_values().map(|set| (dep.column(), set)))
            .collect();

        match filters {
            Some(filters) if !filters.is_empty() => {
                let matching = self.dataset.rows().iter().filter(|row| {
                    filters
                        .iter()
                        .all(|(col, set)| set.contains(col.value(row)))
                });
                Domain::from_values(matching.map(|row| column.value(row)))
                    .values()
                    .to_vec()
            }
            _ => self.dataset.domain(column).values().to_vec(),
        }
    }

    /// Dropdown options for `dimension`, with the synthetic `All` first
    ///
    /// Empty when no value is selectable (no synthetic option either).
    pub fn options(&self, dimension: Dimension, state: &FilterState) -> Vec<FacetOption> {
        let values = self.values(dimension, state);
        if values.is_empty() {
            return Vec::new();
        }

        let mut options = Vec::with_capacity(values.len() + 1);
        options.push(FacetOption {
            label: self.all_label.label(dimension),
            value: OptionValue::SelectAll,
        });
        options.extend(values.into_iter().map(|v| FacetOption {
            label: v.clone(),
            value: OptionValue::Value(v),
        }));
        options
    }

    /// Options for the whole chain, in chain order
    pub fn options_for_all(&self, state: &FilterState) -> Vec<(Dimension, Vec<FacetOption>)> {
        Dimension::CHAIN
            .iter()
            .map(|dim| (*dim, self.options(*dim, state)))
            .collect()
    }
}
