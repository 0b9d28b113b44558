//! Filter resolution
//!
//! Turns a `FilterState` into the ordered subset of matching rows. The
//! resolver is fail-soft: an incomplete state, a malformed or inverted
//! date range, or no matches all yield the empty subset, never an error.

use super::dataset::{Column, Dataset, Row};
use super::dates::DateRange;
use super::facets::{Dimension, FacetSelection, FilterState};

/// Rows of a dataset selected by some predicate, in dataset order
#[derive(Debug, Clone)]
pub struct RowSubset<'a> {
    dataset: &'a Dataset,
    positions: Vec<usize>,
}

impl<'a> RowSubset<'a> {
    pub fn empty(dataset: &'a Dataset) -> Self {
        RowSubset {
            dataset,
            positions: Vec::new(),
        }
    }

    /// Every row of the dataset
    pub fn all(dataset: &'a Dataset) -> Self {
        RowSubset {
            dataset,
            positions: (0..dataset.len()).collect(),
        }
    }

    /// Rows satisfying `predicate`, scanning in dataset order
    pub fn filter<F>(dataset: &'a Dataset, mut predicate: F) -> Self
    where
        F: FnMut(&Row) -> bool,
    {
        let positions = dataset
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| predicate(row))
            .map(|(pos, _)| pos)
            .collect();
        RowSubset { dataset, positions }
    }

    /// Narrow this subset further, keeping order
    pub fn refine<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&Row) -> bool,
    {
        let positions = self
            .positions
            .iter()
            .copied()
            .filter(|pos| predicate(&self.dataset.rows()[*pos]))
            .collect();
        RowSubset {
            dataset: self.dataset,
            positions,
        }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Row> + '_ {
        let rows = self.dataset.rows();
        self.positions.iter().map(move |pos| &rows[*pos])
    }

    /// Rows at subset positions `[start, end)`
    pub fn slice(&self, start: usize, end: usize) -> Vec<&'a Row> {
        let rows = self.dataset.rows();
        let end = end.min(self.positions.len());
        if start >= end {
            return Vec::new();
        }
        self.positions[start..end].iter().map(|pos| &rows[*pos]).collect()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// 1-based row indices, in order
    pub fn indices(&self) -> Vec<usize> {
        self.iter().map(|row| row.index).collect()
    }

    /// Whether a row (by 1-based index) is in the subset
    pub fn contains(&self, index: usize) -> bool {
        index >= 1 && self.positions.binary_search(&(index - 1)).is_ok()
    }

    pub fn is_subset_of(&self, other: &RowSubset<'_>) -> bool {
        self.positions
            .iter()
            .all(|pos| other.positions.binary_search(pos).is_ok())
    }
}

/// Resolve a filter state against the dataset
///
/// Rows must satisfy all five facet memberships and the inclusive date
/// range. `SelectAll` is expanded lazily against the dataset's live domain.
pub fn resolve<'a>(dataset: &'a Dataset, state: &FilterState) -> RowSubset<'a> {
    if !state.is_resolvable() {
        tracing::debug!("filter state not resolvable, returning empty subset");
        return RowSubset::empty(dataset);
    }

    let memberships: Vec<(Column, &FacetSelection)> = Dimension::CHAIN
        .iter()
        .map(|dim| (dim.column(), state.get(*dim)))
        .collect();

    let subset = RowSubset::filter(dataset, |row| {
        memberships
            .iter()
            .all(|(col, sel)| sel.admits(col.value(row), dataset.domain(*col)))
            && state.range.contains(row.date)
    });

    tracing::debug!("resolved {} of {} rows", subset.len(), dataset.len());
    subset
}

/// Rows used by the segment/price comparison charts
///
/// Matches `feature == feature && fact == fact` within the inclusive date
/// range; an unusable range yields the empty subset.
pub fn resolve_comparison<'a>(
    dataset: &'a Dataset,
    feature: &str,
    fact: &str,
    range: &DateRange,
) -> RowSubset<'a> {
    if !range.is_valid() {
        return RowSubset::empty(dataset);
    }
    RowSubset::filter(dataset, |row| {
        row.feature == feature && row.fact == fact && range.contains(row.date)
    })
}
