//! Chart-ready aggregates over a resolved subset
//!
//! Three families:
//! - category counts, zero-filled over the column's full category domain
//! - sentiment stacks, percentage of each sentiment level per group
//! - model comparisons (price band and segment), zero-filled over the
//!   models comparable to an anchor model
//!
//! All functions are total: missing anchors or empty subsets give empty or
//! all-zero results.

use super::dataset::{Column, Dataset, Domain, Row, Sentiment};
use super::filter::RowSubset;
use serde::Serialize;
use std::collections::HashMap;

/// Default half-width of the price comparison band, in currency units
pub const DEFAULT_PRICE_BAND: f64 = 200_000.0;

/// Count for one category label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

/// Counts per category of one column, in category-domain order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub column: Column,
    pub entries: Vec<CategoryCount>,
}

impl CategoryCounts {
    fn empty(column: Column) -> Self {
        CategoryCounts {
            column,
            entries: Vec::new(),
        }
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.entries.iter().find(|e| e.label == label).map(|e| e.count)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Categories used to zero-fill counts of `column`
///
/// This is the column's domain, except for `fact` where the fixed
/// sentiment scale comes first and any non-scale labels follow in
/// first-seen order.
pub fn category_domain(dataset: &Dataset, column: Column) -> Vec<String> {
    let domain = dataset.domain(column);
    if column != Column::Fact {
        return domain.values().to_vec();
    }

    let mut labels: Vec<String> = Sentiment::SCALE.iter().map(|s| s.label().to_string()).collect();
    labels.extend(
        domain
            .values()
            .iter()
            .filter(|v| Sentiment::from_label(v).is_none())
            .cloned(),
    );
    labels
}

fn tally<'r, I>(rows: I, column: Column) -> HashMap<&'r str, usize>
where
    I: Iterator<Item = &'r Row>,
{
    let mut counts = HashMap::new();
    for row in rows {
        *counts.entry(column.value(row)).or_insert(0) += 1;
    }
    counts
}

fn zero_filled(column: Column, labels: &[String], counts: &HashMap<&str, usize>) -> CategoryCounts {
    CategoryCounts {
        column,
        entries: labels
            .iter()
            .map(|label| CategoryCount {
                label: label.clone(),
                count: counts.get(label.as_str()).copied().unwrap_or(0),
            })
            .collect(),
    }
}

/// Rows per category of `column`, zero-filled over the category domain
pub fn category_counts(subset: &RowSubset<'_>, column: Column) -> CategoryCounts {
    let labels = category_domain(subset.dataset(), column);
    let counts = tally(subset.iter(), column);
    zero_filled(column, &labels, &counts)
}

/// How sentiment shares are grouped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(tag = "group", content = "column", rename_all = "snake_case")]
pub enum SentimentGrouping {
    /// One group covering the whole subset
    Overall,
    /// One group per category of a column
    By(Column),
}

/// Share of one sentiment level within a group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentShare {
    pub level: Sentiment,
    /// Percentage of the group's rows, rounded to 2 decimal places
    pub percent: f64,
}

/// Stacked shares for one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentGroup {
    pub label: String,
    /// Rows in the group
    pub total: usize,
    /// One entry per scale level, most negative first
    pub shares: Vec<SentimentShare>,
}

impl SentimentGroup {
    pub fn percent(&self, level: Sentiment) -> f64 {
        self.shares
            .iter()
            .find(|s| s.level == level)
            .map(|s| s.percent)
            .unwrap_or(0.0)
    }
}

/// Sentiment distribution per group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentStack {
    pub grouping: SentimentGrouping,
    pub groups: Vec<SentimentGroup>,
}

/// Label of the single group produced by `SentimentGrouping::Overall`
pub const OVERALL_GROUP: &str = "All";

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn sentiment_group<'r>(label: String, rows: impl Iterator<Item = &'r Row>) -> SentimentGroup {
    let mut total = 0usize;
    let mut counts: HashMap<Sentiment, usize> = HashMap::new();
    for row in rows {
        total += 1;
        if let Some(level) = Sentiment::from_label(&row.fact) {
            *counts.entry(level).or_insert(0) += 1;
        }
    }

    let shares = Sentiment::SCALE
        .iter()
        .map(|level| {
            let n = counts.get(level).copied().unwrap_or(0);
            let percent = if total == 0 {
                0.0
            } else {
                round2(n as f64 / total as f64 * 100.0)
            };
            SentimentShare {
                level: *level,
                percent,
            }
        })
        .collect();

    SentimentGroup {
        label,
        total,
        shares,
    }
}

/// Sentiment percentages per group; rounding drift is not renormalized
pub fn sentiment_stack(subset: &RowSubset<'_>, grouping: SentimentGrouping) -> SentimentStack {
    let groups = match grouping {
        SentimentGrouping::Overall => {
            vec![sentiment_group(OVERALL_GROUP.to_string(), subset.iter())]
        }
        SentimentGrouping::By(column) => category_domain(subset.dataset(), column)
            .into_iter()
            .map(|label| {
                let rows: Vec<&Row> = subset
                    .iter()
                    .filter(|row| column.value(row) == label)
                    .collect();
                sentiment_group(label, rows.into_iter())
            })
            .collect(),
    };
    SentimentStack { grouping, groups }
}

/// Mentions per model for every model priced within `band` of the anchor
///
/// The anchor price is the price of the anchor model's first row. Only
/// subset rows whose own price is inside the band are counted. Empty when
/// the anchor is missing, unknown, or has no parsable price.
pub fn price_band_compare(
    subset: &RowSubset<'_>,
    anchor_model: Option<&str>,
    band: f64,
) -> CategoryCounts {
    let dataset = subset.dataset();
    let anchor_price = anchor_model
        .and_then(|model| dataset.first_row_of_model(model))
        .and_then(|row| row.price);

    let Some(anchor_price) = anchor_price else {
        return CategoryCounts::empty(Column::Model);
    };

    let (lo, hi) = (anchor_price - band, anchor_price + band);
    let in_band = |row: &Row| row.price.is_some_and(|p| lo <= p && p <= hi);

    let models = Domain::from_values(
        dataset
            .rows()
            .iter()
            .filter(|row| in_band(*row))
            .map(|row| row.model.as_str()),
    );
    let counts = tally(subset.iter().filter(|row| in_band(*row)), Column::Model);
    zero_filled(Column::Model, models.values(), &counts)
}

/// Mentions per model for every model in the anchor model's segment
///
/// The anchor segment is the segment of the anchor model's first row.
/// Empty when the anchor is missing, unknown, or has no segment.
pub fn segment_compare(subset: &RowSubset<'_>, anchor_model: Option<&str>) -> CategoryCounts {
    let dataset = subset.dataset();
    let segment = anchor_model
        .and_then(|model| dataset.first_row_of_model(model))
        .map(|row| row.segment.as_str())
        .filter(|s| !s.is_empty());

    let Some(segment) = segment else {
        return CategoryCounts::empty(Column::Model);
    };

    let models = Domain::from_values(
        dataset
            .rows()
            .iter()
            .filter(|row| row.segment == segment)
            .map(|row| row.model.as_str()),
    );
    let counts = tally(
        subset.iter().filter(|row| row.segment == segment),
        Column::Model,
    );
    zero_filled(Column::Model, models.values(), &counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::dataset::fixtures::{row, sample};
    use crate::engine::dates::DateRange;
    use crate::engine::facets::{Dimension, FacetSelection, FilterState};
    use crate::engine::filter::resolve;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn whole_year() -> DateRange {
        DateRange::new(ymd(2023, 1, 1), ymd(2023, 12, 31))
    }

    #[test]
    fn test_three_row_scenario() {
        let ds = Dataset::new(vec![
            row(1, "Renault", "Kiger", "Engine", "Positive", "India", "Web", (2023, 1, 1), None, "SUV"),
            row(2, "Renault", "Kiger", "Engine", "Negative", "India", "Web", (2023, 1, 2), None, "SUV"),
            row(3, "Kia", "Sonet", "Engine", "Positive", "India", "Web", (2023, 1, 3), None, "SUV"),
        ]);
        let state = FilterState::select_all(DateRange::parse(Some("01-01-2023"), Some("02-01-2023")));
        let subset = resolve(&ds, &state);
        assert_eq!(subset.indices(), vec![1, 2]);

        let counts = category_counts(&subset, Column::Fact);
        assert_eq!(
            counts.labels(),
            vec!["Very Negative", "Negative", "Neutral", "Positive", "Very Positive"]
        );
        assert_eq!(counts.get("Positive"), Some(1));
        assert_eq!(counts.get("Negative"), Some(1));
        assert_eq!(counts.get("Neutral"), Some(0));
        assert_eq!(counts.get("Very Positive"), Some(0));
        assert_eq!(counts.get("Very Negative"), Some(0));
    }

    #[test]
    fn test_category_counts_zero_fill_in_domain_order() {
        let ds = sample();
        let state = FilterState::select_all(whole_year())
            .with(Dimension::Brand, FacetSelection::explicit(["Kia"]));
        let counts = category_counts(&resolve(&ds, &state), Column::Feature);
        assert_eq!(counts.labels(), vec!["Engine", "Brake", "Seats"]);
        assert_eq!(
            counts.entries.iter().map(|e| e.count).collect::<Vec<_>>(),
            vec![1, 1, 0]
        );
        assert_eq!(counts.total(), 2);
    }

    #[test]
    fn test_category_counts_empty_subset() {
        let ds = sample();
        let counts = category_counts(&RowSubset::empty(&ds), Column::Model);
        assert_eq!(counts.entries.len(), 4);
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn test_non_scale_fact_labels_follow_scale() {
        let ds = Dataset::new(vec![
            row(1, "B", "M", "F", "Mixed", "C", "S", (2023, 1, 1), None, ""),
            row(2, "B", "M", "F", "Positive", "C", "S", (2023, 1, 1), None, ""),
        ]);
        let domain = category_domain(&ds, Column::Fact);
        assert_eq!(domain.len(), 6);
        assert_eq!(domain[5], "Mixed");
    }

    #[test]
    fn test_sentiment_stack_overall() {
        let ds = sample();
        let stack = sentiment_stack(&RowSubset::all(&ds), SentimentGrouping::Overall);
        assert_eq!(stack.groups.len(), 1);
        let group = &stack.groups[0];
        assert_eq!(group.label, OVERALL_GROUP);
        assert_eq!(group.total, 6);
        assert_eq!(group.percent(Sentiment::Positive), 33.33);
        assert_eq!(group.percent(Sentiment::Negative), 33.33);
        assert_eq!(group.percent(Sentiment::Neutral), 16.67);
        assert_eq!(group.percent(Sentiment::VeryPositive), 16.67);
        assert_eq!(group.percent(Sentiment::VeryNegative), 0.0);
    }

    #[test]
    fn test_sentiment_stack_by_model() {
        let ds = sample();
        let stack = sentiment_stack(&RowSubset::all(&ds), SentimentGrouping::By(Column::Model));
        let labels: Vec<&str> = stack.groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["Magnite", "Sonet", "Kiger", "Sunny"]);

        let sonet = &stack.groups[1];
        assert_eq!(sonet.total, 2);
        assert_eq!(sonet.percent(Sentiment::VeryPositive), 50.0);
        assert_eq!(sonet.percent(Sentiment::Positive), 50.0);
    }

    #[test]
    fn test_sentiment_stack_empty_is_zero() {
        let ds = sample();
        let stack = sentiment_stack(&RowSubset::empty(&ds), SentimentGrouping::By(Column::Brand));
        assert_eq!(stack.groups.len(), 3);
        for group in &stack.groups {
            assert_eq!(group.total, 0);
            assert!(group.shares.iter().all(|s| s.percent == 0.0));
        }
    }

    #[test]
    fn test_price_band_compare() {
        let ds = sample();
        // Magnite at 600k: band [400k, 800k] → Magnite, Sonet, Kiger (not Sunny at 900k)
        let subset = resolve(&ds, &FilterState::select_all(whole_year()));
        let result = price_band_compare(&subset, Some("Magnite"), DEFAULT_PRICE_BAND);
        assert_eq!(result.labels(), vec!["Magnite", "Sonet", "Kiger"]);
        assert_eq!(result.get("Magnite"), Some(2));
        assert_eq!(result.get("Sonet"), Some(2));
        assert_eq!(result.get("Kiger"), Some(1));
        assert_eq!(result.get("Sunny"), None);
    }

    #[test]
    fn test_price_band_zero_fill() {
        let ds = sample();
        let subset = crate::engine::filter::resolve_comparison(&ds, "Seats", "Neutral", &whole_year());
        let result = price_band_compare(&subset, Some("Sunny"), DEFAULT_PRICE_BAND);
        // Sunny at 900k: band [700k, 1.1M] → Sonet, Sunny
        assert_eq!(result.labels(), vec!["Sonet", "Sunny"]);
        assert_eq!(result.total(), 0);
    }

    #[test]
    fn test_price_band_fail_soft() {
        let ds = sample();
        let subset = RowSubset::all(&ds);
        assert!(price_band_compare(&subset, None, DEFAULT_PRICE_BAND).is_empty());
        assert!(price_band_compare(&subset, Some("Tiago"), DEFAULT_PRICE_BAND).is_empty());

        let no_price = Dataset::new(vec![row(1, "B", "M", "F", "Positive", "C", "S", (2023, 1, 1), None, "")]);
        let subset = RowSubset::all(&no_price);
        assert!(price_band_compare(&subset, Some("M"), DEFAULT_PRICE_BAND).is_empty());
    }

    #[test]
    fn test_segment_compare() {
        let ds = sample();
        let subset = crate::engine::filter::resolve_comparison(&ds, "Engine", "Positive", &whole_year());
        let result = segment_compare(&subset, Some("Sonet"));
        assert_eq!(result.labels(), vec!["Magnite", "Sonet", "Kiger"]);
        assert_eq!(result.get("Magnite"), Some(1));
        assert_eq!(result.get("Sonet"), Some(0));
        assert_eq!(result.get("Kiger"), Some(0));

        assert!(segment_compare(&subset, None).is_empty());
    }
}
