//! Immutable review table and its per-column domains
//!
//! The dataset is loaded once per process and never mutated afterwards.
//! Domains (distinct values per column, first-seen order) are derived
//! lazily behind a single `OnceCell` so concurrent readers share one
//! computation.

use chrono::NaiveDate;
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Categorical columns of a review row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Brand,
    Model,
    Feature,
    Fact,
    Country,
    Source,
    Segment,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::Brand,
        Column::Model,
        Column::Feature,
        Column::Fact,
        Column::Country,
        Column::Source,
        Column::Segment,
    ];

    fn ordinal(self) -> usize {
        match self {
            Column::Brand => 0,
            Column::Model => 1,
            Column::Feature => 2,
            Column::Fact => 3,
            Column::Country => 4,
            Column::Source => 5,
            Column::Segment => 6,
        }
    }

    /// Name used in frames and logs
    pub fn name(self) -> &'static str {
        match self {
            Column::Brand => "brand",
            Column::Model => "model",
            Column::Feature => "feature",
            Column::Fact => "fact",
            Column::Country => "country",
            Column::Source => "source",
            Column::Segment => "segment",
        }
    }

    /// Read this column from a row
    pub fn value(self, row: &Row) -> &str {
        match self {
            Column::Brand => &row.brand,
            Column::Model => &row.model,
            Column::Feature => &row.feature,
            Column::Fact => &row.fact,
            Column::Country => &row.country,
            Column::Source => &row.source,
            Column::Segment => &row.segment,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The fixed five-level sentiment scale of the `fact` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Sentiment {
    #[serde(rename = "Very Negative")]
    VeryNegative,
    #[serde(rename = "Negative")]
    Negative,
    #[serde(rename = "Neutral")]
    Neutral,
    #[serde(rename = "Positive")]
    Positive,
    #[serde(rename = "Very Positive")]
    VeryPositive,
}

impl Sentiment {
    /// Scale order, most negative first
    pub const SCALE: [Sentiment; 5] = [
        Sentiment::VeryNegative,
        Sentiment::Negative,
        Sentiment::Neutral,
        Sentiment::Positive,
        Sentiment::VeryPositive,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Sentiment::VeryNegative => "Very Negative",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
            Sentiment::Positive => "Positive",
            Sentiment::VeryPositive => "Very Positive",
        }
    }

    /// Exact, case-sensitive label lookup
    pub fn from_label(label: &str) -> Option<Self> {
        Self::SCALE.into_iter().find(|s| s.label() == label)
    }
}

/// One review mention
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    /// Stable 1-based position in the input
    pub index: usize,
    pub brand: String,
    pub model: String,
    pub feature: String,
    pub fact: String,
    pub country: String,
    pub source: String,
    /// Normalized date; `None` when the input could not be parsed
    pub date: Option<NaiveDate>,
    /// Normalized price; `None` when the input could not be parsed
    pub price: Option<f64>,
    pub segment: String,
    pub feedback: String,
}

/// Distinct values of one column in first-seen order
#[derive(Debug, Clone, Default)]
pub struct Domain {
    values: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Domain {
    /// Build from values in order, keeping the first occurrence of each
    pub fn from_values<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut domain = Domain::default();
        for value in values {
            if !domain.positions.contains_key(value) {
                domain.positions.insert(value.to_string(), domain.values.len());
                domain.values.push(value.to_string());
            }
        }
        domain
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn contains(&self, value: &str) -> bool {
        self.positions.contains_key(value)
    }

    pub fn position(&self, value: &str) -> Option<usize> {
        self.positions.get(value).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Domains of every categorical column, indexed by `Column`
#[derive(Debug)]
struct DomainCache {
    domains: Vec<Domain>,
}

impl DomainCache {
    fn compute(rows: &[Row]) -> Self {
        let domains = Column::ALL
            .iter()
            .map(|col| Domain::from_values(rows.iter().map(|row| col.value(row))))
            .collect();
        DomainCache { domains }
    }
}

/// Immutable, normalized review table
#[derive(Debug)]
pub struct Dataset {
    rows: Vec<Row>,
    domains: OnceCell<DomainCache>,
}

impl Dataset {
    pub fn new(rows: Vec<Row>) -> Self {
        Dataset {
            rows,
            domains: OnceCell::new(),
        }
    }

    /// Force domain computation now instead of on first read
    pub fn warm(&self) -> &Self {
        let _ = self.domain_cache();
        self
    }

    fn domain_cache(&self) -> &DomainCache {
        self.domains.get_or_init(|| {
            let cache = DomainCache::compute(&self.rows);
            tracing::debug!(
                rows = self.rows.len(),
                "computed column domains ({} brands, {} models, {} features)",
                cache.domains[Column::Brand.ordinal()].len(),
                cache.domains[Column::Model.ordinal()].len(),
                cache.domains[Column::Feature.ordinal()].len(),
            );
            cache
        })
    }

    /// Distinct values of `column`, first-seen order
    pub fn domain(&self, column: Column) -> &Domain {
        &self.domain_cache().domains[column.ordinal()]
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Row at a 0-based position
    pub fn row(&self, position: usize) -> Option<&Row> {
        self.rows.get(position)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Earliest and latest normalized date, if any row has one
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.rows.iter().filter_map(|row| row.date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    /// First row of a model in dataset order
    pub fn first_row_of_model(&self, model: &str) -> Option<&Row> {
        self.rows.iter().find(|row| row.model == model)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::sample;
    use super::*;

    #[test]
    fn test_domain_first_seen_order() {
        let ds = sample();
        assert_eq!(ds.domain(Column::Brand).values(), &["Nissan", "Kia", "Renault"]);
        assert_eq!(
            ds.domain(Column::Model).values(),
            &["Magnite", "Sonet", "Kiger", "Sunny"]
        );
        assert_eq!(ds.domain(Column::Segment).values(), &["SUV", "Sedan"]);
    }

    #[test]
    fn test_domain_only_present_values() {
        let ds = sample();
        let facts = ds.domain(Column::Fact);
        assert!(facts.contains("Neutral"));
        assert!(!facts.contains("Very Negative"));
        assert_eq!(facts.position("Negative"), Some(1));
    }

    #[test]
    fn test_domain_cache_shared_across_threads() {
        let ds = sample();
        let addrs: Vec<usize> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| ds.domain(Column::Model) as *const Domain as usize))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(addrs.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_date_bounds() {
        let ds = sample();
        assert_eq!(
            ds.date_bounds(),
            Some((
                NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2023, 3, 15).unwrap()
            ))
        );
        assert_eq!(Dataset::new(Vec::new()).date_bounds(), None);
    }

    #[test]
    fn test_sentiment_labels_exact() {
        assert_eq!(Sentiment::from_label("Very Positive"), Some(Sentiment::VeryPositive));
        assert_eq!(Sentiment::from_label("very positive"), None);
        assert_eq!(Sentiment::SCALE[0].label(), "Very Negative");
    }
}
