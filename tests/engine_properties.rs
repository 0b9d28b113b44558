//! Property tests for the filter engine

use chrono::{Duration, NaiveDate};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use review_facet_engine::engine::aggregate::{category_counts, category_domain};
use review_facet_engine::engine::drilldown::{decode, DrilldownKey, DrilldownTarget};
use review_facet_engine::engine::loader::{load_dataset, CsvSource, LoadOptions, TextEncoding};
use review_facet_engine::engine::pages::page;
use review_facet_engine::engine::{
    resolve, Column, DateBound, DateRange, Dataset, Dimension, FacetGraph, FacetSelection,
    FilterState, Row,
};

const BRANDS: [&str; 3] = ["Nissan", "Kia", "Renault"];
const FEATURES: [&str; 4] = ["Engine", "Brake", "Seats", "Steering"];
const FACTS: [&str; 6] = [
    "Very Negative",
    "Negative",
    "Neutral",
    "Positive",
    "Very Positive",
    "Mixed",
];
const COUNTRIES: [&str; 2] = ["India", "Nepal"];
const SOURCES: [&str; 3] = ["Web", "Forum", "Dealer"];

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
}

/// (brand, model suffix, feature, fact, country, source, day offset or undated)
type RowSeed = (usize, usize, usize, usize, usize, usize, Option<i64>);

fn row_seed() -> impl Strategy<Value = RowSeed> {
    (
        0..BRANDS.len(),
        0..3usize,
        0..FEATURES.len(),
        0..FACTS.len(),
        0..COUNTRIES.len(),
        0..SOURCES.len(),
        prop::option::weighted(0.9, 0..90i64),
    )
}

fn build(seeds: &[RowSeed]) -> Dataset {
    let rows = seeds
        .iter()
        .enumerate()
        .map(|(i, (b, m, f, s, c, src, day))| Row {
            index: i + 1,
            brand: BRANDS[*b].to_string(),
            model: format!("{}-{}", BRANDS[*b], m),
            feature: FEATURES[*f].to_string(),
            fact: FACTS[*s].to_string(),
            country: COUNTRIES[*c].to_string(),
            source: SOURCES[*src].to_string(),
            date: day.map(|d| epoch() + Duration::days(d)),
            price: Some(500_000.0 + (*m as f64) * 150_000.0),
            segment: if *m == 0 { "SUV" } else { "Sedan" }.to_string(),
            feedback: format!("feedback {}", i + 1),
        })
        .collect();
    let dataset = Dataset::new(rows);
    dataset.warm();
    dataset
}

fn dataset_strategy() -> impl Strategy<Value = Dataset> {
    prop::collection::vec(row_seed(), 0..40).prop_map(|seeds| build(&seeds))
}

fn full_year() -> DateRange {
    DateRange::new(epoch(), epoch() + Duration::days(364))
}

/// Arbitrary explicit selection drawn from the dataset's domain
fn subset_of_domain(dataset: &Dataset, column: Column, mask: u64) -> FacetSelection {
    FacetSelection::explicit(
        dataset
            .domain(column)
            .values()
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << (i % 64)) != 0)
            .map(|(_, v)| v.clone()),
    )
}

fn selection_strategy() -> impl Strategy<Value = FacetSelection> {
    prop_oneof![
        Just(FacetSelection::Unconstrained),
        Just(FacetSelection::SelectAll),
        prop::collection::btree_set("[A-Za-z -]{0,8}", 0..3).prop_map(FacetSelection::Explicit),
        Just(FacetSelection::explicit(["Nissan", "Kia-1", "Engine", "Positive", "India", "Web"])),
    ]
}

fn date_text_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        (0..400i64).prop_map(|d| Some((epoch() + Duration::days(d)).format("%Y-%m-%d").to_string())),
        (0..400i64).prop_map(|d| Some((epoch() + Duration::days(d)).format("%d-%m-%Y").to_string())),
        "[0-9a-z/-]{0,12}".prop_map(Some),
    ]
}

proptest! {
    #[test]
    fn prop_counts_are_zero_filled(dataset in dataset_strategy(), mask in any::<u64>()) {
        let state = FilterState::select_all(full_year())
            .with(Dimension::Brand, subset_of_domain(&dataset, Column::Brand, mask));
        let subset = resolve(&dataset, &state);

        for column in Column::ALL {
            let counts = category_counts(&subset, column);
            let domain = category_domain(&dataset, column);
            let labels: Vec<String> = counts.labels().iter().map(|l| l.to_string()).collect();
            prop_assert_eq!(&labels, &domain);
            prop_assert_eq!(counts.total(), subset.len());
            if column != Column::Fact {
                prop_assert_eq!(&domain, &dataset.domain(column).values().to_vec());
            }
        }
    }

    #[test]
    fn prop_select_all_upstream_is_unconstrained_upstream(
        dataset in dataset_strategy(),
        mask in any::<u64>(),
    ) {
        let graph = FacetGraph::new(&dataset);
        for dimension in Dimension::CHAIN {
            let mut with_all = FilterState::select_all(full_year());
            let mut with_nothing = FilterState::new(full_year());
            // The dimension's own selection must not matter either
            let own = subset_of_domain(&dataset, dimension.column(), mask);
            with_all.set(dimension, own.clone());
            with_nothing.set(dimension, own);
            prop_assert_eq!(
                graph.options(dimension, &with_all),
                graph.options(dimension, &with_nothing)
            );
        }
    }

    #[test]
    fn prop_narrowing_is_monotonic(
        dataset in dataset_strategy(),
        draws in prop::collection::vec((any::<bool>(), any::<u64>(), any::<u64>()), 5),
    ) {
        // Every dimension narrows at once: SelectAll to any explicit subset,
        // or an explicit set to a subset of itself
        let mut wide = FilterState::select_all(full_year());
        let mut narrow = FilterState::select_all(full_year());
        for (dimension, (starts_open, mask, narrow_mask)) in Dimension::CHAIN.iter().zip(draws) {
            let column = dimension.column();
            if starts_open {
                narrow.set(*dimension, subset_of_domain(&dataset, column, narrow_mask));
            } else {
                wide.set(*dimension, subset_of_domain(&dataset, column, mask));
                narrow.set(*dimension, subset_of_domain(&dataset, column, mask & narrow_mask));
            }
        }

        let wide_rows = resolve(&dataset, &wide);
        let narrow_rows = resolve(&dataset, &narrow);
        prop_assert!(narrow_rows.is_subset_of(&wide_rows));
    }

    #[test]
    fn prop_resolve_is_total(
        dataset in dataset_strategy(),
        selections in prop::collection::vec(selection_strategy(), 5),
        from in date_text_strategy(),
        to in date_text_strategy(),
    ) {
        let mut state = FilterState::new(DateRange::parse(from.as_deref(), to.as_deref()));
        for (dimension, selection) in Dimension::CHAIN.iter().zip(selections) {
            state.set(*dimension, selection);
        }

        let subset = resolve(&dataset, &state);
        if !state.is_resolvable() {
            prop_assert!(subset.is_empty());
        }
        for row in subset.iter() {
            prop_assert!(state.range.contains(row.date));
        }
    }

    #[test]
    fn prop_date_bounds_are_inclusive(dataset in dataset_strategy(), start in 0..60i64, len in 0..30i64) {
        let from = epoch() + Duration::days(start);
        let to = from + Duration::days(len);
        let subset = resolve(&dataset, &FilterState::select_all(DateRange::new(from, to)));

        for row in dataset.rows() {
            let inside = row.date.map_or(false, |d| d >= from && d <= to);
            prop_assert_eq!(subset.contains(row.index), inside);
        }
    }

    #[test]
    fn prop_pages_partition_subset(dataset in dataset_strategy(), size in 1..12usize) {
        let subset = resolve(&dataset, &FilterState::select_all(full_year()));
        let mut seen = Vec::new();
        let mut offset = 0;
        loop {
            let p = page(&subset, offset, size);
            if p.is_empty() {
                break;
            }
            prop_assert!(p.len() <= size);
            seen.extend(p.rows.iter().map(|r| r.index));
            offset += size;
        }
        prop_assert_eq!(seen, subset.indices());
    }

    #[test]
    fn prop_drilldown_round_trip(
        label in "\\PC{0,24}",
        sentiment in any::<bool>(),
        from in prop::option::of(0..5000i64),
        to in prop::option::of(0..5000i64),
    ) {
        let bound = |d: Option<i64>| match d {
            Some(d) => DateBound::On(epoch() + Duration::days(d)),
            None => DateBound::Unset,
        };
        let target = if sentiment {
            DrilldownTarget::Sentiment(label)
        } else {
            DrilldownTarget::Feature(label)
        };
        let key = DrilldownKey { target, date_from: bound(from), date_to: bound(to) };
        prop_assert_eq!(decode(&key.encode()).unwrap(), key);
    }
}

#[test]
fn test_three_row_scenario() {
    let csv = "\
brand,model,Feature,fact,country,source,date,price,segment,feedback
Renault,Kiger,Engine,Positive,India,Web,01-01-2023,\"6,50,000\",SUV,Peppy engine
Renault,Kiger,Engine,Negative,India,Web,02-01-2023,\"6,50,000\",SUV,Rough idle
Kia,Sonet,Engine,Positive,India,Web,03-01-2023,\"7,50,000\",SUV,Smooth
";
    let options = LoadOptions {
        encoding: TextEncoding::Utf8,
        ..LoadOptions::default()
    };
    let dataset = load_dataset(&CsvSource::bytes(csv.as_bytes()), &options).unwrap();
    assert_eq!(dataset.rows()[0].price, Some(650_000.0));

    let range = DateRange::parse(Some("01-01-2023"), Some("02-01-2023"));
    let subset = resolve(&dataset, &FilterState::select_all(range));
    assert_eq!(subset.indices(), vec![1, 2]);

    let counts = category_counts(&subset, Column::Fact);
    assert_eq!(counts.get("Positive"), Some(1));
    assert_eq!(counts.get("Negative"), Some(1));
    assert_eq!(counts.get("Neutral"), Some(0));
    assert_eq!(counts.get("Very Positive"), Some(0));
    assert_eq!(counts.get("Very Negative"), Some(0));
    assert_eq!(counts.entries.len(), 5);
}
