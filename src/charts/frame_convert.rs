//! Aggregates and pages to Polars DataFrames
//!
//! Chart and table widgets consume columnar frames. Each chart frame
//! carries a `color` column (hex) resolved through the palette registry,
//! so colors stay stable whichever subset is displayed.

use super::excerpt::{excerpt, ExcerptOptions};
use super::palettes::{color_for, to_hex};
use crate::engine::aggregate::{CategoryCounts, SentimentStack};
use crate::engine::dataset::{Column, Row};
use crate::engine::dates::ISO_DATE_FORMAT;
use crate::engine::error::Result;
use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};

/// Category counts as `<column>, count, color`
pub fn counts_to_frame(counts: &CategoryCounts) -> Result<DataFrame> {
    let labels: Vec<&str> = counts.entries.iter().map(|e| e.label.as_str()).collect();
    let values: Vec<u64> = counts.entries.iter().map(|e| e.count as u64).collect();
    let colors: Vec<String> = labels
        .iter()
        .map(|label| to_hex(color_for(counts.column, label)))
        .collect();

    let df = DataFrame::new(vec![
        Series::new(counts.column.name().into(), labels).into_column(),
        Series::new("count".into(), values).into_column(),
        Series::new("color".into(), colors).into_column(),
    ])?;
    Ok(df)
}

/// Sentiment stack in long form: `group, sentiment, percent, color`
pub fn stack_to_frame(stack: &SentimentStack) -> Result<DataFrame> {
    let n = stack.groups.iter().map(|g| g.shares.len()).sum();
    let mut groups = Vec::with_capacity(n);
    let mut levels = Vec::with_capacity(n);
    let mut percents = Vec::with_capacity(n);
    let mut colors = Vec::with_capacity(n);

    for group in &stack.groups {
        for share in &group.shares {
            groups.push(group.label.as_str());
            levels.push(share.level.label());
            percents.push(share.percent);
            colors.push(to_hex(color_for(Column::Fact, share.level.label())));
        }
    }

    let df = DataFrame::new(vec![
        Series::new("group".into(), groups).into_column(),
        Series::new("sentiment".into(), levels).into_column(),
        Series::new("percent".into(), percents).into_column(),
        Series::new("color".into(), colors).into_column(),
    ])?;
    Ok(df)
}

fn iso_dates(rows: &[&Row]) -> Vec<Option<String>> {
    rows.iter()
        .map(|r| r.date.map(|d| d.format(ISO_DATE_FORMAT).to_string()))
        .collect()
}

fn text_column(rows: &[&Row], name: &str, value: impl Fn(&Row) -> &str) -> polars::prelude::Column {
    let values: Vec<&str> = rows.iter().map(|r| value(r)).collect();
    Series::new(name.into(), values).into_column()
}

/// Full rows, for the paged table
pub fn rows_to_frame(rows: &[&Row]) -> Result<DataFrame> {
    let index: Vec<u64> = rows.iter().map(|r| r.index as u64).collect();
    let price: Vec<Option<f64>> = rows.iter().map(|r| r.price).collect();

    let df = DataFrame::new(vec![
        Series::new("index".into(), index).into_column(),
        text_column(rows, "brand", |r| r.brand.as_str()),
        text_column(rows, "model", |r| r.model.as_str()),
        text_column(rows, "feature", |r| r.feature.as_str()),
        text_column(rows, "fact", |r| r.fact.as_str()),
        text_column(rows, "country", |r| r.country.as_str()),
        text_column(rows, "source", |r| r.source.as_str()),
        Series::new("date".into(), iso_dates(rows)).into_column(),
        Series::new("price".into(), price).into_column(),
        text_column(rows, "segment", |r| r.segment.as_str()),
        text_column(rows, "feedback", |r| r.feedback.as_str()),
    ])?;
    Ok(df)
}

/// Drilldown table: `brand, model, date, segment, feedback` with excerpts
pub fn feedback_to_frame(rows: &[&Row], options: ExcerptOptions) -> Result<DataFrame> {
    let feedback: Vec<String> = rows.iter().map(|r| excerpt(&r.feedback, options)).collect();

    let df = DataFrame::new(vec![
        text_column(rows, "brand", |r| r.brand.as_str()),
        text_column(rows, "model", |r| r.model.as_str()),
        Series::new("date".into(), iso_dates(rows)).into_column(),
        text_column(rows, "segment", |r| r.segment.as_str()),
        Series::new("feedback".into(), feedback).into_column(),
    ])?;
    Ok(df)
}
