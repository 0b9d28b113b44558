//! Dataset ingestion
//!
//! Turns delimited review exports into a normalized `Dataset`. Ingestion
//! only normalizes dates and prices; values are otherwise kept verbatim
//! (no trimming, no case folding) so facet matching stays byte-exact.

use super::dataset::{Dataset, Row};
use super::dates::{parse_dataset_date, DATASET_DATE_FORMAT};
use super::error::Result;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::PathBuf;

/// Text encoding of the raw export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// ISO-8859-1; every byte maps to the code point of the same value
    #[default]
    Latin1,
    Utf8,
}

impl TextEncoding {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "utf8" | "utf-8" => Self::Utf8,
            _ => Self::Latin1,
        }
    }

    fn decode(self, bytes: Vec<u8>) -> Vec<u8> {
        match self {
            TextEncoding::Utf8 => bytes,
            TextEncoding::Latin1 => bytes
                .iter()
                .map(|&b| b as char)
                .collect::<String>()
                .into_bytes(),
        }
    }
}

/// One record as it appears in the export, before normalization
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    pub brand: String,
    pub model: String,
    #[serde(rename = "Feature", alias = "feature")]
    pub feature: String,
    pub fact: String,
    pub country: String,
    pub source: String,
    pub date: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub segment: String,
    #[serde(default)]
    pub feedback: String,
}

/// Anything that can supply raw review records
pub trait RowSource {
    fn read_records(&self, encoding: TextEncoding) -> Result<Vec<RawRecord>>;
}

/// Records that are already in memory
impl RowSource for Vec<RawRecord> {
    fn read_records(&self, _encoding: TextEncoding) -> Result<Vec<RawRecord>> {
        Ok(self.clone())
    }
}

/// Delimited text with a header row, from a file or a byte buffer
#[derive(Debug, Clone)]
pub enum CsvSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl CsvSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        CsvSource::Path(path.into())
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        CsvSource::Bytes(bytes.into())
    }
}

impl RowSource for CsvSource {
    fn read_records(&self, encoding: TextEncoding) -> Result<Vec<RawRecord>> {
        let raw = match self {
            CsvSource::Path(path) => std::fs::read(path)?,
            CsvSource::Bytes(bytes) => bytes.clone(),
        };
        let text = encoding.decode(raw);

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_reader(text.as_slice());

        let mut records = Vec::new();
        for result in reader.deserialize() {
            let record: RawRecord = result?;
            records.push(record);
        }
        Ok(records)
    }
}

/// Options controlling normalization at load
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// `chrono` format of the date column
    pub date_format: String,
    pub encoding: TextEncoding,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            date_format: DATASET_DATE_FORMAT.to_string(),
            encoding: TextEncoding::default(),
        }
    }
}

/// Strip thousands separators and parse a price
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|p| p.is_finite())
}

/// Normalize raw records into rows with stable 1-based indices
pub fn normalize_records(records: Vec<RawRecord>, options: &LoadOptions) -> Vec<Row> {
    let mut bad_dates = 0usize;
    let mut bad_prices = 0usize;

    let rows: Vec<Row> = records
        .into_iter()
        .enumerate()
        .map(|(i, rec)| {
            let date = parse_dataset_date(&rec.date, &options.date_format);
            if date.is_none() {
                bad_dates += 1;
            }
            let price = parse_price(&rec.price);
            if price.is_none() {
                bad_prices += 1;
            }
            Row {
                index: i + 1,
                brand: rec.brand,
                model: rec.model,
                feature: rec.feature,
                fact: rec.fact,
                country: rec.country,
                source: rec.source,
                date,
                price,
                segment: rec.segment,
                feedback: rec.feedback,
            }
        })
        .collect();

    if bad_dates > 0 {
        tracing::warn!(
            "{} row(s) have a date not matching '{}'; they never match a date range",
            bad_dates,
            options.date_format
        );
    }
    if bad_prices > 0 {
        tracing::warn!("{} row(s) have no parsable price", bad_prices);
    }

    rows
}

/// Load and normalize a dataset, computing its domains up front
pub fn load_dataset<S: RowSource + ?Sized>(source: &S, options: &LoadOptions) -> Result<Dataset> {
    let records = source.read_records(options.encoding)?;
    let rows = normalize_records(records, options);
    tracing::debug!("loaded {} review rows", rows.len());

    let dataset = Dataset::new(rows);
    dataset.warm();
    Ok(dataset)
}
