//! Shared query pipeline
//!
//! Turns one request into one view. The binary runs many of these
//! concurrently against the same `Dataset`; nothing here mutates shared
//! state, so every request owns its filter state and page.
//!
//! Dashboard requests flow:
//! 1. FacetGraph computes the option lists for the chain
//! 2. FilterResolver turns the state into a subset
//! 3. Aggregator builds the feature, sentiment and comparison charts
//! 4. Pager slices the table
//!
//! Drilldown requests decode a route key and list the top rows behind it.

use crate::charts::excerpt::excerpt;
use crate::charts::frame_convert::{counts_to_frame, feedback_to_frame, rows_to_frame, stack_to_frame};
use crate::config::EngineConfig;
use crate::engine::aggregate::{
    category_counts, price_band_compare, segment_compare, sentiment_stack, CategoryCounts,
    SentimentGrouping, SentimentStack,
};
use crate::engine::dataset::{Column, Dataset, Row};
use crate::engine::dates::{DateRange, ISO_DATE_FORMAT};
use crate::engine::drilldown::DrilldownKey;
use crate::engine::error::Result;
use crate::engine::facets::{Dimension, FacetGraph, FacetOption, FacetSelection, FilterState};
use crate::engine::filter::{resolve, resolve_comparison};
use crate::engine::pages::{page_number, Page};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which model comparison chart to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonKind {
    /// Models in the anchor's segment
    Segment,
    /// Models priced within the band around the anchor
    Price,
}

/// Inputs of a comparison chart
#[derive(Debug, Clone, Deserialize)]
pub struct ComparisonRequest {
    pub kind: ComparisonKind,
    pub model: String,
    pub feature: String,
    pub fact: String,
    #[serde(default)]
    pub date_from: Option<String>,
    #[serde(default)]
    pub date_to: Option<String>,
}

/// Dashboard state as sent by the UI
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardRequest {
    /// Missing dimensions are unconstrained
    #[serde(default)]
    pub filters: HashMap<Dimension, FacetSelection>,
    #[serde(default)]
    pub date_from: Option<String>,
    #[serde(default)]
    pub date_to: Option<String>,
    #[serde(default)]
    pub page_current: usize,
    /// Falls back to the configured page size
    #[serde(default)]
    pub page_size: Option<usize>,
    #[serde(default)]
    pub sentiment_grouping: Option<SentimentGrouping>,
    #[serde(default)]
    pub comparison: Option<ComparisonRequest>,
}

impl DashboardRequest {
    pub fn filter_state(&self) -> FilterState {
        let range = DateRange::parse(self.date_from.as_deref(), self.date_to.as_deref());
        let mut state = FilterState::new(range);
        for (dimension, selection) in &self.filters {
            state.set(*dimension, selection.clone());
        }
        state
    }
}

/// One entry of a queries file
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Query {
    Dashboard(DashboardRequest),
    Drilldown {
        key: String,
        /// Caller state, re-applied only with the full-context scope
        #[serde(default)]
        context: Option<DashboardRequest>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct FacetOptions {
    pub dimension: Dimension,
    pub options: Vec<FacetOption>,
}

/// Everything the dashboard renders for one state
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView<'a> {
    pub facets: Vec<FacetOptions>,
    /// Rows matching the state
    pub matched: usize,
    pub features: CategoryCounts,
    pub facts: CategoryCounts,
    pub sentiment: SentimentStack,
    pub comparison: Option<CategoryCounts>,
    pub page: Page<'a>,
}

/// Frames handed to chart and table widgets
#[derive(Debug, Clone)]
pub struct DashboardFrames {
    pub features: DataFrame,
    pub facts: DataFrame,
    pub sentiment: DataFrame,
    pub comparison: Option<DataFrame>,
    pub page: DataFrame,
}

impl DashboardView<'_> {
    pub fn frames(&self) -> Result<DashboardFrames> {
        Ok(DashboardFrames {
            features: counts_to_frame(&self.features)?,
            facts: counts_to_frame(&self.facts)?,
            sentiment: stack_to_frame(&self.sentiment)?,
            comparison: self.comparison.as_ref().map(counts_to_frame).transpose()?,
            page: rows_to_frame(&self.page.rows)?,
        })
    }
}

/// Row of a drilldown table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackRow {
    pub brand: String,
    pub model: String,
    pub date: Option<String>,
    pub segment: String,
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DrilldownView<'a> {
    pub key: DrilldownKey,
    /// Rows behind the key before truncation
    pub matched: usize,
    pub rows: Vec<FeedbackRow>,
    #[serde(skip)]
    source_rows: Vec<&'a Row>,
}

impl DrilldownView<'_> {
    pub fn frame(&self, config: &EngineConfig) -> Result<DataFrame> {
        feedback_to_frame(&self.source_rows, config.excerpt_options())
    }
}

/// Result of one query
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryView<'a> {
    Dashboard(DashboardView<'a>),
    Drilldown(DrilldownView<'a>),
}

/// Request handling over a shared dataset
#[derive(Debug, Clone, Copy)]
pub struct Pipeline<'a> {
    dataset: &'a Dataset,
    config: &'a EngineConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(dataset: &'a Dataset, config: &'a EngineConfig) -> Self {
        Self { dataset, config }
    }

    fn graph(&self) -> FacetGraph<'a> {
        FacetGraph::new(self.dataset).with_all_label(self.config.all_label)
    }

    pub fn run(&self, query: &Query) -> Result<QueryView<'a>> {
        match query {
            Query::Dashboard(request) => Ok(QueryView::Dashboard(self.dashboard(request))),
            Query::Drilldown { key, context } => {
                let view = self.drilldown(key, context.as_ref())?;
                Ok(QueryView::Drilldown(view))
            }
        }
    }

    /// Build every dashboard component for one request; never fails
    pub fn dashboard(&self, request: &DashboardRequest) -> DashboardView<'a> {
        let state = request.filter_state();

        let facets = self
            .graph()
            .options_for_all(&state)
            .into_iter()
            .map(|(dimension, options)| FacetOptions { dimension, options })
            .collect();

        let subset = resolve(self.dataset, &state);
        let features = category_counts(&subset, Column::Feature);
        let facts = category_counts(&subset, Column::Fact);
        let sentiment = sentiment_stack(
            &subset,
            request.sentiment_grouping.unwrap_or(SentimentGrouping::Overall),
        );
        let comparison = request.comparison.as_ref().map(|c| self.comparison(c));

        let page_size = request.page_size.unwrap_or(self.config.page_size);
        let page = page_number(&subset, request.page_current, page_size);

        tracing::debug!(
            "dashboard: {} rows matched, page {} of {}",
            subset.len(),
            request.page_current,
            page.page_count()
        );

        DashboardView {
            facets,
            matched: subset.len(),
            features,
            facts,
            sentiment,
            comparison,
            page,
        }
    }

    pub fn comparison(&self, request: &ComparisonRequest) -> CategoryCounts {
        let range = DateRange::parse(request.date_from.as_deref(), request.date_to.as_deref());
        let subset = resolve_comparison(self.dataset, &request.feature, &request.fact, &range);
        match request.kind {
            ComparisonKind::Segment => segment_compare(&subset, Some(&request.model)),
            ComparisonKind::Price => {
                price_band_compare(&subset, Some(&request.model), self.config.price_band)
            }
        }
    }

    /// Decode `key` and list the first `drilldown_top_n` rows behind it
    pub fn drilldown(
        &self,
        key: &str,
        context: Option<&DashboardRequest>,
    ) -> Result<DrilldownView<'a>> {
        let key = DrilldownKey::decode(key)?;
        let context_state = context.map(DashboardRequest::filter_state);
        let subset = key.resolve(self.dataset, self.config.drilldown_scope, context_state.as_ref());

        let source_rows = subset.slice(0, self.config.drilldown_top_n);
        let options = self.config.excerpt_options();
        let rows = source_rows
            .iter()
            .map(|row| FeedbackRow {
                brand: row.brand.clone(),
                model: row.model.clone(),
                date: row.date.map(|d| d.format(ISO_DATE_FORMAT).to_string()),
                segment: row.segment.clone(),
                feedback: excerpt(&row.feedback, options),
            })
            .collect();

        tracing::debug!("drilldown {}: {} rows matched", key.encode(), subset.len());

        Ok(DrilldownView {
            key,
            matched: subset.len(),
            rows,
            source_rows,
        })
    }
}
