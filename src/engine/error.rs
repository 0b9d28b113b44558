use thiserror::Error;

/// Errors raised by the review engine
///
/// Filtering, facet options, aggregation and paging are total and never
/// produce these; only loading, configuration, frame conversion and
/// drilldown key decoding can fail.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Drilldown route fragment that does not follow the key grammar
    #[error("Malformed drilldown key: {0}")]
    MalformedKey(String),

    /// Dataset or config file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited input could not be parsed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error (unreadable or non-object config file, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// DataFrame construction failed
    #[error("Frame error: {0}")]
    Frame(#[from] polars::error::PolarsError),
}

/// Type alias for Results using EngineError
pub type Result<T> = std::result::Result<T, EngineError>;
