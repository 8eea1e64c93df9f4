//! Error types for the next_day_forecast crate

use daily_ohlcv::MarketDataError;
use thiserror::Error;

/// Custom error types for the forecasting pipeline
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The fetch returned no usable records. Client-correctable: pick a
    /// different ticker or date range.
    #[error("no data for {ticker} between {start} and {end}")]
    DataUnavailable {
        ticker: String,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    /// Records were fetched but too few to train on. Client-correctable:
    /// widen the date range.
    #[error("insufficient history for {ticker}: have {have} bars, need at least {need}")]
    InsufficientHistory {
        ticker: String,
        have: usize,
        need: usize,
    },

    /// Numerical or shape error during model fitting
    #[error("training error: {0}")]
    Training(String),

    /// Error during inference on a trained model
    #[error("prediction error: {0}")]
    Prediction(String),

    /// A stored prediction exists but its schema is invalid
    #[error("stored prediction is malformed, missing columns: {missing:?}")]
    MalformedRecord { missing: Vec<String> },

    /// A stored prediction has a column whose value cannot be parsed
    #[error("stored prediction has an invalid {column} value: {value:?}")]
    InvalidValue { column: String, value: String },

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from CSV operations
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error from the market data layer
    #[error("market data error: {0}")]
    MarketData(MarketDataError),

    /// Error from invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl ForecastError {
    /// Whether the caller can correct this error by changing the request.
    ///
    /// Data-unavailable and insufficient-history are client input errors
    /// and carry enough context to self-correct; everything else is an
    /// internal failure a serving layer should report opaquely.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ForecastError::DataUnavailable { .. } | ForecastError::InsufficientHistory { .. }
        )
    }
}

impl From<MarketDataError> for ForecastError {
    fn from(err: MarketDataError) -> Self {
        match err {
            MarketDataError::NoData {
                ticker,
                start,
                end,
            } => ForecastError::DataUnavailable {
                ticker,
                start,
                end,
            },
            other => ForecastError::MarketData(other),
        }
    }
}
