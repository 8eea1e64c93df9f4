//! # Next Day Forecast
//!
//! A Rust library for forecasting the next trading session's opening and
//! closing prices of a single ticker from historical daily OHLCV data.
//!
//! ## Features
//!
//! - Min-max scaling with independent per-column scaler state
//! - Sliding-window supervised dataset construction
//! - Temporal (unshuffled) train/test splitting
//! - Two forecasters selected by configuration: a two-layer recurrent
//!   sequence regressor and a least-squares OHLCV feature regression
//! - Business-day resolution of the next trading date
//! - CSV persistence of the latest prediction per ticker
//!
//! ## Quick Start
//!
//! ```no_run
//! use next_day_forecast::config::ForecastConfig;
//! use next_day_forecast::pipeline::{run_forecast, PredictRequest};
//! use next_day_forecast::store::CsvPredictionStore;
//! use daily_ohlcv::csv_source::CsvBarSource;
//!
//! let fetcher = CsvBarSource::new("data");
//! let store = CsvPredictionStore::new("predictions");
//! let request = PredictRequest {
//!     ticker: "BRK-B".to_string(),
//!     start_date: "2015-01-01".parse().unwrap(),
//!     end_date: "2025-03-30".parse().unwrap(),
//! };
//!
//! let record = run_forecast(&fetcher, &store, &request, &ForecastConfig::default()).unwrap();
//! println!("{} on {}: close {:.2}", record.ticker, record.date, record.predicted_close);
//! ```

pub mod calendar;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod scaler;
pub mod store;
pub mod window;

// Re-export commonly used types
pub use crate::config::{ForecastConfig, ModelKind};
pub use crate::error::{ForecastError, Result};
pub use crate::pipeline::{last_prediction, run_forecast, PredictRequest};
pub use crate::scaler::MinMaxScaler;
pub use crate::store::{CsvPredictionStore, PredictionRecord};
pub use crate::window::{build_windows, split, WindowedDataset};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
