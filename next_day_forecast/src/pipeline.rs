//! The forecast pipeline: fetch, preprocess, train, predict, persist
//!
//! Runs synchronously within a single request. Every invocation trains a
//! fresh model and discards it; the only state that outlives the request
//! is the record written to the prediction store. Bounding the number of
//! concurrent training runs is the hosting layer's job, not done here.

use crate::calendar::next_trading_day;
use crate::config::{ForecastConfig, ModelKind};
use crate::error::{ForecastError, Result};
use crate::models::{linear, NextDayLinear, RecurrentNet, SequenceRegressor};
use crate::scaler::MinMaxScaler;
use crate::store::{CsvPredictionStore, PredictionRecord};
use crate::window::{build_windows, split};
use chrono::NaiveDate;
use daily_ohlcv::{DailyBar, PriceColumn, SeriesFetcher};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A predict request as the serving layer hands it to the core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Run the full forecast pipeline for one request and persist the result.
///
/// Client-correctable failures ([`ForecastError::DataUnavailable`],
/// [`ForecastError::InsufficientHistory`]) carry the ticker and range so
/// the caller can adjust; nothing is written to the store on any failure.
pub fn run_forecast<F: SeriesFetcher>(
    fetcher: &F,
    store: &CsvPredictionStore,
    request: &PredictRequest,
    config: &ForecastConfig,
) -> Result<PredictionRecord> {
    config.validate()?;

    info!(
        ticker = %request.ticker,
        start = %request.start_date,
        end = %request.end_date,
        "fetching history"
    );
    let bars = fetcher.fetch(&request.ticker, request.start_date, request.end_date)?;
    if bars.is_empty() {
        return Err(ForecastError::DataUnavailable {
            ticker: request.ticker.clone(),
            start: request.start_date,
            end: request.end_date,
        });
    }
    debug!(bars = bars.len(), "history fetched");

    let (predicted_open, predicted_close) = match config.model {
        ModelKind::Recurrent => forecast_recurrent(&bars, request, config)?,
        ModelKind::Linear => forecast_linear(&bars, request, config)?,
    };

    let last_date = bars.last().map(|b| b.date).unwrap();
    let record = PredictionRecord {
        ticker: request.ticker.clone(),
        date: next_trading_day(last_date),
        predicted_open,
        predicted_close,
    };

    store.write(&record)?;
    info!(
        ticker = %record.ticker,
        date = %record.date,
        close = record.predicted_close,
        "forecast complete"
    );
    Ok(record)
}

/// The read path: the stored prediction for `ticker`, or `None` if no
/// prediction was ever made. Absence is not an error.
pub fn last_prediction(
    store: &CsvPredictionStore,
    ticker: &str,
) -> Result<Option<PredictionRecord>> {
    store.read(ticker)
}

/// Smallest history length that still leaves at least one training
/// sample after windowing and the train/test split.
fn min_history(config: &ForecastConfig) -> usize {
    config.window + (1.0 / config.train_split).ceil() as usize
}

fn forecast_recurrent(
    bars: &[DailyBar],
    request: &PredictRequest,
    config: &ForecastConfig,
) -> Result<(Option<f64>, f64)> {
    let need = min_history(config);
    if bars.len() < need {
        return Err(ForecastError::InsufficientHistory {
            ticker: request.ticker.clone(),
            have: bars.len(),
            need,
        });
    }

    let close = forecast_column(bars, PriceColumn::Close, request, config)?;
    let open = if config.predict_open {
        Some(forecast_column(bars, PriceColumn::Open, request, config)?)
    } else {
        None
    };
    Ok((open, close))
}

/// Train one model for one feature column and produce its one-step
/// forecast. The scaler fitted here is the only one used to invert the
/// prediction; every column gets its own.
fn forecast_column(
    bars: &[DailyBar],
    column: PriceColumn,
    request: &PredictRequest,
    config: &ForecastConfig,
) -> Result<f64> {
    let values = column.values(bars);
    let (scaled, scaler) = MinMaxScaler::fit_transform(&values)?;

    let dataset = build_windows(&scaled, config.window);
    let total = dataset.len();
    let (train, test) = split(dataset, config.train_split);
    if train.is_empty() {
        // Covers both no windows at all and too few windows for the
        // split ratio to leave a training prefix. Either way the client
        // can correct it by widening the date range.
        return Err(ForecastError::InsufficientHistory {
            ticker: request.ticker.clone(),
            have: scaled.len(),
            need: min_history(config),
        });
    }
    debug!(
        %column,
        samples = total,
        train = train.len(),
        test = test.len(),
        "windowed dataset split"
    );

    let mut model = RecurrentNet::from_config(config);
    model.fit(&train.inputs, &train.targets, config.validation_fraction)?;

    let last_window = &scaled[scaled.len() - config.window..];
    let scaled_forecast = model.predict_next(last_window)?;
    Ok(scaler.invert(scaled_forecast))
}

fn forecast_linear(
    bars: &[DailyBar],
    request: &PredictRequest,
    config: &ForecastConfig,
) -> Result<(Option<f64>, f64)> {
    if bars.len() < linear::MIN_BARS {
        return Err(ForecastError::InsufficientHistory {
            ticker: request.ticker.clone(),
            have: bars.len(),
            need: linear::MIN_BARS,
        });
    }

    let mut model = NextDayLinear::new();
    model.fit(bars, config.predict_open)?;
    model.predict_next(bars.last().unwrap())
}
