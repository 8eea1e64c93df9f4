//! Forecaster implementations
//!
//! Two interchangeable forecasters are provided, selected by
//! [`crate::config::ModelKind`]:
//!
//! - [`recurrent::RecurrentNet`] trains a two-layer recurrent sequence
//!   regressor on a scaled look-back window (the default);
//! - [`linear::NextDayLinear`] fits least squares over the OHLCV features
//!   of each day to predict the following day's open and close.
//!
//! Both are created, trained, and discarded within a single forecast
//! request; nothing is cached across requests.

use crate::error::Result;

pub mod linear;
pub mod recurrent;

pub use linear::NextDayLinear;
pub use recurrent::RecurrentNet;

/// A univariate one-step-ahead sequence regressor.
///
/// `fit` consumes (window, target) pairs produced by
/// [`crate::window::build_windows`]; `predict_next` maps the most recent
/// window to a single scaled forecast. No uncertainty estimate is
/// produced.
pub trait SequenceRegressor {
    /// Train on the supervised window dataset. The trailing
    /// `validation_fraction` of the samples is held out to report
    /// validation loss per epoch.
    fn fit(&mut self, inputs: &[Vec<f64>], targets: &[f64], validation_fraction: f64)
        -> Result<()>;

    /// Predict the scaled value following `window`. Fails if called
    /// before `fit` or with a window of the wrong length.
    fn predict_next(&self, window: &[f64]) -> Result<f64>;

    /// Name of the model
    fn name(&self) -> &str;
}
