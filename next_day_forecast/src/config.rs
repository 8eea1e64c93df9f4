//! Configuration for the forecasting pipeline
//!
//! Everything a forecast run can vary on is declared here and loadable
//! from a TOML file, including the model kind and the RNG seed so tests
//! can pin training behavior.

use crate::error::{ForecastError, Result};
use serde::Deserialize;
use std::path::Path;

/// Which forecaster implementation the pipeline uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Two-layer recurrent sequence regressor over a scaled price window
    Recurrent,
    /// Least-squares regression over OHLCV features of the last bar
    Linear,
}

/// Pipeline configuration with the defaults of the original system
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Forecaster implementation to use
    pub model: ModelKind,
    /// Look-back window length in trading days
    pub window: usize,
    /// Training passes over the data
    pub epochs: usize,
    /// Mini-batch size
    pub batch_size: usize,
    /// Hidden widths of the two recurrent layers
    pub hidden: [usize; 2],
    /// Dropout rate applied after each recurrent layer during training
    pub dropout: f64,
    /// SGD learning rate
    pub learning_rate: f64,
    /// Fraction of windowed samples used for training (prefix split)
    pub train_split: f64,
    /// Fraction of the training set held out for validation loss
    pub validation_fraction: f64,
    /// Also forecast the next open price, not only the close
    pub predict_open: bool,
    /// RNG seed; unset means nondeterministic training
    pub seed: Option<u64>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            model: ModelKind::Recurrent,
            window: 60,
            epochs: 25,
            batch_size: 32,
            hidden: [64, 32],
            dropout: 0.2,
            learning_rate: 0.05,
            train_split: 0.8,
            validation_fraction: 0.1,
            predict_open: true,
            seed: None,
        }
    }
}

impl ForecastConfig {
    /// Load configuration from a TOML file
    pub fn from_toml_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: ForecastConfig =
            toml::from_str(&text).map_err(|e| ForecastError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the numeric parameters are usable
    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(ForecastError::Config("window must be positive".to_string()));
        }
        if self.epochs == 0 || self.batch_size == 0 {
            return Err(ForecastError::Config(
                "epochs and batch_size must be positive".to_string(),
            ));
        }
        if self.hidden[0] == 0 || self.hidden[1] == 0 {
            return Err(ForecastError::Config(
                "hidden widths must be positive".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(ForecastError::Config(
                "dropout must be in [0, 1)".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.train_split) || self.train_split == 0.0 {
            return Err(ForecastError::Config(
                "train_split must be in (0, 1)".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.validation_fraction) {
            return Err(ForecastError::Config(
                "validation_fraction must be in [0, 1)".to_string(),
            ));
        }
        if self.learning_rate <= 0.0 || !self.learning_rate.is_finite() {
            return Err(ForecastError::Config(
                "learning_rate must be positive and finite".to_string(),
            ));
        }
        Ok(())
    }
}
