//! Min-max normalization of a single feature column
//!
//! Each column (open, close, volume, ...) gets its own fitted scaler;
//! the parameters live inside the instance, so inverting a prediction
//! with a scaler fitted on a different column is a caller bug the tests
//! guard against, not something this type can silently do.

use crate::error::{ForecastError, Result};
use tracing::warn;

/// A fitted min-max scaler mapping observed values into `[0, 1]`
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    min: f64,
    max: f64,
}

impl MinMaxScaler {
    /// Fit a scaler to the observed values
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(ForecastError::Training(
                "cannot fit scaler on an empty series".to_string(),
            ));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::Training(
                "cannot fit scaler on non-finite values".to_string(),
            ));
        }

        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if min == max {
            warn!(value = min, "constant series, scaling everything to 0");
        }
        Ok(Self { min, max })
    }

    /// Scale one value into `[0, 1]`. A constant series maps to 0.
    pub fn transform_one(&self, value: f64) -> f64 {
        if self.max == self.min {
            return 0.0;
        }
        (value - self.min) / (self.max - self.min)
    }

    /// Scale a whole series
    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.transform_one(v)).collect()
    }

    /// Fit and scale in one step, returning the scaler for later inversion
    pub fn fit_transform(values: &[f64]) -> Result<(Vec<f64>, Self)> {
        let scaler = Self::fit(values)?;
        let scaled = scaler.transform(values);
        Ok((scaled, scaler))
    }

    /// Map a scaled value back to the original range
    pub fn invert(&self, scaled: f64) -> f64 {
        if self.max == self.min {
            return self.min;
        }
        scaled * (self.max - self.min) + self.min
    }

    /// The observed minimum this scaler was fitted on
    pub fn min(&self) -> f64 {
        self.min
    }

    /// The observed maximum this scaler was fitted on
    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_into_unit_interval() {
        let (scaled, _) = MinMaxScaler::fit_transform(&[10.0, 20.0, 30.0]).unwrap();
        assert_eq!(scaled, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn constant_series_maps_to_zero_and_inverts_to_itself() {
        let (scaled, scaler) = MinMaxScaler::fit_transform(&[5.0, 5.0, 5.0]).unwrap();
        assert!(scaled.iter().all(|&v| v == 0.0));
        assert_eq!(scaler.invert(0.0), 5.0);
    }

    #[test]
    fn rejects_non_finite_input() {
        assert!(MinMaxScaler::fit(&[1.0, f64::NAN]).is_err());
        assert!(MinMaxScaler::fit(&[]).is_err());
    }
}
