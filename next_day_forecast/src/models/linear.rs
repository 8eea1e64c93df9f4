//! Least-squares next-day regression over OHLCV features
//!
//! The classical alternative to the recurrent forecaster: each day's
//! `{open, high, low, close, volume}` predicts the following day's open
//! and close. Every feature column and every target is min-max scaled
//! with its own scaler, and the normal equations are solved directly
//! with Gaussian elimination.

use crate::error::{ForecastError, Result};
use crate::scaler::MinMaxScaler;
use daily_ohlcv::DailyBar;
use tracing::debug;

const NUM_FEATURES: usize = 5;

/// Minimum bars needed so the regression has at least as many rows as
/// unknowns (five features plus an intercept, and one bar reserved as
/// the prediction input).
pub const MIN_BARS: usize = NUM_FEATURES + 3;

fn features_of(bar: &DailyBar) -> [f64; NUM_FEATURES] {
    [bar.open, bar.high, bar.low, bar.close, bar.volume as f64]
}

/// Fitted least-squares forecaster for next-day open and close
#[derive(Debug)]
pub struct NextDayLinear {
    feature_scalers: Option<Vec<MinMaxScaler>>,
    open_model: Option<(Vec<f64>, MinMaxScaler)>,
    close_model: Option<(Vec<f64>, MinMaxScaler)>,
}

impl NextDayLinear {
    pub fn new() -> Self {
        Self {
            feature_scalers: None,
            open_model: None,
            close_model: None,
        }
    }

    /// Fit both regressions on a historical series. The final bar is not
    /// part of the training rows; it is the input `predict_next` will see.
    pub fn fit(&mut self, bars: &[DailyBar], predict_open: bool) -> Result<()> {
        if bars.len() < MIN_BARS {
            return Err(ForecastError::Training(format!(
                "need at least {} bars for the linear forecaster, got {}",
                MIN_BARS,
                bars.len()
            )));
        }

        // One scaler per feature column, fitted independently
        let mut feature_scalers = Vec::with_capacity(NUM_FEATURES);
        for col in 0..NUM_FEATURES {
            let column: Vec<f64> = bars.iter().map(|b| features_of(b)[col]).collect();
            feature_scalers.push(MinMaxScaler::fit(&column)?);
        }

        let rows: Vec<Vec<f64>> = bars[..bars.len() - 1]
            .iter()
            .map(|bar| scaled_row(bar, &feature_scalers))
            .collect();

        let close_targets: Vec<f64> = bars[1..].iter().map(|b| b.close).collect();
        let (scaled_close, close_scaler) = MinMaxScaler::fit_transform(&close_targets)?;
        let close_coeffs = solve_least_squares(&rows, &scaled_close)?;
        debug!(rows = rows.len(), "fitted close regression");
        self.close_model = Some((close_coeffs, close_scaler));

        if predict_open {
            let open_targets: Vec<f64> = bars[1..].iter().map(|b| b.open).collect();
            let (scaled_open, open_scaler) = MinMaxScaler::fit_transform(&open_targets)?;
            let open_coeffs = solve_least_squares(&rows, &scaled_open)?;
            self.open_model = Some((open_coeffs, open_scaler));
        }

        self.feature_scalers = Some(feature_scalers);
        Ok(())
    }

    /// Predict the next day's (open, close) from the most recent bar.
    /// The open is `None` when `fit` was not asked for it.
    pub fn predict_next(&self, last_bar: &DailyBar) -> Result<(Option<f64>, f64)> {
        let feature_scalers = self.feature_scalers.as_ref().ok_or_else(|| {
            ForecastError::Prediction("predict called before fit".to_string())
        })?;
        let row = scaled_row(last_bar, feature_scalers);

        let (close_coeffs, close_scaler) = self
            .close_model
            .as_ref()
            .ok_or_else(|| ForecastError::Prediction("close model missing".to_string()))?;
        let close = close_scaler.invert(dot_with_intercept(close_coeffs, &row));
        if !close.is_finite() {
            return Err(ForecastError::Prediction(
                "linear model produced a non-finite close forecast".to_string(),
            ));
        }

        let open = match &self.open_model {
            Some((coeffs, scaler)) => {
                let value = scaler.invert(dot_with_intercept(coeffs, &row));
                if !value.is_finite() {
                    return Err(ForecastError::Prediction(
                        "linear model produced a non-finite open forecast".to_string(),
                    ));
                }
                Some(value)
            }
            None => None,
        };

        Ok((open, close))
    }
}

impl Default for NextDayLinear {
    fn default() -> Self {
        Self::new()
    }
}

fn scaled_row(bar: &DailyBar, scalers: &[MinMaxScaler]) -> Vec<f64> {
    features_of(bar)
        .iter()
        .zip(scalers)
        .map(|(&v, s)| s.transform_one(v))
        .collect()
}

fn dot_with_intercept(coeffs: &[f64], row: &[f64]) -> f64 {
    let mut value = coeffs[0];
    for (c, x) in coeffs[1..].iter().zip(row) {
        value += c * x;
    }
    value
}

/// Solve `min ||X b - y||` over rows with an implicit leading intercept
/// column, via the normal equations.
fn solve_least_squares(rows: &[Vec<f64>], targets: &[f64]) -> Result<Vec<f64>> {
    let n_coeffs = NUM_FEATURES + 1;
    let mut ata = vec![vec![0.0; n_coeffs]; n_coeffs];
    let mut atb = vec![0.0; n_coeffs];

    for (row, &y) in rows.iter().zip(targets) {
        let mut extended = Vec::with_capacity(n_coeffs);
        extended.push(1.0);
        extended.extend_from_slice(row);
        for i in 0..n_coeffs {
            atb[i] += extended[i] * y;
            for j in 0..n_coeffs {
                ata[i][j] += extended[i] * extended[j];
            }
        }
    }

    // Tiny ridge term keeps the system solvable when a scaled column is
    // constant (e.g. flat volume in synthetic data).
    for i in 0..n_coeffs {
        ata[i][i] += 1e-8;
    }

    gaussian_solve(&mut ata, &mut atb)
}

/// Gaussian elimination with partial pivoting
fn gaussian_solve(a: &mut [Vec<f64>], b: &mut [f64]) -> Result<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&x, &y| a[x][col].abs().total_cmp(&a[y][col].abs()))
            .unwrap();
        if a[pivot][col].abs() < 1e-12 {
            return Err(ForecastError::Training(
                "singular system in least-squares fit".to_string(),
            ));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut solution = vec![0.0; n];
    for row in (0..n).rev() {
        let mut value = b[row];
        for k in row + 1..n {
            value -= a[row][k] * solution[k];
        }
        solution[row] = value / a[row][row];
    }
    Ok(solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bars_with_next_day_rule(n: usize) -> Vec<DailyBar> {
        // Tomorrow's open is today's close plus one; tomorrow's close is
        // today's close plus two. Exactly representable by the regression.
        let mut bars = Vec::with_capacity(n);
        let mut date = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let mut close = 100.0;
        for i in 0..n {
            bars.push(DailyBar {
                date,
                open: close - 1.0,
                high: close + 2.0,
                low: close - 3.0,
                close,
                volume: 1_000 + (i as u64 % 7) * 100,
            });
            close += 2.0;
            date = date.succ_opt().unwrap();
        }
        bars
    }

    #[test]
    fn recovers_an_exact_linear_rule() {
        let bars = bars_with_next_day_rule(40);
        let mut model = NextDayLinear::new();
        model.fit(&bars, true).unwrap();

        let (open, close) = model.predict_next(bars.last().unwrap()).unwrap();
        let last_close = bars.last().unwrap().close;
        assert!((close - (last_close + 2.0)).abs() < 1e-3);
        assert!((open.unwrap() - (last_close + 1.0)).abs() < 1e-3);
    }

    #[test]
    fn skips_open_model_when_not_requested() {
        let bars = bars_with_next_day_rule(20);
        let mut model = NextDayLinear::new();
        model.fit(&bars, false).unwrap();

        let (open, close) = model.predict_next(bars.last().unwrap()).unwrap();
        assert!(open.is_none());
        assert!(close.is_finite());
    }

    #[test]
    fn too_few_bars_is_a_training_error() {
        let bars = bars_with_next_day_rule(MIN_BARS - 1);
        let mut model = NextDayLinear::new();
        assert!(matches!(
            model.fit(&bars, true),
            Err(ForecastError::Training(_))
        ));
    }

    #[test]
    fn predict_before_fit_is_a_prediction_error() {
        let model = NextDayLinear::new();
        let bars = bars_with_next_day_rule(1);
        assert!(matches!(
            model.predict_next(&bars[0]),
            Err(ForecastError::Prediction(_))
        ));
    }
}
