//! Utility functions for generating synthetic daily series
//!
//! Used by tests, examples, and demos that need plausible OHLCV history
//! without hitting a real data source.

use crate::DailyBar;
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

/// Generate a random-walk daily series for testing purposes.
///
/// Dates start on 2023-01-02 (a Monday) and skip weekends, so the output
/// looks like real trading history. Passing a seed makes the walk
/// reproducible.
///
/// # Arguments
/// * `num_points` - Number of bars to generate
/// * `starting_price` - Close price of the first bar
/// * `volatility` - Daily relative price movement scale (e.g. 0.02)
/// * `seed` - Optional RNG seed for reproducibility
pub fn generate_walk(
    num_points: usize,
    starting_price: f64,
    volatility: f64,
    seed: Option<u64>,
) -> Vec<DailyBar> {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let step = Normal::new(0.0, volatility).unwrap();

    let mut bars = Vec::with_capacity(num_points);
    let mut date = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let mut price = starting_price;

    for _ in 0..num_points {
        let open = price;
        let close = (open * (1.0 + step.sample(&mut rng))).max(0.01);
        let high = open.max(close) * (1.0 + rng.gen::<f64>() * volatility * 0.5);
        let low = (open.min(close) * (1.0 - rng.gen::<f64>() * volatility * 0.5)).max(0.01);
        let volume = rng.gen_range(1_000..10_000);

        bars.push(DailyBar {
            date,
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
        date = next_weekday(date);
    }

    bars
}

fn next_weekday(date: NaiveDate) -> NaiveDate {
    let mut next = date.succ_opt().unwrap();
    while matches!(next.weekday(), Weekday::Sat | Weekday::Sun) {
        next = next.succ_opt().unwrap();
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate_series;

    #[test]
    fn walk_has_requested_length_and_valid_dates() {
        let bars = generate_walk(50, 100.0, 0.02, Some(7));
        assert_eq!(bars.len(), 50);
        validate_series(&bars).unwrap();
        assert!(bars
            .iter()
            .all(|b| !matches!(b.date.weekday(), Weekday::Sat | Weekday::Sun)));
    }

    #[test]
    fn walk_is_reproducible_with_seed() {
        let a = generate_walk(20, 100.0, 0.02, Some(42));
        let b = generate_walk(20, 100.0, 0.02, Some(42));
        assert_eq!(a, b);
    }

    #[test]
    fn prices_stay_positive() {
        let bars = generate_walk(200, 1.0, 0.3, Some(1));
        assert!(bars.iter().all(|b| b.low > 0.0 && b.close > 0.0));
    }
}
