//! Forecast the next trading day of a synthetic random walk.
//!
//! Run with: `cargo run --example forecast_walk`

use chrono::NaiveDate;
use daily_ohlcv::utils::generate_walk;
use daily_ohlcv::{DailyBar, SeriesFetcher};
use next_day_forecast::config::ForecastConfig;
use next_day_forecast::pipeline::{last_prediction, run_forecast, PredictRequest};
use next_day_forecast::store::CsvPredictionStore;

struct WalkFetcher {
    bars: Vec<DailyBar>,
}

impl SeriesFetcher for WalkFetcher {
    fn fetch(
        &self,
        _ticker: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> daily_ohlcv::Result<Vec<DailyBar>> {
        Ok(self.bars.clone())
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let fetcher = WalkFetcher {
        bars: generate_walk(250, 100.0, 0.02, Some(42)),
    };
    let store = CsvPredictionStore::new("predictions");
    let request = PredictRequest {
        ticker: "WALK".to_string(),
        start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
    };

    // A smaller network than the production default keeps the example fast
    let config = ForecastConfig {
        epochs: 10,
        hidden: [16, 8],
        seed: Some(42),
        ..Default::default()
    };

    let record = run_forecast(&fetcher, &store, &request, &config).unwrap();
    println!(
        "Predicted for {} on {}: close ${:.2}",
        record.ticker, record.date, record.predicted_close
    );

    let stored = last_prediction(&store, "WALK").unwrap();
    println!("Stored record: {:?}", stored);
}
