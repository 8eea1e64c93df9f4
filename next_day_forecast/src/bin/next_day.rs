//! Command-line entry point for next-day forecasts
//!
//! Mirrors the original scripts: `next_day [TICKER] [START] [END]`, with
//! history read from per-ticker CSV files and the prediction written to
//! the prediction store. `--fetch-last` prints the stored record for a
//! ticker instead of training.

use chrono::NaiveDate;
use clap::Parser;
use daily_ohlcv::csv_source::CsvBarSource;
use next_day_forecast::config::{ForecastConfig, ModelKind};
use next_day_forecast::pipeline::{last_prediction, run_forecast, PredictRequest};
use next_day_forecast::store::CsvPredictionStore;
use next_day_forecast::{ForecastError, Result};
use std::path::PathBuf;
use tracing::error;

#[derive(Parser, Debug)]
#[command(author, version, about = "Forecast the next trading day's open and close prices")]
struct Args {
    /// Ticker symbol
    #[arg(default_value = "BRK-B")]
    ticker: String,

    /// History start date (YYYY-MM-DD)
    #[arg(default_value = "2015-01-01")]
    start: NaiveDate,

    /// History end date (YYYY-MM-DD)
    #[arg(default_value = "2025-03-30")]
    end: NaiveDate,

    /// Directory holding per-ticker history CSVs
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Directory predictions are written to
    #[arg(long, default_value = "predictions")]
    out_dir: PathBuf,

    /// Optional TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Forecaster to use: "recurrent" or "linear"
    #[arg(long)]
    model: Option<String>,

    /// RNG seed for reproducible training
    #[arg(long)]
    seed: Option<u64>,

    /// Print the stored prediction for the ticker instead of training
    #[arg(long)]
    fetch_last: bool,
}

fn load_config(args: &Args) -> Result<ForecastConfig> {
    let mut config = match &args.config {
        Some(path) => ForecastConfig::from_toml_path(path)?,
        None => ForecastConfig::default(),
    };
    if let Some(model) = &args.model {
        config.model = match model.as_str() {
            "recurrent" => ModelKind::Recurrent,
            "linear" => ModelKind::Linear,
            other => {
                return Err(ForecastError::Config(format!(
                    "unknown model \"{}\", expected \"recurrent\" or \"linear\"",
                    other
                )))
            }
        };
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    Ok(config)
}

fn run(args: &Args) -> Result<()> {
    let store = CsvPredictionStore::new(&args.out_dir);

    if args.fetch_last {
        match last_prediction(&store, &args.ticker)? {
            Some(record) => println!("{}", serde_json::to_string_pretty(&record).unwrap()),
            None => println!("[]"),
        }
        return Ok(());
    }

    let config = load_config(args)?;
    println!(
        "Ticker: {}, Start: {}, End: {}",
        args.ticker, args.start, args.end
    );

    let fetcher = CsvBarSource::new(&args.data_dir);
    let request = PredictRequest {
        ticker: args.ticker.clone(),
        start_date: args.start,
        end_date: args.end,
    };
    let record = run_forecast(&fetcher, &store, &request, &config)?;

    println!("\n-----------------------------------");
    println!("Predicted for {} on {}:", record.ticker, record.date);
    if let Some(open) = record.predicted_open {
        println!("  Open : ${:.2}", open);
    }
    println!("  Close: ${:.2}", record.predicted_close);
    println!("-----------------------------------\n");
    println!("{}", serde_json::to_string_pretty(&record).unwrap());

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        if err.is_client_error() {
            eprintln!("{}", err);
        } else {
            error!(%err, "forecast failed");
            eprintln!("internal error, see logs");
        }
        std::process::exit(1);
    }
}
