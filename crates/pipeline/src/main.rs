//! Command-line entry point for the behavior pipeline.

use anyhow::Result;
use clap::Parser;
use journal_core::PipelineConfig;
use journal_pipeline::{output, run_ledger_file};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "journal",
    about = "Reconstruct round-trip trades from a raw brokerage ledger and tag behavioral patterns."
)]
struct Args {
    /// Raw ledger CSV (date, ticker, action, quantity, price, amount).
    ledger: PathBuf,

    /// User id attached to every row.
    #[arg(long, default_value = "demo_user")]
    user: String,

    /// Directory for the output tables.
    #[arg(long, default_value = "out")]
    out_dir: PathBuf,

    /// JSON file overriding default tunables.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep day scores off the trade score rows.
    #[arg(long)]
    no_day_propagation: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if args.no_day_propagation {
        config.labels.propagate_day_to_trades = false;
    }

    let result = run_ledger_file(&args.ledger, &args.user, &config)?;

    fs::create_dir_all(&args.out_dir)?;
    output::write_trades_csv(args.out_dir.join("trades.csv"), &result.trades)?;
    output::write_cash_events_csv(args.out_dir.join("cash_events.csv"), &result.cash_events)?;
    output::write_features_csv(args.out_dir.join("trade_features.csv"), &result.features)?;
    output::write_tags_csv(args.out_dir.join("tags.csv"), &result.tags)?;
    output::write_scores_csv(args.out_dir.join("trade_scores.csv"), &result.labels.trade_scores)?;
    output::write_scores_csv(args.out_dir.join("day_scores.csv"), &result.labels.day_scores)?;
    output::write_scores_csv(
        args.out_dir.join("trade_scores_with_day.csv"),
        &result.labels.trade_scores_with_day,
    )?;

    info!(
        trades = result.trades.len(),
        cash_events = result.cash_events.len(),
        tags = result.tags.len(),
        out_dir = %args.out_dir.display(),
        "pipeline complete"
    );
    Ok(())
}
