//! End-to-end orchestration of the behavior pipeline.
//!
//! Raw ledger -> executions -> round-trips -> features -> tags -> labels.
//! Each stage fully materializes its output before the next starts; the
//! pipeline is synchronous, batch-oriented, and owns its input for the
//! duration of a call.

pub mod output;

use journal_core::{CashEvent, Execution, FeatureRow, PipelineConfig, Result, RoundTrip, Tag};
use journal_features::FeatureEngine;
use journal_ingestion::{load_ledger, match_round_trips};
use journal_labels::{LabelBuilder, LabelSet};
use journal_rules::RuleEngine;
use std::path::Path;
use tracing::info;

/// All tables produced by one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub trades: Vec<RoundTrip>,
    pub cash_events: Vec<CashEvent>,
    pub features: Vec<FeatureRow>,
    pub tags: Vec<Tag>,
    pub labels: LabelSet,
}

/// Run the full pipeline over parsed executions and cash events.
///
/// Executions may arrive in any order; they are re-sorted into the
/// (user, ticker, date) matching order with input order breaking ties.
pub fn run(
    executions: &[Execution],
    cash_events: Vec<CashEvent>,
    config: &PipelineConfig,
) -> PipelineOutput {
    let mut executions = executions.to_vec();
    executions.sort_by(|a, b| (&a.user_id, &a.ticker, a.date).cmp(&(&b.user_id, &b.ticker, b.date)));

    let trades = match_round_trips(&executions, config.matching.qty_tolerance);
    info!(
        executions = executions.len(),
        trades = trades.len(),
        "round-trips matched"
    );

    let features = FeatureEngine::new(config.features.clone()).compute(&trades);
    let tags = RuleEngine::new(config.clone()).evaluate(&features);
    info!(features = features.len(), tags = tags.len(), "rules evaluated");

    let labels = LabelBuilder::new(config.labels.clone()).build(&trades, &tags);

    PipelineOutput {
        trades,
        cash_events,
        features,
        tags,
        labels,
    }
}

/// Run the full pipeline over a raw ledger file.
pub fn run_ledger_file(
    path: impl AsRef<Path>,
    user_id: &str,
    config: &PipelineConfig,
) -> Result<PipelineOutput> {
    let ledger = load_ledger(path, user_id)?;
    Ok(run(&ledger.executions, ledger.cash_events, config))
}
