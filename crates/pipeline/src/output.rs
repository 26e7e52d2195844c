//! CSV writers for the pipeline's output tables.
//!
//! Column order is part of the downstream contract; every writer spells
//! its header explicitly instead of relying on struct field order.

use journal_core::{CashEvent, FeatureRow, Outcome, Result, RoundTrip, Tag, TagScope};
use journal_labels::ScoreMatrix;
use std::path::Path;

/// Write the round-trip trades table.
pub fn write_trades_csv(path: impl AsRef<Path>, trades: &[RoundTrip]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "trade_id",
        "user_id",
        "trade_date",
        "ticker",
        "side",
        "qty",
        "entry_price",
        "exit_price",
        "fees",
        "realized_pnl",
    ])?;
    for t in trades {
        writer.write_record([
            t.trade_id.to_string(),
            t.user_id.clone(),
            t.trade_date.to_string(),
            t.ticker.clone(),
            t.side.as_str().to_string(),
            t.qty.to_string(),
            t.entry_price.to_string(),
            t.exit_price.to_string(),
            t.fees.to_string(),
            t.realized_pnl.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the cash events table.
pub fn write_cash_events_csv(path: impl AsRef<Path>, events: &[CashEvent]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["event_id", "user_id", "date", "event_type", "amount", "note"])?;
    for e in events {
        writer.write_record([
            e.event_id.to_string(),
            e.user_id.clone(),
            e.date.to_string(),
            e.kind.as_str().to_string(),
            e.amount.to_string(),
            e.note.clone(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the annotated feature table.
pub fn write_features_csv(path: impl AsRef<Path>, features: &[FeatureRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "trade_id",
        "user_id",
        "trade_date",
        "ticker",
        "side",
        "qty",
        "entry_price",
        "exit_price",
        "fees",
        "realized_pnl",
        "outcome",
        "notional",
        "size_z",
        "prev_outcome_day",
        "same_ticker_as_prev_day",
        "immediate_after_prev",
        "day_trade_count",
        "day_pnl",
        "large_win",
        "large_loss",
    ])?;
    for f in features {
        let t = &f.trade;
        writer.write_record([
            t.trade_id.to_string(),
            t.user_id.clone(),
            t.trade_date.to_string(),
            t.ticker.clone(),
            t.side.as_str().to_string(),
            t.qty.to_string(),
            t.entry_price.to_string(),
            t.exit_price.to_string(),
            t.fees.to_string(),
            t.realized_pnl.to_string(),
            f.outcome.as_str().to_string(),
            f.notional.to_string(),
            f.size_z.to_string(),
            f.prev_outcome_day.map(Outcome::as_str).unwrap_or("").to_string(),
            f.same_ticker_as_prev_day.to_string(),
            f.immediate_after_prev.to_string(),
            f.day_trade_count.to_string(),
            f.day_pnl.to_string(),
            f.large_win.to_string(),
            f.large_loss.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the tall tags table.
pub fn write_tags_csv(path: impl AsRef<Path>, tags: &[Tag]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "user_id",
        "trade_id",
        "trade_date",
        "tag",
        "confidence",
        "rationale",
        "scope",
        "source",
    ])?;
    for tag in tags {
        writer.write_record([
            tag.user_id.clone(),
            tag.trade_id.map(|id| id.to_string()).unwrap_or_default(),
            tag.trade_date.to_string(),
            tag.tag.clone(),
            tag.confidence.to_string(),
            tag.rationale.clone(),
            tag.scope.as_str().to_string(),
            tag.source.as_str().to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a score matrix; identity columns depend on the entity kind.
pub fn write_scores_csv(path: impl AsRef<Path>, matrix: &ScoreMatrix) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header: Vec<&str> = match matrix.entity {
        TagScope::Trade => vec!["user_id", "trade_id", "trade_date", "ticker"],
        TagScope::Day => vec!["user_id", "trade_date"],
    };
    header.extend(matrix.tags.iter());
    writer.write_record(&header)?;

    for row in &matrix.rows {
        let mut record: Vec<String> = match matrix.entity {
            TagScope::Trade => vec![
                row.user_id.clone(),
                row.trade_id.map(|id| id.to_string()).unwrap_or_default(),
                row.trade_date.to_string(),
                row.ticker.clone().unwrap_or_default(),
            ],
            TagScope::Day => vec![row.user_id.clone(), row.trade_date.to_string()],
        };
        record.extend(row.scores.iter().map(|s| s.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
