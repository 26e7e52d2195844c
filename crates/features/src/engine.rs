//! Feature computation engine.
//!
//! Annotates round-trip trades with outcome, size, same-day sequencing, and
//! per-user extreme flags. Computation is batch and pure: identical trades
//! in, identical feature rows out.

use crate::robust::{quantile, robust_z};
use journal_core::config::FeatureConfig;
use journal_core::{FeatureRow, Outcome, RoundTrip};
use tracing::debug;

/// Classify realized PnL against the breakeven tolerance.
///
/// The band is a closed interval: |pnl| == eps is breakeven, not win/loss.
#[inline]
pub fn classify_outcome(pnl: f64, eps: f64) -> Outcome {
    if pnl > eps {
        Outcome::Win
    } else if pnl < -eps {
        Outcome::Loss
    } else {
        Outcome::Breakeven
    }
}

/// Feature computation engine.
pub struct FeatureEngine {
    config: FeatureConfig,
}

impl FeatureEngine {
    /// Create a new feature engine from configuration.
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    /// Compute feature rows for a batch of round-trip trades.
    ///
    /// Output rows are in canonical order: (user_id, trade_date, trade_id).
    /// That order is the "same-day order" every sequencing feature reads.
    pub fn compute(&self, trades: &[RoundTrip]) -> Vec<FeatureRow> {
        let mut sorted: Vec<RoundTrip> = trades.to_vec();
        sorted.sort_by(|a, b| {
            (&a.user_id, a.trade_date, a.trade_id).cmp(&(&b.user_id, b.trade_date, b.trade_id))
        });

        let mut rows: Vec<FeatureRow> = sorted
            .into_iter()
            .map(|trade| {
                let outcome = classify_outcome(trade.realized_pnl, self.config.eps_pnl);
                let notional = trade.qty * trade.entry_price;
                FeatureRow {
                    trade,
                    outcome,
                    notional,
                    size_z: 0.0,
                    prev_outcome_day: None,
                    same_ticker_as_prev_day: false,
                    immediate_after_prev: false,
                    day_trade_count: 0,
                    day_pnl: 0.0,
                    large_win: false,
                    large_loss: false,
                }
            })
            .collect();

        let mut start = 0;
        while start < rows.len() {
            let user = rows[start].trade.user_id.clone();
            let end = start
                + rows[start..]
                    .iter()
                    .position(|r| r.trade.user_id != user)
                    .unwrap_or(rows.len() - start);
            self.user_pass(&mut rows[start..end]);
            start = end;
        }

        debug!(trades = rows.len(), "features computed");
        rows
    }

    /// Per-user features: size z-scores, extremes, and same-day groups.
    fn user_pass(&self, rows: &mut [FeatureRow]) {
        let notionals: Vec<f64> = rows.iter().map(|r| r.notional).collect();
        for (row, z) in rows.iter_mut().zip(robust_z(&notionals)) {
            row.size_z = z;
        }

        // Extremes over the user's full history: thresholds are
        // retrospective, computed once per user, not rolling.
        let wins: Vec<f64> = rows
            .iter()
            .map(|r| r.trade.realized_pnl)
            .filter(|&p| p > 0.0)
            .collect();
        if let Some(thr) = quantile(&wins, self.config.large_win_pct) {
            for row in rows.iter_mut() {
                let pnl = row.trade.realized_pnl;
                row.large_win = pnl > 0.0 && pnl >= thr;
            }
        }
        let loss_magnitudes: Vec<f64> = rows
            .iter()
            .map(|r| r.trade.realized_pnl)
            .filter(|&p| p < 0.0)
            .map(f64::abs)
            .collect();
        if let Some(thr) = quantile(&loss_magnitudes, self.config.large_loss_pct) {
            for row in rows.iter_mut() {
                let pnl = row.trade.realized_pnl;
                row.large_loss = pnl < 0.0 && pnl.abs() >= thr;
            }
        }

        let mut start = 0;
        while start < rows.len() {
            let date = rows[start].trade.trade_date;
            let end = start
                + rows[start..]
                    .iter()
                    .position(|r| r.trade.trade_date != date)
                    .unwrap_or(rows.len() - start);
            day_pass(&mut rows[start..end]);
            start = end;
        }
    }
}

/// Same-day sequencing and day aggregates for one (user, date) group.
fn day_pass(rows: &mut [FeatureRow]) {
    let count = rows.len() as u32;
    let pnl: f64 = rows.iter().map(|r| r.trade.realized_pnl).sum();

    let prev: Vec<(Outcome, String)> = rows
        .iter()
        .map(|r| (r.outcome, r.trade.ticker.clone()))
        .collect();

    for (i, row) in rows.iter_mut().enumerate() {
        row.day_trade_count = count;
        row.day_pnl = pnl;
        if i > 0 {
            let (prev_outcome, prev_ticker) = &prev[i - 1];
            row.prev_outcome_day = Some(*prev_outcome);
            row.same_ticker_as_prev_day = row.trade.ticker == *prev_ticker;
            // "immediate" means strictly the previous row in the canonical
            // sort order, so only a group's first row is ever false.
            row.immediate_after_prev = true;
        }
    }
}
