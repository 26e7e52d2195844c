//! Trade-scope rules: one tag per qualifying trade.

use journal_core::{vocab, FeatureRow, Outcome, PipelineConfig, Tag};

/// Tag every trade with its outcome class.
pub fn outcome(features: &[FeatureRow], _cfg: &PipelineConfig) -> Vec<Tag> {
    features
        .iter()
        .map(|f| match f.outcome {
            Outcome::Win => Tag::trade(
                f,
                vocab::OUTCOME_WIN,
                0.9,
                format!("Win: PnL ${:.2}", f.trade.realized_pnl),
            ),
            Outcome::Loss => Tag::trade(
                f,
                vocab::OUTCOME_LOSS,
                0.9,
                format!("Loss: PnL ${:.2}", f.trade.realized_pnl),
            ),
            Outcome::Breakeven => Tag::trade(
                f,
                vocab::OUTCOME_BREAKEVEN,
                0.8,
                "Breakeven within tolerance".to_string(),
            ),
        })
        .collect()
}

/// Tag extreme wins and losses (per-user top deciles).
pub fn large_win_loss(features: &[FeatureRow], _cfg: &PipelineConfig) -> Vec<Tag> {
    let mut tags = Vec::new();
    for f in features {
        if f.large_win {
            tags.push(Tag::trade(
                f,
                vocab::LARGE_WIN,
                0.75,
                format!("Top-decile win (PnL ${:.2})", f.trade.realized_pnl),
            ));
        }
        if f.large_loss {
            tags.push(Tag::trade(
                f,
                vocab::LARGE_LOSS,
                0.85,
                format!("Worst-decile loss (PnL ${:.2})", f.trade.realized_pnl),
            ));
        }
    }
    tags
}

/// Immediate re-entry after a same-day loss; stronger when the same ticker
/// is revisited.
pub fn revenge_immediate(features: &[FeatureRow], _cfg: &PipelineConfig) -> Vec<Tag> {
    features
        .iter()
        .filter(|f| f.prev_outcome_day == Some(Outcome::Loss) && f.immediate_after_prev)
        .map(|f| {
            let (confidence, suffix) = if f.same_ticker_as_prev_day {
                (0.9, " (same ticker)")
            } else {
                (0.75, "")
            };
            Tag::trade(
                f,
                vocab::REVENGE_IMMEDIATE,
                confidence,
                format!("Immediate re-entry after loss{suffix}"),
            )
        })
        .collect()
}

/// Position size far above the user's typical notional.
pub fn size_inconsistency(features: &[FeatureRow], cfg: &PipelineConfig) -> Vec<Tag> {
    features
        .iter()
        .filter(|f| f.size_z >= cfg.rules.size_z_threshold)
        .map(|f| {
            Tag::trade(
                f,
                vocab::SIZE_INCONSISTENCY,
                0.75,
                format!(
                    "Size {:.1}σ above median (notional ${:.0})",
                    f.size_z, f.notional
                ),
            )
        })
        .collect()
}

/// Immediate continuation after a same-day win.
pub fn follow_through_win_immediate(features: &[FeatureRow], _cfg: &PipelineConfig) -> Vec<Tag> {
    features
        .iter()
        .filter(|f| f.prev_outcome_day == Some(Outcome::Win) && f.immediate_after_prev)
        .map(|f| {
            let (confidence, suffix) = if f.same_ticker_as_prev_day {
                (0.85, " (same ticker)")
            } else {
                (0.7, "")
            };
            Tag::trade(
                f,
                vocab::FOLLOW_THROUGH_WIN_IMMEDIATE,
                confidence,
                format!("Immediate follow-through after win{suffix}"),
            )
        })
        .collect()
}

/// Re-entry after a loss with size held near the user's typical notional.
pub fn disciplined_after_loss_immediate(features: &[FeatureRow], cfg: &PipelineConfig) -> Vec<Tag> {
    features
        .iter()
        .filter(|f| {
            f.prev_outcome_day == Some(Outcome::Loss)
                && f.immediate_after_prev
                && f.size_z <= cfg.rules.disciplined_size_z_max
        })
        .map(|f| {
            Tag::trade(
                f,
                vocab::DISCIPLINED_AFTER_LOSS_IMMEDIATE,
                0.8,
                format!(
                    "Composed re-entry after loss (size {:.1}σ, within discipline)",
                    f.size_z
                ),
            )
        })
        .collect()
}

/// Position size within the consistent-sizing band.
pub fn consistent_size(features: &[FeatureRow], cfg: &PipelineConfig) -> Vec<Tag> {
    features
        .iter()
        .filter(|f| f.size_z.abs() <= cfg.rules.consistent_size_z_abs_max)
        .map(|f| {
            Tag::trade(
                f,
                vocab::CONSISTENT_SIZE,
                0.6,
                format!("Consistent position sizing ({:.1}σ from typical)", f.size_z),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use journal_core::{RoundTrip, TradeId, TradeSide};

    fn cfg() -> PipelineConfig {
        PipelineConfig::default()
    }

    fn row(id: TradeId, ticker: &str, pnl: f64) -> FeatureRow {
        let eps = cfg().features.eps_pnl;
        FeatureRow {
            trade: RoundTrip {
                trade_id: id,
                user_id: "u1".to_string(),
                trade_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                ticker: ticker.to_string(),
                side: TradeSide::Long,
                qty: 1.0,
                entry_price: 100.0,
                exit_price: 100.0 + pnl,
                fees: 0.0,
                realized_pnl: pnl,
            },
            outcome: if pnl > eps {
                Outcome::Win
            } else if pnl < -eps {
                Outcome::Loss
            } else {
                Outcome::Breakeven
            },
            notional: 100.0,
            size_z: 0.0,
            prev_outcome_day: None,
            same_ticker_as_prev_day: false,
            immediate_after_prev: false,
            day_trade_count: 1,
            day_pnl: pnl,
            large_win: false,
            large_loss: false,
        }
    }

    #[test]
    fn test_outcome_tags_and_confidences() {
        let rows = vec![row(1, "AAA", 10.0), row(2, "AAA", -10.0), row(3, "AAA", 0.5)];
        let tags = outcome(&rows, &cfg());

        assert_eq!(tags.len(), 3);
        assert_eq!(tags[0].tag, vocab::OUTCOME_WIN);
        assert_eq!(tags[0].confidence, 0.9);
        assert!(tags[0].rationale.contains("10.00"));
        assert_eq!(tags[1].tag, vocab::OUTCOME_LOSS);
        assert_eq!(tags[1].confidence, 0.9);
        assert_eq!(tags[2].tag, vocab::OUTCOME_BREAKEVEN);
        assert_eq!(tags[2].confidence, 0.8);
    }

    #[test]
    fn test_large_win_loss_flags() {
        let mut win = row(1, "AAA", 500.0);
        win.large_win = true;
        let mut loss = row(2, "AAA", -400.0);
        loss.large_loss = true;
        let tags = large_win_loss(&[win, loss, row(3, "AAA", 5.0)], &cfg());

        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].tag, vocab::LARGE_WIN);
        assert_eq!(tags[0].confidence, 0.75);
        assert_eq!(tags[1].tag, vocab::LARGE_LOSS);
        assert_eq!(tags[1].confidence, 0.85);
    }

    #[test]
    fn test_revenge_immediate_same_ticker_stronger() {
        let mut same = row(2, "AAA", 5.0);
        same.prev_outcome_day = Some(Outcome::Loss);
        same.immediate_after_prev = true;
        same.same_ticker_as_prev_day = true;
        let mut other = row(3, "BBB", 5.0);
        other.prev_outcome_day = Some(Outcome::Loss);
        other.immediate_after_prev = true;

        let tags = revenge_immediate(&[same, other], &cfg());
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].confidence, 0.9);
        assert!(tags[0].rationale.contains("same ticker"));
        assert_eq!(tags[1].confidence, 0.75);
    }

    #[test]
    fn test_revenge_requires_immediacy() {
        let mut gap = row(2, "AAA", 5.0);
        gap.prev_outcome_day = Some(Outcome::Loss);
        gap.immediate_after_prev = false;
        assert!(revenge_immediate(&[gap], &cfg()).is_empty());
    }

    #[test]
    fn test_size_inconsistency_threshold() {
        let mut big = row(1, "AAA", 0.0);
        big.size_z = 2.0; // threshold is inclusive
        let mut small = row(2, "AAA", 0.0);
        small.size_z = 1.9;

        let tags = size_inconsistency(&[big, small], &cfg());
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].trade_id, Some(1));
        assert!(tags[0].rationale.contains("2.0"));
    }

    #[test]
    fn test_follow_through_confidences() {
        let mut same = row(2, "AAA", 5.0);
        same.prev_outcome_day = Some(Outcome::Win);
        same.immediate_after_prev = true;
        same.same_ticker_as_prev_day = true;
        let mut other = row(3, "BBB", 3.0);
        other.prev_outcome_day = Some(Outcome::Win);
        other.immediate_after_prev = true;

        let tags = follow_through_win_immediate(&[same, other], &cfg());
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].confidence, 0.85);
        assert_eq!(tags[1].confidence, 0.7);
    }

    #[test]
    fn test_disciplined_needs_small_size() {
        let mut disciplined = row(2, "AAA", 5.0);
        disciplined.prev_outcome_day = Some(Outcome::Loss);
        disciplined.immediate_after_prev = true;
        disciplined.size_z = 0.3;
        let mut oversized = row(3, "AAA", 5.0);
        oversized.prev_outcome_day = Some(Outcome::Loss);
        oversized.immediate_after_prev = true;
        oversized.size_z = 1.5;

        let tags = disciplined_after_loss_immediate(&[disciplined, oversized], &cfg());
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].trade_id, Some(2));
        assert_eq!(tags[0].confidence, 0.8);
    }

    #[test]
    fn test_consistent_size_band_is_two_sided() {
        let mut under = row(1, "AAA", 0.0);
        under.size_z = -0.4;
        let mut over = row(2, "AAA", 0.0);
        over.size_z = 0.5;
        let mut outside = row(3, "AAA", 0.0);
        outside.size_z = -0.6;

        let tags = consistent_size(&[under, over, outside], &cfg());
        let ids: Vec<Option<TradeId>> = tags.iter().map(|t| t.trade_id).collect();
        assert_eq!(ids, vec![Some(1), Some(2)]);
        assert!(tags.iter().all(|t| t.confidence == 0.6));
    }
}
