//! Day-scope rules: one tag per qualifying (user, day).

use chrono::NaiveDate;
use journal_core::{vocab, FeatureRow, Outcome, PipelineConfig, Tag};
use std::collections::BTreeMap;

/// Group feature rows by (user, day). BTreeMap keeps emission order
/// deterministic regardless of input order.
fn day_groups(features: &[FeatureRow]) -> BTreeMap<(&str, NaiveDate), Vec<&FeatureRow>> {
    let mut groups: BTreeMap<(&str, NaiveDate), Vec<&FeatureRow>> = BTreeMap::new();
    for f in features {
        groups
            .entry((f.trade.user_id.as_str(), f.trade.trade_date))
            .or_default()
            .push(f);
    }
    groups
}

/// Group feature rows by (user, ticker).
fn ticker_groups(features: &[FeatureRow]) -> BTreeMap<(&str, &str), Vec<&FeatureRow>> {
    let mut groups: BTreeMap<(&str, &str), Vec<&FeatureRow>> = BTreeMap::new();
    for f in features {
        groups
            .entry((f.trade.user_id.as_str(), f.trade.ticker.as_str()))
            .or_default()
            .push(f);
    }
    groups
}

fn day_pnl(rows: &[&FeatureRow]) -> f64 {
    rows.iter().map(|f| f.trade.realized_pnl).sum()
}

/// High trade count for one day.
pub fn overtrading_day(features: &[FeatureRow], cfg: &PipelineConfig) -> Vec<Tag> {
    day_groups(features)
        .into_iter()
        .filter(|(_, rows)| rows.len() as u32 >= cfg.rules.overtrading_min_trades)
        .map(|((user, date), rows)| {
            Tag::day(
                user,
                date,
                vocab::OVERTRADING_DAY,
                0.8,
                format!("{} trades; day PnL ${:.2}", rows.len(), day_pnl(&rows)),
            )
        })
        .collect()
}

/// Loss-anchored high-activity episode: either an immediate re-entry after
/// a loss happened that day, or the day mixes losses with heavy activity.
pub fn revenge_day(features: &[FeatureRow], cfg: &PipelineConfig) -> Vec<Tag> {
    let eps = cfg.features.eps_pnl;
    day_groups(features)
        .into_iter()
        .filter_map(|((user, date), rows)| {
            let has_revenge = rows
                .iter()
                .any(|f| f.prev_outcome_day == Some(Outcome::Loss) && f.immediate_after_prev);
            let has_loss = rows.iter().any(|f| f.trade.realized_pnl < -eps);
            let many_trades = rows.len() as u32 >= cfg.rules.overtrading_min_trades;
            if has_revenge || (has_loss && many_trades) {
                Some(Tag::day(
                    user,
                    date,
                    vocab::REVENGE_DAY,
                    0.75,
                    format!("Loss-anchored high-activity episode ({} trades)", rows.len()),
                ))
            } else {
                None
            }
        })
        .collect()
}

/// High activity with nothing to show for it. Fires alongside
/// overtrading_day when both qualify.
pub fn chop_day(features: &[FeatureRow], cfg: &PipelineConfig) -> Vec<Tag> {
    day_groups(features)
        .into_iter()
        .filter_map(|((user, date), rows)| {
            let pnl = day_pnl(&rows);
            let many_trades = rows.len() as u32 >= cfg.rules.overtrading_min_trades;
            if many_trades && pnl.abs() <= cfg.rules.chop_abs_pnl_max {
                Some(Tag::day(
                    user,
                    date,
                    vocab::CHOP_DAY,
                    0.6,
                    format!("High activity ({}) with flat PnL ${:.2}", rows.len(), pnl),
                ))
            } else {
                None
            }
        })
        .collect()
}

/// Ticker bias: lifetime and recent-window negative expectancy.
///
/// Both variants tag every distinct trade date touching the ticker, and
/// fire independently when both qualify.
pub fn ticker_bias(features: &[FeatureRow], cfg: &PipelineConfig) -> Vec<Tag> {
    let mut tags = Vec::new();
    for ((user, ticker), mut rows) in ticker_groups(features) {
        let n = rows.len() as u32;
        let total: f64 = rows.iter().map(|f| f.trade.realized_pnl).sum();
        let mean = total / n as f64;

        let mut dates: Vec<NaiveDate> = rows.iter().map(|f| f.trade.trade_date).collect();
        dates.sort_unstable();
        dates.dedup();

        if n >= cfg.rules.ticker_bias_min_trades && mean <= cfg.rules.ticker_bias_mean_pnl_max {
            for &date in &dates {
                tags.push(Tag::day(
                    user,
                    date,
                    vocab::TICKER_BIAS_LIFETIME,
                    0.8,
                    format!(
                        "Ticker {ticker} negative expectancy (n={n}, avg ${mean:.2}, total ${total:.2})"
                    ),
                ));
            }
        }

        rows.sort_by_key(|f| (f.trade.trade_date, f.trade.trade_id));
        let window = cfg.rules.ticker_bias_recent_k as usize;
        let recent: Vec<f64> = rows
            .iter()
            .rev()
            .take(window)
            .map(|f| f.trade.realized_pnl)
            .collect();
        if !recent.is_empty() {
            let recent_mean = recent.iter().sum::<f64>() / recent.len() as f64;
            if recent_mean <= cfg.rules.ticker_bias_recent_mean_max {
                for &date in &dates {
                    tags.push(Tag::day(
                        user,
                        date,
                        vocab::TICKER_BIAS_RECENT,
                        0.7,
                        format!(
                            "Ticker {ticker}: last {} trades mean ${recent_mean:.2}",
                            recent.len()
                        ),
                    ));
                }
            }
        }
    }
    tags
}

/// Day concentrated on one ticker, or nearly so.
pub fn focused_day(features: &[FeatureRow], cfg: &PipelineConfig) -> Vec<Tag> {
    day_groups(features)
        .into_iter()
        .filter_map(|((user, date), rows)| {
            let n_trades = rows.len() as u32;
            let pnl = day_pnl(&rows);

            let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
            for f in &rows {
                *counts.entry(f.trade.ticker.as_str()).or_default() += 1;
            }
            let distinct = counts.len();

            let confidence = if distinct == 1 {
                if pnl > 0.0 {
                    if n_trades <= cfg.rules.focused_single_ticker_max_trades {
                        1.0
                    } else {
                        0.85
                    }
                } else {
                    0.6
                }
            } else {
                let top = counts.values().max().copied().unwrap_or(0);
                if top as f64 / n_trades as f64 >= cfg.rules.focused_dominant_frac {
                    0.5
                } else {
                    0.0
                }
            };

            (confidence > 0.0).then(|| {
                Tag::day(
                    user,
                    date,
                    vocab::FOCUSED_DAY,
                    confidence,
                    format!("{distinct} tickers, PnL {pnl:.2}, trades={n_trades}"),
                )
            })
        })
        .collect()
}

/// Profitable day with low activity; confidence tiers by day PnL.
pub fn green_day_low_activity(features: &[FeatureRow], cfg: &PipelineConfig) -> Vec<Tag> {
    day_groups(features)
        .into_iter()
        .filter_map(|((user, date), rows)| {
            let n_trades = rows.len() as u32;
            let pnl = day_pnl(&rows);
            if n_trades > cfg.rules.green_day_max_trades || pnl <= 0.0 {
                return None;
            }
            let confidence = if pnl >= cfg.rules.green_day_strong_pnl {
                1.0
            } else if pnl >= cfg.rules.green_day_moderate_pnl {
                0.8
            } else {
                0.6
            };
            Some(Tag::day(
                user,
                date,
                vocab::GREEN_DAY_LOW_ACTIVITY,
                confidence,
                format!("{n_trades} trades, PnL {pnl:.2}"),
            ))
        })
        .collect()
}
