//! Pivot tags into wide confidence-score matrices.

use chrono::NaiveDate;
use journal_core::config::LabelConfig;
use journal_core::{vocab, RoundTrip, Tag, TagScope, TradeId, UserId};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// One row of a score matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRow {
    pub user_id: UserId,
    /// Present for trade-entity rows, None for day-entity rows.
    pub trade_id: Option<TradeId>,
    pub trade_date: NaiveDate,
    /// Present for trade-entity rows.
    pub ticker: Option<String>,
    /// Confidence per tag, aligned with the matrix column list.
    pub scores: Vec<f64>,
}

/// A wide confidence matrix: one row per entity, one column per tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreMatrix {
    /// Whether rows are trades or days.
    pub entity: TagScope,
    /// Column names, in output order.
    pub tags: Vec<&'static str>,
    pub rows: Vec<ScoreRow>,
}

impl ScoreMatrix {
    /// Look up a score by row index and tag name.
    pub fn get(&self, row: usize, tag: &str) -> Option<f64> {
        let col = self.tags.iter().position(|t| *t == tag)?;
        Some(self.rows.get(row)?.scores[col])
    }
}

/// The three matrices produced by one build.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSet {
    /// One row per trade, trade-tag columns.
    pub trade_scores: ScoreMatrix,
    /// One row per (user, day), day-tag columns.
    pub day_scores: ScoreMatrix,
    /// Trade rows with day columns appended (or a copy of trade_scores
    /// when propagation is off).
    pub trade_scores_with_day: ScoreMatrix,
}

/// Score-matrix builder.
pub struct LabelBuilder {
    config: LabelConfig,
}

impl LabelBuilder {
    /// Create a new label builder from configuration.
    pub fn new(config: LabelConfig) -> Self {
        Self { config }
    }

    /// Pivot tags into score matrices over the full trade roster.
    ///
    /// Duplicate (entity, tag) pairs aggregate by max confidence. Every
    /// trade and every distinct (user, day) gets a row even with all-zero
    /// scores. Tags outside the vocabulary are dropped silently.
    pub fn build(&self, trades: &[RoundTrip], tags: &[Tag]) -> LabelSet {
        // max-aggregate confidences per entity and tag
        let mut trade_conf: HashMap<(&str, TradeId, &str), f64> = HashMap::new();
        let mut day_conf: HashMap<(&str, NaiveDate, &str), f64> = HashMap::new();
        let mut dropped = 0usize;
        for tag in tags {
            match (tag.scope, tag.trade_id) {
                (TagScope::Trade, Some(trade_id)) => {
                    match vocab::TRADE_TAGS.iter().find(|t| **t == tag.tag) {
                        Some(name) => {
                            let cell = trade_conf
                                .entry((tag.user_id.as_str(), trade_id, *name))
                                .or_insert(0.0);
                            *cell = cell.max(tag.confidence);
                        }
                        None => dropped += 1,
                    }
                }
                (TagScope::Day, _) => match vocab::DAY_TAGS.iter().find(|t| **t == tag.tag) {
                    Some(name) => {
                        let cell = day_conf
                            .entry((tag.user_id.as_str(), tag.trade_date, *name))
                            .or_insert(0.0);
                        *cell = cell.max(tag.confidence);
                    }
                    None => dropped += 1,
                },
                // trade scope without a trade id cannot be joined
                (TagScope::Trade, None) => dropped += 1,
            }
        }
        if dropped > 0 {
            debug!(dropped, "tags outside the vocabulary were dropped");
        }

        // trade roster: one row per trade, in input order
        let trade_rows: Vec<ScoreRow> = trades
            .iter()
            .map(|t| ScoreRow {
                user_id: t.user_id.clone(),
                trade_id: Some(t.trade_id),
                trade_date: t.trade_date,
                ticker: Some(t.ticker.clone()),
                scores: vocab::TRADE_TAGS
                    .iter()
                    .map(|tag| {
                        trade_conf
                            .get(&(t.user_id.as_str(), t.trade_id, *tag))
                            .copied()
                            .unwrap_or(0.0)
                    })
                    .collect(),
            })
            .collect();

        // day roster: every distinct (user, day), in first-appearance order
        let mut days: Vec<(&str, NaiveDate)> = Vec::new();
        for t in trades {
            let key = (t.user_id.as_str(), t.trade_date);
            if !days.contains(&key) {
                days.push(key);
            }
        }
        let day_rows: Vec<ScoreRow> = days
            .iter()
            .map(|&(user, date)| ScoreRow {
                user_id: user.to_string(),
                trade_id: None,
                trade_date: date,
                ticker: None,
                scores: vocab::DAY_TAGS
                    .iter()
                    .map(|tag| day_conf.get(&(user, date, *tag)).copied().unwrap_or(0.0))
                    .collect(),
            })
            .collect();

        let trade_scores = ScoreMatrix {
            entity: TagScope::Trade,
            tags: vocab::TRADE_TAGS.to_vec(),
            rows: trade_rows,
        };
        let day_scores = ScoreMatrix {
            entity: TagScope::Day,
            tags: vocab::DAY_TAGS.to_vec(),
            rows: day_rows,
        };

        let trade_scores_with_day = if self.config.propagate_day_to_trades {
            let rows = trade_scores
                .rows
                .iter()
                .map(|row| {
                    let mut scores = row.scores.clone();
                    scores.extend(vocab::DAY_TAGS.iter().map(|tag| {
                        day_conf
                            .get(&(row.user_id.as_str(), row.trade_date, *tag))
                            .copied()
                            .unwrap_or(0.0)
                    }));
                    ScoreRow {
                        scores,
                        ..row.clone()
                    }
                })
                .collect();
            ScoreMatrix {
                entity: TagScope::Trade,
                tags: vocab::TRADE_TAGS
                    .iter()
                    .chain(vocab::DAY_TAGS.iter())
                    .copied()
                    .collect(),
                rows,
            }
        } else {
            trade_scores.clone()
        };

        LabelSet {
            trade_scores,
            day_scores,
            trade_scores_with_day,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journal_core::TradeSide;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn trade(id: TradeId, user: &str, day: u32, ticker: &str) -> RoundTrip {
        RoundTrip {
            trade_id: id,
            user_id: user.to_string(),
            trade_date: d(day),
            ticker: ticker.to_string(),
            side: TradeSide::Long,
            qty: 1.0,
            entry_price: 100.0,
            exit_price: 101.0,
            fees: 0.0,
            realized_pnl: 1.0,
        }
    }

    fn trade_tag(id: TradeId, day: u32, tag: &str, confidence: f64) -> Tag {
        Tag {
            user_id: "u1".to_string(),
            trade_id: Some(id),
            trade_date: d(day),
            tag: tag.to_string(),
            confidence,
            rationale: String::new(),
            scope: TagScope::Trade,
            source: journal_core::TagSource::Rule,
        }
    }

    fn builder(propagate: bool) -> LabelBuilder {
        LabelBuilder::new(LabelConfig {
            propagate_day_to_trades: propagate,
        })
    }

    #[test]
    fn test_empty_tags_full_rosters_all_zero() {
        let trades = vec![
            trade(1, "u1", 1, "AAA"),
            trade(2, "u1", 1, "BBB"),
            trade(3, "u1", 2, "AAA"),
        ];
        let labels = builder(true).build(&trades, &[]);

        assert_eq!(labels.trade_scores.tags.len(), vocab::TRADE_TAGS.len());
        assert_eq!(labels.trade_scores.rows.len(), 3);
        assert_eq!(labels.day_scores.rows.len(), 2); // two distinct days
        assert!(labels
            .trade_scores
            .rows
            .iter()
            .all(|r| r.scores.iter().all(|&s| s == 0.0)));
        assert!(labels
            .day_scores
            .rows
            .iter()
            .all(|r| r.scores.iter().all(|&s| s == 0.0)));
    }

    #[test]
    fn test_duplicate_tags_take_max() {
        let trades = vec![trade(1, "u1", 1, "AAA")];
        let tags = vec![
            trade_tag(1, 1, vocab::OUTCOME_WIN, 0.5),
            trade_tag(1, 1, vocab::OUTCOME_WIN, 0.9),
            trade_tag(1, 1, vocab::OUTCOME_WIN, 0.7),
        ];
        let labels = builder(false).build(&trades, &tags);
        assert_eq!(labels.trade_scores.get(0, vocab::OUTCOME_WIN), Some(0.9));
    }

    #[test]
    fn test_unknown_tag_dropped() {
        let trades = vec![trade(1, "u1", 1, "AAA")];
        let tags = vec![trade_tag(1, 1, "not_in_vocabulary", 1.0)];
        let labels = builder(false).build(&trades, &tags);
        assert!(labels.trade_scores.rows[0].scores.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_day_scores_join_by_user_and_date() {
        let trades = vec![trade(1, "u1", 1, "AAA"), trade(2, "u1", 2, "AAA")];
        let tags = vec![Tag::day(
            "u1",
            d(1),
            vocab::OVERTRADING_DAY,
            0.8,
            "6 trades".to_string(),
        )];
        let labels = builder(true).build(&trades, &tags);

        assert_eq!(labels.day_scores.get(0, vocab::OVERTRADING_DAY), Some(0.8));
        assert_eq!(labels.day_scores.get(1, vocab::OVERTRADING_DAY), Some(0.0));
    }

    #[test]
    fn test_propagation_appends_day_columns() {
        let trades = vec![trade(1, "u1", 1, "AAA"), trade(2, "u1", 2, "AAA")];
        let tags = vec![
            trade_tag(1, 1, vocab::OUTCOME_WIN, 0.9),
            Tag::day("u1", d(1), vocab::CHOP_DAY, 0.6, "flat".to_string()),
        ];
        let labels = builder(true).build(&trades, &tags);

        let with_day = &labels.trade_scores_with_day;
        assert_eq!(
            with_day.tags.len(),
            vocab::TRADE_TAGS.len() + vocab::DAY_TAGS.len()
        );
        assert_eq!(with_day.get(0, vocab::OUTCOME_WIN), Some(0.9));
        assert_eq!(with_day.get(0, vocab::CHOP_DAY), Some(0.6));
        // trade on a different day gets zero for the day tag
        assert_eq!(with_day.get(1, vocab::CHOP_DAY), Some(0.0));
    }

    #[test]
    fn test_no_propagation_copies_trade_scores() {
        let trades = vec![trade(1, "u1", 1, "AAA")];
        let tags = vec![Tag::day(
            "u1",
            d(1),
            vocab::CHOP_DAY,
            0.6,
            "flat".to_string(),
        )];
        let labels = builder(false).build(&trades, &tags);
        assert_eq!(labels.trade_scores_with_day, labels.trade_scores);
    }

    #[test]
    fn test_rosters_separate_users() {
        let trades = vec![trade(1, "u1", 1, "AAA"), trade(2, "u2", 1, "AAA")];
        let tags = vec![Tag::day(
            "u1",
            d(1),
            vocab::FOCUSED_DAY,
            1.0,
            "1 tickers".to_string(),
        )];
        let labels = builder(true).build(&trades, &tags);

        assert_eq!(labels.day_scores.rows.len(), 2);
        assert_eq!(labels.day_scores.get(0, vocab::FOCUSED_DAY), Some(1.0));
        assert_eq!(labels.day_scores.get(1, vocab::FOCUSED_DAY), Some(0.0));
    }
}
