//! Rule evaluation: catalogue, orchestration, deduplication.

use chrono::NaiveDate;
use journal_core::{FeatureRow, PipelineConfig, Tag, TagScope, TradeId};
use std::collections::HashSet;
use tracing::debug;

use crate::{day_rules, trade_rules};

/// A rule: a pure function from the feature table to tags.
pub type RuleFn = fn(&[FeatureRow], &PipelineConfig) -> Vec<Tag>;

/// The fixed rule catalogue, in evaluation order.
pub fn catalogue() -> Vec<(&'static str, RuleFn)> {
    vec![
        // core trade-level
        ("outcome", trade_rules::outcome as RuleFn),
        ("large_win_loss", trade_rules::large_win_loss),
        ("revenge_immediate", trade_rules::revenge_immediate),
        ("size_inconsistency", trade_rules::size_inconsistency),
        // core day-level
        ("overtrading_day", day_rules::overtrading_day),
        ("revenge_day", day_rules::revenge_day),
        ("chop_day", day_rules::chop_day),
        ("ticker_bias", day_rules::ticker_bias),
        // positive reinforcement
        ("follow_through_win_immediate", trade_rules::follow_through_win_immediate),
        ("disciplined_after_loss_immediate", trade_rules::disciplined_after_loss_immediate),
        ("consistent_size", trade_rules::consistent_size),
        ("focused_day", day_rules::focused_day),
        ("green_day_low_activity", day_rules::green_day_low_activity),
    ]
}

/// Rule evaluation engine.
pub struct RuleEngine {
    config: PipelineConfig,
}

impl RuleEngine {
    /// Create a new rule engine from configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Evaluate every rule in the catalogue against the feature table.
    ///
    /// Emissions are concatenated in catalogue order, then deduplicated on
    /// (user, trade id, date, tag, rationale, scope) keeping the first
    /// occurrence.
    pub fn evaluate(&self, features: &[FeatureRow]) -> Vec<Tag> {
        let mut tags = Vec::new();
        for (name, rule) in catalogue() {
            let emitted = rule(features, &self.config);
            debug!(rule = name, emitted = emitted.len(), "rule evaluated");
            tags.extend(emitted);
        }
        dedup_tags(tags)
    }
}

type TagKey = (String, Option<TradeId>, NaiveDate, String, String, TagScope);

/// Drop duplicate tags, keeping the first occurrence.
fn dedup_tags(tags: Vec<Tag>) -> Vec<Tag> {
    let mut seen: HashSet<TagKey> = HashSet::with_capacity(tags.len());
    tags.into_iter()
        .filter(|t| {
            seen.insert((
                t.user_id.clone(),
                t.trade_id,
                t.trade_date,
                t.tag.clone(),
                t.rationale.clone(),
                t.scope,
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use journal_core::vocab;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_dedup_keeps_first() {
        let first = Tag::day("u1", date(), vocab::REVENGE_DAY, 0.75, "episode".to_string());
        let mut second = first.clone();
        second.confidence = 0.99; // same key, different payload

        let deduped = dedup_tags(vec![first.clone(), second]);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].confidence, 0.75);
    }

    #[test]
    fn test_different_rationales_both_kept() {
        let a = Tag::day("u1", date(), vocab::TICKER_BIAS_LIFETIME, 0.8, "Ticker AAA".to_string());
        let b = Tag::day("u1", date(), vocab::TICKER_BIAS_LIFETIME, 0.8, "Ticker BBB".to_string());
        assert_eq!(dedup_tags(vec![a, b]).len(), 2);
    }

    #[test]
    fn test_catalogue_is_stable() {
        let names: Vec<&str> = catalogue().iter().map(|(name, _)| *name).collect();
        assert_eq!(names.len(), 13);
        assert_eq!(names[0], "outcome");
        assert_eq!(names[names.len() - 1], "green_day_low_activity");
    }

    #[test]
    fn test_empty_features_emit_nothing() {
        let engine = RuleEngine::new(PipelineConfig::default());
        assert!(engine.evaluate(&[]).is_empty());
    }
}
