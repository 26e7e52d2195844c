//! Behavioral rule engine for the trade-journal pipeline.
//!
//! A fixed catalogue of independent classifier functions, each a pure
//! transform from the feature table to zero or more tags. The engine
//! concatenates all emissions and deduplicates, so rules can be added or
//! removed without touching orchestration.

pub mod day_rules;
pub mod engine;
pub mod trade_rules;

pub use engine::{catalogue, RuleEngine, RuleFn};
