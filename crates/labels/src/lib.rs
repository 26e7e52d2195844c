//! Score-matrix building for the trade-journal pipeline.
//!
//! Pivots the tall tags table into wide per-trade and per-day confidence
//! matrices over the fixed tag vocabulary.

pub mod builder;

pub use builder::{LabelBuilder, LabelSet, ScoreMatrix, ScoreRow};
