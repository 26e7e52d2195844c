//! Feature computation for the trade-journal pipeline.
//!
//! This crate handles:
//! - Outcome classification (win/loss/breakeven with tolerance)
//! - Notional size and its per-user robust z-score
//! - Same-day sequencing context (previous outcome, ticker reuse, immediacy)
//! - Day aggregates (trade count, day PnL)
//! - Per-user extreme flags (top-decile wins and losses)

pub mod engine;
pub mod robust;

pub use engine::{classify_outcome, FeatureEngine};
pub use robust::{quantile, robust_z};
