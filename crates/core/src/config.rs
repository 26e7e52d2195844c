//! Configuration structures for the trade-journal pipeline.
//!
//! Every tunable lives here as one named configuration; rules and stages
//! read these values instead of carrying their own constants.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Main configuration for a pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Lot matching configuration.
    pub matching: MatchConfig,
    /// Feature engineering configuration.
    pub features: FeatureConfig,
    /// Rule threshold configuration.
    pub rules: RuleConfig,
    /// Label building configuration.
    pub labels: LabelConfig,
}

impl PipelineConfig {
    /// Load configuration from a JSON file; absent fields keep defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }
}

/// Lot matching configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Quantities at or below this are treated as fully consumed.
    pub qty_tolerance: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self { qty_tolerance: 1e-9 }
    }
}

/// Feature engineering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Breakeven tolerance in dollars: |PnL| <= eps_pnl classifies breakeven.
    pub eps_pnl: f64,
    /// Quantile of a user's wins above which a win is "large".
    pub large_win_pct: f64,
    /// Quantile of a user's loss magnitudes above which a loss is "large".
    pub large_loss_pct: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            eps_pnl: 1.0,
            large_win_pct: 0.90,
            large_loss_pct: 0.90,
        }
    }
}

/// Rule threshold configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Trades per day at or above which a day is overtraded.
    pub overtrading_min_trades: u32,
    /// Maximum |day PnL| for a high-activity day to count as chop.
    pub chop_abs_pnl_max: f64,
    /// Size z-score at or above which sizing is inconsistent.
    pub size_z_threshold: f64,
    /// Maximum size z-score for a disciplined re-entry after a loss.
    pub disciplined_size_z_max: f64,
    /// Maximum |size z-score| for the consistent-sizing band.
    pub consistent_size_z_abs_max: f64,
    /// Maximum trades for a green low-activity day.
    pub green_day_max_trades: u32,
    /// Day PnL at or above which a green day is strong.
    pub green_day_strong_pnl: f64,
    /// Day PnL at or above which a green day is moderate.
    pub green_day_moderate_pnl: f64,
    /// Minimum lifetime samples on a ticker for the lifetime bias rule.
    pub ticker_bias_min_trades: u32,
    /// Maximum lifetime mean PnL per trade for the lifetime bias rule.
    pub ticker_bias_mean_pnl_max: f64,
    /// Window size for the recent ticker bias rule.
    pub ticker_bias_recent_k: u32,
    /// Maximum recent-window mean PnL for the recent bias rule.
    pub ticker_bias_recent_mean_max: f64,
    /// Fraction of a day's trades one ticker must reach for partial focus.
    pub focused_dominant_frac: f64,
    /// Maximum trades for full confidence on a profitable single-ticker day.
    pub focused_single_ticker_max_trades: u32,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            overtrading_min_trades: 5,
            chop_abs_pnl_max: 50.0,
            size_z_threshold: 2.0,
            disciplined_size_z_max: 0.5,
            consistent_size_z_abs_max: 0.5,
            green_day_max_trades: 2,
            green_day_strong_pnl: 200.0,
            green_day_moderate_pnl: 50.0,
            ticker_bias_min_trades: 5,
            ticker_bias_mean_pnl_max: -10.0,
            ticker_bias_recent_k: 5,
            ticker_bias_recent_mean_max: -5.0,
            focused_dominant_frac: 0.8,
            focused_single_ticker_max_trades: 5,
        }
    }
}

/// Label building configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Merge day-level scores onto each trade row by (user, trade_date).
    pub propagate_day_to_trades: bool,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            propagate_day_to_trades: true,
        }
    }
}
