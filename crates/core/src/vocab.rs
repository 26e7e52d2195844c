//! Tag vocabulary: the fixed contract between the rule engine and the
//! label builder.
//!
//! A rule that emits a tag absent from these lists still produces a row in
//! the tags table, but the pivoted score matrices drop it silently. New
//! rule tags must be added to the matching list here.

/// Trade closed above the breakeven tolerance.
pub const OUTCOME_WIN: &str = "outcome_win";
/// Trade closed below the negative breakeven tolerance.
pub const OUTCOME_LOSS: &str = "outcome_loss";
/// Trade closed inside the breakeven band.
pub const OUTCOME_BREAKEVEN: &str = "outcome_breakeven";
/// Top-decile win within the user's winning trades.
pub const LARGE_WIN: &str = "large_win";
/// Top-decile loss (by magnitude) within the user's losing trades.
pub const LARGE_LOSS: &str = "large_loss";
/// Immediate re-entry after a same-day loss.
pub const REVENGE_IMMEDIATE: &str = "revenge_immediate";
/// Position size far above the user's typical notional.
pub const SIZE_INCONSISTENCY: &str = "size_inconsistency";
/// Immediate re-entry after a same-day win.
pub const FOLLOW_THROUGH_WIN_IMMEDIATE: &str = "follow_through_win_immediate";
/// Composed re-entry after a loss with size kept near typical.
pub const DISCIPLINED_AFTER_LOSS_IMMEDIATE: &str = "disciplined_after_loss_immediate";
/// Position size within the consistent-sizing band.
pub const CONSISTENT_SIZE: &str = "consistent_size";

/// High trade count for one day.
pub const OVERTRADING_DAY: &str = "overtrading_day";
/// Loss-anchored high-activity day.
pub const REVENGE_DAY: &str = "revenge_day";
/// High activity with flat day PnL.
pub const CHOP_DAY: &str = "chop_day";
/// Lifetime negative expectancy on a ticker.
pub const TICKER_BIAS_LIFETIME: &str = "ticker_bias_lifetime";
/// Recent-window negative expectancy on a ticker.
pub const TICKER_BIAS_RECENT: &str = "ticker_bias_recent";
/// Day concentrated on one ticker (or nearly so).
pub const FOCUSED_DAY: &str = "focused_day";
/// Profitable day with low activity.
pub const GREEN_DAY_LOW_ACTIVITY: &str = "green_day_low_activity";

/// Trade-scope tags, in score-matrix column order.
pub const TRADE_TAGS: [&str; 10] = [
    OUTCOME_WIN,
    OUTCOME_LOSS,
    OUTCOME_BREAKEVEN,
    LARGE_WIN,
    LARGE_LOSS,
    REVENGE_IMMEDIATE,
    SIZE_INCONSISTENCY,
    FOLLOW_THROUGH_WIN_IMMEDIATE,
    DISCIPLINED_AFTER_LOSS_IMMEDIATE,
    CONSISTENT_SIZE,
];

/// Day-scope tags, in score-matrix column order.
pub const DAY_TAGS: [&str; 7] = [
    OVERTRADING_DAY,
    REVENGE_DAY,
    CHOP_DAY,
    TICKER_BIAS_LIFETIME,
    TICKER_BIAS_RECENT,
    FOCUSED_DAY,
    GREEN_DAY_LOW_ACTIVITY,
];
