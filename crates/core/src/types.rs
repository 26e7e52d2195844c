//! Core data types for the trade-journal pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// User identifier attached to every ledger row.
pub type UserId = String;

/// Sequential round-trip trade identifier, 1-based, assigned after matching.
pub type TradeId = u32;

/// Direction of a single brokerage execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDir {
    /// Opens or extends a long position; closes short lots first.
    Buy,
    /// Closes long lots first; remainder opens a short.
    Sell,
    /// Opens or extends a short position.
    Short,
    /// Closes short lots.
    Cover,
}

impl TradeDir {
    /// Sign applied to the raw quantity: +1 for buy/cover, -1 for sell/short.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            TradeDir::Buy | TradeDir::Cover => 1.0,
            TradeDir::Sell | TradeDir::Short => -1.0,
        }
    }

    /// True when the execution consumes short lots before opening longs.
    #[inline]
    pub fn closes_shorts_first(self) -> bool {
        matches!(self, TradeDir::Buy | TradeDir::Cover)
    }
}

/// Category of a cash event carried outside the trade stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CashEventKind {
    Deposit,
    Withdraw,
    Fee,
    Interest,
}

impl CashEventKind {
    /// Canonical lowercase name used in output tables.
    pub fn as_str(self) -> &'static str {
        match self {
            CashEventKind::Deposit => "deposit",
            CashEventKind::Withdraw => "withdraw",
            CashEventKind::Fee => "fee",
            CashEventKind::Interest => "interest",
        }
    }
}

/// Classified type of a raw ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowType {
    /// A trade execution with a direction.
    Trade(TradeDir),
    /// A cash event (deposit, withdrawal, fee, interest).
    Cash(CashEventKind),
    /// Unknown action text; the row is dropped from both streams.
    Ignore,
}

/// One brokerage fill, normalized from the raw ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub user_id: UserId,
    pub date: NaiveDate,
    /// Uppercased ticker symbol.
    pub ticker: String,
    pub dir: TradeDir,
    /// Signed quantity: positive for buy/cover, negative for sell/short.
    pub qty_signed: f64,
    pub price: f64,
}

/// A deposit, withdrawal, fee, or interest row from the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashEvent {
    /// Sequential id, 1-based, in ledger order.
    pub event_id: u32,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub kind: CashEventKind,
    pub amount: f64,
    /// Raw action text from the ledger row.
    pub note: String,
}

/// Side of a completed round-trip trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Long,
    Short,
}

impl TradeSide {
    /// Get sign: +1 for long, -1 for short.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            TradeSide::Long => 1.0,
            TradeSide::Short => -1.0,
        }
    }

    /// Canonical lowercase name used in output tables.
    pub fn as_str(self) -> &'static str {
        match self {
            TradeSide::Long => "long",
            TradeSide::Short => "short",
        }
    }
}

/// A closed round-trip trade produced by FIFO lot matching.
///
/// Immutable once created. Quantity is always positive; PnL follows the
/// side convention: long profits when exit > entry, short when entry > exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundTrip {
    /// Sequential id assigned after all groups are matched, in ascending
    /// (user, trade_date, ticker) order.
    pub trade_id: TradeId,
    pub user_id: UserId,
    /// Date of the closing execution.
    pub trade_date: NaiveDate,
    pub ticker: String,
    pub side: TradeSide,
    /// Quantity closed by this round-trip.
    pub qty: f64,
    pub entry_price: f64,
    pub exit_price: f64,
    /// Always zero here; commissions arrive as separate cash events.
    pub fees: f64,
    pub realized_pnl: f64,
}

/// Win/loss classification with a tolerance band around zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Breakeven,
}

impl Outcome {
    /// Canonical lowercase name used in output tables.
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Loss => "loss",
            Outcome::Breakeven => "breakeven",
        }
    }
}

/// A round-trip trade annotated with engineered features.
///
/// Derived once per pipeline run; never mutated afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    /// The underlying trade.
    pub trade: RoundTrip,
    /// Outcome relative to the breakeven tolerance.
    pub outcome: Outcome,
    /// Dollar size: qty * entry_price.
    pub notional: f64,
    /// Robust z-score of notional within the user's history.
    pub size_z: f64,
    /// Outcome of the previous same-day trade (None for the day's first).
    pub prev_outcome_day: Option<Outcome>,
    /// True when this trade reuses the previous same-day trade's ticker.
    pub same_ticker_as_prev_day: bool,
    /// True for every same-day trade except the first.
    pub immediate_after_prev: bool,
    /// Number of trades the user made that day.
    pub day_trade_count: u32,
    /// Realized PnL summed over the user's day.
    pub day_pnl: f64,
    /// Top-decile win within the user's winning trades.
    pub large_win: bool,
    /// Top-decile loss (by magnitude) within the user's losing trades.
    pub large_loss: bool,
}

/// Whether a tag applies to a single trade or a whole trading day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagScope {
    Trade,
    Day,
}

impl TagScope {
    /// Canonical lowercase name used in output tables.
    pub fn as_str(self) -> &'static str {
        match self {
            TagScope::Trade => "trade",
            TagScope::Day => "day",
        }
    }
}

/// Origin of an emitted tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagSource {
    Rule,
}

impl TagSource {
    /// Canonical lowercase name used in output tables.
    pub fn as_str(self) -> &'static str {
        match self {
            TagSource::Rule => "rule",
        }
    }
}

/// One emitted behavioral classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub user_id: UserId,
    /// None for day-scope tags.
    pub trade_id: Option<TradeId>,
    pub trade_date: NaiveDate,
    /// Name from the closed vocabulary (see [`crate::vocab`]).
    pub tag: String,
    /// Strength in [0, 1]; not a probability.
    pub confidence: f64,
    /// Human-readable evidence for the tag.
    pub rationale: String,
    pub scope: TagScope,
    pub source: TagSource,
}

impl Tag {
    /// Build a trade-scope tag for the given feature row.
    pub fn trade(row: &FeatureRow, tag: &str, confidence: f64, rationale: String) -> Self {
        Self {
            user_id: row.trade.user_id.clone(),
            trade_id: Some(row.trade.trade_id),
            trade_date: row.trade.trade_date,
            tag: tag.to_string(),
            confidence,
            rationale,
            scope: TagScope::Trade,
            source: TagSource::Rule,
        }
    }

    /// Build a day-scope tag for the given user and date.
    pub fn day(user_id: &str, date: NaiveDate, tag: &str, confidence: f64, rationale: String) -> Self {
        Self {
            user_id: user_id.to_string(),
            trade_id: None,
            trade_date: date,
            tag: tag.to_string(),
            confidence,
            rationale,
            scope: TagScope::Day,
            source: TagSource::Rule,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_dir_sign() {
        assert_eq!(TradeDir::Buy.sign(), 1.0);
        assert_eq!(TradeDir::Cover.sign(), 1.0);
        assert_eq!(TradeDir::Sell.sign(), -1.0);
        assert_eq!(TradeDir::Short.sign(), -1.0);
    }

    #[test]
    fn test_trade_dir_queue_selection() {
        assert!(TradeDir::Buy.closes_shorts_first());
        assert!(TradeDir::Cover.closes_shorts_first());
        assert!(!TradeDir::Sell.closes_shorts_first());
        assert!(!TradeDir::Short.closes_shorts_first());
    }

    #[test]
    fn test_side_sign() {
        assert_eq!(TradeSide::Long.sign(), 1.0);
        assert_eq!(TradeSide::Short.sign(), -1.0);
    }

    #[test]
    fn test_canonical_names() {
        assert_eq!(Outcome::Breakeven.as_str(), "breakeven");
        assert_eq!(TagScope::Day.as_str(), "day");
        assert_eq!(TagSource::Rule.as_str(), "rule");
        assert_eq!(CashEventKind::Withdraw.as_str(), "withdraw");
    }

    #[test]
    fn test_day_tag_has_no_trade_id() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let tag = Tag::day("u1", date, "overtrading_day", 0.8, "6 trades".to_string());
        assert_eq!(tag.trade_id, None);
        assert_eq!(tag.scope, TagScope::Day);
        assert_eq!(tag.source, TagSource::Rule);
    }
}
