//! Ledger ingestion and trade reconstruction.
//!
//! This crate handles:
//! - Raw ledger parsing (CSV, case-insensitive headers with synonyms)
//! - Action text classification (trade vs. cash event vs. ignore)
//! - FIFO lot matching (executions -> round-trip trades)
//! - Reading an already-matched round-trip trades table

pub mod ledger;
pub mod lot_matcher;
pub mod trades_csv;

pub use ledger::{classify_action, load_ledger, read_ledger, Ledger, LedgerStats};
pub use lot_matcher::match_round_trips;
pub use trades_csv::{load_trades_csv, read_trades_csv};
