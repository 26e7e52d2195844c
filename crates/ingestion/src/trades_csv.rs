//! Reading an already-matched round-trip trades table.
//!
//! Accepts the trades CSV written by the pipeline (or an equivalent export)
//! and validates the schema once at this boundary; downstream stages take
//! typed rows and never re-check columns.

use chrono::NaiveDate;
use journal_core::{Error, Result, RoundTrip, TradeId, TradeSide};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Required logical columns with accepted synonyms.
const REQUIRED: [(&str, &[&str]); 7] = [
    ("trade_id", &["trade_id", "id"]),
    ("user_id", &["user_id", "user"]),
    ("trade_date", &["trade_date", "date"]),
    ("ticker", &["ticker", "symbol"]),
    ("qty", &["qty", "quantity", "shares", "contracts"]),
    ("entry_price", &["entry_price", "entry"]),
    ("realized_pnl", &["realized_pnl", "pnl"]),
];

/// Optional columns defaulted when absent.
const OPTIONAL: [(&str, &[&str]); 3] = [
    ("side", &["side"]),
    ("exit_price", &["exit_price", "exit"]),
    ("fees", &["fees", "fee"]),
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"];

fn find_column(lower: &[String], candidates: &[&str]) -> Option<usize> {
    candidates
        .iter()
        .find_map(|cand| lower.iter().position(|h| h == cand))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| Error::data(format!("unparseable trade_date: {raw:?}")))
}

fn parse_f64(raw: &str, column: &str) -> Result<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    raw.parse()
        .map_err(|_| Error::data(format!("unparseable {column}: {raw:?}")))
}

/// Read a round-trip trades table from any reader.
///
/// Required columns (case-insensitive, with synonyms): trade_id, user_id,
/// trade_date, ticker, qty, entry_price, realized_pnl. Every missing column
/// is reported in one schema error before any row is parsed.
pub fn read_trades_csv<R: Read>(reader: R) -> Result<Vec<RoundTrip>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let lower: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let mut required = [0usize; 7];
    let mut missing = Vec::new();
    for (slot, (name, candidates)) in REQUIRED.iter().enumerate() {
        match find_column(&lower, candidates) {
            Some(idx) => required[slot] = idx,
            None => missing.push((*name).to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(Error::Schema(missing));
    }
    let optional: Vec<Option<usize>> = OPTIONAL
        .iter()
        .map(|(_, candidates)| find_column(&lower, candidates))
        .collect();

    let get = |record: &csv::StringRecord, idx: usize| -> String {
        record.get(idx).unwrap_or("").to_string()
    };

    let mut trades = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let side = match optional[0] {
            Some(idx) => match get(&record, idx).trim().to_lowercase().as_str() {
                "short" => TradeSide::Short,
                _ => TradeSide::Long,
            },
            None => TradeSide::Long,
        };
        let exit_price = match optional[1] {
            Some(idx) => parse_f64(&get(&record, idx), "exit_price")?,
            None => 0.0,
        };
        let fees = match optional[2] {
            Some(idx) => parse_f64(&get(&record, idx), "fees")?,
            None => 0.0,
        };

        let trade_id: TradeId = get(&record, required[0])
            .trim()
            .parse()
            .map_err(|_| Error::data(format!("unparseable trade_id: {:?}", get(&record, required[0]))))?;

        trades.push(RoundTrip {
            trade_id,
            user_id: get(&record, required[1]),
            trade_date: parse_date(&get(&record, required[2]))?,
            ticker: get(&record, required[3]).to_uppercase(),
            side,
            qty: parse_f64(&get(&record, required[4]), "qty")?,
            entry_price: parse_f64(&get(&record, required[5]), "entry_price")?,
            fees,
            exit_price,
            realized_pnl: parse_f64(&get(&record, required[6]), "realized_pnl")?,
        });
    }
    Ok(trades)
}

/// Read a round-trip trades table from disk.
pub fn load_trades_csv(path: impl AsRef<Path>) -> Result<Vec<RoundTrip>> {
    read_trades_csv(File::open(path)?)
}
