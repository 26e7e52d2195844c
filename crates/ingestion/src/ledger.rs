//! Raw ledger parsing and action classification.
//!
//! A ledger row carries (date, ticker, action, quantity, price, amount).
//! The action text decides whether the row is a trade execution, a cash
//! event, or unknown (dropped from both streams).

use chrono::NaiveDate;
use journal_core::{
    CashEvent, CashEventKind, Error, Execution, Result, RowType, TradeDir,
};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Accepted header names per logical column, first match wins.
const COLUMN_SYNONYMS: [(&str, &[&str]); 6] = [
    ("date", &["date"]),
    ("ticker", &["ticker", "symbol"]),
    ("action", &["action", "description"]),
    ("quantity", &["quantity", "qty", "shares", "contracts"]),
    ("price", &["price"]),
    ("amount", &["amount", "cash", "net"]),
];

/// Date formats tried in order when parsing ledger dates.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"];

/// Counters describing how ledger rows were classified.
#[derive(Debug, Clone, Default)]
pub struct LedgerStats {
    /// Total data rows read.
    pub total_rows: u64,
    /// Rows classified as trade executions.
    pub execution_rows: u64,
    /// Rows classified as cash events.
    pub cash_rows: u64,
    /// Rows with unknown action text, dropped.
    pub ignored_rows: u64,
    /// Rows dropped because the date failed to parse.
    pub bad_date_rows: u64,
}

/// Parsed ledger: executions ready for lot matching plus cash events.
#[derive(Debug, Clone)]
pub struct Ledger {
    /// Trade executions, sorted by (user, ticker, date) with ledger order
    /// breaking ties.
    pub executions: Vec<Execution>,
    /// Cash events, numbered 1..n in ledger order.
    pub cash_events: Vec<CashEvent>,
    /// Row classification counters.
    pub stats: LedgerStats,
}

/// Classify raw action text into a row type.
///
/// Cash events are checked before trades so that e.g. "margin interest"
/// never matches a trade keyword. Unknown text maps to `Ignore`.
pub fn classify_action(action: &str) -> RowType {
    let a = action.trim().to_lowercase();
    if a.contains("deposit") {
        return RowType::Cash(CashEventKind::Deposit);
    }
    if a.contains("withdraw") {
        return RowType::Cash(CashEventKind::Withdraw);
    }
    if a.contains("interest") {
        return RowType::Cash(CashEventKind::Interest);
    }
    if a.contains("fee") || a.contains("commission") {
        return RowType::Cash(CashEventKind::Fee);
    }
    if a.contains("sell short") || (a.contains("short") && !a.contains("cover")) {
        return RowType::Trade(TradeDir::Short);
    }
    if a.contains("buy to cover") || a.contains("cover") {
        return RowType::Trade(TradeDir::Cover);
    }
    if a.contains("buy") {
        return RowType::Trade(TradeDir::Buy);
    }
    if a.contains("sell") {
        return RowType::Trade(TradeDir::Sell);
    }
    RowType::Ignore
}

/// Resolved column indexes into a ledger record.
struct LedgerColumns {
    date: usize,
    ticker: usize,
    action: usize,
    quantity: usize,
    price: usize,
    amount: usize,
}

/// Match headers case-insensitively against the synonym table.
///
/// Collects every unmatched logical column before failing, so the caller
/// sees the full list at once.
fn resolve_columns(headers: &csv::StringRecord) -> Result<LedgerColumns> {
    let lower: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    let find = |candidates: &[&str]| -> Option<usize> {
        candidates
            .iter()
            .find_map(|cand| lower.iter().position(|h| h == cand))
    };

    let mut resolved = [0usize; 6];
    let mut missing = Vec::new();
    for (slot, (name, candidates)) in COLUMN_SYNONYMS.iter().enumerate() {
        match find(candidates) {
            Some(idx) => resolved[slot] = idx,
            None => missing.push((*name).to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(Error::Schema(missing));
    }

    Ok(LedgerColumns {
        date: resolved[0],
        ticker: resolved[1],
        action: resolved[2],
        quantity: resolved[3],
        price: resolved[4],
        amount: resolved[5],
    })
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

fn parse_number(raw: &str) -> f64 {
    raw.trim().replace(',', "").parse().unwrap_or(0.0)
}

/// Parse a raw ledger from any reader, attaching `user_id` to every row.
pub fn read_ledger<R: Read>(reader: R, user_id: &str) -> Result<Ledger> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let columns = resolve_columns(csv_reader.headers()?)?;

    let mut executions = Vec::new();
    let mut cash_events = Vec::new();
    let mut stats = LedgerStats::default();

    for record in csv_reader.records() {
        let record = record?;
        stats.total_rows += 1;

        let action_raw = record.get(columns.action).unwrap_or("");
        let row_type = classify_action(action_raw);
        if row_type == RowType::Ignore {
            stats.ignored_rows += 1;
            continue;
        }

        let Some(date) = parse_date(record.get(columns.date).unwrap_or("")) else {
            stats.bad_date_rows += 1;
            debug!(row = stats.total_rows, "dropping row with unparseable date");
            continue;
        };

        match row_type {
            RowType::Trade(dir) => {
                let qty = parse_number(record.get(columns.quantity).unwrap_or(""));
                let price = parse_number(record.get(columns.price).unwrap_or(""));
                let ticker = record
                    .get(columns.ticker)
                    .unwrap_or("")
                    .trim()
                    .to_uppercase();
                executions.push(Execution {
                    user_id: user_id.to_string(),
                    date,
                    ticker,
                    dir,
                    qty_signed: dir.sign() * qty.abs(),
                    price,
                });
                stats.execution_rows += 1;
            }
            RowType::Cash(kind) => {
                let amount = parse_number(record.get(columns.amount).unwrap_or(""));
                cash_events.push(CashEvent {
                    event_id: cash_events.len() as u32 + 1,
                    user_id: user_id.to_string(),
                    date,
                    kind,
                    amount,
                    note: action_raw.trim().to_string(),
                });
                stats.cash_rows += 1;
            }
            RowType::Ignore => unreachable!(),
        }
    }

    // FIFO consumption order: stable sort keeps ledger order within ties.
    executions.sort_by(|a, b| {
        (&a.user_id, &a.ticker, a.date).cmp(&(&b.user_id, &b.ticker, b.date))
    });

    Ok(Ledger {
        executions,
        cash_events,
        stats,
    })
}

/// Load a raw ledger CSV from disk.
pub fn load_ledger(path: impl AsRef<Path>, user_id: &str) -> Result<Ledger> {
    let path = path.as_ref();
    let ledger = read_ledger(File::open(path)?, user_id)?;
    info!(
        path = %path.display(),
        rows = ledger.stats.total_rows,
        executions = ledger.stats.execution_rows,
        cash_events = ledger.stats.cash_rows,
        ignored = ledger.stats.ignored_rows,
        "ledger loaded"
    );
    Ok(ledger)
}
