//! FIFO lot matching: executions -> round-trip trades.
//!
//! Each (user, ticker) group owns two queues of open lots, long and short.
//! A closing execution consumes the opposing queue oldest-first, emitting
//! one round-trip per consumed portion; leftover quantity opens a new lot.

use chrono::NaiveDate;
use journal_core::{Execution, RoundTrip, TradeId, TradeSide};
use std::collections::VecDeque;
use tracing::debug;

/// An open inventory lot awaiting an opposing execution.
#[derive(Debug, Clone, Copy)]
struct Lot {
    /// Remaining quantity, always positive.
    qty: f64,
    /// Entry price.
    price: f64,
    /// Entry date.
    date: NaiveDate,
}

/// Match executions into round-trip trades using FIFO lot consumption.
///
/// `execs` must be sorted by (user, ticker, date) with ledger order breaking
/// ties; ordering inside a group drives FIFO consumption and is load-bearing.
/// Trade ids are assigned only after all groups are matched, in ascending
/// (user, trade_date, ticker) order, starting at 1.
pub fn match_round_trips(execs: &[Execution], tolerance: f64) -> Vec<RoundTrip> {
    let mut trades = Vec::new();

    let mut start = 0;
    while start < execs.len() {
        let head = &execs[start];
        let end = start
            + execs[start..]
                .iter()
                .position(|e| e.user_id != head.user_id || e.ticker != head.ticker)
                .unwrap_or(execs.len() - start);
        match_group(&execs[start..end], tolerance, &mut trades);
        start = end;
    }

    trades.sort_by(|a, b| {
        (&a.user_id, a.trade_date, &a.ticker).cmp(&(&b.user_id, b.trade_date, &b.ticker))
    });
    for (idx, trade) in trades.iter_mut().enumerate() {
        trade.trade_id = idx as TradeId + 1;
    }
    trades
}

/// Match one (user, ticker) group. Lot queues live and die here.
fn match_group(group: &[Execution], tolerance: f64, trades: &mut Vec<RoundTrip>) {
    let mut long_lots: VecDeque<Lot> = VecDeque::new();
    let mut short_lots: VecDeque<Lot> = VecDeque::new();

    for exec in group {
        let mut remaining = exec.qty_signed.abs();
        let px = exec.price;

        if exec.dir.closes_shorts_first() {
            // close shorts oldest-first, leftover opens/extends a long
            while remaining > tolerance {
                let Some(lot) = short_lots.front_mut() else { break };
                let used = remaining.min(lot.qty);
                trades.push(close_trade(exec, TradeSide::Short, used, lot.price, px));
                remaining -= used;
                lot.qty -= used;
                if lot.qty <= tolerance {
                    short_lots.pop_front();
                }
            }
            if remaining > tolerance {
                long_lots.push_back(Lot {
                    qty: remaining,
                    price: px,
                    date: exec.date,
                });
            }
        } else {
            // close longs oldest-first, leftover opens/extends a short
            while remaining > tolerance {
                let Some(lot) = long_lots.front_mut() else { break };
                let used = remaining.min(lot.qty);
                trades.push(close_trade(exec, TradeSide::Long, used, lot.price, px));
                remaining -= used;
                lot.qty -= used;
                if lot.qty <= tolerance {
                    long_lots.pop_front();
                }
            }
            if remaining > tolerance {
                short_lots.push_back(Lot {
                    qty: remaining,
                    price: px,
                    date: exec.date,
                });
            }
        }
    }

    // Residual open positions are dropped, not reported as trades.
    if let Some(exec) = group.first() {
        for (queue, side) in [(&long_lots, TradeSide::Long), (&short_lots, TradeSide::Short)] {
            if let Some(oldest) = queue.front() {
                let open_qty: f64 = queue.iter().map(|l| l.qty).sum();
                debug!(
                    user = %exec.user_id,
                    ticker = %exec.ticker,
                    side = side.as_str(),
                    qty = open_qty,
                    oldest_entry = %oldest.date,
                    "dropping residual open position"
                );
            }
        }
    }
}

fn close_trade(exec: &Execution, side: TradeSide, qty: f64, entry: f64, exit: f64) -> RoundTrip {
    let realized_pnl = match side {
        TradeSide::Long => (exit - entry) * qty,
        TradeSide::Short => (entry - exit) * qty,
    };
    RoundTrip {
        trade_id: 0, // assigned after all groups are matched
        user_id: exec.user_id.clone(),
        trade_date: exec.date,
        ticker: exec.ticker.clone(),
        side,
        qty,
        entry_price: entry,
        exit_price: exit,
        fees: 0.0,
        realized_pnl,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journal_core::TradeDir;

    const TOL: f64 = 1e-9;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn exec(ticker: &str, day: u32, dir: TradeDir, qty: f64, price: f64) -> Execution {
        Execution {
            user_id: "u1".to_string(),
            date: d(day),
            ticker: ticker.to_string(),
            dir,
            qty_signed: dir.sign() * qty,
            price,
        }
    }

    #[test]
    fn test_fifo_oldest_lot_first() {
        // buy 10 @ 10, buy 5 @ 12, sell 12 @ 15:
        // first lot fully consumed before the second is touched
        let execs = vec![
            exec("XYZ", 1, TradeDir::Buy, 10.0, 10.0),
            exec("XYZ", 2, TradeDir::Buy, 5.0, 12.0),
            exec("XYZ", 3, TradeDir::Sell, 12.0, 15.0),
        ];
        let trades = match_round_trips(&execs, TOL);

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].qty, 10.0);
        assert_eq!(trades[0].entry_price, 10.0);
        assert_eq!(trades[0].exit_price, 15.0);
        assert!((trades[0].realized_pnl - 50.0).abs() < TOL);
        assert_eq!(trades[1].qty, 2.0);
        assert_eq!(trades[1].entry_price, 12.0);
        assert!((trades[1].realized_pnl - 6.0).abs() < TOL);
        // 3 units remain open in the second lot and are dropped
    }

    #[test]
    fn test_short_cover_pnl_sign() {
        let execs = vec![
            exec("XYZ", 1, TradeDir::Short, 10.0, 20.0),
            exec("XYZ", 2, TradeDir::Cover, 10.0, 15.0),
        ];
        let trades = match_round_trips(&execs, TOL);

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].side, TradeSide::Short);
        // short profits when exit < entry
        assert!((trades[0].realized_pnl - 50.0).abs() < TOL);
        assert_eq!(trades[0].trade_date, d(2));
    }

    #[test]
    fn test_buy_closes_shorts_before_opening_long() {
        let execs = vec![
            exec("XYZ", 1, TradeDir::Short, 5.0, 30.0),
            exec("XYZ", 2, TradeDir::Buy, 8.0, 28.0),
            exec("XYZ", 3, TradeDir::Sell, 3.0, 31.0),
        ];
        let trades = match_round_trips(&execs, TOL);

        assert_eq!(trades.len(), 2);
        // the buy first covers the short
        assert_eq!(trades[0].side, TradeSide::Short);
        assert_eq!(trades[0].qty, 5.0);
        assert!((trades[0].realized_pnl - 10.0).abs() < TOL);
        // its leftover 3 units opened a long, closed by the sell
        assert_eq!(trades[1].side, TradeSide::Long);
        assert_eq!(trades[1].qty, 3.0);
        assert!((trades[1].realized_pnl - 9.0).abs() < TOL);
    }

    #[test]
    fn test_open_position_without_close_emits_nothing() {
        let execs = vec![exec("XYZ", 1, TradeDir::Buy, 10.0, 10.0)];
        assert!(match_round_trips(&execs, TOL).is_empty());
    }

    #[test]
    fn test_zero_quantity_executions_emit_nothing() {
        let execs = vec![
            exec("XYZ", 1, TradeDir::Buy, 0.0, 10.0),
            exec("XYZ", 2, TradeDir::Sell, 0.0, 12.0),
        ];
        assert!(match_round_trips(&execs, TOL).is_empty());
    }

    #[test]
    fn test_quantity_conservation() {
        // total matched quantity never exceeds total executed quantity
        let execs = vec![
            exec("XYZ", 1, TradeDir::Buy, 7.0, 10.0),
            exec("XYZ", 1, TradeDir::Buy, 4.0, 11.0),
            exec("XYZ", 2, TradeDir::Sell, 6.0, 12.0),
            exec("XYZ", 3, TradeDir::Short, 9.0, 13.0),
            exec("XYZ", 4, TradeDir::Cover, 2.0, 12.5),
        ];
        let trades = match_round_trips(&execs, TOL);

        let matched: f64 = trades.iter().map(|t| t.qty).sum();
        let executed: f64 = execs.iter().map(|e| e.qty_signed.abs()).sum();
        assert!(matched <= executed + TOL);
        for trade in &trades {
            assert!(trade.qty > TOL);
        }
    }

    #[test]
    fn test_sell_flips_long_into_short() {
        let execs = vec![
            exec("XYZ", 1, TradeDir::Buy, 5.0, 10.0),
            exec("XYZ", 2, TradeDir::Sell, 8.0, 12.0),
            exec("XYZ", 3, TradeDir::Buy, 3.0, 11.0),
        ];
        let trades = match_round_trips(&execs, TOL);

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].side, TradeSide::Long);
        assert_eq!(trades[0].qty, 5.0);
        // leftover 3 sold units opened a short, covered by the last buy
        assert_eq!(trades[1].side, TradeSide::Short);
        assert_eq!(trades[1].qty, 3.0);
        assert!((trades[1].realized_pnl - 3.0).abs() < TOL);
    }

    #[test]
    fn test_trade_ids_follow_user_date_ticker_order() {
        // group processing order is by ticker; ids must still come out in
        // (user, trade_date, ticker) order
        let execs = vec![
            exec("AAA", 1, TradeDir::Buy, 1.0, 10.0),
            exec("AAA", 5, TradeDir::Sell, 1.0, 11.0),
            exec("BBB", 1, TradeDir::Buy, 1.0, 10.0),
            exec("BBB", 2, TradeDir::Sell, 1.0, 11.0),
        ];
        let trades = match_round_trips(&execs, TOL);

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].trade_id, 1);
        assert_eq!(trades[0].ticker, "BBB"); // closed day 2, before AAA's day 5
        assert_eq!(trades[1].trade_id, 2);
        assert_eq!(trades[1].ticker, "AAA");
    }

    #[test]
    fn test_partial_fill_splits_into_two_trades() {
        let execs = vec![
            exec("XYZ", 1, TradeDir::Buy, 10.0, 10.0),
            exec("XYZ", 2, TradeDir::Sell, 4.0, 12.0),
            exec("XYZ", 3, TradeDir::Sell, 6.0, 13.0),
        ];
        let trades = match_round_trips(&execs, TOL);

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].qty, 4.0);
        assert_eq!(trades[0].trade_date, d(2));
        assert_eq!(trades[1].qty, 6.0);
        assert_eq!(trades[1].trade_date, d(3));
        assert!((trades[1].realized_pnl - 18.0).abs() < TOL);
    }
}
