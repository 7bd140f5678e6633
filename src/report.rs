//! Plain-text rendering of cards and the opportunity table.

use crate::data_provider::DashboardSnapshot;
use crate::models::stock::IndicatorResult;
use crate::services::screener::{rank_opportunities, OpportunityRow};
use crate::indicators;
use crate::util::{format_brl, format_percent, sparkline};
use std::fmt::{self, Write};

fn opt(value: Option<f64>, fmt: impl Fn(f64) -> String) -> String {
    value.map(fmt).unwrap_or_else(|| "n/a".to_string())
}

pub fn render_card(result: &IndicatorResult) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_card(&mut out, result);
    out
}

pub fn render_table(rows: &[OpportunityRow]) -> String {
    let mut out = String::new();
    let _ = write_table(&mut out, rows);
    out
}

/// Full report: favourite cards, then the ranked table, then any unavailable
/// tickers.
pub fn render_report<S: AsRef<str>>(snapshot: &DashboardSnapshot, favorites: &[S], limit: usize) -> String {
    let mut out = String::new();
    let _ = write_report(&mut out, snapshot, favorites, limit);
    out
}

fn write_card(out: &mut String, result: &IndicatorResult) -> fmt::Result {
    let levels = indicators::trade_levels(result.latest_price, result.volatility10);

    writeln!(out, "{:=<72}", "")?;
    writeln!(out, "{}  {}", result.ticker, result.company_name)?;
    writeln!(
        out,
        "Price {} ({})   RSI(14) {}",
        format_brl(result.latest_price),
        format_percent(result.percent_change),
        opt(result.rsi14, |r| format!("{:.2}", r))
    )?;

    match result.rsi14.map(indicators::classify_signal) {
        Some(signal) => {
            writeln!(out, "[{}]", signal.label())?;
            writeln!(out, "{}", signal.commentary())?;
        }
        None => writeln!(out, "[RSI unavailable: history too short]")?,
    }

    writeln!(out, "Analyst target: {}", format_brl(result.analyst_target))?;
    writeln!(
        out,
        "Distance from MA20: {}   MA20 {}   MA50 {}",
        opt(result.distance_from_ma20, format_percent),
        opt(result.ma20, format_brl),
        opt(result.ma50, format_brl)
    )?;
    writeln!(out, "{}", sparkline(&result.recent_close_series))?;
    writeln!(out, "Buy: {}   Target: {}", format_brl(levels.buy), format_brl(levels.target))
}

fn write_table(out: &mut String, rows: &[OpportunityRow]) -> fmt::Result {
    writeln!(out, "{:<12} {:>12} {:>8} {:>12}  {}", "Ticker", "Price", "RSI", "Dist MA20", "Status")?;
    writeln!(out, "{:-<60}", "")?;
    for row in rows {
        writeln!(
            out,
            "{:<12} {:>12} {:>8} {:>12}  {}",
            row.ticker,
            format_brl(row.price),
            opt(row.rsi, |r| format!("{:.2}", r)),
            opt(row.distance_from_ma20, format_percent),
            row.signal.map(|s| s.status()).unwrap_or("-")
        )?;
    }
    Ok(())
}

fn write_report<S: AsRef<str>>(
    out: &mut String,
    snapshot: &DashboardSnapshot,
    favorites: &[S],
    limit: usize,
) -> fmt::Result {
    writeln!(out, "Momentum & Growth  (updated {})", snapshot.taken_at().format("%Y-%m-%d %H:%M:%S %Z"))?;
    writeln!(out)?;

    for ticker in favorites {
        let ticker = ticker.as_ref();
        match snapshot.get(ticker) {
            Some(result) => write_card(out, result)?,
            None => {
                writeln!(out, "{:=<72}", "")?;
                writeln!(out, "{}  unavailable", ticker)?;
            }
        }
    }

    writeln!(out)?;
    writeln!(out, "Opportunity radar")?;
    write_table(out, &rank_opportunities(snapshot.results(), limit))?;

    if !snapshot.unavailable().is_empty() {
        writeln!(out)?;
        for u in snapshot.unavailable() {
            writeln!(out, "! {}", u)?;
        }
    }
    Ok(())
}
