use crate::error::Result;
use chrono::{Datelike, NaiveDate};
use log::debug;

/// One raw row from the analytic revenue ledger, as the data store returns
/// it: a free-text payment date, a free-text unit label, and the paid total.
#[derive(Debug, Clone)]
pub struct LedgerRecord {
    pub payment_date: String,
    pub unit: String,
    pub amount: f64,
}

/// A loaded revenue row, keyed by payment year/month. Produced once by the
/// loader and consumed once by the aggregator.
#[derive(Debug, Clone)]
pub struct RevenueRow {
    pub year: i32,
    pub month: u32,
    pub unit_label: String,
    pub amount: f64,
}

/// Seam to the (out of scope) relational store. Implementations perform the
/// single bulk read of payment-dated ledger records.
pub trait RevenueSource {
    fn fetch_records(&self) -> Result<Vec<LedgerRecord>>;
}

/// Parses a ledger payment date. The ledger mixes `dd/mm/YYYY` entries with
/// ISO `YYYY-mm-dd` prefixes (timestamps included), so both are accepted.
pub fn parse_payment_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    if value.contains('/') {
        return NaiveDate::parse_from_str(value, "%d/%m/%Y").ok();
    }
    let prefix = value.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

/// Converts raw ledger records into dated revenue rows. Records with a
/// blank or unparseable payment date, or a payment year before 2000, are
/// dropped; bad dates are a data-quality issue, never a request failure.
pub fn load_revenue_rows(records: &[LedgerRecord]) -> Vec<RevenueRow> {
    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        let Some(date) = parse_payment_date(&record.payment_date) else {
            debug!(
                "Dropping ledger record with unparseable payment date '{}'",
                record.payment_date
            );
            continue;
        };
        if date.year() < 2000 {
            debug!("Dropping ledger record with payment year {}", date.year());
            continue;
        }
        rows.push(RevenueRow {
            year: date.year(),
            month: date.month(),
            unit_label: record.unit.clone(),
            amount: record.amount,
        });
    }
    rows
}
