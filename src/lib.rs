//! # Faturamento Report
//!
//! Multi-year revenue aggregation and report rendering for a multi-unit
//! clinic. Raw payment-dated ledger rows are folded into a year x month
//! matrix per business unit, enriched with historical-best highlights and
//! year-over-year growth, and rendered from one shared payload into three
//! targets: JSON, a styled spreadsheet, and a paginated document.
//!
//! ## Core Concepts
//!
//! - **Reference period**: the most recent year/month with activity, used as
//!   the year-to-date cutoff for accumulation and growth comparisons.
//! - **Historical best**: per calendar month, the maximum total across all
//!   years of a section; highlighted identically in every output format.
//! - **Section**: one unit's table (or the "all units" aggregate); sections
//!   are atomic for document pagination and never split across pages.
//!
//! ## Example
//!
//! ```rust,ignore
//! use faturamento_report::*;
//!
//! let output = generate_report(&source, ReportFormat::Xlsx, Some("ouro_verde"), None)?;
//! std::fs::write(&output.filename, &output.bytes)?;
//! ```
//!
//! Every invocation builds its own payload from scratch; renderers only read
//! it, so concurrent report requests need no synchronization.

pub mod aggregate;
pub mod error;
pub mod ledger;
pub mod payload;
pub mod pdf;
pub mod reference;
pub mod section;
pub mod theme;
pub mod units;
pub mod xlsx;

pub use aggregate::{aggregate as aggregate_rows, YearMap};
pub use error::{ReportError, Result};
pub use ledger::{load_revenue_rows, LedgerRecord, RevenueRow, RevenueSource};
pub use payload::{assemble_payload, ReportPayload};
pub use pdf::render_document;
pub use reference::{detect_reference, MonthRef};
pub use section::{build_section, growth_pct, SectionReport, YearRow};
pub use units::{all_units, classify, SectionDef, UnitKey};
pub use xlsx::render_workbook;

use chrono::NaiveDateTime;
use log::info;

/// The three output targets of one report payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Xlsx,
    Pdf,
}

impl ReportFormat {
    /// Parses the request `format` value; anything unrecognized is JSON.
    pub fn parse(raw: Option<&str>) -> ReportFormat {
        match raw.unwrap_or("json").trim().to_lowercase().as_str() {
            "xlsx" => ReportFormat::Xlsx,
            "pdf" => ReportFormat::Pdf,
            _ => ReportFormat::Json,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ReportFormat::Json => "application/json",
            ReportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ReportFormat::Pdf => "application/pdf",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Xlsx => "xlsx",
            ReportFormat::Pdf => "pdf",
        }
    }
}

/// A fully rendered report, ready to hand to the HTTP layer.
#[derive(Debug, Clone)]
pub struct ReportOutput {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: String,
}

/// Loads ledger records, assembles the payload, and renders the requested
/// format, stamping `now` as the generation time (and wall-clock fallback
/// for reference detection).
pub fn generate_report_at(
    source: &dyn RevenueSource,
    format: ReportFormat,
    unit: Option<&str>,
    month_ref: Option<&str>,
    now: NaiveDateTime,
) -> Result<ReportOutput> {
    let unit_filter = UnitKey::parse_filter(unit);
    let month_override = MonthRef::parse(month_ref);

    let records = source.fetch_records()?;
    let rows = load_revenue_rows(&records);
    let payload = assemble_payload(&rows, unit_filter, month_override, now);

    info!(
        "Generating report: unit={}, format={:?}, reference={}",
        unit_filter.as_str(),
        format,
        payload.reference_month_ref
    );

    let bytes = match format {
        ReportFormat::Json => serde_json::to_vec(&payload)?,
        ReportFormat::Xlsx => render_workbook(&payload)?,
        ReportFormat::Pdf => render_document(&payload)?,
    };

    Ok(ReportOutput {
        bytes,
        content_type: format.content_type(),
        filename: format!(
            "faturamento-geral-{}-{}.{}",
            payload.reference_month_ref,
            unit_filter.as_str(),
            format.extension()
        ),
    })
}

/// [`generate_report_at`] using the host clock, assumed clinic-local.
pub fn generate_report(
    source: &dyn RevenueSource,
    format: ReportFormat,
    unit: Option<&str>,
    month_ref: Option<&str>,
) -> Result<ReportOutput> {
    generate_report_at(
        source,
        format,
        unit,
        month_ref,
        chrono::Local::now().naive_local(),
    )
}
