use crate::aggregate::{aggregate, YearMap};
use crate::ledger::RevenueRow;
use crate::reference::{detect_reference, MonthRef};
use crate::section::{build_section, SectionReport};
use crate::theme::month_label;
use crate::units::{all_units, SectionDef, UnitKey};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The immutable snapshot every renderer consumes. Built fresh on each
/// request; never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    pub generated_at: NaiveDateTime,
    pub reference_month_ref: String,
    pub reference_year: i32,
    pub reference_month: u32,
    pub reference_month_label: String,
    pub unit_filter: UnitKey,
    pub available_units: Vec<SectionDef>,
    pub sections: Vec<SectionReport>,
}

/// Assembles the full report payload from loaded revenue rows.
///
/// All section maps are filled in a single pass over `rows`. The reference
/// period is detected from the filtered unit's own map, so a sparse unit
/// never borrows another unit's latest month; an explicit override takes
/// precedence over detection entirely. `now` is the injected wall-clock
/// fallback for reference detection on empty data.
pub fn assemble_payload(
    rows: &[RevenueRow],
    unit_filter: UnitKey,
    month_override: Option<MonthRef>,
    now: NaiveDateTime,
) -> ReportPayload {
    let section_maps = aggregate(rows);

    let empty = YearMap::new();
    let reference_source = section_maps.get(&unit_filter).unwrap_or(&empty);
    let detected = detect_reference(reference_source, MonthRef::from_date(now.date()));
    let reference = month_override.unwrap_or(detected);

    let defs: Vec<SectionDef> = if unit_filter == UnitKey::All {
        all_units()
    } else {
        all_units()
            .into_iter()
            .filter(|def| def.key == unit_filter)
            .collect()
    };
    let sections: Vec<SectionReport> = defs
        .iter()
        .map(|def| {
            let year_map = section_maps.get(&def.key).unwrap_or(&empty);
            build_section(def, year_map, reference)
        })
        .collect();

    ReportPayload {
        generated_at: now,
        reference_month_ref: reference.to_string(),
        reference_year: reference.year,
        reference_month: reference.month,
        reference_month_label: month_label(reference.month).to_string(),
        unit_filter,
        available_units: all_units(),
        sections,
    }
}
