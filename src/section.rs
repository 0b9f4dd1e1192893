use crate::aggregate::YearMap;
use crate::reference::MonthRef;
use crate::units::{SectionDef, UnitKey};
use serde::{Deserialize, Serialize};

/// Tolerance when comparing a month total against the column best, absorbing
/// floating-point rounding from the accumulation fold.
const HIGHLIGHT_EPSILON: f64 = 1e-3;

/// One year of a section's table, derived once per report build.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRow {
    pub year: i32,
    pub months: [f64; 12],
    pub total: f64,
    /// Sum of January through the reference month, inclusive.
    pub accumulated_ref: f64,
    /// True where the month equals the historical best for that month index.
    pub highlights: [bool; 12],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionReport {
    pub key: UnitKey,
    pub label: String,
    pub reference_year_applied: Option<i32>,
    pub reference_accumulated: f64,
    pub best_historical_accumulated: f64,
    pub previous_year_accumulated: f64,
    pub growth_vs_best: Option<f64>,
    pub growth_vs_previous_year: Option<f64>,
    pub rows: Vec<YearRow>,
}

/// Percentage change of `current` against `base`. A non-positive or
/// non-finite baseline makes the comparison undefined, not zero.
pub fn growth_pct(current: f64, base: f64) -> Option<f64> {
    if !base.is_finite() || base <= 0.0 {
        return None;
    }
    Some((current - base) / base * 100.0)
}

/// Builds one section from its year map and the globally resolved reference
/// period.
///
/// When the reference year has no row here, the section's own latest year is
/// substituted; the reference month index is kept as detected globally.
/// Years whose twelve months are all zero are suppressed.
pub fn build_section(def: &SectionDef, year_map: &YearMap, reference: MonthRef) -> SectionReport {
    let cutoff = reference.month.clamp(1, 12) as usize;
    let mut rows: Vec<YearRow> = year_map
        .iter()
        .filter(|(_, months)| months.iter().any(|v| *v != 0.0))
        .map(|(year, months)| {
            let total: f64 = months.iter().sum();
            let accumulated_ref: f64 = months[..cutoff].iter().sum();
            YearRow {
                year: *year,
                months: *months,
                total,
                accumulated_ref,
                highlights: [false; 12],
            }
        })
        .collect();

    let mut best_by_month = [0.0f64; 12];
    for row in &rows {
        for (idx, value) in row.months.iter().enumerate() {
            if *value > best_by_month[idx] {
                best_by_month[idx] = *value;
            }
        }
    }
    for row in &mut rows {
        for idx in 0..12 {
            row.highlights[idx] = best_by_month[idx] > 0.0
                && (row.months[idx] - best_by_month[idx]).abs() <= HIGHLIGHT_EPSILON;
        }
    }

    let reference_row = rows
        .iter()
        .find(|row| row.year == reference.year)
        .or_else(|| rows.last());
    let reference_year_applied = reference_row.map(|row| row.year);
    let reference_accumulated = reference_row.map(|row| row.accumulated_ref).unwrap_or(0.0);

    let best_historical_accumulated = match reference_year_applied {
        Some(applied) => rows
            .iter()
            .filter(|row| row.year < applied)
            .map(|row| row.accumulated_ref)
            .fold(0.0, f64::max),
        None => 0.0,
    };
    let previous_year_accumulated = reference_year_applied
        .and_then(|applied| rows.iter().find(|row| row.year == applied - 1))
        .map(|row| row.accumulated_ref)
        .unwrap_or(0.0);

    SectionReport {
        key: def.key,
        label: def.label.clone(),
        reference_year_applied,
        reference_accumulated,
        best_historical_accumulated,
        previous_year_accumulated,
        growth_vs_best: growth_pct(reference_accumulated, best_historical_accumulated),
        growth_vs_previous_year: growth_pct(reference_accumulated, previous_year_accumulated),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::push_to_year_map;
    use crate::units::all_units;

    fn def() -> SectionDef {
        all_units()
            .into_iter()
            .find(|d| d.key == UnitKey::OuroVerde)
            .unwrap()
    }

    fn reference(year: i32, month: u32) -> MonthRef {
        MonthRef { year, month }
    }

    #[test]
    fn test_growth_pct() {
        assert_eq!(growth_pct(1800.0, 1000.0), Some(80.0));
        assert_eq!(growth_pct(500.0, 1000.0), Some(-50.0));
        assert_eq!(growth_pct(100.0, 0.0), None);
        assert_eq!(growth_pct(100.0, -5.0), None);
        assert_eq!(growth_pct(100.0, f64::NAN), None);
    }

    #[test]
    fn test_rows_sorted_with_totals_and_accumulation() {
        let mut map = YearMap::new();
        push_to_year_map(&mut map, 2024, 1, 300.0);
        push_to_year_map(&mut map, 2023, 1, 100.0);
        push_to_year_map(&mut map, 2023, 2, 200.0);
        push_to_year_map(&mut map, 2023, 5, 400.0);

        let section = build_section(&def(), &map, reference(2024, 2));
        assert_eq!(section.rows.len(), 2);
        assert_eq!(section.rows[0].year, 2023);
        assert_eq!(section.rows[1].year, 2024);
        assert_eq!(section.rows[0].total, 700.0);
        // Jan..Feb only; May is past the reference month.
        assert_eq!(section.rows[0].accumulated_ref, 300.0);
        assert_eq!(section.rows[1].accumulated_ref, 300.0);
    }

    #[test]
    fn test_highlight_marks_column_best_only() {
        let mut map = YearMap::new();
        push_to_year_map(&mut map, 2023, 1, 1000.0);
        push_to_year_map(&mut map, 2024, 1, 1500.0);
        push_to_year_map(&mut map, 2024, 2, 100.0);

        let section = build_section(&def(), &map, reference(2024, 12));
        let rows = &section.rows;
        assert!(!rows[0].highlights[0]);
        assert!(rows[1].highlights[0]);
        assert!(rows[1].highlights[1]);
        // An all-zero column across years is never highlighted.
        assert!(rows.iter().all(|row| !row.highlights[5]));
    }

    #[test]
    fn test_highlight_ties_within_epsilon() {
        let mut map = YearMap::new();
        push_to_year_map(&mut map, 2023, 3, 500.0);
        push_to_year_map(&mut map, 2024, 3, 500.0005);

        let section = build_section(&def(), &map, reference(2024, 12));
        assert!(section.rows[0].highlights[2]);
        assert!(section.rows[1].highlights[2]);
    }

    #[test]
    fn test_reference_year_fallback_to_latest_present() {
        let mut map = YearMap::new();
        push_to_year_map(&mut map, 2021, 4, 800.0);
        push_to_year_map(&mut map, 2022, 4, 900.0);

        let section = build_section(&def(), &map, reference(2024, 4));
        assert_eq!(section.reference_year_applied, Some(2022));
        assert_eq!(section.reference_accumulated, 900.0);
        assert_eq!(section.previous_year_accumulated, 800.0);
        assert_eq!(section.growth_vs_previous_year, Some(12.5));
    }

    #[test]
    fn test_single_year_has_no_history() {
        let mut map = YearMap::new();
        push_to_year_map(&mut map, 2024, 1, 1200.0);

        let section = build_section(&def(), &map, reference(2024, 1));
        assert_eq!(section.best_historical_accumulated, 0.0);
        assert_eq!(section.previous_year_accumulated, 0.0);
        assert_eq!(section.growth_vs_best, None);
        assert_eq!(section.growth_vs_previous_year, None);
    }

    #[test]
    fn test_empty_map_yields_empty_section() {
        let map = YearMap::new();
        let section = build_section(&def(), &map, reference(2024, 6));
        assert!(section.rows.is_empty());
        assert_eq!(section.reference_year_applied, None);
        assert_eq!(section.reference_accumulated, 0.0);
        assert_eq!(section.growth_vs_best, None);
        assert_eq!(section.growth_vs_previous_year, None);
    }

    #[test]
    fn test_all_zero_year_suppressed() {
        let mut map = YearMap::new();
        push_to_year_map(&mut map, 2023, 7, 0.0);
        push_to_year_map(&mut map, 2024, 7, 50.0);

        let section = build_section(&def(), &map, reference(2024, 7));
        assert_eq!(section.rows.len(), 1);
        assert_eq!(section.rows[0].year, 2024);
    }

    #[test]
    fn test_best_historical_vs_growth() {
        let mut map = YearMap::new();
        push_to_year_map(&mut map, 2022, 1, 2000.0);
        push_to_year_map(&mut map, 2023, 1, 1000.0);
        push_to_year_map(&mut map, 2024, 1, 1800.0);

        let section = build_section(&def(), &map, reference(2024, 1));
        assert_eq!(section.best_historical_accumulated, 2000.0);
        assert_eq!(section.growth_vs_best, Some(-10.0));
        assert_eq!(section.growth_vs_previous_year, Some(80.0));
    }
}
