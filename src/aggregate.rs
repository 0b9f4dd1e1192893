use crate::ledger::RevenueRow;
use crate::units::{all_units, classify, UnitKey};
use log::debug;
use std::collections::{BTreeMap, HashMap};

/// Monthly totals per year for one section. Buckets are created lazily and
/// only ever accumulated into; unset months stay `0.0`.
pub type YearMap = BTreeMap<i32, [f64; 12]>;

pub fn push_to_year_map(year_map: &mut YearMap, year: i32, month: u32, amount: f64) {
    let bucket = year_map.entry(year).or_insert([0.0; 12]);
    bucket[(month - 1) as usize] += amount;
}

/// Folds revenue rows into one `YearMap` per section in a single pass.
///
/// Every valid row accumulates into the `All` map; rows whose label
/// classifies to a canonical unit additionally accumulate there. Rows with a
/// month outside 1..=12 or a non-finite amount are dropped.
pub fn aggregate(rows: &[RevenueRow]) -> HashMap<UnitKey, YearMap> {
    let mut section_maps: HashMap<UnitKey, YearMap> = all_units()
        .iter()
        .map(|def| (def.key, YearMap::new()))
        .collect();

    for row in rows {
        if row.month < 1 || row.month > 12 || !row.amount.is_finite() {
            debug!(
                "Dropping malformed revenue row: year={} month={} amount={}",
                row.year, row.month, row.amount
            );
            continue;
        }
        if let Some(map) = section_maps.get_mut(&UnitKey::All) {
            push_to_year_map(map, row.year, row.month, row.amount);
        }
        if let Some(unit) = classify(&row.unit_label) {
            if let Some(map) = section_maps.get_mut(&unit) {
                push_to_year_map(map, row.year, row.month, row.amount);
            }
        }
    }

    section_maps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(year: i32, month: u32, unit: &str, amount: f64) -> RevenueRow {
        RevenueRow {
            year,
            month,
            unit_label: unit.to_string(),
            amount,
        }
    }

    #[test]
    fn test_conservation_over_all_aggregate() {
        let rows = vec![
            row(2023, 1, "Ouro Verde", 1000.0),
            row(2023, 2, "Centro Cambui", 250.0),
            row(2024, 12, "Unidade Desconhecida", 99.5),
            row(2024, 12, "", 0.5),
        ];
        let maps = aggregate(&rows);
        let all = maps.get(&UnitKey::All).unwrap();
        let total: f64 = all.values().flat_map(|months| months.iter()).sum();
        assert!((total - 1350.0).abs() < 1e-9);
    }

    #[test]
    fn test_unclassifiable_rows_count_only_toward_all() {
        let rows = vec![row(2024, 5, "Alguma Outra Clinica", 500.0)];
        let maps = aggregate(&rows);
        assert_eq!(maps.get(&UnitKey::All).unwrap().len(), 1);
        assert!(maps.get(&UnitKey::OuroVerde).unwrap().is_empty());
        assert!(maps.get(&UnitKey::CampinasShopping).unwrap().is_empty());
    }

    #[test]
    fn test_classified_rows_count_twice() {
        let rows = vec![row(2024, 3, "Ouro Verde", 700.0)];
        let maps = aggregate(&rows);
        assert_eq!(maps.get(&UnitKey::All).unwrap()[&2024][2], 700.0);
        assert_eq!(maps.get(&UnitKey::OuroVerde).unwrap()[&2024][2], 700.0);
    }

    #[test]
    fn test_malformed_rows_dropped() {
        let rows = vec![
            row(2024, 0, "Ouro Verde", 100.0),
            row(2024, 13, "Ouro Verde", 100.0),
            row(2024, 6, "Ouro Verde", f64::NAN),
            row(2024, 6, "Ouro Verde", f64::INFINITY),
            row(2024, 6, "Ouro Verde", 40.0),
        ];
        let maps = aggregate(&rows);
        let all = maps.get(&UnitKey::All).unwrap();
        let total: f64 = all.values().flat_map(|months| months.iter()).sum();
        assert_eq!(total, 40.0);
    }

    #[test]
    fn test_accumulation_within_same_bucket() {
        let rows = vec![
            row(2024, 1, "Ouro Verde", 10.0),
            row(2024, 1, "Ouro Verde", 15.0),
        ];
        let maps = aggregate(&rows);
        assert_eq!(maps.get(&UnitKey::OuroVerde).unwrap()[&2024][0], 25.0);
    }
}
