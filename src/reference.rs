use crate::aggregate::YearMap;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The year-to-date cutoff for accumulation and growth comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRef {
    pub year: i32,
    pub month: u32,
}

impl MonthRef {
    /// Parses an optional `YYYY-MM` override from the request. Anything that
    /// does not match returns `None` and detection applies instead.
    pub fn parse(raw: Option<&str>) -> Option<MonthRef> {
        let value = raw.unwrap_or("").trim();
        let (year_s, month_s) = value.split_once('-')?;
        if year_s.len() != 4 || month_s.len() != 2 {
            return None;
        }
        let year: i32 = year_s.parse().ok()?;
        let month: u32 = month_s.parse().ok()?;
        if !(1..=12).contains(&month) {
            return None;
        }
        Some(MonthRef { year, month })
    }

    pub fn from_date(date: NaiveDate) -> MonthRef {
        MonthRef {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for MonthRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Finds the most recent `(year, month)` with non-zero activity, scanning
/// years descending and December-to-January within each year. When the map
/// has no activity at all, `fallback` (the injected wall-clock period) is
/// returned.
pub fn detect_reference(year_map: &YearMap, fallback: MonthRef) -> MonthRef {
    for (year, months) in year_map.iter().rev() {
        for month in (1..=12).rev() {
            if months[(month - 1) as usize] > 0.0 {
                return MonthRef { year: *year, month };
            }
        }
    }
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::push_to_year_map;

    const FALLBACK: MonthRef = MonthRef {
        year: 2025,
        month: 6,
    };

    #[test]
    fn test_detect_most_recent_active_month() {
        let mut map = YearMap::new();
        push_to_year_map(&mut map, 2023, 11, 500.0);
        push_to_year_map(&mut map, 2024, 2, 300.0);
        push_to_year_map(&mut map, 2024, 7, 0.0);
        let detected = detect_reference(&map, FALLBACK);
        assert_eq!(
            detected,
            MonthRef {
                year: 2024,
                month: 2
            }
        );
    }

    #[test]
    fn test_detect_skips_zero_only_years() {
        let mut map = YearMap::new();
        push_to_year_map(&mut map, 2022, 9, 120.0);
        push_to_year_map(&mut map, 2024, 5, 0.0);
        let detected = detect_reference(&map, FALLBACK);
        assert_eq!(
            detected,
            MonthRef {
                year: 2022,
                month: 9
            }
        );
    }

    #[test]
    fn test_detect_falls_back_when_empty() {
        let map = YearMap::new();
        assert_eq!(detect_reference(&map, FALLBACK), FALLBACK);
    }

    #[test]
    fn test_parse_month_ref() {
        assert_eq!(
            MonthRef::parse(Some("2024-03")),
            Some(MonthRef {
                year: 2024,
                month: 3
            })
        );
        assert_eq!(MonthRef::parse(Some("2024-13")), None);
        assert_eq!(MonthRef::parse(Some("2024-3")), None);
        assert_eq!(MonthRef::parse(Some("24-03")), None);
        assert_eq!(MonthRef::parse(Some("")), None);
        assert_eq!(MonthRef::parse(None), None);
    }

    #[test]
    fn test_display() {
        let month_ref = MonthRef {
            year: 2024,
            month: 3,
        };
        assert_eq!(month_ref.to_string(), "2024-03");
    }
}
