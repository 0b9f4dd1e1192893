use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Canonical business units plus the synthetic "all units" aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKey {
    All,
    CampinasShopping,
    OuroVerde,
    CentroCambui,
    ResolveSaude,
}

impl UnitKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitKey::All => "all",
            UnitKey::CampinasShopping => "campinas_shopping",
            UnitKey::OuroVerde => "ouro_verde",
            UnitKey::CentroCambui => "centro_cambui",
            UnitKey::ResolveSaude => "resolve_saude",
        }
    }

    /// Parses a request-supplied unit filter. Unknown or empty values fall
    /// back to `All` so the report stays renderable.
    pub fn parse_filter(raw: Option<&str>) -> UnitKey {
        let key = raw.unwrap_or("all").trim();
        all_units()
            .iter()
            .find(|def| def.key.as_str() == key)
            .map(|def| def.key)
            .unwrap_or(UnitKey::All)
    }
}

/// One report section: a unit key and its display label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionDef {
    pub key: UnitKey,
    pub label: String,
}

pub fn all_units() -> Vec<SectionDef> {
    vec![
        SectionDef {
            key: UnitKey::All,
            label: "Todas unidades".to_string(),
        },
        SectionDef {
            key: UnitKey::CampinasShopping,
            label: "Campinas Shopping".to_string(),
        },
        SectionDef {
            key: UnitKey::OuroVerde,
            label: "Ouro Verde".to_string(),
        },
        SectionDef {
            key: UnitKey::CentroCambui,
            label: "Centro Cambui".to_string(),
        },
        SectionDef {
            key: UnitKey::ResolveSaude,
            label: "ResolveSaude".to_string(),
        },
    ]
}

/// NFD-decomposes, strips combining marks, uppercases, trims and collapses
/// internal whitespace. Ledger unit labels are free text.
pub fn normalize_label(value: &str) -> String {
    let stripped: String = value
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_uppercase();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Maps a raw unit label to its canonical unit, or `None` when no rule
/// matches (the row then counts only toward the `All` aggregate).
///
/// Rules are checked in order; "CENTRO" alone must not shadow labels that a
/// later keyword would classify, so the broader substrings come first.
pub fn classify(unit_label: &str) -> Option<UnitKey> {
    let norm = normalize_label(unit_label);
    if norm.is_empty() {
        return None;
    }
    if norm.contains("SHOPPING CAMPINAS") || norm.contains("CAMPINAS SHOPPING") {
        return Some(UnitKey::CampinasShopping);
    }
    if norm.contains("OURO VERDE") {
        return Some(UnitKey::OuroVerde);
    }
    if norm.contains("CENTRO CAMBUI") || norm == "CENTRO" {
        return Some(UnitKey::CentroCambui);
    }
    if norm.contains("RESOLVE") || norm.contains("RESOLVECARD") {
        return Some(UnitKey::ResolveSaude);
    }
    None
}
