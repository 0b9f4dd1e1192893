//! Shared palette and pt-BR formatting for both renderers.
//!
//! The spreadsheet and document outputs must stay visually consistent, so
//! every color and label both of them use lives here and nowhere else.

/// An RGB color, stored once and emitted as `0xRRGGBB` for the workbook or
/// as unit-range components for the document renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tone(pub u8, pub u8, pub u8);

impl Tone {
    pub fn hex(&self) -> u32 {
        ((self.0 as u32) << 16) | ((self.1 as u32) << 8) | (self.2 as u32)
    }

    pub fn unit_rgb(&self) -> (f32, f32, f32) {
        (
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        )
    }
}

pub const NAVY: Tone = Tone(0x05, 0x3F, 0x74);
pub const BLUE: Tone = Tone(0x17, 0x40, 0x7E);
pub const TEAL: Tone = Tone(0x22, 0x9A, 0x8A);
pub const DARK_GREEN: Tone = Tone(0x25, 0x9D, 0x89);
pub const BLACK: Tone = Tone(0x00, 0x00, 0x00);
pub const WHITE: Tone = Tone(0xFF, 0xFF, 0xFF);
pub const LIGHT_BLUE_BG: Tone = Tone(0xEA, 0xF2, 0xFC);
pub const LIGHT_GREEN_BG: Tone = Tone(0xE6, 0xF7, 0xEF);
pub const META_BG: Tone = Tone(0xF2, 0xF7, 0xFD);
pub const ZEBRA_BG: Tone = Tone(0xF9, 0xFB, 0xFF);
pub const ZEBRA_TOTAL_BG: Tone = Tone(0xF0, 0xF5, 0xFF);
pub const GRID_LINE: Tone = Tone(0xD7, 0xDF, 0xEA);

pub const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Marco",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

pub const MONTH_SHORT: [&str; 12] = [
    "JAN", "FEV", "MAR", "ABR", "MAI", "JUN", "JUL", "AGO", "SET", "OUT", "NOV", "DEZ",
];

pub const REPORT_TITLE: &str = "Faturamento Geral";
pub const LEGEND_NOTE: &str =
    "Destaque verde: maior faturamento historico do mes (comparacao entre anos).";
pub const GROWTH_VS_BEST_LABEL: &str = "Crescimento vs melhor ano (acumulado Jan..mes ref)";
pub const GROWTH_VS_PREVIOUS_LABEL: &str = "Crescimento vs ano anterior (acumulado Jan..mes ref)";
pub const CURRENCY_NUM_FORMAT: &str = "\"R$\" #,##0.00";

/// Full month name for a 1-based month, `-` when out of range.
pub fn month_label(month: u32) -> &'static str {
    MONTH_NAMES
        .get((month as usize).wrapping_sub(1))
        .copied()
        .unwrap_or("-")
}

pub fn month_short_label(month: u32) -> &'static str {
    MONTH_SHORT
        .get((month as usize).wrapping_sub(1))
        .copied()
        .unwrap_or("-")
}

/// `R$ 1.234,56` with `.` thousands separators and `,` decimals.
pub fn format_currency(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}R$ {grouped},{frac:02}")
}

/// `12,3%` with a single fractional digit, `-` for an undefined growth.
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}%", v).replace('.', ","),
        None => "-".to_string(),
    }
}

/// `dd/mm/YYYY HH:MM:SS`, the timestamp format the report headers use.
pub fn format_datetime(value: chrono::NaiveDateTime) -> String {
    value.format("%d/%m/%Y %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "R$ 0,00");
        assert_eq!(format_currency(1234.5), "R$ 1.234,50");
        assert_eq!(format_currency(1_234_567.891), "R$ 1.234.567,89");
        assert_eq!(format_currency(-42.0), "-R$ 42,00");
        assert_eq!(format_currency(f64::NAN), "R$ 0,00");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(Some(80.0)), "80,0%");
        assert_eq!(format_percent(Some(-12.34)), "-12,3%");
        assert_eq!(format_percent(None), "-");
    }

    #[test]
    fn test_tone_conversions() {
        assert_eq!(NAVY.hex(), 0x053F74);
        let (r, g, b) = WHITE.unit_rgb();
        assert_eq!((r, g, b), (1.0, 1.0, 1.0));
    }

    #[test]
    fn test_month_labels() {
        assert_eq!(month_label(1), "Janeiro");
        assert_eq!(month_label(12), "Dezembro");
        assert_eq!(month_label(0), "-");
        assert_eq!(month_label(13), "-");
        assert_eq!(month_short_label(2), "FEV");
    }
}
