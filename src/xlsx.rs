use crate::error::Result;
use crate::payload::ReportPayload;
use crate::theme::{
    format_datetime, format_percent, month_label, CURRENCY_NUM_FORMAT, GROWTH_VS_BEST_LABEL,
    GROWTH_VS_PREVIOUS_LABEL, LEGEND_NOTE, REPORT_TITLE, BLUE, DARK_GREEN, GRID_LINE,
    LIGHT_GREEN_BG, META_BG, NAVY, TEAL, WHITE, ZEBRA_BG, ZEBRA_TOTAL_BG,
};
use crate::theme::{Tone, MONTH_NAMES};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};

const LAST_COL: u16 = 13; // Ano + 12 months + Total

fn color(tone: Tone) -> Color {
    Color::RGB(tone.hex())
}

fn bordered() -> Format {
    Format::new()
        .set_border(FormatBorder::Thin)
        .set_border_color(color(GRID_LINE))
}

/// Renders the payload into a styled workbook and returns the xlsx bytes.
///
/// A payload with zero sections still yields a valid workbook containing
/// only the banner rows.
pub fn render_workbook(payload: &ReportPayload) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(REPORT_TITLE)?;

    sheet.set_column_width(0, 10.0)?;
    for col in 1..=12u16 {
        sheet.set_column_width(col, 16.0)?;
    }
    sheet.set_column_width(13, 18.0)?;
    sheet.set_freeze_panes(4, 0)?;

    let title_format = bordered()
        .set_bold()
        .set_font_size(16)
        .set_font_color(color(WHITE))
        .set_background_color(color(NAVY))
        .set_align(FormatAlign::Left)
        .set_align(FormatAlign::VerticalCenter);
    sheet.merge_range(0, 0, 0, LAST_COL, REPORT_TITLE, &title_format)?;

    let meta_format = bordered()
        .set_font_size(11)
        .set_background_color(color(META_BG))
        .set_align(FormatAlign::Left)
        .set_align(FormatAlign::VerticalCenter);
    let meta = format!(
        "Gerado em: {} | Referencia: {}/{}",
        format_datetime(payload.generated_at),
        month_label(payload.reference_month),
        payload.reference_year
    );
    sheet.merge_range(1, 0, 1, LAST_COL, &meta, &meta_format)?;

    let note_format = bordered()
        .set_font_size(10)
        .set_font_color(color(DARK_GREEN))
        .set_background_color(color(LIGHT_GREEN_BG))
        .set_align(FormatAlign::Left)
        .set_align(FormatAlign::VerticalCenter);
    sheet.merge_range(2, 0, 2, LAST_COL, LEGEND_NOTE, &note_format)?;

    let section_title_format = bordered()
        .set_bold()
        .set_font_size(12)
        .set_font_color(color(WHITE))
        .set_background_color(color(NAVY))
        .set_align(FormatAlign::Left)
        .set_align(FormatAlign::VerticalCenter);
    let header_format = bordered()
        .set_bold()
        .set_font_color(color(WHITE))
        .set_background_color(color(BLUE))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    let year_format = bordered()
        .set_bold()
        .set_font_color(color(NAVY))
        .set_align(FormatAlign::Center);
    let year_zebra_format = year_format.clone().set_background_color(color(ZEBRA_BG));
    let money_format = bordered()
        .set_num_format(CURRENCY_NUM_FORMAT)
        .set_align(FormatAlign::Right);
    let money_zebra_format = money_format.clone().set_background_color(color(ZEBRA_BG));
    let money_highlight_format = money_format
        .clone()
        .set_bold()
        .set_font_color(color(DARK_GREEN))
        .set_background_color(color(LIGHT_GREEN_BG));
    let total_format = money_format.clone().set_bold().set_font_color(color(NAVY));
    let total_zebra_format = total_format
        .clone()
        .set_background_color(color(ZEBRA_TOTAL_BG));
    let growth_label_format = bordered().set_bold().set_font_color(color(NAVY));
    let growth_best_format = bordered().set_bold().set_font_color(color(DARK_GREEN));
    let growth_previous_format = bordered().set_bold().set_font_color(color(TEAL));

    let mut cursor: u32 = 4;
    for section in &payload.sections {
        cursor += 1; // blank spacer row between blocks

        let band = format!(
            "{} | Referencia: {}/{}",
            section.label,
            month_label(payload.reference_month),
            payload.reference_year
        );
        sheet.merge_range(cursor, 0, cursor, LAST_COL, &band, &section_title_format)?;
        cursor += 1;

        sheet.write_string_with_format(cursor, 0, "Ano", &header_format)?;
        for (idx, name) in MONTH_NAMES.iter().enumerate() {
            sheet.write_string_with_format(cursor, 1 + idx as u16, *name, &header_format)?;
        }
        sheet.write_string_with_format(cursor, 13, "Total", &header_format)?;
        cursor += 1;

        for year_row in &section.rows {
            let zebra = (cursor + 1) % 2 == 0;
            let (year_fmt, total_fmt) = if zebra {
                (&year_zebra_format, &total_zebra_format)
            } else {
                (&year_format, &total_format)
            };
            sheet.write_number_with_format(cursor, 0, year_row.year as f64, year_fmt)?;
            for idx in 0..12 {
                let fmt = if year_row.highlights[idx] {
                    &money_highlight_format
                } else if zebra {
                    &money_zebra_format
                } else {
                    &money_format
                };
                sheet.write_number_with_format(cursor, 1 + idx as u16, year_row.months[idx], fmt)?;
            }
            sheet.write_number_with_format(cursor, 13, year_row.total, total_fmt)?;
            cursor += 1;
        }

        cursor += 1;
        sheet.write_string_with_format(cursor, 0, GROWTH_VS_BEST_LABEL, &growth_label_format)?;
        sheet.write_string_with_format(
            cursor,
            1,
            &format_percent(section.growth_vs_best),
            &growth_best_format,
        )?;
        cursor += 1;
        sheet.write_string_with_format(cursor, 0, GROWTH_VS_PREVIOUS_LABEL, &growth_label_format)?;
        sheet.write_string_with_format(
            cursor,
            1,
            &format_percent(section.growth_vs_previous_year),
            &growth_previous_format,
        )?;
        cursor += 1;
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::assemble_payload;
    use crate::units::UnitKey;
    use chrono::NaiveDate;

    fn now() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 10)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_renders_openable_workbook() {
        let rows = vec![
            crate::ledger::RevenueRow {
                year: 2023,
                month: 1,
                unit_label: "Ouro Verde".to_string(),
                amount: 1000.0,
            },
            crate::ledger::RevenueRow {
                year: 2024,
                month: 1,
                unit_label: "Ouro Verde".to_string(),
                amount: 1500.0,
            },
        ];
        let payload = assemble_payload(&rows, UnitKey::All, None, now());
        let bytes = render_workbook(&payload).unwrap();
        // xlsx is a zip container
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_empty_payload_still_renders() {
        let payload = assemble_payload(&[], UnitKey::OuroVerde, None, now());
        let bytes = render_workbook(&payload).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
