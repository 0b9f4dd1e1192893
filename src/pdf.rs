use crate::error::{ReportError, Result};
use crate::payload::ReportPayload;
use crate::section::SectionReport;
use crate::theme::{
    format_currency, format_datetime, format_percent, month_label, month_short_label, Tone,
    BLACK, BLUE, DARK_GREEN, GRID_LINE, LIGHT_BLUE_BG, LIGHT_GREEN_BG, NAVY, REPORT_TITLE, TEAL,
    WHITE,
};
use log::debug;
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Polygon, Rgb,
};

// A3 landscape, all coordinates in millimetres from the bottom-left origin.
const PAGE_WIDTH: f32 = 420.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 12.0;
const USABLE_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const HEADER_BAND_HEIGHT: f32 = 15.0;
const LEGEND_HEIGHT: f32 = 7.0;
const CONTENT_TOP: f32 = PAGE_HEIGHT - MARGIN - HEADER_BAND_HEIGHT - LEGEND_HEIGHT;
const CONTENT_HEIGHT: f32 = CONTENT_TOP - MARGIN - FOOTER_HEIGHT;
const FOOTER_HEIGHT: f32 = 6.0;

const ROW_HEIGHT: f32 = 8.0;
const SECTION_TITLE_HEIGHT: f32 = 9.0;
const GROWTH_BLOCK_HEIGHT: f32 = 14.0;
const SECTION_GAP: f32 = 6.0;

const YEAR_COL: f32 = 20.0;
const TOTAL_COL: f32 = 34.0;
const MONTH_COL: f32 = (USABLE_WIDTH - YEAR_COL - TOTAL_COL) / 12.0;

const BODY_FONT_SIZE: f32 = 8.0;
const CELL_PADDING: f32 = 1.5;
const LINE_WIDTH: f32 = 0.4;

// Conversion and the average Helvetica advance (in em) used to measure text.
const PT_TO_MM: f32 = 0.352_778;
const AVG_GLYPH_ADVANCE: f32 = 0.5;

const LEGEND_TEXT: &str =
    "Celulas em verde indicam o maior faturamento historico no respectivo mes.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Copy)]
struct CellStyle {
    bg: Option<Tone>,
    color: Tone,
    bold: bool,
    align: Align,
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Approximate rendered width of `text` at `font_size` points, in mm.
pub fn text_width_mm(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * AVG_GLYPH_ADVANCE * PT_TO_MM
}

/// Shortens `text` with an ellipsis until it fits into `available` mm,
/// falling back to a single truncated character when not even "x..." fits.
pub fn fit_text(text: &str, available: f32, font_size: f32) -> String {
    if text_width_mm(text, font_size) <= available {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while chars.len() > 1 {
        chars.pop();
        let mut candidate: String = chars.iter().collect();
        candidate.push_str("...");
        if text_width_mm(&candidate, font_size) <= available {
            return candidate;
        }
    }
    chars.into_iter().collect()
}

/// Estimated height of one section block: title band, header row, year rows,
/// growth summary, trailing gap. Computed up front so pagination never has to
/// detect overflow mid-draw.
pub fn section_height(row_count: usize) -> f32 {
    SECTION_TITLE_HEIGHT
        + ROW_HEIGHT
        + row_count as f32 * ROW_HEIGHT
        + GROWTH_BLOCK_HEIGHT
        + SECTION_GAP
}

/// Assigns sections to pages. A section is atomic: when its estimate exceeds
/// the space left on the current page it moves whole to a fresh page. An
/// empty payload still plans one (header-only) page.
pub fn plan_pages(payload: &ReportPayload) -> Vec<Vec<usize>> {
    let mut pages: Vec<Vec<usize>> = vec![Vec::new()];
    let mut remaining = CONTENT_HEIGHT;
    for (idx, section) in payload.sections.iter().enumerate() {
        let height = section_height(section.rows.len());
        let current_is_empty = pages.last().map(|p| p.is_empty()).unwrap_or(true);
        if height > remaining && !current_is_empty {
            debug!(
                "Section {} ({:.1}mm) exceeds remaining {:.1}mm, starting new page",
                idx, height, remaining
            );
            pages.push(Vec::new());
            remaining = CONTENT_HEIGHT;
        }
        if let Some(page) = pages.last_mut() {
            page.push(idx);
        }
        remaining -= height;
    }
    pages
}

/// Renders the payload into a paginated A3-landscape document and returns
/// the pdf bytes.
pub fn render_document(payload: &ReportPayload) -> Result<Vec<u8>> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(REPORT_TITLE, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "page-1");
    let fonts = Fonts {
        regular: builtin_font(&doc, BuiltinFont::Helvetica)?,
        bold: builtin_font(&doc, BuiltinFont::HelveticaBold)?,
    };

    let unit_label = payload
        .available_units
        .iter()
        .find(|def| def.key == payload.unit_filter)
        .map(|def| def.label.clone())
        .unwrap_or_else(|| payload.unit_filter.as_str().to_string());
    let context_line = format!(
        "Unidade: {} | Referencia: {}/{} | Gerado em: {}",
        unit_label,
        month_label(payload.reference_month),
        payload.reference_year,
        format_datetime(payload.generated_at)
    );

    let plan = plan_pages(payload);
    for (page_idx, section_indices) in plan.iter().enumerate() {
        let layer = if page_idx == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(
                Mm(PAGE_WIDTH),
                Mm(PAGE_HEIGHT),
                format!("page-{}", page_idx + 1),
            );
            doc.get_page(page).get_layer(layer)
        };
        layer.set_outline_color(rgb(GRID_LINE));
        layer.set_outline_thickness(LINE_WIDTH);

        draw_page_header(&layer, &fonts, &context_line);
        draw_page_number(&layer, &fonts, page_idx + 1);

        let mut cursor = CONTENT_TOP;
        for &section_idx in section_indices {
            draw_section(&layer, &fonts, &payload.sections[section_idx], payload, &mut cursor);
        }
    }

    doc.save_to_bytes()
        .map_err(|e| ReportError::PdfError(e.to_string()))
}

fn builtin_font(doc: &PdfDocumentReference, font: BuiltinFont) -> Result<IndirectFontRef> {
    doc.add_builtin_font(font)
        .map_err(|e| ReportError::PdfError(e.to_string()))
}

fn rgb(tone: Tone) -> Color {
    let (r, g, b) = tone.unit_rgb();
    Color::Rgb(Rgb::new(r, g, b, None))
}

fn fill_rect(layer: &PdfLayerReference, x: f32, y_top: f32, width: f32, height: f32, tone: Tone) {
    layer.set_fill_color(rgb(tone));
    let ring = vec![
        (Point::new(Mm(x), Mm(y_top)), false),
        (Point::new(Mm(x + width), Mm(y_top)), false),
        (Point::new(Mm(x + width), Mm(y_top - height)), false),
        (Point::new(Mm(x), Mm(y_top - height)), false),
    ];
    layer.add_polygon(Polygon {
        rings: vec![ring],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    });
}

fn stroke_rect(layer: &PdfLayerReference, x: f32, y_top: f32, width: f32, height: f32) {
    let line = Line {
        points: vec![
            (Point::new(Mm(x), Mm(y_top)), false),
            (Point::new(Mm(x + width), Mm(y_top)), false),
            (Point::new(Mm(x + width), Mm(y_top - height)), false),
            (Point::new(Mm(x), Mm(y_top - height)), false),
        ],
        is_closed: true,
    };
    layer.add_line(line);
}

/// The cell-draw primitive: optional background, thin border, and text
/// truncated and aligned from its measured width.
fn draw_cell(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    x: f32,
    y_top: f32,
    width: f32,
    height: f32,
    text: &str,
    style: CellStyle,
) {
    if let Some(bg) = style.bg {
        fill_rect(layer, x, y_top, width, height, bg);
    }
    stroke_rect(layer, x, y_top, width, height);

    let available = width - 2.0 * CELL_PADDING;
    let fitted = fit_text(text, available, BODY_FONT_SIZE);
    let text_width = text_width_mm(&fitted, BODY_FONT_SIZE);
    let text_x = match style.align {
        Align::Left => x + CELL_PADDING,
        Align::Right => x + width - CELL_PADDING - text_width,
        Align::Center => x + (width - text_width) / 2.0,
    };
    let baseline = y_top - height + (height - BODY_FONT_SIZE * PT_TO_MM) / 2.0;

    let font = if style.bold { &fonts.bold } else { &fonts.regular };
    layer.set_fill_color(rgb(style.color));
    layer.use_text(
        fitted,
        BODY_FONT_SIZE,
        Mm(text_x),
        Mm(baseline),
        font,
    );
}

fn draw_page_header(layer: &PdfLayerReference, fonts: &Fonts, context_line: &str) {
    let top = PAGE_HEIGHT - MARGIN;
    fill_rect(layer, MARGIN, top, USABLE_WIDTH, HEADER_BAND_HEIGHT, NAVY);

    layer.set_fill_color(rgb(WHITE));
    layer.use_text(
        REPORT_TITLE,
        16.0,
        Mm(MARGIN + 4.0),
        Mm(top - 7.0),
        &fonts.bold,
    );
    layer.use_text(
        context_line,
        9.0,
        Mm(MARGIN + 4.0),
        Mm(top - 12.5),
        &fonts.regular,
    );

    layer.set_fill_color(rgb(DARK_GREEN));
    layer.use_text(
        LEGEND_TEXT,
        8.5,
        Mm(MARGIN),
        Mm(top - HEADER_BAND_HEIGHT - 4.5),
        &fonts.bold,
    );
}

fn draw_page_number(layer: &PdfLayerReference, fonts: &Fonts, number: usize) {
    layer.set_fill_color(rgb(BLACK));
    layer.use_text(
        number.to_string(),
        BODY_FONT_SIZE,
        Mm(PAGE_WIDTH / 2.0),
        Mm(MARGIN / 2.0),
        &fonts.regular,
    );
}

fn draw_section(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    section: &SectionReport,
    payload: &ReportPayload,
    cursor: &mut f32,
) {
    // Section title band
    let band = format!(
        "{} | Referencia: {}/{}",
        section.label,
        month_label(payload.reference_month),
        payload.reference_year
    );
    fill_rect(layer, MARGIN, *cursor, USABLE_WIDTH, SECTION_TITLE_HEIGHT, NAVY);
    layer.set_fill_color(rgb(WHITE));
    layer.use_text(
        band,
        10.0,
        Mm(MARGIN + 2.0),
        Mm(*cursor - SECTION_TITLE_HEIGHT + 3.0),
        &fonts.bold,
    );
    *cursor -= SECTION_TITLE_HEIGHT;

    // Header row
    let header_style = CellStyle {
        bg: Some(BLUE),
        color: WHITE,
        bold: true,
        align: Align::Center,
    };
    let mut x = MARGIN;
    draw_cell(layer, fonts, x, *cursor, YEAR_COL, ROW_HEIGHT, "Ano", header_style);
    x += YEAR_COL;
    for month in 1..=12u32 {
        draw_cell(
            layer,
            fonts,
            x,
            *cursor,
            MONTH_COL,
            ROW_HEIGHT,
            month_label(month),
            header_style,
        );
        x += MONTH_COL;
    }
    draw_cell(layer, fonts, x, *cursor, TOTAL_COL, ROW_HEIGHT, "Total", header_style);
    *cursor -= ROW_HEIGHT;

    // Year rows
    for (row_idx, year_row) in section.rows.iter().enumerate() {
        let zebra = row_idx % 2 == 1;
        let zebra_bg = if zebra { Some(Tone(0xF8, 0xFA, 0xFD)) } else { None };
        let mut x = MARGIN;
        draw_cell(
            layer,
            fonts,
            x,
            *cursor,
            YEAR_COL,
            ROW_HEIGHT,
            &year_row.year.to_string(),
            CellStyle {
                bg: zebra_bg,
                color: NAVY,
                bold: true,
                align: Align::Center,
            },
        );
        x += YEAR_COL;
        for month_idx in 0..12 {
            let highlighted = year_row.highlights[month_idx];
            draw_cell(
                layer,
                fonts,
                x,
                *cursor,
                MONTH_COL,
                ROW_HEIGHT,
                &format_currency(year_row.months[month_idx]),
                CellStyle {
                    bg: if highlighted {
                        Some(LIGHT_GREEN_BG)
                    } else {
                        zebra_bg
                    },
                    color: if highlighted { DARK_GREEN } else { BLACK },
                    bold: highlighted,
                    align: Align::Right,
                },
            );
            x += MONTH_COL;
        }
        draw_cell(
            layer,
            fonts,
            x,
            *cursor,
            TOTAL_COL,
            ROW_HEIGHT,
            &format_currency(year_row.total),
            CellStyle {
                bg: Some(if zebra {
                    Tone(0xED, 0xF3, 0xFC)
                } else {
                    LIGHT_BLUE_BG
                }),
                color: NAVY,
                bold: true,
                align: Align::Right,
            },
        );
        *cursor -= ROW_HEIGHT;
    }

    // Growth summary: two side-by-side tinted boxes
    *cursor -= 3.0;
    let box_width = (USABLE_WIDTH - 8.0) / 2.0;
    let box_height = GROWTH_BLOCK_HEIGHT - 3.0;
    let short = month_short_label(payload.reference_month);

    fill_rect(layer, MARGIN, *cursor, box_width, box_height, LIGHT_GREEN_BG);
    layer.set_fill_color(rgb(DARK_GREEN));
    layer.use_text(
        format!(
            "Crescimento vs melhor ano (Jan..{}): {}",
            short,
            format_percent(section.growth_vs_best)
        ),
        10.0,
        Mm(MARGIN + 4.0),
        Mm(*cursor - box_height / 2.0 - 1.5),
        &fonts.bold,
    );

    let right_x = MARGIN + box_width + 8.0;
    fill_rect(layer, right_x, *cursor, box_width, box_height, LIGHT_BLUE_BG);
    layer.set_fill_color(rgb(TEAL));
    layer.use_text(
        format!(
            "Crescimento vs ano anterior (Jan..{}): {}",
            short,
            format_percent(section.growth_vs_previous_year)
        ),
        10.0,
        Mm(right_x + 4.0),
        Mm(*cursor - box_height / 2.0 - 1.5),
        &fonts.bold,
    );

    *cursor -= GROWTH_BLOCK_HEIGHT - 3.0;
    *cursor -= SECTION_GAP;
}
