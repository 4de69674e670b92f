// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Label compiler: packaging record + wall-clock time → label document.
//
// Pure and deterministic. The row table carries the display semantics
// (shift stamping, unit suffixes, gross-weight fallback); the geometry pass
// turns the table into draw instructions; rendering to ZPL is delegated to
// the builder.

use chrono::{NaiveDateTime, Timelike};

use rollmark_core::types::PackagingRecord;

use crate::zpl::ZplBuilder;

// Label and printer tuning constants. Canvas is 4 × 4 in at 203 dpi.
pub const CANVAS_WIDTH: u32 = 812;
pub const CANVAS_HEIGHT: u32 = 812;
const START_X: u32 = 10;
const PADDING: u32 = 10;
const ROW_HEIGHT: u32 = 64;
const TABLE_WIDTH: u32 = 792;
const FONT_DOTS: u32 = 36;
const TEXT_INSET: u32 = 8;
const LINE_THICKNESS: u32 = 3;
const DARKNESS: u8 = 30;
const HOME_X: u32 = 0;
const HOME_Y: u32 = 10;

/// One label/value pair on the printed table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRow {
    pub label: &'static str,
    pub value: String,
}

/// A compiled, device-ready label.
///
/// Produced fresh per print request and never mutated afterwards. `rows`
/// preserves the structured table for inspection; `zpl` is the opaque
/// encoded program the printer consumes.
#[derive(Debug, Clone)]
pub struct LabelDocument {
    pub rows: Vec<LabelRow>,
    pub zpl: String,
    pub width_dots: u32,
    pub height_dots: u32,
}

impl LabelDocument {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// The program bytes as handed to a transport.
    pub fn bytes(&self) -> &[u8] {
        self.zpl.as_bytes()
    }
}

/// Compile a packaging record against the given wall-clock time.
pub fn compile(record: &PackagingRecord, now: NaiveDateTime) -> LabelDocument {
    let rows = build_rows(record, now);
    let zpl = render_rows(&rows);
    LabelDocument {
        rows,
        zpl,
        width_dots: CANVAS_WIDTH,
        height_dots: CANVAS_HEIGHT,
    }
}

/// Build the fixed twelve-row table.
fn build_rows(record: &PackagingRecord, now: NaiveDateTime) -> Vec<LabelRow> {
    let date_value = format!("{} {}", now.format("%d/%m/%Y"), shift_label(now.hour()));

    vec![
        row("Date", date_value),
        row("Roll No.", record.roll_no.clone()),
        row("Width", with_unit(&record.width, "mm")),
        row("Film Mic", with_unit(&record.film, "microns")),
        row("Coating", with_unit(&record.coat_colors, "microns")),
        row("Colour", String::new()),
        row("Style", record.style.clone()),
        row("Length", with_unit(&record.length, "m")),
        row("Net Weight", with_unit(&record.net_weight, "kg")),
        row("Core Weight", with_unit(&record.core_weight, "kg")),
        row("Gross Weight", gross_weight_value(record)),
        row("Operator", record.operator.clone()),
    ]
}

fn row(label: &'static str, value: String) -> LabelRow {
    LabelRow { label, value }
}

/// The two operational shift windows stamped next to the date:
/// 08:00–19:59 is Shift I, everything else Shift II.
fn shift_label(hour: u32) -> &'static str {
    if (8..20).contains(&hour) {
        "Shift I"
    } else {
        "Shift II"
    }
}

/// Append a unit suffix only when the value is present. An absent field
/// stays an empty string — never "0 mm".
fn with_unit(value: &str, unit: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed} {unit}")
    }
}

/// Gross weight: taken verbatim when supplied, otherwise net + core to two
/// decimal places with missing operands treated as zero. With every weight
/// field absent the row stays empty.
fn gross_weight_value(record: &PackagingRecord) -> String {
    if !record.gross_weight.trim().is_empty() {
        return with_unit(&record.gross_weight, "kg");
    }
    if record.net_weight.trim().is_empty() && record.core_weight.trim().is_empty() {
        return String::new();
    }
    let net: f64 = record.net_weight.trim().parse().unwrap_or(0.0);
    let core: f64 = record.core_weight.trim().parse().unwrap_or(0.0);
    format!("{:.2} kg", net + core)
}

/// Geometry pass: table → draw instructions → serialised program.
///
/// Outer border around the whole table, one vertical divider splitting the
/// label and value columns, a horizontal divider above each row after the
/// first, and both text placements per row at `y = index * row_height +
/// padding`.
fn render_rows(rows: &[LabelRow]) -> String {
    let mut builder = ZplBuilder::new(CANVAS_WIDTH, CANVAS_HEIGHT)
        .darkness(DARKNESS)
        .home(HOME_X, HOME_Y);

    let table_height = rows.len() as u32 * ROW_HEIGHT;
    let middle_x = START_X + TABLE_WIDTH / 2;

    builder.draw_box(START_X, PADDING, TABLE_WIDTH, table_height, LINE_THICKNESS);
    builder.draw_box(middle_x, PADDING, LINE_THICKNESS, table_height, LINE_THICKNESS);

    for (index, row) in rows.iter().enumerate() {
        let y = index as u32 * ROW_HEIGHT + PADDING;
        if index > 0 {
            builder.draw_box(START_X, y, TABLE_WIDTH, LINE_THICKNESS, LINE_THICKNESS);
        }
        builder.draw_text(START_X + TEXT_INSET, y, FONT_DOTS, FONT_DOTS, row.label);
        builder.draw_text(middle_x + TEXT_INSET, y, FONT_DOTS, FONT_DOTS, &row.value);
    }

    builder.render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn full_record() -> PackagingRecord {
        PackagingRecord {
            roll_no: "R-1042".into(),
            width: "450".into(),
            film: "23".into(),
            coat_colors: "18".into(),
            style: "Gloss".into(),
            length: "1200".into(),
            net_weight: "10".into(),
            core_weight: "2".into(),
            operator: "A. Rao".into(),
            ..Default::default()
        }
    }

    #[test]
    fn rows_are_fixed_in_order() {
        let doc = compile(&PackagingRecord::default(), at(9, 0));
        let labels: Vec<&str> = doc.rows.iter().map(|r| r.label).collect();
        assert_eq!(
            labels,
            [
                "Date",
                "Roll No.",
                "Width",
                "Film Mic",
                "Coating",
                "Colour",
                "Style",
                "Length",
                "Net Weight",
                "Core Weight",
                "Gross Weight",
                "Operator"
            ]
        );
    }

    #[test]
    fn date_row_carries_day_shift() {
        let doc = compile(&PackagingRecord::default(), at(9, 0));
        assert_eq!(doc.rows[0].value, "14/03/2026 Shift I");
    }

    #[test]
    fn shift_two_starts_at_twenty_sharp() {
        let doc = compile(&PackagingRecord::default(), at(20, 0));
        assert!(doc.rows[0].value.ends_with("Shift II"));
    }

    #[test]
    fn seven_fifty_nine_is_still_night_shift() {
        let doc = compile(&PackagingRecord::default(), at(7, 59));
        assert!(doc.rows[0].value.ends_with("Shift II"));
    }

    #[test]
    fn eight_sharp_is_day_shift() {
        let doc = compile(&PackagingRecord::default(), at(8, 0));
        assert!(doc.rows[0].value.ends_with("Shift I"));
    }

    #[test]
    fn gross_weight_is_computed_when_absent() {
        let record = PackagingRecord {
            net_weight: "10".into(),
            core_weight: "2".into(),
            ..Default::default()
        };
        let doc = compile(&record, at(9, 0));
        assert_eq!(doc.rows[10].value, "12.00 kg");
    }

    #[test]
    fn supplied_gross_weight_wins() {
        let record = PackagingRecord {
            net_weight: "10".into(),
            core_weight: "2".into(),
            gross_weight: "12.5".into(),
            ..Default::default()
        };
        let doc = compile(&record, at(9, 0));
        assert_eq!(doc.rows[10].value, "12.5 kg");
    }

    #[test]
    fn missing_operand_counts_as_zero() {
        let record = PackagingRecord {
            net_weight: "10".into(),
            ..Default::default()
        };
        let doc = compile(&record, at(9, 0));
        assert_eq!(doc.rows[10].value, "10.00 kg");
    }

    #[test]
    fn all_weights_absent_leaves_gross_empty() {
        let doc = compile(&PackagingRecord::default(), at(9, 0));
        assert_eq!(doc.rows[10].value, "");
    }

    #[test]
    fn empty_width_gets_no_unit_suffix() {
        let doc = compile(&PackagingRecord::default(), at(9, 0));
        assert_eq!(doc.rows[2].value, "");
    }

    #[test]
    fn filled_fields_get_their_units() {
        let doc = compile(&full_record(), at(9, 0));
        assert_eq!(doc.rows[2].value, "450 mm");
        assert_eq!(doc.rows[3].value, "23 microns");
        assert_eq!(doc.rows[7].value, "1200 m");
        assert_eq!(doc.rows[8].value, "10 kg");
    }

    #[test]
    fn program_has_expected_structure() {
        let doc = compile(&full_record(), at(9, 0));
        assert!(doc.zpl.starts_with("^XA"));
        assert!(doc.zpl.ends_with("^XZ"));
        assert!(doc.zpl.contains("^PW812"));
        assert!(doc.zpl.contains("^LL812"));
        assert!(doc.zpl.contains("^CI28"));
        // Outer border + vertical divider + one horizontal divider per row
        // after the first.
        assert_eq!(doc.zpl.matches("^GB").count(), 2 + doc.row_count() - 1);
        // One label field and one value field per row.
        assert_eq!(doc.zpl.matches("^FD").count(), doc.row_count() * 2);
    }

    #[test]
    fn compile_is_deterministic() {
        let record = full_record();
        let a = compile(&record, at(9, 0));
        let b = compile(&record, at(9, 0));
        assert_eq!(a.zpl, b.zpl);
    }
}
