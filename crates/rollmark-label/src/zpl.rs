// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ZPL program builder.
//
// Accumulates structured draw instructions and serialises them to a
// `^XA … ^XZ` program as a final step. The op-codes and their field order
// (`^PW`, `^LL`, `^LH`, `^CI28`, `^FO`, `^GB`, `^A0N`, `^FD`, `^FS`) are
// what the target printer firmware expects and must not be reordered.

/// One draw instruction on the label canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DrawOp {
    /// Filled box or line: `^GB` with a thickness.
    Box {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        thickness: u32,
    },
    /// Text field in the built-in scalable font: `^A0N` + `^FD`.
    Text {
        x: u32,
        y: u32,
        font_height: u32,
        font_width: u32,
        data: String,
    },
}

/// Builder for a single label program.
#[derive(Debug, Clone)]
pub struct ZplBuilder {
    width_dots: u32,
    height_dots: u32,
    home: (u32, u32),
    darkness: Option<u8>,
    label_top: Option<i32>,
    ops: Vec<DrawOp>,
}

impl ZplBuilder {
    /// Start a program for a canvas of the given size in device dots.
    pub fn new(width_dots: u32, height_dots: u32) -> Self {
        Self {
            width_dots,
            height_dots,
            home: (0, 0),
            darkness: None,
            label_top: None,
            ops: Vec::new(),
        }
    }

    /// Label home offset (`^LH`).
    pub fn home(mut self, x: u32, y: u32) -> Self {
        self.home = (x, y);
        self
    }

    /// Print darkness (`^MD`), 0–30.
    pub fn darkness(mut self, level: u8) -> Self {
        self.darkness = Some(level.min(30));
        self
    }

    /// Vertical label-top shift in dot rows (`^LT`). Only emitted when set.
    pub fn label_top(mut self, rows: i32) -> Self {
        self.label_top = Some(rows);
        self
    }

    /// Add a box outline or (with a degenerate dimension) a line.
    pub fn draw_box(&mut self, x: u32, y: u32, width: u32, height: u32, thickness: u32) {
        self.ops.push(DrawOp::Box {
            x,
            y,
            width,
            height,
            thickness,
        });
    }

    /// Add a text field. Control characters that would terminate or alter
    /// the field (`^`, `~`) are replaced with spaces.
    pub fn draw_text(&mut self, x: u32, y: u32, font_height: u32, font_width: u32, data: &str) {
        self.ops.push(DrawOp::Text {
            x,
            y,
            font_height,
            font_width,
            data: sanitize_field_data(data),
        });
    }

    /// Serialise the accumulated program to the wire format.
    pub fn render(&self) -> String {
        let mut zpl = String::with_capacity(128 + self.ops.len() * 48);
        zpl.push_str("^XA");
        if let Some(darkness) = self.darkness {
            zpl.push_str(&format!("^MD{darkness}"));
        }
        zpl.push_str(&format!("^PW{}", self.width_dots));
        zpl.push_str(&format!("^LL{}", self.height_dots));
        zpl.push_str(&format!("^LH{},{}", self.home.0, self.home.1));
        if let Some(top) = self.label_top {
            zpl.push_str(&format!("^LT{top}"));
        }
        zpl.push_str("^CI28");

        for op in &self.ops {
            match op {
                DrawOp::Box {
                    x,
                    y,
                    width,
                    height,
                    thickness,
                } => {
                    zpl.push_str(&format!("^FO{x},{y}^GB{width},{height},{thickness}^FS"));
                }
                DrawOp::Text {
                    x,
                    y,
                    font_height,
                    font_width,
                    data,
                } => {
                    zpl.push_str(&format!(
                        "^FO{x},{y}^A0N,{font_height},{font_width}^FD{data}^FS"
                    ));
                }
            }
        }

        zpl.push_str("^XZ");
        zpl
    }
}

/// `^FD` data runs until the next caret or tilde command; neither character
/// can be represented in a plain field, so both are flattened to spaces.
fn sanitize_field_data(data: &str) -> String {
    data.replace(['^', '~'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_fields_in_firmware_order() {
        let zpl = ZplBuilder::new(812, 812)
            .darkness(30)
            .home(0, 10)
            .render();
        let pw = zpl.find("^PW812").unwrap();
        let ll = zpl.find("^LL812").unwrap();
        let lh = zpl.find("^LH0,10").unwrap();
        let ci = zpl.find("^CI28").unwrap();
        assert!(zpl.starts_with("^XA^MD30"));
        assert!(pw < ll && ll < lh && lh < ci);
        assert!(zpl.ends_with("^XZ"));
    }

    #[test]
    fn label_top_only_when_set() {
        assert!(!ZplBuilder::new(812, 812).render().contains("^LT"));
        assert!(
            ZplBuilder::new(812, 812)
                .label_top(-120)
                .render()
                .contains("^LT-120")
        );
    }

    #[test]
    fn box_and_text_serialisation() {
        let mut builder = ZplBuilder::new(812, 812);
        builder.draw_box(10, 10, 792, 768, 3);
        builder.draw_text(18, 10, 36, 36, "Roll No.");
        let zpl = builder.render();
        assert!(zpl.contains("^FO10,10^GB792,768,3^FS"));
        assert!(zpl.contains("^FO18,10^A0N,36,36^FDRoll No.^FS"));
    }

    #[test]
    fn field_data_is_sanitized() {
        let mut builder = ZplBuilder::new(812, 812);
        builder.draw_text(0, 0, 36, 36, "bad^FS~input");
        assert!(builder.render().contains("^FDbad FS input^FS"));
    }
}
