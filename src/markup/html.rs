//! # Tagged Lines to HTML
//!
//! Converts a formatted [`Document`] into HTML for the rich-text sinks. The
//! output is deliberately loose: `<EB>` and `<DB>` become bare `<b>` and
//! `</b>` that may span paragraphs, and line content is passed through as
//! markup. [`to_repaired`] runs the result through the repair parser.
//!
//! | Line | HTML |
//! |------|------|
//! | `<L>` `<R>` `<C>` | `<p align=…>` |
//! | `<T>` | one-cell table, bold, centered |
//! | `<BX>` | one-cell bordered table |
//! | `<F>` | `<hr/>` |
//! | justify run | one `<table>` with `<colgroup>` widths in percent |
//! | `<EB>` / `<DB>` | `<b>` / `</b>` |
//! | `<BMP:path>` | `<img src=path/>` |
//! | generic | content followed by `<br/>` |

use super::repair::{RepairedMarkup, repair};
use super::tokenizer::escape;
use crate::layout::justify::{COLUMN_DELIMITER, is_tabular, weighted_len};
use crate::layout::{Document, FormatKind, LineFormatter};
use crate::template::TagKind;

/// Wide-glyph ratio assumed by proportional HTML fonts when the justify tag
/// does not give one.
pub const PROPORTIONAL_RATIO: f32 = 1.5;

/// Column widths in percent, re-measured with weighted glyph widths.
pub fn column_percentages(run: &[&LineFormatter]) -> Vec<u32> {
    let mut widths: Vec<f32> = Vec::new();
    for line in run {
        if !is_tabular(&line.content) {
            continue;
        }
        let ratio = line.tag.ratio.unwrap_or(PROPORTIONAL_RATIO);
        for (i, cell) in line.content.split(COLUMN_DELIMITER).enumerate() {
            let w = weighted_len(cell, ratio).max(1.0);
            match widths.get_mut(i) {
                Some(prev) => *prev = prev.max(w),
                None => widths.push(w),
            }
        }
    }
    let total: f32 = widths.iter().sum();
    if total <= 0.0 {
        return Vec::new();
    }
    widths
        .iter()
        .map(|w| ((w / total) * 100.0).round().max(1.0) as u32)
        .collect()
}

fn size_open(line: &LineFormatter) -> String {
    let scale = line.tag.width.max(line.tag.height);
    if scale == 0 {
        String::new()
    } else {
        format!("<font size=\"+{}\">", scale)
    }
}

fn size_close(line: &LineFormatter) -> &'static str {
    if line.tag.width.max(line.tag.height) == 0 {
        ""
    } else {
        "</font>"
    }
}

fn push_table(out: &mut String, run: &[&LineFormatter]) {
    let percents = column_percentages(run);
    let columns = percents.len().max(1);

    out.push_str("<table width=\"100%\">");
    if !percents.is_empty() {
        out.push_str("<colgroup>");
        for p in &percents {
            out.push_str(&format!("<col width=\"{}%\"/>", p));
        }
        out.push_str("</colgroup>");
    }
    for line in run {
        out.push_str("<tr>");
        if is_tabular(&line.content) {
            for (i, cell) in line.content.split(COLUMN_DELIMITER).enumerate() {
                if i == 0 {
                    out.push_str(&format!("<td>{}</td>", cell));
                } else {
                    out.push_str(&format!("<td align=\"right\">{}</td>", cell));
                }
            }
        } else {
            out.push_str(&format!(
                "<td colspan=\"{}\">{}</td>",
                columns, line.content
            ));
        }
        out.push_str("</tr>");
    }
    out.push_str("</table>");
}

fn push_line(out: &mut String, line: &LineFormatter) {
    let content = &line.content;
    match line.tag.kind {
        TagKind::BoldOn => out.push_str("<b>"),
        TagKind::BoldOff => out.push_str("</b>"),
        TagKind::Bitmap => {
            if let Some(path) = line.tag.arg_str(0) {
                out.push_str(&format!("<img src=\"{}\"/>", escape(path)));
            }
        }
        _ if line.is_control() => {}
        _ => match line.kind {
            FormatKind::LeftAlign | FormatKind::RightAlign | FormatKind::CenterAlign => {
                let align = match line.kind {
                    FormatKind::RightAlign => "right",
                    FormatKind::CenterAlign => "center",
                    _ => "left",
                };
                out.push_str(&format!(
                    "<p align=\"{}\">{}{}{}</p>",
                    align,
                    size_open(line),
                    content,
                    size_close(line)
                ));
            }
            FormatKind::Title => out.push_str(&format!(
                "<table width=\"100%\"><tr><td align=\"center\"><b>{}{}{}</b></td></tr></table>",
                size_open(line),
                content,
                size_close(line)
            )),
            FormatKind::Box => out.push_str(&format!(
                "<table width=\"100%\" border=\"1\"><tr><td align=\"center\">{}{}{}</td></tr></table>",
                size_open(line),
                content,
                size_close(line)
            )),
            FormatKind::HorizontalRule => out.push_str("<hr/>"),
            // Justify lines arrive here only via push_table
            FormatKind::Justify | FormatKind::Generic => {
                out.push_str(content);
                out.push_str("<br/>");
            }
        },
    }
}

/// Loose HTML for a document, one construct per line or justify run.
pub fn document_to_html(document: &Document) -> String {
    let lines = document.lines();
    let mut out = String::new();
    let mut i = 0;
    while i < lines.len() {
        if lines[i].kind == FormatKind::Justify {
            let start = i;
            while i < lines.len() && lines[i].kind == FormatKind::Justify {
                i += 1;
            }
            let run: Vec<&LineFormatter> = lines[start..i].iter().collect();
            push_table(&mut out, &run);
            continue;
        }
        push_line(&mut out, &lines[i]);
        i += 1;
    }
    out
}

/// HTML for a document, repaired into a well-formed tree.
pub fn to_repaired(document: &Document) -> RepairedMarkup {
    repair(&document_to_html(document))
}
