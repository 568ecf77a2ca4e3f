//! # Rich Text Document
//!
//! A small structured document model used by the system-queue sinks:
//! paragraphs of styled runs, tables, rules and images. It can be built from
//! a formatted [`Document`] (monospace, one paragraph per printed row) or
//! from a repaired markup tree, and rendered to a standalone HTML page.

use crate::layout::{Document, FormatKind};
use crate::markup::repair::{Element, Node};
use crate::markup::tokenizer::escape;
use crate::protocol::text::Alignment;
use crate::template::TagKind;

/// Styled text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    /// Extra size steps (0 = normal)
    pub scale: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub align: Alignment,
    pub runs: Vec<Run>,
    pub colspan: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph {
        align: Alignment,
        runs: Vec<Run>,
        /// Monospace, whitespace preserved
        preformatted: bool,
    },
    Table {
        /// Column widths in percent
        widths: Vec<u32>,
        rows: Vec<Vec<Cell>>,
        bordered: bool,
    },
    Rule,
    Image {
        src: String,
    },
}

#[derive(Debug, Clone, Copy, Default)]
struct Style {
    bold: bool,
    scale: u8,
}

fn push_run(runs: &mut Vec<Run>, text: &str, style: Style) {
    if text.is_empty() {
        return;
    }
    match runs.last_mut() {
        Some(last) if last.bold == style.bold && last.scale == style.scale => {
            last.text.push_str(text)
        }
        _ => runs.push(Run {
            text: text.to_string(),
            bold: style.bold,
            scale: style.scale,
        }),
    }
}

fn parse_align(value: Option<&str>) -> Alignment {
    match value.map(|v| v.to_ascii_lowercase()).as_deref() {
        Some("center") => Alignment::Center,
        Some("right") => Alignment::Right,
        _ => Alignment::Left,
    }
}

fn styled(element: &Element, style: Style) -> Style {
    match element.name.as_str() {
        "b" | "strong" => Style {
            bold: true,
            ..style
        },
        "big" => Style {
            scale: style.scale.saturating_add(1),
            ..style
        },
        "font" => {
            let step = element
                .attr("size")
                .and_then(|s| s.trim_start_matches('+').parse::<u8>().ok())
                .unwrap_or(0);
            Style {
                scale: style.scale.saturating_add(step),
                ..style
            }
        }
        _ => style,
    }
}

/// Flatten an element's content into runs; `<br>` becomes a newline.
fn inline_runs(element: &Element, style: Style, runs: &mut Vec<Run>) {
    for child in &element.children {
        match child {
            Node::Text(t) => push_run(runs, t, style),
            Node::Element(e) if e.name == "br" => push_run(runs, "\n", style),
            Node::Element(e) => inline_runs(e, styled(e, style), runs),
        }
    }
}

fn table_rows<'a>(element: &'a Element, rows: &mut Vec<&'a Element>) {
    for child in element.elements() {
        match child.name.as_str() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => table_rows(child, rows),
            _ => {}
        }
    }
}

fn table_block(table: &Element, style: Style) -> Block {
    let widths = table
        .elements()
        .filter(|e| e.name == "colgroup")
        .flat_map(|g| g.elements())
        .chain(table.elements())
        .filter(|e| e.name == "col")
        .filter_map(|c| c.attr("width"))
        .filter_map(|w| w.trim_end_matches('%').trim().parse::<u32>().ok())
        .collect();

    let mut tr = Vec::new();
    table_rows(table, &mut tr);
    let rows = tr
        .iter()
        .map(|row| {
            row.elements()
                .filter(|c| c.name == "td" || c.name == "th")
                .map(|c| {
                    let mut runs = Vec::new();
                    let cell_style = if c.name == "th" {
                        Style { bold: true, ..style }
                    } else {
                        style
                    };
                    inline_runs(c, cell_style, &mut runs);
                    Cell {
                        align: parse_align(c.attr("align")),
                        runs,
                        colspan: c
                            .attr("colspan")
                            .and_then(|s| s.parse().ok())
                            .unwrap_or(1)
                            .max(1),
                    }
                })
                .collect()
        })
        .collect();

    Block::Table {
        widths,
        rows,
        bordered: table.attr("border").is_some_and(|b| b != "0"),
    }
}

#[derive(Default)]
struct Builder {
    blocks: Vec<Block>,
    runs: Vec<Run>,
}

impl Builder {
    /// Close the implicit paragraph collecting loose inline content.
    fn flush(&mut self) {
        let runs = std::mem::take(&mut self.runs);
        if runs.iter().any(|r| !r.text.trim().is_empty()) {
            self.blocks.push(Block::Paragraph {
                align: Alignment::Left,
                runs,
                preformatted: false,
            });
        }
    }

    fn walk(&mut self, element: &Element, style: Style) {
        for child in &element.children {
            let e = match child {
                Node::Text(t) => {
                    push_run(&mut self.runs, t, style);
                    continue;
                }
                Node::Element(e) => e,
            };
            match e.name.as_str() {
                "br" => self.flush(),
                "hr" => {
                    self.flush();
                    self.blocks.push(Block::Rule);
                }
                "img" => {
                    self.flush();
                    self.blocks.push(Block::Image {
                        src: e.attr("src").unwrap_or_default().to_string(),
                    });
                }
                "table" => {
                    self.flush();
                    self.blocks.push(table_block(e, style));
                }
                "p" | "div" | "center" | "pre" | "li" | "h1" | "h2" | "h3" | "h4" | "h5"
                | "h6" => {
                    self.flush();
                    let mut runs = Vec::new();
                    let style = if e.name.starts_with('h') {
                        Style { bold: true, ..style }
                    } else {
                        style
                    };
                    inline_runs(e, style, &mut runs);
                    let align = if e.name == "center" {
                        Alignment::Center
                    } else {
                        parse_align(e.attr("align"))
                    };
                    self.blocks.push(Block::Paragraph {
                        align,
                        runs,
                        preformatted: e.name == "pre",
                    });
                }
                _ => self.walk(e, styled(e, style)),
            }
        }
    }
}

/// Structured document for system print queues.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichDocument {
    pub blocks: Vec<Block>,
}

impl RichDocument {
    /// One monospace paragraph per printed row, bold state from `<EB>`/`<DB>`.
    pub fn from_document(document: &Document) -> Self {
        let mut blocks = Vec::new();
        let mut bold = false;
        for line in document.lines() {
            match line.tag.kind {
                TagKind::BoldOn => bold = true,
                TagKind::BoldOff => bold = false,
                TagKind::Bitmap => {
                    if let Some(src) = line.tag.arg_str(0) {
                        blocks.push(Block::Image {
                            src: src.to_string(),
                        });
                    }
                }
                _ if line.is_control() => {}
                _ => {
                    let scale = line.tag.width.max(line.tag.height);
                    let align = match line.kind {
                        FormatKind::RightAlign => Alignment::Right,
                        FormatKind::CenterAlign | FormatKind::Title => Alignment::Center,
                        _ => Alignment::Left,
                    };
                    for row in line.render().split('\n') {
                        blocks.push(Block::Paragraph {
                            align,
                            runs: vec![Run {
                                text: row.to_string(),
                                bold,
                                scale,
                            }],
                            preformatted: true,
                        });
                    }
                }
            }
        }
        Self { blocks }
    }

    /// Blocks from a repaired markup tree.
    pub fn from_markup(root: &Element) -> Self {
        let mut builder = Builder::default();
        builder.walk(root, Style::default());
        builder.flush();
        Self {
            blocks: builder.blocks,
        }
    }

    /// Standalone HTML page.
    pub fn to_html(&self, title: &str) -> String {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>");
        out.push_str(&escape(title));
        out.push_str("</title><style>body{font-family:sans-serif;max-width:80mm}");
        out.push_str("pre{margin:0;font-family:monospace}p{margin:0}</style></head><body>\n");
        for block in &self.blocks {
            write_block(block, &mut out);
            out.push('\n');
        }
        out.push_str("</body></html>\n");
        out
    }
}

fn align_css(align: Alignment) -> &'static str {
    match align {
        Alignment::Left => "left",
        Alignment::Center => "center",
        Alignment::Right => "right",
    }
}

fn write_runs(runs: &[Run], out: &mut String) {
    for run in runs {
        let mut text = escape(&run.text).replace('\n', "<br>");
        if run.bold {
            text = format!("<b>{}</b>", text);
        }
        if run.scale > 0 {
            text = format!(
                "<span style=\"font-size:{}%\">{}</span>",
                100 + 50 * run.scale as u32,
                text
            );
        }
        out.push_str(&text);
    }
}

fn write_block(block: &Block, out: &mut String) {
    match block {
        Block::Paragraph {
            align,
            runs,
            preformatted,
        } => {
            let tag = if *preformatted { "pre" } else { "p" };
            out.push_str(&format!("<{} style=\"text-align:{}\">", tag, align_css(*align)));
            write_runs(runs, out);
            out.push_str(&format!("</{}>", tag));
        }
        Block::Table {
            widths,
            rows,
            bordered,
        } => {
            out.push_str("<table style=\"width:100%;border-collapse:collapse\"");
            if *bordered {
                out.push_str(" border=\"1\"");
            }
            out.push('>');
            if !widths.is_empty() {
                out.push_str("<colgroup>");
                for w in widths {
                    out.push_str(&format!("<col style=\"width:{}%\">", w));
                }
                out.push_str("</colgroup>");
            }
            for row in rows {
                out.push_str("<tr>");
                for cell in row {
                    out.push_str(&format!("<td style=\"text-align:{}\"", align_css(cell.align)));
                    if cell.colspan > 1 {
                        out.push_str(&format!(" colspan=\"{}\"", cell.colspan));
                    }
                    out.push('>');
                    write_runs(&cell.runs, out);
                    out.push_str("</td>");
                }
                out.push_str("</tr>");
            }
            out.push_str("</table>");
        }
        Block::Rule => out.push_str("<hr>"),
        Block::Image { src } => out.push_str(&format!("<img src=\"{}\">", escape(src))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{repair, to_repaired};

    fn run(text: &str, bold: bool) -> Run {
        Run {
            text: text.into(),
            bold,
            scale: 0,
        }
    }

    #[test]
    fn test_from_document_tracks_bold() {
        let doc = Document::build(&["<EB>", "<L>A", "<DB>", "<L>B"], 3);
        let rich = RichDocument::from_document(&doc);
        assert_eq!(
            rich.blocks,
            vec![
                Block::Paragraph {
                    align: Alignment::Left,
                    runs: vec![run("A  ", true)],
                    preformatted: true
                },
                Block::Paragraph {
                    align: Alignment::Left,
                    runs: vec![run("B  ", false)],
                    preformatted: true
                },
            ]
        );
    }

    #[test]
    fn test_from_markup_paragraphs_and_inline() {
        let tree = repair(r#"loose <b>bold</b><p align="center">mid</p><hr/>"#);
        let rich = RichDocument::from_markup(&tree.root);
        assert_eq!(
            rich.blocks,
            vec![
                Block::Paragraph {
                    align: Alignment::Left,
                    runs: vec![run("loose ", false), run("bold", true)],
                    preformatted: false
                },
                Block::Paragraph {
                    align: Alignment::Center,
                    runs: vec![run("mid", false)],
                    preformatted: false
                },
                Block::Rule,
            ]
        );
    }

    #[test]
    fn test_justify_run_becomes_table() {
        let doc = Document::build(&["<J>Tea|2", "<J>Coffee|10"], 20);
        let rich = RichDocument::from_markup(&to_repaired(&doc).root);
        match &rich.blocks[..] {
            [Block::Table { widths, rows, .. }] => {
                assert_eq!(widths.len(), 2);
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[1][0].runs, vec![run("Coffee", false)]);
                assert_eq!(rows[1][1].align, Alignment::Right);
            }
            other => panic!("expected one table, got {:?}", other),
        }
    }

    #[test]
    fn test_html_page() {
        let tree = repair("<b>x<p>y</p>");
        let html = RichDocument::from_markup(&tree.root).to_html("Job <1>");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Job &lt;1&gt;</title>"));
        assert!(html.contains("<p style=\"text-align:left\"><b>y</b></p>"));
    }
}
