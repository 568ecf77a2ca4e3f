//! # Document Orchestrator
//!
//! Turns an ordered list of template lines into [`LineFormatter`]s, threading
//! the justify-run column widths through the fold over the lines.

use tracing::{debug, warn};

use super::formatters::{self, Fitted, TITLE_FILL};
use super::justify::{self, ColumnWidths};
use crate::error::TagprintError;
use crate::template::{FormatTag, TagKind, extract};

/// Line separator of the flattened text view.
pub const LINE_SEPARATOR: &str = "\n";

/// Formatter strategy selected by a line's directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    Generic,
    LeftAlign,
    RightAlign,
    CenterAlign,
    Title,
    Box,
    HorizontalRule,
    Justify,
}

impl FormatKind {
    pub fn for_tag(kind: TagKind) -> Self {
        match kind {
            TagKind::Left => FormatKind::LeftAlign,
            TagKind::Right => FormatKind::RightAlign,
            TagKind::Center => FormatKind::CenterAlign,
            TagKind::Title => FormatKind::Title,
            TagKind::Box => FormatKind::Box,
            TagKind::Rule => FormatKind::HorizontalRule,
            TagKind::Justify => FormatKind::Justify,
            _ => FormatKind::Generic,
        }
    }
}

/// Format `content` for one formatter kind.
///
/// `width` is the line width in characters; `columns` is only consulted by
/// [`FormatKind::Justify`].
pub fn format(
    kind: FormatKind,
    content: &str,
    tag: &FormatTag,
    width: usize,
    columns: Option<&ColumnWidths>,
) -> Fitted {
    match kind {
        FormatKind::Generic => Fitted {
            text: content.to_string(),
            overflow: None,
        },
        FormatKind::LeftAlign => formatters::left(content, width),
        FormatKind::RightAlign => formatters::right(content, width),
        FormatKind::CenterAlign => formatters::center(content, width, TITLE_FILL),
        FormatKind::Title => formatters::title(content, width, TITLE_FILL),
        FormatKind::Box => formatters::boxed(content, width),
        FormatKind::HorizontalRule => formatters::rule(content, width),
        FormatKind::Justify => {
            let empty = ColumnWidths::new();
            justify::justify(content, columns.unwrap_or(&empty), width, tag.ratio())
        }
    }
}

/// One template line, parsed and ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct LineFormatter {
    pub kind: FormatKind,
    pub tag: FormatTag,
    /// Content with the directive stripped
    pub content: String,
    /// Device width in characters at normal font size
    pub target_width: usize,
    columns: Option<ColumnWidths>,
}

impl LineFormatter {
    pub fn new(tag: FormatTag, content: String, target_width: usize) -> Self {
        Self {
            kind: FormatKind::for_tag(tag.kind),
            tag,
            content,
            target_width,
            columns: None,
        }
    }

    /// Characters available at this line's font width: a glyph printed at
    /// width multiplier `w` occupies `w + 1` cells.
    pub fn line_width(&self) -> usize {
        self.target_width / (self.tag.width as usize + 1)
    }

    /// Column widths of the justify run this line belongs to.
    pub fn columns(&self) -> Option<&ColumnWidths> {
        self.columns.as_ref()
    }

    /// Control directives produce device commands, not text.
    pub fn is_control(&self) -> bool {
        self.tag.kind.is_control()
    }

    fn fit(&self) -> Fitted {
        if self.is_control() {
            return Fitted {
                text: String::new(),
                overflow: None,
            };
        }
        format(
            self.kind,
            &self.content,
            &self.tag,
            self.line_width(),
            self.columns.as_ref(),
        )
    }

    /// Formatted text; empty for control-only lines. Box lines contain
    /// embedded line separators.
    pub fn render(&self) -> String {
        self.fit().text
    }
}

/// The formatted template: one [`LineFormatter`] per input line plus the
/// recoverable problems met while building it.
#[derive(Debug, Default)]
pub struct Document {
    lines: Vec<LineFormatter>,
    diagnostics: Vec<TagprintError>,
}

/// Cross-line state of the fold: the lines of the justify run in progress.
#[derive(Default)]
struct RunState {
    members: Vec<usize>,
}

impl RunState {
    /// Close the run: compute the widths over all its lines, then share them.
    fn finish(&mut self, lines: &mut [LineFormatter]) {
        if self.members.is_empty() {
            return;
        }
        let widths = ColumnWidths::from_run(self.members.iter().map(|&i| lines[i].content.as_str()));
        debug!(lines = self.members.len(), widths = ?widths.as_slice(), "justify run closed");
        for &i in &self.members {
            lines[i].columns = Some(widths.clone());
        }
        self.members.clear();
    }
}

impl Document {
    /// Build a document from template lines for a printer `width` chars wide.
    pub fn build<S: AsRef<str>>(template: &[S], width: usize) -> Self {
        let mut lines = Vec::with_capacity(template.len());
        let mut diagnostics = Vec::new();
        let mut run = RunState::default();

        for (index, raw) in template.iter().enumerate() {
            let extracted = extract(raw.as_ref());
            if let Some(reason) = extracted.issue {
                debug!(line = index + 1, %reason, "directive fell back to generic");
                diagnostics.push(TagprintError::MalformedDirective {
                    line: index + 1,
                    reason,
                });
            }

            if extracted.tag.kind == TagKind::Justify {
                run.members.push(index);
            } else {
                run.finish(&mut lines);
            }
            lines.push(LineFormatter::new(extracted.tag, extracted.content, width));
        }
        run.finish(&mut lines);

        for (index, line) in lines.iter().enumerate() {
            if let Some(needed) = line.fit().overflow {
                warn!(
                    line = index + 1,
                    width = line.line_width(),
                    needed,
                    "content truncated to fit line width"
                );
                diagnostics.push(TagprintError::WidthOverflow {
                    width: line.line_width(),
                    needed,
                });
            }
        }

        Self { lines, diagnostics }
    }

    /// The ordered formatter sequence, for the protocol encoder.
    pub fn lines(&self) -> &[LineFormatter] {
        &self.lines
    }

    /// Recoverable problems (malformed directives, truncations).
    pub fn diagnostics(&self) -> &[TagprintError] {
        &self.diagnostics
    }

    /// Rendered lines with control-only lines dropped.
    pub fn text_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .filter(|line| !line.is_control())
            .map(LineFormatter::render)
            .filter(|text| !text.is_empty())
            .collect()
    }

    /// Plain-text view: rendered lines joined with [`LINE_SEPARATOR`].
    pub fn flatten(&self) -> String {
        self.text_lines().join(LINE_SEPARATOR)
    }
}
