//! # Column Justification
//!
//! `<J>` lines split their content on `|` into columns. All columns except
//! the first are right-aligned to a shared width, and the first column takes
//! whatever is left of the line:
//!
//! ```text
//! target width 20, column widths [2, 6, 7]
//!
//! <J>1|Widget|$5.00       →  "1     Widget   $5.00"
//! <J>12|Gadget|$120.00    →  "12    Gadget $120.00"
//!                             └─5─┘└──7──┘└───8──┘
//! ```
//!
//! Column widths are shared by every line of a *justify run* (consecutive
//! `<J>` lines) and computed over the whole run before any line is rendered,
//! so a later, wider cell widens the column for the earlier lines too.
//!
//! ## Proportional Compression
//!
//! With `<J:ratio>` and `ratio != 1`, wide glyphs are assumed to take `ratio`
//! cells. While the weighted line length exceeds the target, one trailing
//! space is removed from the first column (in column order) that ends with
//! two spaces. The left-to-right order is fixed; printed layouts depend on it.

use super::formatters::{Fitted, char_len, pad_left, pad_right, truncate};

/// Column separator inside `<J>` content.
pub const COLUMN_DELIMITER: char = '|';

/// Spaces in front of every right-aligned column.
pub const GUTTER: usize = 1;

/// Running maximum text length per column over one justify run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnWidths {
    widths: Vec<usize>,
}

impl ColumnWidths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Widths for a whole run, computed before rendering any of its lines.
    pub fn from_run<'a>(contents: impl IntoIterator<Item = &'a str>) -> Self {
        let mut widths = Self::new();
        for content in contents {
            widths.observe(content);
        }
        widths
    }

    /// Widen columns to fit the cells of `content`. Lines without a
    /// delimiter do not take part.
    pub fn observe(&mut self, content: &str) {
        if !is_tabular(content) {
            return;
        }
        for (i, cell) in content.split(COLUMN_DELIMITER).enumerate() {
            let len = char_len(cell);
            match self.widths.get_mut(i) {
                Some(w) => *w = (*w).max(len),
                None => self.widths.push(len),
            }
        }
    }

    /// Width of column `index` (0 when the run never had that column).
    pub fn get(&self, index: usize) -> usize {
        self.widths.get(index).copied().unwrap_or(0)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.widths
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }
}

/// Whether a justify line has columns at all.
#[inline]
pub fn is_tabular(content: &str) -> bool {
    content.contains(COLUMN_DELIMITER)
}

fn is_wide_glyph(ch: char) -> bool {
    ch.is_uppercase() || matches!(ch, 'm' | 'w' | '@' | '%' | '&' | '#')
}

/// Length in cells when wide glyphs take `ratio` cells each.
pub fn weighted_len(s: &str, ratio: f32) -> f32 {
    s.chars()
        .map(|ch| if is_wide_glyph(ch) { ratio } else { 1.0 })
        .sum()
}

/// Render one justify line against the run's column widths.
///
/// Lines without a delimiter are returned unchanged.
pub fn justify(content: &str, widths: &ColumnWidths, target: usize, ratio: f32) -> Fitted {
    if !is_tabular(content) {
        return Fitted::exact(content.to_string());
    }

    // Lines with fewer cells than the run leave their trailing slots blank
    let cells: Vec<&str> = content.split(COLUMN_DELIMITER).collect();
    let count = cells.len().max(widths.len());
    let cell = |i: usize| cells.get(i).copied().unwrap_or("");
    let column_width = |i: usize| widths.get(i).max(char_len(cell(i)));

    let right_total: usize = (1..count).map(|i| column_width(i) + GUTTER).sum();
    let first_width = target.saturating_sub(right_total);

    let mut overflow = None;
    let first_len = char_len(cells[0]);
    if first_len > first_width {
        overflow = Some(first_len + right_total);
    }

    let mut columns = Vec::with_capacity(count);
    columns.push(pad_right(cells[0], first_width));
    for i in 1..count {
        columns.push(pad_left(cell(i), column_width(i) + GUTTER));
    }

    if (ratio - 1.0).abs() > f32::EPSILON {
        loop {
            let total: f32 = columns.iter().map(|c| weighted_len(c, ratio)).sum();
            if total <= target as f32 {
                break;
            }
            match columns.iter().position(|c| c.ends_with("  ")) {
                Some(i) => {
                    columns[i].pop();
                }
                None => {
                    overflow = overflow.or(Some(total.ceil() as usize));
                    break;
                }
            }
        }
    }

    let mut text = columns.concat();
    let len = char_len(&text);
    if len > target {
        overflow = overflow.or(Some(len));
        text = truncate(&text, target);
    }

    Fitted { text, overflow }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths_are_running_max() {
        let mut w = ColumnWidths::new();
        w.observe("1|Widget|$5.00");
        assert_eq!(w.as_slice(), &[1, 6, 5]);
        w.observe("12|Gadget|$120.00");
        assert_eq!(w.as_slice(), &[2, 6, 7]);
        w.observe("3|X|$1");
        assert_eq!(w.as_slice(), &[2, 6, 7]);
    }

    #[test]
    fn test_line_without_delimiter_is_ignored() {
        let w = ColumnWidths::from_run(["no columns here", "a|b"]);
        assert_eq!(w.as_slice(), &[1, 1]);
        assert_eq!(
            justify("no columns here", &w, 5, 1.0).text,
            "no columns here"
        );
    }

    #[test]
    fn test_justify_aligns_columns() {
        let w = ColumnWidths::from_run(["1|Widget|$5.00", "12|Gadget|$120.00"]);
        let a = justify("1|Widget|$5.00", &w, 20, 1.0);
        let b = justify("12|Gadget|$120.00", &w, 20, 1.0);
        assert_eq!(a.text, "1     Widget   $5.00");
        assert_eq!(b.text, "12    Gadget $120.00");
        assert_eq!(a.overflow, None);
        assert_eq!(b.overflow, None);
    }

    #[test]
    fn test_short_line_keeps_run_slots() {
        let w = ColumnWidths::from_run(["a|b|c", "x|y"]);
        assert_eq!(justify("a|b|c", &w, 20, 1.0).text, "a                b c");
        assert_eq!(justify("x|y", &w, 20, 1.0).text, "x                y  ");
    }

    #[test]
    fn test_first_column_truncates() {
        let w = ColumnWidths::from_run(["Very long item name|9.99"]);
        let f = justify("Very long item name|9.99", &w, 12, 1.0);
        assert_eq!(f.text, "Very lo 9.99");
        assert_eq!(char_len(&f.text), 12);
        assert_eq!(f.overflow, Some(24));
    }

    #[test]
    fn test_right_columns_wider_than_line() {
        let w = ColumnWidths::from_run(["a|1234567890|1234567890"]);
        let f = justify("a|1234567890|1234567890", &w, 10, 1.0);
        assert_eq!(char_len(&f.text), 10);
        assert!(f.overflow.is_some());
    }

    #[test]
    fn test_weighted_len() {
        assert_eq!(weighted_len("ab", 1.5), 2.0);
        assert_eq!(weighted_len("AB", 1.5), 3.0);
        assert_eq!(weighted_len("A b", 2.0), 4.0);
    }

    #[test]
    fn test_ratio_removes_trailing_spaces_from_first_column() {
        let w = ColumnWidths::from_run(["TEA|1"]);
        // mono: "TEA" + 6 spaces + " 1" = 11 cells
        let mono = justify("TEA|1", &w, 11, 1.0);
        assert_eq!(mono.text, "TEA       1");

        // ratio 2: TEA weighs 6, so 3 spaces must go
        let prop = justify("TEA|1", &w, 11, 2.0);
        assert_eq!(prop.text, "TEA    1");
        assert_eq!(weighted_len(&prop.text, 2.0), 11.0);
        assert_eq!(prop.overflow, None);
    }

    #[test]
    fn test_ratio_stops_when_nothing_to_remove() {
        let w = ColumnWidths::from_run(["ABCDE|X"]);
        let f = justify("ABCDE|X", &w, 7, 2.0);
        assert!(f.overflow.is_some());
        assert_eq!(f.text, "ABCDE X");
    }
}
