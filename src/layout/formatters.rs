//! # Fixed-Width Line Formatters
//!
//! One function per layout directive. Each takes the tag-stripped content and
//! a target width in characters and returns a [`Fitted`] line whose length is
//! exactly the target width (Generic excepted). Content that does not fit is
//! truncated, never wrapped, and the overflow is reported to the caller.
//!
//! ```text
//! <L>   |Coffee              |
//! <R>   |              Coffee|
//! <C>   |░░░░C o f f e e░░░░|
//! <T>   |░░░░ C o f f e e ░░░|
//! <F>-  |--------------------|
//! <BX>  |╔══════════════════╗|
//!       |║    C o f f e e   ║|
//!       |╚══════════════════╝|
//! ```

/// Default fill glyph for centered labels and title banners.
pub const TITLE_FILL: char = '░';

/// Default fill for `<F>` without a fill character.
pub const RULE_FILL: char = '-';

/// A formatted line plus the width it would have needed when truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fitted {
    pub text: String,
    /// `Some(columns)` when the content had to be truncated
    pub overflow: Option<usize>,
}

impl Fitted {
    pub(crate) fn exact(text: String) -> Self {
        Self {
            text,
            overflow: None,
        }
    }
}

/// Display length in device cells. Templates are laid out for monospace
/// fonts, so every char takes one cell.
#[inline]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Keep at most `width` chars.
pub fn truncate(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

/// Left-align `s` in a field of `width` chars.
pub fn pad_right(s: &str, width: usize) -> String {
    let len = char_len(s);
    if len >= width {
        return truncate(s, width);
    }
    let mut out = String::with_capacity(s.len() + width - len);
    out.push_str(s);
    out.extend(std::iter::repeat_n(' ', width - len));
    out
}

/// Right-align `s` in a field of `width` chars.
pub fn pad_left(s: &str, width: usize) -> String {
    let len = char_len(s);
    if len >= width {
        return truncate(s, width);
    }
    let mut out: String = std::iter::repeat_n(' ', width - len).collect();
    out.push_str(s);
    out
}

/// Insert `separator` between glyphs: `"TOTAL"` → `"T O T A L"`.
pub fn expand_label(s: &str, separator: char) -> String {
    let mut out = String::with_capacity(s.len() * 2);
    for (i, ch) in s.chars().enumerate() {
        if i > 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

/// Center `label` in `width` cells, filling both sides with `fill`.
/// An odd remainder goes to the left side.
pub fn center_fill(label: &str, width: usize, fill: char) -> String {
    let len = char_len(label);
    if len >= width {
        return truncate(label, width);
    }
    let free = width - len;
    let right = free / 2;
    let left = free - right;

    let mut out = String::with_capacity(width * fill.len_utf8() + label.len());
    out.extend(std::iter::repeat_n(fill, left));
    out.push_str(label);
    out.extend(std::iter::repeat_n(fill, right));
    out
}

fn overflow_of(content: &str, width: usize) -> Option<usize> {
    let len = char_len(content);
    (len > width).then_some(len)
}

/// Pick the widest label that fits: expanded first, then the plain content.
fn expanded_or_plain(content: &str, width: usize) -> (String, Option<usize>) {
    let expanded = expand_label(content, ' ');
    if char_len(&expanded) <= width {
        (expanded, None)
    } else {
        (content.to_string(), overflow_of(content, width))
    }
}

pub fn left(content: &str, width: usize) -> Fitted {
    Fitted {
        text: pad_right(content, width),
        overflow: overflow_of(content, width),
    }
}

pub fn right(content: &str, width: usize) -> Fitted {
    Fitted {
        text: pad_left(content, width),
        overflow: overflow_of(content, width),
    }
}

/// Expanded label centered in `fill`.
pub fn center(content: &str, width: usize, fill: char) -> Fitted {
    let (label, overflow) = expanded_or_plain(content, width);
    Fitted {
        text: center_fill(&label, width, fill),
        overflow,
    }
}

/// Banner: expanded label framed by one space each side, centered in `fill`.
pub fn title(content: &str, width: usize, fill: char) -> Fitted {
    let (label, overflow) = expanded_or_plain(content, width);
    let label = if char_len(&label) + 2 <= width && !label.is_empty() {
        format!(" {} ", label)
    } else {
        label
    };
    Fitted {
        text: center_fill(&label, width, fill),
        overflow,
    }
}

/// Three rows of double-line box drawing with the expanded label in the middle.
pub fn boxed(content: &str, width: usize) -> Fitted {
    if width < 2 {
        return Fitted {
            text: truncate(content, width),
            overflow: overflow_of(content, width),
        };
    }
    let inner = width - 2;
    let (label, overflow) = expanded_or_plain(content, inner);
    let bar: String = std::iter::repeat_n('═', inner).collect();

    let text = format!(
        "╔{bar}╗\n║{}║\n╚{bar}╝",
        center_fill(&label, inner, ' '),
        bar = bar
    );
    Fitted { text, overflow }
}

/// Repeat the first char of `content` (default `-`) across the line.
pub fn rule(content: &str, width: usize) -> Fitted {
    let fill = content.chars().next().unwrap_or(RULE_FILL);
    Fitted::exact(std::iter::repeat_n(fill, width).collect())
}
