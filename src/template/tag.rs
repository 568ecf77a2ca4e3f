//! # Format Tag Extractor
//!
//! Parses the leading directive off a template line.
//!
//! ## Directive Grammar
//!
//! Directives are case-insensitive and enclosed in angle brackets at the very
//! start of the line:
//!
//! ```text
//! <NAME[digits][:args]>content
//!
//! <L>Left text          left align, pad to width
//! <C10>Big              center, font width x2 (digit 1), height x1 (digit 0)
//! <J:1.4>Item|Qty|Price justify with proportional ratio 1.4
//! <BEEP:2,5>            buzzer, 2 beeps of 5 x 100ms
//! <BMP:logo.png>        raster image
//! ```
//!
//! | Tag | Kind | Parameters |
//! |-----|------|------------|
//! | `L` `R` `C` | alignment | font width/height digits |
//! | `T` | title banner | font digits |
//! | `BX` | box | font digits |
//! | `F` | horizontal rule | fill char is the content |
//! | `J` | justify | `:ratio` |
//! | `EB` / `DB` | bold on / off | — |
//! | `CUT` | paper cut | `:feed_lines` |
//! | `BEEP` | buzzer | `:count,duration` |
//! | `DRAWER` | drawer kick | `:pin` |
//! | `BMP` | raster image | `:path[,skip]` |
//! | `BAR` | 1D barcode | `:symbology[,module]` |
//! | `QR` | QR code | `:ecc[,module]` |
//! | `XCT` | raw bytes | `:b1,b2,...` |
//! | `LF` | line feed | `:lines` |
//! | `WAIT` | pause | `:milliseconds` |
//!
//! Anything else is a Generic line whose content is the whole line.

/// Directive kinds recognised at the start of a template line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagKind {
    #[default]
    Generic,
    Left,
    Right,
    Center,
    Title,
    Box,
    Rule,
    Justify,
    BoldOn,
    BoldOff,
    Cut,
    Beep,
    Drawer,
    Bitmap,
    Barcode,
    Qr,
    RawExec,
    Feed,
    Wait,
}

impl TagKind {
    /// Look up a directive name (already upper-cased).
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "L" => TagKind::Left,
            "R" => TagKind::Right,
            "C" => TagKind::Center,
            "T" => TagKind::Title,
            "BX" => TagKind::Box,
            "F" => TagKind::Rule,
            "J" => TagKind::Justify,
            "EB" => TagKind::BoldOn,
            "DB" => TagKind::BoldOff,
            "CUT" => TagKind::Cut,
            "BEEP" => TagKind::Beep,
            "DRAWER" => TagKind::Drawer,
            "BMP" => TagKind::Bitmap,
            "BAR" => TagKind::Barcode,
            "QR" => TagKind::Qr,
            "XCT" => TagKind::RawExec,
            "LF" => TagKind::Feed,
            "WAIT" => TagKind::Wait,
            _ => return None,
        };
        Some(kind)
    }

    /// Control directives render to nothing in the text view.
    pub fn is_control(&self) -> bool {
        matches!(
            self,
            TagKind::BoldOn
                | TagKind::BoldOff
                | TagKind::Cut
                | TagKind::Beep
                | TagKind::Drawer
                | TagKind::Bitmap
                | TagKind::Barcode
                | TagKind::Qr
                | TagKind::RawExec
                | TagKind::Feed
                | TagKind::Wait
        )
    }
}

/// A parsed directive.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormatTag {
    pub kind: TagKind,
    /// Font width multiplier digit (0 = normal, 1 = double, ...)
    pub width: u8,
    /// Font height multiplier digit
    pub height: u8,
    /// Proportional-font ratio for `<J:ratio>`
    pub ratio: Option<f32>,
    /// Comma separated arguments after `:`
    pub args: Vec<String>,
}

impl FormatTag {
    /// First argument parsed as a number, or `default` when absent/garbled.
    pub fn arg_u8(&self, index: usize, default: u8) -> u8 {
        self.args
            .get(index)
            .and_then(|a| a.trim().parse().ok())
            .unwrap_or(default)
    }

    pub fn arg_str(&self, index: usize) -> Option<&str> {
        self.args
            .get(index)
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
    }

    /// Effective proportional ratio (1.0 when absent).
    pub fn ratio(&self) -> f32 {
        self.ratio.unwrap_or(1.0)
    }
}

/// Result of extracting the directive from one line.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub tag: FormatTag,
    /// Line content with the directive removed
    pub content: String,
    /// Set when the directive was unknown or had unparsable parameters
    pub issue: Option<String>,
}

/// Maximum font multiplier digit accepted by the size command.
const MAX_FONT_MULT: u8 = 7;

/// Split a template line into its directive and content.
///
/// Never fails: unknown directives fall back to [`TagKind::Generic`] with the
/// full line as content, and garbled numbers default to 0.
///
/// ```
/// use tagprint::template::{extract, TagKind};
///
/// let e = extract("<c10>TOTAL");
/// assert_eq!(e.tag.kind, TagKind::Center);
/// assert_eq!(e.tag.width, 1);
/// assert_eq!(e.content, "TOTAL");
/// ```
pub fn extract(line: &str) -> Extracted {
    let generic = |issue: Option<String>| Extracted {
        tag: FormatTag::default(),
        content: line.to_string(),
        issue,
    };

    let Some(rest) = line.strip_prefix('<') else {
        return generic(None);
    };
    let Some(end) = rest.find('>') else {
        return generic(None);
    };

    let inner = &rest[..end];
    let content = &rest[end + 1..];

    let name_len = inner
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(inner.len());
    let name = inner[..name_len].to_ascii_uppercase();

    let Some(kind) = TagKind::from_name(&name) else {
        return generic(Some(format!("unknown directive <{}>", &inner)));
    };

    let params = &inner[name_len..];
    let (positional, args) = match params.split_once(':') {
        Some((p, a)) => (p, Some(a)),
        None => (params, None),
    };

    let mut issue = None;
    let mut digits = [0u8; 2];
    for (i, ch) in positional.trim().chars().take(2).enumerate() {
        match ch.to_digit(10) {
            Some(d) => digits[i] = (d as u8).min(MAX_FONT_MULT),
            None => {
                issue = Some(format!("non-numeric size '{}' in <{}>", positional, inner));
            }
        }
    }

    let mut tag = FormatTag {
        kind,
        width: digits[0],
        height: digits[1],
        ratio: None,
        args: Vec::new(),
    };

    if let Some(args) = args {
        match kind {
            TagKind::Justify => match args.trim().parse::<f32>() {
                Ok(r) if r.is_finite() && r > 0.0 => tag.ratio = Some(r),
                _ => issue = Some(format!("invalid justify ratio '{}'", args)),
            },
            TagKind::Bitmap => {
                // Paths may contain commas; only a trailing numeric field is a skip count.
                match args.rsplit_once(',') {
                    Some((path, skip)) if skip.trim().parse::<u8>().is_ok() => {
                        tag.args = vec![path.to_string(), skip.trim().to_string()];
                    }
                    _ => tag.args = vec![args.to_string()],
                }
            }
            _ => tag.args = args.split(',').map(|a| a.trim().to_string()).collect(),
        }
    }

    Extracted {
        tag,
        content: content.to_string(),
        issue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_directive_is_generic() {
        let e = extract("Plain text");
        assert_eq!(e.tag.kind, TagKind::Generic);
        assert_eq!(e.content, "Plain text");
        assert!(e.issue.is_none());
    }

    #[test]
    fn test_alignment_tags() {
        assert_eq!(extract("<L>a").tag.kind, TagKind::Left);
        assert_eq!(extract("<r>a").tag.kind, TagKind::Right);
        assert_eq!(extract("<C>a").tag.kind, TagKind::Center);
        assert_eq!(extract("<T>a").tag.kind, TagKind::Title);
        assert_eq!(extract("<bx>a").tag.kind, TagKind::Box);
        assert_eq!(extract("<F>=").tag.kind, TagKind::Rule);
    }

    #[test]
    fn test_font_digits() {
        let e = extract("<L12>Hello");
        assert_eq!(e.tag.width, 1);
        assert_eq!(e.tag.height, 2);
        assert_eq!(e.content, "Hello");
    }

    #[test]
    fn test_malformed_digits_default_to_zero() {
        let e = extract("<LX1>Hello");
        assert_eq!(e.tag.kind, TagKind::Generic);

        let e = extract("<L1X>Hello");
        assert_eq!(e.tag.kind, TagKind::Left);
        assert_eq!(e.tag.width, 1);
        assert_eq!(e.tag.height, 0);
        assert_eq!(e.content, "Hello");
        assert!(e.issue.is_some());
    }

    #[test]
    fn test_font_digits_clamp() {
        let e = extract("<C99>x");
        assert_eq!(e.tag.width, 7);
        assert_eq!(e.tag.height, 7);
    }

    #[test]
    fn test_justify_ratio() {
        let e = extract("<J:1.5>A|B");
        assert_eq!(e.tag.kind, TagKind::Justify);
        assert_eq!(e.tag.ratio, Some(1.5));
        assert_eq!(e.content, "A|B");

        let e = extract("<J>A|B");
        assert_eq!(e.tag.ratio(), 1.0);
    }

    #[test]
    fn test_bad_ratio_reported() {
        let e = extract("<J:abc>A|B");
        assert_eq!(e.tag.kind, TagKind::Justify);
        assert_eq!(e.tag.ratio, None);
        assert!(e.issue.is_some());
    }

    #[test]
    fn test_control_tags() {
        let e = extract("<BEEP:2,5>");
        assert_eq!(e.tag.kind, TagKind::Beep);
        assert_eq!(e.tag.arg_u8(0, 0), 2);
        assert_eq!(e.tag.arg_u8(1, 0), 5);
        assert!(e.tag.kind.is_control());

        assert_eq!(extract("<EB>").tag.kind, TagKind::BoldOn);
        assert_eq!(extract("<db>").tag.kind, TagKind::BoldOff);
        assert_eq!(extract("<CUT>").tag.kind, TagKind::Cut);
        assert_eq!(extract("<drawer>").tag.kind, TagKind::Drawer);
        assert_eq!(extract("<LF:3>").tag.kind, TagKind::Feed);
        assert_eq!(extract("<WAIT:500>").tag.kind, TagKind::Wait);
    }

    #[test]
    fn test_bitmap_path_preserves_case() {
        let e = extract("<BMP:Images/Logo.PNG>");
        assert_eq!(e.tag.kind, TagKind::Bitmap);
        assert_eq!(e.tag.arg_str(0), Some("Images/Logo.PNG"));

        let e = extract("<bmp:a,b.png,4>");
        assert_eq!(e.tag.arg_str(0), Some("a,b.png"));
        assert_eq!(e.tag.arg_u8(1, 0), 4);
    }

    #[test]
    fn test_barcode_and_qr_args() {
        let e = extract("<BAR:code128,3>12345");
        assert_eq!(e.tag.kind, TagKind::Barcode);
        assert_eq!(e.tag.arg_str(0), Some("code128"));
        assert_eq!(e.tag.arg_u8(1, 2), 3);
        assert_eq!(e.content, "12345");

        let e = extract("<QR:H>https://example.com");
        assert_eq!(e.tag.kind, TagKind::Qr);
        assert_eq!(e.tag.arg_str(0), Some("H"));
    }

    #[test]
    fn test_raw_exec_bytes() {
        let e = extract("<XCT:27,112,0,25,250>");
        assert_eq!(e.tag.kind, TagKind::RawExec);
        assert_eq!(e.tag.args, vec!["27", "112", "0", "25", "250"]);
    }

    #[test]
    fn test_unknown_directive_keeps_line() {
        let e = extract("<b>bold</b>");
        assert_eq!(e.tag.kind, TagKind::Generic);
        assert_eq!(e.content, "<b>bold</b>");
        assert!(e.issue.is_some());
    }

    #[test]
    fn test_unterminated_directive() {
        let e = extract("<L no close");
        assert_eq!(e.tag.kind, TagKind::Generic);
        assert_eq!(e.content, "<L no close");
    }
}
