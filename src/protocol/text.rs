//! # ESC/POS Text Commands
//!
//! | Style | Command | Effect |
//! |-------|---------|--------|
//! | Bold | ESC E n | **Emphasized** text |
//! | Alignment | ESC a n | Left / center / right |
//! | Size | GS ! n | 1×–8× width and height |
//! | Code table | ESC t n | Single-byte character table |
//! | Chinese mode | FS & | Double-byte GBK characters |
//!
//! ## Text Alignment
//!
//! ```text
//! Left aligned (default)    |LEFT TEXT
//! Center aligned            |  CENTER TEXT
//! Right aligned             |      RIGHT TEXT
//! ```

use serde::{Deserialize, Serialize};

use super::commands::{ESC, FS, GS};

// ============================================================================
// TEXT ALIGNMENT
// ============================================================================

/// Text alignment options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left = 0,
    Center = 1,
    Right = 2,
}

/// # Select Justification (ESC a n)
///
/// | Format  | Bytes     |
/// |---------|-----------|
/// | ASCII   | ESC a n   |
/// | Hex     | 1B 61 n   |
///
/// Takes effect at the start of the next line; reset by ESC @.
///
/// ```
/// use tagprint::protocol::text::{align, Alignment};
///
/// assert_eq!(align(Alignment::Center), vec![0x1B, 0x61, 0x01]);
/// ```
pub fn align(alignment: Alignment) -> Vec<u8> {
    vec![ESC, b'a', alignment as u8]
}

// ============================================================================
// EMPHASIS
// ============================================================================

/// # Emphasized Mode On (ESC E 1)
#[inline]
pub fn bold_on() -> Vec<u8> {
    vec![ESC, b'E', 1]
}

/// # Emphasized Mode Off (ESC E 0)
#[inline]
pub fn bold_off() -> Vec<u8> {
    vec![ESC, b'E', 0]
}

// ============================================================================
// CHARACTER SIZE
// ============================================================================

/// # Select Character Size (GS ! n)
///
/// Width multiplier in the high nibble, height in the low nibble.
///
/// | Format  | Bytes     |
/// |---------|-----------|
/// | ASCII   | GS ! n    |
/// | Hex     | 1D 21 n   |
///
/// | Value | Multiplier |
/// |-------|------------|
/// | 0 | 1× (normal) |
/// | 1 | 2× |
/// | ... | ... |
/// | 7 | 8× |
///
/// ```
/// use tagprint::protocol::text::size;
///
/// // double width, normal height
/// assert_eq!(size(1, 0), vec![0x1D, 0x21, 0x10]);
/// ```
pub fn size(width_mult: u8, height_mult: u8) -> Vec<u8> {
    let w = width_mult.min(7);
    let h = height_mult.min(7);
    vec![GS, b'!', (w << 4) | h]
}

// ============================================================================
// CHARACTER CODE TABLE
// ============================================================================

/// # Select Character Code Table (ESC t n)
///
/// | n | Table |
/// |---|-------|
/// | 0 | PC437 (USA) |
/// | 16 | WPC1252 |
/// | 17 | PC866 (Cyrillic) |
/// | 45 | WPC1250 |
/// | 46 | WPC1251 |
/// | 47 | WPC1253 |
/// | 48 | WPC1254 |
/// | 49 | WPC1255 |
/// | 50 | WPC1256 |
/// | 51 | WPC1257 |
/// | 52 | WPC1258 |
#[inline]
pub fn code_table(n: u8) -> Vec<u8> {
    vec![ESC, b't', n]
}

/// # Select Chinese Character Mode (FS &)
///
/// Subsequent bytes ≥ 0x80 are read as GBK double-byte pairs.
#[inline]
pub fn chinese_mode_on() -> Vec<u8> {
    vec![FS, b'&']
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align() {
        assert_eq!(align(Alignment::Left), vec![0x1B, 0x61, 0x00]);
        assert_eq!(align(Alignment::Center), vec![0x1B, 0x61, 0x01]);
        assert_eq!(align(Alignment::Right), vec![0x1B, 0x61, 0x02]);
    }

    #[test]
    fn test_bold() {
        assert_eq!(bold_on(), vec![0x1B, 0x45, 0x01]);
        assert_eq!(bold_off(), vec![0x1B, 0x45, 0x00]);
    }

    #[test]
    fn test_size_nibbles() {
        assert_eq!(size(0, 0), vec![0x1D, 0x21, 0x00]);
        assert_eq!(size(1, 1), vec![0x1D, 0x21, 0x11]);
        assert_eq!(size(0, 2), vec![0x1D, 0x21, 0x02]);
        assert_eq!(size(9, 9), vec![0x1D, 0x21, 0x77]);
    }

    #[test]
    fn test_code_table_and_chinese_mode() {
        assert_eq!(code_table(16), vec![0x1B, 0x74, 16]);
        assert_eq!(chinese_mode_on(), vec![0x1C, 0x26]);
    }
}
