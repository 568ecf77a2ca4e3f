//! # IBM Code Page 437
//!
//! Character table for ESC/POS code table 0 (`ESC t 0`), the power-on
//! default of most receipt printers. Box-drawing and shade glyphs used by
//! the title and box formatters (`░`, `═`, `║`, ...) all live here.
//!
//! Encoding of whole strings goes through [`super::codepage`], which counts
//! unmappable characters for the job log.

/// Glyphs for bytes 0x80..=0xFF, sixteen per row.
const UPPER_HALF: [char; 128] = [
    // 0x80 accented Latin
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
    // 0x90
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ',
    // 0xA0 Spanish, fractions, guillemets
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»',
    // 0xB0 shades, then box drawing through 0xDA
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐',
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧',
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀',
    // 0xE0 Greek and math
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩',
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{00A0}',
];

/// Map one char to its CP437 byte; `None` when the table has no glyph for it.
pub fn encode_char(ch: char) -> Option<u8> {
    if ch.is_ascii() {
        return Some(ch as u8);
    }
    UPPER_HALF
        .iter()
        .position(|&glyph| glyph == ch)
        .map(|i| 0x80 + i as u8)
}
