//! # ESC/POS Bit Image Graphics
//!
//! Monochrome images are printed as a series of 24-dot bands using the
//! 24-dot double-density bit image command (`ESC * 33`).
//!
//! ## Band Layout
//!
//! Each band covers 24 rows. For every column the band carries 3 bytes, one
//! per 8-row sub-band, top to bottom, most significant bit first:
//!
//! ```text
//!              column 0   column 1   column 2
//! rows  0..7   byte 0     byte 3     byte 6
//! rows  8..15  byte 1     byte 4     byte 7
//! rows 16..23  byte 2     byte 5     byte 8
//!
//! bit 7 (MSB) = top row of the sub-band, 1 = black
//! ```
//!
//! Line spacing is set to 24 dots for the duration of the image so bands
//! butt against each other without white gaps, then restored.

use super::commands::{ESC, LF, u16_le};

/// Rows per raster band.
pub const BAND_HEIGHT: usize = 24;

/// Bytes per column in a band.
pub const BYTES_PER_COLUMN: usize = BAND_HEIGHT / 8;

/// 24-dot double-density mode selector for `ESC *`.
const MODE_24_DOUBLE: u8 = 33;

/// # Set Line Spacing (ESC 3 n)
#[inline]
pub fn line_spacing(dots: u8) -> Vec<u8> {
    vec![ESC, b'3', dots]
}

/// # Default Line Spacing (ESC 2)
#[inline]
pub fn default_line_spacing() -> Vec<u8> {
    vec![ESC, b'2']
}

/// # Select Bit Image Mode (ESC * m nL nH d1...dk)
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC * 33 nL nH d1...dk |
/// | Hex     | 1B 2A 21 nL nH d1...dk |
///
/// `nL nH` is the width in dots, little-endian; `k = width × 3`.
///
/// ```
/// use tagprint::protocol::graphics;
///
/// let cmd = graphics::bit_image_24(2, &[0xFF, 0x00, 0x00, 0x80, 0x00, 0x01]);
/// assert_eq!(&cmd[..5], &[0x1B, 0x2A, 33, 2, 0]);
/// assert_eq!(cmd.len(), 5 + 6);
/// ```
pub fn bit_image_24(width: u16, columns: &[u8]) -> Vec<u8> {
    debug_assert_eq!(columns.len(), width as usize * BYTES_PER_COLUMN);
    let [lo, hi] = u16_le(width);
    let mut cmd = Vec::with_capacity(5 + columns.len());
    cmd.extend_from_slice(&[ESC, b'*', MODE_24_DOUBLE, lo, hi]);
    cmd.extend_from_slice(columns);
    cmd
}

/// Pack band `band` of a row-major dot matrix into column bytes.
///
/// Rows past `height` are white.
pub fn pack_band(dots: &[bool], width: usize, height: usize, band: usize) -> Vec<u8> {
    let mut out = vec![0u8; width * BYTES_PER_COLUMN];
    let top = band * BAND_HEIGHT;
    for x in 0..width {
        for (sub, byte) in out[x * BYTES_PER_COLUMN..(x + 1) * BYTES_PER_COLUMN]
            .iter_mut()
            .enumerate()
        {
            for bit in 0..8 {
                let y = top + sub * 8 + bit;
                if y < height && dots[y * width + x] {
                    *byte |= 0x80 >> bit;
                }
            }
        }
    }
    out
}

/// Full raster sequence for a dot matrix.
///
/// Each band is preceded by `skip` spaces (horizontal offset in character
/// cells) and followed by a line feed. Bands are never split. `width` is
/// also the row stride of `dots` and must fit the 16-bit header.
pub fn raster(dots: &[bool], width: usize, height: usize, skip: u8) -> Vec<u8> {
    debug_assert!(width <= u16::MAX as usize);
    let bands = height.div_ceil(BAND_HEIGHT);
    let mut out = Vec::with_capacity(bands * (width * BYTES_PER_COLUMN + 6 + skip as usize) + 5);

    out.extend(line_spacing(BAND_HEIGHT as u8));
    for band in 0..bands {
        out.extend(std::iter::repeat_n(b' ', skip as usize));
        out.extend(bit_image_24(width as u16, &pack_band(dots, width, height, band)));
        out.push(LF);
    }
    out.extend(default_line_spacing());
    out
}
