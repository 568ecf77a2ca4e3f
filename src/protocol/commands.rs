//! # ESC/POS Device Commands
//!
//! Paper and peripheral control for ESC/POS receipt printers (Epson TM
//! series and the many controllers that clone it).
//!
//! ## Escape Sequence Structure
//!
//! - Single byte: `LF`
//! - Two bytes: `ESC @`
//! - With parameters: `ESC d n`, `ESC p m t1 t2`, `GS V m n`
//!
//! Multi-byte integers use **little-endian** encoding:
//! `u16` value 0x1234 is sent as bytes `[0x34, 0x12]`.

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC (Escape) - Command prefix byte
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - Extended command prefix for size, cut, barcodes
pub const GS: u8 = 0x1D;

/// FS (File Separator) - Prefix for double-byte (Kanji/GBK) character modes
pub const FS: u8 = 0x1C;

/// LF (Line Feed) - Print the line buffer and advance one line
pub const LF: u8 = 0x0A;

/// Split a u16 into little-endian bytes.
#[inline]
pub fn u16_le(n: u16) -> [u8; 2] {
    n.to_le_bytes()
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// # Initialize Printer (ESC @)
///
/// Clears the print buffer and resets bold, size, alignment and line spacing
/// to their power-on defaults. Sent once at the start of every job.
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC @ |
/// | Hex     | 1B 40 |
///
/// ```
/// use tagprint::protocol::commands;
///
/// assert_eq!(commands::init(), vec![0x1B, 0x40]);
/// ```
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

// ============================================================================
// PAPER FEED
// ============================================================================

/// # Print and Feed n Lines (ESC d n)
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | ESC d n  |
/// | Hex     | 1B 64 n  |
#[inline]
pub fn feed_lines(n: u8) -> Vec<u8> {
    vec![ESC, b'd', n]
}

// ============================================================================
// CUTTER
// ============================================================================

/// # Feed and Partial Cut (GS V 66 n)
///
/// Feeds `n` dots past the cutting position, then cuts leaving a small hinge.
///
/// | Format  | Bytes        |
/// |---------|--------------|
/// | ASCII   | GS V B n     |
/// | Hex     | 1D 56 42 n   |
///
/// ```
/// use tagprint::protocol::commands;
///
/// assert_eq!(commands::cut(0), vec![0x1D, 0x56, 0x42, 0x00]);
/// ```
#[inline]
pub fn cut(feed: u8) -> Vec<u8> {
    vec![GS, b'V', 66, feed]
}

// ============================================================================
// BUZZER
// ============================================================================

/// # Buzzer (ESC B n t)
///
/// Sounds the built-in buzzer `count` times for `duration` × 100 ms each.
/// Both parameters are sent verbatim.
///
/// | Format  | Bytes       |
/// |---------|-------------|
/// | ASCII   | ESC B n t   |
/// | Hex     | 1B 42 n t   |
///
/// ```
/// use tagprint::protocol::commands;
///
/// assert_eq!(commands::beep(2, 5), vec![0x1B, 0x42, 0x02, 0x05]);
/// ```
#[inline]
pub fn beep(count: u8, duration: u8) -> Vec<u8> {
    vec![ESC, b'B', count, duration]
}

// ============================================================================
// CASH DRAWER
// ============================================================================

/// On-time of the drawer kick pulse, in 2 ms units.
pub const DRAWER_ON_TIME: u8 = 25;

/// Off-time of the drawer kick pulse, in 2 ms units.
pub const DRAWER_OFF_TIME: u8 = 250;

/// # Drawer Kick Pulse (ESC p m t1 t2)
///
/// Pulses drawer connector pin `m` (0 = pin 2, 1 = pin 5).
///
/// | Format  | Bytes                |
/// |---------|----------------------|
/// | ASCII   | ESC p m t1 t2        |
/// | Hex     | 1B 70 m 19 FA        |
///
/// ```
/// use tagprint::protocol::commands;
///
/// assert_eq!(commands::drawer_kick(0), vec![0x1B, 0x70, 0x00, 25, 250]);
/// ```
#[inline]
pub fn drawer_kick(pin: u8) -> Vec<u8> {
    vec![ESC, b'p', pin.min(1), DRAWER_ON_TIME, DRAWER_OFF_TIME]
}
