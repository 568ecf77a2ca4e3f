//! # Codepage Encoding
//!
//! Device text is sent in a single-byte (or GBK double-byte) codepage chosen
//! by the printer descriptor. Every job opens with the matching table
//! selection so the printer and the encoder agree.
//!
//! | Codepage | Encoder | Selection |
//! |----------|---------|-----------|
//! | 437 | built-in table | `ESC t 0` |
//! | 866 | IBM866 | `ESC t 17` |
//! | 1250–1258 | windows-125x | `ESC t 16, 45..52` |
//! | 936 | GBK | `FS &` |
//! | 65001 | UTF-8 passthrough | none |
//!
//! Characters the codepage cannot represent become `?`.

use encoding_rs::Encoding;
use tracing::warn;

use super::{cp437, text};

/// Replacement byte for unmappable characters.
pub const REPLACEMENT: u8 = b'?';

/// A device codepage resolved from its numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codepage {
    Cp437,
    Utf8,
    Gbk,
    /// Single-byte table handled by `encoding_rs`, with its ESC t number
    Table {
        id: u16,
        encoding: &'static Encoding,
        table: u8,
    },
}

impl Codepage {
    /// Resolve a numeric codepage id. Unknown ids fall back to 437.
    pub fn from_id(id: u16) -> Self {
        let table = |encoding, table| Codepage::Table {
            id,
            encoding,
            table,
        };
        match id {
            437 => Codepage::Cp437,
            65001 => Codepage::Utf8,
            936 => Codepage::Gbk,
            866 => table(encoding_rs::IBM866, 17),
            1250 => table(encoding_rs::WINDOWS_1250, 45),
            1251 => table(encoding_rs::WINDOWS_1251, 46),
            1252 => table(encoding_rs::WINDOWS_1252, 16),
            1253 => table(encoding_rs::WINDOWS_1253, 47),
            1254 => table(encoding_rs::WINDOWS_1254, 48),
            1255 => table(encoding_rs::WINDOWS_1255, 49),
            1256 => table(encoding_rs::WINDOWS_1256, 50),
            1257 => table(encoding_rs::WINDOWS_1257, 51),
            1258 => table(encoding_rs::WINDOWS_1258, 52),
            other => {
                warn!(codepage = other, "unknown codepage, using 437");
                Codepage::Cp437
            }
        }
    }

    pub fn id(&self) -> u16 {
        match self {
            Codepage::Cp437 => 437,
            Codepage::Utf8 => 65001,
            Codepage::Gbk => 936,
            Codepage::Table { id, .. } => *id,
        }
    }

    /// Bytes that switch the printer to this codepage.
    pub fn select(&self) -> Vec<u8> {
        match self {
            Codepage::Cp437 => text::code_table(0),
            Codepage::Utf8 => Vec::new(),
            Codepage::Gbk => text::chinese_mode_on(),
            Codepage::Table { table, .. } => text::code_table(*table),
        }
    }

    /// Encode `s`, replacing unmappable characters with [`REPLACEMENT`].
    pub fn encode(&self, s: &str) -> Encoded {
        match self {
            Codepage::Utf8 => Encoded {
                bytes: s.as_bytes().to_vec(),
                unmapped: 0,
            },
            Codepage::Cp437 => {
                let mut out = Encoded::with_capacity(s.len());
                for ch in s.chars() {
                    match cp437::encode_char(ch) {
                        Some(b) => out.bytes.push(b),
                        None => out.replace(),
                    }
                }
                out
            }
            Codepage::Gbk => encode_with(encoding_rs::GBK, s),
            Codepage::Table { encoding, .. } => encode_with(encoding, s),
        }
    }
}

/// Codepage bytes of one string plus the count of replaced characters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    pub unmapped: usize,
}

impl Encoded {
    fn with_capacity(n: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(n),
            unmapped: 0,
        }
    }

    fn replace(&mut self) {
        self.bytes.push(REPLACEMENT);
        self.unmapped += 1;
    }
}

/// Per-char encode: `encoding_rs` would emit `&#NNNN;` for unmappable input.
fn encode_with(encoding: &'static Encoding, s: &str) -> Encoded {
    let mut out = Encoded::with_capacity(s.len());
    let mut buf = [0u8; 4];
    for ch in s.chars() {
        if ch.is_ascii() {
            out.bytes.push(ch as u8);
            continue;
        }
        let (bytes, _, had_errors) = encoding.encode(ch.encode_utf8(&mut buf));
        if had_errors {
            out.replace();
        } else {
            out.bytes.extend_from_slice(&bytes);
        }
    }
    out
}
