//! # Barcode and QR Symbols
//!
//! Symbols are drawn into a [`DotMatrix`] at a fixed module size and then
//! printed through the same band pipeline as any bitmap. The symbol encoding
//! itself comes from a [`SymbolRenderer`]; [`StandardSymbols`] uses
//! `barcoders` for 1D codes and `qrcode` for QR.
//!
//! | Directive | Symbology | Data |
//! |-----------|-----------|------|
//! | `<BAR:code39>` | Code 39 | `0-9 A-Z -.$/+%` and space |
//! | `<BAR:code128>` | Code 128 (set B) | printable ASCII |
//! | `<BAR:ean13>` | EAN-13 | 12 digits |
//! | `<BAR:ean8>` | EAN-8 | 7 digits |
//! | `<BAR:itf>` | Interleaved 2 of 5 | even count of digits |
//! | `<QR:M>` | QR | anything, ECC `L` `M` `Q` `H` |

use barcoders::sym::{code39::Code39, code128::Code128, ean8::EAN8, ean13::EAN13, tf::TF};
use qrcode::{Color, EcLevel, QrCode};

use super::bitmap::DotMatrix;
use crate::error::{Result, TagprintError};

/// Default dots per QR module.
pub const DEFAULT_QR_MODULE: u8 = 4;

/// Largest accepted QR module size.
pub const MAX_QR_MODULE: u8 = 8;

/// Default dots per narrow barcode bar.
pub const DEFAULT_BAR_MODULE: u8 = 2;

/// Default barcode height in dots.
pub const DEFAULT_BAR_HEIGHT: u16 = 80;

/// Supported 1D symbologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbology {
    Code39,
    Code128,
    Ean13,
    Ean8,
    Itf,
}

impl Symbology {
    /// Case-insensitive lookup of a `<BAR:name>` argument.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "code39" | "39" => Some(Symbology::Code39),
            "code128" | "128" => Some(Symbology::Code128),
            "ean13" | "jan13" => Some(Symbology::Ean13),
            "ean8" | "jan8" => Some(Symbology::Ean8),
            "itf" | "i25" => Some(Symbology::Itf),
            _ => None,
        }
    }
}

/// QR error correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EccLevel {
    L,
    #[default]
    M,
    Q,
    H,
}

impl EccLevel {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "L" => Some(EccLevel::L),
            "M" => Some(EccLevel::M),
            "Q" => Some(EccLevel::Q),
            "H" => Some(EccLevel::H),
            _ => None,
        }
    }
}

impl From<EccLevel> for EcLevel {
    fn from(level: EccLevel) -> Self {
        match level {
            EccLevel::L => EcLevel::L,
            EccLevel::M => EcLevel::M,
            EccLevel::Q => EcLevel::Q,
            EccLevel::H => EcLevel::H,
        }
    }
}

/// Pluggable symbol encoder.
pub trait SymbolRenderer: Send + Sync {
    /// Draw a 1D barcode, `module` dots per narrow bar, `height` dots tall.
    fn barcode(&self, data: &str, symbology: Symbology, module: u8, height: u16)
    -> Result<DotMatrix>;

    /// Draw a QR code, `module` dots per module.
    fn qr(&self, data: &str, ecc: EccLevel, module: u8) -> Result<DotMatrix>;
}

/// `barcoders` + `qrcode`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardSymbols;

fn symbology_error(symbology: Symbology, e: impl std::fmt::Display) -> TagprintError {
    TagprintError::Symbology {
        reason: format!("{:?}: {}", symbology, e),
    }
}

impl StandardSymbols {
    fn modules(&self, data: &str, symbology: Symbology) -> Result<Vec<u8>> {
        let err = |e| symbology_error(symbology, e);
        let modules = match symbology {
            Symbology::Code39 => Code39::new(data).map_err(err)?.encode(),
            // Character set B covers all printable ASCII
            Symbology::Code128 => Code128::new(format!("\u{0181}{}", data))
                .map_err(err)?
                .encode(),
            Symbology::Ean13 => EAN13::new(data).map_err(err)?.encode(),
            Symbology::Ean8 => EAN8::new(data).map_err(err)?.encode(),
            Symbology::Itf => TF::interleaved(data).map_err(err)?.encode(),
        };
        Ok(modules)
    }
}

impl SymbolRenderer for StandardSymbols {
    fn barcode(
        &self,
        data: &str,
        symbology: Symbology,
        module: u8,
        height: u16,
    ) -> Result<DotMatrix> {
        let modules = self.modules(data, symbology)?;
        if modules.is_empty() {
            return Err(symbology_error(symbology, "empty symbol"));
        }
        let module = module.max(1) as usize;
        let height = height.max(1) as usize;
        Ok(DotMatrix::from_fn(modules.len() * module, height, |x, _| {
            modules[x / module] == 1
        }))
    }

    fn qr(&self, data: &str, ecc: EccLevel, module: u8) -> Result<DotMatrix> {
        let code = QrCode::with_error_correction_level(data, ecc.into()).map_err(|e| {
            TagprintError::Symbology {
                reason: format!("QR: {}", e),
            }
        })?;
        let module = module.clamp(1, MAX_QR_MODULE) as usize;
        let size = code.width();
        Ok(DotMatrix::from_fn(size * module, size * module, |x, y| {
            code[(x / module, y / module)] == Color::Dark
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbology_names() {
        assert_eq!(Symbology::from_name("CODE128"), Some(Symbology::Code128));
        assert_eq!(Symbology::from_name("code-39"), Some(Symbology::Code39));
        assert_eq!(Symbology::from_name("ean13"), Some(Symbology::Ean13));
        assert_eq!(Symbology::from_name("pdf417"), None);
        assert_eq!(EccLevel::from_name("h"), Some(EccLevel::H));
        assert_eq!(EccLevel::from_name("x"), None);
    }

    #[test]
    fn test_code128_matrix() {
        let m = StandardSymbols
            .barcode("Order 42", Symbology::Code128, 2, 40)
            .unwrap();
        assert_eq!(m.height(), 40);
        assert_eq!(m.width() % 2, 0);
        // Every symbol starts with a bar
        assert!(m.get(0, 0));
        assert!(m.get(1, 39));
    }

    #[test]
    fn test_bars_are_vertical() {
        let m = StandardSymbols
            .barcode("HELLO", Symbology::Code39, 1, 10)
            .unwrap();
        for x in 0..m.width() {
            assert_eq!(m.get(x, 0), m.get(x, 9));
        }
    }

    #[test]
    fn test_invalid_data_is_symbology_error() {
        let err = StandardSymbols
            .barcode("not digits", Symbology::Ean13, 2, 40)
            .unwrap_err();
        assert!(matches!(err, TagprintError::Symbology { .. }));
    }

    #[test]
    fn test_qr_is_square() {
        let m = StandardSymbols
            .qr("https://example.com", EccLevel::M, 4)
            .unwrap();
        assert_eq!(m.width(), m.height());
        assert_eq!(m.width() % 4, 0);
        // Finder pattern corner is dark
        assert!(m.get(0, 0));
    }

    #[test]
    fn test_qr_module_clamped() {
        let small = StandardSymbols.qr("x", EccLevel::L, 0).unwrap();
        let large = StandardSymbols.qr("x", EccLevel::L, 50).unwrap();
        assert_eq!(large.width(), small.width() * MAX_QR_MODULE as usize);
    }
}
