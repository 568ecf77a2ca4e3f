//! # Raster Pipeline
//!
//! ```text
//! image file ─┐
//! barcode ────┼─► DotMatrix (threshold) ─► 24-row bands ─► ESC * 33
//! QR code ────┘
//! ```

pub mod bitmap;
pub mod symbols;

pub use bitmap::DotMatrix;
pub use symbols::{EccLevel, StandardSymbols, SymbolRenderer, Symbology};
