//! # Printer Module
//!
//! Printer descriptors and paper presets.
//!
//! ## Modules
//!
//! - [`config`]: descriptors, transport kinds and JSON loading

pub mod config;

pub use config::{PaperPreset, PrinterDescriptor, TransportKind, select};
