//! # Tagprint - Tagged Receipt Templates
//!
//! Tagprint renders line-oriented receipt templates to plain text, rich
//! documents and ESC/POS byte streams for thermal receipt printers.
//!
//! - **Layout**: directive-driven fixed-width formatting with aligned
//!   multi-line column runs
//! - **Protocol**: byte-exact ESC/POS for text, bit images, barcodes and QR
//!   codes
//! - **Markup**: tagged lines to HTML, with a lenient repair parser
//! - **Sinks**: serial, network, spooler, capture file, print queue, text
//!
//! ## Quick Start
//!
//! ```
//! use tagprint::layout::Document;
//!
//! let template = ["<T>Menu", "<J>Coffee|2.50", "<J>Tea|1.80", "<CUT>"];
//! let doc = Document::build(&template, 20);
//!
//! assert_eq!(doc.text_lines().len(), 3);
//! let bytes = doc.to_bytes();
//! assert!(bytes.starts_with(&[0x1B, 0x40]));
//! ```
//!
//! ## Template Lines
//!
//! ```text
//! <T>Receipt           title banner, expanded and centered
//! <L>left  <R>right    alignment
//! <C11>BIG             centered, double width and height
//! <J>Item|Qty|Price    column run, aligned across consecutive lines
//! <BX>Total            boxed label
//! <F>=                 rule of '='
//! <EB> ... <DB>        bold on / off
//! <BMP:logo.png>       bitmap
//! <BAR:ean13>590123412345
//! <QR:H,6>https://example.com
//! <CUT> <BEEP:2,5> <XCT:27,112,0> <LF:3> <WAIT:500>
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`template`] | Directive extraction |
//! | [`layout`] | Line formatters and the document orchestrator |
//! | [`ir`] | Device command plan and its encoder |
//! | [`protocol`] | ESC/POS command builders and codepages |
//! | [`raster`] | Dot matrices, barcodes, QR codes |
//! | [`markup`] | HTML conversion and lenient repair |
//! | [`rich`] | Rich-text document model |
//! | [`sink`] | Output sink dispatch |
//! | [`transport`] | Device channels and job serialization |
//! | [`printer`] | Printer descriptors |
//! | [`error`] | Error types |

pub mod error;
pub mod ir;
pub mod layout;
pub mod markup;
pub mod printer;
pub mod protocol;
pub mod raster;
pub mod rich;
pub mod sink;
pub mod template;
pub mod transport;

// Re-exports for convenience
pub use error::{Result, TagprintError};
pub use layout::Document;
pub use printer::{PrinterDescriptor, TransportKind};
pub use sink::{Sink, create_sink};
