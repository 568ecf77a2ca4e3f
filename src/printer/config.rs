//! # Printer Configuration
//!
//! A [`PrinterDescriptor`] tells the pipeline how wide a line is, which
//! codepage the device expects and where the output goes. Descriptors are
//! loaded from JSON and are read-only afterwards.
//!
//! ## Presets
//!
//! | Preset | Chars/line | Width (dots) | Resolution |
//! |--------|------------|--------------|------------|
//! | 80mm (Font A) | 42 | 576 | 203 DPI |
//! | 80mm (Font B) | 48 | 576 | 203 DPI |
//! | 58mm | 32 | 384 | 203 DPI |
//!
//! ## JSON
//!
//! ```json
//! {
//!   "printers": [
//!     { "name": "kitchen", "transport": "network", "address": "10.0.0.5" },
//!     { "name": "front", "transport": "serial", "address": "/dev/ttyUSB0",
//!       "chars_per_line": 32, "max_dots": 384 }
//!   ]
//! }
//! ```
//!
//! A file holding a single descriptor object is accepted too.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TagprintError};

/// Default characters per line (80mm paper, Font A).
pub const DEFAULT_CHARS_PER_LINE: usize = 42;

/// Default codepage id.
pub const DEFAULT_CODEPAGE: u16 = 437;

/// Default printable width in dots.
pub const DEFAULT_MAX_DOTS: usize = 576;

/// Default job timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Line width and raster width of a common paper roll.
///
/// At 203 DPI (8 dots/mm) 80mm paper prints 576 dots, about 72mm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaperPreset {
    pub name: &'static str,
    pub chars_per_line: usize,
    pub max_dots: usize,
}

impl PaperPreset {
    pub const PAPER_80MM: Self = Self {
        name: "80mm",
        chars_per_line: 42,
        max_dots: 576,
    };

    pub const PAPER_80MM_FONT_B: Self = Self {
        name: "80mm-b",
        chars_per_line: 48,
        max_dots: 576,
    };

    pub const PAPER_58MM: Self = Self {
        name: "58mm",
        chars_per_line: 32,
        max_dots: 384,
    };

    pub fn all() -> [Self; 3] {
        [Self::PAPER_80MM, Self::PAPER_80MM_FONT_B, Self::PAPER_58MM]
    }

    pub fn by_name(name: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

/// Where the output of a job goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Serial or USB-serial device node
    Serial,
    /// Raw TCP (`host[:port]`, port 9100 by default)
    Network,
    /// Raw passthrough to the system spooler (`lp -o raw`)
    Spool,
    /// Protocol bytes appended to a file
    Capture,
    /// Rich document submitted to a print queue
    RichText,
    /// Tagged lines converted to HTML, repaired, submitted to a print queue
    Html,
    /// Flattened text written to a file
    Text,
    /// Flattened text logged and printed to stdout
    #[default]
    Demo,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::Serial => "serial",
            TransportKind::Network => "network",
            TransportKind::Spool => "spool",
            TransportKind::Capture => "capture",
            TransportKind::RichText => "richtext",
            TransportKind::Html => "html",
            TransportKind::Text => "text",
            TransportKind::Demo => "demo",
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured printer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterDescriptor {
    pub name: String,
    pub chars_per_line: usize,
    pub codepage: u16,
    pub transport: TransportKind,
    pub address: String,
    pub max_dots: usize,
    pub timeout_ms: u64,
}

impl Default for PrinterDescriptor {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            chars_per_line: DEFAULT_CHARS_PER_LINE,
            codepage: DEFAULT_CODEPAGE,
            transport: TransportKind::Demo,
            address: String::new(),
            max_dots: DEFAULT_MAX_DOTS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ConfigFile {
    Many { printers: Vec<PrinterDescriptor> },
    One(PrinterDescriptor),
}

impl PrinterDescriptor {
    /// Parse and validate descriptors from JSON text.
    pub fn from_json_str(json: &str) -> Result<Vec<Self>> {
        let parsed: ConfigFile = serde_json::from_str(json)
            .map_err(|e| TagprintError::Config(format!("invalid printer JSON: {}", e)))?;
        let printers = match parsed {
            ConfigFile::Many { printers } => printers,
            ConfigFile::One(printer) => vec![printer],
        };
        if printers.is_empty() {
            return Err(TagprintError::Config("no printers configured".to_string()));
        }
        for printer in &printers {
            printer.validate()?;
        }
        Ok(printers)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Vec<Self>> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            TagprintError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// Reject descriptors no sink could use.
    pub fn validate(&self) -> Result<()> {
        if self.chars_per_line == 0 {
            return Err(TagprintError::Config(format!(
                "printer '{}': chars_per_line must be positive",
                self.name
            )));
        }
        if self.max_dots == 0 {
            return Err(TagprintError::Config(format!(
                "printer '{}': max_dots must be positive",
                self.name
            )));
        }
        let needs_address = !matches!(
            self.transport,
            TransportKind::Demo | TransportKind::Spool | TransportKind::RichText | TransportKind::Html
        );
        if needs_address && self.address.trim().is_empty() {
            return Err(TagprintError::Config(format!(
                "printer '{}': {} transport needs an address",
                self.name, self.transport
            )));
        }
        Ok(())
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }
}

/// Pick a descriptor by name, or the first one when no name is given.
pub fn select<'a>(
    printers: &'a [PrinterDescriptor],
    name: Option<&str>,
) -> Result<&'a PrinterDescriptor> {
    match name {
        Some(name) => printers
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| TagprintError::Config(format!("no printer named '{}'", name))),
        None => printers
            .first()
            .ok_or_else(|| TagprintError::Config("no printers configured".to_string())),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = PrinterDescriptor::default();
        assert_eq!(p.chars_per_line, 42);
        assert_eq!(p.codepage, 437);
        assert_eq!(p.max_dots, 576);
        assert_eq!(p.timeout_ms, 10_000);
    }

    #[test]
    fn test_preset_lookup_ignores_case() {
        assert_eq!(PaperPreset::by_name("58MM"), Some(PaperPreset::PAPER_58MM));
        assert_eq!(PaperPreset::by_name("80mm-B").map(|p| p.chars_per_line), Some(48));
        assert_eq!(PaperPreset::by_name("a4"), None);
    }

    #[test]
    fn test_single_descriptor_json() {
        let printers =
            PrinterDescriptor::from_json_str(r#"{"name":"bar","transport":"network","address":"10.0.0.5"}"#)
                .unwrap();
        assert_eq!(printers.len(), 1);
        assert_eq!(printers[0].transport, TransportKind::Network);
        assert_eq!(printers[0].chars_per_line, 42);
    }

    #[test]
    fn test_printer_list_json() {
        let json = r#"{"printers":[
            {"name":"a","transport":"richtext"},
            {"name":"b","transport":"capture","address":"out.bin","codepage":1252,"chars_per_line":32}
        ]}"#;
        let printers = PrinterDescriptor::from_json_str(json).unwrap();
        assert_eq!(printers.len(), 2);
        assert_eq!(printers[1].codepage, 1252);
        assert_eq!(select(&printers, Some("b")).unwrap().chars_per_line, 32);
        assert_eq!(select(&printers, None).unwrap().name, "a");
        assert!(select(&printers, Some("zzz")).is_err());
    }

    #[test]
    fn test_validation() {
        let zero = PrinterDescriptor {
            chars_per_line: 0,
            ..Default::default()
        };
        assert!(matches!(zero.validate(), Err(TagprintError::Config(_))));

        let no_address = PrinterDescriptor {
            transport: TransportKind::Serial,
            ..Default::default()
        };
        assert!(no_address.validate().is_err());

        assert!(PrinterDescriptor::from_json_str(r#"{"printers":[]}"#).is_err());
        assert!(PrinterDescriptor::from_json_str("not json").is_err());
    }

    #[test]
    fn test_transport_kind_names() {
        assert_eq!(TransportKind::RichText.to_string(), "richtext");
        let kind: TransportKind = serde_json::from_str("\"html\"").unwrap();
        assert_eq!(kind, TransportKind::Html);
    }
}
