//! # Device Commands
//!
//! The intermediate representation between formatted lines and printer
//! bytes. A print job is a flat, ordered list of [`DeviceCommand`]s; the
//! device channel consumes it strictly in sequence.
//!
//! ```text
//! Document ──plan──► CommandPlan (Vec<DeviceCommand>) ──encode──► bytes
//! ```
//!
//! Every command carries all the state it needs. Text lines carry their own
//! alignment and size, so no command depends on the one before it.

use std::time::Duration;

use crate::error::TagprintError;
use crate::protocol::codepage::Codepage;
use crate::protocol::text::Alignment;
use crate::raster::{DotMatrix, EccLevel, Symbology};

/// One atomic printer operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    // ========== Printer Control ==========
    /// Initialize printer (ESC @)
    Init,

    /// Select the text codepage table
    SelectCodepage(Codepage),

    /// Feed `feed` dots, then partial cut
    Cut { feed: u8 },

    /// Feed n lines
    Feed(u8),

    /// Buzzer: `count` beeps of `duration` × 100 ms
    Beep { count: u8, duration: u8 },

    /// Cash drawer kick on connector pin 0 or 1
    Drawer { pin: u8 },

    /// Pause the stream; honoured by the channel, never emitted as bytes
    Wait(Duration),

    // ========== Text ==========
    /// One codepage-encoded line, terminated by LF when encoded
    Text {
        bytes: Vec<u8>,
        align: Alignment,
        font_w: u8,
        font_h: u8,
    },

    /// Enable/disable emphasis
    Bold(bool),

    /// Set alignment for following graphics
    Align(Alignment),

    // ========== Graphics ==========
    /// Monochrome bitmap, `skip` spaces in front of every band
    Raster { bitmap: DotMatrix, skip: u8 },

    /// 1D barcode rendered through the symbol renderer
    Barcode {
        data: String,
        symbology: Symbology,
        module: u8,
        height: u16,
        /// Widest symbol the paper takes, in dots
        max_width: usize,
    },

    /// QR code rendered through the symbol renderer
    Qr {
        data: String,
        ecc: EccLevel,
        module: u8,
        max_width: usize,
    },

    /// Bytes sent verbatim
    RawExec(Vec<u8>),
}

impl DeviceCommand {
    /// Plain left-aligned, normal-size text line.
    pub fn text(bytes: impl Into<Vec<u8>>) -> Self {
        DeviceCommand::Text {
            bytes: bytes.into(),
            align: Alignment::Left,
            font_w: 0,
            font_h: 0,
        }
    }
}

/// Commands for one job plus the directives dropped while planning.
#[derive(Debug, Default)]
pub struct CommandPlan {
    pub commands: Vec<DeviceCommand>,
    /// Recoverable problems: missing bitmaps, unknown symbologies
    pub skipped: Vec<TagprintError>,
}

impl CommandPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// A plan that starts with printer initialisation and codepage selection.
    pub fn with_init(codepage: Codepage) -> Self {
        Self {
            commands: vec![DeviceCommand::Init, DeviceCommand::SelectCodepage(codepage)],
            skipped: Vec::new(),
        }
    }

    pub fn push(&mut self, command: DeviceCommand) {
        self.commands.push(command);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeviceCommand> {
        self.commands.iter()
    }
}

impl FromIterator<DeviceCommand> for CommandPlan {
    fn from_iter<T: IntoIterator<Item = DeviceCommand>>(iter: T) -> Self {
        Self {
            commands: iter.into_iter().collect(),
            skipped: Vec::new(),
        }
    }
}

impl<'a> IntoIterator for &'a CommandPlan {
    type Item = &'a DeviceCommand;
    type IntoIter = std::slice::Iter<'a, DeviceCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
