//! # Command Planning
//!
//! Walks a [`Document`]'s formatters and produces the [`DeviceCommand`] for
//! each line:
//!
//! | Line | Commands |
//! |------|----------|
//! | text kinds | one `Text` per rendered row (boxes have three) |
//! | `<EB>` `<DB>` | `Bold` |
//! | `<CUT:n>` | `Cut { feed: n }` |
//! | `<BEEP:c,d>` | `Beep`, defaults 1 beep × 300 ms |
//! | `<DRAWER:p>` | `Drawer` |
//! | `<BMP:path,skip>` | `Raster`, or skipped when the file is missing |
//! | `<BAR:sym,module>` | `Align(Center)`, `Barcode`, `Align(Left)` |
//! | `<QR:ecc,module>` | `Align(Center)`, `Qr`, `Align(Left)` |
//! | `<XCT:b,...>` | `RawExec` |
//! | `<LF:n>` `<WAIT:ms>` | `Feed`, `Wait` |

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

use super::ops::{CommandPlan, DeviceCommand};
use crate::error::{Result, TagprintError};
use crate::layout::{Document, FormatKind, LineFormatter};
use crate::printer::config::DEFAULT_MAX_DOTS;
use crate::protocol::codepage::Codepage;
use crate::protocol::text::Alignment;
use crate::raster::DotMatrix;
use crate::raster::symbols::{
    DEFAULT_BAR_HEIGHT, DEFAULT_BAR_MODULE, DEFAULT_QR_MODULE, EccLevel, Symbology,
};
use crate::template::TagKind;

/// Default number of beeps.
pub const DEFAULT_BEEP_COUNT: u8 = 1;

/// Default beep duration in 100 ms units.
pub const DEFAULT_BEEP_DURATION: u8 = 3;

/// Resolves `<BMP:path>` references to dot matrices.
pub trait AssetLoader: Send + Sync {
    fn load(&self, path: &str, max_width: usize) -> Result<DotMatrix>;
}

/// Loads bitmaps from disk, relative paths against `root`.
#[derive(Debug, Clone, Default)]
pub struct FsAssets {
    root: PathBuf,
}

impl FsAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetLoader for FsAssets {
    fn load(&self, path: &str, max_width: usize) -> Result<DotMatrix> {
        let p = Path::new(path);
        let full = if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root.join(p)
        };
        DotMatrix::load(&full, max_width)
    }
}

/// Turns formatted lines into device commands for one printer.
pub struct Planner<'a> {
    codepage: Codepage,
    max_dots: usize,
    assets: &'a dyn AssetLoader,
}

impl<'a> Planner<'a> {
    pub fn new(codepage: Codepage, max_dots: usize, assets: &'a dyn AssetLoader) -> Self {
        Self {
            codepage,
            max_dots,
            assets,
        }
    }

    /// Plan a whole document, starting with init and codepage selection.
    pub fn plan(&self, document: &Document) -> CommandPlan {
        let mut plan = CommandPlan::with_init(self.codepage);
        for (index, line) in document.lines().iter().enumerate() {
            self.plan_line(line, index + 1, &mut plan);
        }
        debug!(
            commands = plan.len(),
            skipped = plan.skipped.len(),
            "command plan built"
        );
        plan
    }

    fn plan_line(&self, line: &LineFormatter, number: usize, plan: &mut CommandPlan) {
        let tag = &line.tag;
        match tag.kind {
            TagKind::BoldOn => plan.push(DeviceCommand::Bold(true)),
            TagKind::BoldOff => plan.push(DeviceCommand::Bold(false)),
            TagKind::Cut => plan.push(DeviceCommand::Cut {
                feed: tag.arg_u8(0, 0),
            }),
            TagKind::Beep => plan.push(DeviceCommand::Beep {
                count: tag.arg_u8(0, DEFAULT_BEEP_COUNT),
                duration: tag.arg_u8(1, DEFAULT_BEEP_DURATION),
            }),
            TagKind::Drawer => plan.push(DeviceCommand::Drawer {
                pin: tag.arg_u8(0, 0),
            }),
            TagKind::Feed => plan.push(DeviceCommand::Feed(tag.arg_u8(0, 1))),
            TagKind::Wait => {
                let ms = tag
                    .arg_str(0)
                    .and_then(|a| a.parse::<u64>().ok())
                    .unwrap_or(0);
                plan.push(DeviceCommand::Wait(Duration::from_millis(ms)));
            }
            TagKind::RawExec => plan.push(DeviceCommand::RawExec(raw_bytes(&tag.args, number))),
            TagKind::Bitmap => self.plan_bitmap(line, plan),
            TagKind::Barcode => self.plan_barcode(line, number, plan),
            TagKind::Qr => {
                let ecc = tag
                    .arg_str(0)
                    .and_then(EccLevel::from_name)
                    .unwrap_or_default();
                centered(
                    plan,
                    DeviceCommand::Qr {
                        data: line.content.clone(),
                        ecc,
                        module: tag.arg_u8(1, DEFAULT_QR_MODULE),
                        max_width: self.max_dots,
                    },
                );
            }
            _ => self.plan_text(line, number, plan),
        }
    }

    fn plan_text(&self, line: &LineFormatter, number: usize, plan: &mut CommandPlan) {
        let align = match line.kind {
            FormatKind::RightAlign => Alignment::Right,
            FormatKind::CenterAlign | FormatKind::Title => Alignment::Center,
            _ => Alignment::Left,
        };
        let rendered = line.render();
        for row in rendered.split('\n') {
            let encoded = self.codepage.encode(row);
            if encoded.unmapped > 0 {
                warn!(
                    line = number,
                    unmapped = encoded.unmapped,
                    codepage = self.codepage.id(),
                    "characters replaced with '?'"
                );
            }
            plan.push(DeviceCommand::Text {
                bytes: encoded.bytes,
                align,
                font_w: line.tag.width,
                font_h: line.tag.height,
            });
        }
    }

    fn plan_bitmap(&self, line: &LineFormatter, plan: &mut CommandPlan) {
        let Some(path) = line.tag.arg_str(0) else {
            warn!("bitmap directive without a path");
            plan.skipped.push(TagprintError::AssetMissing {
                path: String::new(),
            });
            return;
        };
        match self.assets.load(path, self.max_dots) {
            Ok(bitmap) => plan.push(DeviceCommand::Raster {
                bitmap,
                skip: line.tag.arg_u8(1, 0),
            }),
            Err(e) => {
                warn!(%path, error = %e, "bitmap skipped");
                plan.skipped.push(e);
            }
        }
    }

    fn plan_barcode(&self, line: &LineFormatter, number: usize, plan: &mut CommandPlan) {
        let name = line.tag.arg_str(0).unwrap_or("code128");
        let Some(symbology) = Symbology::from_name(name) else {
            warn!(line = number, symbology = %name, "unknown barcode symbology, skipped");
            plan.skipped.push(TagprintError::Symbology {
                reason: format!("unknown symbology '{}' on line {}", name, number),
            });
            return;
        };
        centered(
            plan,
            DeviceCommand::Barcode {
                data: line.content.clone(),
                symbology,
                module: line.tag.arg_u8(1, DEFAULT_BAR_MODULE),
                height: DEFAULT_BAR_HEIGHT,
                max_width: self.max_dots,
            },
        );
    }
}

impl Document {
    /// Protocol bytes for a CP437 printer with the default raster width,
    /// bitmaps resolved against the working directory.
    pub fn to_bytes(&self) -> Vec<u8> {
        let assets = FsAssets::new(".");
        Planner::new(Codepage::Cp437, DEFAULT_MAX_DOTS, &assets)
            .plan(self)
            .to_bytes()
    }
}

fn centered(plan: &mut CommandPlan, command: DeviceCommand) {
    plan.push(DeviceCommand::Align(Alignment::Center));
    plan.push(command);
    plan.push(DeviceCommand::Align(Alignment::Left));
}

/// `<XCT:27,112,0>` arguments as bytes; garbled entries are dropped.
fn raw_bytes(args: &[String], line: usize) -> Vec<u8> {
    args.iter()
        .filter(|a| !a.is_empty())
        .filter_map(|a| match a.parse::<u8>() {
            Ok(b) => Some(b),
            Err(_) => {
                warn!(line, value = %a, "raw byte out of range, dropped");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Serves a 2x2 black square for any path except `missing.png`.
    struct FakeAssets;

    impl AssetLoader for FakeAssets {
        fn load(&self, path: &str, _max_width: usize) -> Result<DotMatrix> {
            if path == "missing.png" {
                return Err(TagprintError::AssetMissing { path: path.into() });
            }
            Ok(DotMatrix::from_fn(2, 2, |_, _| true))
        }
    }

    fn plan(lines: &[&str], width: usize) -> CommandPlan {
        let doc = Document::build(lines, width);
        Planner::new(Codepage::Cp437, 576, &FakeAssets).plan(&doc)
    }

    #[test]
    fn test_plan_starts_with_init() {
        let p = plan(&[], 10);
        assert_eq!(
            p.commands,
            vec![DeviceCommand::Init, DeviceCommand::SelectCodepage(Codepage::Cp437)]
        );
    }

    #[test]
    fn test_control_lines() {
        let p = plan(&["<EB>", "<BEEP:2,5>", "<DRAWER>", "<CUT:3>", "<DB>"], 10);
        assert_eq!(
            &p.commands[2..],
            &[
                DeviceCommand::Bold(true),
                DeviceCommand::Beep { count: 2, duration: 5 },
                DeviceCommand::Drawer { pin: 0 },
                DeviceCommand::Cut { feed: 3 },
                DeviceCommand::Bold(false),
            ]
        );
    }

    #[test]
    fn test_beep_defaults() {
        let p = plan(&["<BEEP>"], 10);
        assert_eq!(p.commands[2], DeviceCommand::Beep { count: 1, duration: 3 });
    }

    #[test]
    fn test_text_line_carries_size_and_align() {
        let p = plan(&["<C10>Hi"], 10);
        assert_eq!(
            p.commands[2],
            DeviceCommand::Text {
                bytes: vec![0xB0, b'H', b' ', b'i', 0xB0],
                align: Alignment::Center,
                font_w: 1,
                font_h: 0,
            }
        );
    }

    #[test]
    fn test_box_is_three_rows() {
        let p = plan(&["<BX>A"], 5);
        let rows: Vec<_> = p.commands[2..].iter().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(
            *rows[0],
            DeviceCommand::text(vec![0xC9, 0xCD, 0xCD, 0xCD, 0xBB])
        );
    }

    #[test]
    fn test_missing_bitmap_is_skipped_not_fatal() {
        let p = plan(&["<BMP:missing.png>", "<L>after"], 5);
        assert_eq!(p.skipped.len(), 1);
        assert!(matches!(p.skipped[0], TagprintError::AssetMissing { .. }));
        assert_eq!(p.commands[2], DeviceCommand::text(b"after".to_vec()));
    }

    #[test]
    fn test_bitmap_with_skip() {
        let p = plan(&["<BMP:logo.png,3>"], 5);
        assert!(matches!(p.commands[2], DeviceCommand::Raster { skip: 3, .. }));
    }

    #[test]
    fn test_barcode_and_qr_are_centered() {
        let p = plan(&["<BAR:ean13,3>750103131130", "<QR:H>hello"], 10);
        assert_eq!(p.commands[2], DeviceCommand::Align(Alignment::Center));
        assert_eq!(
            p.commands[3],
            DeviceCommand::Barcode {
                data: "750103131130".into(),
                symbology: Symbology::Ean13,
                module: 3,
                height: DEFAULT_BAR_HEIGHT,
                max_width: 576,
            }
        );
        assert_eq!(p.commands[4], DeviceCommand::Align(Alignment::Left));
        assert_eq!(
            p.commands[6],
            DeviceCommand::Qr {
                data: "hello".into(),
                ecc: EccLevel::H,
                module: DEFAULT_QR_MODULE,
                max_width: 576,
            }
        );
    }

    #[test]
    fn test_unknown_symbology_skipped() {
        let p = plan(&["<BAR:pdf417>data"], 10);
        assert_eq!(p.len(), 2);
        assert!(matches!(p.skipped[0], TagprintError::Symbology { .. }));
    }

    #[test]
    fn test_raw_exec_and_wait() {
        let p = plan(&["<XCT:27,112,0,999,25>", "<WAIT:250>", "<LF:2>"], 10);
        assert_eq!(p.commands[2], DeviceCommand::RawExec(vec![27, 112, 0, 25]));
        assert_eq!(p.commands[3], DeviceCommand::Wait(Duration::from_millis(250)));
        assert_eq!(p.commands[4], DeviceCommand::Feed(2));
    }
}
