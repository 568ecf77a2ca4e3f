//! # Code Generation
//!
//! Compiles a [`CommandPlan`] to ESC/POS bytes. The encoder is a pure
//! function of the command list: the same plan always yields the same bytes.
//!
//! `Wait` commands split the output into [`Segment`]s so the channel can
//! pause between writes without ever pausing inside a command.

use std::time::Duration;

use tracing::{debug, warn};

use super::ops::{CommandPlan, DeviceCommand};
use crate::error::{Result, TagprintError};
use crate::protocol::text::Alignment;
use crate::protocol::{commands, text};
use crate::raster::{DotMatrix, StandardSymbols, SymbolRenderer};

/// A contiguous run of bytes, or a pause between two runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Bytes(Vec<u8>),
    Pause(Duration),
}

/// Encoder output for one job.
#[derive(Debug, Default)]
pub struct EncodedJob {
    pub segments: Vec<Segment>,
    /// Symbols the renderer rejected; the rest of the job is intact
    pub skipped: Vec<TagprintError>,
}

impl EncodedJob {
    /// All bytes in order, pauses dropped.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.byte_len());
        for segment in &self.segments {
            if let Segment::Bytes(bytes) = segment {
                out.extend_from_slice(bytes);
            }
        }
        out
    }

    pub fn byte_len(&self) -> usize {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Bytes(b) => b.len(),
                Segment::Pause(_) => 0,
            })
            .sum()
    }
}

/// Encode one text line: alignment, size, bytes, LF.
pub fn encode_text(bytes: &[u8], align: Alignment, font_w: u8, font_h: u8) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 10);
    if align != Alignment::Left {
        out.extend(text::align(align));
    }
    out.extend(text::size(font_w, font_h));
    out.extend_from_slice(bytes);
    out.push(commands::LF);
    if align != Alignment::Left {
        out.extend(text::align(Alignment::Left));
    }
    out
}

/// Render a symbol at `module` dots, stepping the module down until the
/// symbol fits `max_width`. Zero means no limit.
fn fit_module(
    module: u8,
    max_width: usize,
    render: impl Fn(u8) -> Result<DotMatrix>,
) -> Result<DotMatrix> {
    let mut module = module.max(1);
    loop {
        let matrix = render(module)?;
        if max_width == 0 || matrix.width() <= max_width {
            return Ok(matrix);
        }
        if module == 1 {
            return Err(TagprintError::Symbology {
                reason: format!(
                    "symbol is {} dots wide, paper holds {}",
                    matrix.width(),
                    max_width
                ),
            });
        }
        module -= 1;
    }
}

/// Compiles command plans using a symbol renderer for barcodes and QR codes.
pub struct Encoder<'a> {
    symbols: &'a dyn SymbolRenderer,
}

impl Default for Encoder<'static> {
    fn default() -> Self {
        Self {
            symbols: &StandardSymbols,
        }
    }
}

impl<'a> Encoder<'a> {
    pub fn new(symbols: &'a dyn SymbolRenderer) -> Self {
        Self { symbols }
    }

    /// Compile a plan.
    pub fn encode(&self, plan: &CommandPlan) -> EncodedJob {
        let mut job = EncodedJob::default();
        let mut out = Vec::new();

        for command in plan {
            match command {
                // ===== Printer Control =====
                DeviceCommand::Init => out.extend(commands::init()),
                DeviceCommand::SelectCodepage(cp) => out.extend(cp.select()),
                DeviceCommand::Cut { feed } => out.extend(commands::cut(*feed)),
                DeviceCommand::Feed(lines) => out.extend(commands::feed_lines(*lines)),
                DeviceCommand::Beep { count, duration } => {
                    out.extend(commands::beep(*count, *duration))
                }
                DeviceCommand::Drawer { pin } => out.extend(commands::drawer_kick(*pin)),
                DeviceCommand::Wait(duration) => {
                    if !out.is_empty() {
                        job.segments.push(Segment::Bytes(std::mem::take(&mut out)));
                    }
                    job.segments.push(Segment::Pause(*duration));
                }

                // ===== Text =====
                DeviceCommand::Text {
                    bytes,
                    align,
                    font_w,
                    font_h,
                } => out.extend(encode_text(bytes, *align, *font_w, *font_h)),
                DeviceCommand::Bold(true) => out.extend(text::bold_on()),
                DeviceCommand::Bold(false) => out.extend(text::bold_off()),
                DeviceCommand::Align(align) => out.extend(text::align(*align)),

                // ===== Graphics =====
                DeviceCommand::Raster { bitmap, skip } => out.extend(bitmap.to_raster(*skip)),
                DeviceCommand::Barcode {
                    data,
                    symbology,
                    module,
                    height,
                    max_width,
                } => {
                    let fitted = fit_module(*module, *max_width, |m| {
                        self.symbols.barcode(data, *symbology, m, *height)
                    });
                    match fitted {
                        Ok(matrix) => out.extend(matrix.to_raster(0)),
                        Err(e) => {
                            warn!(error = %e, %data, "barcode skipped");
                            job.skipped.push(e);
                        }
                    }
                }
                DeviceCommand::Qr {
                    data,
                    ecc,
                    module,
                    max_width,
                } => match fit_module(*module, *max_width, |m| self.symbols.qr(data, *ecc, m)) {
                    Ok(matrix) => out.extend(matrix.to_raster(0)),
                    Err(e) => {
                        warn!(error = %e, "QR code skipped");
                        job.skipped.push(e);
                    }
                },
                DeviceCommand::RawExec(bytes) => out.extend_from_slice(bytes),
            }
        }

        if !out.is_empty() {
            job.segments.push(Segment::Bytes(out));
        }
        debug!(
            bytes = job.byte_len(),
            segments = job.segments.len(),
            "plan encoded"
        );
        job
    }
}

impl CommandPlan {
    /// Compile with the standard symbol renderer.
    pub fn encode(&self) -> EncodedJob {
        Encoder::default().encode(self)
    }

    /// Compile and concatenate all bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.encode().to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::protocol::codepage::Codepage;
    use crate::raster::{DotMatrix, EccLevel, Symbology};

    #[test]
    fn test_empty_plan() {
        assert!(CommandPlan::new().to_bytes().is_empty());
    }

    #[test]
    fn test_init_and_codepage() {
        let plan = CommandPlan::with_init(Codepage::Cp437);
        assert_eq!(plan.to_bytes(), vec![0x1B, 0x40, 0x1B, 0x74, 0x00]);
    }

    #[test]
    fn test_left_text_line() {
        let plan: CommandPlan = [DeviceCommand::text(b"Hello".to_vec())].into_iter().collect();
        assert_eq!(
            plan.to_bytes(),
            vec![0x1D, 0x21, 0x00, b'H', b'e', b'l', b'l', b'o', 0x0A]
        );
    }

    #[test]
    fn test_centered_double_width_line() {
        let bytes = encode_text(b"AB", Alignment::Center, 1, 1);
        assert_eq!(
            bytes,
            vec![0x1B, 0x61, 0x01, 0x1D, 0x21, 0x11, b'A', b'B', 0x0A, 0x1B, 0x61, 0x00]
        );
    }

    #[test]
    fn test_beep_bytes() {
        let plan: CommandPlan = [DeviceCommand::Beep {
            count: 2,
            duration: 5,
        }]
        .into_iter()
        .collect();
        assert_eq!(plan.to_bytes(), vec![0x1B, 0x42, 0x02, 0x05]);
    }

    #[test]
    fn test_control_commands() {
        let plan: CommandPlan = [
            DeviceCommand::Bold(true),
            DeviceCommand::Bold(false),
            DeviceCommand::Drawer { pin: 0 },
            DeviceCommand::Feed(2),
            DeviceCommand::Cut { feed: 0 },
            DeviceCommand::RawExec(vec![0x07]),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            plan.to_bytes(),
            vec![
                0x1B, 0x45, 0x01, // bold on
                0x1B, 0x45, 0x00, // bold off
                0x1B, 0x70, 0x00, 25, 250, // drawer
                0x1B, 0x64, 0x02, // feed
                0x1D, 0x56, 0x42, 0x00, // cut
                0x07,
            ]
        );
    }

    #[test]
    fn test_wait_splits_segments() {
        let plan: CommandPlan = [
            DeviceCommand::Drawer { pin: 0 },
            DeviceCommand::Wait(Duration::from_millis(100)),
            DeviceCommand::Cut { feed: 0 },
        ]
        .into_iter()
        .collect();
        let job = plan.encode();
        assert_eq!(
            job.segments,
            vec![
                Segment::Bytes(commands::drawer_kick(0)),
                Segment::Pause(Duration::from_millis(100)),
                Segment::Bytes(commands::cut(0)),
            ]
        );
        assert_eq!(job.byte_len(), 9);
    }

    #[test]
    fn test_raster_encoding_is_idempotent() {
        let bitmap = DotMatrix::from_fn(40, 30, |x, y| (x + y) % 3 == 0);
        let plan: CommandPlan = [DeviceCommand::Raster { bitmap, skip: 1 }]
            .into_iter()
            .collect();
        assert_eq!(plan.to_bytes(), plan.to_bytes());
    }

    struct FailingSymbols;

    impl SymbolRenderer for FailingSymbols {
        fn barcode(&self, _: &str, _: Symbology, _: u8, _: u16) -> Result<DotMatrix> {
            Err(TagprintError::Symbology {
                reason: "nope".into(),
            })
        }

        fn qr(&self, _: &str, _: EccLevel, _: u8) -> Result<DotMatrix> {
            Ok(DotMatrix::from_fn(8, 8, |_, _| true))
        }
    }

    #[test]
    fn test_symbol_failure_skips_only_that_command() {
        let plan: CommandPlan = [
            DeviceCommand::Barcode {
                data: "x".into(),
                symbology: Symbology::Ean13,
                module: 2,
                height: 10,
                max_width: 576,
            },
            DeviceCommand::Qr {
                data: "x".into(),
                ecc: EccLevel::M,
                module: 1,
                max_width: 576,
            },
        ]
        .into_iter()
        .collect();
        let job = Encoder::new(&FailingSymbols).encode(&plan);
        assert_eq!(job.skipped.len(), 1);
        assert_eq!(job.to_bytes(), DotMatrix::from_fn(8, 8, |_, _| true).to_raster(0));
    }

    /// Symbols ten modules wide.
    struct ScalingSymbols;

    impl SymbolRenderer for ScalingSymbols {
        fn barcode(&self, _: &str, _: Symbology, module: u8, height: u16) -> Result<DotMatrix> {
            Ok(DotMatrix::from_fn(10 * module as usize, height as usize, |x, _| x % 2 == 0))
        }

        fn qr(&self, _: &str, _: EccLevel, module: u8) -> Result<DotMatrix> {
            let side = 10 * module as usize;
            Ok(DotMatrix::new(side, side))
        }
    }

    #[test]
    fn test_wide_symbols_shrink_to_the_paper() {
        let plan: CommandPlan = [
            DeviceCommand::Barcode {
                data: "x".into(),
                symbology: Symbology::Code128,
                module: 4,
                height: 24,
                max_width: 25,
            },
            DeviceCommand::Qr {
                data: "x".into(),
                ecc: EccLevel::M,
                module: 3,
                max_width: 5,
            },
        ]
        .into_iter()
        .collect();
        let job = Encoder::new(&ScalingSymbols).encode(&plan);

        let expected = ScalingSymbols.barcode("x", Symbology::Code128, 2, 24).unwrap();
        assert_eq!(job.to_bytes(), expected.to_raster(0));
        assert_eq!(job.skipped.len(), 1);
        assert!(matches!(job.skipped[0], TagprintError::Symbology { .. }));
    }
}
