//! # Output Sinks
//!
//! A sink consumes a formatted [`Document`] and delivers it somewhere. The
//! factory picks one from the descriptor's transport kind:
//!
//! | Kind | Sink | Output |
//! |------|------|--------|
//! | `serial` `network` `spool` `capture` | [`ProtocolSink`] | ESC/POS bytes |
//! | `richtext` | [`QueueSink`] | rich document as HTML, to a print queue |
//! | `html` | [`QueueSink`] | tagged lines → HTML → repaired tree → rich document |
//! | `text` | [`TextSink`] | flattened text file |
//! | `demo` | [`DemoSink`] | flattened text on the log and stdout |
//!
//! Print queues are `lp` destinations, or directories when the address is
//! `dir:<path>`.

mod protocol;
mod queue;
mod text;

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::warn;

use crate::error::{Result, TagprintError};
use crate::layout::Document;
use crate::printer::{PrinterDescriptor, TransportKind};
use crate::transport::{CancellationToken, Spooler, TransportTarget};

pub use protocol::ProtocolSink;
pub use queue::{DirectoryQueue, DocumentFlavor, LpQueue, PrintQueue, QueueSink};
pub use text::{DemoSink, TextSink};

/// Prefix selecting a [`DirectoryQueue`].
pub const DIRECTORY_PREFIX: &str = "dir:";

/// Outcome of a delivered job.
#[derive(Debug, Default)]
pub struct PrintReport {
    /// Device, queue or file the job went to
    pub destination: String,
    /// Bytes written or submitted
    pub bytes: usize,
    /// Recoverable problems met while rendering this job
    pub skipped: Vec<TagprintError>,
}

/// An output backend.
#[async_trait]
pub trait Sink: Send + Sync {
    fn descriptor(&self) -> &PrinterDescriptor;

    /// Deliver one document. Transport failures abort the job.
    async fn print(&self, document: &Document) -> Result<PrintReport>;
}

/// Shared state handed to sinks by the factory.
#[derive(Debug, Clone)]
pub struct SinkOptions {
    pub spooler: Spooler,
    pub cancel: CancellationToken,
    /// Directory `<BMP:...>` paths are resolved against
    pub asset_root: PathBuf,
}

impl Default for SinkOptions {
    fn default() -> Self {
        Self {
            spooler: Spooler::new(),
            cancel: CancellationToken::new(),
            asset_root: PathBuf::from("."),
        }
    }
}

/// Build the sink for a descriptor.
pub fn create_sink(descriptor: &PrinterDescriptor, options: &SinkOptions) -> Result<Box<dyn Sink>> {
    descriptor.validate()?;
    let descriptor = descriptor.clone();

    let sink: Box<dyn Sink> = match descriptor.transport {
        TransportKind::Serial
        | TransportKind::Network
        | TransportKind::Spool
        | TransportKind::Capture => {
            let target = TransportTarget::from_descriptor(&descriptor).ok_or_else(|| {
                TagprintError::Config(format!("no protocol target for {}", descriptor.name))
            })?;
            Box::new(ProtocolSink::new(descriptor, target, options))
        }
        TransportKind::RichText | TransportKind::Html => {
            let flavor = if descriptor.transport == TransportKind::Html {
                DocumentFlavor::Html
            } else {
                DocumentFlavor::RichText
            };
            let queue: Box<dyn PrintQueue> =
                match descriptor.address.trim().strip_prefix(DIRECTORY_PREFIX) {
                    Some(dir) => Box::new(DirectoryQueue::new(dir)),
                    None => Box::new(LpQueue::new(descriptor.address.trim())),
                };
            Box::new(QueueSink::new(descriptor, flavor, queue, options.spooler.clone()))
        }
        TransportKind::Text => {
            let path = PathBuf::from(descriptor.address.trim());
            Box::new(TextSink::new(descriptor, path, options.spooler.clone()))
        }
        TransportKind::Demo => Box::new(DemoSink::new(descriptor)),
    };
    Ok(sink)
}

/// Lay out a template for the sink's printer and deliver it.
pub async fn print_template(sink: &dyn Sink, template: &[String]) -> Result<PrintReport> {
    let document = Document::build(template, sink.descriptor().chars_per_line);
    for diagnostic in document.diagnostics() {
        warn!(%diagnostic, "layout issue");
    }
    sink.print(&document).await
}
