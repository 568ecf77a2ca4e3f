//! Plain-text sinks.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use super::{PrintReport, Sink};
use crate::error::{Result, TagprintError};
use crate::layout::Document;
use crate::printer::PrinterDescriptor;
use crate::transport::Spooler;

/// Writes the flattened document to a file, replacing its contents.
pub struct TextSink {
    descriptor: PrinterDescriptor,
    path: PathBuf,
    spooler: Spooler,
}

impl TextSink {
    pub fn new(descriptor: PrinterDescriptor, path: PathBuf, spooler: Spooler) -> Self {
        Self {
            descriptor,
            path,
            spooler,
        }
    }
}

#[async_trait]
impl Sink for TextSink {
    fn descriptor(&self) -> &PrinterDescriptor {
        &self.descriptor
    }

    async fn print(&self, document: &Document) -> Result<PrintReport> {
        let device = self.path.display().to_string();
        let mut text = document.flatten();
        text.push('\n');

        let _guard = self.spooler.acquire(&device).await;
        tokio::fs::write(&self.path, &text)
            .await
            .map_err(|e| TagprintError::TransportUnavailable {
                device: device.clone(),
                reason: e.to_string(),
            })?;
        info!(%device, bytes = text.len(), "text written");
        Ok(PrintReport {
            destination: device,
            bytes: text.len(),
            skipped: Vec::new(),
        })
    }
}

/// Logs the flattened document and prints it to stdout.
pub struct DemoSink {
    descriptor: PrinterDescriptor,
}

impl DemoSink {
    pub fn new(descriptor: PrinterDescriptor) -> Self {
        Self { descriptor }
    }
}

#[async_trait]
impl Sink for DemoSink {
    fn descriptor(&self) -> &PrinterDescriptor {
        &self.descriptor
    }

    async fn print(&self, document: &Document) -> Result<PrintReport> {
        for line in document.text_lines() {
            info!(printer = %self.descriptor.name, "{}", line);
        }
        let text = document.flatten();
        println!("{}", text);
        Ok(PrintReport {
            destination: "stdout".to_string(),
            bytes: text.len(),
            skipped: Vec::new(),
        })
    }
}
