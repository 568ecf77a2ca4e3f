//! Rich-text sinks and the print queues they submit to.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{PrintReport, Sink};
use crate::error::{Result, TagprintError};
use crate::layout::Document;
use crate::markup::to_repaired;
use crate::printer::PrinterDescriptor;
use crate::rich::RichDocument;
use crate::transport::{SpoolJob, Spooler};

/// A destination accepting HTML documents.
#[async_trait]
pub trait PrintQueue: Send + Sync {
    /// Queue identifier for logs and locks.
    fn name(&self) -> String;

    /// Submit one document; returns where it went.
    async fn submit(&self, title: &str, html: &str) -> Result<String>;
}

/// A system queue reached through `lp`.
#[derive(Debug, Clone)]
pub struct LpQueue {
    queue: String,
}

impl LpQueue {
    /// `queue` may be empty for the default destination.
    pub fn new(queue: impl Into<String>) -> Self {
        Self {
            queue: queue.into(),
        }
    }
}

#[async_trait]
impl PrintQueue for LpQueue {
    fn name(&self) -> String {
        if self.queue.is_empty() {
            "lp".to_string()
        } else {
            format!("lp:{}", self.queue)
        }
    }

    #[instrument(skip(self, html), fields(queue = %self.name()))]
    async fn submit(&self, title: &str, html: &str) -> Result<String> {
        let device = self.name();
        let mut job = SpoolJob::spawn(&self.queue, false, Some(title)).map_err(|e| {
            TagprintError::TransportUnavailable {
                device: device.clone(),
                reason: e.to_string(),
            }
        })?;
        let failed = |offset: usize, e: std::io::Error| TagprintError::TransportFailed {
            device: device.clone(),
            offset,
            reason: e.to_string(),
        };
        job.write_all(html.as_bytes())
            .await
            .map_err(|e| failed(0, e))?;
        job.finish().await.map_err(|e| failed(html.len(), e))?;
        Ok(device)
    }
}

/// Writes each document as `<uuid>.html` into a directory.
#[derive(Debug, Clone)]
pub struct DirectoryQueue {
    dir: PathBuf,
}

impl DirectoryQueue {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl PrintQueue for DirectoryQueue {
    fn name(&self) -> String {
        self.dir.display().to_string()
    }

    async fn submit(&self, _title: &str, html: &str) -> Result<String> {
        let unavailable = |e: std::io::Error| TagprintError::TransportUnavailable {
            device: self.name(),
            reason: e.to_string(),
        };
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(unavailable)?;
        let path = self.dir.join(format!("{}.html", Uuid::new_v4()));
        tokio::fs::write(&path, html).await.map_err(unavailable)?;
        Ok(path.display().to_string())
    }
}

/// How a document becomes rich text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFlavor {
    /// One monospace paragraph per printed row
    RichText,
    /// Through HTML and the lenient repair parser
    Html,
}

pub struct QueueSink {
    descriptor: PrinterDescriptor,
    flavor: DocumentFlavor,
    queue: Box<dyn PrintQueue>,
    spooler: Spooler,
}

impl QueueSink {
    pub fn new(
        descriptor: PrinterDescriptor,
        flavor: DocumentFlavor,
        queue: Box<dyn PrintQueue>,
        spooler: Spooler,
    ) -> Self {
        Self {
            descriptor,
            flavor,
            queue,
            spooler,
        }
    }

    /// The rich document for `document`, plus markup issues met on the way.
    pub fn render(&self, document: &Document) -> (RichDocument, Vec<TagprintError>) {
        match self.flavor {
            DocumentFlavor::RichText => (RichDocument::from_document(document), Vec::new()),
            DocumentFlavor::Html => {
                let repaired = to_repaired(document);
                (RichDocument::from_markup(&repaired.root), repaired.issues)
            }
        }
    }
}

#[async_trait]
impl Sink for QueueSink {
    fn descriptor(&self) -> &PrinterDescriptor {
        &self.descriptor
    }

    async fn print(&self, document: &Document) -> Result<PrintReport> {
        let (rich, skipped) = self.render(document);
        let html = rich.to_html(&self.descriptor.name);
        let device = self.queue.name();

        let _guard = self.spooler.acquire(&device).await;
        let destination = tokio::time::timeout(
            self.descriptor.timeout(),
            self.queue.submit(&self.descriptor.name, &html),
        )
        .await
        .map_err(|_| TagprintError::Timeout {
            device: device.clone(),
            offset: 0,
        })??;

        info!(%destination, bytes = html.len(), "document submitted");
        Ok(PrintReport {
            destination,
            bytes: html.len(),
            skipped,
        })
    }
}
