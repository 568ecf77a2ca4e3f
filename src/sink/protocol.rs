//! Protocol-stream sink: plan, encode, stream to a device channel.

use async_trait::async_trait;
use tracing::info;

use super::{PrintReport, Sink, SinkOptions};
use crate::error::Result;
use crate::ir::{Encoder, FsAssets, Planner};
use crate::layout::Document;
use crate::printer::PrinterDescriptor;
use crate::protocol::codepage::Codepage;
use crate::transport::{CancellationToken, Spooler, TransportTarget};

pub struct ProtocolSink {
    descriptor: PrinterDescriptor,
    target: TransportTarget,
    assets: FsAssets,
    spooler: Spooler,
    cancel: CancellationToken,
}

impl ProtocolSink {
    pub fn new(descriptor: PrinterDescriptor, target: TransportTarget, options: &SinkOptions) -> Self {
        Self {
            descriptor,
            target,
            assets: FsAssets::new(options.asset_root.clone()),
            spooler: options.spooler.clone(),
            cancel: options.cancel.clone(),
        }
    }

    pub fn target(&self) -> &TransportTarget {
        &self.target
    }
}

#[async_trait]
impl Sink for ProtocolSink {
    fn descriptor(&self) -> &PrinterDescriptor {
        &self.descriptor
    }

    async fn print(&self, document: &Document) -> Result<PrintReport> {
        let codepage = Codepage::from_id(self.descriptor.codepage);
        let mut plan = Planner::new(codepage, self.descriptor.max_dots, &self.assets).plan(document);
        let mut job = Encoder::default().encode(&plan);
        info!(
            printer = %self.descriptor.name,
            commands = plan.len(),
            bytes = job.byte_len(),
            "protocol job encoded"
        );

        let bytes = self
            .spooler
            .submit(&self.target, &job, self.descriptor.timeout(), &self.cancel)
            .await?;

        let mut skipped = std::mem::take(&mut plan.skipped);
        skipped.append(&mut job.skipped);
        Ok(PrintReport {
            destination: self.target.device(),
            bytes,
            skipped,
        })
    }
}
