//! # Printer Transport Layer
//!
//! Device channels for protocol byte streams.
//!
//! ## Available Transports
//!
//! - [`serial`]: serial / USB-serial / RFCOMM device nodes, raw tty mode
//! - [`network`]: raw TCP, port 9100 by default
//! - [`spool`]: the system spooler via `lp -o raw`
//! - capture: bytes appended to a file
//!
//! ## Exclusive Access
//!
//! A physical channel is shared by every job aimed at it, so access is
//! scoped: a [`ScopedChannel`] opens the device on its first write and
//! closes it when dropped, on success and failure alike. The [`Spooler`]
//! holds one lock per device so two jobs never interleave bytes on the same
//! channel, and bounds every job with a timeout.

pub mod network;
pub mod serial;
pub mod spool;
mod spooler;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::error::{Result, TagprintError};
use crate::ir::{EncodedJob, Segment};
use crate::printer::{PrinterDescriptor, TransportKind};

pub use spool::SpoolJob;
pub use spooler::Spooler;
pub use tokio_util::sync::CancellationToken;

/// Where protocol bytes are written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransportTarget {
    Serial(PathBuf),
    Network(String),
    /// Queue name, empty for the default queue
    Spool(String),
    Capture(PathBuf),
}

impl TransportTarget {
    /// The protocol target for a descriptor, or `None` for document sinks.
    pub fn from_descriptor(descriptor: &PrinterDescriptor) -> Option<Self> {
        let address = descriptor.address.trim();
        match descriptor.transport {
            TransportKind::Serial => Some(Self::Serial(PathBuf::from(address))),
            TransportKind::Network => Some(Self::Network(address.to_string())),
            TransportKind::Spool => Some(Self::Spool(address.to_string())),
            TransportKind::Capture => Some(Self::Capture(PathBuf::from(address))),
            _ => None,
        }
    }

    /// Device identifier used in errors, logs and lock keys.
    pub fn device(&self) -> String {
        match self {
            Self::Serial(path) | Self::Capture(path) => path.display().to_string(),
            Self::Network(address) => address.clone(),
            Self::Spool(queue) if queue.is_empty() => "lp".to_string(),
            Self::Spool(queue) => format!("lp:{}", queue),
        }
    }

    async fn open(&self) -> Result<Channel> {
        let unavailable = |e: io::Error| TagprintError::TransportUnavailable {
            device: self.device(),
            reason: e.to_string(),
        };
        let channel = match self {
            Self::Serial(path) => Channel::File(serial::open(path).await?),
            Self::Network(address) => Channel::Tcp(network::connect(address).await?),
            Self::Spool(queue) => {
                Channel::Spool(SpoolJob::spawn(queue, true, None).map_err(unavailable)?)
            }
            Self::Capture(path) => Channel::File(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .await
                    .map_err(unavailable)?,
            ),
        };
        debug!(device = %self.device(), "channel opened");
        Ok(channel)
    }
}

/// An open device channel.
#[derive(Debug)]
enum Channel {
    File(tokio::fs::File),
    Tcp(TcpStream),
    Spool(SpoolJob),
}

impl Channel {
    async fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Channel::File(f) => f.write(buf).await,
            Channel::Tcp(s) => s.write(buf).await,
            Channel::Spool(job) => job.write(buf).await,
        }
    }

    async fn flush(&mut self) -> io::Result<()> {
        match self {
            Channel::File(f) => f.flush().await,
            Channel::Tcp(s) => s.flush().await,
            Channel::Spool(job) => job.flush().await,
        }
    }

    async fn close(self) -> io::Result<()> {
        match self {
            Channel::File(mut f) => f.flush().await,
            Channel::Tcp(mut s) => {
                s.flush().await?;
                s.shutdown().await
            }
            Channel::Spool(job) => job.finish().await,
        }
    }
}

/// A device channel acquired for one job.
///
/// The device is opened by the first non-empty write and closed by
/// [`ScopedChannel::close`] or, on any other exit path, by drop. `written`
/// counts bytes the device accepted, which is the offset reported when a
/// write fails.
#[derive(Debug)]
pub struct ScopedChannel {
    target: TransportTarget,
    channel: Option<Channel>,
    written: usize,
}

impl ScopedChannel {
    pub fn new(target: TransportTarget) -> Self {
        Self {
            target,
            channel: None,
            written: 0,
        }
    }

    pub fn target(&self) -> &TransportTarget {
        &self.target
    }

    pub fn is_open(&self) -> bool {
        self.channel.is_some()
    }

    /// Bytes accepted by the device so far.
    pub fn written(&self) -> usize {
        self.written
    }

    fn failed(&self, reason: impl ToString) -> TagprintError {
        TagprintError::TransportFailed {
            device: self.target.device(),
            offset: self.written,
            reason: reason.to_string(),
        }
    }

    pub async fn write(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        let channel = match self.channel.take() {
            Some(channel) => channel,
            None => self.target.open().await?,
        };
        let channel = self.channel.insert(channel);

        let mut pos = 0;
        while pos < bytes.len() {
            match channel.write(&bytes[pos..]).await {
                Ok(0) => return Err(self.failed("device accepted no bytes")),
                Ok(n) => {
                    pos += n;
                    self.written += n;
                }
                Err(e) => return Err(self.failed(e)),
            }
        }
        Ok(())
    }

    /// Flush what was written, then wait.
    pub async fn pause(&mut self, duration: Duration) -> Result<()> {
        if let Some(channel) = self.channel.as_mut()
            && let Err(e) = channel.flush().await
        {
            return Err(self.failed(e));
        }
        tokio::time::sleep(duration).await;
        Ok(())
    }

    /// Write a whole encoded job, honouring its pauses.
    pub async fn stream(&mut self, job: &EncodedJob) -> Result<()> {
        for segment in &job.segments {
            match segment {
                Segment::Bytes(bytes) => self.write(bytes).await?,
                Segment::Pause(duration) => self.pause(*duration).await?,
            }
        }
        Ok(())
    }

    /// Flush and close the device. Returns the number of bytes written.
    pub async fn close(&mut self) -> Result<usize> {
        if let Some(channel) = self.channel.take()
            && let Err(e) = channel.close().await
        {
            return Err(self.failed(e));
        }
        info!(device = %self.target.device(), bytes = self.written, "channel closed");
        Ok(self.written)
    }
}
