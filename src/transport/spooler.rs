//! Per-device job serialization.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::OwnedMutexGuard;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use super::{ScopedChannel, TransportTarget};
use crate::error::{Result, TagprintError};
use crate::ir::EncodedJob;

/// Owns one async lock per device; jobs on the same device run one at a
/// time, jobs on different devices run in parallel.
#[derive(Debug, Clone, Default)]
pub struct Spooler {
    locks: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

impl Spooler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclusive access to `device` until the guard is dropped.
    pub async fn acquire(&self, device: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(device.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Stream a job to `target` under the device lock.
    ///
    /// `cancel` is honoured until the lock is held, including while the job
    /// waits behind another one. Once streaming starts the job finishes or
    /// fails as a unit.
    ///
    /// Returns the number of bytes written. On timeout the channel is
    /// dropped (closing the device) and the error carries the offset
    /// reached.
    #[instrument(skip_all, fields(device = %target.device(), bytes = job.byte_len()))]
    pub async fn submit(
        &self,
        target: &TransportTarget,
        job: &EncodedJob,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<usize> {
        let device = target.device();
        let _guard = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("job cancelled before streaming");
                return Err(TagprintError::Cancelled { device: device.clone() });
            }
            guard = self.acquire(&device) => guard,
        };

        info!("job started");
        let mut channel = ScopedChannel::new(target.clone());
        let outcome = tokio::time::timeout(timeout, async {
            channel.stream(job).await?;
            channel.close().await
        })
        .await;

        match outcome {
            Ok(Ok(written)) => {
                info!(written, "job finished");
                Ok(written)
            }
            Ok(Err(e)) => {
                error!(error = %e, "job failed");
                Err(e)
            }
            Err(_) => {
                let offset = channel.written();
                error!(offset, "job timed out");
                Err(TagprintError::Timeout { device, offset })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Segment;

    fn job(segments: Vec<Segment>) -> EncodedJob {
        EncodedJob {
            segments,
            skipped: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_submit_writes_capture() {
        let dir = tempfile::tempdir().unwrap();
        let target = TransportTarget::Capture(dir.path().join("out.bin"));
        let written = Spooler::new()
            .submit(
                &target,
                &job(vec![Segment::Bytes(vec![0x1B, 0x40])]),
                Duration::from_secs(5),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(written, 2);
    }

    #[tokio::test]
    async fn test_same_device_jobs_never_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        let target = TransportTarget::Capture(path.clone());
        let spooler = Spooler::new();
        let cancel = CancellationToken::new();

        let make = |b: u8| {
            job(vec![
                Segment::Bytes(vec![b; 8]),
                Segment::Pause(Duration::from_millis(20)),
                Segment::Bytes(vec![b; 8]),
            ])
        };
        let (a, b) = (make(1), make(2));
        let timeout = Duration::from_secs(5);
        let (ra, rb) = tokio::join!(
            spooler.submit(&target, &a, timeout, &cancel),
            spooler.submit(&target, &b, timeout, &cancel)
        );
        assert_eq!(ra.unwrap(), 16);
        assert_eq!(rb.unwrap(), 16);

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 32);
        assert!(bytes[..16].iter().all(|&x| x == bytes[0]));
        assert!(bytes[16..].iter().all(|&x| x == bytes[16]));
        assert_ne!(bytes[0], bytes[16]);
    }

    #[tokio::test]
    async fn test_timeout_reports_offset() {
        let dir = tempfile::tempdir().unwrap();
        let target = TransportTarget::Capture(dir.path().join("out.bin"));
        let err = Spooler::new()
            .submit(
                &target,
                &job(vec![
                    Segment::Bytes(b"abc".to_vec()),
                    Segment::Pause(Duration::from_secs(5)),
                    Segment::Bytes(b"def".to_vec()),
                ]),
                Duration::from_millis(50),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TagprintError::Timeout { offset: 3, .. }));
    }

    #[tokio::test]
    async fn test_cancelled_job_never_opens_device() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = Spooler::new()
            .submit(
                &TransportTarget::Capture(path.clone()),
                &job(vec![Segment::Bytes(vec![1])]),
                Duration::from_secs(1),
                &cancel,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TagprintError::Cancelled { .. }));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_cancel_while_queued_skips_the_lock() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        let target = TransportTarget::Capture(path.clone());
        let spooler = Spooler::new();
        let held = spooler.acquire(&target.device()).await;

        let cancel = CancellationToken::new();
        let queued = tokio::spawn({
            let (spooler, target, cancel) = (spooler.clone(), target.clone(), cancel.clone());
            async move {
                let one = job(vec![Segment::Bytes(vec![1])]);
                spooler
                    .submit(&target, &one, Duration::from_secs(1), &cancel)
                    .await
            }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
        let result = tokio::time::timeout(Duration::from_secs(1), queued)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(result, Err(TagprintError::Cancelled { .. })));
        assert!(!path.exists());
        drop(held);
    }

    #[tokio::test]
    async fn test_unavailable_device_releases_lock() {
        let spooler = Spooler::new();
        let target = TransportTarget::Capture("/nonexistent-dir/out.bin".into());
        let one = job(vec![Segment::Bytes(vec![1])]);
        for _ in 0..2 {
            let err = spooler
                .submit(&target, &one, Duration::from_secs(1), &CancellationToken::new())
                .await
                .unwrap_err();
            assert!(matches!(err, TagprintError::TransportUnavailable { .. }));
        }
    }
}
