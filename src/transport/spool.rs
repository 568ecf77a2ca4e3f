//! System spooler submission through `lp`.
//!
//! Raw jobs (`-o raw`) carry device protocol bytes that CUPS passes to the
//! printer untouched; document jobs carry HTML that the queue's filters
//! render.

use std::io;
use std::process::{ExitStatus, Stdio};

use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tracing::debug;

/// Spooler client binary.
pub const LP: &str = "lp";

/// Arguments for one `lp` submission reading from stdin.
pub fn lp_args(queue: &str, raw: bool, title: Option<&str>) -> Vec<String> {
    let mut args = Vec::new();
    if !queue.is_empty() {
        args.push("-d".to_string());
        args.push(queue.to_string());
    }
    if let Some(title) = title {
        args.push("-t".to_string());
        args.push(title.to_string());
    }
    if raw {
        args.push("-o".to_string());
        args.push("raw".to_string());
    }
    args
}

/// A running `lp` process fed through its stdin.
#[derive(Debug)]
pub struct SpoolJob {
    child: Child,
    stdin: Option<ChildStdin>,
}

impl SpoolJob {
    pub fn spawn(queue: &str, raw: bool, title: Option<&str>) -> io::Result<Self> {
        let args = lp_args(queue, raw, title);
        debug!(?args, "spawning lp");
        let mut child = Command::new(LP)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;
        let stdin = child.stdin.take();
        Ok(Self { child, stdin })
    }

    fn stdin(&mut self) -> io::Result<&mut ChildStdin> {
        self.stdin
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "lp stdin closed"))
    }

    pub async fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stdin()?.write(buf).await
    }

    pub async fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.stdin()?.write_all(buf).await
    }

    pub async fn flush(&mut self) -> io::Result<()> {
        self.stdin()?.flush().await
    }

    /// Close stdin and wait for `lp` to accept the job.
    pub async fn finish(mut self) -> io::Result<()> {
        if let Some(mut stdin) = self.stdin.take() {
            stdin.shutdown().await?;
        }
        let output = self.child.wait_with_output().await?;
        check_status(output.status, &output.stderr)
    }
}

fn check_status(status: ExitStatus, stderr: &[u8]) -> io::Result<()> {
    if status.success() {
        return Ok(());
    }
    Err(io::Error::other(format!(
        "lp exited with {}: {}",
        status,
        String::from_utf8_lossy(stderr).trim()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_args() {
        assert_eq!(lp_args("kitchen", true, None), vec!["-d", "kitchen", "-o", "raw"]);
    }

    #[test]
    fn test_document_args_with_title() {
        assert_eq!(lp_args("", false, Some("Order 12")), vec!["-t", "Order 12"]);
    }
}
