//! # Serial Transport
//!
//! Serial and USB-serial printers show up as device nodes (`/dev/ttyUSB0`,
//! `/dev/ttyACM0`, `/dev/rfcomm0` for Bluetooth SPP). The node is opened
//! write-only and, when it is a terminal, switched to raw mode so binary
//! data passes through unmodified:
//!
//! - **No input processing**: IGNBRK, BRKINT, PARMRK, ISTRIP, INLCR, IGNCR,
//!   ICRNL cleared
//! - **No software flow control**: IXON, IXOFF, IXANY cleared, since 0x11
//!   and 0x13 appear in raster data
//! - **No output processing**: OPOST cleared (no LF to CRLF)
//! - **8-bit characters**: CS8, no parity
//! - **Non-canonical, no echo**: ICANON, ECHO, ECHONL, ISIG, IEXTEN cleared
//!
//! Anything that is not a terminal (a FIFO, a plain file) is written as is.

use std::fs::OpenOptions;
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, TagprintError};

/// Open a device node for writing.
///
/// Opening a tty can block on carrier detect, so the open and the raw-mode
/// setup run on the blocking pool.
pub async fn open(path: &Path) -> Result<tokio::fs::File> {
    let owned = path.to_path_buf();
    let file = tokio::task::spawn_blocking(move || open_raw(owned))
        .await
        .map_err(|e| TagprintError::TransportUnavailable {
            device: path.display().to_string(),
            reason: e.to_string(),
        })??;
    Ok(tokio::fs::File::from_std(file))
}

fn open_raw(path: PathBuf) -> Result<std::fs::File> {
    let device = path.display().to_string();
    let file = OpenOptions::new()
        .write(true)
        .open(&path)
        .map_err(|e| TagprintError::TransportUnavailable {
            device: device.clone(),
            reason: e.to_string(),
        })?;

    let fd = file.as_raw_fd();
    if is_tty(fd) {
        configure_tty_raw(fd).map_err(|e| TagprintError::TransportUnavailable {
            device: device.clone(),
            reason: format!("raw mode: {}", e),
        })?;
        debug!(%device, "tty configured for raw output");
    }

    Ok(file)
}

fn is_tty(fd: i32) -> bool {
    unsafe { libc::isatty(fd) == 1 }
}

fn configure_tty_raw(fd: i32) -> io::Result<()> {
    use std::mem::MaybeUninit;

    let mut termios = MaybeUninit::uninit();
    if unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);
    termios.c_oflag &= !libc::OPOST;
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8;

    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
