//! Raw TCP transport. Most receipt printers accept ESC/POS on port 9100.

use std::time::Duration;

use tokio::net::TcpStream;
use tracing::{info, instrument, warn};

use crate::error::{Result, TagprintError};

/// Raw printing port.
pub const DEFAULT_PORT: u16 = 9100;

/// Split `host[:port]` (or `[v6]:port`), defaulting the port to 9100.
pub fn parse_address(address: &str) -> Result<(String, u16)> {
    let address = address.trim();
    if address.is_empty() {
        return Err(TagprintError::Config("empty network address".to_string()));
    }

    if let Some(rest) = address.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .ok_or_else(|| TagprintError::Config(format!("invalid address: {}", address)))?;
        let port = match tail.strip_prefix(':') {
            Some(port) => parse_port(address, port)?,
            None if tail.is_empty() => DEFAULT_PORT,
            None => return Err(TagprintError::Config(format!("invalid address: {}", address))),
        };
        return Ok((host.to_string(), port));
    }

    match address.rsplit_once(':') {
        // Bare IPv6 without brackets
        Some((host, _)) if host.contains(':') => Ok((address.to_string(), DEFAULT_PORT)),
        Some((host, port)) => Ok((host.to_string(), parse_port(address, port)?)),
        None => Ok((address.to_string(), DEFAULT_PORT)),
    }
}

fn parse_port(address: &str, port: &str) -> Result<u16> {
    port.parse()
        .map_err(|_| TagprintError::Config(format!("invalid port in address: {}", address)))
}

/// Connect to a printer.
#[instrument]
pub async fn connect(address: &str) -> Result<TcpStream> {
    let (host, port) = parse_address(address)?;
    let stream = TcpStream::connect((host.as_str(), port))
        .await
        .map_err(|e| TagprintError::TransportUnavailable {
            device: address.to_string(),
            reason: e.to_string(),
        })?;
    stream.set_nodelay(true).ok();
    info!("connected");
    Ok(stream)
}

/// Whether a printer accepts connections within `timeout`.
#[instrument]
pub async fn is_online(address: &str, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, connect(address)).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            warn!(error = %e, "printer offline");
            false
        }
        Err(_) => {
            warn!("printer check timed out");
            false
        }
    }
}
