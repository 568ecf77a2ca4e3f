//! # Error Types
//!
//! This module defines the error taxonomy used throughout the tagprint library.
//!
//! Formatting-level errors are recoverable: the layout engine logs them and
//! degrades gracefully. Transport-level errors abort the current print job
//! and carry the device id (and the byte offset when the failure happened
//! mid-stream) so the caller can decide whether to retry.

use thiserror::Error;

/// Main error type for tagprint operations
#[derive(Debug, Error)]
pub enum TagprintError {
    /// Unknown or unparsable directive; the line falls back to Generic formatting
    #[error("Malformed directive on line {line}: {reason}")]
    MalformedDirective { line: usize, reason: String },

    /// Content does not fit the target width, even after justify compression
    #[error("Width overflow: {needed} columns needed, {width} available")]
    WidthOverflow { width: usize, needed: usize },

    /// Device or print queue could not be opened
    #[error("Transport unavailable ({device}): {reason}")]
    TransportUnavailable { device: String, reason: String },

    /// Write failed after the job started streaming
    #[error("Transport failed ({device}) at byte {offset}: {reason}")]
    TransportFailed {
        device: String,
        offset: usize,
        reason: String,
    },

    /// Caller-supplied deadline elapsed before the job finished
    #[error("Timed out writing to {device} at byte {offset}")]
    Timeout { device: String, offset: usize },

    /// The job was cancelled before any byte was emitted
    #[error("Print job for {device} cancelled before streaming")]
    Cancelled { device: String },

    /// Referenced bitmap or image file is absent or unreadable
    #[error("Asset missing: {path}")]
    AssetMissing { path: String },

    /// Barcode or QR payload could not be rendered by the symbology library
    #[error("Symbology error: {reason}")]
    Symbology { reason: String },

    /// Closing tag without a matching open element in lenient markup
    #[error("Unbalanced markup: unmatched </{tag}> ignored")]
    MarkupUnbalanced { tag: String },

    /// Invalid printer configuration
    #[error("Invalid config: {0}")]
    Config(String),

    /// Image processing error
    #[error("Image error: {0}")]
    Image(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TagprintError {
    /// Whether rendering can continue past this error.
    ///
    /// Formatting, asset and markup problems only degrade the output;
    /// transport, config and I/O problems abort the job.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TagprintError::MalformedDirective { .. }
                | TagprintError::WidthOverflow { .. }
                | TagprintError::AssetMissing { .. }
                | TagprintError::Image(_)
                | TagprintError::Symbology { .. }
                | TagprintError::MarkupUnbalanced { .. }
        )
    }

    /// Device identifier for transport-level errors.
    pub fn device(&self) -> Option<&str> {
        match self {
            TagprintError::TransportUnavailable { device, .. }
            | TagprintError::TransportFailed { device, .. }
            | TagprintError::Timeout { device, .. }
            | TagprintError::Cancelled { device } => Some(device),
            _ => None,
        }
    }
}

/// Result type for tagprint operations
pub type Result<T> = std::result::Result<T, TagprintError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_kinds() {
        assert!(TagprintError::WidthOverflow { width: 10, needed: 12 }.is_recoverable());
        assert!(TagprintError::AssetMissing { path: "logo.png".into() }.is_recoverable());
        assert!(TagprintError::Image("logo.png: bad header".into()).is_recoverable());
        assert!(TagprintError::MarkupUnbalanced { tag: "b".into() }.is_recoverable());
        assert!(
            !TagprintError::TransportUnavailable {
                device: "/dev/ttyUSB0".into(),
                reason: "busy".into()
            }
            .is_recoverable()
        );
    }

    #[test]
    fn test_transport_error_carries_offset() {
        let err = TagprintError::TransportFailed {
            device: "10.0.0.5:9100".into(),
            offset: 128,
            reason: "broken pipe".into(),
        };
        assert_eq!(err.device(), Some("10.0.0.5:9100"));
        assert!(err.to_string().contains("byte 128"));
    }
}
