//! # Layout
//!
//! Fixed-width text layout for template lines.
//!
//! - [`formatters`]: one formatter per alignment directive
//! - [`justify`]: `<J>` column alignment and proportional compression
//! - [`document`]: the orchestrator that builds a [`Document`] from lines

pub mod document;
pub mod formatters;
pub mod justify;

pub use document::{Document, FormatKind, LineFormatter, format};
pub use formatters::Fitted;
pub use justify::ColumnWidths;
