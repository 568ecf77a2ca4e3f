//! # Intermediate Representation (IR)
//!
//! The IR sits between the formatted document and raw ESC/POS bytes.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐     ┌─────────────┐     ┌────────────────┐     ┌──────────┐
//! │ Document │ ──► │   Planner   │ ──► │  CommandPlan   │ ──► │ Encoder  │
//! │ (lines)  │     │ (assets,cp) │     │(DeviceCommand) │     │ (bytes)  │
//! └──────────┘     └─────────────┘     └────────────────┘     └──────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use tagprint::ir::{CommandPlan, DeviceCommand, FsAssets, Planner};
//! use tagprint::layout::Document;
//! use tagprint::protocol::codepage::Codepage;
//!
//! let doc = Document::build(&["<C>HELLO", "<CUT>"], 20);
//! let assets = FsAssets::new(".");
//! let plan = Planner::new(Codepage::Cp437, 576, &assets).plan(&doc);
//!
//! // Inspect the IR
//! assert_eq!(plan.commands[0], DeviceCommand::Init);
//!
//! let bytes = plan.to_bytes();
//! assert!(bytes.ends_with(&[0x1D, 0x56, 0x42, 0x00]));
//! ```

mod codegen;
mod ops;
mod plan;

pub use codegen::{EncodedJob, Encoder, Segment, encode_text};
pub use ops::{CommandPlan, DeviceCommand};
pub use plan::{AssetLoader, DEFAULT_BEEP_COUNT, DEFAULT_BEEP_DURATION, FsAssets, Planner};
