//! # ESC/POS Protocol
//!
//! Low-level command builders for ESC/POS receipt printers. Every function
//! returns the exact bytes of one command; nothing here keeps state.
//!
//! ## Module Structure
//!
//! - [`commands`]: init, feed, cut, buzzer, drawer kick
//! - [`text`]: alignment, emphasis, character size, code tables
//! - [`graphics`]: 24-dot bit image bands
//! - [`codepage`]: Unicode → device codepage bytes
//! - [`cp437`]: the built-in CP437 table
//!
//! ## Usage Example
//!
//! ```
//! use tagprint::protocol::{commands, text};
//!
//! let mut data = Vec::new();
//! data.extend(commands::init());
//! data.extend(text::align(text::Alignment::Center));
//! data.extend(text::bold_on());
//! data.extend(b"RECEIPT\n");
//! data.extend(text::bold_off());
//! data.extend(commands::cut(0));
//! ```

pub mod codepage;
pub mod commands;
pub mod cp437;
pub mod graphics;
pub mod text;
