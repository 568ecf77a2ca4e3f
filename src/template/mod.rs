//! # Template Lines
//!
//! A template is an ordered list of text lines. Each line may start with a
//! directive (`<L>`, `<J:1.2>`, `<CUT>`, ...) that selects how the rest of
//! the line is formatted or which device command it stands for.

pub mod tag;

pub use tag::{Extracted, FormatTag, TagKind, extract};
