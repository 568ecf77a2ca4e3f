//! # Lenient Markup
//!
//! HTML for the rich-text sinks: tagged lines are converted to loose HTML,
//! then tokenized and repaired into a well-formed tree.
//!
//! - [`tokenizer`]: content / tag-name / attribute state machine
//! - [`repair`]: two-stack tree builder
//! - [`html`]: formatted document → HTML

pub mod html;
pub mod repair;
pub mod tokenizer;

pub use html::{document_to_html, to_repaired};
pub use repair::{Element, Node, RepairedMarkup, repair};
pub use tokenizer::{Token, Tokenizer, tokenize};
