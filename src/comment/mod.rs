//! Documentation comment parsing.
//!
//! - `lines` strips continuation markers and keeps raw offsets
//! - `inline` turns comment text into markup nodes
//! - `block` splits a comment into its body and block tags

pub mod block;
pub mod inline;
pub mod lines;

pub use block::{extract, Extracted};
pub use inline::{parse_inline, reconstruct, InlineParse, Spanned};
