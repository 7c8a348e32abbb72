//! HTML tokenizer module.
//!
//! Implements [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//! of the WHATWG HTML Living Standard.

/// Character reference parsing per § 13.2.5.72.
pub mod character_reference;
/// HTML tokenizer state machine implementation.
pub mod core;
/// Helper methods for tokenizer state transitions.
pub mod helpers;
/// Input stream with newline normalization and position tracking.
pub mod input;
/// Markup declarations: comments, DOCTYPE, CDATA and processing instructions.
pub mod markup;
/// Named character reference lookup table per § 13.5.
pub mod named_character_references;
/// Script data escaped and double-escaped states.
pub mod script;
/// Token types produced by the tokenizer.
pub mod token;

pub use self::core::{HTMLTokenizer, TokenizerState};
pub use input::{InputCursor, Position};
pub use token::{Attribute, Token};
