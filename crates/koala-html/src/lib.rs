//! HTML tokenizer and tree builder following the WHATWG HTML Living Standard.
//!
//! # Scope
//!
//! This crate implements:
//! - **Input stream** ([WHATWG § 13.2.3.5](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream))
//!   - CRLF and lone CR normalization, line/column/offset tracking
//!
//! - **HTML Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Every tokenizer state, including script data escapes
//!   - Named and numeric character references
//!   - CDATA sections and processing instructions as their own tokens
//!
//! - **HTML Parser / Tree Builder** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - All insertion modes, table and template handling
//!   - Adoption agency algorithm and foster parenting
//!   - SVG and MathML foreign content with name adjustments
//!   - Fragment parsing with a context element
//!
//! Parse errors never abort a parse. They are returned alongside the tree in
//! a [`ParseOutput`].
//!
//! # Example
//!
//! ```ignore
//! let output = koala_html::parse_document("<p>Hello<b>world</p>");
//! assert!(output.errors.is_empty() || output.tree.body().is_some());
//! ```

/// Parser options.
pub mod config;
/// Parse errors and the error sink.
pub mod error;
/// HTML parser and tree construction.
pub mod parser;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;

use koala_dom::DomTree;

pub use config::ParserConfig;
pub use error::{ContextParseError, ParseError};
pub use parser::{FragmentContext, HTMLParser, InsertionMode, print_tree, tree_to_string};
pub use tokenizer::{Attribute, HTMLTokenizer, Position, Token};

/// The result of a parse.
#[derive(Debug)]
pub struct ParseOutput {
    /// The constructed tree. Its root is a `Document`, or a
    /// `DocumentFragment` for fragment parses.
    pub tree: DomTree,
    /// Parse errors in the order they were diagnosed.
    pub errors: Vec<ParseError>,
    /// Errors diagnosed after the configured limit was reached.
    pub dropped_errors: usize,
}

/// Parse a complete HTML document.
#[must_use]
pub fn parse_document(input: &str) -> ParseOutput {
    HTMLParser::new(input).parse()
}

/// Parse a complete HTML document with `config`.
#[must_use]
pub fn parse_document_with_config(input: &str, config: ParserConfig) -> ParseOutput {
    HTMLParser::new(input).with_config(config).parse()
}

/// Parse `input` as the contents of the `context` element.
#[must_use]
pub fn parse_fragment(input: &str, context: &FragmentContext) -> ParseOutput {
    HTMLParser::new_fragment(input, context).parse()
}

/// Parse a fragment with `config`.
#[must_use]
pub fn parse_fragment_with_config(
    input: &str,
    context: &FragmentContext,
    config: ParserConfig,
) -> ParseOutput {
    HTMLParser::new_fragment(input, context)
        .with_config(config)
        .parse()
}
