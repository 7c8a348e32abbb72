//! [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
//!
//! The tree builder consumes tokens from the tokenizer and constructs a
//! [`koala_dom::DomTree`], one insertion mode at a time.

mod adoption;
mod core;
/// Tag and attribute name adjustments for SVG and MathML elements.
pub mod foreign_content;
mod fragment;
mod in_body;
mod in_foreign;
mod in_select;
mod in_table;
mod insertion;
mod modes;
/// Document mode selection from the DOCTYPE.
pub mod quirks;
mod stack;

pub use self::core::{
    ActiveFormattingElement, HTMLParser, InsertionMode, print_tree, tree_to_string,
};
pub use fragment::FragmentContext;
