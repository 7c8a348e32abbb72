//! Parse errors and the error sink.
//!
//! [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
//!
//! "This specification defines the parsing rules for HTML documents, whether
//! they are syntactically correct or not. Certain points in the parsing
//! algorithm are said to be parse errors. The error handling for parse errors
//! is well-defined."
//!
//! Parse errors never stop the parser. They are collected, in the order they
//! were diagnosed, into an [`ErrorSink`] and handed back with the tree.

use std::fmt;

use koala_common::warning::warn_once;
use serde::Serialize;
use strum_macros::{Display, IntoStaticStr};
use thiserror::Error;

use crate::tokenizer::Position;

/// A diagnosed parse error with its source position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseError {
    /// Error code (tokenizer) or description (tree construction).
    pub message: String,
    /// 1-based line of the offending input.
    pub line: usize,
    /// 1-based column of the offending input.
    pub column: usize,
    /// Byte offset of the offending input.
    pub offset: usize,
}

impl ParseError {
    /// Create an error at `position`.
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            line: position.line,
            column: position.column,
            offset: position.offset,
        }
    }

    /// The source position of the error.
    #[must_use]
    pub const fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
            offset: self.offset,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

/// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
///
/// The tokenizer-level parse errors, named by their WHATWG error codes.
/// `Display` yields the code, e.g. `unexpected-null-character`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
#[allow(missing_docs)]
pub enum TokenizerError {
    AbruptClosingOfEmptyComment,
    AbruptDoctypePublicIdentifier,
    AbruptDoctypeSystemIdentifier,
    AbsenceOfDigitsInNumericCharacterReference,
    CdataInHtmlContent,
    CharacterReferenceOutsideUnicodeRange,
    ControlCharacterInInputStream,
    ControlCharacterReference,
    DuplicateAttribute,
    EndTagWithAttributes,
    EndTagWithTrailingSolidus,
    EofBeforeTagName,
    EofInCdata,
    EofInComment,
    EofInDoctype,
    EofInProcessingInstruction,
    EofInScriptHtmlCommentLikeText,
    EofInTag,
    IncorrectlyClosedComment,
    IncorrectlyOpenedComment,
    InvalidCharacterSequenceAfterDoctypeName,
    InvalidFirstCharacterOfTagName,
    MissingAttributeValue,
    MissingDoctypeName,
    MissingDoctypePublicIdentifier,
    MissingDoctypeSystemIdentifier,
    MissingEndTagName,
    MissingQuoteBeforeDoctypePublicIdentifier,
    MissingQuoteBeforeDoctypeSystemIdentifier,
    MissingSemicolonAfterCharacterReference,
    MissingWhitespaceAfterDoctypePublicKeyword,
    MissingWhitespaceAfterDoctypeSystemKeyword,
    MissingWhitespaceBeforeDoctypeName,
    MissingWhitespaceBetweenAttributes,
    MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers,
    NestedComment,
    NoncharacterCharacterReference,
    NoncharacterInInputStream,
    NullCharacterReference,
    SurrogateCharacterReference,
    UnexpectedCharacterAfterDoctypeSystemIdentifier,
    UnexpectedCharacterInAttributeName,
    UnexpectedCharacterInUnquotedAttributeValue,
    UnexpectedEqualsSignBeforeAttributeName,
    UnexpectedNullCharacter,
    UnexpectedQuestionMarkInsteadOfTagName,
    UnexpectedSolidusInTag,
    UnknownNamedCharacterReference,
}

/// Append-only, ordered log of parse errors.
///
/// An optional limit caps how many errors are stored; errors past the limit
/// are counted but dropped. When `echo` is set every stored error is also
/// printed once through [`warn_once`].
#[derive(Debug, Clone, Default)]
pub struct ErrorSink {
    errors: Vec<ParseError>,
    limit: Option<usize>,
    dropped: usize,
    echo: bool,
}

impl ErrorSink {
    /// An unbounded, silent sink.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            errors: Vec::new(),
            limit: None,
            dropped: 0,
            echo: false,
        }
    }

    /// A sink with the given storage limit and echo setting.
    #[must_use]
    pub const fn with_options(limit: Option<usize>, echo: bool) -> Self {
        Self {
            errors: Vec::new(),
            limit,
            dropped: 0,
            echo,
        }
    }

    /// Turn echoing through [`warn_once`] on or off.
    pub const fn set_echo(&mut self, echo: bool) {
        self.echo = echo;
    }

    /// Whether stored errors are echoed.
    #[must_use]
    pub const fn echoes(&self) -> bool {
        self.echo
    }

    /// Record an error diagnosed by `component` at `position`.
    pub fn push(&mut self, component: &str, message: impl Into<String>, position: Position) {
        let error = ParseError::new(message, position);
        if self.echo {
            let _ = warn_once(component, &error.to_string());
        }
        self.store(error);
    }

    /// Move already-reported errors (from the tokenizer's sink) into this one.
    pub fn absorb(&mut self, errors: impl IntoIterator<Item = ParseError>) {
        for error in errors {
            self.store(error);
        }
    }

    fn store(&mut self, error: ParseError) {
        if self.limit.is_some_and(|limit| self.errors.len() >= limit) {
            self.dropped += 1;
        } else {
            self.errors.push(error);
        }
    }

    /// Take every stored error, leaving the sink empty.
    pub fn take(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.errors)
    }

    /// The stored errors, in diagnosis order.
    #[must_use]
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// How many errors were diagnosed past the limit.
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.dropped
    }

    /// Consume the sink, returning the stored errors.
    #[must_use]
    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }
}

/// Errors from parsing a fragment context such as `"svg:g"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextParseError {
    /// The element name (after any prefix) was empty.
    #[error("fragment context element name is empty")]
    EmptyName,
    /// The prefix was not one of `html`, `svg` or `math`.
    #[error("unknown namespace prefix `{0}` in fragment context (expected `html`, `svg` or `math`)")]
    UnknownNamespace(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenizer_error_codes_are_kebab_case() {
        assert_eq!(
            TokenizerError::UnexpectedNullCharacter.to_string(),
            "unexpected-null-character"
        );
        assert_eq!(TokenizerError::EofInCdata.to_string(), "eof-in-cdata");
        let code: &'static str = TokenizerError::CdataInHtmlContent.into();
        assert_eq!(code, "cdata-in-html-content");
    }

    #[test]
    fn test_sink_limit_counts_dropped_errors() {
        let mut sink = ErrorSink::with_options(Some(2), false);
        for i in 0..5 {
            sink.push("Test", format!("error {i}"), Position::START);
        }
        assert_eq!(sink.errors().len(), 2);
        assert_eq!(sink.errors()[1].message, "error 1");
        assert_eq!(sink.dropped(), 3);
    }

    #[test]
    fn test_parse_error_display() {
        let error = ParseError::new(
            "eof-in-tag",
            Position {
                line: 3,
                column: 7,
                offset: 20,
            },
        );
        assert_eq!(error.to_string(), "3:7: eof-in-tag");
        assert_eq!(error.position().offset, 20);
    }
}
