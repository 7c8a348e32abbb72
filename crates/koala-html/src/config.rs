//! Parser configuration.

/// Options for a single parse.
///
/// ```ignore
/// let config = ParserConfig::default().with_log_errors(true).with_max_errors(100);
/// let output = koala_html::parse_document_with_config(html, config);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParserConfig {
    /// Echo every parse error to stderr through `koala_common::warning`.
    pub log_errors: bool,
    /// Store at most this many errors; later ones are only counted.
    pub max_errors: Option<usize>,
}

impl ParserConfig {
    /// [§ 13.2.1 Overview of the parsing model](https://html.spec.whatwg.org/multipage/parsing.html#overview-of-the-parsing-model)
    ///
    /// "The scripting flag is set to "enabled" if scripting was enabled for the
    /// Document with which the parser is associated when the parser was
    /// created, and "disabled" otherwise."
    ///
    /// This parser never executes scripts, so the flag is always disabled.
    pub const SCRIPTING: bool = false;

    /// Enable or disable echoing parse errors.
    #[must_use]
    pub const fn with_log_errors(mut self, log_errors: bool) -> Self {
        self.log_errors = log_errors;
        self
    }

    /// Cap the number of stored errors.
    #[must_use]
    pub const fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = Some(max_errors);
        self
    }
}
