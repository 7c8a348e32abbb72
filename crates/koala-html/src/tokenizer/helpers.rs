//! Helper functions for the HTML tokenizer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! This module contains utility functions used throughout the tokenizer:
//! - State transitions ("Switch to", "Reconsume in")
//! - Token emission ("Emit the current token")
//! - End tag helpers for RCDATA, RAWTEXT and script data
//! - Attribute helpers for duplicate detection
//! - Parse error recording

use super::core::{HTMLTokenizer, TokenizerState};
use super::token::Token;
use crate::error::TokenizerError;

// =============================================================================
// State Transition Helpers
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Switch to the X state"
    ///
    /// Transitions to a new state. The next character will be consumed on the
    /// next iteration of the main loop.
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Reconsume in the X state"
    ///
    /// Transitions to a new state without consuming the current character.
    /// The same character will be processed again in the new state.
    pub(super) const fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.reconsume = true;
        self.state = new_state;
    }

    /// "Switch to the return state" / "Reconsume in the return state".
    ///
    /// The return state is always set before a character reference state is
    /// entered; data is a safe fallback.
    pub(super) fn take_return_state(&mut self) -> TokenizerState {
        debug_assert!(self.return_state.is_some(), "return state was not set");
        self.return_state.take().unwrap_or(TokenizerState::Data)
    }

    /// Record where the markup that will become the next tag, comment or
    /// DOCTYPE token starts (the `<` just consumed).
    pub(super) const fn mark_token_start(&mut self) {
        self.token_start = self.input.position();
    }

    /// [§ 12.1.4 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
    ///
    /// "ASCII whitespace is U+0009 TAB, U+000A LF, U+000C FF, U+000D CR,
    /// or U+0020 SPACE."
    ///
    /// NOTE: HTML tokenizer uses a subset excluding CR (which is normalized earlier).
    pub(super) const fn is_whitespace_char(input_char: char) -> bool {
        matches!(input_char, ' ' | '\t' | '\n' | '\x0C')
    }
}

// =============================================================================
// Token Emission Helpers
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Emit the current token"
    ///
    /// "When a start tag token is emitted with its self-closing flag set, if
    /// the flag is not acknowledged when it is processed by the tree
    /// construction stage, that is a parse error."
    ///
    /// "When an end tag token is emitted with attributes, that is an
    /// end-tag-with-attributes parse error."
    ///
    /// "When an end tag token is emitted with its self-closing flag set, that
    /// is an end-tag-with-trailing-solidus parse error."
    pub(super) fn emit_token(&mut self) {
        let Some(token) = self.current_token.take() else {
            return;
        };
        match &token {
            Token::StartTag { name, .. } => {
                self.last_start_tag_name = Some(name.clone());
            }
            Token::EndTag {
                attributes,
                self_closing,
                ..
            } => {
                if !attributes.is_empty() {
                    self.parse_error(TokenizerError::EndTagWithAttributes);
                }
                if *self_closing {
                    self.parse_error(TokenizerError::EndTagWithTrailingSolidus);
                }
            }
            _ => {}
        }
        self.pending.push_back((token, self.token_start));
    }

    /// "Emit the current input character as a character token."
    ///
    /// Emits a character token directly without going through `current_token`.
    pub(super) fn emit_character_token(&mut self, c: char) {
        self.pending
            .push_back((Token::new_character(c), self.input.position()));
    }

    /// "Emit an end-of-file token."
    pub(super) fn emit_eof_token(&mut self) {
        self.pending
            .push_back((Token::EndOfFile, self.input.position()));
        self.at_eof = true;
    }
}

// =============================================================================
// End Tag Helpers
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "An appropriate end tag token is an end tag token whose tag name matches
    /// the tag name of the last start tag to have been emitted from this
    /// tokenizer, if any. If no start tag has been emitted from this
    /// tokenizer, then no end tag token is appropriate."
    pub(super) fn is_appropriate_end_tag_token(&self) -> bool {
        if let (Some(last_start_tag), Some(Token::EndTag { name, .. })) =
            (&self.last_start_tag_name, &self.current_token)
        {
            return name == last_start_tag;
        }
        false
    }

    /// "Anything else" entry of the RCDATA, RAWTEXT, script data and script
    /// data escaped end tag name states:
    ///
    /// "Emit a U+003C LESS-THAN SIGN character token, a U+002F SOLIDUS character
    /// token, and a character token for each of the characters in the temporary
    /// buffer (in the order they were added to the buffer). Reconsume in the
    /// X state."
    pub(super) fn emit_end_tag_name_anything_else(&mut self, text_state: TokenizerState) {
        // STEP 1: "Emit a U+003C LESS-THAN SIGN character token"
        self.emit_character_token('<');
        // STEP 2: "Emit a U+002F SOLIDUS character token"
        self.emit_character_token('/');
        // STEP 3: "Emit a character token for each of the characters in the temporary buffer"
        self.emit_temporary_buffer();
        // STEP 4: Discard the current end tag token
        self.current_token = None;
        // STEP 5: "Reconsume in the X state"
        self.reconsume_in(text_state);
    }

    /// "Emit ... a character token for each of the characters in the temporary buffer"
    pub(super) fn emit_temporary_buffer(&mut self) {
        let buffer = std::mem::take(&mut self.temporary_buffer);
        for c in buffer.chars() {
            self.emit_character_token(c);
        }
        self.temporary_buffer = buffer;
    }

    /// Shared body of the end tag name states. Returns `true` when the
    /// character was handled; `false` means "anything else".
    pub(super) fn handle_end_tag_name_character(&mut self, c: Option<char>) -> bool {
        match c {
            // "U+0009 CHARACTER TABULATION (tab)"
            // "U+000A LINE FEED (LF)"
            // "U+000C FORM FEED (FF)"
            // "U+0020 SPACE"
            // "If the current end tag token is an appropriate end tag token, then switch to the
            // before attribute name state. Otherwise, treat it as per the "anything else" entry below."
            Some(c) if Self::is_whitespace_char(c) && self.is_appropriate_end_tag_token() => {
                self.switch_to(TokenizerState::BeforeAttributeName);
                true
            }
            // "U+002F SOLIDUS (/)"
            // "If the current end tag token is an appropriate end tag token, then switch to the
            // self-closing start tag state."
            Some('/') if self.is_appropriate_end_tag_token() => {
                self.switch_to(TokenizerState::SelfClosingStartTag);
                true
            }
            // "U+003E GREATER-THAN SIGN (>)"
            // "If the current end tag token is an appropriate end tag token, then switch to the
            // data state and emit the current tag token."
            Some('>') if self.is_appropriate_end_tag_token() => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
                true
            }
            // "ASCII upper alpha"
            // "Append the lowercase version of the current input character (add 0x0020 to the
            // character's code point) to the current tag token's tag name. Append the current
            // input character to the temporary buffer."
            // "ASCII lower alpha"
            // "Append the current input character to the current tag token's tag name. Append
            // the current input character to the temporary buffer."
            Some(c) if c.is_ascii_alphabetic() => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_tag_name(c.to_ascii_lowercase());
                }
                self.temporary_buffer.push(c);
                true
            }
            _ => false,
        }
    }
}

// =============================================================================
// Attribute Helpers
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    ///
    /// "When the user agent leaves the attribute name state (and before emitting
    /// the tag token, if appropriate), the complete attribute's name must be
    /// compared to the other attributes on the same token; if there is already
    /// an attribute on the token with the exact same name, then this is a
    /// duplicate-attribute parse error and the new attribute must be removed
    /// from the token."
    ///
    /// The attribute is only removed once its value is complete, so the value
    /// characters still have somewhere to go; `duplicate_attribute` remembers
    /// the verdict until then.
    pub(super) fn check_duplicate_attribute(&mut self) {
        let is_duplicate = self
            .current_token
            .as_ref()
            .is_some_and(Token::current_attribute_name_is_duplicate);

        if is_duplicate {
            self.parse_error(TokenizerError::DuplicateAttribute);
            self.duplicate_attribute = true;
        }
    }

    /// Drop the current attribute if it was found to be a duplicate.
    pub(super) fn finish_attribute(&mut self) {
        if std::mem::take(&mut self.duplicate_attribute) {
            if let Some(ref mut token) = self.current_token {
                token.remove_current_attribute();
            }
        }
    }

    /// "Start a new attribute in the current tag token."
    pub(super) fn start_new_attribute(&mut self) {
        self.finish_attribute();
        if let Some(ref mut token) = self.current_token {
            token.start_new_attribute();
        }
    }

    /// Finish the last attribute, then emit the tag.
    pub(super) fn emit_tag_token(&mut self) {
        self.finish_attribute();
        self.emit_token();
    }
}

// =============================================================================
// Error Handling
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    ///
    /// Records a parse error at the current input character. Parse errors in
    /// HTML are not fatal: the prescribed recovery follows at the call site.
    pub(super) fn parse_error(&mut self, error: TokenizerError) {
        let code: &'static str = error.into();
        self.errors
            .push("HTML Tokenizer", code, self.input.position());
    }
}
