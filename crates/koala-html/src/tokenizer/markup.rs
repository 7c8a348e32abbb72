//! Markup declarations: comments, DOCTYPEs, CDATA sections and processing
//! instructions.

use super::core::{HTMLTokenizer, TokenizerState};
use super::token::Token;
use crate::error::TokenizerError;

// =============================================================================
// Markup Declaration & Comments
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    ///
    /// Runs without consuming a character; the cursor sits just after `<!`.
    pub(super) fn handle_markup_declaration_open_state(&mut self) {
        // "If the next two characters are both U+002D HYPHEN-MINUS characters (-),
        // consume those two characters, create a comment token whose data is the empty
        // string, and switch to the comment start state."
        if self.input.next_chars_are("--") {
            self.input.skip(2);
            self.current_token = Some(Token::new_comment());
            self.switch_to(TokenizerState::CommentStart);
        }
        // "Otherwise, if the next seven characters are an ASCII case-insensitive
        // match for the word 'DOCTYPE', consume those characters and switch to the
        // DOCTYPE state."
        else if self.input.next_chars_are_ignore_ascii_case("DOCTYPE") {
            self.input.skip(7);
            self.switch_to(TokenizerState::DOCTYPE);
        }
        // "Otherwise, if the next seven characters are a case-sensitive match for
        // the string "[CDATA[" (the five uppercase letters "CDATA" with a U+005B
        // LEFT SQUARE BRACKET character before and after), then consume those
        // characters. If there is an adjusted current node and it is not an
        // element in the HTML namespace, then switch to the CDATA section state.
        // Otherwise, this is a cdata-in-html-content parse error. Create a
        // comment token whose data is the "[CDATA[" string. Switch to the bogus
        // comment state."
        else if self.input.next_chars_are("[CDATA[") {
            self.input.skip(7);
            if self.cdata_allowed {
                self.current_token = Some(Token::new_cdata());
                self.switch_to(TokenizerState::CDATASection);
            } else {
                self.parse_error(TokenizerError::CdataInHtmlContent);
                let mut comment = Token::new_comment();
                "[CDATA[".chars().for_each(|c| comment.append_to_comment(c));
                self.current_token = Some(comment);
                self.switch_to(TokenizerState::BogusComment);
            }
        }
        // "Otherwise, this is an incorrectly-opened-comment parse error. Create a
        // comment token whose data is the empty string. Switch to the bogus comment state
        // (don't consume anything in the current state)."
        else {
            self.parse_error(TokenizerError::IncorrectlyOpenedComment);
            self.current_token = Some(Token::new_comment());
            self.switch_to(TokenizerState::BogusComment);
        }
    }

    fn append_to_comment(&mut self, s: &str) {
        if let Some(ref mut token) = self.current_token {
            s.chars().for_each(|c| token.append_to_comment(c));
        }
    }

    /// "EOF: This is an eof-in-comment parse error. Emit the current comment
    /// token. Emit an end-of-file token."
    fn eof_in_comment(&mut self) {
        self.parse_error(TokenizerError::EofInComment);
        self.emit_token();
        self.emit_eof_token();
    }

    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    pub(super) fn handle_bogus_comment_state(&mut self) {
        match self.current_input_character {
            // "U+003E GREATER-THAN SIGN (>) - Switch to the data state. Emit the current
            // comment token."
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "EOF - Emit the comment. Emit an end-of-file token."
            None => {
                self.emit_token();
                self.emit_eof_token();
            }
            // "U+0000 NULL - This is an unexpected-null-character parse error. Append a
            // U+FFFD REPLACEMENT CHARACTER character to the comment token's data."
            Some('\0') => {
                self.parse_error(TokenizerError::UnexpectedNullCharacter);
                self.append_to_comment("\u{FFFD}");
            }
            // "Anything else - Append the current input character to the comment token's data."
            Some(c) => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_comment(c);
                }
            }
        }
    }

    /// [§ 13.2.5.43 Comment start state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state)
    pub(super) fn handle_comment_start_state(&mut self) {
        match self.current_input_character {
            // "U+002D HYPHEN-MINUS (-) - Switch to the comment start dash state."
            Some('-') => self.switch_to(TokenizerState::CommentStartDash),
            // "U+003E GREATER-THAN SIGN (>) - This is an abrupt-closing-of-empty-comment
            // parse error. Switch to the data state. Emit the current comment token."
            Some('>') => {
                self.parse_error(TokenizerError::AbruptClosingOfEmptyComment);
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "Anything else - Reconsume in the comment state."
            _ => self.reconsume_in(TokenizerState::Comment),
        }
    }

    /// [§ 13.2.5.44 Comment start dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-dash-state)
    pub(super) fn handle_comment_start_dash_state(&mut self) {
        match self.current_input_character {
            // "U+002D HYPHEN-MINUS (-) - Switch to the comment end state."
            Some('-') => self.switch_to(TokenizerState::CommentEnd),
            // "U+003E GREATER-THAN SIGN (>) - This is an abrupt-closing-of-empty-comment
            // parse error. Switch to the data state. Emit the current comment token."
            Some('>') => {
                self.parse_error(TokenizerError::AbruptClosingOfEmptyComment);
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => self.eof_in_comment(),
            // "Anything else - Append a U+002D HYPHEN-MINUS character (-) to the comment
            // token's data. Reconsume in the comment state."
            Some(_) => {
                self.append_to_comment("-");
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.45 Comment state](https://html.spec.whatwg.org/multipage/parsing.html#comment-state)
    pub(super) fn handle_comment_state(&mut self) {
        match self.current_input_character {
            // "U+003C LESS-THAN SIGN (<) - Append the current input character to the
            // comment token's data. Switch to the comment less-than sign state."
            Some('<') => {
                self.append_to_comment("<");
                self.switch_to(TokenizerState::CommentLessThanSign);
            }
            // "U+002D HYPHEN-MINUS (-) - Switch to the comment end dash state."
            Some('-') => self.switch_to(TokenizerState::CommentEndDash),
            // "U+0000 NULL - This is an unexpected-null-character parse error. Append a
            // U+FFFD REPLACEMENT CHARACTER character to the comment token's data."
            Some('\0') => {
                self.parse_error(TokenizerError::UnexpectedNullCharacter);
                self.append_to_comment("\u{FFFD}");
            }
            None => self.eof_in_comment(),
            // "Anything else - Append the current input character to the comment token's data."
            Some(c) => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_comment(c);
                }
            }
        }
    }

    /// [§ 13.2.5.46 Comment less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-state)
    pub(super) fn handle_comment_less_than_sign_state(&mut self) {
        match self.current_input_character {
            // "U+0021 EXCLAMATION MARK (!) - Append the current input character to the
            // comment token's data. Switch to the comment less-than sign bang state."
            Some('!') => {
                self.append_to_comment("!");
                self.switch_to(TokenizerState::CommentLessThanSignBang);
            }
            // "U+003C LESS-THAN SIGN (<) - Append the current input character to the
            // comment token's data."
            Some('<') => self.append_to_comment("<"),
            _ => self.reconsume_in(TokenizerState::Comment),
        }
    }

    /// [§ 13.2.5.47 Comment less-than sign bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-state)
    pub(super) fn handle_comment_less_than_sign_bang_state(&mut self) {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::CommentLessThanSignBangDash),
            _ => self.reconsume_in(TokenizerState::Comment),
        }
    }

    /// [§ 13.2.5.48 Comment less-than sign bang dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-state)
    pub(super) fn handle_comment_less_than_sign_bang_dash_state(&mut self) {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::CommentLessThanSignBangDashDash),
            _ => self.reconsume_in(TokenizerState::CommentEndDash),
        }
    }

    /// [§ 13.2.5.49 Comment less-than sign bang dash dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-dash-state)
    pub(super) fn handle_comment_less_than_sign_bang_dash_dash_state(&mut self) {
        match self.current_input_character {
            // "U+003E GREATER-THAN SIGN (>), EOF - Reconsume in the comment end state."
            Some('>') | None => self.reconsume_in(TokenizerState::CommentEnd),
            // "Anything else - This is a nested-comment parse error. Reconsume in the
            // comment end state."
            Some(_) => {
                self.parse_error(TokenizerError::NestedComment);
                self.reconsume_in(TokenizerState::CommentEnd);
            }
        }
    }

    /// [§ 13.2.5.50 Comment end dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-dash-state)
    pub(super) fn handle_comment_end_dash_state(&mut self) {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::CommentEnd),
            None => self.eof_in_comment(),
            Some(_) => {
                self.append_to_comment("-");
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.51 Comment end state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-state)
    pub(super) fn handle_comment_end_state(&mut self) {
        match self.current_input_character {
            // "U+003E GREATER-THAN SIGN (>) - Switch to the data state. Emit the current comment token."
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "U+0021 EXCLAMATION MARK (!) - Switch to the comment end bang state."
            Some('!') => self.switch_to(TokenizerState::CommentEndBang),
            // "U+002D HYPHEN-MINUS (-) - Append a U+002D HYPHEN-MINUS character (-) to the
            // comment token's data."
            Some('-') => self.append_to_comment("-"),
            None => self.eof_in_comment(),
            // "Anything else - Append two U+002D HYPHEN-MINUS characters (-) to the comment
            // token's data. Reconsume in the comment state."
            Some(_) => {
                self.append_to_comment("--");
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.52 Comment end bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-bang-state)
    pub(super) fn handle_comment_end_bang_state(&mut self) {
        match self.current_input_character {
            // "U+002D HYPHEN-MINUS (-) - Append two U+002D HYPHEN-MINUS characters (-) and a
            // U+0021 EXCLAMATION MARK character (!) to the comment token's data. Switch to the
            // comment end dash state."
            Some('-') => {
                self.append_to_comment("--!");
                self.switch_to(TokenizerState::CommentEndDash);
            }
            // "U+003E GREATER-THAN SIGN (>) - This is an incorrectly-closed-comment parse
            // error. Switch to the data state. Emit the current comment token."
            Some('>') => {
                self.parse_error(TokenizerError::IncorrectlyClosedComment);
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => self.eof_in_comment(),
            Some(_) => {
                self.append_to_comment("--!");
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }
}

// =============================================================================
// DOCTYPE
// =============================================================================

impl HTMLTokenizer {
    fn set_force_quirks(&mut self) {
        if let Some(ref mut token) = self.current_token {
            token.set_force_quirks();
        }
    }

    /// "EOF: This is an eof-in-doctype parse error. Set the current DOCTYPE
    /// token's force-quirks flag to on. Emit the current DOCTYPE token. Emit
    /// an end-of-file token."
    fn eof_in_doctype(&mut self) {
        self.parse_error(TokenizerError::EofInDoctype);
        if self.current_token.is_none() {
            self.current_token = Some(Token::new_doctype());
        }
        self.set_force_quirks();
        self.emit_token();
        self.emit_eof_token();
    }

    /// [§ 13.2.5.53 DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state)
    pub(super) fn handle_doctype_state(&mut self) {
        match self.current_input_character {
            // "U+0009 CHARACTER TABULATION, U+000A LINE FEED, U+000C FORM FEED,
            // U+0020 SPACE - Switch to the before DOCTYPE name state."
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeDOCTYPEName);
            }
            // "U+003E GREATER-THAN SIGN (>) - Reconsume in the before DOCTYPE name state."
            Some('>') => self.reconsume_in(TokenizerState::BeforeDOCTYPEName),
            // "EOF - This is an eof-in-doctype parse error. Create a new DOCTYPE token.
            // Set its force-quirks flag to on. Emit the current token. Emit an end-of-file token."
            None => self.eof_in_doctype(),
            // "Anything else - This is a missing-whitespace-before-doctype-name parse error.
            // Reconsume in the before DOCTYPE name state."
            Some(_) => {
                self.parse_error(TokenizerError::MissingWhitespaceBeforeDoctypeName);
                self.reconsume_in(TokenizerState::BeforeDOCTYPEName);
            }
        }
    }

    /// [§ 13.2.5.54 Before DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-name-state)
    pub(super) fn handle_before_doctype_name_state(&mut self) {
        match self.current_input_character {
            // "U+0009 CHARACTER TABULATION, U+000A LINE FEED, U+000C FORM FEED,
            // U+0020 SPACE - Ignore the character."
            Some(c) if Self::is_whitespace_char(c) => {}
            // "U+0000 NULL - This is an unexpected-null-character parse error. Create a new
            // DOCTYPE token. Set the token's name to a U+FFFD REPLACEMENT CHARACTER. Switch to
            // the DOCTYPE name state."
            Some('\0') => {
                self.parse_error(TokenizerError::UnexpectedNullCharacter);
                let mut token = Token::new_doctype();
                token.append_to_doctype_name('\u{FFFD}');
                self.current_token = Some(token);
                self.switch_to(TokenizerState::DOCTYPEName);
            }
            // "U+003E GREATER-THAN SIGN (>) - This is a missing-doctype-name parse error.
            // Create a new DOCTYPE token. Set its force-quirks flag to on. Switch to the data state.
            // Emit the current token."
            Some('>') => {
                self.parse_error(TokenizerError::MissingDoctypeName);
                let mut token = Token::new_doctype();
                token.set_force_quirks();
                self.current_token = Some(token);
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => self.eof_in_doctype(),
            // "ASCII upper alpha - Create a new DOCTYPE token. Set the token's name to
            // the lowercase version of the current input character. Switch to the DOCTYPE name state."
            // "Anything else - Create a new DOCTYPE token. Set the token's name to the
            // current input character. Switch to the DOCTYPE name state."
            Some(c) => {
                let mut token = Token::new_doctype();
                token.append_to_doctype_name(c.to_ascii_lowercase());
                self.current_token = Some(token);
                self.switch_to(TokenizerState::DOCTYPEName);
            }
        }
    }

    /// [§ 13.2.5.55 DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-name-state)
    pub(super) fn handle_doctype_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::AfterDOCTYPEName);
            }
            // "U+003E GREATER-THAN SIGN (>) - Switch to the data state. Emit the current token."
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "U+0000 NULL - This is an unexpected-null-character parse error. Append a
            // U+FFFD REPLACEMENT CHARACTER to the current DOCTYPE token's name."
            Some('\0') => {
                self.parse_error(TokenizerError::UnexpectedNullCharacter);
                if let Some(ref mut token) = self.current_token {
                    token.append_to_doctype_name('\u{FFFD}');
                }
            }
            None => self.eof_in_doctype(),
            Some(c) => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_doctype_name(c.to_ascii_lowercase());
                }
            }
        }
    }

    /// [§ 13.2.5.56 After DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-name-state)
    pub(super) fn handle_after_doctype_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => self.eof_in_doctype(),
            // "If the six characters starting from the current input character are an
            // ASCII case-insensitive match for the word "PUBLIC", then consume those
            // characters and switch to the after DOCTYPE public keyword state."
            Some(c)
                if c.eq_ignore_ascii_case(&'p')
                    && self.input.next_chars_are_ignore_ascii_case("UBLIC") =>
            {
                self.input.skip(5);
                self.switch_to(TokenizerState::AfterDOCTYPEPublicKeyword);
            }
            // "Otherwise, if the six characters starting from the current input
            // character are an ASCII case-insensitive match for the word "SYSTEM",
            // then consume those characters and switch to the after DOCTYPE system
            // keyword state."
            Some(c)
                if c.eq_ignore_ascii_case(&'s')
                    && self.input.next_chars_are_ignore_ascii_case("YSTEM") =>
            {
                self.input.skip(5);
                self.switch_to(TokenizerState::AfterDOCTYPESystemKeyword);
            }
            // "Otherwise, this is an invalid-character-sequence-after-doctype-name
            // parse error. Set the current DOCTYPE token's force-quirks flag to on.
            // Reconsume in the bogus DOCTYPE state."
            Some(_) => {
                self.parse_error(TokenizerError::InvalidCharacterSequenceAfterDoctypeName);
                self.set_force_quirks();
                self.reconsume_in(TokenizerState::BogusDOCTYPE);
            }
        }
    }

    /// Begin a quoted public (or system) identifier: "Set the current DOCTYPE
    /// token's public identifier to the empty string (not missing), then
    /// switch to the DOCTYPE public identifier (double-quoted) state."
    fn begin_doctype_identifier(&mut self, public: bool, quote: char) {
        if let Some(ref mut token) = self.current_token {
            if public {
                token.set_public_identifier_empty();
            } else {
                token.set_system_identifier_empty();
            }
        }
        self.switch_to(match (public, quote) {
            (true, '"') => TokenizerState::DOCTYPEPublicIdentifierDoubleQuoted,
            (true, _) => TokenizerState::DOCTYPEPublicIdentifierSingleQuoted,
            (false, '"') => TokenizerState::DOCTYPESystemIdentifierDoubleQuoted,
            (false, _) => TokenizerState::DOCTYPESystemIdentifierSingleQuoted,
        });
    }

    /// [§ 13.2.5.57 After DOCTYPE public keyword state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-keyword-state)
    /// [§ 13.2.5.63 After DOCTYPE system keyword state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-keyword-state)
    pub(super) fn handle_after_doctype_keyword_state(&mut self, public: bool) {
        match self.current_input_character {
            // "Switch to the before DOCTYPE public identifier state."
            Some(c) if Self::is_whitespace_char(c) => self.switch_to(if public {
                TokenizerState::BeforeDOCTYPEPublicIdentifier
            } else {
                TokenizerState::BeforeDOCTYPESystemIdentifier
            }),
            // "This is a missing-whitespace-after-doctype-public-keyword parse error."
            Some(quote @ ('"' | '\'')) => {
                self.parse_error(if public {
                    TokenizerError::MissingWhitespaceAfterDoctypePublicKeyword
                } else {
                    TokenizerError::MissingWhitespaceAfterDoctypeSystemKeyword
                });
                self.begin_doctype_identifier(public, quote);
            }
            _ => self.doctype_identifier_fallback(public),
        }
    }

    /// [§ 13.2.5.58 Before DOCTYPE public identifier state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-public-identifier-state)
    /// [§ 13.2.5.64 Before DOCTYPE system identifier state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-system-identifier-state)
    pub(super) fn handle_before_doctype_identifier_state(&mut self, public: bool) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some(quote @ ('"' | '\'')) => self.begin_doctype_identifier(public, quote),
            _ => self.doctype_identifier_fallback(public),
        }
    }

    /// The `>`, EOF and "anything else" entries shared by the keyword and
    /// before-identifier states.
    fn doctype_identifier_fallback(&mut self, public: bool) {
        match self.current_input_character {
            // "U+003E GREATER-THAN SIGN (>) - This is a missing-doctype-public-identifier
            // parse error. Set the current DOCTYPE token's force-quirks flag to on. Switch
            // to the data state. Emit the current DOCTYPE token."
            Some('>') => {
                self.parse_error(if public {
                    TokenizerError::MissingDoctypePublicIdentifier
                } else {
                    TokenizerError::MissingDoctypeSystemIdentifier
                });
                self.set_force_quirks();
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => self.eof_in_doctype(),
            // "Anything else - This is a missing-quote-before-doctype-public-identifier
            // parse error. Set the current DOCTYPE token's force-quirks flag to on.
            // Reconsume in the bogus DOCTYPE state."
            Some(_) => {
                self.parse_error(if public {
                    TokenizerError::MissingQuoteBeforeDoctypePublicIdentifier
                } else {
                    TokenizerError::MissingQuoteBeforeDoctypeSystemIdentifier
                });
                self.set_force_quirks();
                self.reconsume_in(TokenizerState::BogusDOCTYPE);
            }
        }
    }

    /// [§ 13.2.5.59-60 DOCTYPE public identifier (quoted) states](https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(double-quoted)-state)
    /// [§ 13.2.5.65-66 DOCTYPE system identifier (quoted) states](https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(double-quoted)-state)
    pub(super) fn handle_doctype_identifier_quoted_state(&mut self, public: bool, quote: char) {
        match self.current_input_character {
            // "Switch to the after DOCTYPE public identifier state."
            Some(c) if c == quote => self.switch_to(if public {
                TokenizerState::AfterDOCTYPEPublicIdentifier
            } else {
                TokenizerState::AfterDOCTYPESystemIdentifier
            }),
            // "U+0000 NULL - This is an unexpected-null-character parse error. Append a
            // U+FFFD REPLACEMENT CHARACTER to the current DOCTYPE token's public identifier."
            Some('\0') => {
                self.parse_error(TokenizerError::UnexpectedNullCharacter);
                self.append_to_doctype_identifier(public, '\u{FFFD}');
            }
            // "U+003E GREATER-THAN SIGN (>) - This is an abrupt-doctype-public-identifier
            // parse error. Set the current DOCTYPE token's force-quirks flag to on. Switch
            // to the data state. Emit the current DOCTYPE token."
            Some('>') => {
                self.parse_error(if public {
                    TokenizerError::AbruptDoctypePublicIdentifier
                } else {
                    TokenizerError::AbruptDoctypeSystemIdentifier
                });
                self.set_force_quirks();
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => self.eof_in_doctype(),
            Some(c) => self.append_to_doctype_identifier(public, c),
        }
    }

    fn append_to_doctype_identifier(&mut self, public: bool, c: char) {
        if let Some(ref mut token) = self.current_token {
            if public {
                token.append_to_public_identifier(c);
            } else {
                token.append_to_system_identifier(c);
            }
        }
    }

    /// [§ 13.2.5.61 After DOCTYPE public identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-identifier-state)
    pub(super) fn handle_after_doctype_public_identifier_state(&mut self) {
        match self.current_input_character {
            // "Switch to the between DOCTYPE public and system identifiers state."
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BetweenDOCTYPEPublicAndSystemIdentifiers);
            }
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "This is a missing-whitespace-between-doctype-public-and-system-identifiers
            // parse error."
            Some(quote @ ('"' | '\'')) => {
                self.parse_error(
                    TokenizerError::MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers,
                );
                self.begin_doctype_identifier(false, quote);
            }
            None => self.eof_in_doctype(),
            Some(_) => {
                self.parse_error(TokenizerError::MissingQuoteBeforeDoctypeSystemIdentifier);
                self.set_force_quirks();
                self.reconsume_in(TokenizerState::BogusDOCTYPE);
            }
        }
    }

    /// [§ 13.2.5.62 Between DOCTYPE public and system identifiers state](https://html.spec.whatwg.org/multipage/parsing.html#between-doctype-public-and-system-identifiers-state)
    pub(super) fn handle_between_doctype_public_and_system_identifiers_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            Some(quote @ ('"' | '\'')) => self.begin_doctype_identifier(false, quote),
            None => self.eof_in_doctype(),
            Some(_) => {
                self.parse_error(TokenizerError::MissingQuoteBeforeDoctypeSystemIdentifier);
                self.set_force_quirks();
                self.reconsume_in(TokenizerState::BogusDOCTYPE);
            }
        }
    }

    /// [§ 13.2.5.67 After DOCTYPE system identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-identifier-state)
    pub(super) fn handle_after_doctype_system_identifier_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => self.eof_in_doctype(),
            // "Anything else - This is an unexpected-character-after-doctype-system-identifier
            // parse error. Reconsume in the bogus DOCTYPE state. (This does not set the
            // current DOCTYPE token's force-quirks flag to on.)"
            Some(_) => {
                self.parse_error(TokenizerError::UnexpectedCharacterAfterDoctypeSystemIdentifier);
                self.reconsume_in(TokenizerState::BogusDOCTYPE);
            }
        }
    }

    /// [§ 13.2.5.68 Bogus DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-doctype-state)
    pub(super) fn handle_bogus_doctype_state(&mut self) {
        match self.current_input_character {
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "U+0000 NULL - This is an unexpected-null-character parse error. Ignore the character."
            Some('\0') => self.parse_error(TokenizerError::UnexpectedNullCharacter),
            // "EOF - Emit the DOCTYPE token. Emit an end-of-file token."
            None => {
                self.emit_token();
                self.emit_eof_token();
            }
            Some(_) => {}
        }
    }
}

// =============================================================================
// CDATA Sections
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.5.69 CDATA section state](https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-state)
    ///
    /// The characters are collected into one CDATA token instead of being
    /// emitted one by one.
    pub(super) fn handle_cdata_section_state(&mut self) {
        match self.current_input_character {
            // "U+005D RIGHT SQUARE BRACKET (]) - Switch to the CDATA section bracket state."
            Some(']') => self.switch_to(TokenizerState::CDATASectionBracket),
            // "EOF - This is an eof-in-cdata parse error. Emit an end-of-file token."
            None => {
                self.parse_error(TokenizerError::EofInCdata);
                self.emit_token();
                self.emit_eof_token();
            }
            Some(c) => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_comment(c);
                }
            }
        }
    }

    /// [§ 13.2.5.70 CDATA section bracket state](https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-bracket-state)
    pub(super) fn handle_cdata_section_bracket_state(&mut self) {
        match self.current_input_character {
            Some(']') => self.switch_to(TokenizerState::CDATASectionEnd),
            // "Anything else - Emit a U+005D RIGHT SQUARE BRACKET character token.
            // Reconsume in the CDATA section state."
            _ => {
                self.append_to_comment("]");
                self.reconsume_in(TokenizerState::CDATASection);
            }
        }
    }

    /// [§ 13.2.5.71 CDATA section end state](https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-end-state)
    pub(super) fn handle_cdata_section_end_state(&mut self) {
        match self.current_input_character {
            Some(']') => self.append_to_comment("]"),
            // "U+003E GREATER-THAN SIGN character - Switch to the data state."
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "Anything else - Emit two U+005D RIGHT SQUARE BRACKET character tokens.
            // Reconsume in the CDATA section state."
            _ => {
                self.append_to_comment("]]");
                self.reconsume_in(TokenizerState::CDATASection);
            }
        }
    }
}

// =============================================================================
// Processing Instructions
// =============================================================================

impl HTMLTokenizer {
    /// "EOF: This is an eof-in-processing-instruction parse error. Emit the
    /// current processing instruction token. Emit an end-of-file token."
    fn eof_in_processing_instruction(&mut self) {
        self.parse_error(TokenizerError::EofInProcessingInstruction);
        self.emit_token();
        self.emit_eof_token();
    }

    /// Reading the target name after `<?`.
    pub(super) fn handle_processing_instruction_target_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeProcessingInstructionData);
            }
            Some('?') => self.switch_to(TokenizerState::ProcessingInstructionQuestionMark),
            Some(c) if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':') => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_target(c);
                }
            }
            None => self.eof_in_processing_instruction(),
            // Not a valid target: fall back to the unexpected-question-mark
            // bogus comment, keeping what was read so far.
            Some(_) => {
                self.parse_error(TokenizerError::UnexpectedQuestionMarkInsteadOfTagName);
                let target = match self.current_token.take() {
                    Some(Token::ProcessingInstruction { target, .. }) => target,
                    _ => String::new(),
                };
                let mut comment = Token::new_comment();
                std::iter::once('?')
                    .chain(target.chars())
                    .for_each(|c| comment.append_to_comment(c));
                self.current_token = Some(comment);
                self.reconsume_in(TokenizerState::BogusComment);
            }
        }
    }

    /// Whitespace after the target is not part of the data.
    pub(super) fn handle_before_processing_instruction_data_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            _ => self.reconsume_in(TokenizerState::ProcessingInstructionData),
        }
    }

    /// Instruction data, terminated by `?>`.
    pub(super) fn handle_processing_instruction_data_state(&mut self) {
        match self.current_input_character {
            Some('?') => self.switch_to(TokenizerState::ProcessingInstructionQuestionMark),
            Some('\0') => {
                self.parse_error(TokenizerError::UnexpectedNullCharacter);
                self.append_to_comment("\u{FFFD}");
            }
            None => self.eof_in_processing_instruction(),
            Some(c) => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_comment(c);
                }
            }
        }
    }

    /// A `?` that ends the instruction if `>` follows.
    pub(super) fn handle_processing_instruction_question_mark_state(&mut self) {
        match self.current_input_character {
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            Some('?') => self.append_to_comment("?"),
            _ => {
                self.append_to_comment("?");
                self.reconsume_in(TokenizerState::ProcessingInstructionData);
            }
        }
    }
}
