//! Character reference states of the HTML tokenizer.
//!
//! [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
//! through [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state).

use super::core::{HTMLTokenizer, TokenizerState, is_noncharacter};
use super::named_character_references::{any_entity_has_prefix, lookup_entity};
use crate::error::TokenizerError;

/// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
///
/// "If the number is one of the numbers in the first column of the following
/// table, then find the row with that number in the first column, and set the
/// character reference code to the number in the second column."
const C1_REPLACEMENTS: [(u32, u32); 27] = [
    (0x80, 0x20AC),
    (0x82, 0x201A),
    (0x83, 0x0192),
    (0x84, 0x201E),
    (0x85, 0x2026),
    (0x86, 0x2020),
    (0x87, 0x2021),
    (0x88, 0x02C6),
    (0x89, 0x2030),
    (0x8A, 0x0160),
    (0x8B, 0x2039),
    (0x8C, 0x0152),
    (0x8E, 0x017D),
    (0x91, 0x2018),
    (0x92, 0x2019),
    (0x93, 0x201C),
    (0x94, 0x201D),
    (0x95, 0x2022),
    (0x96, 0x2013),
    (0x97, 0x2014),
    (0x98, 0x02DC),
    (0x99, 0x2122),
    (0x9A, 0x0161),
    (0x9B, 0x203A),
    (0x9C, 0x0153),
    (0x9E, 0x017E),
    (0x9F, 0x0178),
];

impl HTMLTokenizer {
    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    /// Returns true if the return state is an attribute value state.
    /// Per spec: "consumed as part of an attribute"
    pub(super) const fn is_consumed_as_part_of_attribute(&self) -> bool {
        matches!(
            self.return_state,
            Some(
                TokenizerState::AttributeValueDoubleQuoted
                    | TokenizerState::AttributeValueSingleQuoted
                    | TokenizerState::AttributeValueUnquoted
            )
        )
    }

    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    /// "Flush code points consumed as a character reference"
    /// Per spec: "If the character reference was consumed as part of an attribute,
    /// then append each character to the current attribute's value. Otherwise,
    /// emit each character as a character token."
    pub(super) fn flush_code_points_consumed_as_character_reference(&mut self) {
        if self.is_consumed_as_part_of_attribute() {
            if let Some(ref mut token) = self.current_token {
                for c in self.temporary_buffer.chars() {
                    token.append_to_current_attribute_value(c);
                }
            }
        } else {
            self.emit_temporary_buffer();
        }
    }

    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    pub(super) fn handle_character_reference_state(&mut self) {
        // "Set the temporary buffer to the empty string. Append a U+0026 AMPERSAND
        // (&) character to the temporary buffer."
        self.temporary_buffer.clear();
        self.temporary_buffer.push('&');

        match self.current_input_character {
            // "ASCII alphanumeric"
            // "Reconsume in the named character reference state."
            Some(c) if c.is_ascii_alphanumeric() => {
                self.reconsume_in(TokenizerState::NamedCharacterReference);
            }
            // "U+0023 NUMBER SIGN (#)"
            // "Append the current input character to the temporary buffer.
            // Switch to the numeric character reference state."
            Some('#') => {
                self.temporary_buffer.push('#');
                self.switch_to(TokenizerState::NumericCharacterReference);
            }
            // "Anything else"
            // "Flush code points consumed as a character reference.
            // Reconsume in the return state."
            _ => {
                self.flush_code_points_consumed_as_character_reference();
                let return_state = self.take_return_state();
                self.reconsume_in(return_state);
            }
        }
    }

    /// [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
    ///
    /// "Consume the maximum number of characters possible, where the consumed
    /// characters are one of the identifiers in the first column of the named
    /// character references table. Append each character to the temporary
    /// buffer when it's consumed."
    ///
    /// The current input character (reconsumed from the character reference
    /// state) is the first character of the candidate; the rest is found with
    /// lookahead so that only the matched characters are consumed.
    pub(super) fn handle_named_character_reference_state(&mut self) {
        let Some(first) = self.current_input_character else {
            self.reconsume_in(TokenizerState::AmbiguousAmpersand);
            return;
        };

        // STEP 1: Find the longest entity name that the upcoming input starts with.
        let mut candidate = String::from(first);
        let mut longest_match: Option<(usize, &'static str)> =
            lookup_entity(&candidate).map(|replacement| (candidate.len(), replacement));
        let mut lookahead = 0;
        while !candidate.ends_with(';') && any_entity_has_prefix(&candidate) {
            match self.input.peek(lookahead) {
                Some(c) if c.is_ascii_alphanumeric() || c == ';' => {
                    candidate.push(c);
                    lookahead += 1;
                    if let Some(replacement) = lookup_entity(&candidate) {
                        longest_match = Some((candidate.len(), replacement));
                    }
                }
                _ => break,
            }
        }

        // "Otherwise: Flush code points consumed as a character reference.
        // Switch to the ambiguous ampersand state."
        let Some((match_len, replacement)) = longest_match else {
            self.flush_code_points_consumed_as_character_reference();
            self.reconsume_in(TokenizerState::AmbiguousAmpersand);
            return;
        };

        // STEP 2: Consume the matched characters (the first one already is).
        let matched = &candidate[..match_len];
        self.input.skip(match_len - 1);
        self.temporary_buffer.push_str(matched);
        let last_char_is_semicolon = matched.ends_with(';');

        // "If the character reference was consumed as part of an attribute, and
        // the last character matched is not a U+003B SEMICOLON character (;), and
        // the next input character is either a U+003D EQUALS SIGN character (=) or
        // an ASCII alphanumeric, then, for historical reasons, flush code points
        // consumed as a character reference and switch to the return state."
        if self.is_consumed_as_part_of_attribute()
            && !last_char_is_semicolon
            && self
                .input
                .peek(0)
                .is_some_and(|c| c == '=' || c.is_ascii_alphanumeric())
        {
            self.flush_code_points_consumed_as_character_reference();
            let return_state = self.take_return_state();
            self.switch_to(return_state);
            return;
        }

        // "If the last character matched is not a U+003B SEMICOLON character (;),
        // then this is a missing-semicolon-after-character-reference parse error."
        if !last_char_is_semicolon {
            self.parse_error(TokenizerError::MissingSemicolonAfterCharacterReference);
        }

        // "Set the temporary buffer to the empty string. Append one or two characters
        // corresponding to the character reference name to the temporary buffer.
        // Flush code points consumed as a character reference. Switch to the return state."
        self.temporary_buffer.clear();
        self.temporary_buffer.push_str(replacement);
        self.flush_code_points_consumed_as_character_reference();
        let return_state = self.take_return_state();
        self.switch_to(return_state);
    }

    /// [§ 13.2.5.74 Ambiguous ampersand state](https://html.spec.whatwg.org/multipage/parsing.html#ambiguous-ampersand-state)
    pub(super) fn handle_ambiguous_ampersand_state(&mut self) {
        match self.current_input_character {
            // "ASCII alphanumeric"
            // "If the character reference was consumed as part of an attribute, then
            // append the current input character to the current attribute's value.
            // Otherwise, emit the current input character as a character token."
            Some(c) if c.is_ascii_alphanumeric() => {
                if self.is_consumed_as_part_of_attribute() {
                    if let Some(ref mut token) = self.current_token {
                        token.append_to_current_attribute_value(c);
                    }
                } else {
                    self.emit_character_token(c);
                }
            }
            // "U+003B SEMICOLON (;)"
            // "This is an unknown-named-character-reference parse error.
            // Reconsume in the return state."
            Some(';') => {
                self.parse_error(TokenizerError::UnknownNamedCharacterReference);
                let return_state = self.take_return_state();
                self.reconsume_in(return_state);
            }
            // "Anything else"
            // "Reconsume in the return state."
            _ => {
                let return_state = self.take_return_state();
                self.reconsume_in(return_state);
            }
        }
    }

    /// [§ 13.2.5.75 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
    pub(super) fn handle_numeric_character_reference_state(&mut self) {
        // "Set the character reference code to zero (0)."
        self.character_reference_code = 0;
        match self.current_input_character {
            // "U+0078 LATIN SMALL LETTER X, U+0058 LATIN CAPITAL LETTER X"
            // "Append the current input character to the temporary buffer. Switch to the
            // hexadecimal character reference start state."
            Some(c @ ('x' | 'X')) => {
                self.temporary_buffer.push(c);
                self.switch_to(TokenizerState::HexadecimalCharacterReferenceStart);
            }
            // "Anything else"
            // "Reconsume in the decimal character reference start state."
            _ => self.reconsume_in(TokenizerState::DecimalCharacterReferenceStart),
        }
    }

    /// [§ 13.2.5.76 Hexadecimal character reference start state](https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-start-state)
    pub(super) fn handle_hexadecimal_character_reference_start_state(&mut self) {
        match self.current_input_character {
            Some(c) if c.is_ascii_hexdigit() => {
                self.reconsume_in(TokenizerState::HexadecimalCharacterReference);
            }
            _ => self.absence_of_digits(),
        }
    }

    /// [§ 13.2.5.77 Decimal character reference start state](https://html.spec.whatwg.org/multipage/parsing.html#decimal-character-reference-start-state)
    pub(super) fn handle_decimal_character_reference_start_state(&mut self) {
        match self.current_input_character {
            Some(c) if c.is_ascii_digit() => {
                self.reconsume_in(TokenizerState::DecimalCharacterReference);
            }
            _ => self.absence_of_digits(),
        }
    }

    /// "Anything else: This is an absence-of-digits-in-numeric-character-reference
    /// parse error. Flush code points consumed as a character reference.
    /// Reconsume in the return state."
    fn absence_of_digits(&mut self) {
        self.parse_error(TokenizerError::AbsenceOfDigitsInNumericCharacterReference);
        self.flush_code_points_consumed_as_character_reference();
        let return_state = self.take_return_state();
        self.reconsume_in(return_state);
    }

    /// [§ 13.2.5.78 Hexadecimal character reference state](https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-state)
    pub(super) fn handle_hexadecimal_character_reference_state(&mut self) {
        self.accumulate_digit(16);
    }

    /// [§ 13.2.5.79 Decimal character reference state](https://html.spec.whatwg.org/multipage/parsing.html#decimal-character-reference-state)
    pub(super) fn handle_decimal_character_reference_state(&mut self) {
        self.accumulate_digit(10);
    }

    /// "ASCII digit: Multiply the character reference code by 16 (or 10). Add a
    /// numeric version of the current input character to the character
    /// reference code."
    ///
    /// "U+003B SEMICOLON: Switch to the numeric character reference end state."
    ///
    /// "Anything else: This is a missing-semicolon-after-character-reference
    /// parse error. Reconsume in the numeric character reference end state."
    fn accumulate_digit(&mut self, radix: u32) {
        match self.current_input_character {
            Some(';') => self.switch_to(TokenizerState::NumericCharacterReferenceEnd),
            Some(c) => {
                if let Some(digit) = c.to_digit(radix) {
                    // Saturate so that huge references stay out of range.
                    self.character_reference_code = self
                        .character_reference_code
                        .saturating_mul(radix)
                        .saturating_add(digit);
                } else {
                    self.parse_error(TokenizerError::MissingSemicolonAfterCharacterReference);
                    self.reconsume_in(TokenizerState::NumericCharacterReferenceEnd);
                }
            }
            None => {
                self.parse_error(TokenizerError::MissingSemicolonAfterCharacterReference);
                self.reconsume_in(TokenizerState::NumericCharacterReferenceEnd);
            }
        }
    }

    /// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
    ///
    /// "Check the character reference code". Runs without consuming input.
    pub(super) fn handle_numeric_character_reference_end_state(&mut self) {
        let mut code = self.character_reference_code;

        if code == 0 {
            // "If the number is 0x00, then this is a null-character-reference parse
            // error. Set the character reference code to 0xFFFD."
            self.parse_error(TokenizerError::NullCharacterReference);
            code = 0xFFFD;
        } else if code > 0x0010_FFFF {
            // "If the number is greater than 0x10FFFF, then this is a
            // character-reference-outside-unicode-range parse error."
            self.parse_error(TokenizerError::CharacterReferenceOutsideUnicodeRange);
            code = 0xFFFD;
        } else if (0xD800..=0xDFFF).contains(&code) {
            // "If the number is a surrogate, then this is a
            // surrogate-character-reference parse error."
            self.parse_error(TokenizerError::SurrogateCharacterReference);
            code = 0xFFFD;
        } else if is_noncharacter(code) {
            // "If the number is a noncharacter, then this is a
            // noncharacter-character-reference parse error."
            self.parse_error(TokenizerError::NoncharacterCharacterReference);
        } else if code == 0x0D || (is_control(code) && !matches!(code, 0x09 | 0x0A | 0x0C | 0x20)) {
            // "If the number is 0x0D, or a control that's not ASCII whitespace,
            // then this is a control-character-reference parse error."
            self.parse_error(TokenizerError::ControlCharacterReference);
            if let Some(&(_, replacement)) =
                C1_REPLACEMENTS.iter().find(|(from, _)| *from == code)
            {
                code = replacement;
            }
        }

        // "Set the temporary buffer to the empty string. Append a code point equal
        // to the character reference code to the temporary buffer. Flush code
        // points consumed as a character reference. Switch to the return state."
        self.temporary_buffer.clear();
        self.temporary_buffer
            .push(char::from_u32(code).unwrap_or('\u{FFFD}'));
        self.flush_code_points_consumed_as_character_reference();
        let return_state = self.take_return_state();
        self.switch_to(return_state);
    }
}

/// [§ 4.6 Code points](https://infra.spec.whatwg.org/#control)
///
/// "A C0 control is a code point in the range U+0000 NULL to U+001F
/// INFORMATION SEPARATOR ONE, inclusive." "A control is a C0 control or a code
/// point in the range U+007F DELETE to U+009F APPLICATION PROGRAM COMMAND,
/// inclusive."
const fn is_control(code: u32) -> bool {
    code <= 0x1F || matches!(code, 0x7F..=0x9F)
}
