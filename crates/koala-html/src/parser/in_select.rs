//! The "in select" and "in select in table" insertion modes.

use super::core::HTMLParser;
use super::stack::Scope;
use crate::tokenizer::Token;

const TABLE_ELEMENTS: &[&str] = &["caption", "table", "tbody", "tfoot", "thead", "tr", "td", "th"];

impl HTMLParser {
    /// [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    pub(super) fn handle_in_select_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is U+0000 NULL"
            // "Parse error. Ignore the token."
            Token::Character { data: '\0' } => self.parse_error("unexpected-null-character"),

            // "Any other character token"
            // "Insert the token's character."
            Token::Character { data } => self.insert_character(*data),

            // "A comment token"
            // "Insert a comment."
            Token::Comment { .. } | Token::ProcessingInstruction { .. } => {
                self.insert_comment(token, None);
            }

            Token::StartTag { name, .. } => match name.as_str() {
                // "A start tag whose tag name is "html""
                // "Process the token using the rules for the "in body" insertion mode."
                "html" => self.handle_in_body_mode(token),

                // "A start tag whose tag name is "option""
                // "If the current node is an option element, pop that node from
                // the stack of open elements."
                // "Insert an HTML element for the token."
                "option" => {
                    self.pop_if_current("option");
                    let _ = self.insert_html_element(token);
                }

                // "A start tag whose tag name is "optgroup""
                "optgroup" => {
                    self.pop_if_current("option");
                    self.pop_if_current("optgroup");
                    let _ = self.insert_html_element(token);
                }

                // "A start tag whose tag name is "hr""
                "hr" => {
                    self.pop_if_current("option");
                    self.pop_if_current("optgroup");
                    self.insert_void_html_element(token);
                }

                // "A start tag whose tag name is "select""
                // "Parse error."
                // "If the stack of open elements does not have a select element
                // in select scope, ignore the token. (fragment case)"
                // "Otherwise: Pop elements from the stack of open elements until
                // a select element has been popped from the stack. Reset the
                // insertion mode appropriately."
                "select" => {
                    self.unexpected_token(token);
                    let _ = self.close_select();
                }

                // "A start tag whose tag name is one of: "input", "keygen", "textarea""
                // "Parse error."
                // "If the stack of open elements does not have a select element
                // in select scope, ignore the token. (fragment case)"
                // "Otherwise: ... Reprocess the token."
                "input" | "keygen" | "textarea" => {
                    self.unexpected_token(token);
                    if self.close_select() {
                        self.reprocess_token(token);
                    }
                }

                // "A start tag whose tag name is one of: "script", "template""
                // "Process the token using the rules for the "in head" insertion mode."
                "script" | "template" => self.handle_in_head_mode(token),

                // "Anything else"
                // "Parse error. Ignore the token."
                _ => self.unexpected_token(token),
            },

            Token::EndTag { name, .. } => match name.as_str() {
                // "An end tag whose tag name is "optgroup""
                "optgroup" => {
                    // "First, if the current node is an option element, and the
                    // node immediately before it in the stack of open elements is
                    // an optgroup element, then pop the current node from the
                    // stack of open elements."
                    let len = self.stack_of_open_elements.len();
                    if self.current_node_is("option")
                        && len >= 2
                        && self.is_html(self.stack_of_open_elements[len - 2], "optgroup")
                    {
                        let _ = self.stack_of_open_elements.pop();
                    }
                    // "If the current node is an optgroup element, then pop that
                    // node from the stack of open elements. Otherwise, this is a
                    // parse error; ignore the token."
                    if self.current_node_is("optgroup") {
                        let _ = self.stack_of_open_elements.pop();
                    } else {
                        self.unexpected_token(token);
                    }
                }

                // "An end tag whose tag name is "option""
                // "If the current node is an option element, then pop that node
                // from the stack of open elements. Otherwise, this is a parse
                // error; ignore the token."
                "option" => {
                    if self.current_node_is("option") {
                        let _ = self.stack_of_open_elements.pop();
                    } else {
                        self.unexpected_token(token);
                    }
                }

                // "An end tag whose tag name is "select""
                // "If the stack of open elements does not have a select element
                // in select scope, this is a parse error; ignore the token.
                // (fragment case)"
                "select" => {
                    if !self.close_select() {
                        self.unexpected_token(token);
                    }
                }

                // "An end tag whose tag name is "template""
                "template" => self.handle_in_head_mode(token),

                _ => self.unexpected_token(token),
            },

            // "An end-of-file token"
            // "Process the token using the rules for the "in body" insertion mode."
            Token::EndOfFile => self.handle_in_body_mode(token),

            // "A DOCTYPE token"
            // "Anything else"
            // "Parse error. Ignore the token."
            _ => self.unexpected_token(token),
        }
    }

    fn pop_if_current(&mut self, name: &str) {
        if self.current_node_is(name) {
            let _ = self.stack_of_open_elements.pop();
        }
    }

    /// Pop until a select element has been popped and reset the insertion
    /// mode. Returns false, doing nothing, when no select is in select scope.
    fn close_select(&mut self) -> bool {
        if !self.has_element_in(Scope::Select, "select") {
            return false;
        }
        self.pop_until_tag("select");
        self.reset_insertion_mode_appropriately();
        true
    }

    /// [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    pub(super) fn handle_in_select_in_table_mode(&mut self, token: &Token) {
        match token {
            // "A start tag whose tag name is one of: "caption", "table",
            // "tbody", "tfoot", "thead", "tr", "td", "th""
            // "Parse error."
            // "Pop elements from the stack of open elements until a select
            // element has been popped from the stack."
            // "Reset the insertion mode appropriately."
            // "Reprocess the token."
            Token::StartTag { name, .. } if TABLE_ELEMENTS.contains(&name.as_str()) => {
                self.unexpected_token(token);
                self.pop_until_tag("select");
                self.reset_insertion_mode_appropriately();
                self.reprocess_token(token);
            }

            // "An end tag whose tag name is one of: "caption", "table", "tbody",
            // "tfoot", "thead", "tr", "td", "th""
            Token::EndTag { name, .. } if TABLE_ELEMENTS.contains(&name.as_str()) => {
                // "Parse error."
                self.unexpected_token(token);
                // "If the stack of open elements does not have an element in
                // table scope that is an HTML element with the same tag name as
                // that of the token, then ignore the token."
                if !self.has_element_in_table_scope(name) {
                    return;
                }
                // "Otherwise: Pop elements from the stack of open elements until
                // a select element has been popped from the stack. Reset the
                // insertion mode appropriately. Reprocess the token."
                self.pop_until_tag("select");
                self.reset_insertion_mode_appropriately();
                self.reprocess_token(token);
            }

            // "Anything else"
            // "Process the token using the rules for the "in select" insertion mode."
            _ => self.handle_in_select_mode(token),
        }
    }
}
