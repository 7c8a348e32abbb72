//! The table insertion modes: in table, in table text, in caption, in column
//! group, in table body, in row and in cell.

use super::core::{HTMLParser, InsertionMode};
use super::stack::Scope;
use crate::tokenizer::Token;

const TABLE_SECTIONS: &[&str] = &["tbody", "tfoot", "thead"];

impl HTMLParser {
    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    pub(super) fn handle_in_table_mode(&mut self, token: &Token) {
        match token {
            // "A character token, if the current node is table, tbody, template,
            // tfoot, thead, or tr element"
            Token::Character { .. }
                if self.current_node_is_one_of(&[
                    "table", "tbody", "template", "tfoot", "thead", "tr",
                ]) =>
            {
                // "Let the pending table character tokens be an empty list of tokens."
                self.pending_table_character_tokens.clear();
                // "Set the original insertion mode to the current insertion mode."
                self.original_insertion_mode = Some(self.insertion_mode);
                // "Switch the insertion mode to "in table text" and reprocess the token."
                self.switch_mode(InsertionMode::InTableText);
                self.reprocess_token(token);
            }

            // "A comment token"
            // "Insert a comment."
            Token::Comment { .. } | Token::ProcessingInstruction { .. } => {
                self.insert_comment(token, None);
            }

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.unexpected_token(token),

            Token::StartTag { name, .. } => match name.as_str() {
                // "A start tag whose tag name is "caption""
                "caption" => {
                    // "Clear the stack back to a table context."
                    self.clear_stack_back_to_table_context();
                    // "Insert a marker at the end of the list of active formatting elements."
                    self.insert_marker();
                    // "Insert an HTML element for the token, then switch the
                    // insertion mode to "in caption"."
                    let _ = self.insert_html_element(token);
                    self.switch_mode(InsertionMode::InCaption);
                }

                // "A start tag whose tag name is "colgroup""
                "colgroup" => {
                    self.clear_stack_back_to_table_context();
                    let _ = self.insert_html_element(token);
                    self.switch_mode(InsertionMode::InColumnGroup);
                }

                // "A start tag whose tag name is "col""
                // "Clear the stack back to a table context. Insert an HTML element
                // for a "colgroup" start tag token with no attributes, then switch
                // the insertion mode to "in column group". Reprocess the current
                // token."
                "col" => {
                    self.clear_stack_back_to_table_context();
                    let _ = self.insert_html_element_named("colgroup");
                    self.switch_mode(InsertionMode::InColumnGroup);
                    self.reprocess_token(token);
                }

                // "A start tag whose tag name is one of: "tbody", "tfoot", "thead""
                "tbody" | "tfoot" | "thead" => {
                    self.clear_stack_back_to_table_context();
                    let _ = self.insert_html_element(token);
                    self.switch_mode(InsertionMode::InTableBody);
                }

                // "A start tag whose tag name is one of: "td", "th", "tr""
                // "Clear the stack back to a table context. Insert an HTML element
                // for a "tbody" start tag token with no attributes, then switch the
                // insertion mode to "in table body". Reprocess the current token."
                "td" | "th" | "tr" => {
                    self.clear_stack_back_to_table_context();
                    let _ = self.insert_html_element_named("tbody");
                    self.switch_mode(InsertionMode::InTableBody);
                    self.reprocess_token(token);
                }

                // "A start tag whose tag name is "table""
                "table" => {
                    // "Parse error."
                    self.unexpected_token(token);
                    // "If the stack of open elements does not have a table element
                    // in table scope, ignore the token."
                    if !self.has_element_in_table_scope("table") {
                        return;
                    }
                    // "Otherwise: Pop elements from this stack until a table element
                    // has been popped from the stack. Reset the insertion mode
                    // appropriately. Reprocess the token."
                    self.pop_until_tag("table");
                    self.reset_insertion_mode_appropriately();
                    self.reprocess_token(token);
                }

                // "A start tag whose tag name is one of: "style", "script", "template""
                // "Process the token using the rules for the "in head" insertion mode."
                "style" | "script" | "template" => self.handle_in_head_mode(token),

                // "A start tag whose tag name is "input""
                // "If the token does not have an attribute with the name "type",
                // or if it does, but that attribute's value is not an ASCII
                // case-insensitive match for the string "hidden", then: act as
                // described in the "anything else" entry below."
                "input"
                    if token
                        .attribute("type")
                        .is_some_and(|value| value.eq_ignore_ascii_case("hidden")) =>
                {
                    // "Otherwise: Parse error. Insert an HTML element for the token.
                    // Pop that input element off the stack of open elements.
                    // Acknowledge the token's self-closing flag, if it is set."
                    self.unexpected_token(token);
                    self.insert_void_html_element(token);
                }

                // "A start tag whose tag name is "form""
                "form" => {
                    // "Parse error."
                    self.unexpected_token(token);
                    // "If there is a template element on the stack of open
                    // elements, or if the form element pointer is not null,
                    // ignore the token."
                    if self.stack_contains("template") || self.form_element_pointer.is_some() {
                        return;
                    }
                    // "Otherwise: Insert an HTML element for the token, and set
                    // the form element pointer to point to the element created.
                    // Pop that form element off the stack of open elements."
                    let form = self.insert_html_element(token);
                    self.form_element_pointer = Some(form);
                    let _ = self.stack_of_open_elements.pop();
                }

                _ => self.handle_in_table_anything_else(token),
            },

            Token::EndTag { name, .. } => match name.as_str() {
                // "An end tag whose tag name is "table""
                "table" => {
                    // "If the stack of open elements does not have a table element
                    // in table scope, this is a parse error; ignore the token."
                    if !self.has_element_in_table_scope("table") {
                        self.unexpected_token(token);
                        return;
                    }
                    // "Otherwise: Pop elements from this stack until a table
                    // element has been popped from the stack. Reset the insertion
                    // mode appropriately."
                    self.pop_until_tag("table");
                    self.reset_insertion_mode_appropriately();
                }

                // "An end tag whose tag name is one of: "body", "caption", "col",
                // "colgroup", "html", "tbody", "td", "tfoot", "th", "thead", "tr""
                // "Parse error. Ignore the token."
                "body" | "caption" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot"
                | "th" | "thead" | "tr" => self.unexpected_token(token),

                // "An end tag whose tag name is "template""
                "template" => self.handle_in_head_mode(token),

                _ => self.handle_in_table_anything_else(token),
            },

            // "An end-of-file token"
            // "Process the token using the rules for the "in body" insertion mode."
            Token::EndOfFile => self.handle_in_body_mode(token),

            _ => self.handle_in_table_anything_else(token),
        }
    }

    /// "Anything else"
    ///
    /// "Parse error. Enable foster parenting, process the token using the
    /// rules for the "in body" insertion mode, and then disable foster
    /// parenting."
    fn handle_in_table_anything_else(&mut self, token: &Token) {
        self.unexpected_token(token);
        self.foster_parenting = true;
        self.handle_in_body_mode(token);
        self.foster_parenting = false;
    }

    /// [§ 13.2.6.4.10 The "in table text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intabletext)
    pub(super) fn handle_in_table_text_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is U+0000 NULL"
            // "Parse error. Ignore the token."
            Token::Character { data: '\0' } => self.parse_error("unexpected-null-character"),

            // "Any other character token"
            // "Append the character token to the pending table character tokens list."
            Token::Character { data } => self.pending_table_character_tokens.push(*data),

            // "Anything else"
            _ => {
                let pending = std::mem::take(&mut self.pending_table_character_tokens);
                // "If any of the tokens in the pending table character tokens list
                // are character tokens that are not ASCII whitespace, then this is
                // a parse error: reprocess the character tokens in the pending
                // table character tokens list using the rules given in the
                // "anything else" entry in the "in table" insertion mode."
                if pending.chars().any(|c| !Self::is_whitespace(c)) {
                    self.parse_error(format!("non-space characters in table: {pending:?}"));
                    self.foster_parenting = true;
                    for c in pending.chars() {
                        self.handle_in_body_mode(&Token::Character { data: c });
                    }
                    self.foster_parenting = false;
                } else {
                    // "Otherwise, insert the characters given by the pending table
                    // character tokens list."
                    for c in pending.chars() {
                        self.insert_character(c);
                    }
                }
                // "Switch the insertion mode to the original insertion mode and
                // reprocess the token."
                self.return_to_original_insertion_mode();
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    pub(super) fn handle_in_caption_mode(&mut self, token: &Token) {
        match token {
            // "An end tag whose tag name is "caption""
            Token::EndTag { name, .. } if name == "caption" => {
                let _ = self.close_caption(token);
            }

            // "A start tag whose tag name is one of: "caption", "col",
            // "colgroup", "tbody", "td", "tfoot", "th", "thead", "tr""
            // "An end tag whose tag name is "table""
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead"
                        | "tr"
                ) =>
            {
                if self.close_caption(token) {
                    self.reprocess_token(token);
                }
            }
            Token::EndTag { name, .. } if name == "table" => {
                if self.close_caption(token) {
                    self.reprocess_token(token);
                }
            }

            // "An end tag whose tag name is one of: "body", "col", "colgroup",
            // "html", "tbody", "td", "tfoot", "th", "thead", "tr""
            // "Parse error. Ignore the token."
            Token::EndTag { name, .. }
                if matches!(
                    name.as_str(),
                    "body" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot" | "th"
                        | "thead" | "tr"
                ) =>
            {
                self.unexpected_token(token);
            }

            // "Anything else"
            // "Process the token using the rules for the "in body" insertion mode."
            _ => self.handle_in_body_mode(token),
        }
    }

    /// Close the caption element, returning whether one was open.
    fn close_caption(&mut self, token: &Token) -> bool {
        // "If the stack of open elements does not have a caption element in
        // table scope, this is a parse error; ignore the token. (fragment case)"
        if !self.has_element_in_table_scope("caption") {
            self.unexpected_token(token);
            return false;
        }
        // "1. Generate implied end tags."
        // "2. Now, if the current node is not a caption element, then this is a
        // parse error."
        // "3. Pop elements from this stack until a caption element has been
        // popped from the stack."
        self.close_element_with_implied_end_tags("caption");
        // "4. Clear the list of active formatting elements up to the last marker."
        self.clear_active_formatting_elements_to_last_marker();
        // "5. Switch the insertion mode to "in table"."
        self.switch_mode(InsertionMode::InTable);
        true
    }

    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolgroup)
    pub(super) fn handle_in_column_group_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data } if Self::is_whitespace(*data) => {
                self.insert_character(*data);
            }
            Token::Comment { .. } | Token::ProcessingInstruction { .. } => {
                self.insert_comment(token, None);
            }
            Token::Doctype { .. } => self.unexpected_token(token),
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),

            // "A start tag whose tag name is "col""
            // "Insert an HTML element for the token. Immediately pop the current
            // node off the stack of open elements."
            // "Acknowledge the token's self-closing flag, if it is set."
            Token::StartTag { name, .. } if name == "col" => self.insert_void_html_element(token),

            // "An end tag whose tag name is "colgroup""
            Token::EndTag { name, .. } if name == "colgroup" => {
                // "If the current node is not a colgroup element, then this is a
                // parse error; ignore the token."
                if !self.current_node_is("colgroup") {
                    self.unexpected_token(token);
                    return;
                }
                // "Otherwise, pop the current node from the stack of open
                // elements. Switch the insertion mode to "in table"."
                let _ = self.stack_of_open_elements.pop();
                self.switch_mode(InsertionMode::InTable);
            }

            // "An end tag whose tag name is "col""
            // "Parse error. Ignore the token."
            Token::EndTag { name, .. } if name == "col" => self.unexpected_token(token),

            Token::StartTag { name, .. } | Token::EndTag { name, .. } if name == "template" => {
                self.handle_in_head_mode(token);
            }

            Token::EndOfFile => self.handle_in_body_mode(token),

            // "Anything else"
            _ => {
                // "If the current node is not a colgroup element, then this is a
                // parse error; ignore the token."
                if !self.current_node_is("colgroup") {
                    self.unexpected_token(token);
                    return;
                }
                // "Otherwise, pop the current node from the stack of open elements."
                // "Switch the insertion mode to "in table"."
                // "Reprocess the token."
                let _ = self.stack_of_open_elements.pop();
                self.switch_mode(InsertionMode::InTable);
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intbody)
    pub(super) fn handle_in_table_body_mode(&mut self, token: &Token) {
        match token {
            // "A start tag whose tag name is "tr""
            // "Clear the stack back to a table body context."
            // "Insert an HTML element for the token, then switch the insertion
            // mode to "in row"."
            Token::StartTag { name, .. } if name == "tr" => {
                self.clear_stack_back_to_table_body_context();
                let _ = self.insert_html_element(token);
                self.switch_mode(InsertionMode::InRow);
            }

            // "A start tag whose tag name is one of: "th", "td""
            // "Parse error."
            // "Clear the stack back to a table body context."
            // "Insert an HTML element for a "tr" start tag token with no
            // attributes, then switch the insertion mode to "in row"."
            // "Reprocess the current token."
            Token::StartTag { name, .. } if matches!(name.as_str(), "th" | "td") => {
                self.unexpected_token(token);
                self.clear_stack_back_to_table_body_context();
                let _ = self.insert_html_element_named("tr");
                self.switch_mode(InsertionMode::InRow);
                self.reprocess_token(token);
            }

            // "An end tag whose tag name is one of: "tbody", "tfoot", "thead""
            Token::EndTag { name, .. } if TABLE_SECTIONS.contains(&name.as_str()) => {
                // "If the stack of open elements does not have an element in
                // table scope that is an HTML element with the same tag name as
                // the token, this is a parse error; ignore the token."
                if !self.has_element_in_table_scope(name) {
                    self.unexpected_token(token);
                    return;
                }
                // "Otherwise: Clear the stack back to a table body context. Pop
                // the current node from the stack of open elements. Switch the
                // insertion mode to "in table"."
                self.clear_stack_back_to_table_body_context();
                let _ = self.stack_of_open_elements.pop();
                self.switch_mode(InsertionMode::InTable);
            }

            // "A start tag whose tag name is one of: "caption", "col",
            // "colgroup", "tbody", "tfoot", "thead""
            // "An end tag whose tag name is "table""
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead"
                ) =>
            {
                self.close_table_section(token);
            }
            Token::EndTag { name, .. } if name == "table" => self.close_table_section(token),

            // "An end tag whose tag name is one of: "body", "caption", "col",
            // "colgroup", "html", "td", "th", "tr""
            // "Parse error. Ignore the token."
            Token::EndTag { name, .. }
                if matches!(
                    name.as_str(),
                    "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th" | "tr"
                ) =>
            {
                self.unexpected_token(token);
            }

            // "Anything else"
            // "Process the token using the rules for the "in table" insertion mode."
            _ => self.handle_in_table_mode(token),
        }
    }

    fn close_table_section(&mut self, token: &Token) {
        // "If the stack of open elements does not have a tbody, thead, or tfoot
        // element in table scope, this is a parse error; ignore the token."
        if !self.has_any_element_in(Scope::Table, TABLE_SECTIONS) {
            self.unexpected_token(token);
            return;
        }
        // "Otherwise: Clear the stack back to a table body context. Pop the
        // current node from the stack of open elements. Switch the insertion mode
        // to "in table". Reprocess the token."
        self.clear_stack_back_to_table_body_context();
        let _ = self.stack_of_open_elements.pop();
        self.switch_mode(InsertionMode::InTable);
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intr)
    pub(super) fn handle_in_row_mode(&mut self, token: &Token) {
        match token {
            // "A start tag whose tag name is one of: "th", "td""
            // "Clear the stack back to a table row context."
            // "Insert an HTML element for the token, then switch the insertion
            // mode to "in cell"."
            // "Insert a marker at the end of the list of active formatting elements."
            Token::StartTag { name, .. } if matches!(name.as_str(), "th" | "td") => {
                self.clear_stack_back_to_table_row_context();
                let _ = self.insert_html_element(token);
                self.switch_mode(InsertionMode::InCell);
                self.insert_marker();
            }

            // "An end tag whose tag name is "tr""
            Token::EndTag { name, .. } if name == "tr" => {
                let _ = self.close_row(token);
            }

            // "A start tag whose tag name is one of: "caption", "col",
            // "colgroup", "tbody", "tfoot", "thead", "tr""
            // "An end tag whose tag name is "table""
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead" | "tr"
                ) =>
            {
                if self.close_row(token) {
                    self.reprocess_token(token);
                }
            }
            Token::EndTag { name, .. } if name == "table" => {
                if self.close_row(token) {
                    self.reprocess_token(token);
                }
            }

            // "An end tag whose tag name is one of: "tbody", "tfoot", "thead""
            Token::EndTag { name, .. } if TABLE_SECTIONS.contains(&name.as_str()) => {
                // "If the stack of open elements does not have an element in
                // table scope that is an HTML element with the same tag name as
                // the token, this is a parse error; ignore the token."
                if !self.has_element_in_table_scope(name) {
                    self.unexpected_token(token);
                    return;
                }
                // "If the stack of open elements does not have a tr element in
                // table scope, ignore the token."
                // "Otherwise: Clear the stack back to a table row context. Pop
                // the current node (which will be a tr element) from the stack
                // of open elements. Switch the insertion mode to "in table body".
                // Reprocess the token."
                if self.close_row(token) {
                    self.reprocess_token(token);
                }
            }

            // "An end tag whose tag name is one of: "body", "caption", "col",
            // "colgroup", "html", "td", "th""
            // "Parse error. Ignore the token."
            Token::EndTag { name, .. }
                if matches!(
                    name.as_str(),
                    "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th"
                ) =>
            {
                self.unexpected_token(token);
            }

            // "Anything else"
            // "Process the token using the rules for the "in table" insertion mode."
            _ => self.handle_in_table_mode(token),
        }
    }

    /// Close the tr element, returning whether one was open in table scope.
    fn close_row(&mut self, token: &Token) -> bool {
        // "If the stack of open elements does not have a tr element in table
        // scope, this is a parse error; ignore the token."
        if !self.has_element_in_table_scope("tr") {
            self.unexpected_token(token);
            return false;
        }
        // "Otherwise: Clear the stack back to a table row context. Pop the
        // current node (which will be a tr element) from the stack of open
        // elements. Switch the insertion mode to "in table body"."
        self.clear_stack_back_to_table_row_context();
        let _ = self.stack_of_open_elements.pop();
        self.switch_mode(InsertionMode::InTableBody);
        true
    }

    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intd)
    pub(super) fn handle_in_cell_mode(&mut self, token: &Token) {
        match token {
            // "An end tag whose tag name is one of: "td", "th""
            Token::EndTag { name, .. } if matches!(name.as_str(), "td" | "th") => {
                // "If the stack of open elements does not have an element in
                // table scope that is an HTML element with the same tag name as
                // that of the token, then this is a parse error; ignore the token."
                if !self.has_element_in_table_scope(name) {
                    self.unexpected_token(token);
                    return;
                }
                // "1. Generate implied end tags."
                // "2. Now, if the current node is not an HTML element with the
                // same tag name as the token, then this is a parse error."
                // "3. Pop elements from the stack of open elements stack until
                // an HTML element with the same tag name as the token has been
                // popped from the stack."
                self.close_element_with_implied_end_tags(name);
                // "4. Clear the list of active formatting elements up to the last marker."
                self.clear_active_formatting_elements_to_last_marker();
                // "5. Switch the insertion mode to "in row"."
                self.switch_mode(InsertionMode::InRow);
            }

            // "A start tag whose tag name is one of: "caption", "col",
            // "colgroup", "tbody", "td", "tfoot", "th", "thead", "tr""
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead"
                        | "tr"
                ) =>
            {
                // "Assert: The stack of open elements has a td or th element in
                // table scope."
                if !self.has_any_element_in(Scope::Table, &["td", "th"]) {
                    self.unexpected_token(token);
                    return;
                }
                // "Close the cell (see below) and reprocess the token."
                self.close_the_cell();
                self.reprocess_token(token);
            }

            // "An end tag whose tag name is one of: "body", "caption", "col",
            // "colgroup", "html""
            // "Parse error. Ignore the token."
            Token::EndTag { name, .. }
                if matches!(
                    name.as_str(),
                    "body" | "caption" | "col" | "colgroup" | "html"
                ) =>
            {
                self.unexpected_token(token);
            }

            // "An end tag whose tag name is one of: "table", "tbody", "tfoot",
            // "thead", "tr""
            Token::EndTag { name, .. }
                if matches!(
                    name.as_str(),
                    "table" | "tbody" | "tfoot" | "thead" | "tr"
                ) =>
            {
                // "If the stack of open elements does not have an element in
                // table scope that is an HTML element with the same tag name as
                // that of the token, this is a parse error; ignore the token."
                if !self.has_element_in_table_scope(name) {
                    self.unexpected_token(token);
                    return;
                }
                // "Otherwise, close the cell (see below) and reprocess the token."
                self.close_the_cell();
                self.reprocess_token(token);
            }

            // "Anything else"
            // "Process the token using the rules for the "in body" insertion mode."
            _ => self.handle_in_body_mode(token),
        }
    }
}
