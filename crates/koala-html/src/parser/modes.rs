//! The insertion modes outside body and table content: document setup,
//! head, text, template and the after-body and frameset modes.

use koala_dom::{DocumentMode, Namespace, NodeId};

use super::core::{HTMLParser, InsertionMode};
use super::insertion::InsertionLocation;
use super::quirks::document_mode_for_doctype;
use crate::config::ParserConfig;
use crate::tokenizer::{Token, TokenizerState};

impl HTMLParser {
    /// [§ 12.1.4 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
    ///
    /// "ASCII whitespace is U+0009 TAB, U+000A LF, U+000C FF, U+000D CR,
    /// or U+0020 SPACE."
    pub(super) const fn is_whitespace(c: char) -> bool {
        matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' ')
    }

    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    pub(super) fn handle_initial_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION, U+000A LINE FEED (LF),
            // U+000C FORM FEED (FF), U+000D CARRIAGE RETURN (CR), or U+0020 SPACE"
            // "Ignore the token."
            Token::Character { data } if Self::is_whitespace(*data) => {}

            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            Token::Comment { .. } | Token::ProcessingInstruction { .. } => {
                self.insert_comment_to_document(token);
            }

            // "A DOCTYPE token"
            Token::Doctype {
                name,
                public_identifier,
                system_identifier,
                force_quirks,
            } => {
                // "If the DOCTYPE token's name is not "html", or the token's
                // public identifier is not missing, or the token's system
                // identifier is neither missing nor "about:legacy-compat", then
                // there is a parse error."
                if name.as_deref() != Some("html")
                    || public_identifier.is_some()
                    || system_identifier
                        .as_deref()
                        .is_some_and(|id| id != "about:legacy-compat")
                {
                    self.parse_error("non-conforming DOCTYPE");
                }

                // "Append a DocumentType node to the Document node..."
                self.insert_doctype(
                    name.as_deref(),
                    public_identifier.as_deref(),
                    system_identifier.as_deref(),
                );

                // Then, quirks or limited-quirks mode per the DOCTYPE.
                let mode = document_mode_for_doctype(
                    name.as_deref(),
                    public_identifier.as_deref(),
                    system_identifier.as_deref(),
                    *force_quirks,
                );
                self.tree.set_mode(mode);

                // "Then, switch the insertion mode to "before html"."
                self.switch_mode(InsertionMode::BeforeHtml);
            }

            // "Anything else"
            // "If the document is not an iframe srcdoc document, then this is a
            // parse error; if the parser cannot change the mode flag is false,
            // set the Document to quirks mode."
            // "In any case, switch the insertion mode to "before html", then
            // reprocess the token."
            _ => {
                self.parse_error("missing DOCTYPE");
                self.tree.set_mode(DocumentMode::Quirks);
                self.switch_mode(InsertionMode::BeforeHtml);
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    pub(super) fn handle_before_html_mode(&mut self, token: &Token) {
        match token {
            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.unexpected_token(token),

            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            Token::Comment { .. } | Token::ProcessingInstruction { .. } => {
                self.insert_comment_to_document(token);
            }

            // "A character token that is one of U+0009 CHARACTER TABULATION, U+000A LINE FEED (LF),
            // U+000C FORM FEED (FF), U+000D CARRIAGE RETURN (CR), or U+0020 SPACE"
            // "Ignore the token."
            Token::Character { data } if Self::is_whitespace(*data) => {}

            // "A start tag whose tag name is "html""
            // "Create an element for the token in the HTML namespace, with the
            // Document as the intended parent. Append it to the Document object.
            // Put this element in the stack of open elements."
            // "Switch the insertion mode to "before head"."
            Token::StartTag { name, .. } if name == "html" => {
                let html = self.create_element_for_token(token, Namespace::Html);
                self.tree.append_child(NodeId::ROOT, html);
                self.stack_of_open_elements.push(html);
                self.switch_mode(InsertionMode::BeforeHead);
            }

            // "An end tag whose tag name is one of: "head", "body", "html", "br""
            // "Act as described in the "anything else" entry below."
            Token::EndTag { name, .. }
                if matches!(name.as_str(), "head" | "body" | "html" | "br") =>
            {
                self.handle_before_html_anything_else(token);
            }

            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::EndTag { .. } => self.unexpected_token(token),

            // "Anything else"
            _ => self.handle_before_html_anything_else(token),
        }
    }

    /// "Create an html element whose node document is the Document object.
    /// Append it to the Document object. Put this element in the stack of
    /// open elements. Switch the insertion mode to "before head", then
    /// reprocess the token."
    fn handle_before_html_anything_else(&mut self, token: &Token) {
        let html = self.create_element_for_token(&Token::start_tag("html"), Namespace::Html);
        self.tree.append_child(NodeId::ROOT, html);
        self.stack_of_open_elements.push(html);
        self.switch_mode(InsertionMode::BeforeHead);
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    pub(super) fn handle_before_head_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION, U+000A LINE FEED (LF),
            // U+000C FORM FEED (FF), U+000D CARRIAGE RETURN (CR), or U+0020 SPACE"
            // "Ignore the token."
            Token::Character { data } if Self::is_whitespace(*data) => {}

            // "A comment token"
            // "Insert a comment."
            Token::Comment { .. } | Token::ProcessingInstruction { .. } => {
                self.insert_comment(token, None);
            }

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.unexpected_token(token),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion mode."
            Token::StartTag { name, .. } if name == "html" => {
                self.handle_in_body_mode(token);
            }

            // "A start tag whose tag name is "head""
            // "Insert an HTML element for the token."
            // "Set the head element pointer to the newly created head element."
            // "Switch the insertion mode to "in head"."
            Token::StartTag { name, .. } if name == "head" => {
                let head = self.insert_html_element(token);
                self.head_element_pointer = Some(head);
                self.switch_mode(InsertionMode::InHead);
            }

            // "An end tag whose tag name is one of: "head", "body", "html", "br""
            // "Act as described in the "anything else" entry below."
            Token::EndTag { name, .. }
                if matches!(name.as_str(), "head" | "body" | "html" | "br") =>
            {
                self.handle_before_head_anything_else(token);
            }

            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::EndTag { .. } => self.unexpected_token(token),

            // "Anything else"
            _ => self.handle_before_head_anything_else(token),
        }
    }

    /// "Insert an HTML element for a "head" start tag token with no attributes.
    /// Set the head element pointer to the newly created head element.
    /// Switch the insertion mode to "in head". Reprocess the current token."
    fn handle_before_head_anything_else(&mut self, token: &Token) {
        let head = self.insert_html_element_named("head");
        self.head_element_pointer = Some(head);
        self.switch_mode(InsertionMode::InHead);
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    pub(super) fn handle_in_head_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION, U+000A LINE FEED (LF),
            // U+000C FORM FEED (FF), U+000D CARRIAGE RETURN (CR), or U+0020 SPACE"
            // "Insert the character."
            Token::Character { data } if Self::is_whitespace(*data) => {
                self.insert_character(*data);
            }

            // "A comment token"
            // "Insert a comment."
            Token::Comment { .. } | Token::ProcessingInstruction { .. } => {
                self.insert_comment(token, None);
            }

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.unexpected_token(token),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion mode."
            Token::StartTag { name, .. } if name == "html" => {
                self.handle_in_body_mode(token);
            }

            // "A start tag whose tag name is one of: "base", "basefont", "bgsound", "link""
            // "Insert an HTML element for the token. Immediately pop the current
            // node off the stack of open elements. Acknowledge the token's
            // self-closing flag, if it is set."
            //
            // "A start tag whose tag name is "meta""
            // Same, plus character encoding changes, which do not apply to
            // already-decoded input.
            Token::StartTag { name, .. }
                if matches!(name.as_str(), "base" | "basefont" | "bgsound" | "link" | "meta") =>
            {
                self.insert_void_html_element(token);
            }

            // "A start tag whose tag name is "title""
            // "Follow the generic RCDATA element parsing algorithm."
            Token::StartTag { name, .. } if name == "title" => {
                self.parse_rcdata_element(token);
            }

            // "A start tag whose tag name is "noscript", if the scripting flag is enabled"
            // "A start tag whose tag name is one of: "noframes", "style""
            // "Follow the generic raw text element parsing algorithm."
            Token::StartTag { name, .. }
                if matches!(name.as_str(), "noframes" | "style")
                    || (name == "noscript" && ParserConfig::SCRIPTING) =>
            {
                self.parse_raw_text_element(token);
            }

            // "A start tag whose tag name is "noscript", if the scripting flag is disabled"
            // "Insert an HTML element for the token."
            // "Switch the insertion mode to "in head noscript"."
            Token::StartTag { name, .. } if name == "noscript" => {
                let _ = self.insert_html_element(token);
                self.switch_mode(InsertionMode::InHeadNoscript);
            }

            // "A start tag whose tag name is "script""
            Token::StartTag { name, .. } if name == "script" => {
                // STEP 1: "Let the adjusted insertion location be the
                //          appropriate place for inserting a node."
                let location = self.appropriate_place_for_inserting(None);
                // STEP 2: "Create an element for the token in the HTML
                //          namespace, with the intended parent being the
                //          element in which the adjusted insertion location
                //          finds itself."
                let script = self.create_element_for_token(token, Namespace::Html);
                // STEP 5: "Insert the newly created element at the adjusted
                //          insertion location."
                self.insert_node_at(location, script);
                // STEP 6: "Push the element onto the stack of open elements so
                //          that it is the new current node."
                self.stack_of_open_elements.push(script);
                // STEP 7: "Switch the tokenizer to the script data state."
                self.tokenizer.set_state(TokenizerState::ScriptData);
                // STEP 8: "Set the original insertion mode to the current
                //          insertion mode."
                self.original_insertion_mode = Some(self.insertion_mode);
                // STEP 9: "Switch the insertion mode to "text"."
                self.switch_mode(InsertionMode::Text);
            }

            // "An end tag whose tag name is "head""
            // "Pop the current node (which will be the head element) off the
            // stack of open elements."
            // "Switch the insertion mode to "after head"."
            Token::EndTag { name, .. } if name == "head" => {
                let _ = self.stack_of_open_elements.pop();
                self.switch_mode(InsertionMode::AfterHead);
            }

            // "An end tag whose tag name is one of: "body", "html", "br""
            // "Act as described in the "anything else" entry below."
            Token::EndTag { name, .. } if matches!(name.as_str(), "body" | "html" | "br") => {
                self.handle_in_head_anything_else(token);
            }

            // "A start tag whose tag name is "template""
            Token::StartTag { name, .. } if name == "template" => {
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(token);
                // "Insert a marker at the end of the list of active formatting elements."
                self.insert_marker();
                // "Set the frameset-ok flag to "not ok"."
                self.frameset_ok = false;
                // "Switch the insertion mode to "in template"."
                self.switch_mode(InsertionMode::InTemplate);
                // "Push "in template" onto the stack of template insertion modes
                // so that it is the new current template insertion mode."
                self.template_insertion_modes.push(InsertionMode::InTemplate);
            }

            // "An end tag whose tag name is "template""
            Token::EndTag { name, .. } if name == "template" => {
                // "If there is no template element on the stack of open
                // elements, then this is a parse error; ignore the token."
                if !self.stack_contains("template") {
                    self.unexpected_token(token);
                    return;
                }
                // "Generate all implied end tags thoroughly."
                self.generate_all_implied_end_tags_thoroughly();
                // "If the current node is not a template element, then this is
                // a parse error."
                if !self.current_node_is("template") {
                    self.parse_error("end tag </template> with open child elements");
                }
                // "Pop elements from the stack of open elements until a
                // template element has been popped from the stack."
                self.pop_until_tag("template");
                // "Clear the list of active formatting elements up to the last marker."
                self.clear_active_formatting_elements_to_last_marker();
                // "Pop the current template insertion mode off the stack of
                // template insertion modes."
                let _ = self.template_insertion_modes.pop();
                // "Reset the insertion mode appropriately."
                self.reset_insertion_mode_appropriately();
            }

            // "A start tag whose tag name is "head""
            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::StartTag { name, .. } if name == "head" => self.unexpected_token(token),
            Token::EndTag { .. } => self.unexpected_token(token),

            // "Anything else"
            _ => self.handle_in_head_anything_else(token),
        }
    }

    /// "Pop the current node (which will be the head element) off the stack of
    /// open elements. Switch the insertion mode to "after head". Reprocess the
    /// token."
    fn handle_in_head_anything_else(&mut self, token: &Token) {
        let _ = self.stack_of_open_elements.pop();
        self.switch_mode(InsertionMode::AfterHead);
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    pub(super) fn handle_in_head_noscript_mode(&mut self, token: &Token) {
        match token {
            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.unexpected_token(token),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion mode."
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),

            // "An end tag whose tag name is "noscript""
            // "Pop the current node (which will be a noscript element) from the
            // stack of open elements; the new current node will be a head element."
            // "Switch the insertion mode to "in head"."
            Token::EndTag { name, .. } if name == "noscript" => {
                let _ = self.stack_of_open_elements.pop();
                self.switch_mode(InsertionMode::InHead);
            }

            // "A character token that is one of U+0009 CHARACTER TABULATION, ..."
            // "A comment token"
            // "A start tag whose tag name is one of: "basefont", "bgsound", "link",
            // "meta", "noframes", "style""
            // "Process the token using the rules for the "in head" insertion mode."
            Token::Character { data } if Self::is_whitespace(*data) => {
                self.handle_in_head_mode(token);
            }
            Token::Comment { .. } | Token::ProcessingInstruction { .. } => {
                self.handle_in_head_mode(token);
            }
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "basefont" | "bgsound" | "link" | "meta" | "noframes" | "style"
                ) =>
            {
                self.handle_in_head_mode(token);
            }

            // "An end tag whose tag name is "br""
            // "Act as described in the "anything else" entry below."
            Token::EndTag { name, .. } if name == "br" => {
                self.handle_in_head_noscript_anything_else(token);
            }

            // "A start tag whose tag name is one of: "head", "noscript""
            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::StartTag { name, .. } if matches!(name.as_str(), "head" | "noscript") => {
                self.unexpected_token(token);
            }
            Token::EndTag { .. } => self.unexpected_token(token),

            // "Anything else"
            _ => self.handle_in_head_noscript_anything_else(token),
        }
    }

    /// "Parse error. Pop the current node (which will be a noscript element)
    /// from the stack of open elements; the new current node will be a head
    /// element. Switch the insertion mode to "in head". Reprocess the token."
    fn handle_in_head_noscript_anything_else(&mut self, token: &Token) {
        self.unexpected_token(token);
        let _ = self.stack_of_open_elements.pop();
        self.switch_mode(InsertionMode::InHead);
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    pub(super) fn handle_after_head_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION, ..."
            // "Insert the character."
            Token::Character { data } if Self::is_whitespace(*data) => {
                self.insert_character(*data);
            }

            // "A comment token"
            // "Insert a comment."
            Token::Comment { .. } | Token::ProcessingInstruction { .. } => {
                self.insert_comment(token, None);
            }

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.unexpected_token(token),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion mode."
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),

            // "A start tag whose tag name is "body""
            // "Insert an HTML element for the token."
            // "Set the frameset-ok flag to "not ok"."
            // "Switch the insertion mode to "in body"."
            Token::StartTag { name, .. } if name == "body" => {
                let _ = self.insert_html_element(token);
                self.frameset_ok = false;
                self.switch_mode(InsertionMode::InBody);
            }

            // "A start tag whose tag name is "frameset""
            // "Insert an HTML element for the token."
            // "Switch the insertion mode to "in frameset"."
            Token::StartTag { name, .. } if name == "frameset" => {
                let _ = self.insert_html_element(token);
                self.switch_mode(InsertionMode::InFrameset);
            }

            // "A start tag whose tag name is one of: "base", "basefont",
            // "bgsound", "link", "meta", "noframes", "script", "style",
            // "template", "title""
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "base"
                        | "basefont"
                        | "bgsound"
                        | "link"
                        | "meta"
                        | "noframes"
                        | "script"
                        | "style"
                        | "template"
                        | "title"
                ) =>
            {
                // "Parse error."
                self.unexpected_token(token);
                // "Push the node pointed to by the head element pointer onto
                // the stack of open elements."
                let Some(head) = self.head_element_pointer else {
                    debug_assert!(false, "after head without a head element");
                    return;
                };
                self.stack_of_open_elements.push(head);
                // "Process the token using the rules for the "in head" insertion mode."
                self.handle_in_head_mode(token);
                // "Remove the node pointed to by the head element pointer from
                // the stack of open elements. (It might not be the current node
                // at this point.)"
                self.remove_from_stack(head);
            }

            // "An end tag whose tag name is "template""
            // "Process the token using the rules for the "in head" insertion mode."
            Token::EndTag { name, .. } if name == "template" => self.handle_in_head_mode(token),

            // "An end tag whose tag name is one of: "body", "html", "br""
            // "Act as described in the "anything else" entry below."
            Token::EndTag { name, .. } if matches!(name.as_str(), "body" | "html" | "br") => {
                self.handle_after_head_anything_else(token);
            }

            // "A start tag whose tag name is "head""
            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::StartTag { name, .. } if name == "head" => self.unexpected_token(token),
            Token::EndTag { .. } => self.unexpected_token(token),

            // "Anything else"
            _ => self.handle_after_head_anything_else(token),
        }
    }

    /// "Insert an HTML element for a "body" start tag token with no attributes.
    /// Switch the insertion mode to "in body". Reprocess the current token."
    fn handle_after_head_anything_else(&mut self, token: &Token) {
        let _ = self.insert_html_element_named("body");
        self.switch_mode(InsertionMode::InBody);
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    pub(super) fn handle_text_mode(&mut self, token: &Token) {
        match token {
            // "A character token"
            // "Insert the token's character."
            Token::Character { data } => self.insert_character(*data),

            // "An end-of-file token"
            Token::EndOfFile => {
                // "Parse error."
                self.parse_error("end of file in text content");
                // "Pop the current node off the stack of open elements."
                let _ = self.stack_of_open_elements.pop();
                // "Switch the insertion mode to the original insertion mode and
                // reprocess the token."
                self.return_to_original_insertion_mode();
                self.reprocess_token(token);
            }

            // "An end tag whose tag name is "script""
            // "Any other end tag"
            // "Pop the current node off the stack of open elements."
            // "Switch the insertion mode to the original insertion mode."
            Token::EndTag { .. } => {
                let _ = self.stack_of_open_elements.pop();
                self.return_to_original_insertion_mode();
            }

            // The tokenizer emits nothing else while in a text-only state.
            _ => self.unexpected_token(token),
        }
    }

    pub(super) fn return_to_original_insertion_mode(&mut self) {
        let mode = self
            .original_insertion_mode
            .take()
            .unwrap_or(InsertionMode::InBody);
        self.switch_mode(mode);
    }

    /// [§ 13.2.6.4.18 The "in template" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intemplate)
    pub(super) fn handle_in_template_mode(&mut self, token: &Token) {
        match token {
            // "A character token"
            // "A comment token"
            // "A DOCTYPE token"
            // "Process the token using the rules for the "in body" insertion mode."
            Token::Character { .. }
            | Token::Comment { .. }
            | Token::ProcessingInstruction { .. }
            | Token::CData { .. }
            | Token::Doctype { .. } => self.handle_in_body_mode(token),

            // "A start tag whose tag name is one of: "base", "basefont",
            // "bgsound", "link", "meta", "noframes", "script", "style",
            // "template", "title""
            // "An end tag whose tag name is "template""
            // "Process the token using the rules for the "in head" insertion mode."
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "base"
                        | "basefont"
                        | "bgsound"
                        | "link"
                        | "meta"
                        | "noframes"
                        | "script"
                        | "style"
                        | "template"
                        | "title"
                ) =>
            {
                self.handle_in_head_mode(token);
            }
            Token::EndTag { name, .. } if name == "template" => self.handle_in_head_mode(token),

            // "A start tag whose tag name is one of: "caption", "colgroup",
            // "tbody", "tfoot", "thead""
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "colgroup" | "tbody" | "tfoot" | "thead"
                ) =>
            {
                self.switch_template_mode(InsertionMode::InTable, token);
            }

            // "A start tag whose tag name is "col""
            Token::StartTag { name, .. } if name == "col" => {
                self.switch_template_mode(InsertionMode::InColumnGroup, token);
            }

            // "A start tag whose tag name is "tr""
            Token::StartTag { name, .. } if name == "tr" => {
                self.switch_template_mode(InsertionMode::InTableBody, token);
            }

            // "A start tag whose tag name is one of: "td", "th""
            Token::StartTag { name, .. } if matches!(name.as_str(), "td" | "th") => {
                self.switch_template_mode(InsertionMode::InRow, token);
            }

            // "Any other start tag"
            Token::StartTag { .. } => {
                self.switch_template_mode(InsertionMode::InBody, token);
            }

            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::EndTag { .. } => self.unexpected_token(token),

            // "An end-of-file token"
            Token::EndOfFile => {
                // "If there is no template element on the stack of open
                // elements, then stop parsing. (fragment case)"
                if !self.stack_contains("template") {
                    self.stop_parsing();
                    return;
                }
                // "Otherwise, this is a parse error."
                self.parse_error("end of file in <template>");
                // "Pop elements from the stack of open elements until a
                // template element has been popped from the stack."
                self.pop_until_tag("template");
                // "Clear the list of active formatting elements up to the last marker."
                self.clear_active_formatting_elements_to_last_marker();
                // "Pop the current template insertion mode off the stack of
                // template insertion modes."
                let _ = self.template_insertion_modes.pop();
                // "Reset the insertion mode appropriately."
                self.reset_insertion_mode_appropriately();
                // "Reprocess the token."
                self.reprocess_token(token);
            }
        }
    }

    /// "Pop the current template insertion mode off the stack of template
    /// insertion modes. Push `mode` onto the stack of template insertion modes
    /// so that it is the new current template insertion mode. Switch the
    /// insertion mode to `mode`, and reprocess the token."
    fn switch_template_mode(&mut self, mode: InsertionMode, token: &Token) {
        let _ = self.template_insertion_modes.pop();
        self.template_insertion_modes.push(mode);
        self.switch_mode(mode);
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    pub(super) fn handle_after_body_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION, ..."
            // "Process the token using the rules for the "in body" insertion mode."
            Token::Character { data } if Self::is_whitespace(*data) => {
                self.handle_in_body_mode(token);
            }

            // "A comment token"
            // "Insert a comment as the last child of the first element in the
            // stack of open elements (the html element)."
            Token::Comment { .. } | Token::ProcessingInstruction { .. } => {
                let html = self
                    .stack_of_open_elements
                    .first()
                    .copied()
                    .unwrap_or(NodeId::ROOT);
                self.insert_comment(token, Some(InsertionLocation::append_to(html)));
            }

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.unexpected_token(token),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion mode."
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),

            // "An end tag whose tag name is "html""
            // "If the parser was created as part of the HTML fragment parsing
            // algorithm, this is a parse error; ignore the token. (fragment case)"
            // "Otherwise, switch the insertion mode to "after after body"."
            Token::EndTag { name, .. } if name == "html" => {
                if self.context_element.is_some() {
                    self.unexpected_token(token);
                } else {
                    self.switch_mode(InsertionMode::AfterAfterBody);
                }
            }

            // "An end-of-file token"
            // "Stop parsing."
            Token::EndOfFile => self.stop_parsing(),

            // "Anything else"
            // "Parse error. Switch the insertion mode to "in body" and
            // reprocess the token."
            _ => {
                self.unexpected_token(token);
                self.switch_mode(InsertionMode::InBody);
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    pub(super) fn handle_in_frameset_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION, ..."
            // "Insert the character."
            Token::Character { data } if Self::is_whitespace(*data) => {
                self.insert_character(*data);
            }

            // "A comment token"
            // "Insert a comment."
            Token::Comment { .. } | Token::ProcessingInstruction { .. } => {
                self.insert_comment(token, None);
            }

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion mode."
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),

            // "A start tag whose tag name is "frameset""
            // "Insert an HTML element for the token."
            Token::StartTag { name, .. } if name == "frameset" => {
                let _ = self.insert_html_element(token);
            }

            // "An end tag whose tag name is "frameset""
            Token::EndTag { name, .. } if name == "frameset" => {
                // "If the current node is the root html element, then this is a
                // parse error; ignore the token. (fragment case)"
                if self.stack_of_open_elements.len() <= 1 {
                    self.unexpected_token(token);
                    return;
                }
                // "Otherwise, pop the current node from the stack of open elements."
                let _ = self.stack_of_open_elements.pop();
                // "If the parser was not created as part of the HTML fragment
                // parsing algorithm (fragment case), and the current node is no
                // longer a frameset element, then switch the insertion mode to
                // "after frameset"."
                if self.context_element.is_none() && !self.current_node_is("frameset") {
                    self.switch_mode(InsertionMode::AfterFrameset);
                }
            }

            // "A start tag whose tag name is "frame""
            // "Insert an HTML element for the token. Immediately pop the current
            // node off the stack of open elements."
            // "Acknowledge the token's self-closing flag, if it is set."
            Token::StartTag { name, .. } if name == "frame" => {
                self.insert_void_html_element(token);
            }

            // "A start tag whose tag name is "noframes""
            // "Process the token using the rules for the "in head" insertion mode."
            Token::StartTag { name, .. } if name == "noframes" => self.handle_in_head_mode(token),

            // "An end-of-file token"
            // "If the current node is not the root html element, then this is a
            // parse error."
            // "Stop parsing."
            Token::EndOfFile => {
                if self.stack_of_open_elements.len() > 1 {
                    self.parse_error("end of file in <frameset>");
                }
                self.stop_parsing();
            }

            // "A DOCTYPE token"
            // "Anything else"
            // "Parse error. Ignore the token."
            _ => self.unexpected_token(token),
        }
    }

    /// [§ 13.2.6.4.21 The "after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    pub(super) fn handle_after_frameset_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data } if Self::is_whitespace(*data) => {
                self.insert_character(*data);
            }
            Token::Comment { .. } | Token::ProcessingInstruction { .. } => {
                self.insert_comment(token, None);
            }
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),

            // "An end tag whose tag name is "html""
            // "Switch the insertion mode to "after after frameset"."
            Token::EndTag { name, .. } if name == "html" => {
                self.switch_mode(InsertionMode::AfterAfterFrameset);
            }

            Token::StartTag { name, .. } if name == "noframes" => self.handle_in_head_mode(token),
            Token::EndOfFile => self.stop_parsing(),
            _ => self.unexpected_token(token),
        }
    }

    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    pub(super) fn handle_after_after_body_mode(&mut self, token: &Token) {
        match token {
            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            Token::Comment { .. } | Token::ProcessingInstruction { .. } => {
                self.insert_comment_to_document(token);
            }

            // "A DOCTYPE token"
            // "A character token that is one of U+0009 CHARACTER TABULATION, ..."
            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion mode."
            Token::Doctype { .. } => self.handle_in_body_mode(token),
            Token::Character { data } if Self::is_whitespace(*data) => {
                self.handle_in_body_mode(token);
            }
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),

            // "An end-of-file token"
            // "Stop parsing."
            Token::EndOfFile => self.stop_parsing(),

            // "Anything else"
            // "Parse error. Switch the insertion mode to "in body" and
            // reprocess the token."
            _ => {
                self.unexpected_token(token);
                self.switch_mode(InsertionMode::InBody);
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.23 The "after after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    pub(super) fn handle_after_after_frameset_mode(&mut self, token: &Token) {
        match token {
            Token::Comment { .. } | Token::ProcessingInstruction { .. } => {
                self.insert_comment_to_document(token);
            }
            Token::Doctype { .. } => self.handle_in_body_mode(token),
            Token::Character { data } if Self::is_whitespace(*data) => {
                self.handle_in_body_mode(token);
            }
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),
            Token::EndOfFile => self.stop_parsing(),
            Token::StartTag { name, .. } if name == "noframes" => self.handle_in_head_mode(token),
            _ => self.unexpected_token(token),
        }
    }
}
