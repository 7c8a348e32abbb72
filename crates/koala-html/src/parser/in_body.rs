//! [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)

use koala_dom::{Attr, DocumentMode, Namespace, NodeId};

use super::core::{HTMLParser, InsertionMode};
use super::stack::{ALLOWED_OPEN_AT_BODY_END, Scope};
use crate::config::ParserConfig;
use crate::tokenizer::{Token, TokenizerState};

/// Start tags that close a p element in button scope and open a plain block.
const BLOCK_START_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "details", "dialog", "dir", "div",
    "dl", "fieldset", "figcaption", "figure", "footer", "header", "hgroup", "main", "menu", "nav",
    "ol", "p", "search", "section", "summary", "ul",
];

/// End tags closed with "generate implied end tags" when in scope.
const BLOCK_END_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "button", "center", "details", "dialog", "dir",
    "div", "dl", "fieldset", "figcaption", "figure", "footer", "header", "hgroup", "listing",
    "main", "menu", "nav", "ol", "pre", "search", "section", "summary", "ul",
];

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#formatting)
///
/// The formatting elements other than `a` and `nobr`, which have their own
/// start tag rules.
const FORMATTING_START_TAGS: &[&str] = &[
    "b", "big", "code", "em", "font", "i", "s", "small", "strike", "strong", "tt", "u",
];

/// End tags handled by the adoption agency algorithm.
pub(super) const FORMATTING_END_TAGS: &[&str] = &[
    "a", "b", "big", "code", "em", "font", "i", "nobr", "s", "small", "strike", "strong", "tt",
    "u",
];

/// Start tags that are handled by the "in head" rules from inside body.
pub(super) const IN_HEAD_START_TAGS: &[&str] = &[
    "base", "basefont", "bgsound", "link", "meta", "noframes", "script", "style", "template",
    "title",
];

impl HTMLParser {
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    pub(super) fn handle_in_body_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is U+0000 NULL"
            // "Parse error. Ignore the token."
            Token::Character { data: '\0' } => self.parse_error("unexpected-null-character"),

            // "A character token that is one of U+0009 CHARACTER TABULATION, U+000A LINE FEED (LF),
            // U+000C FORM FEED (FF), U+000D CARRIAGE RETURN (CR), or U+0020 SPACE"
            // "Reconstruct the active formatting elements, if any."
            // "Insert the token's character."
            Token::Character { data } if Self::is_whitespace(*data) => {
                self.reconstruct_active_formatting_elements();
                self.insert_character(*data);
            }

            // "Any other character token"
            // "Reconstruct the active formatting elements, if any."
            // "Insert the token's character."
            // "Set the frameset-ok flag to "not ok"."
            Token::Character { data } => {
                self.reconstruct_active_formatting_elements();
                self.insert_character(*data);
                self.frameset_ok = false;
            }

            // CDATA sections only reach here through the character dispatch.
            Token::CData { data } => {
                for c in data.chars() {
                    self.handle_in_body_mode(&Token::Character { data: c });
                }
            }

            // "A comment token"
            // "Insert a comment."
            Token::Comment { .. } | Token::ProcessingInstruction { .. } => {
                self.insert_comment(token, None);
            }

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.unexpected_token(token),

            Token::StartTag { .. } => self.handle_in_body_start_tag(token),
            Token::EndTag { name, .. } => self.handle_in_body_end_tag(token, name),

            // "An end-of-file token"
            Token::EndOfFile => {
                // "If the stack of template insertion modes is not empty, then
                // process the token using the rules for the "in template"
                // insertion mode."
                if !self.template_insertion_modes.is_empty() {
                    self.handle_in_template_mode(token);
                    return;
                }
                // "Otherwise, follow these steps:"
                // "If there is a node in the stack of open elements that is not
                // either a dd element, a dt element, ... or the html element,
                // then this is a parse error."
                self.report_unclosed_elements("end of file");
                // "Stop parsing."
                self.stop_parsing();
            }
        }
    }

    fn handle_in_body_start_tag(&mut self, token: &Token) {
        let Token::StartTag {
            name,
            self_closing,
            attributes,
        } = token
        else {
            return;
        };
        match name.as_str() {
            // "A start tag whose tag name is "html""
            "html" => {
                // "Parse error."
                self.unexpected_token(token);
                // "If there is a template element on the stack of open
                // elements, then ignore the token."
                if self.stack_contains("template") {
                    return;
                }
                // "Otherwise, for each attribute on the token, check to see if
                // the attribute is already present on the top element of the
                // stack of open elements. If it is not, add the attribute and
                // its corresponding value to that element."
                if let Some(&html) = self.stack_of_open_elements.first() {
                    self.merge_attributes(html, token);
                }
            }

            // "A start tag whose tag name is one of: "base", "basefont",
            // "bgsound", "link", "meta", "noframes", "script", "style",
            // "template", "title""
            // "Process the token using the rules for the "in head" insertion mode."
            n if IN_HEAD_START_TAGS.contains(&n) => self.handle_in_head_mode(token),

            // "A start tag whose tag name is "body""
            "body" => {
                // "Parse error."
                self.unexpected_token(token);
                // "If the second element on the stack of open elements is not a
                // body element, if the stack of open elements has only one node
                // on it, or if there is a template element on the stack of open
                // elements, then ignore the token. (fragment case or there is a
                // template element on the stack)"
                let Some(&body) = self.stack_of_open_elements.get(1) else {
                    return;
                };
                if !self.is_html(body, "body") || self.stack_contains("template") {
                    return;
                }
                // "Otherwise, set the frameset-ok flag to "not ok"; then, for each
                // attribute on the token, check to see if the attribute is already
                // present on the body element (the second element) on the stack of
                // open elements, and if it is not, add the attribute and its
                // corresponding value to that element."
                self.frameset_ok = false;
                self.merge_attributes(body, token);
            }

            // "A start tag whose tag name is "frameset""
            "frameset" => {
                // "Parse error."
                self.unexpected_token(token);
                // "If the stack of open elements has only one node on it, or if
                // the second element on the stack of open elements is not a body
                // element, then ignore the token. (fragment case or there is a
                // template element on the stack)"
                let Some(&body) = self.stack_of_open_elements.get(1) else {
                    return;
                };
                if !self.is_html(body, "body") {
                    return;
                }
                // "If the frameset-ok flag is set to "not ok", ignore the token."
                if !self.frameset_ok {
                    return;
                }
                // "Otherwise, run the following steps:"
                // STEP 1: "Remove the second element on the stack of open elements
                //          from its parent node, if it has one."
                self.tree.detach(body);
                // STEP 2: "Pop all the nodes from the bottom of the stack of open
                //          elements, from the current node up to, but not
                //          including, the root html element."
                self.stack_of_open_elements.truncate(1);
                // STEP 3: "Insert an HTML element for the token."
                let _ = self.insert_html_element(token);
                // STEP 4: "Switch the insertion mode to "in frameset"."
                self.switch_mode(InsertionMode::InFrameset);
            }

            // "A start tag whose tag name is one of: "address", "article",
            // "aside", "blockquote", "center", "details", "dialog", "dir",
            // "div", "dl", "fieldset", "figcaption", "figure", "footer",
            // "header", "hgroup", "main", "menu", "nav", "ol", "p", "search",
            // "section", "summary", "ul""
            // "If the stack of open elements has a p element in button scope,
            // then close a p element."
            // "Insert an HTML element for the token."
            n if BLOCK_START_TAGS.contains(&n) => {
                self.close_p_element_in_button_scope();
                let _ = self.insert_html_element(token);
            }

            // "A start tag whose tag name is one of: "h1", "h2", "h3", "h4", "h5", "h6""
            n if HEADINGS.contains(&n) => {
                // "If the stack of open elements has a p element in button
                // scope, then close a p element."
                self.close_p_element_in_button_scope();
                // "If the current node is an HTML element whose tag name is one
                // of "h1", "h2", "h3", "h4", "h5", or "h6", then this is a parse
                // error; pop the current node off the stack of open elements."
                if self.current_node_is_one_of(HEADINGS) {
                    self.parse_error(format!("nested heading <{n}>"));
                    let _ = self.stack_of_open_elements.pop();
                }
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(token);
            }

            // "A start tag whose tag name is one of: "pre", "listing""
            "pre" | "listing" => {
                // "If the stack of open elements has a p element in button
                // scope, then close a p element."
                self.close_p_element_in_button_scope();
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(token);
                // "If the next token is a U+000A LINE FEED (LF) character token,
                // then ignore that token and move on to the next one. (Newlines
                // at the start of pre blocks are ignored as an authoring
                // convenience.)"
                self.skip_next_line_feed = true;
                // "Set the frameset-ok flag to "not ok"."
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "form""
            "form" => {
                let has_template = self.stack_contains("template");
                // "If the form element pointer is not null, and there is no
                // template element on the stack of open elements, then this is
                // a parse error; ignore the token."
                if self.form_element_pointer.is_some() && !has_template {
                    self.unexpected_token(token);
                    return;
                }
                // "Otherwise: If the stack of open elements has a p element in
                // button scope, then close a p element."
                self.close_p_element_in_button_scope();
                // "Insert an HTML element for the token, and, if there is no
                // template element on the stack of open elements, set the form
                // element pointer to point to the element created."
                let form = self.insert_html_element(token);
                if !has_template {
                    self.form_element_pointer = Some(form);
                }
            }

            // "A start tag whose tag name is "li""
            "li" => self.handle_list_item_start_tag(token, &["li"]),

            // "A start tag whose tag name is one of: "dd", "dt""
            "dd" | "dt" => self.handle_list_item_start_tag(token, &["dd", "dt"]),

            // "A start tag whose tag name is "plaintext""
            "plaintext" => {
                // "If the stack of open elements has a p element in button
                // scope, then close a p element."
                self.close_p_element_in_button_scope();
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(token);
                // "Switch the tokenizer to the PLAINTEXT state."
                self.tokenizer.set_state(TokenizerState::PLAINTEXT);
            }

            // "A start tag whose tag name is "button""
            "button" => {
                // "1. If the stack of open elements has a button element in
                // scope, then run these substeps:"
                if self.has_element_in_scope("button") {
                    // "1. Parse error."
                    self.parse_error("nested <button>");
                    // "2. Generate implied end tags."
                    self.generate_implied_end_tags();
                    // "3. Pop elements from the stack of open elements until a
                    // button element has been popped from the stack."
                    self.pop_until_tag("button");
                }
                // "2. Reconstruct the active formatting elements, if any."
                self.reconstruct_active_formatting_elements();
                // "3. Insert an HTML element for the token."
                let _ = self.insert_html_element(token);
                // "4. Set the frameset-ok flag to "not ok"."
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "a""
            "a" => {
                // "If the list of active formatting elements contains an a
                // element between the end of the list and the last marker on
                // the list (or the start of the list if there is no marker on
                // the list), then this is a parse error; run the adoption
                // agency algorithm for the token, then remove that element from
                // the list of active formatting elements and the stack of open
                // elements if the adoption agency algorithm didn't already
                // remove it (it might not have if the element is not in table
                // scope)."
                if let Some(index) = self.formatting_element_after_last_marker("a") {
                    let existing = self.active_formatting_elements[index].node_id();
                    self.parse_error("nested <a>");
                    self.run_adoption_agency(&Token::end_tag("a"));
                    if let Some(existing) = existing {
                        self.remove_from_active_formatting_elements(existing);
                        self.remove_from_stack(existing);
                    }
                }
                // "Reconstruct the active formatting elements, if any."
                self.reconstruct_active_formatting_elements();
                // "Insert an HTML element for the token. Push onto the list of
                // active formatting elements that element."
                let element = self.insert_html_element(token);
                self.push_active_formatting_element(element, token);
            }

            // "A start tag whose tag name is one of: "b", "big", "code", "em",
            // "font", "i", "s", "small", "strike", "strong", "tt", "u""
            // "Reconstruct the active formatting elements, if any."
            // "Insert an HTML element for the token. Push onto the list of
            // active formatting elements that element."
            n if FORMATTING_START_TAGS.contains(&n) => {
                self.reconstruct_active_formatting_elements();
                let element = self.insert_html_element(token);
                self.push_active_formatting_element(element, token);
            }

            // "A start tag whose tag name is "nobr""
            "nobr" => {
                // "Reconstruct the active formatting elements, if any."
                self.reconstruct_active_formatting_elements();
                // "If the stack of open elements has a nobr element in scope,
                // then this is a parse error; run the adoption agency algorithm
                // for the token, then once again reconstruct the active
                // formatting elements, if any."
                if self.has_element_in_scope("nobr") {
                    self.parse_error("nested <nobr>");
                    self.run_adoption_agency(&Token::end_tag("nobr"));
                    self.reconstruct_active_formatting_elements();
                }
                // "Insert an HTML element for the token. Push onto the list of
                // active formatting elements that element."
                let element = self.insert_html_element(token);
                self.push_active_formatting_element(element, token);
            }

            // "A start tag whose tag name is one of: "applet", "marquee", "object""
            "applet" | "marquee" | "object" => {
                // "Reconstruct the active formatting elements, if any."
                self.reconstruct_active_formatting_elements();
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(token);
                // "Insert a marker at the end of the list of active formatting elements."
                self.insert_marker();
                // "Set the frameset-ok flag to "not ok"."
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "table""
            "table" => {
                // "If the Document is not set to quirks mode, and the stack of
                // open elements has a p element in button scope, then close a
                // p element."
                if self.tree.mode() != DocumentMode::Quirks {
                    self.close_p_element_in_button_scope();
                }
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(token);
                // "Set the frameset-ok flag to "not ok"."
                self.frameset_ok = false;
                // "Switch the insertion mode to "in table"."
                self.switch_mode(InsertionMode::InTable);
            }

            // "A start tag whose tag name is one of: "area", "br", "embed",
            // "img", "keygen", "wbr""
            "area" | "br" | "embed" | "img" | "keygen" | "wbr" => {
                // "Reconstruct the active formatting elements, if any."
                self.reconstruct_active_formatting_elements();
                // "Insert an HTML element for the token. Immediately pop the
                // current node off the stack of open elements."
                // "Acknowledge the token's self-closing flag, if it is set."
                self.insert_void_html_element(token);
                // "Set the frameset-ok flag to "not ok"."
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "input""
            "input" => {
                // "Reconstruct the active formatting elements, if any."
                self.reconstruct_active_formatting_elements();
                // "Insert an HTML element for the token. Immediately pop the
                // current node off the stack of open elements."
                // "Acknowledge the token's self-closing flag, if it is set."
                self.insert_void_html_element(token);
                // "If the token does not have an attribute with the name "type",
                // or if it does, but that attribute's value is not an ASCII
                // case-insensitive match for the string "hidden", then: set the
                // frameset-ok flag to "not ok"."
                if !token
                    .attribute("type")
                    .is_some_and(|value| value.eq_ignore_ascii_case("hidden"))
                {
                    self.frameset_ok = false;
                }
            }

            // "A start tag whose tag name is one of: "param", "source", "track""
            // "Insert an HTML element for the token. Immediately pop the current
            // node off the stack of open elements."
            // "Acknowledge the token's self-closing flag, if it is set."
            "param" | "source" | "track" => self.insert_void_html_element(token),

            // "A start tag whose tag name is "hr""
            "hr" => {
                // "If the stack of open elements has a p element in button
                // scope, then close a p element."
                self.close_p_element_in_button_scope();
                // "Insert an HTML element for the token. Immediately pop the
                // current node off the stack of open elements."
                // "Acknowledge the token's self-closing flag, if it is set."
                self.insert_void_html_element(token);
                // "Set the frameset-ok flag to "not ok"."
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "image""
            // "Parse error. Change the token's tag name to "img" and reprocess
            // it. (Don't ask.)"
            "image" => {
                self.parse_error("<image> start tag treated as <img>");
                let renamed = Token::StartTag {
                    name: "img".to_string(),
                    self_closing: *self_closing,
                    attributes: attributes.clone(),
                };
                self.reprocess_token(&renamed);
            }

            // "A start tag whose tag name is "textarea""
            "textarea" => {
                // STEP 1: "Insert an HTML element for the token."
                // STEP 3: "Switch the tokenizer to the RCDATA state."
                // STEP 4: "Set the original insertion mode to the current
                //          insertion mode."
                // STEP 6: "Switch the insertion mode to "text"."
                self.parse_rcdata_element(token);
                // STEP 2: "If the next token is a U+000A LINE FEED (LF)
                //          character token, then ignore that token and move
                //          on to the next one."
                self.skip_next_line_feed = true;
                // STEP 5: "Set the frameset-ok flag to "not ok"."
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "xmp""
            "xmp" => {
                // "If the stack of open elements has a p element in button
                // scope, then close a p element."
                self.close_p_element_in_button_scope();
                // "Reconstruct the active formatting elements, if any."
                self.reconstruct_active_formatting_elements();
                // "Set the frameset-ok flag to "not ok"."
                self.frameset_ok = false;
                // "Follow the generic raw text element parsing algorithm."
                self.parse_raw_text_element(token);
            }

            // "A start tag whose tag name is "iframe""
            "iframe" => {
                // "Set the frameset-ok flag to "not ok"."
                self.frameset_ok = false;
                // "Follow the generic raw text element parsing algorithm."
                self.parse_raw_text_element(token);
            }

            // "A start tag whose tag name is "noembed""
            // "A start tag whose tag name is "noscript", if the scripting flag is enabled"
            // "Follow the generic raw text element parsing algorithm."
            "noembed" => self.parse_raw_text_element(token),
            "noscript" if ParserConfig::SCRIPTING => self.parse_raw_text_element(token),

            // "A start tag whose tag name is "select""
            "select" => {
                // "Reconstruct the active formatting elements, if any."
                self.reconstruct_active_formatting_elements();
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(token);
                // "Set the frameset-ok flag to "not ok"."
                self.frameset_ok = false;
                // "If the insertion mode is one of "in table", "in caption", "in
                // table body", "in row", or "in cell", then switch the insertion
                // mode to "in select in table". Otherwise, switch the insertion
                // mode to "in select"."
                let mode = match self.insertion_mode {
                    InsertionMode::InTable
                    | InsertionMode::InCaption
                    | InsertionMode::InTableBody
                    | InsertionMode::InRow
                    | InsertionMode::InCell => InsertionMode::InSelectInTable,
                    _ => InsertionMode::InSelect,
                };
                self.switch_mode(mode);
            }

            // "A start tag whose tag name is one of: "optgroup", "option""
            "optgroup" | "option" => {
                // "If the current node is an option element, then pop the
                // current node off the stack of open elements."
                if self.current_node_is("option") {
                    let _ = self.stack_of_open_elements.pop();
                }
                // "Reconstruct the active formatting elements, if any."
                self.reconstruct_active_formatting_elements();
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(token);
            }

            // "A start tag whose tag name is one of: "rb", "rtc""
            "rb" | "rtc" => {
                // "If the stack of open elements has a ruby element in scope,
                // then generate implied end tags. If the current node is not now
                // a ruby element, this is a parse error."
                if self.has_element_in_scope("ruby") {
                    self.generate_implied_end_tags();
                    if !self.current_node_is("ruby") {
                        self.unexpected_token(token);
                    }
                }
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(token);
            }

            // "A start tag whose tag name is one of: "rp", "rt""
            "rp" | "rt" => {
                // "If the stack of open elements has a ruby element in scope,
                // then generate implied end tags, except for rtc elements. If the
                // current node is not now a rtc element or a ruby element, this
                // is a parse error."
                if self.has_element_in_scope("ruby") {
                    self.generate_implied_end_tags_excluding(Some("rtc"));
                    if !self.current_node_is_one_of(&["rtc", "ruby"]) {
                        self.unexpected_token(token);
                    }
                }
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(token);
            }

            // "A start tag whose tag name is "math""
            // "A start tag whose tag name is "svg""
            "math" | "svg" => {
                let namespace = if name == "math" {
                    Namespace::MathMl
                } else {
                    Namespace::Svg
                };
                // "Reconstruct the active formatting elements, if any."
                self.reconstruct_active_formatting_elements();
                // "Adjust MathML attributes for the token." / "Adjust SVG
                // attributes for the token." "Adjust foreign attributes for the
                // token." "Insert a foreign element for the token, with the
                // given namespace and false."
                let _ = self.insert_foreign_element(token, namespace, false);
                // "If the token has its self-closing flag set, pop the current
                // node off the stack of open elements and acknowledge the
                // token's self-closing flag."
                if *self_closing {
                    let _ = self.stack_of_open_elements.pop();
                    self.acknowledge_self_closing_flag();
                }
            }

            // "A start tag whose tag name is one of: "caption", "col",
            // "colgroup", "frame", "head", "tbody", "td", "tfoot", "th",
            // "thead", "tr""
            // "Parse error. Ignore the token."
            "caption" | "col" | "colgroup" | "frame" | "head" | "tbody" | "td" | "tfoot" | "th"
            | "thead" | "tr" => self.unexpected_token(token),

            // "Any other start tag"
            // "Reconstruct the active formatting elements, if any."
            // "Insert an HTML element for the token."
            _ => {
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(token);
            }
        }
    }

    fn handle_in_body_end_tag(&mut self, token: &Token, name: &str) {
        match name {
            // "An end tag whose tag name is "template""
            // "Process the token using the rules for the "in head" insertion mode."
            "template" => self.handle_in_head_mode(token),

            // "An end tag whose tag name is "body""
            "body" => {
                // "If the stack of open elements does not have a body element in
                // scope, this is a parse error; ignore the token."
                if !self.has_element_in_scope("body") {
                    self.unexpected_token(token);
                    return;
                }
                // "Otherwise, if there is a node in the stack of open elements
                // that is not either a dd element, ... or the html element,
                // then this is a parse error."
                self.report_unclosed_elements("</body>");
                // "Switch the insertion mode to "after body"."
                self.switch_mode(InsertionMode::AfterBody);
            }

            // "An end tag whose tag name is "html""
            "html" => {
                // "If the stack of open elements does not have a body element in
                // scope, this is a parse error; ignore the token."
                if !self.has_element_in_scope("body") {
                    self.unexpected_token(token);
                    return;
                }
                self.report_unclosed_elements("</html>");
                // "Switch the insertion mode to "after body"."
                // "Reprocess the token."
                self.switch_mode(InsertionMode::AfterBody);
                self.reprocess_token(token);
            }

            // "An end tag whose tag name is one of: "address", "article", ...
            // "summary", "ul""
            n if BLOCK_END_TAGS.contains(&n) => {
                // "If the stack of open elements does not have an element in
                // scope that is an HTML element with the same tag name as that
                // of the token, then this is a parse error; ignore the token."
                if !self.has_element_in_scope(n) {
                    self.unexpected_token(token);
                    return;
                }
                // "Otherwise, run these steps:"
                // "1. Generate implied end tags."
                // "2. If the current node is not an HTML element with the same
                // tag name as that of the token, then this is a parse error."
                // "3. Pop elements from the stack of open elements until an HTML
                // element with the same tag name as the token has been popped
                // from the stack."
                self.close_element_with_implied_end_tags(n);
            }

            // "An end tag whose tag name is "form""
            "form" => self.handle_form_end_tag(token),

            // "An end tag whose tag name is "p""
            "p" => {
                // "If the stack of open elements does not have a p element in
                // button scope, then this is a parse error; insert an HTML
                // element for a "p" start tag token with no attributes."
                if !self.has_element_in_button_scope("p") {
                    self.unexpected_token(token);
                    let _ = self.insert_html_element_named("p");
                }
                // "Close a p element."
                self.close_p_element();
            }

            // "An end tag whose tag name is "li""
            "li" => {
                // "If the stack of open elements does not have an li element in
                // list item scope, then this is a parse error; ignore the token."
                if !self.has_element_in(Scope::ListItem, "li") {
                    self.unexpected_token(token);
                    return;
                }
                self.close_list_item("li");
            }

            // "An end tag whose tag name is one of: "dd", "dt""
            "dd" | "dt" => {
                // "If the stack of open elements does not have an element in
                // scope that is an HTML element with the same tag name as that
                // of the token, then this is a parse error; ignore the token."
                if !self.has_element_in_scope(name) {
                    self.unexpected_token(token);
                    return;
                }
                self.close_list_item(name);
            }

            // "An end tag whose tag name is one of: "h1", "h2", "h3", "h4", "h5", "h6""
            n if HEADINGS.contains(&n) => {
                // "If the stack of open elements does not have an element in
                // scope that is an HTML element and whose tag name is one of
                // "h1", "h2", "h3", "h4", "h5", or "h6", then this is a parse
                // error; ignore the token."
                if !self.has_any_element_in(Scope::Default, HEADINGS) {
                    self.unexpected_token(token);
                    return;
                }
                // "1. Generate implied end tags."
                self.generate_implied_end_tags();
                // "2. If the current node is not an HTML element with the same
                // tag name as that of the token, then this is a parse error."
                if !self.current_node_is(n) {
                    self.parse_error(format!("end tag </{n}> with open child elements"));
                }
                // "3. Pop elements from the stack of open elements until an HTML
                // element whose tag name is one of "h1", "h2", "h3", "h4", "h5",
                // or "h6" has been popped from the stack."
                self.pop_until_one_of(HEADINGS);
            }

            // "An end tag whose tag name is one of: "a", "b", "big", "code",
            // "em", "font", "i", "nobr", "s", "small", "strike", "strong", "tt", "u""
            // "Run the adoption agency algorithm for the token."
            n if FORMATTING_END_TAGS.contains(&n) => self.run_adoption_agency(token),

            // "An end tag token whose tag name is one of: "applet", "marquee", "object""
            "applet" | "marquee" | "object" => {
                // "If the stack of open elements does not have an element in
                // scope that is an HTML element with the same tag name as that
                // of the token, then this is a parse error; ignore the token."
                if !self.has_element_in_scope(name) {
                    self.unexpected_token(token);
                    return;
                }
                // "1. Generate implied end tags."
                // "2. If the current node is not an HTML element with the same
                // tag name as that of the token, then this is a parse error."
                // "3. Pop elements from the stack of open elements until an HTML
                // element with the same tag name as the token has been popped
                // from the stack."
                self.close_element_with_implied_end_tags(name);
                // "4. Clear the list of active formatting elements up to the last marker."
                self.clear_active_formatting_elements_to_last_marker();
            }

            // "An end tag whose tag name is "br""
            // "Parse error. Drop the attributes from the token, and act as
            // described in the next entry; i.e. act as if this was a "br" start
            // tag token with no attributes, rather than the end tag token that
            // it actually is."
            "br" => {
                self.unexpected_token(token);
                self.handle_in_body_start_tag(&Token::start_tag("br"));
            }

            // "Any other end tag"
            _ => self.any_other_end_tag(name),
        }
    }

    /// The shared body of the "li" and "dd"/"dt" start tag entries.
    fn handle_list_item_start_tag(&mut self, token: &Token, closes: &[&str]) {
        // STEP 1: "Set the frameset-ok flag to "not ok"."
        self.frameset_ok = false;

        // STEP 2: "Initialize node to be the current node (the bottommost node
        //          of the stack)."
        // STEP 3: "Loop: If node is an li element, then run these substeps..."
        for index in (0..self.stack_of_open_elements.len()).rev() {
            let node = self.stack_of_open_elements[index];
            if let Some(matched) = closes.iter().copied().find(|name| self.is_html(node, name)) {
                // "1. Generate implied end tags, except for li elements."
                self.generate_implied_end_tags_excluding(Some(matched));
                // "2. If the current node is not an li element, then this is a
                // parse error."
                if !self.current_node_is(matched) {
                    self.parse_error(format!("<{matched}> closed with open child elements"));
                }
                // "3. Pop elements from the stack of open elements until an li
                // element has been popped from the stack."
                self.pop_until_tag(matched);
                // "4. Jump to the step labeled done below."
                break;
            }
            // STEP 4: "If node is in the special category, but is not an
            //          address, div, or p element, then jump to the step
            //          labeled done below."
            if self.is_special(node) && !self.is_html_one_of(node, &["address", "div", "p"]) {
                break;
            }
            // STEP 5: "Otherwise, set node to the previous entry in the stack of
            //          open elements and return to the step labeled loop."
        }

        // STEP 6: "Done: If the stack of open elements has a p element in
        //          button scope, then close a p element."
        self.close_p_element_in_button_scope();

        // STEP 7: "Finally, insert an HTML element for the token."
        let _ = self.insert_html_element(token);
    }

    /// "Generate implied end tags, except for HTML elements with the same tag
    /// name as the token. If the current node is not an HTML element with the
    /// same tag name as that of the token, then this is a parse error. Pop
    /// elements from the stack of open elements until an HTML element with the
    /// same tag name as the token has been popped from the stack."
    fn close_list_item(&mut self, name: &str) {
        self.generate_implied_end_tags_excluding(Some(name));
        if !self.current_node_is(name) {
            self.parse_error(format!("end tag </{name}> with open child elements"));
        }
        self.pop_until_tag(name);
    }

    /// "An end tag whose tag name is "form""
    fn handle_form_end_tag(&mut self, token: &Token) {
        // "If there is no template element on the stack of open elements, then
        // run these substeps:"
        if !self.stack_contains("template") {
            // "1. Let node be the element that the form element pointer is set to,
            // or null if it is not set to an element."
            // "2. Set the form element pointer to null."
            let node = self.form_element_pointer.take();
            // "3. If node is null or if the stack of open elements does not have
            // node in scope, then this is a parse error; return and ignore the
            // token."
            let Some(node) = node.filter(|&node| self.has_node_in_scope(node)) else {
                self.unexpected_token(token);
                return;
            };
            // "4. Generate implied end tags."
            self.generate_implied_end_tags();
            // "5. If the current node is not node, then this is a parse error."
            if self.current_node() != Some(node) {
                self.parse_error("end tag </form> with open child elements");
            }
            // "6. Remove node from the stack of open elements."
            self.remove_from_stack(node);
            return;
        }

        // "If there is a template element on the stack of open elements, then
        // run these substeps instead:"
        // "1. If the stack of open elements does not have a form element in
        // scope, then this is a parse error; return and ignore the token."
        if !self.has_element_in_scope("form") {
            self.unexpected_token(token);
            return;
        }
        // "2. Generate implied end tags."
        // "3. If the current node is not a form element, then this is a parse error."
        // "4. Pop elements from the stack of open elements until a form element
        // has been popped from the stack."
        self.close_element_with_implied_end_tags("form");
    }

    /// "Any other end tag"
    pub(super) fn any_other_end_tag(&mut self, name: &str) {
        // STEP 1: "Initialize node to be the current node (the bottommost node
        //         of the stack)."
        for index in (0..self.stack_of_open_elements.len()).rev() {
            let node = self.stack_of_open_elements[index];

            // STEP 2: "Loop: If node is an HTML element with the same tag name
            //         as the token, then:"
            if self.is_html(node, name) {
                // "1. Generate implied end tags, except for HTML elements with
                // the same tag name as the token."
                self.generate_implied_end_tags_excluding(Some(name));
                // "2. If node is not the current node, then this is a parse error."
                if self.current_node() != Some(node) {
                    self.parse_error(format!("end tag </{name}> with open child elements"));
                }
                // "3. Pop all the nodes from the current node up to node,
                // including node, then stop these steps."
                self.pop_until_node(node);
                return;
            }

            // STEP 3: "Otherwise, if node is in the special category, then this
            //         is a parse error; ignore the token, and return."
            if self.is_special(node) {
                self.parse_error(format!("unexpected end tag </{name}>"));
                return;
            }

            // STEP 4: "Set node to the previous entry in the stack of open
            //         elements."
            // STEP 5: "Return to the step labeled loop."
        }
    }

    /// The "parse error if a node is still open" check of end of file,
    /// `</body>` and `</html>`.
    fn report_unclosed_elements(&mut self, at: &str) {
        let unclosed = self
            .stack_of_open_elements
            .iter()
            .rev()
            .find(|&&id| !self.is_html_one_of(id, ALLOWED_OPEN_AT_BODY_END))
            .and_then(|&id| self.element(id))
            .map(|data| data.tag_name.clone());
        if let Some(tag_name) = unclosed {
            self.parse_error(format!("{at} with unclosed <{tag_name}>"));
        }
    }

    /// Add each attribute of `token` that `target` does not have yet.
    fn merge_attributes(&mut self, target: NodeId, token: &Token) {
        let Some(element) = self.tree.as_element_mut(target) else {
            return;
        };
        for attr in token.attributes() {
            let _ = element
                .add_attribute_if_missing(Attr::new(attr.name.as_str(), attr.value.as_str()));
        }
    }
}
