//! [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)

use koala_dom::Namespace;

use super::core::HTMLParser;
use crate::tokenizer::Token;

/// Start tags that break out of foreign content back into HTML.
const BREAKOUT_START_TAGS: &[&str] = &[
    "b", "big", "blockquote", "body", "br", "center", "code", "dd", "div", "dl", "dt", "em",
    "embed", "h1", "h2", "h3", "h4", "h5", "h6", "head", "hr", "i", "img", "li", "listing", "menu",
    "meta", "nobr", "ol", "p", "pre", "ruby", "s", "small", "span", "strong", "strike", "sub",
    "sup", "table", "tt", "u", "ul", "var",
];

impl HTMLParser {
    /// "When the user agent is to apply the rules for parsing tokens in foreign
    /// content, the user agent must handle the token as follows:"
    pub(super) fn process_foreign_content(&mut self, token: &Token) {
        match token {
            // "A character token that is U+0000 NULL"
            // "Parse error. Insert a U+FFFD REPLACEMENT CHARACTER character."
            Token::Character { data: '\0' } => {
                self.parse_error("unexpected-null-character");
                self.insert_character('\u{FFFD}');
            }

            // "A character token that is one of U+0009 CHARACTER TABULATION, ..."
            // "Insert the token's character."
            Token::Character { data } if Self::is_whitespace(*data) => {
                self.insert_character(*data);
            }

            // "Any other character token"
            // "Insert the token's character."
            // "Set the frameset-ok flag to "not ok"."
            Token::Character { data } => {
                self.insert_character(*data);
                self.frameset_ok = false;
            }

            // A CDATA section inside foreign content keeps its own node.
            Token::CData { data } => {
                if data.chars().any(|c| !Self::is_whitespace(c)) {
                    self.frameset_ok = false;
                }
                self.insert_cdata_section(data);
            }

            // "A comment token"
            // "Insert a comment."
            Token::Comment { .. } | Token::ProcessingInstruction { .. } => {
                self.insert_comment(token, None);
            }

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.unexpected_token(token),

            // "A start tag whose tag name is one of: "b", "big", ... "var""
            // "A start tag whose tag name is "font", if the token has any
            // attributes named "color", "face", or "size""
            // "An end tag whose tag name is "br", "p""
            Token::StartTag { name, .. } if Self::breaks_out_of_foreign_content(token, name) => {
                self.break_out_of_foreign_content(token);
            }
            Token::EndTag { name, .. } if matches!(name.as_str(), "br" | "p") => {
                self.break_out_of_foreign_content(token);
            }

            // "Any other start tag"
            Token::StartTag { self_closing, .. } => {
                // "If the adjusted current node is an element in the MathML
                // namespace, adjust MathML attributes for the token."
                // "If the adjusted current node is an element in the SVG
                // namespace, and the token's tag name is one of the ones in the
                // first column of the following table, change the tag name to
                // the name given in the corresponding cell in the second column."
                // "If the adjusted current node is an element in the SVG
                // namespace, adjust SVG attributes for the token."
                // "Adjust foreign attributes for the token."
                // "Insert a foreign element for the token, with adjusted current
                // node's namespace and false."
                let namespace = self
                    .adjusted_current_node()
                    .and_then(|id| self.element(id))
                    .map_or(Namespace::Html, |data| data.namespace);
                let _ = self.insert_foreign_element(token, namespace, false);

                // "If the token has its self-closing flag set, then run the
                // appropriate steps from the following list:"
                // "If the token's tag name is "script", and the new current node
                // is in the SVG namespace: Acknowledge the token's self-closing
                // flag, and then act as described in the steps for a "script"
                // end tag below."
                // "Otherwise: Pop the current node off the stack of open
                // elements and acknowledge the token's self-closing flag."
                if *self_closing {
                    let _ = self.stack_of_open_elements.pop();
                    self.acknowledge_self_closing_flag();
                }
            }

            // "An end tag whose tag name is "script", if the current node is an
            // SVG script element"
            // "Pop the current node off the stack of open elements."
            Token::EndTag { name, .. }
                if name == "script"
                    && self
                        .current_node()
                        .is_some_and(|id| self.is_element(id, Namespace::Svg, "script")) =>
            {
                let _ = self.stack_of_open_elements.pop();
            }

            // "Any other end tag"
            Token::EndTag { name, .. } => self.foreign_end_tag(token, name),

            // End of file always goes to the HTML rules.
            Token::EndOfFile => self.process_using_rules(self.insertion_mode, token),
        }
    }

    fn breaks_out_of_foreign_content(token: &Token, name: &str) -> bool {
        BREAKOUT_START_TAGS.contains(&name)
            || (name == "font"
                && token
                    .attributes()
                    .iter()
                    .any(|attr| matches!(attr.name.as_str(), "color" | "face" | "size")))
    }

    /// "Parse error."
    /// "While the current node is not a MathML text integration point, an
    /// HTML integration point, or an element in the HTML namespace, pop
    /// elements from the stack of open elements."
    /// "Reprocess the token according to the rules given in the section
    /// corresponding to the current insertion mode in HTML content."
    fn break_out_of_foreign_content(&mut self, token: &Token) {
        self.unexpected_token(token);
        while let Some(current) = self.current_node()
            && !self.is_mathml_text_integration_point(current)
            && !self.is_html_integration_point(current)
            && !self.is_in_namespace(current, Namespace::Html)
        {
            let _ = self.stack_of_open_elements.pop();
        }
        self.process_using_rules(self.insertion_mode, token);
    }

    /// The "any other end tag" steps of foreign content. Tag names compare
    /// ASCII case-insensitively since SVG names keep their camel case.
    fn foreign_end_tag(&mut self, token: &Token, name: &str) {
        let matches_token = |parser: &Self, index: usize| {
            parser
                .element(parser.stack_of_open_elements[index])
                .is_some_and(|data| data.tag_name.eq_ignore_ascii_case(name))
        };

        // STEP 1: "Initialize node to be the current node (the bottommost node
        //          of the stack)."
        let Some(mut index) = self.stack_of_open_elements.len().checked_sub(1) else {
            return;
        };

        // STEP 2: "If node's tag name, converted to ASCII lowercase, is not the
        //          same as the tag name of the token, then this is a parse error."
        if !matches_token(self, index) {
            self.parse_error(format!("unexpected end tag </{name}> in foreign content"));
        }

        loop {
            // STEP 3: "Loop: If node is the topmost element in the stack of open
            //          elements, then return. (fragment case)"
            if index == 0 {
                return;
            }

            // STEP 4: "If node's tag name, converted to ASCII lowercase, is the
            //          same as the tag name of the token, pop elements from the
            //          stack of open elements until node has been popped from
            //          the stack, and then return."
            if matches_token(self, index) {
                self.stack_of_open_elements.truncate(index);
                return;
            }

            // STEP 5: "Set node to the previous entry in the stack of open elements."
            index -= 1;

            // STEP 6: "If node is not an element in the HTML namespace, return
            //          to the step labeled loop."
            // STEP 7: "Otherwise, process the token according to the rules given
            //          in the section corresponding to the current insertion mode
            //          in HTML content."
            if self.is_in_namespace(self.stack_of_open_elements[index], Namespace::Html) {
                self.process_using_rules(self.insertion_mode, token);
                return;
            }
        }
    }
}
