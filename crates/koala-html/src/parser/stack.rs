//! The stack of open elements, the list of active formatting elements and
//! the algorithms that walk them.
//!
//! [§ 13.2.4 Parse state](https://html.spec.whatwg.org/multipage/parsing.html#parse-state)

use koala_dom::{ElementData, Namespace, NodeId};

use super::core::{ActiveFormattingElement, HTMLParser, InsertionMode};
use crate::tokenizer::Token;

/// The element type lists of the "has an element in scope" variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Scope {
    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-scope)
    Default,
    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-list-item-scope)
    ListItem,
    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-button-scope)
    Button,
    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-table-scope)
    Table,
    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-select-scope)
    Select,
}

/// "The following elements are implied end tag candidates" for generate
/// implied end tags.
const IMPLIED_END_TAGS: &[&str] = &[
    "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc",
];

/// The extra candidates of "generate all implied end tags thoroughly".
const IMPLIED_END_TAGS_THOROUGHLY: &[&str] = &[
    "caption", "colgroup", "tbody", "td", "tfoot", "th", "thead", "tr",
];

/// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
///
/// Elements a stack of open elements may still hold when the body ends (or at
/// end of file) without it being a parse error.
pub(super) const ALLOWED_OPEN_AT_BODY_END: &[&str] = &[
    "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc", "tbody", "td", "tfoot",
    "th", "thead", "tr", "body", "html",
];

/// [§ 13.1.1 Special](https://html.spec.whatwg.org/multipage/parsing.html#special)
///
/// "The following elements have varying levels of special parsing rules"
/// (HTML namespace part).
const SPECIAL_HTML_ELEMENTS: &[&str] = &[
    "address", "applet", "area", "article", "aside", "base", "basefont", "bgsound", "blockquote",
    "body", "br", "button", "caption", "center", "col", "colgroup", "dd", "details", "dir", "div",
    "dl", "dt", "embed", "fieldset", "figcaption", "figure", "footer", "form", "frame", "frameset",
    "h1", "h2", "h3", "h4", "h5", "h6", "head", "header", "hgroup", "hr", "html", "iframe", "img",
    "input", "keygen", "li", "link", "listing", "main", "marquee", "menu", "meta", "nav",
    "noembed", "noframes", "noscript", "object", "ol", "p", "param", "plaintext", "pre", "script",
    "search", "section", "select", "source", "style", "summary", "table", "tbody", "td",
    "template", "textarea", "tfoot", "th", "thead", "title", "tr", "track", "ul", "wbr", "xmp",
];

impl HTMLParser {
    // ===== ELEMENT PREDICATES =====

    pub(super) fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.tree.as_element(id)
    }

    /// Whether `id` is an element in `namespace` with local name `name`.
    pub(super) fn is_element(&self, id: NodeId, namespace: Namespace, name: &str) -> bool {
        self.element(id)
            .is_some_and(|data| data.namespace == namespace && data.tag_name == name)
    }

    pub(super) fn is_in_namespace(&self, id: NodeId, namespace: Namespace) -> bool {
        self.element(id).is_some_and(|data| data.namespace == namespace)
    }

    /// Whether `id` is an HTML element named `name`.
    pub(super) fn is_html(&self, id: NodeId, name: &str) -> bool {
        self.is_element(id, Namespace::Html, name)
    }

    pub(super) fn is_html_one_of(&self, id: NodeId, names: &[&str]) -> bool {
        self.element(id).is_some_and(|data| {
            data.namespace == Namespace::Html && names.contains(&data.tag_name.as_str())
        })
    }

    /// [§ 13.1.1 Special](https://html.spec.whatwg.org/multipage/parsing.html#special)
    pub(super) fn is_special(&self, id: NodeId) -> bool {
        self.element(id).is_some_and(|data| match data.namespace {
            Namespace::Html => SPECIAL_HTML_ELEMENTS.contains(&data.tag_name.as_str()),
            Namespace::MathMl => matches!(
                data.tag_name.as_str(),
                "mi" | "mo" | "mn" | "ms" | "mtext" | "annotation-xml"
            ),
            Namespace::Svg => matches!(data.tag_name.as_str(), "foreignObject" | "desc" | "title"),
            _ => false,
        })
    }

    /// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#mathml-text-integration-point)
    ///
    /// "A node is a MathML text integration point if it is one of the
    /// following elements: A MathML mi element, A MathML mo element, A MathML
    /// mn element, A MathML ms element, A MathML mtext element"
    pub(super) fn is_mathml_text_integration_point(&self, id: NodeId) -> bool {
        self.element(id).is_some_and(|data| {
            data.namespace == Namespace::MathMl
                && matches!(data.tag_name.as_str(), "mi" | "mo" | "mn" | "ms" | "mtext")
        })
    }

    /// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#html-integration-point)
    ///
    /// "A node is an HTML integration point if it is one of the following
    /// elements: A MathML annotation-xml element whose start tag token had an
    /// attribute with the name "encoding" whose value was an ASCII
    /// case-insensitive match for the string "text/html"; A MathML
    /// annotation-xml element whose start tag token had an attribute with the
    /// name "encoding" whose value was an ASCII case-insensitive match for the
    /// string "application/xhtml+xml"; An SVG foreignObject element; An SVG
    /// desc element; An SVG title element"
    pub(super) fn is_html_integration_point(&self, id: NodeId) -> bool {
        self.element(id).is_some_and(|data| match data.namespace {
            Namespace::MathMl => {
                data.tag_name == "annotation-xml"
                    && data.get_attribute("encoding").is_some_and(|encoding| {
                        encoding.eq_ignore_ascii_case("text/html")
                            || encoding.eq_ignore_ascii_case("application/xhtml+xml")
                    })
            }
            Namespace::Svg => matches!(data.tag_name.as_str(), "foreignObject" | "desc" | "title"),
            _ => false,
        })
    }

    // ===== STACK OF OPEN ELEMENTS =====

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#current-node)
    ///
    /// "The current node is the bottommost node in this stack of open elements."
    pub(super) fn current_node(&self) -> Option<NodeId> {
        self.stack_of_open_elements.last().copied()
    }

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#adjusted-current-node)
    ///
    /// "The adjusted current node is the context element if the parser was
    /// created as part of the HTML fragment parsing algorithm and the stack of
    /// open elements has only one element in it (fragment case); otherwise,
    /// the adjusted current node is the current node."
    pub(super) fn adjusted_current_node(&self) -> Option<NodeId> {
        match self.context_element {
            Some(context) if self.stack_of_open_elements.len() == 1 => Some(context),
            _ => self.current_node(),
        }
    }

    pub(super) fn current_node_is(&self, name: &str) -> bool {
        self.current_node().is_some_and(|id| self.is_html(id, name))
    }

    pub(super) fn current_node_is_one_of(&self, names: &[&str]) -> bool {
        self.current_node()
            .is_some_and(|id| self.is_html_one_of(id, names))
    }

    /// Whether an HTML element named `name` is anywhere on the stack.
    pub(super) fn stack_contains(&self, name: &str) -> bool {
        self.stack_of_open_elements
            .iter()
            .any(|&id| self.is_html(id, name))
    }

    /// Pop elements from the stack of open elements until an HTML element
    /// with the given tag name has been popped.
    pub(super) fn pop_until_tag(&mut self, tag_name: &str) {
        self.pop_until_one_of(&[tag_name]);
    }

    /// Pop elements until an HTML element with one of the given tag names has
    /// been popped.
    pub(super) fn pop_until_one_of(&mut self, tag_names: &[&str]) {
        while let Some(id) = self.stack_of_open_elements.pop() {
            if self.is_html_one_of(id, tag_names) {
                break;
            }
        }
    }

    /// Pop elements until `node` has been popped.
    pub(super) fn pop_until_node(&mut self, node: NodeId) {
        while let Some(id) = self.stack_of_open_elements.pop() {
            if id == node {
                break;
            }
        }
    }

    pub(super) fn remove_from_stack(&mut self, node: NodeId) {
        self.stack_of_open_elements.retain(|&id| id != node);
    }

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
    ///
    /// "The stack of open elements is said to have an element target node in a
    /// specific scope consisting of a list of element types list when the
    /// following algorithm terminates in a match state:"
    ///
    /// STEP 1: "Initialize node to be the current node (the bottommost node
    ///          of the stack)."
    /// STEP 2: "If node is the target node, terminate in a match state."
    /// STEP 3: "Otherwise, if node is one of the element types in list,
    ///          terminate in a failure state."
    /// STEP 4: "Otherwise, set node to the previous entry in the stack of
    ///          open elements and return to step 2."
    fn has_in_specific_scope(&self, scope: Scope, is_target: impl Fn(NodeId) -> bool) -> bool {
        for &node in self.stack_of_open_elements.iter().rev() {
            if is_target(node) {
                return true;
            }
            if self.is_scope_boundary(node, scope) {
                return false;
            }
        }
        false
    }

    fn is_scope_boundary(&self, id: NodeId, scope: Scope) -> bool {
        let Some(data) = self.element(id) else {
            return false;
        };
        let name = data.tag_name.as_str();
        let default = || match data.namespace {
            Namespace::Html => matches!(
                name,
                "applet" | "caption" | "html" | "table" | "td" | "th" | "marquee" | "object"
                    | "template"
            ),
            Namespace::MathMl => {
                matches!(name, "mi" | "mo" | "mn" | "ms" | "mtext" | "annotation-xml")
            }
            Namespace::Svg => matches!(name, "foreignObject" | "desc" | "title"),
            _ => false,
        };
        let html = data.namespace == Namespace::Html;
        match scope {
            Scope::Default => default(),
            Scope::ListItem => default() || (html && matches!(name, "ol" | "ul")),
            Scope::Button => default() || (html && name == "button"),
            Scope::Table => html && matches!(name, "html" | "table" | "template"),
            // "all element types except the following: optgroup, option"
            Scope::Select => !(html && matches!(name, "optgroup" | "option")),
        }
    }

    /// Whether an HTML element named `name` is in the given scope.
    pub(super) fn has_element_in(&self, scope: Scope, name: &str) -> bool {
        self.has_in_specific_scope(scope, |id| self.is_html(id, name))
    }

    /// Whether an HTML element with any of `names` is in the given scope.
    pub(super) fn has_any_element_in(&self, scope: Scope, names: &[&str]) -> bool {
        self.has_in_specific_scope(scope, |id| self.is_html_one_of(id, names))
    }

    /// Whether the specific element `node` is in (default) scope.
    pub(super) fn has_node_in_scope(&self, node: NodeId) -> bool {
        self.has_in_specific_scope(Scope::Default, |id| id == node)
    }

    /// "has an element in scope"
    pub(super) fn has_element_in_scope(&self, name: &str) -> bool {
        self.has_element_in(Scope::Default, name)
    }

    /// "has an element in button scope"
    pub(super) fn has_element_in_button_scope(&self, name: &str) -> bool {
        self.has_element_in(Scope::Button, name)
    }

    /// "has an element in table scope"
    pub(super) fn has_element_in_table_scope(&self, name: &str) -> bool {
        self.has_element_in(Scope::Table, name)
    }

    /// [§ 13.2.6.3 Closing elements that have implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
    ///
    /// "When the steps below require the UA to generate implied end tags, then,
    /// while the current node is a dd element, a dt element, an li element, an
    /// optgroup element, an option element, a p element, an rb element, an rp
    /// element, an rt element, or an rtc element, the UA must pop the current
    /// node off the stack of open elements."
    pub(super) fn generate_implied_end_tags(&mut self) {
        self.generate_implied_end_tags_excluding(None);
    }

    /// "If a step requires the UA to generate implied end tags but lists an
    /// element to exclude from the process, then the UA must perform the above
    /// steps as if that element was not in the above list."
    pub(super) fn generate_implied_end_tags_excluding(&mut self, exclude: Option<&str>) {
        while let Some(current) = self.current_node() {
            let Some(data) = self.element(current) else {
                break;
            };
            let name = data.tag_name.as_str();
            if data.namespace != Namespace::Html
                || !IMPLIED_END_TAGS.contains(&name)
                || exclude == Some(name)
            {
                break;
            }
            let _ = self.stack_of_open_elements.pop();
        }
    }

    /// "When the steps below require the UA to generate all implied end tags
    /// thoroughly, then, while the current node is a caption element, a
    /// colgroup element, a dd element, a dt element, an li element, an
    /// optgroup element, an option element, a p element, an rb element, an rp
    /// element, an rt element, an rtc element, a tbody element, a td element, a
    /// tfoot element, a th element, a thead element, or a tr element, the UA
    /// must pop the current node off the stack of open elements."
    pub(super) fn generate_all_implied_end_tags_thoroughly(&mut self) {
        while self.current_node().is_some_and(|id| {
            self.is_html_one_of(id, IMPLIED_END_TAGS)
                || self.is_html_one_of(id, IMPLIED_END_TAGS_THOROUGHLY)
        }) {
            let _ = self.stack_of_open_elements.pop();
        }
    }

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#close-a-p-element)
    ///
    /// "When the steps above say the user agent is to close a p element, it
    /// means that the user agent must generate implied end tags, except for p
    /// elements. If the current node is not a p element, then this is a parse
    /// error. Pop elements from the stack of open elements until a p element
    /// has been popped from the stack."
    pub(super) fn close_p_element(&mut self) {
        self.generate_implied_end_tags_excluding(Some("p"));
        if !self.current_node_is("p") {
            self.parse_error("unclosed elements inside <p>");
        }
        self.pop_until_tag("p");
    }

    /// "If the stack of open elements has a p element in button scope, then
    /// close a p element."
    pub(super) fn close_p_element_in_button_scope(&mut self) {
        if self.has_element_in_button_scope("p") {
            self.close_p_element();
        }
    }

    /// Generate implied end tags, report an error if the current node is not
    /// the HTML element `name`, then pop until `name` has been popped.
    pub(super) fn close_element_with_implied_end_tags(&mut self, name: &str) {
        self.generate_implied_end_tags();
        if !self.current_node_is(name) {
            self.parse_error(format!("end tag </{name}> with open child elements"));
        }
        self.pop_until_tag(name);
    }

    /// [§ 13.2.6.4.9](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-stack-back-to-a-table-context)
    ///
    /// "When the steps above require the UA to clear the stack back to a table
    /// context, it means that the UA must, while the current node is not a
    /// table, template, or html element, pop elements from the stack of open
    /// elements."
    pub(super) fn clear_stack_back_to_table_context(&mut self) {
        self.clear_stack_back_to(&["table", "template", "html"]);
    }

    /// [§ 13.2.6.4.13](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-stack-back-to-a-table-body-context)
    pub(super) fn clear_stack_back_to_table_body_context(&mut self) {
        self.clear_stack_back_to(&["tbody", "tfoot", "thead", "template", "html"]);
    }

    /// [§ 13.2.6.4.14](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-stack-back-to-a-table-row-context)
    pub(super) fn clear_stack_back_to_table_row_context(&mut self) {
        self.clear_stack_back_to(&["tr", "template", "html"]);
    }

    fn clear_stack_back_to(&mut self, names: &[&str]) {
        while self.current_node().is_some_and(|id| !self.is_html_one_of(id, names)) {
            let _ = self.stack_of_open_elements.pop();
        }
    }

    /// [§ 13.2.6.4.15](https://html.spec.whatwg.org/multipage/parsing.html#close-the-cell)
    ///
    /// "Where the steps above say to close the cell, they mean to run the
    /// following algorithm:"
    pub(super) fn close_the_cell(&mut self) {
        // STEP 1: "Generate implied end tags."
        self.generate_implied_end_tags();

        // STEP 2: "If the current node is not now a td element or a th element,
        //          then this is a parse error."
        if !self.current_node_is_one_of(&["td", "th"]) {
            self.parse_error("cell closed with open child elements");
        }

        // STEP 3: "Pop elements from the stack of open elements stack until a
        //          td element or a th element has been popped from the stack."
        self.pop_until_one_of(&["td", "th"]);

        // STEP 4: "Clear the list of active formatting elements up to the last marker."
        self.clear_active_formatting_elements_to_last_marker();

        // STEP 5: "Switch the insertion mode to "in row"."
        self.switch_mode(InsertionMode::InRow);
    }

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#reset-the-insertion-mode-appropriately)
    ///
    /// "When the steps below require the UA to reset the insertion mode
    /// appropriately, it means the UA must follow these steps:"
    pub(super) fn reset_insertion_mode_appropriately(&mut self) {
        let mode = self.appropriate_insertion_mode();
        self.switch_mode(mode);
    }

    fn appropriate_insertion_mode(&self) -> InsertionMode {
        // STEP 1: "Let last be false."
        // STEP 2: "Let node be the last node in the stack of open elements."
        for (index, &stack_node) in self.stack_of_open_elements.iter().enumerate().rev() {
            // STEP 3: "Loop: If node is the first node in the stack of open
            //          elements, then set last to true, and, if the parser was
            //          created as part of the HTML fragment parsing algorithm
            //          (fragment case), set node to the context element passed
            //          to that algorithm."
            let last = index == 0;
            let node = match self.context_element {
                Some(context) if last => context,
                _ => stack_node,
            };
            let Some(data) = self.element(node) else {
                continue;
            };
            if data.namespace != Namespace::Html {
                if last {
                    return InsertionMode::InBody;
                }
                continue;
            }
            match data.tag_name.as_str() {
                // STEP 4: "If node is a select element, run these substeps:"
                "select" => {
                    if !last {
                        for &ancestor in self.stack_of_open_elements[..index].iter().rev() {
                            if self.is_html(ancestor, "template") {
                                break;
                            }
                            if self.is_html(ancestor, "table") {
                                return InsertionMode::InSelectInTable;
                            }
                        }
                    }
                    return InsertionMode::InSelect;
                }
                // STEP 5
                "td" | "th" if !last => return InsertionMode::InCell,
                // STEP 6
                "tr" => return InsertionMode::InRow,
                // STEP 7
                "tbody" | "thead" | "tfoot" => return InsertionMode::InTableBody,
                // STEP 8
                "caption" => return InsertionMode::InCaption,
                // STEP 9
                "colgroup" => return InsertionMode::InColumnGroup,
                // STEP 10
                "table" => return InsertionMode::InTable,
                // STEP 11: "If node is a template element, then switch the
                //           insertion mode to the current template insertion
                //           mode and return."
                "template" => {
                    return self
                        .template_insertion_modes
                        .last()
                        .copied()
                        .unwrap_or(InsertionMode::InTemplate);
                }
                // STEP 12
                "head" if !last => return InsertionMode::InHead,
                // STEP 13
                "body" => return InsertionMode::InBody,
                // STEP 14
                "frameset" => return InsertionMode::InFrameset,
                // STEP 15: "If node is an html element, run these substeps:"
                "html" => {
                    return if self.head_element_pointer.is_none() {
                        InsertionMode::BeforeHead
                    } else {
                        InsertionMode::AfterHead
                    };
                }
                // STEP 16: "If last is true, then switch the insertion mode to
                //           "in body" and return. (fragment case)"
                _ if last => return InsertionMode::InBody,
                // STEP 17: "Let node now be the node before node in the stack
                //           of open elements."
                _ => {}
            }
        }
        InsertionMode::InBody
    }

    // ===== LIST OF ACTIVE FORMATTING ELEMENTS =====

    /// Position of `node` in the list of active formatting elements.
    pub(super) fn formatting_index_of(&self, node: NodeId) -> Option<usize> {
        self.active_formatting_elements
            .iter()
            .position(|entry| entry.node_id() == Some(node))
    }

    /// The last formatting element named `name` after the last marker.
    pub(super) fn formatting_element_after_last_marker(&self, name: &str) -> Option<usize> {
        for (i, entry) in self.active_formatting_elements.iter().enumerate().rev() {
            match entry {
                ActiveFormattingElement::Marker => return None,
                ActiveFormattingElement::Element { node_id, .. } => {
                    if self.is_html(*node_id, name) {
                        return Some(i);
                    }
                }
            }
        }
        None
    }

    pub(super) fn insert_marker(&mut self) {
        self.active_formatting_elements
            .push(ActiveFormattingElement::Marker);
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#push-onto-the-list-of-active-formatting-elements)
    ///
    /// "When the steps below require the UA to push onto the list of active
    /// formatting elements an element element, the UA must perform the
    /// following steps:"
    ///
    /// Includes the Noah's Ark clause: "If there are already three elements
    /// in the list of active formatting elements after the last marker, if
    /// any, or anywhere in the list if there are no markers, that have the
    /// same tag name, namespace, and attributes as element, then remove the
    /// earliest such element from the list of active formatting elements."
    pub(super) fn push_active_formatting_element(&mut self, node_id: NodeId, token: &Token) {
        // STEP 1: Count matching elements after the last marker.
        let mut count = 0;
        let mut earliest_match_index = None;
        for (i, entry) in self.active_formatting_elements.iter().enumerate().rev() {
            match entry {
                ActiveFormattingElement::Marker => break,
                ActiveFormattingElement::Element {
                    token: entry_token, ..
                } => {
                    if Self::same_element_tokens(entry_token, token) {
                        count += 1;
                        earliest_match_index = Some(i);
                    }
                }
            }
        }

        // STEP 2: If 3 or more matches, remove the earliest.
        if count >= 3
            && let Some(index) = earliest_match_index
        {
            let _ = self.active_formatting_elements.remove(index);
        }

        // STEP 3: Push the new entry.
        self.active_formatting_elements
            .push(ActiveFormattingElement::Element {
                node_id,
                token: token.clone(),
            });
    }

    /// "the same tag name, namespace, and attributes": attributes compare as
    /// sets, regardless of order.
    fn same_element_tokens(a: &Token, b: &Token) -> bool {
        a.tag_name() == b.tag_name()
            && a.attributes().len() == b.attributes().len()
            && a
                .attributes()
                .iter()
                .all(|attr| b.attribute(&attr.name) == Some(attr.value.as_str()))
    }

    /// [§ 13.2.4.3 Reconstruct the active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#reconstruct-the-active-formatting-elements)
    ///
    /// "When the steps below require the UA to reconstruct the active formatting
    /// elements, the UA must perform the following steps:"
    pub(super) fn reconstruct_active_formatting_elements(&mut self) {
        // STEP 1: "If there are no entries in the list of active formatting
        //          elements, then there is nothing to reconstruct; stop this
        //          algorithm."
        // STEP 2: "If the last (most recently added) entry in the list of active
        //          formatting elements is a marker, or if it is an element that
        //          is in the stack of open elements, then there is nothing to
        //          reconstruct; stop this algorithm."
        let Some(last) = self.active_formatting_elements.last() else {
            return;
        };
        if self.is_marker_or_open(last) {
            return;
        }

        // STEP 3: "Let entry be the last (most recently added) element in the
        //          list of active formatting elements."
        let mut entry_index = self.active_formatting_elements.len() - 1;

        // STEP 4-6: "Rewind: If there are no entries before entry in the list
        //           of active formatting elements, then jump to the step
        //           labeled create. Let entry be the entry one earlier than
        //           entry in the list of active formatting elements. If entry
        //           is neither a marker nor an element that is also in the
        //           stack of open elements, go to the step labeled rewind."
        while entry_index > 0 {
            if self.is_marker_or_open(&self.active_formatting_elements[entry_index - 1]) {
                break;
            }
            entry_index -= 1;
        }

        // STEP 7-10: "Advance ... Create: Insert an HTML element for the token
        //            for which the element entry was created, to obtain new
        //            element. Replace the entry for entry in the list with an
        //            entry for new element. If the entry for new element in the
        //            list of active formatting elements is not the last entry
        //            in the list, return to the step labeled advance."
        for index in entry_index..self.active_formatting_elements.len() {
            let ActiveFormattingElement::Element { token, .. } =
                &self.active_formatting_elements[index]
            else {
                continue;
            };
            let token = token.clone();
            let node_id = self.insert_html_element(&token);
            self.active_formatting_elements[index] =
                ActiveFormattingElement::Element { node_id, token };
        }
    }

    fn is_marker_or_open(&self, entry: &ActiveFormattingElement) -> bool {
        match entry {
            ActiveFormattingElement::Marker => true,
            ActiveFormattingElement::Element { node_id, .. } => {
                self.stack_of_open_elements.contains(node_id)
            }
        }
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-list-of-active-formatting-elements-up-to-the-last-marker)
    ///
    /// "1. Let entry be the last (most recently added) entry in the list.
    /// 2. Remove entry from the list.
    /// 3. If entry was a marker, stop. Otherwise, go to step 1."
    pub(super) fn clear_active_formatting_elements_to_last_marker(&mut self) {
        while let Some(entry) = self.active_formatting_elements.pop() {
            if matches!(entry, ActiveFormattingElement::Marker) {
                break;
            }
        }
    }

    pub(super) fn remove_from_active_formatting_elements(&mut self, node: NodeId) {
        if let Some(index) = self.formatting_index_of(node) {
            let _ = self.active_formatting_elements.remove(index);
        }
    }
}
