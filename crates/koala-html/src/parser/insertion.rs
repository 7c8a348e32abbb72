//! [§ 13.2.6.1 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#creating-and-inserting-nodes)

use koala_dom::{DocumentTypeData, ElementData, Namespace, NodeId, NodeType};

use super::core::{HTMLParser, InsertionMode};
use super::foreign_content::{adjusted_tag_name, foreign_attributes, html_attributes};
use crate::tokenizer::{Token, TokenizerState};

/// A position in the tree: inside `parent`, before `before` or, when
/// `before` is `None`, after its last child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct InsertionLocation {
    pub(super) parent: NodeId,
    pub(super) before: Option<NodeId>,
}

impl InsertionLocation {
    pub(super) const fn append_to(parent: NodeId) -> Self {
        Self {
            parent,
            before: None,
        }
    }
}

impl HTMLParser {
    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#appropriate-place-for-inserting-a-node)
    ///
    /// "The appropriate place for inserting a node, optionally using a
    /// particular override target, is the position in an element returned by
    /// running the following steps:"
    pub(super) fn appropriate_place_for_inserting(
        &self,
        override_target: Option<NodeId>,
    ) -> InsertionLocation {
        // STEP 1: "If there was an override target specified, then let target
        //          be the override target. Otherwise, let target be the
        //          current node."
        let Some(target) = override_target.or_else(|| self.current_node()) else {
            return InsertionLocation::append_to(NodeId::ROOT);
        };

        // STEP 2: "Determine the adjusted insertion location using the first
        //          matching steps from the following list:"
        //
        // "If foster parenting is enabled and target is a table, tbody, tfoot,
        //  thead, or tr element"
        if self.foster_parenting
            && self.is_html_one_of(target, &["table", "tbody", "tfoot", "thead", "tr"])
        {
            tracing::debug!("foster parenting");
            return self.foster_parent_location();
        }

        // "Otherwise: Let adjusted insertion location be inside target, after
        //  its last child (if any)."
        //
        // STEP 3: template contents are kept as the template's own children.
        InsertionLocation::append_to(target)
    }

    /// The foster parenting branch of the appropriate place for inserting a node.
    fn foster_parent_location(&self) -> InsertionLocation {
        // STEP 2.1: "Let last template be the last template element in the
        //            stack of open elements, if any."
        let last_template = self
            .stack_of_open_elements
            .iter()
            .rposition(|&id| self.is_html(id, "template"));

        // STEP 2.2: "Let last table be the last table element in the stack of
        //            open elements, if any."
        let last_table = self
            .stack_of_open_elements
            .iter()
            .rposition(|&id| self.is_html(id, "table"));

        // STEP 2.3: "If there is a last template and either there is no last
        //            table, or there is one, but last template is lower (more
        //            recently added) than last table in the stack of open
        //            elements, then: let adjusted insertion location be inside
        //            last template's template contents, after its last child
        //            (if any), and abort these steps."
        if let Some(template_index) = last_template
            && last_table.is_none_or(|table_index| template_index > table_index)
        {
            return InsertionLocation::append_to(self.stack_of_open_elements[template_index]);
        }

        // STEP 2.4: "If there is no last table, then let adjusted insertion
        //            location be inside the first element in the stack of open
        //            elements (the html element), after its last child (if any),
        //            and abort these steps. (fragment case)"
        let Some(table_index) = last_table else {
            let html = self
                .stack_of_open_elements
                .first()
                .copied()
                .unwrap_or(NodeId::ROOT);
            return InsertionLocation::append_to(html);
        };
        let table = self.stack_of_open_elements[table_index];

        // STEP 2.5: "If last table has a parent node, then let adjusted
        //            insertion location be inside last table's parent node,
        //            immediately before last table, and abort these steps."
        if let Some(parent) = self.tree.parent(table) {
            return InsertionLocation {
                parent,
                before: Some(table),
            };
        }

        // STEP 2.6: "Let previous element be the element immediately above
        //            last table in the stack of open elements."
        // STEP 2.7: "Let adjusted insertion location be inside previous
        //            element, after its last child (if any)."
        let previous = table_index
            .checked_sub(1)
            .map_or(NodeId::ROOT, |i| self.stack_of_open_elements[i]);
        InsertionLocation::append_to(previous)
    }

    pub(super) fn insert_node_at(&mut self, location: InsertionLocation, node: NodeId) {
        match location.before {
            Some(reference) => self.tree.insert_before(location.parent, node, reference),
            None => self.tree.append_child(location.parent, node),
        }
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#create-an-element-for-the-token)
    ///
    /// "Create an element for a token" in `namespace`. Tag and attribute
    /// names are adjusted for foreign elements. The element is not inserted.
    pub(super) fn create_element_for_token(
        &mut self,
        token: &Token,
        namespace: Namespace,
    ) -> NodeId {
        let (name, attributes) = match token {
            Token::StartTag {
                name, attributes, ..
            } => (name.as_str(), attributes.as_slice()),
            _ => {
                debug_assert!(false, "create_element_for_token called with {token}");
                ("", &[][..])
            }
        };
        let element = match namespace {
            Namespace::Html => ElementData {
                tag_name: name.to_string(),
                namespace,
                attrs: html_attributes(attributes),
            },
            _ => ElementData {
                tag_name: adjusted_tag_name(namespace, name).to_string(),
                namespace,
                attrs: foreign_attributes(namespace, attributes),
            },
        };
        self.tree.alloc(NodeType::Element(element))
    }

    /// [§ 13.2.6.1 Insert a foreign element](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-foreign-element)
    ///
    /// "When the steps below require the user agent to insert a foreign element
    /// for a token in a given namespace and with a boolean onlyAddToElementStack,
    /// the user agent must run these steps:"
    pub(super) fn insert_foreign_element(
        &mut self,
        token: &Token,
        namespace: Namespace,
        only_add_to_element_stack: bool,
    ) -> NodeId {
        // STEP 1: "Let the adjusted insertion location be the appropriate place
        //          for inserting a node."
        let location = self.appropriate_place_for_inserting(None);

        // STEP 2: "Let element be the result of creating an element for the
        //          token in the given namespace, with the intended parent being
        //          the element in which the adjusted insertion location finds
        //          itself."
        let element = self.create_element_for_token(token, namespace);

        // STEP 3: "If onlyAddToElementStack is false, then run insert an
        //          element at the adjusted insertion location with element."
        if !only_add_to_element_stack {
            self.insert_node_at(location, element);
        }

        // STEP 4: "Push element onto the stack of open elements so that it is
        //          the new current node."
        self.stack_of_open_elements.push(element);

        // STEP 5: "Return element."
        element
    }

    /// [§ 13.2.6.1 Insert an HTML element](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
    ///
    /// "When the steps below require the user agent to insert an HTML element
    /// for a token, the user agent must insert a foreign element for the token,
    /// in the HTML namespace."
    pub(super) fn insert_html_element(&mut self, token: &Token) -> NodeId {
        self.insert_foreign_element(token, Namespace::Html, false)
    }

    /// Insert an HTML element for a start tag token with no attributes.
    pub(super) fn insert_html_element_named(&mut self, name: &str) -> NodeId {
        self.insert_html_element(&Token::start_tag(name))
    }

    /// Insert the element and pop it straight away, acknowledging the
    /// token's self-closing flag.
    pub(super) fn insert_void_html_element(&mut self, token: &Token) {
        let _ = self.insert_html_element(token);
        let _ = self.stack_of_open_elements.pop();
        self.acknowledge_self_closing_flag();
    }

    pub(super) const fn acknowledge_self_closing_flag(&mut self) {
        self.self_closing_acknowledged = true;
    }

    /// [§ 13.2.6.1 Insert a character](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    ///
    /// "When the steps below require the user agent to insert a character
    /// while processing a token, the user agent must run the following steps..."
    pub(super) fn insert_character(&mut self, c: char) {
        // STEP 1: "Let data be the characters passed to the algorithm, or, if
        //          no characters were explicitly specified, the character of
        //          the character token being processed."
        // STEP 2: "Let the adjusted insertion location be the appropriate place
        //          for inserting a node."
        let location = self.appropriate_place_for_inserting(None);

        // STEP 3: "If the adjusted insertion location is inside a Document
        //          node, then ignore the token."
        if matches!(
            self.tree.get(location.parent).map(|node| &node.node_type),
            Some(NodeType::Document)
        ) {
            return;
        }

        // STEP 4: "If there is a Text node immediately before the adjusted
        //          insertion location, then append data to that Text node's data."
        let previous = match location.before {
            Some(reference) => self.tree.prev_sibling(reference),
            None => self.tree.last_child(location.parent),
        };
        if let Some(text_id) = previous
            && let Some(node) = self.tree.get_mut(text_id)
            && let NodeType::Text(ref mut text) = node.node_type
        {
            text.push(c);
            return;
        }

        // "Otherwise, create a new Text node whose data is data and whose node
        //  document is the same as that of the element in which the adjusted
        //  insertion location finds itself, and insert the newly created node
        //  at the adjusted insertion location."
        let text_id = self.tree.alloc(NodeType::Text(String::from(c)));
        self.insert_node_at(location, text_id);
    }

    /// [§ 13.2.6.1 Insert a comment](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-comment)
    ///
    /// "When the steps below require the user agent to insert a comment while
    /// processing a comment token, optionally with an explicitly insertion
    /// position position, the user agent must run the following steps:"
    ///
    /// Processing instruction tokens go through here as well. One whose
    /// target is `xml` is an XML declaration and produces no node.
    pub(super) fn insert_comment(&mut self, token: &Token, position: Option<InsertionLocation>) {
        let node_type = match token {
            Token::Comment { data } => NodeType::Comment(data.clone()),
            Token::ProcessingInstruction { target, .. } if target.eq_ignore_ascii_case("xml") => {
                return;
            }
            Token::ProcessingInstruction { target, data } => NodeType::ProcessingInstruction {
                target: target.clone(),
                data: data.clone(),
            },
            _ => {
                debug_assert!(false, "insert_comment called with {token}");
                return;
            }
        };

        // STEP 2: "If position was specified, then let the adjusted insertion
        //          location be position. Otherwise, let adjusted insertion
        //          location be the appropriate place for inserting a node."
        let location = position.unwrap_or_else(|| self.appropriate_place_for_inserting(None));

        // STEP 3: "Create a Comment node whose data attribute is set to data
        //          and whose node document is the same as that of the node in
        //          which the adjusted insertion location finds itself."
        let comment_id = self.tree.alloc(node_type);

        // STEP 4: "Insert the newly created node at the adjusted insertion location."
        self.insert_node_at(location, comment_id);
    }

    /// "Insert a comment as the last child of the Document object."
    pub(super) fn insert_comment_to_document(&mut self, token: &Token) {
        self.insert_comment(token, Some(InsertionLocation::append_to(NodeId::ROOT)));
    }

    /// Insert a CDATA section node at the appropriate place.
    pub(super) fn insert_cdata_section(&mut self, data: &str) {
        let location = self.appropriate_place_for_inserting(None);
        let node = self.tree.alloc(NodeType::CdataSection(data.to_string()));
        self.insert_node_at(location, node);
    }

    /// [§ 13.2.6.4.1](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    ///
    /// "Append a DocumentType node to the Document node, with its name set to
    /// the name given in the DOCTYPE token, or the empty string if the name was
    /// missing; its public ID set to the public identifier given in the DOCTYPE
    /// token, or the empty string if the public identifier was missing; and its
    /// system ID set to the system identifier given in the DOCTYPE token, or
    /// the empty string if the system identifier was missing."
    pub(super) fn insert_doctype(
        &mut self,
        name: Option<&str>,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) {
        let doctype = self.tree.alloc(NodeType::DocumentType(DocumentTypeData {
            name: name.unwrap_or_default().to_string(),
            public_id: public_id.unwrap_or_default().to_string(),
            system_id: system_id.unwrap_or_default().to_string(),
        }));
        self.tree.append_child(NodeId::ROOT, doctype);
    }

    /// [§ 13.2.6.2 Parsing elements that contain only text](https://html.spec.whatwg.org/multipage/parsing.html#parsing-elements-that-contain-only-text)
    ///
    /// "The generic raw text element parsing algorithm and the generic RCDATA
    /// element parsing algorithm consist of the following steps."
    pub(super) fn parse_text_only_element(&mut self, token: &Token, state: TokenizerState) {
        // STEP 1: "Insert an HTML element for the token."
        let _ = self.insert_html_element(token);

        // STEP 2: "If the algorithm that was invoked is the generic raw text
        //          element parsing algorithm, switch the tokenizer to the
        //          RAWTEXT state; otherwise the algorithm invoked was the
        //          generic RCDATA element parsing algorithm, switch the
        //          tokenizer to the RCDATA state."
        self.tokenizer.set_state(state);

        // STEP 3: "Set the original insertion mode to the current insertion mode."
        self.original_insertion_mode = Some(self.insertion_mode);

        // STEP 4: "Then, switch the insertion mode to "text"."
        self.switch_mode(InsertionMode::Text);
    }

    /// Generic raw text element parsing.
    pub(super) fn parse_raw_text_element(&mut self, token: &Token) {
        self.parse_text_only_element(token, TokenizerState::RAWTEXT);
    }

    /// Generic RCDATA element parsing.
    pub(super) fn parse_rcdata_element(&mut self, token: &Token) {
        self.parse_text_only_element(token, TokenizerState::RCDATA);
    }
}
