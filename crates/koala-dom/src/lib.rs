//! DOM tree implementation for the Koala HTML parser.
//!
//! This crate provides an arena-based DOM tree structure following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/). The HTML tree builder
//! is its only writer; everything else reads it.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues. Nodes
//! detached from the tree (by the adoption agency algorithm, or a fragment
//! parse's synthetic root) stay allocated in the arena but are unreachable
//! from [`NodeId::ROOT`].

use std::collections::HashSet;
use std::fmt;

/// A type-safe index into the DOM tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
/// "Each node has an associated node document..."
///
/// NodeId provides O(1) access to any node in the tree without borrowing issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root (document or fragment) node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// [§ 1.1 Namespaces](https://infra.spec.whatwg.org/#namespaces)
///
/// The namespaces an element or attribute can live in after tree construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// "The HTML namespace is "http://www.w3.org/1999/xhtml"."
    Html,
    /// "The SVG namespace is "http://www.w3.org/2000/svg"."
    Svg,
    /// "The MathML namespace is "http://www.w3.org/1998/Math/MathML"."
    MathMl,
    /// "The XLink namespace is "http://www.w3.org/1999/xlink"."
    XLink,
    /// "The XML namespace is "http://www.w3.org/XML/1998/namespace"."
    Xml,
    /// "The XMLNS namespace is "http://www.w3.org/2000/xmlns/"."
    Xmlns,
}

impl Namespace {
    /// The namespace URL.
    #[must_use]
    pub const fn url(self) -> &'static str {
        match self {
            Self::Html => "http://www.w3.org/1999/xhtml",
            Self::Svg => "http://www.w3.org/2000/svg",
            Self::MathMl => "http://www.w3.org/1998/Math/MathML",
            Self::XLink => "http://www.w3.org/1999/xlink",
            Self::Xml => "http://www.w3.org/XML/1998/namespace",
            Self::Xmlns => "http://www.w3.org/2000/xmlns/",
        }
    }

    /// Short name used by tree dumps (`svg path`, `math mi`).
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Svg => "svg",
            Self::MathMl => "math",
            Self::XLink => "xlink",
            Self::Xml => "xml",
            Self::Xmlns => "xmlns",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url())
    }
}

/// [§ 7.1 Document modes](https://dom.spec.whatwg.org/#concept-document-mode)
///
/// "Unless stated otherwise, a document's mode is "no-quirks"."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentMode {
    /// "no-quirks"
    #[default]
    NoQuirks,
    /// "quirks"
    Quirks,
    /// "limited-quirks"
    LimitedQuirks,
}

/// [§ 4.9.2 Interface Attr](https://dom.spec.whatwg.org/#interface-attr)
///
/// "Attr nodes are simply known as attributes. They are sometimes referred to
/// as content attributes to avoid confusion with IDL attributes."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    /// "An attribute has a local name"
    pub local_name: String,
    /// "An attribute has a namespace (null or a non-empty string)"
    pub namespace: Option<Namespace>,
    /// "An attribute has a namespace prefix (null or a non-empty string)"
    pub prefix: Option<String>,
    /// "An attribute has a value"
    pub value: String,
}

impl Attr {
    /// A plain attribute with no namespace.
    pub fn new(local_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            namespace: None,
            prefix: None,
            value: value.into(),
        }
    }

    /// [§ 4.9.2](https://dom.spec.whatwg.org/#concept-attribute-qualified-name)
    ///
    /// "An attribute's qualified name is its local name if its namespace prefix
    /// is null, and its namespace prefix, followed by ":", followed by its
    /// local name, otherwise."
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.local_name),
            None => self.local_name.clone(),
        }
    }
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
///
/// This node stores indices for parent/child/sibling relationships,
/// enabling O(1) traversal in any direction.
#[derive(Debug, Clone)]
pub struct Node {
    /// "Each node has an associated node type"
    pub node_type: NodeType,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    pub parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children"
    pub children: Vec<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-next-sibling)
    pub next_sibling: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    pub prev_sibling: Option<NodeId>,
}

/// [§ 4.6 Interface DocumentType](https://dom.spec.whatwg.org/#interface-documenttype)
///
/// "Doctypes have an associated name, public ID, and system ID."
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentTypeData {
    /// The doctype name (`html`), empty when the token had none.
    pub name: String,
    /// The public identifier, empty when missing.
    pub public_id: String,
    /// The system identifier, empty when missing.
    pub system_id: String,
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Each node has an associated node type"
#[derive(Debug, Clone)]
pub enum NodeType {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.7 Interface DocumentFragment](https://dom.spec.whatwg.org/#interface-documentfragment)
    DocumentFragment,
    /// [§ 4.6 Interface DocumentType](https://dom.spec.whatwg.org/#interface-documenttype)
    DocumentType(DocumentTypeData),
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    Element(ElementData),
    /// [§ 4.11 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    Text(String),
    /// [§ 4.12 Interface CDATASection](https://dom.spec.whatwg.org/#interface-cdatasection)
    CdataSection(String),
    /// [§ 4.13 Interface ProcessingInstruction](https://dom.spec.whatwg.org/#interface-processinginstruction)
    ProcessingInstruction {
        /// "ProcessingInstruction nodes have an associated target."
        target: String,
        /// The node's data.
        data: String,
    },
    /// [§ 4.14 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment(String),
}

/// Element-specific data.
///
/// Per [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element):
/// "Elements have an associated namespace, namespace prefix, local name, ..."
///
/// The parser never creates prefixed elements, so only the local name and
/// namespace are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// "An element's local name"
    pub tag_name: String,
    /// "An element's namespace"
    pub namespace: Namespace,
    /// "An element has an associated attribute list", in insertion order.
    pub attrs: Vec<Attr>,
}

impl ElementData {
    /// An element with no attributes.
    pub fn new(tag_name: impl Into<String>, namespace: Namespace) -> Self {
        Self {
            tag_name: tag_name.into(),
            namespace,
            attrs: Vec::new(),
        }
    }

    /// [§ 4.9 get an attribute by name](https://dom.spec.whatwg.org/#concept-element-attributes-get-by-name)
    ///
    /// "Return the first attribute in element's attribute list whose qualified
    /// name is qualifiedName; otherwise null."
    #[must_use]
    pub fn get_attribute(&self, qualified_name: &str) -> Option<&str> {
        self.find_attribute(qualified_name).map(|a| a.value.as_str())
    }

    /// Whether an attribute with this qualified name is present.
    #[must_use]
    pub fn has_attribute(&self, qualified_name: &str) -> bool {
        self.find_attribute(qualified_name).is_some()
    }

    /// Look up an attribute by namespace and local name.
    #[must_use]
    pub fn get_attribute_ns(
        &self,
        namespace: Option<Namespace>,
        local_name: &str,
    ) -> Option<&Attr> {
        self.attrs
            .iter()
            .find(|a| a.namespace == namespace && a.local_name == local_name)
    }

    /// Append `attr` unless an attribute with the same qualified name exists.
    ///
    /// Returns whether the attribute was added. The tree builder uses this when
    /// merging attributes from a stray `<html>` or `<body>` start tag onto the
    /// existing element ("if the attribute is not already present").
    pub fn add_attribute_if_missing(&mut self, attr: Attr) -> bool {
        let qualified_name = attr.qualified_name();
        if self.has_attribute(&qualified_name) {
            return false;
        }
        self.attrs.push(attr);
        true
    }

    /// Returns the element's id attribute value if present.
    ///
    /// Per [§ 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes):
    /// "The id attribute specifies its element's unique identifier (ID)."
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.get_attribute("id")
    }

    /// Returns the set of class names from the class attribute.
    ///
    /// "The class attribute, if specified, must have a value that is a set of
    /// space-separated tokens representing the various classes that the element belongs to."
    #[must_use]
    pub fn classes(&self) -> HashSet<&str> {
        self.get_attribute("class")
            .map(|list| list.split_ascii_whitespace().collect())
            .unwrap_or_default()
    }

    fn find_attribute(&self, qualified_name: &str) -> Option<&Attr> {
        self.attrs.iter().find(|a| match &a.prefix {
            Some(prefix) => qualified_name
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix(':'))
                .is_some_and(|local| local == a.local_name),
            None => a.local_name == qualified_name,
        })
    }
}

/// Arena-based DOM tree with O(1) node access and traversal.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// "The DOM represents a document as a tree."
#[derive(Debug, Clone)]
pub struct DomTree {
    /// All nodes in the tree, indexed by NodeId.
    /// The Document (or DocumentFragment) node is always at index 0.
    nodes: Vec<Node>,
    mode: DocumentMode,
}

impl DomTree {
    /// Create a new DOM tree with just the Document node.
    #[must_use]
    pub fn new() -> Self {
        Self::with_root(NodeType::Document)
    }

    /// Create a new tree whose root is a DocumentFragment.
    #[must_use]
    pub fn new_fragment() -> Self {
        Self::with_root(NodeType::DocumentFragment)
    }

    fn with_root(node_type: NodeType) -> Self {
        Self {
            nodes: vec![Node {
                node_type,
                parent: None,
                children: Vec::new(),
                next_sibling: None,
                prev_sibling: None,
            }],
            mode: DocumentMode::default(),
        }
    }

    /// Get the root node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Whether the root is a DocumentFragment.
    #[must_use]
    pub fn is_fragment(&self) -> bool {
        matches!(self.nodes[0].node_type, NodeType::DocumentFragment)
    }

    /// The document's quirks mode.
    #[must_use]
    pub const fn mode(&self) -> DocumentMode {
        self.mode
    }

    /// Set the document's quirks mode.
    pub const fn set_mode(&mut self, mode: DocumentMode) {
        self.mode = mode;
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Get the number of allocated nodes, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (it always holds at least the root).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        });
        id
    }

    /// [§ 4.2.3 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before null."
    ///
    /// Appends `child` as the last child of `parent`. A child that is already
    /// attached elsewhere is removed from its old parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        self.relink_children(parent);
    }

    /// [§ 4.2.3 Insert](https://dom.spec.whatwg.org/#concept-node-insert)
    ///
    /// Inserts `child` into `parent` immediately before `reference`. If
    /// `reference` is not a child of `parent`, `child` is appended instead.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        self.detach(child);
        let position = self.nodes[parent.0]
            .children
            .iter()
            .position(|&id| id == reference);
        match position {
            Some(index) => self.nodes[parent.0].children.insert(index, child),
            None => self.nodes[parent.0].children.push(child),
        }
        self.nodes[child.0].parent = Some(parent);
        self.relink_children(parent);
    }

    /// [§ 4.2.3 Remove](https://dom.spec.whatwg.org/#concept-node-remove)
    ///
    /// Removes `child` from `parent`. The node stays allocated.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        let before = self.nodes[parent.0].children.len();
        self.nodes[parent.0].children.retain(|&id| id != child);
        if self.nodes[parent.0].children.len() == before {
            return;
        }
        let node = &mut self.nodes[child.0];
        node.parent = None;
        node.next_sibling = None;
        node.prev_sibling = None;
        self.relink_children(parent);
    }

    /// Remove `child` from whatever parent it currently has, if any.
    pub fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.nodes[child.0].parent {
            self.remove_child(parent, child);
        }
    }

    /// Move every child of `from` to the end of `to`, keeping their order.
    ///
    /// Used by the adoption agency algorithm: "Take all of the child nodes of
    /// furthest block and append them to the element created in the last step."
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        let moved = std::mem::take(&mut self.nodes[from.0].children);
        if moved.is_empty() {
            return;
        }
        for &child in &moved {
            self.nodes[child.0].parent = Some(to);
        }
        self.nodes[to.0].children.extend(moved);
        self.relink_children(to);
    }

    /// Recompute the sibling links of every child of `parent`.
    fn relink_children(&mut self, parent: NodeId) {
        let children = self.nodes[parent.0].children.clone();
        for (i, &child) in children.iter().enumerate() {
            let node = &mut self.nodes[child.0];
            node.prev_sibling = i.checked_sub(1).map(|p| children[p]);
            node.next_sibling = children.get(i + 1).copied();
        }
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// [§ 4.2.6 Descendant](https://dom.spec.whatwg.org/#concept-tree-descendant)
    ///
    /// Check if `descendant` is a descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over all descendants of `id` in tree order (pre-order),
    /// excluding `id` itself.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        DescendantIterator { tree: self, stack }
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get mutable element data if this node is an element.
    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(|n| match &mut n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// [§ 4.4 textContent](https://dom.spec.whatwg.org/#dom-node-textcontent)
    ///
    /// The concatenation of the data of all Text and CDATA section
    /// descendants, in tree order. For a text-like node, its own data.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        match self.get(id).map(|n| &n.node_type) {
            Some(NodeType::Text(s) | NodeType::CdataSection(s) | NodeType::Comment(s)) => {
                s.clone()
            }
            Some(NodeType::ProcessingInstruction { data, .. }) => data.clone(),
            Some(_) => self
                .descendants(id)
                .filter_map(|d| match &self.nodes[d.0].node_type {
                    NodeType::Text(s) | NodeType::CdataSection(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect(),
            None => String::new(),
        }
    }

    /// [§ 3.1.1 The document element](https://html.spec.whatwg.org/multipage/dom.html#the-html-element-2)
    ///
    /// "The document element of a document is the element whose parent is that
    /// document, if it exists; otherwise null."
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .find(|&&id| self.as_element(id).is_some())
            .copied()
    }

    /// The document's DocumentType child, if any.
    #[must_use]
    pub fn doctype(&self) -> Option<&DocumentTypeData> {
        self.children(NodeId::ROOT).iter().find_map(|&id| {
            match self.get(id).map(|n| &n.node_type) {
                Some(NodeType::DocumentType(data)) => Some(data),
                _ => None,
            }
        })
    }

    /// [§ 3.1.3 The head element](https://html.spec.whatwg.org/multipage/dom.html#the-head-element-2)
    ///
    /// "The head element of a document is the first head element that is a
    /// child of the html element, if there is one, or null otherwise."
    #[must_use]
    pub fn head(&self) -> Option<NodeId> {
        self.html_child_named(&["head"])
    }

    /// [§ 3.1.3 The body element](https://html.spec.whatwg.org/multipage/dom.html#the-body-element-2)
    ///
    /// "The body element of a document is the first of the html element's children
    /// that is either a body element or a frameset element, or null if there is
    /// no such element."
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        self.html_child_named(&["body", "frameset"])
    }

    fn html_child_named(&self, names: &[&str]) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .iter()
            .find(|&&id| {
                self.as_element(id).is_some_and(|e| {
                    e.namespace == Namespace::Html && names.contains(&e.tag_name.as_str())
                })
            })
            .copied()
    }

    /// [§ 4.2.4 getElementById](https://dom.spec.whatwg.org/#dom-nonelementparentnode-getelementbyid)
    ///
    /// "The getElementById(elementId) method steps are to return the first
    /// element, in tree order, within this's descendants, whose ID is elementId."
    #[must_use]
    pub fn get_element_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.descendants(NodeId::ROOT)
            .find(|&id| self.as_element(id).and_then(ElementData::id) == Some(element_id))
    }

    /// [§ 4.4 getElementsByTagName](https://dom.spec.whatwg.org/#concept-getelementsbytagname)
    ///
    /// Elements under `root` whose local name equals `tag_name`, in tree order.
    /// Matching is exact, so `animateColor` only matches the camel-cased SVG
    /// element.
    #[must_use]
    pub fn get_elements_by_tag_name(&self, root: NodeId, tag_name: &str) -> Vec<NodeId> {
        self.descendants(root)
            .filter(|&id| self.as_element(id).is_some_and(|e| e.tag_name == tag_name))
            .collect()
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Pre-order iterator over the descendants of a node.
pub struct DescendantIterator<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
