use strum_macros::Display;

use koala_common::warning::clear_warnings;
use koala_dom::{DomTree, Namespace, NodeId, NodeType};

use crate::ParseOutput;
use crate::config::ParserConfig;
use crate::error::{ErrorSink, ParseError};
use crate::tokenizer::{HTMLTokenizer, Position, Token};

/// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
///
/// "The insertion mode is a state variable that controls the primary operation
/// of the tree construction stage."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum InsertionMode {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    Initial,
    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    BeforeHtml,
    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    BeforeHead,
    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    InHead,
    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    InHeadNoscript,
    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    AfterHead,
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    InBody,
    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    Text,
    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    InTable,
    /// [§ 13.2.6.4.10 The "in table text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intabletext)
    InTableText,
    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    InCaption,
    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolumngroup)
    InColumnGroup,
    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intablebody)
    InTableBody,
    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inrow)
    InRow,
    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incell)
    InCell,
    /// [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    InSelect,
    /// [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    InSelectInTable,
    /// [§ 13.2.6.4.18 The "in template" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intemplate)
    InTemplate,
    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    AfterBody,
    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    InFrameset,
    /// [§ 13.2.6.4.21 The "after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    AfterFrameset,
    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    AfterAfterBody,
    /// [§ 13.2.6.4.23 The "after after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    AfterAfterFrameset,
}

/// [§ 13.2.4.3 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
///
/// "The list of active formatting elements... is used to handle mis-nested
/// formatting element tags."
///
/// The list contains entries that are either elements or markers.
#[derive(Debug, Clone)]
pub enum ActiveFormattingElement {
    /// A formatting element entry.
    ///
    /// Formatting elements are: a, b, big, code, em, font, i, nobr, s, small,
    /// strike, strong, tt, u.
    Element {
        /// The `NodeId` of the element in the DOM tree.
        node_id: NodeId,
        /// The original token, kept to recreate the element during the
        /// adoption agency algorithm or when reconstructing.
        token: Token,
    },
    /// "A marker is an entry in the list of active formatting elements that is
    /// distinct from any element."
    ///
    /// Markers are pushed when entering: applet, object, marquee, template,
    /// td, th, caption.
    Marker,
}

impl ActiveFormattingElement {
    /// The element of this entry, `None` for a marker.
    #[must_use]
    pub const fn node_id(&self) -> Option<NodeId> {
        match self {
            Self::Element { node_id, .. } => Some(*node_id),
            Self::Marker => None,
        }
    }
}

/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
///
/// The HTML parser pulls tokens from its tokenizer one at a time and builds a
/// DOM tree from them, feeding tokenizer state changes back after each token.
pub struct HTMLParser {
    /// The tokenizer this parser pulls from.
    pub(super) tokenizer: HTMLTokenizer,

    /// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
    pub(super) insertion_mode: InsertionMode,

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#original-insertion-mode)
    ///
    /// "When the insertion mode is switched to "text" or "in table text", the
    /// original insertion mode is also set. This is the insertion mode to which
    /// the tree construction stage will return."
    pub(super) original_insertion_mode: Option<InsertionMode>,

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#stack-of-template-insertion-modes)
    ///
    /// "The current template insertion mode is the insertion mode that was
    /// most recently pushed onto the stack of template insertion modes."
    pub(super) template_insertion_modes: Vec<InsertionMode>,

    /// [§ 13.2.4.2 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    ///
    /// Stores `NodeId`s into the arena. Index 0 is the html element.
    pub(super) stack_of_open_elements: Vec<NodeId>,

    /// [§ 13.2.4.3 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
    ///
    /// Initially, the list is empty.
    pub(super) active_formatting_elements: Vec<ActiveFormattingElement>,

    /// [§ 13.2.4.4 The element pointers](https://html.spec.whatwg.org/multipage/parsing.html#the-element-pointers)
    pub(super) head_element_pointer: Option<NodeId>,

    /// [§ 13.2.4.4](https://html.spec.whatwg.org/multipage/parsing.html#form-element-pointer)
    ///
    /// "The form element pointer points to the last form element that was opened
    /// and whose end tag has not yet been seen."
    pub(super) form_element_pointer: Option<NodeId>,

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#concept-frag-parse-context)
    ///
    /// Set only when parsing a fragment. The element is allocated in the arena
    /// but never attached.
    pub(super) context_element: Option<NodeId>,

    /// DOM tree with parent/sibling pointers.
    /// `NodeId::ROOT` (index 0) is the Document (or DocumentFragment) node.
    pub(super) tree: DomTree,

    /// [§ 13.2.4.5 Other parsing state flags](https://html.spec.whatwg.org/multipage/parsing.html#frameset-ok-flag)
    ///
    /// "The frameset-ok flag is set to "ok" when the parser is created."
    pub(super) frameset_ok: bool,

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
    pub(super) foster_parenting: bool,

    /// [§ 13.2.6.4.10](https://html.spec.whatwg.org/multipage/parsing.html#concept-pending-table-char-tokens)
    ///
    /// "The pending table character tokens list"
    pub(super) pending_table_character_tokens: String,

    /// "If the next token is a U+000A LINE FEED (LF) character token, then
    /// ignore that token and move on to the next one."
    pub(super) skip_next_line_feed: bool,

    /// [§ 13.2.5.40](https://html.spec.whatwg.org/multipage/parsing.html#acknowledge-self-closing-flag)
    pub(super) self_closing_acknowledged: bool,

    /// Whether we've stopped parsing.
    pub(super) stopped: bool,

    pub(super) errors: ErrorSink,

    /// Source position of the token being processed.
    pub(super) token_position: Position,
}

impl HTMLParser {
    /// Create a parser for a complete document.
    pub fn new(input: &str) -> Self {
        // DomTree::new() creates the Document node at NodeId::ROOT
        Self::with_tree(input, DomTree::new())
    }

    pub(super) fn with_tree(input: &str, tree: DomTree) -> Self {
        Self {
            tokenizer: HTMLTokenizer::new(input),
            insertion_mode: InsertionMode::Initial,
            original_insertion_mode: None,
            template_insertion_modes: Vec::new(),
            stack_of_open_elements: Vec::new(),
            active_formatting_elements: Vec::new(),
            head_element_pointer: None,
            form_element_pointer: None,
            context_element: None,
            tree,
            frameset_ok: true,
            foster_parenting: false,
            pending_table_character_tokens: String::new(),
            skip_next_line_feed: false,
            self_closing_acknowledged: false,
            stopped: false,
            errors: ErrorSink::new(),
            token_position: Position::START,
        }
    }

    /// Apply `config`. Call before running the parser.
    #[must_use]
    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.errors = ErrorSink::with_options(config.max_errors, config.log_errors);
        self.tokenizer.set_log_errors(config.log_errors);
        self
    }

    /// Run the parser and return the DOM tree.
    #[must_use]
    pub fn run(self) -> DomTree {
        self.parse().tree
    }

    /// Run the parser and return both the `DomTree` and the parse errors.
    #[must_use]
    pub fn run_with_errors(self) -> (DomTree, Vec<ParseError>) {
        let output = self.parse();
        (output.tree, output.errors)
    }

    /// Run the parser to completion.
    ///
    /// With error logging on, each parse starts from an empty deduplication
    /// set, so an error repeated from an earlier document is echoed again.
    #[must_use]
    pub fn parse(mut self) -> ParseOutput {
        if self.errors.echoes() {
            clear_warnings();
        }
        while !self.stopped {
            let token = self.tokenizer.next_token();
            self.token_position = self.tokenizer.token_position();
            self.errors.absorb(self.tokenizer.take_errors());

            if std::mem::take(&mut self.skip_next_line_feed)
                && matches!(token, Token::Character { data: '\n' })
            {
                continue;
            }

            self.self_closing_acknowledged = false;
            self.process_token(&token);

            // [§ 13.2.5.40](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
            // "When a start tag token is emitted with its self-closing flag set,
            // if the flag is not acknowledged when it is processed by the tree
            // construction stage, that is a parse error."
            if let Token::StartTag {
                name,
                self_closing: true,
                ..
            } = &token
                && !self.self_closing_acknowledged
            {
                self.parse_error(format!(
                    "non-void-html-element-start-tag-with-trailing-solidus: <{name}/>"
                ));
            }

            // [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
            // "If there is an adjusted current node and it is not an element in
            // the HTML namespace, then ... CDATA section state."
            let cdata_allowed = self
                .adjusted_current_node()
                .is_some_and(|id| !self.is_in_namespace(id, Namespace::Html));
            self.tokenizer.set_cdata_allowed(cdata_allowed);

            if matches!(token, Token::EndOfFile) {
                self.stopped = true;
            }
        }
        self.errors.absorb(self.tokenizer.take_errors());
        self.finish()
    }

    fn finish(mut self) -> ParseOutput {
        // [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
        // "Return root's children, in tree order."
        if self.context_element.is_some()
            && let Some(&html) = self.tree.children(NodeId::ROOT).first()
        {
            self.tree.move_children(html, NodeId::ROOT);
            self.tree.remove_child(NodeId::ROOT, html);
        }
        let dropped_errors = self.errors.dropped();
        ParseOutput {
            tree: self.tree,
            errors: self.errors.into_errors(),
            dropped_errors,
        }
    }

    /// Record a tree construction parse error at the current token.
    pub(super) fn parse_error(&mut self, message: impl Into<String>) {
        self.errors.push("HTML Parser", message, self.token_position);
    }

    pub(super) fn unexpected_token(&mut self, token: &Token) {
        let mode = self.insertion_mode;
        self.parse_error(format!("unexpected {token} in {mode} insertion mode"));
    }

    /// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    ///
    /// "As each token is emitted from the tokenizer, the user agent must follow
    /// the appropriate steps from the following list, known as the tree
    /// construction dispatcher"
    pub(super) fn process_token(&mut self, token: &Token) {
        if self.use_html_rules(token) {
            if let Token::CData { data } = token {
                for c in data.chars() {
                    self.process_token(&Token::Character { data: c });
                }
                return;
            }
            self.process_using_rules(self.insertion_mode, token);
        } else {
            self.process_foreign_content(token);
        }
    }

    /// "Reprocess the token" goes back through the dispatcher.
    pub(super) fn reprocess_token(&mut self, token: &Token) {
        self.process_token(token);
    }

    /// "Process the token using the rules for the X insertion mode"
    pub(super) fn process_using_rules(&mut self, mode: InsertionMode, token: &Token) {
        match mode {
            InsertionMode::Initial => self.handle_initial_mode(token),
            InsertionMode::BeforeHtml => self.handle_before_html_mode(token),
            InsertionMode::BeforeHead => self.handle_before_head_mode(token),
            InsertionMode::InHead => self.handle_in_head_mode(token),
            InsertionMode::InHeadNoscript => self.handle_in_head_noscript_mode(token),
            InsertionMode::AfterHead => self.handle_after_head_mode(token),
            InsertionMode::InBody => self.handle_in_body_mode(token),
            InsertionMode::Text => self.handle_text_mode(token),

            // ===== TABLE PARSING MODES =====
            InsertionMode::InTable => self.handle_in_table_mode(token),
            InsertionMode::InTableText => self.handle_in_table_text_mode(token),
            InsertionMode::InCaption => self.handle_in_caption_mode(token),
            InsertionMode::InColumnGroup => self.handle_in_column_group_mode(token),
            InsertionMode::InTableBody => self.handle_in_table_body_mode(token),
            InsertionMode::InRow => self.handle_in_row_mode(token),
            InsertionMode::InCell => self.handle_in_cell_mode(token),

            // ===== FORM ELEMENT MODES =====
            InsertionMode::InSelect => self.handle_in_select_mode(token),
            InsertionMode::InSelectInTable => self.handle_in_select_in_table_mode(token),

            InsertionMode::InTemplate => self.handle_in_template_mode(token),
            InsertionMode::AfterBody => self.handle_after_body_mode(token),

            // ===== FRAMESET MODES =====
            InsertionMode::InFrameset => self.handle_in_frameset_mode(token),
            InsertionMode::AfterFrameset => self.handle_after_frameset_mode(token),
            InsertionMode::AfterAfterBody => self.handle_after_after_body_mode(token),
            InsertionMode::AfterAfterFrameset => self.handle_after_after_frameset_mode(token),
        }
    }

    /// Switch the insertion mode.
    pub(super) fn switch_mode(&mut self, mode: InsertionMode) {
        if self.insertion_mode != mode {
            tracing::debug!(from = %self.insertion_mode, to = %mode, "insertion mode switch");
        }
        self.insertion_mode = mode;
    }

    /// The dispatcher's HTML-content conditions. Foreign content rules are
    /// used for everything else.
    fn use_html_rules(&self, token: &Token) -> bool {
        // "If the stack of open elements is empty"
        let Some(node) = self.adjusted_current_node() else {
            return true;
        };
        // "If the adjusted current node is an element in the HTML namespace"
        if self.is_in_namespace(node, Namespace::Html) {
            return true;
        }
        let is_character = matches!(token, Token::Character { .. });
        let start_tag = match token {
            Token::StartTag { name, .. } => Some(name.as_str()),
            _ => None,
        };
        // "If the adjusted current node is a MathML text integration point
        // and the token is a start tag whose tag name is neither "mglyph" nor
        // "malignmark""
        // "If the adjusted current node is a MathML text integration point
        // and the token is a character token"
        if self.is_mathml_text_integration_point(node)
            && (is_character || start_tag.is_some_and(|n| n != "mglyph" && n != "malignmark"))
        {
            return true;
        }
        // "If the adjusted current node is a MathML annotation-xml element
        // and the token is a start tag whose tag name is "svg""
        if self.is_element(node, Namespace::MathMl, "annotation-xml") && start_tag == Some("svg")
        {
            return true;
        }
        // "If the adjusted current node is an HTML integration point and the
        // token is a start tag"
        // "If the adjusted current node is an HTML integration point and the
        // token is a character token"
        if self.is_html_integration_point(node) && (is_character || start_tag.is_some()) {
            return true;
        }
        // "If the token is an end-of-file token"
        matches!(token, Token::EndOfFile)
    }

    /// [§ 13.2.6.4.1](https://html.spec.whatwg.org/multipage/parsing.html#stop-parsing)
    ///
    /// "Pop all the nodes off the stack of open elements."
    pub(super) fn stop_parsing(&mut self) {
        tracing::debug!(
            open_elements = self.stack_of_open_elements.len(),
            "stop parsing"
        );
        self.stack_of_open_elements.clear();
        self.stopped = true;
    }
}

/// Print a DOM tree for debugging.
pub fn print_tree(tree: &DomTree, id: NodeId, indent: usize) {
    let mut out = String::new();
    write_tree(tree, id, indent, &mut out);
    print!("{out}");
}

/// Render the tree under `id` in the indented debugging format used by
/// [`print_tree`].
#[must_use]
pub fn tree_to_string(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    write_tree(tree, id, 0, &mut out);
    out
}

/// Pre-order walk over an explicit stack, children pushed in reverse.
fn write_tree(tree: &DomTree, id: NodeId, indent: usize, out: &mut String) {
    let mut stack = vec![(id, indent)];
    while let Some((id, indent)) = stack.pop() {
        let Some(node) = tree.get(id) else {
            continue;
        };
        for _ in 0..indent {
            out.push_str("  ");
        }
        out.push_str(&node_line(&node.node_type));
        out.push('\n');
        for &child in tree.children(id).iter().rev() {
            stack.push((child, indent + 1));
        }
    }
}

/// One node of the debugging format, without indentation.
fn node_line(node_type: &NodeType) -> String {
    match node_type {
        NodeType::Document => "#document".to_string(),
        NodeType::DocumentFragment => "#document-fragment".to_string(),
        NodeType::DocumentType(doctype) => {
            if doctype.public_id.is_empty() && doctype.system_id.is_empty() {
                format!("<!DOCTYPE {}>", doctype.name)
            } else {
                format!(
                    "<!DOCTYPE {} \"{}\" \"{}\">",
                    doctype.name, doctype.public_id, doctype.system_id
                )
            }
        }
        NodeType::Element(data) => {
            let name = match data.namespace {
                Namespace::Html => data.tag_name.clone(),
                namespace => format!("{} {}", namespace.prefix(), data.tag_name),
            };
            let attrs: Vec<String> = data
                .attrs
                .iter()
                .map(|attr| {
                    let name = attr.qualified_name();
                    if attr.value.is_empty() {
                        name
                    } else {
                        format!("{name}=\"{}\"", attr.value)
                    }
                })
                .collect();
            if attrs.is_empty() {
                format!("<{name}>")
            } else {
                format!("<{name} {}>", attrs.join(" "))
            }
        }
        NodeType::Text(data) => {
            let display = data.replace('\n', "\\n").replace(' ', "\u{00B7}");
            format!("\"{display}\"")
        }
        NodeType::CdataSection(data) => format!("<![CDATA[{data}]]>"),
        NodeType::ProcessingInstruction { target, data } => format!("<?{target} {data}?>"),
        NodeType::Comment(data) => format!("<!-- {data} -->"),
    }
}
