//! Property tests: the tokenizer and tree builder terminate on arbitrary
//! input, and well-formed trees survive a serialize-and-reparse cycle.

// quickcheck properties receive their inputs by value.
#![allow(clippy::needless_pass_by_value)]

use koala_dom::{DomTree, NodeId, NodeType};
use koala_html::{
    FragmentContext, HTMLTokenizer, Token, parse_document, parse_fragment, tree_to_string,
};
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;

/// Pieces that steer the parser through its less common paths.
const PIECES: &[&str] = &[
    "<p>", "</p>", "<b>", "</b>", "<i>", "</i>", "<a href=x>", "</a>", "<div>", "</div>",
    "<table>", "</table>", "<tr>", "<td>", "</td>", "<caption>", "<colgroup>", "<col>",
    "<select>", "<option>", "</select>", "<template>", "</template>", "<svg>", "</svg>",
    "<math>", "<mi>", "<foreignObject>", "<desc>", "<![CDATA[", "]]>", "<!--", "-->",
    "<?pi x?>", "<!DOCTYPE html>", "<frameset>", "<frame>", "<noscript>", "<script>",
    "</script>", "<style>", "<title>", "<textarea>", "<plaintext>", "<html>", "<body>",
    "<head>", "&amp;", "&", "&#x", "&notin;", "\0", "\r\n", "\r", " ", "text", "<", ">",
    "<li>", "<dd>", "<h1>", "</h2>", "<button>", "<form>", "</form>", "<image>", "<br/>",
];

/// A string assembled from [`PIECES`].
#[derive(Debug, Clone)]
struct Markup(String);

impl Arbitrary for Markup {
    fn arbitrary(g: &mut Gen) -> Self {
        let count = usize::arbitrary(g) % (g.size() + 1);
        let mut out = String::new();
        for _ in 0..count {
            if let Some(piece) = g.choose(PIECES) {
                out.push_str(piece);
            }
        }
        Self(out)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(self.0.shrink().map(Self))
    }
}

const ELEMENTS: &[&str] = &["div", "span", "section", "article", "em", "strong", "ul"];
const WORDS: &[&str] = &["alpha", "beta", "gamma", "delta"];

/// Markup built from a grammar that never needs error recovery.
#[derive(Debug, Clone)]
struct WellFormed(String);

impl WellFormed {
    fn element(g: &mut Gen, depth: usize, out: &mut String) {
        let name = g.choose(ELEMENTS).copied().unwrap_or("div");
        out.push('<');
        out.push_str(name);
        for attr in ["id", "class", "title"] {
            if bool::arbitrary(g) {
                let value = g.choose(WORDS).copied().unwrap_or("alpha");
                out.push_str(&format!(" {attr}=\"{value}\""));
            }
        }
        out.push('>');
        let children = if depth == 0 {
            0
        } else {
            usize::arbitrary(g) % 4
        };
        for _ in 0..children {
            if name == "ul" {
                out.push_str("<li>");
                Self::element(g, depth - 1, out);
                out.push_str("</li>");
            } else if bool::arbitrary(g) {
                out.push_str(g.choose(WORDS).copied().unwrap_or("alpha"));
            } else {
                Self::element(g, depth - 1, out);
            }
        }
        out.push_str("</");
        out.push_str(name);
        out.push('>');
    }
}

impl Arbitrary for WellFormed {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut body = String::new();
        for _ in 0..=(usize::arbitrary(g) % 3) {
            Self::element(g, 3, &mut body);
        }
        Self(format!(
            "<!DOCTYPE html><html><head></head><body>{body}</body></html>"
        ))
    }
}

fn escape(text: &str, in_attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' if !in_attribute => out.push_str("&lt;"),
            '>' if !in_attribute => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

/// Serialize the children of `id` as HTML.
fn serialize_children(tree: &DomTree, id: NodeId, out: &mut String) {
    for &child in tree.children(id) {
        let Some(node) = tree.get(child) else {
            continue;
        };
        match &node.node_type {
            NodeType::Element(data) => {
                out.push('<');
                out.push_str(&data.tag_name);
                for attr in &data.attrs {
                    out.push_str(&format!(
                        " {}=\"{}\"",
                        attr.qualified_name(),
                        escape(&attr.value, true)
                    ));
                }
                out.push('>');
                serialize_children(tree, child, out);
                out.push_str(&format!("</{}>", data.tag_name));
            }
            NodeType::Text(text) => out.push_str(&escape(text, false)),
            NodeType::Comment(data) => out.push_str(&format!("<!--{data}-->")),
            _ => {}
        }
    }
}

fn body_dump(tree: &DomTree) -> String {
    tree.body()
        .map(|body| tree_to_string(tree, body))
        .unwrap_or_default()
}

#[quickcheck]
fn prop_tokenizer_terminates(input: String) -> bool {
    let mut tokenizer = HTMLTokenizer::new(input);
    tokenizer.run();
    let tokens = tokenizer.into_tokens();
    tokens.last() == Some(&Token::EndOfFile)
        && tokens
            .iter()
            .filter(|token| matches!(token, Token::EndOfFile))
            .count()
            == 1
}

#[quickcheck]
fn prop_document_always_has_html_head_and_body(input: Markup) -> bool {
    let tree = parse_document(&input.0).tree;
    tree.document_element()
        .and_then(|html| tree.as_element(html))
        .is_some_and(|data| data.tag_name == "html")
        && tree.head().is_some()
        && tree.body().is_some()
}

#[quickcheck]
fn prop_arbitrary_text_parses(input: String) -> bool {
    parse_document(&input).tree.document_element().is_some()
}

#[quickcheck]
fn prop_fragment_root_is_a_fragment(input: Markup) -> bool {
    ["div", "tr", "select", "svg:svg", "math:mi", "template", "title"]
        .iter()
        .filter_map(|context| context.parse::<FragmentContext>().ok())
        .all(|context| parse_fragment(&input.0, &context).tree.is_fragment())
}

#[quickcheck]
fn prop_error_positions_are_in_bounds(input: Markup) -> bool {
    let output = parse_document(&input.0);
    output
        .errors
        .iter()
        .all(|error| error.line >= 1 && error.offset <= input.0.len())
}

#[quickcheck]
fn prop_well_formed_input_needs_no_recovery(input: WellFormed) -> bool {
    parse_document(&input.0).errors.is_empty()
}

#[quickcheck]
fn prop_serialize_reparse_is_stable(input: WellFormed) -> bool {
    let first = parse_document(&input.0).tree;
    let mut body = String::new();
    if let Some(id) = first.body() {
        serialize_children(&first, id, &mut body);
    }
    let second = parse_document(&format!(
        "<!DOCTYPE html><html><head></head><body>{body}</body></html>"
    ))
    .tree;
    body_dump(&first) == body_dump(&second)
}
