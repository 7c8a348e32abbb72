//! Integration tests for the HTML parser.

use koala_common::warning::warn_once;
use koala_dom::{DocumentMode, DomTree, Namespace, Node, NodeId, NodeType};
use koala_html::{
    FragmentContext, HTMLParser, ParserConfig, parse_document, parse_document_with_config,
    parse_fragment, tree_to_string,
};

/// Helper to parse HTML and return the DOM tree
fn parse(html: &str) -> DomTree {
    parse_document(html).tree
}

/// Helper to parse HTML and return how many parse errors were recorded
fn error_count(html: &str) -> usize {
    parse_document(html).errors.len()
}

/// Helper to get element by tag name (first match, depth-first)
fn find_element(tree: &DomTree, tag: &str) -> Option<NodeId> {
    tree.get_elements_by_tag_name(NodeId::ROOT, tag)
        .first()
        .copied()
}

/// Helper to get a node reference
fn get_node(tree: &DomTree, id: NodeId) -> &Node {
    tree.get(id).expect("Node not found")
}

fn tag_name(tree: &DomTree, id: NodeId) -> &str {
    tree.as_element(id).map_or("", |data| data.tag_name.as_str())
}

/// The tree under the body element, one node per line, without the
/// `<body>` line itself.
fn body_dump(tree: &DomTree) -> String {
    let body = tree.body().expect("body not found");
    tree.children(body)
        .iter()
        .map(|&child| tree_to_string(tree, child))
        .collect()
}

#[test]
fn test_document_structure() {
    let output = parse_document("<!DOCTYPE html><html></html>");
    assert!(output.errors.is_empty(), "{:?}", output.errors);

    let tree = output.tree;
    assert!(matches!(
        get_node(&tree, NodeId::ROOT).node_type,
        NodeType::Document
    ));
    let html = tree.document_element().expect("root element");
    assert_eq!(tag_name(&tree, html), "html");
    assert!(tree.head().is_some());
    assert!(tree.body().is_some());
    assert_eq!(tree.doctype().map(|d| d.name.as_str()), Some("html"));
}

#[test]
fn test_single_root_element() {
    let tree = parse("<!DOCTYPE html><html><head></head><body><p>x</p></body></html>");
    let roots: Vec<NodeId> = tree
        .children(NodeId::ROOT)
        .iter()
        .copied()
        .filter(|&id| tree.as_element(id).is_some())
        .collect();
    assert_eq!(roots.len(), 1);
    assert_eq!(tag_name(&tree, roots[0]), "html");
}

// A leading `<title>` lands in the implied `<head>`, so the first element
// after `<html>` is `<head>` and the title is its first child.
#[test]
fn test_implied_head_for_title() {
    let tree = parse("<!DOCTYPE html><title>test</title>");
    let html = tree.document_element().expect("root element");
    assert_eq!(tag_name(&tree, html), "html");

    let head = tree.head().expect("head");
    let title = tree.first_child(head).expect("title");
    assert_eq!(tag_name(&tree, title), "title");
    assert_eq!(tree.text_content(title), "test");
}

#[test]
fn test_body_attributes_and_lookup_by_id() {
    let tree = parse("<!DOCTYPE html><html><head></head><body id='a' class='b c'></body></html>");
    let body = tree.body().expect("body");
    let data = tree.as_element(body).expect("element");
    assert_eq!(data.get_attribute("id"), Some("a"));
    assert_eq!(data.get_attribute("class"), Some("b c"));
    assert!(data.classes().contains("c"));
    assert_eq!(tree.get_element_by_id("a"), Some(body));
}

#[test]
fn test_second_body_tag_merges_attributes() {
    let tree = parse("<body id=a><body id=b class=c>");
    let body = tree.body().expect("body");
    let data = tree.as_element(body).expect("element");
    assert_eq!(data.get_attribute("id"), Some("a"));
    assert_eq!(data.get_attribute("class"), Some("c"));
}

#[test]
fn test_comments_inside_and_before_root() {
    let tree = parse("<html><!--Hello World.--></html>");
    let html = tree.document_element().expect("root element");
    let first = tree.first_child(html).expect("child");
    assert!(matches!(
        &get_node(&tree, first).node_type,
        NodeType::Comment(data) if data == "Hello World."
    ));

    let tree = parse("<!--before--><html></html>");
    let children = tree.children(NodeId::ROOT);
    assert!(matches!(
        &get_node(&tree, children[0]).node_type,
        NodeType::Comment(data) if data == "before"
    ));
    assert_eq!(tag_name(&tree, children[1]), "html");
}

#[test]
fn test_xml_declaration_is_ignored() {
    let tree = parse(r#"<?xml version="1.0"?><!DOCTYPE html><html><head></head></html>"#);
    let children = tree.children(NodeId::ROOT);
    assert_eq!(children.len(), 2);
    assert!(matches!(
        get_node(&tree, children[0]).node_type,
        NodeType::DocumentType(_)
    ));
    assert_eq!(tag_name(&tree, children[1]), "html");
}

#[test]
fn test_processing_instruction_node() {
    let tree = parse("<!DOCTYPE html><body><?php echo 1 ?></body>");
    let body = tree.body().expect("body");
    let pi = tree.first_child(body).expect("child");
    assert!(matches!(
        &get_node(&tree, pi).node_type,
        NodeType::ProcessingInstruction { target, data } if target == "php" && data == "echo 1 "
    ));
}

#[test]
fn test_processing_instruction_before_head() {
    let tree = parse("<!DOCTYPE html><html><?foo bar?>");
    let html = tree.document_element().expect("root element");
    let first = tree.first_child(html).expect("child");
    assert!(matches!(
        &get_node(&tree, first).node_type,
        NodeType::ProcessingInstruction { target, data } if target == "foo" && data == "bar"
    ));
}

#[test]
fn test_p_closed_by_figure() {
    let tree = parse("<html><body><p><figure></body></html>");
    let p = find_element(&tree, "p").expect("p");
    assert!(tree.children(p).is_empty());
    let sibling = tree.next_sibling(p).expect("sibling");
    assert_eq!(tag_name(&tree, sibling), "figure");
}

#[test]
fn test_implied_end_tags_for_list_items() {
    let tree = parse("<!DOCTYPE html><ul><li>one<li>two</ul>");
    assert_eq!(
        body_dump(&tree),
        "<ul>\n  <li>\n    \"one\"\n  <li>\n    \"two\"\n"
    );
}

#[test]
fn test_svg_name_adjustments() {
    let tree = parse(
        "<!DOCTYPE html><body><svg viewbox='0 0 10 10'><animatecolor>foo</animatecolor><rect textlength='2'/></svg>",
    );
    let svg = find_element(&tree, "svg").expect("svg");
    let svg_data = tree.as_element(svg).expect("element");
    assert_eq!(svg_data.namespace, Namespace::Svg);
    assert_eq!(svg_data.get_attribute("viewBox"), Some("0 0 10 10"));

    let animate = find_element(&tree, "animateColor").expect("animateColor");
    assert_eq!(tree.text_content(animate), "foo");

    let rect = find_element(&tree, "rect").expect("rect");
    let rect_data = tree.as_element(rect).expect("element");
    assert_eq!(rect_data.get_attribute("textLength"), Some("2"));
    assert!(tree.children(rect).is_empty());
}

#[test]
fn test_mathml_attribute_adjustment() {
    let tree = parse("<!DOCTYPE html><math><csymbol definitionurl='u'></csymbol></math>");
    let csymbol = find_element(&tree, "csymbol").expect("csymbol");
    let data = tree.as_element(csymbol).expect("element");
    assert_eq!(data.namespace, Namespace::MathMl);
    assert_eq!(data.get_attribute("definitionURL"), Some("u"));
}

#[test]
fn test_foreign_attribute_namespaces() {
    let tree = parse("<svg><use xlink:href='#a'/></svg>");
    let use_element = find_element(&tree, "use").expect("use");
    let data = tree.as_element(use_element).expect("element");
    let attr = data
        .get_attribute_ns(Some(Namespace::XLink), "href")
        .expect("xlink:href");
    assert_eq!(attr.prefix.as_deref(), Some("xlink"));
    assert_eq!(attr.value, "#a");

    let tree = parse(r##"<svg><textpath xlink:href="#Foo"></textpath></svg>"##);
    let text_path = find_element(&tree, "textPath").expect("textPath");
    let data = tree.as_element(text_path).expect("element");
    assert_eq!(data.get_attribute("xlink:href"), Some("#Foo"));
    assert!(data.get_attribute_ns(Some(Namespace::XLink), "href").is_some());
}

#[test]
fn test_cdata_in_math() {
    let tree = parse("<!DOCTYPE html><html><math><![CDATA[test]]></math></html>");
    let math = find_element(&tree, "math").expect("math");
    let children = tree.children(math);
    assert_eq!(children.len(), 1);
    assert!(matches!(
        &get_node(&tree, children[0]).node_type,
        NodeType::CdataSection(data) if data == "test"
    ));
}

#[test]
fn test_named_references_in_body_text() {
    let tree = parse("<p>&check;&half;&hearts;&rarr;&among;</p>");
    let p = find_element(&tree, "p").expect("p");
    assert_eq!(tree.text_content(p), "\u{2713}\u{BD}\u{2665}\u{2192}&among;");
}

#[test]
fn test_text_in_math() {
    let tree = parse("<!DOCTYPE html><html><head></head><body><math>test</math></body></html>");
    let math = find_element(&tree, "math").expect("math");
    let children = tree.children(math);
    assert_eq!(children.len(), 1);
    assert_eq!(tree.as_text(children[0]), Some("test"));
}

#[test]
fn test_truncated_cdata_in_math() {
    let output = parse_document("<!DOCTYPE html><html><math><![CDATA[test");
    assert!(!output.errors.is_empty());
    let math = find_element(&output.tree, "math").expect("math");
    assert!(matches!(
        output.tree.children(math).first().map(|&id| &get_node(&output.tree, id).node_type),
        Some(NodeType::CdataSection(data)) if data == "test"
    ));
}

#[test]
fn test_cdata_in_html_is_a_comment() {
    let tree = parse("<!DOCTYPE html><body><![CDATA[x]]></body>");
    let body = tree.body().expect("body");
    assert!(matches!(
        tree.children(body).first().map(|&id| &get_node(&tree, id).node_type),
        Some(NodeType::Comment(data)) if data == "[CDATA[x]]"
    ));
}

#[test]
fn test_breakout_from_foreign_content() {
    let tree = parse("<!DOCTYPE html><svg><g><p>text</p></g></svg>");
    let p = find_element(&tree, "p").expect("p");
    assert_eq!(tree.as_element(p).map(|d| d.namespace), Some(Namespace::Html));
    let body = tree.body().expect("body");
    assert_eq!(tree.parent(p), Some(body));
}

#[test]
fn test_html_integration_point() {
    let tree = parse("<!DOCTYPE html><svg><foreignObject><p>x</p></foreignObject></svg>");
    let foreign_object = find_element(&tree, "foreignObject").expect("foreignObject");
    let p = find_element(&tree, "p").expect("p");
    assert_eq!(tree.parent(p), Some(foreign_object));
    assert_eq!(tree.as_element(p).map(|d| d.namespace), Some(Namespace::Html));
}

#[test]
fn test_fragment_children() {
    let output = parse_fragment(
        "<div>test</div><span>test2</span>",
        &FragmentContext::html("body"),
    );
    let tree = output.tree;
    assert!(tree.is_fragment());
    let children = tree.children(NodeId::ROOT);
    assert_eq!(children.len(), 2);
    assert_eq!(tag_name(&tree, children[0]), "div");
    assert_eq!(tree.text_content(children[0]), "test");
    assert_eq!(tag_name(&tree, children[1]), "span");
    assert_eq!(tree.text_content(children[1]), "test2");
}

#[test]
fn test_fragment_in_table_row_context() {
    let output = parse_fragment("<td>cell", &FragmentContext::html("tr"));
    let tree = output.tree;
    let children = tree.children(NodeId::ROOT);
    assert_eq!(children.len(), 1);
    assert_eq!(tag_name(&tree, children[0]), "td");
    assert_eq!(tree.text_content(children[0]), "cell");
}

#[test]
fn test_fragment_in_rcdata_context() {
    let output = parse_fragment("<b>x</b>", &FragmentContext::html("textarea"));
    let tree = output.tree;
    let children = tree.children(NodeId::ROOT);
    assert_eq!(children.len(), 1);
    assert_eq!(tree.as_text(children[0]), Some("<b>x</b>"));
}

#[test]
fn test_fragment_end_tag_in_rcdata_context_is_text() {
    let output = parse_fragment("a</textarea>b", &FragmentContext::html("textarea"));
    let tree = output.tree;
    let children = tree.children(NodeId::ROOT);
    assert_eq!(children.len(), 1);
    assert_eq!(tree.as_text(children[0]), Some("a</textarea>b"));

    let tree = parse_fragment("x</title>y", &FragmentContext::html("title")).tree;
    assert_eq!(tree.text_content(NodeId::ROOT), "x</title>y");
}

#[test]
fn test_fragment_in_svg_context() {
    let context: FragmentContext = "svg:svg".parse().expect("context");
    let tree = parse_fragment("<path/>", &context).tree;
    let path = tree.children(NodeId::ROOT)[0];
    assert_eq!(tree.as_element(path).map(|d| d.namespace), Some(Namespace::Svg));
}

#[test]
fn test_formatting_elements_continue_into_next_paragraph() {
    let tree = parse("<!DOCTYPE html><p><b>one<p>two");
    assert_eq!(
        body_dump(&tree),
        "<p>\n  <b>\n    \"one\"\n<p>\n  <b>\n    \"two\"\n"
    );
}

#[test]
fn test_adoption_agency_misnested_block() {
    let tree = parse("<!DOCTYPE html><b>1<p>2</b>3</p>");
    assert_eq!(
        body_dump(&tree),
        "<b>\n  \"1\"\n<p>\n  <b>\n    \"2\"\n  \"3\"\n"
    );
}

#[test]
fn test_adoption_agency_anchor_in_paragraph() {
    let tree = parse("<!DOCTYPE html><a><p>x</a>y");
    assert_eq!(
        body_dump(&tree),
        "<a>\n<p>\n  <a>\n    \"x\"\n  \"y\"\n"
    );
}

#[test]
fn test_adoption_agency_simple_misnesting() {
    let tree = parse("<!DOCTYPE html><b><i>x</b>y</i>");
    assert_eq!(
        body_dump(&tree),
        "<b>\n  <i>\n    \"x\"\n<i>\n  \"y\"\n"
    );
}

#[test]
fn test_adoption_agency_terminates_on_deep_nesting() {
    let mut html = String::from("<!DOCTYPE html><a>");
    for _ in 0..20 {
        html.push_str("<div>");
    }
    html.push_str("</a>x");
    let tree = parse(&html);
    assert!(find_element(&tree, "a").is_some());
    assert_eq!(tree.get_elements_by_tag_name(NodeId::ROOT, "div").len(), 20);
}

#[test]
fn test_tree_dump_of_deep_nesting_on_a_small_stack() {
    const DEPTH: usize = 5_000;
    let tree = parse(&format!("<!DOCTYPE html>{}x", "<div>".repeat(DEPTH)));
    let body = tree.body().expect("body");

    let dump = std::thread::Builder::new()
        .stack_size(256 * 1024)
        .spawn(move || tree_to_string(&tree, body))
        .expect("spawn")
        .join()
        .expect("tree dump overflowed the stack");

    let lines: Vec<&str> = dump.lines().collect();
    assert_eq!(lines.len(), DEPTH + 2);
    assert_eq!(lines[0], "<body>");
    assert_eq!(lines[DEPTH], format!("{}<div>", "  ".repeat(DEPTH)));
    assert_eq!(lines[DEPTH + 1], format!("{}\"x\"", "  ".repeat(DEPTH + 1)));
}

#[test]
fn test_noahs_ark_limits_reconstruction() {
    let tree = parse("<!DOCTYPE html><p><b><b><b><b>x</p>y");
    let bs = tree.get_elements_by_tag_name(NodeId::ROOT, "b");
    // four from the paragraph, three reconstructed after it
    assert_eq!(bs.len(), 7);
}

#[test]
fn test_table_structure_is_implied() {
    let tree = parse("<!DOCTYPE html><table><td>x</table>");
    assert_eq!(
        body_dump(&tree),
        "<table>\n  <tbody>\n    <tr>\n      <td>\n        \"x\"\n"
    );
}

#[test]
fn test_foster_parenting_text_and_elements() {
    let output = parse_document("<!DOCTYPE html><table>a<b>b</b><tr><td>c</td></tr></table>");
    assert!(!output.errors.is_empty());
    let tree = output.tree;
    let body = tree.body().expect("body");
    let children = tree.children(body);
    assert_eq!(tree.as_text(children[0]), Some("a"));
    assert_eq!(tag_name(&tree, children[1]), "b");
    assert_eq!(tag_name(&tree, children[2]), "table");
    let td = find_element(&tree, "td").expect("td");
    assert_eq!(tree.text_content(td), "c");
}

#[test]
fn test_whitespace_in_table_stays_in_table() {
    let tree = parse("<!DOCTYPE html><table> <tr><td>x</td></tr></table>");
    let table = find_element(&tree, "table").expect("table");
    let first = tree.first_child(table).expect("child");
    assert_eq!(tree.as_text(first), Some(" "));
}

#[test]
fn test_caption_and_colgroup() {
    let tree = parse("<!DOCTYPE html><table><caption>c<col><tr><td>x");
    let table = find_element(&tree, "table").expect("table");
    let names: Vec<&str> = tree
        .children(table)
        .iter()
        .map(|&id| tag_name(&tree, id))
        .collect();
    assert_eq!(names, vec!["caption", "colgroup", "tbody"]);
}

#[test]
fn test_select_options() {
    let tree = parse("<!DOCTYPE html><select><option>a<option>b</select>");
    assert_eq!(
        body_dump(&tree),
        "<select>\n  <option>\n    \"a\"\n  <option>\n    \"b\"\n"
    );
}

#[test]
fn test_select_in_table_closed_by_cell() {
    let tree = parse("<!DOCTYPE html><table><tr><td><select><option>a<td>b");
    let tds = tree.get_elements_by_tag_name(NodeId::ROOT, "td");
    assert_eq!(tds.len(), 2);
    assert_eq!(tree.text_content(tds[1]), "b");
}

#[test]
fn test_template_contents() {
    let tree = parse("<!DOCTYPE html><template><p>x</p></template>");
    let head = tree.head().expect("head");
    let template = tree.first_child(head).expect("template");
    assert_eq!(tag_name(&tree, template), "template");
    let p = tree.first_child(template).expect("p");
    assert_eq!(tag_name(&tree, p), "p");
}

#[test]
fn test_template_row_content() {
    let tree = parse("<!DOCTYPE html><template><tr><td>x</td></tr></template>");
    let template = find_element(&tree, "template").expect("template");
    let tr = tree.first_child(template).expect("tr");
    assert_eq!(tag_name(&tree, tr), "tr");
}

#[test]
fn test_frameset() {
    let tree = parse("<!DOCTYPE html><frameset><frame></frameset>");
    let frameset = tree.body().expect("frameset");
    assert_eq!(tag_name(&tree, frameset), "frameset");
    assert!(find_element(&tree, "frame").is_some());
}

#[test]
fn test_pre_drops_leading_newline() {
    let tree = parse("<!DOCTYPE html><pre>\nx</pre>");
    let pre = find_element(&tree, "pre").expect("pre");
    assert_eq!(tree.text_content(pre), "x");
}

#[test]
fn test_rawtext_and_rcdata_elements() {
    let tree = parse(
        "<!DOCTYPE html><title>a<b></title><style>p<i></style><textarea>&lt;</textarea>",
    );
    let title = find_element(&tree, "title").expect("title");
    assert_eq!(tree.text_content(title), "a<b>");
    let style = find_element(&tree, "style").expect("style");
    assert_eq!(tree.text_content(style), "p<i>");
    let textarea = find_element(&tree, "textarea").expect("textarea");
    assert_eq!(tree.text_content(textarea), "<");
}

#[test]
fn test_script_contents() {
    let tree = parse("<!DOCTYPE html><script>if (a < b) { x = '</p>'; }</script>");
    let script = find_element(&tree, "script").expect("script");
    assert_eq!(tree.text_content(script), "if (a < b) { x = '</p>'; }");
}

#[test]
fn test_image_becomes_img() {
    let tree = parse("<!DOCTYPE html><image src=x>");
    assert!(find_element(&tree, "image").is_none());
    let img = find_element(&tree, "img").expect("img");
    assert_eq!(
        tree.as_element(img).and_then(|d| d.get_attribute("src")),
        Some("x")
    );
}

#[test]
fn test_document_modes() {
    assert_eq!(parse("<p>").mode(), DocumentMode::Quirks);
    assert_eq!(parse("<!DOCTYPE html>").mode(), DocumentMode::NoQuirks);
    assert_eq!(
        parse(r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN">"#).mode(),
        DocumentMode::Quirks
    );
    assert_eq!(
        parse(
            r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN" "http://www.w3.org/TR/html4/loose.dtd">"#
        )
        .mode(),
        DocumentMode::LimitedQuirks
    );
}

#[test]
fn test_quirks_mode_table_does_not_close_p() {
    let tree = parse("<p><table>");
    let table = find_element(&tree, "table").expect("table");
    assert_eq!(tree.parent(table), find_element(&tree, "p"));

    let tree = parse("<!DOCTYPE html><p><table>");
    let table = find_element(&tree, "table").expect("table");
    assert_eq!(tree.parent(table), tree.body());
}

#[test]
fn test_well_formed_document_has_no_errors() {
    assert_eq!(
        error_count(
            "<!DOCTYPE html><html><head><title>t</title></head><body><p>x</p></body></html>"
        ),
        0
    );
}

#[test]
fn test_errors_carry_positions() {
    let output = parse_document("<!DOCTYPE html><p>\n</div>");
    let error = output.errors.first().expect("error");
    assert_eq!(error.line, 2);
    assert_eq!(error.column, 1);
}

#[test]
fn test_tokenizer_errors_are_collected() {
    let output = parse_document("<!DOCTYPE html><a href=x href=y>");
    assert!(
        output
            .errors
            .iter()
            .any(|error| error.message == "duplicate-attribute")
    );
}

#[test]
fn test_stray_doctype_is_an_error() {
    let output = parse_document("<!DOCTYPE html><p><!DOCTYPE html>");
    assert_eq!(output.errors.len(), 1);
    assert_eq!(output.tree.children(NodeId::ROOT).len(), 2);
}

#[test]
fn test_error_limit() {
    let config = ParserConfig::default().with_max_errors(1);
    let output = parse_document_with_config("</a></b></c>", config);
    assert_eq!(output.errors.len(), 1);
    assert!(output.dropped_errors > 0);
}

#[test]
fn test_logged_parse_resets_warning_dedup() {
    let message = "test_logged_parse_resets_warning_dedup: seen before";
    let _ = warn_once("Test", message);
    assert!(!warn_once("Test", message));

    let config = ParserConfig::default().with_log_errors(true);
    let output = parse_document_with_config("<!DOCTYPE html><p>x", config);
    assert!(output.errors.is_empty());
    assert!(warn_once("Test", message));
}

#[test]
fn test_run_with_errors() {
    let (tree, errors) = HTMLParser::new("<p>x").run_with_errors();
    assert!(find_element(&tree, "p").is_some());
    // missing DOCTYPE
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_empty_input() {
    let output = parse_document("");
    let tree = output.tree;
    assert!(tree.head().is_some());
    assert!(tree.body().is_some());
    assert_eq!(output.errors.len(), 1);
}
