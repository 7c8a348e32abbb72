//! Tests for DOM queries: attributes, id lookup, tag lookup, text content.

use koala_dom::{Attr, DomTree, ElementData, Namespace, NodeId, NodeType};

fn element(tree: &mut DomTree, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
    let mut data = ElementData::new(tag, Namespace::Html);
    for &(name, value) in attrs {
        let _ = data.add_attribute_if_missing(Attr::new(name, value));
    }
    let id = tree.alloc(NodeType::Element(data));
    tree.append_child(parent, id);
    id
}

fn text(tree: &mut DomTree, parent: NodeId, data: &str) -> NodeId {
    let id = tree.alloc(NodeType::Text(data.to_string()));
    tree.append_child(parent, id);
    id
}

#[test]
fn test_attribute_order_is_preserved() {
    let mut tree = DomTree::new();
    let div = element(&mut tree, NodeId::ROOT, "div", &[("z", "1"), ("a", "2"), ("m", "3")]);

    let names: Vec<&str> = tree
        .as_element(div)
        .unwrap()
        .attrs
        .iter()
        .map(|a| a.local_name.as_str())
        .collect();
    assert_eq!(names, ["z", "a", "m"]);
}

#[test]
fn test_add_attribute_if_missing_keeps_first_value() {
    let mut data = ElementData::new("body", Namespace::Html);
    assert!(data.add_attribute_if_missing(Attr::new("id", "first")));
    assert!(!data.add_attribute_if_missing(Attr::new("id", "second")));
    assert_eq!(data.get_attribute("id"), Some("first"));
    assert_eq!(data.attrs.len(), 1);
}

#[test]
fn test_prefixed_attribute_lookup() {
    let mut data = ElementData::new("textPath", Namespace::Svg);
    data.attrs.push(Attr {
        local_name: "href".to_string(),
        namespace: Some(Namespace::XLink),
        prefix: Some("xlink".to_string()),
        value: "#Foo".to_string(),
    });

    assert_eq!(data.get_attribute("xlink:href"), Some("#Foo"));
    assert!(!data.has_attribute("href"));
    assert_eq!(
        data.get_attribute_ns(Some(Namespace::XLink), "href")
            .map(|a| a.value.as_str()),
        Some("#Foo")
    );
}

#[test]
fn test_classes_split_on_whitespace() {
    let mut tree = DomTree::new();
    let body = element(&mut tree, NodeId::ROOT, "body", &[("class", "b  c\td")]);
    let classes = tree.as_element(body).unwrap().classes();
    assert_eq!(classes.len(), 3);
    assert!(classes.contains("b"));
    assert!(classes.contains("d"));
}

#[test]
fn test_get_element_by_id_returns_first_in_tree_order() {
    let mut tree = DomTree::new();
    let html = element(&mut tree, NodeId::ROOT, "html", &[]);
    let first = element(&mut tree, html, "section", &[]);
    let nested = element(&mut tree, first, "p", &[("id", "x")]);
    let _later = element(&mut tree, html, "div", &[("id", "x")]);

    assert_eq!(tree.get_element_by_id("x"), Some(nested));
    assert_eq!(tree.get_element_by_id("missing"), None);
}

#[test]
fn test_get_elements_by_tag_name_is_case_sensitive() {
    let mut tree = DomTree::new();
    let svg = element(&mut tree, NodeId::ROOT, "svg", &[]);
    let animate = tree.alloc(NodeType::Element(ElementData::new(
        "animateColor",
        Namespace::Svg,
    )));
    tree.append_child(svg, animate);

    assert_eq!(tree.get_elements_by_tag_name(NodeId::ROOT, "animateColor"), [animate]);
    assert!(tree.get_elements_by_tag_name(NodeId::ROOT, "animatecolor").is_empty());
}

#[test]
fn test_text_content_concatenates_descendants() {
    let mut tree = DomTree::new();
    let p = element(&mut tree, NodeId::ROOT, "p", &[]);
    let _ = text(&mut tree, p, "a");
    let b = element(&mut tree, p, "b", &[]);
    let _ = text(&mut tree, b, "b");
    let cdata = tree.alloc(NodeType::CdataSection("c".to_string()));
    tree.append_child(p, cdata);

    assert_eq!(tree.text_content(p), "abc");
}

#[test]
fn test_append_child_moves_node_between_parents() {
    let mut tree = DomTree::new();
    let a = element(&mut tree, NodeId::ROOT, "a", &[]);
    let b = element(&mut tree, NodeId::ROOT, "b", &[]);
    let child = element(&mut tree, a, "i", &[]);

    tree.append_child(b, child);

    assert!(tree.children(a).is_empty());
    assert_eq!(tree.children(b), &[child]);
    assert_eq!(tree.parent(child), Some(b));
    assert!(tree.is_descendant_of(child, NodeId::ROOT));
}

#[test]
fn test_document_accessors() {
    let mut tree = DomTree::new();
    let doctype = tree.alloc(NodeType::DocumentType(koala_dom::DocumentTypeData {
        name: "html".to_string(),
        ..Default::default()
    }));
    tree.append_child(NodeId::ROOT, doctype);
    let html = element(&mut tree, NodeId::ROOT, "html", &[]);
    let head = element(&mut tree, html, "head", &[]);
    let body = element(&mut tree, html, "body", &[]);

    assert_eq!(tree.document_element(), Some(html));
    assert_eq!(tree.head(), Some(head));
    assert_eq!(tree.body(), Some(body));
    assert_eq!(tree.doctype().map(|d| d.name.as_str()), Some("html"));
    assert!(!tree.is_fragment());
    assert!(DomTree::new_fragment().is_fragment());
}
