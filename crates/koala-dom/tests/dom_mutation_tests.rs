//! Tests for the arena's structural edits: each one must leave parent,
//! child list and sibling links agreeing with each other.

use koala_dom::{DomTree, ElementData, Namespace, NodeId, NodeType};

fn element(tree: &mut DomTree, tag: &str) -> NodeId {
    tree.alloc(NodeType::Element(ElementData::new(tag, Namespace::Html)))
}

/// Build `<root><tag>` with the given children, all elements.
fn parent_with(tree: &mut DomTree, tag: &str, children: &[&str]) -> (NodeId, Vec<NodeId>) {
    let parent = element(tree, tag);
    tree.append_child(NodeId::ROOT, parent);
    let ids = children
        .iter()
        .map(|name| {
            let id = element(tree, name);
            tree.append_child(parent, id);
            id
        })
        .collect();
    (parent, ids)
}

/// Walk `parent`'s children through the sibling links and check them
/// against the child list, in both directions.
fn assert_links(tree: &DomTree, parent: NodeId) {
    let children = tree.children(parent);
    let mut forward = Vec::new();
    let mut cursor = tree.first_child(parent);
    while let Some(id) = cursor {
        assert_eq!(tree.parent(id), Some(parent));
        forward.push(id);
        cursor = tree.next_sibling(id);
    }
    assert_eq!(forward, children);

    let mut backward = Vec::new();
    let mut cursor = tree.last_child(parent);
    while let Some(id) = cursor {
        backward.push(id);
        cursor = tree.prev_sibling(id);
    }
    backward.reverse();
    assert_eq!(backward, children);
}

fn names(tree: &DomTree, ids: &[NodeId]) -> Vec<String> {
    ids.iter()
        .filter_map(|&id| tree.as_element(id))
        .map(|data| data.tag_name.clone())
        .collect()
}

#[test]
fn test_detach_relinks_old_siblings() {
    let mut tree = DomTree::new();
    let (ul, items) = parent_with(&mut tree, "ul", &["li", "dd", "dt"]);

    tree.detach(items[1]);

    assert_eq!(tree.parent(items[1]), None);
    assert_eq!(tree.next_sibling(items[1]), None);
    assert_eq!(tree.prev_sibling(items[1]), None);
    assert_eq!(tree.children(ul), &[items[0], items[2]]);
    assert_eq!(tree.next_sibling(items[0]), Some(items[2]));
    assert_links(&tree, ul);
}

#[test]
fn test_detach_unattached_node_is_a_no_op() {
    let mut tree = DomTree::new();
    let orphan = element(&mut tree, "span");
    tree.detach(orphan);
    assert_eq!(tree.parent(orphan), None);
    assert!(tree.children(NodeId::ROOT).is_empty());
}

#[test]
fn test_insert_before_reparents_an_attached_node() {
    let mut tree = DomTree::new();
    let (table, rows) = parent_with(&mut tree, "table", &["caption", "tr", "tfoot"]);
    let (div, _) = parent_with(&mut tree, "div", &["p"]);
    let p = tree.children(div)[0];

    tree.insert_before(div, rows[1], p);

    assert_eq!(tree.parent(rows[1]), Some(div));
    assert_eq!(names(&tree, tree.children(div)), ["tr", "p"]);
    assert_eq!(names(&tree, tree.children(table)), ["caption", "tfoot"]);
    assert_links(&tree, table);
    assert_links(&tree, div);
}

#[test]
fn test_insert_before_within_the_same_parent() {
    let mut tree = DomTree::new();
    let (ol, items) = parent_with(&mut tree, "ol", &["a", "b", "c"]);

    tree.insert_before(ol, items[2], items[0]);

    assert_eq!(names(&tree, tree.children(ol)), ["c", "a", "b"]);
    assert_eq!(tree.prev_sibling(items[2]), None);
    assert_eq!(tree.next_sibling(items[1]), None);
    assert_links(&tree, ol);
}

#[test]
fn test_insert_before_unknown_reference_appends() {
    let mut tree = DomTree::new();
    let (body, _) = parent_with(&mut tree, "body", &["h1"]);
    let stranger = element(&mut tree, "aside");
    let child = element(&mut tree, "main");

    tree.insert_before(body, child, stranger);

    assert_eq!(names(&tree, tree.children(body)), ["h1", "main"]);
    assert_links(&tree, body);
}

#[test]
fn test_append_child_moves_between_parents() {
    let mut tree = DomTree::new();
    let (left, kids) = parent_with(&mut tree, "section", &["em", "i"]);
    let (right, _) = parent_with(&mut tree, "article", &["b"]);

    tree.append_child(right, kids[0]);

    assert_eq!(names(&tree, tree.children(left)), ["i"]);
    assert_eq!(names(&tree, tree.children(right)), ["b", "em"]);
    assert_links(&tree, left);
    assert_links(&tree, right);
    assert!(tree.is_descendant_of(kids[0], right));
    assert!(!tree.is_descendant_of(kids[0], left));
}

#[test]
fn test_move_children_keeps_order_and_links() {
    let mut tree = DomTree::new();
    let (block, moving) = parent_with(&mut tree, "div", &["u", "s", "q"]);
    let (clone, existing) = parent_with(&mut tree, "b", &["small"]);

    tree.move_children(block, clone);

    assert!(tree.children(block).is_empty());
    assert_eq!(tree.first_child(block), None);
    assert_eq!(names(&tree, tree.children(clone)), ["small", "u", "s", "q"]);
    assert_eq!(tree.next_sibling(existing[0]), Some(moving[0]));
    assert_eq!(tree.prev_sibling(moving[0]), Some(existing[0]));
    assert_eq!(tree.next_sibling(moving[2]), None);
    assert_links(&tree, clone);
}

#[test]
fn test_move_children_carries_grandchildren() {
    let mut tree = DomTree::new();
    let (from, kids) = parent_with(&mut tree, "p", &["span"]);
    let text = tree.alloc(NodeType::Text("deep".to_string()));
    tree.append_child(kids[0], text);
    let to = element(&mut tree, "blockquote");
    tree.append_child(NodeId::ROOT, to);

    tree.move_children(from, to);

    assert!(tree.is_descendant_of(text, to));
    assert!(!tree.is_descendant_of(text, from));
    assert_eq!(tree.text_content(to), "deep");
    assert!(tree.text_content(from).is_empty());
}

#[test]
fn test_remove_child_ignores_non_children() {
    let mut tree = DomTree::new();
    let (nav, links) = parent_with(&mut tree, "nav", &["a"]);
    let (footer, _) = parent_with(&mut tree, "footer", &[]);

    tree.remove_child(footer, links[0]);

    assert_eq!(tree.parent(links[0]), Some(nav));
    assert_links(&tree, nav);

    tree.remove_child(nav, links[0]);
    assert_eq!(tree.parent(links[0]), None);
    assert!(tree.children(nav).is_empty());
}

#[test]
fn test_detached_node_can_be_reinserted() {
    let mut tree = DomTree::new();
    let (head, kids) = parent_with(&mut tree, "head", &["meta", "title", "link"]);

    tree.remove_child(head, kids[0]);
    tree.append_child(head, kids[0]);

    assert_eq!(names(&tree, tree.children(head)), ["title", "link", "meta"]);
    assert_links(&tree, head);
}
