//! Typed document tree built from the service's rendered markup.
//!
//! The tree only keeps what the extractor cares about: headings, paragraphs,
//! lists, list items and loose text. Every other element is transparent, its children are
//! spliced into the parent's sequence, so wrapper `<div>`s and `<span>`s do
//! not change the shape.

use scraper::{ElementRef, Html};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Heading(String),
    /// A `<p>` line; the service renders plain document lines this way.
    Paragraph(String),
    List(Vec<Node>),
    /// `text` is the item's own text; nested lists live in `children`.
    ListItem { text: String, children: Vec<Node> },
    Text(String),
}

/// Parse `markup` as an HTML fragment and lower it into [`Node`]s.
pub fn parse(markup: &str) -> Vec<Node> {
    let fragment = Html::parse_fragment(markup);
    let mut out = Vec::new();
    lower_children(fragment.root_element(), &mut out);
    out.retain(|n| !matches!(n, Node::Text(t) if t.trim().is_empty()));
    out
}

fn lower_children(el: ElementRef<'_>, out: &mut Vec<Node>) {
    for child in el.children() {
        match child.value() {
            scraper::Node::Text(t) => {
                let raw: &str = &t.text;
                out.push(Node::Text(raw.to_string()));
            }
            scraper::Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    lower_element(child_el, out);
                }
            }
            _ => {}
        }
    }
}

fn lower_element(el: ElementRef<'_>, out: &mut Vec<Node>) {
    match el.value().name() {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let text = crate::utils::normalize_ws(&el.text().collect::<String>());
            out.push(Node::Heading(text));
        }
        "ul" | "ol" => {
            let mut items = Vec::new();
            lower_children(el, &mut items);
            items.retain(|n| !matches!(n, Node::Text(_)));
            out.push(Node::List(items));
        }
        "li" => {
            let mut inner = Vec::new();
            lower_children(el, &mut inner);
            let mut text = String::new();
            let mut children = Vec::new();
            for node in inner {
                match node {
                    Node::Text(t) => text.push_str(&t),
                    other => children.push(other),
                }
            }
            out.push(Node::ListItem {
                text: crate::utils::normalize_ws(&text),
                children,
            });
        }
        "p" => {
            let mut inner = Vec::new();
            lower_children(el, &mut inner);
            let mut text = String::new();
            let mut rest = Vec::new();
            for node in inner {
                match node {
                    Node::Text(t) => text.push_str(&t),
                    other => rest.push(other),
                }
            }
            out.push(Node::Paragraph(crate::utils::normalize_ws(&text)));
            out.extend(rest);
        }
        "br" => out.push(Node::Text(" ".into())),
        "script" | "style" | "template" => {}
        _ => lower_children(el, out),
    }
}

/// Visit every node in document order, parents before children.
pub fn walk<'a>(nodes: &'a [Node], visit: &mut impl FnMut(&'a Node)) {
    for node in nodes {
        visit(node);
        match node {
            Node::List(items) => walk(items, visit),
            Node::ListItem { children, .. } => walk(children, visit),
            Node::Heading(_) | Node::Paragraph(_) | Node::Text(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(text: &str, children: Vec<Node>) -> Node {
        Node::ListItem {
            text: text.into(),
            children,
        }
    }

    #[test]
    fn test_nested_list_split_from_item_text() {
        let tree = parse("<ul><li>Parent<ul><li>Child</li></ul></li></ul>");
        assert_eq!(
            tree,
            vec![Node::List(vec![item(
                "Parent",
                vec![Node::List(vec![item("Child", vec![])])]
            )])]
        );
    }

    #[test]
    fn test_wrappers_are_transparent() {
        let tree = parse(r#"<div><h2>Title</h2><div><ul><li><span>A</span> <b>b</b></li></ul></div></div>"#);
        assert_eq!(
            tree,
            vec![
                Node::Heading("Title".into()),
                Node::List(vec![item("A b", vec![])]),
            ]
        );
    }

    #[test]
    fn test_inline_pieces_join_without_padding() {
        let tree = parse("<ul><li><b>Key</b>: value</li></ul>");
        assert_eq!(tree, vec![Node::List(vec![item("Key: value", vec![])])]);
    }

    #[test]
    fn test_br_separates_words() {
        let tree = parse("<ul><li>one<br>two</li></ul>");
        assert_eq!(tree, vec![Node::List(vec![item("one two", vec![])])]);
    }

    #[test]
    fn test_paragraph_lowered_with_inline_text() {
        let tree = parse("<h2>T</h2><p class='line'><b>Key</b>: one<br>two</p>");
        assert_eq!(
            tree,
            vec![
                Node::Heading("T".into()),
                Node::Paragraph("Key: one two".into()),
            ]
        );
    }

    #[test]
    fn test_walk_is_document_order() {
        let tree = parse("<h1>H</h1><ul><li>a<ul><li>b</li></ul></li><li>c</li></ul>");
        let mut seen = Vec::new();
        walk(&tree, &mut |n| match n {
            Node::Heading(t) => seen.push(t.clone()),
            Node::ListItem { text, .. } => seen.push(text.clone()),
            _ => {}
        });
        assert_eq!(seen, vec!["H", "a", "b", "c"]);
    }

    #[test]
    fn test_empty_markup() {
        assert!(parse("").is_empty());
        assert!(parse("   \n ").is_empty());
    }
}
