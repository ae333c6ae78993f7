//! View ⇄ model conversion.
//!
//! Upcasting maps the view tree onto the small model schema:
//!
//! | view                                  | model                      |
//! |---------------------------------------|----------------------------|
//! | `p`                                   | `paragraph`                |
//! | `h1`..`h6`                            | `heading1`..`heading6`     |
//! | `blockquote`                          | `blockQuote`               |
//! | `br`                                  | `softBreak`                |
//! | `strong`/`b`, `em`/`i`, `u`, `code`   | text attributes            |
//! | `div` and other block containers      | unwrapped, auto-paragraphed|
//! | unknown inline elements               | unwrapped                  |
//!
//! Loose inline content in a root context is wrapped in paragraphs.

use std::collections::BTreeSet;

use smol_str::SmolStr;

use super::SchemaContext;
use super::view::{ViewElement, ViewFragment, ViewNode};
use crate::model::{Node, Text};

const PARAGRAPH: &str = "paragraph";
const BLOCK_QUOTE: &str = "blockQuote";
const SOFT_BREAK: &str = "softBreak";

/// Text attributes paired with their view elements, innermost first.
const TEXT_STYLES: &[(&str, &str)] = &[
    ("code", "code"),
    ("underline", "u"),
    ("italic", "em"),
    ("bold", "strong"),
];

enum BlockKind {
    Paragraph,
    Heading(u8),
    BlockQuote,
    Transparent,
}

fn classify(name: &str) -> Option<BlockKind> {
    match name {
        "p" => Some(BlockKind::Paragraph),
        "blockquote" => Some(BlockKind::BlockQuote),
        "div" | "section" | "article" | "header" | "footer" | "main" | "aside" | "nav" | "ul"
        | "ol" | "li" | "figure" | "pre" | "table" | "thead" | "tbody" | "tr" | "td" | "th" => {
            Some(BlockKind::Transparent)
        }
        _ => match name.as_bytes() {
            [b'h', level @ b'1'..=b'6'] => Some(BlockKind::Heading(level - b'0')),
            _ => None,
        },
    }
}

fn text_attribute(view_name: &str) -> Option<&'static str> {
    match view_name {
        "strong" | "b" => Some("bold"),
        "em" | "i" => Some("italic"),
        "u" => Some("underline"),
        "code" => Some("code"),
        _ => None,
    }
}

pub(crate) fn upcast(fragment: &ViewFragment, context: SchemaContext) -> Vec<Node> {
    match context {
        SchemaContext::Root => {
            let mut out = Vec::new();
            upcast_blocks(&fragment.children, &mut out);
            out
        }
        SchemaContext::Inline => {
            let mut inline = Vec::new();
            for node in &fragment.children {
                upcast_inline(node, &BTreeSet::new(), &mut inline);
            }
            normalize_inline(inline)
        }
    }
}

fn upcast_blocks(nodes: &[ViewNode], out: &mut Vec<Node>) {
    let mut pending = Vec::new();
    for node in nodes {
        let kind = match node {
            ViewNode::Element(element) => classify(&element.name).map(|kind| (element, kind)),
            ViewNode::Text(_) => None,
        };
        let Some((element, kind)) = kind else {
            upcast_inline(node, &BTreeSet::new(), &mut pending);
            continue;
        };

        flush_paragraph(&mut pending, out);
        match kind {
            BlockKind::Paragraph => out.push(block(PARAGRAPH, &element.children)),
            BlockKind::Heading(level) => {
                out.push(block(&format!("heading{level}"), &element.children))
            }
            BlockKind::BlockQuote => {
                let mut inner = Vec::new();
                upcast_blocks(&element.children, &mut inner);
                out.push(Node::element(BLOCK_QUOTE, inner));
            }
            BlockKind::Transparent => upcast_blocks(&element.children, out),
        }
    }
    flush_paragraph(&mut pending, out);
}

fn block(name: &str, children: &[ViewNode]) -> Node {
    let mut inline = Vec::new();
    for child in children {
        upcast_inline(child, &BTreeSet::new(), &mut inline);
    }
    Node::element(name, normalize_inline(inline))
}

fn flush_paragraph(pending: &mut Vec<Node>, out: &mut Vec<Node>) {
    if pending.is_empty() {
        return;
    }
    let inline = normalize_inline(std::mem::take(pending));
    if !inline.is_empty() {
        out.push(Node::element(PARAGRAPH, inline));
    }
}

fn upcast_inline(node: &ViewNode, attributes: &BTreeSet<SmolStr>, out: &mut Vec<Node>) {
    match node {
        ViewNode::Text(data) => out.push(Node::Text(Text {
            data: data.clone(),
            attributes: attributes.clone(),
        })),
        ViewNode::Element(element) if element.name == "br" => {
            out.push(Node::element(SOFT_BREAK, Vec::new()))
        }
        ViewNode::Element(element) => {
            let mut nested = attributes.clone();
            if let Some(attribute) = text_attribute(&element.name) {
                nested.insert(SmolStr::new_static(attribute));
            }
            for child in &element.children {
                upcast_inline(child, &nested, out);
            }
        }
    }
}

fn collapse_whitespace(input: &str, after_space: &mut bool) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, ' ' | '\n' | '\t' | '\r' | '\x0c') {
            if !*after_space {
                out.push(' ');
                *after_space = true;
            }
        } else {
            out.push(c);
            *after_space = false;
        }
    }
    out
}

/// Collapse whitespace, trim it at line boundaries and merge equal texts.
fn normalize_inline(nodes: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(nodes.len());
    let mut after_space = true;

    for node in nodes {
        match node {
            Node::Text(mut text) => {
                text.data = collapse_whitespace(&text.data, &mut after_space);
                if text.data.is_empty() {
                    continue;
                }
                match out.last_mut() {
                    Some(Node::Text(prev)) if prev.attributes == text.attributes => {
                        prev.data.push_str(&text.data)
                    }
                    _ => out.push(Node::Text(text)),
                }
            }
            other => {
                after_space = true;
                out.push(other);
            }
        }
    }

    for i in 0..out.len() {
        let line_ends = out
            .get(i + 1)
            .is_none_or(|next| next.is_element_named(SOFT_BREAK));
        if let (true, Node::Text(text)) = (line_ends, &mut out[i]) {
            let trimmed = text.data.trim_end_matches(' ').len();
            text.data.truncate(trimmed);
        }
    }
    out.retain(|node| !matches!(node, Node::Text(text) if text.data.is_empty()));
    out
}

pub(crate) fn downcast(nodes: &[Node]) -> ViewFragment {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        downcast_node(node, &mut out);
    }
    ViewFragment::new(out)
}

fn view_name(model_name: &str) -> SmolStr {
    match model_name {
        PARAGRAPH => SmolStr::new_static("p"),
        BLOCK_QUOTE => SmolStr::new_static("blockquote"),
        SOFT_BREAK => SmolStr::new_static("br"),
        other => match other.strip_prefix("heading") {
            Some(level @ ("1" | "2" | "3" | "4" | "5" | "6")) => SmolStr::new(format!("h{level}")),
            _ => SmolStr::new_static("div"),
        },
    }
}

fn downcast_node(node: &Node, out: &mut Vec<ViewNode>) {
    match node {
        Node::Text(text) => {
            let mut view = ViewNode::Text(text.data.clone());
            for (attribute, tag) in TEXT_STYLES {
                if text.has_attribute(attribute) {
                    view = ViewNode::Element(ViewElement::with_children(*tag, vec![view]));
                }
            }
            out.push(view);
        }
        Node::Element(element) => {
            let name = view_name(&element.name);
            let mut children = Vec::with_capacity(element.children.len());
            for child in &element.children {
                downcast_node(child, &mut children);
            }
            // Empty blocks keep their height.
            if children.is_empty() && (element.name == PARAGRAPH || name.starts_with('h')) {
                children.push(ViewNode::Text("\u{a0}".into()));
            }
            let mut view = ViewElement::with_children(name, children);
            for (key, value) in &element.attributes {
                view.attributes.insert(key.clone(), value.clone());
            }
            out.push(ViewNode::Element(view));
        }
    }
}
