//! Lenient HTML ⇄ view tree processor.
//!
//! Parsing never fails: malformed markup degrades to text, stray closing
//! tags are dropped and unclosed elements are closed at the end of input.

use tracing::trace;

use super::DataProcessor;
use super::view::{ViewElement, ViewFragment, ViewNode};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// HTML data processor.
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlDataProcessor;

impl HtmlDataProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl DataProcessor for HtmlDataProcessor {
    fn to_view(&self, data: &str) -> ViewFragment {
        parse(data)
    }

    fn to_data(&self, fragment: &ViewFragment) -> String {
        let mut out = String::new();
        for node in &fragment.children {
            write_node(node, &mut out);
        }
        out
    }
}

#[derive(Default)]
struct TreeBuilder {
    open: Vec<ViewElement>,
    top: Vec<ViewNode>,
}

impl TreeBuilder {
    fn append(&mut self, node: ViewNode) {
        let siblings = match self.open.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.top,
        };
        match (siblings.last_mut(), node) {
            (Some(ViewNode::Text(prev)), ViewNode::Text(text)) => prev.push_str(&text),
            (_, node) => siblings.push(node),
        }
    }

    fn open(&mut self, element: ViewElement) {
        self.open.push(element);
    }

    fn close(&mut self, name: &str) {
        let Some(index) = self.open.iter().rposition(|el| el.name == name) else {
            trace!(tag = name, "dropping stray closing tag");
            return;
        };
        while self.open.len() > index {
            if let Some(element) = self.open.pop() {
                self.append(ViewNode::Element(element));
            }
        }
    }

    fn finish(mut self) -> ViewFragment {
        while let Some(element) = self.open.pop() {
            self.append(ViewNode::Element(element));
        }
        ViewFragment::new(self.top)
    }
}

fn parse(data: &str) -> ViewFragment {
    let mut builder = TreeBuilder::default();
    let mut rest = data;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("<!--") {
            rest = after.find("-->").map_or("", |end| &after[end + 3..]);
            continue;
        }
        // Doctype and processing instructions.
        if rest.starts_with("<!") || rest.starts_with("<?") {
            rest = rest.find('>').map_or("", |end| &rest[end + 1..]);
            continue;
        }
        if let Some(after) = rest.strip_prefix("</") {
            if let Some(end) = after.find('>') {
                let name = after[..end].trim().to_ascii_lowercase();
                builder.close(&name);
                rest = &after[end + 1..];
                continue;
            }
        }
        if rest.starts_with('<') {
            if let Some((tag, consumed)) = parse_start_tag(rest) {
                rest = &rest[consumed..];
                if tag.self_closing || is_void(&tag.element.name) {
                    builder.append(ViewNode::Element(tag.element));
                } else {
                    builder.open(tag.element);
                }
                continue;
            }
        }

        let skip = usize::from(rest.starts_with('<'));
        let end = rest[skip..].find('<').map_or(rest.len(), |i| i + skip);
        let text = decode_entities(&rest[..end]);
        if !text.is_empty() {
            builder.append(ViewNode::Text(text));
        }
        rest = &rest[end..];
    }

    builder.finish()
}

struct StartTag {
    element: ViewElement,
    self_closing: bool,
}

fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b':')
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

/// Parse `<name attr="value" ...>` at the start of `input`.
///
/// Returns the tag and the number of bytes consumed, or `None` if the input
/// is not a well-formed start tag.
fn parse_start_tag(input: &str) -> Option<(StartTag, usize)> {
    let bytes = input.as_bytes();
    let name_start = 1;
    if !bytes.get(name_start)?.is_ascii_alphabetic() {
        return None;
    }
    let mut pos = name_start;
    while pos < bytes.len() && is_name_byte(bytes[pos]) {
        pos += 1;
    }
    let mut element = ViewElement::new(input[name_start..pos].to_ascii_lowercase());

    loop {
        pos = skip_whitespace(bytes, pos);
        match bytes.get(pos).copied()? {
            b'>' => {
                let tag = StartTag {
                    element,
                    self_closing: false,
                };
                return Some((tag, pos + 1));
            }
            b'/' if bytes.get(pos + 1) == Some(&b'>') => {
                let tag = StartTag {
                    element,
                    self_closing: true,
                };
                return Some((tag, pos + 2));
            }
            b'/' => {
                pos += 1;
                continue;
            }
            _ => {}
        }

        let attr_start = pos;
        while pos < bytes.len()
            && !bytes[pos].is_ascii_whitespace()
            && !matches!(bytes[pos], b'=' | b'>' | b'/')
        {
            pos += 1;
        }
        let attr_name = input[attr_start..pos].to_ascii_lowercase();
        pos = skip_whitespace(bytes, pos);

        let mut value = String::new();
        if bytes.get(pos) == Some(&b'=') {
            pos = skip_whitespace(bytes, pos + 1);
            match bytes.get(pos).copied()? {
                quote @ (b'"' | b'\'') => {
                    let start = pos + 1;
                    let len = input[start..].find(char::from(quote))?;
                    value = decode_entities(&input[start..start + len]);
                    pos = start + len + 1;
                }
                _ => {
                    let start = pos;
                    while pos < bytes.len()
                        && !bytes[pos].is_ascii_whitespace()
                        && bytes[pos] != b'>'
                    {
                        pos += 1;
                    }
                    value = decode_entities(&input[start..pos]);
                }
            }
        }

        if !attr_name.is_empty() {
            element
                .attributes
                .entry(attr_name.into())
                .or_insert_with(|| value.into());
        }
    }
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_owned();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&rest[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

fn write_node(node: &ViewNode, out: &mut String) {
    match node {
        ViewNode::Text(text) => escape_text(text, out),
        ViewNode::Element(element) => {
            out.push('<');
            out.push_str(&element.name);
            for (name, value) in &element.attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_attribute(value, out);
                out.push('"');
            }
            out.push('>');
            if is_void(&element.name) {
                return;
            }
            for child in &element.children {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(&element.name);
            out.push('>');
        }
    }
}
