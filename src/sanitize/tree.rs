//! Node Tree Module
//!
//! A host-independent HTML tree (`text | element{tag, attrs, children}`), a
//! lenient parser that builds it and a serializer that writes it back.

// == Node Types ==
/// One node of a parsed HTML fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Decoded character data
    Text(String),
    /// An element with lowercase tag name
    Element(Element),
}

/// An HTML element with its attributes in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Value of the first attribute named `name`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose content is raw text up to the matching closing tag.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "textarea", "title", "xmp", "iframe", "noembed", "noframes", "noscript",
];

pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

// == Parser ==
/// Parses an HTML fragment into a list of top-level nodes.
///
/// Never fails: comments, doctypes and processing instructions are dropped,
/// closing tags without a matching open element are ignored, and elements
/// still open at the end of input are closed.
pub fn parse(html: &str) -> Vec<Node> {
    Parser::new(html).run()
}

struct Parser<'a> {
    src: &'a str,
    lower: String,
    pos: usize,
    root: Vec<Node>,
    stack: Vec<Element>,
    text: String,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            lower: src.to_ascii_lowercase(),
            pos: 0,
            root: Vec::new(),
            stack: Vec::new(),
            text: String::new(),
        }
    }

    fn run(mut self) -> Vec<Node> {
        let src = self.src;
        let bytes = src.as_bytes();

        while self.pos < bytes.len() {
            if bytes[self.pos] != b'<' {
                let end = self.src[self.pos..]
                    .find('<')
                    .map_or(self.src.len(), |i| self.pos + i);
                self.text.push_str(&self.src[self.pos..end]);
                self.pos = end;
                continue;
            }

            let next = bytes.get(self.pos + 1).copied();
            match next {
                Some(b'!') if self.src[self.pos..].starts_with("<!--") => {
                    self.flush_text();
                    self.pos = match self.src[self.pos + 4..].find("-->") {
                        Some(i) => self.pos + 4 + i + 3,
                        None => self.src.len(),
                    };
                }
                Some(b'!') | Some(b'?') => {
                    self.flush_text();
                    self.skip_past_gt(self.pos);
                }
                Some(b'/')
                    if bytes
                        .get(self.pos + 2)
                        .is_some_and(|b| b.is_ascii_alphabetic()) =>
                {
                    self.flush_text();
                    self.end_tag();
                }
                Some(b) if b.is_ascii_alphabetic() => {
                    self.flush_text();
                    self.start_tag();
                }
                _ => {
                    self.text.push('<');
                    self.pos += 1;
                }
            }
        }

        self.flush_text();
        while !self.stack.is_empty() {
            self.pop_element();
        }
        self.root
    }

    fn push_node(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root.push(node),
        }
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            let raw = std::mem::take(&mut self.text);
            self.push_node(Node::Text(decode_entities(&raw)));
        }
    }

    fn pop_element(&mut self) {
        if let Some(element) = self.stack.pop() {
            self.push_node(Node::Element(element));
        }
    }

    fn skip_past_gt(&mut self, from: usize) {
        self.pos = match self.src[from..].find('>') {
            Some(i) => from + i + 1,
            None => self.src.len(),
        };
    }

    /// Reads a tag name starting at `from`; returns the lowercase name and the end offset.
    fn read_name(&self, from: usize) -> (String, usize) {
        let bytes = self.src.as_bytes();
        let mut end = from;
        while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || matches!(bytes[end], b'-' | b':')) {
            end += 1;
        }
        (self.lower[from..end].to_string(), end)
    }

    fn end_tag(&mut self) {
        let (name, after) = self.read_name(self.pos + 2);
        self.skip_past_gt(after);

        if let Some(depth) = self.stack.iter().rposition(|e| e.tag == name) {
            while self.stack.len() > depth {
                self.pop_element();
            }
        }
    }

    fn start_tag(&mut self) {
        let src = self.src;
        let bytes = src.as_bytes();
        let (name, mut i) = self.read_name(self.pos + 1);
        let mut element = Element::new(name);
        let mut self_closing = false;
        let mut terminated = false;

        while i < bytes.len() {
            match bytes[i] {
                b'>' => {
                    i += 1;
                    terminated = true;
                    break;
                }
                b'/' => {
                    self_closing = bytes.get(i + 1) == Some(&b'>');
                    i += 1;
                }
                b if b.is_ascii_whitespace() => i += 1,
                _ => {
                    let start = i;
                    while i < bytes.len()
                        && !bytes[i].is_ascii_whitespace()
                        && !matches!(bytes[i], b'=' | b'>' | b'/')
                    {
                        i += 1;
                    }
                    if start == i {
                        // stray '='
                        i += 1;
                        continue;
                    }
                    let attr_name = self.lower[start..i].to_string();

                    let mut j = i;
                    while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                        j += 1;
                    }
                    let mut value = String::new();
                    if bytes.get(j) == Some(&b'=') {
                        j += 1;
                        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                            j += 1;
                        }
                        match bytes.get(j) {
                            Some(&q) if q == b'"' || q == b'\'' => {
                                let close = self.src[j + 1..]
                                    .find(q as char)
                                    .map_or(self.src.len(), |k| j + 1 + k);
                                value = decode_entities(&self.src[j + 1..close]);
                                j = (close + 1).min(self.src.len());
                            }
                            _ => {
                                let start = j;
                                while j < bytes.len()
                                    && !bytes[j].is_ascii_whitespace()
                                    && bytes[j] != b'>'
                                {
                                    j += 1;
                                }
                                value = decode_entities(&self.src[start..j]);
                            }
                        }
                        i = j;
                    }

                    if element.attr(&attr_name).is_none() {
                        element.attrs.push((attr_name, value));
                    }
                }
            }
        }

        self.pos = i;
        if !terminated {
            // an unterminated tag swallows the rest of the input
            return;
        }

        if is_void(&element.tag) || self_closing {
            self.push_node(Node::Element(element));
            return;
        }

        if is_raw_text(&element.tag) {
            let closing = format!("</{}", element.tag);
            let end = self.lower[self.pos..]
                .find(&closing)
                .map_or(self.src.len(), |k| self.pos + k);
            let content = &self.src[self.pos..end];
            if !content.is_empty() {
                element.children.push(Node::Text(content.to_string()));
            }
            if end < self.src.len() {
                self.skip_past_gt(end);
            } else {
                self.pos = end;
            }
            self.push_node(Node::Element(element));
            return;
        }

        self.stack.push(element);
    }
}

// == Entities ==
/// Decodes character references. Unknown references are kept literally.
pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        match rest[1..].find(';').filter(|&k| k > 0 && k <= 10) {
            Some(k) => {
                let name = &rest[1..1 + k];
                match decode_reference(name) {
                    Some(c) => {
                        out.push(c);
                        rest = &rest[k + 2..];
                    }
                    None => {
                        out.push('&');
                        rest = &rest[1..];
                    }
                }
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

fn decode_reference(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return Some(char::from_u32(code).filter(|&c| c != '\0').unwrap_or('\u{FFFD}'));
    }

    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}

// == Serializer ==
/// Writes nodes back to HTML with text and attribute values escaped.
pub fn serialize(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => escape_text(text, out),
        Node::Element(element) => {
            out.push('<');
            out.push_str(&element.tag);
            for (name, value) in &element.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_attr(value, out);
                out.push('"');
            }
            out.push('>');

            if is_void(&element.tag) {
                return;
            }
            for child in &element.children {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
    }
}

pub fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// Escapes plain text for embedding in HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_text(text, &mut out);
    out
}
