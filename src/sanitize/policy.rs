//! Allow-list policy and the tree visitor that applies it.

use super::style::filter_style;
use super::tree::{Element, Node};

/// Tags kept in sanitized output. Anything else is unwrapped.
const ALLOWED_TAGS: &[&str] = &[
    "p", "br", "div", "span", "b", "strong", "i", "em", "u", "s", "strike", "sub", "sup", "ul",
    "ol", "li", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre", "code", "a", "table",
    "thead", "tbody", "tfoot", "tr", "th", "td", "hr",
];

const URL_SCHEMES: &[&str] = &["http://", "https://", "mailto:"];

pub fn is_allowed_tag(tag: &str) -> bool {
    ALLOWED_TAGS.contains(&tag)
}

/// Attributes each allowed tag may keep.
pub fn allowed_attributes(tag: &str) -> &'static [&'static str] {
    match tag {
        "a" => &["href", "title", "target", "rel"],
        "table" => &["style", "border", "cellpadding", "cellspacing", "width"],
        "td" | "th" => &["style", "colspan", "rowspan", "width"],
        "p" | "div" | "span" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "li" | "ul" | "ol"
        | "blockquote" | "tr" | "thead" | "tbody" | "tfoot" => &["style"],
        _ => &[],
    }
}

/// Whether an anchor target is a web or mail link.
pub fn is_safe_href(href: &str) -> bool {
    let lower = href.trim().to_ascii_lowercase();
    URL_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
}

/// Validates or rewrites one attribute value. `None` drops the attribute.
fn clean_attribute(name: &str, value: &str) -> Option<String> {
    match name {
        "href" => is_safe_href(value).then(|| value.trim().to_string()),
        "style" => filter_style(value),
        "target" => matches!(value, "_blank" | "_self").then(|| value.to_string()),
        "rel" => value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c == ' ')
            .then(|| value.to_string()),
        "colspan" | "rowspan" | "border" | "cellpadding" | "cellspacing" => {
            (!value.is_empty() && value.len() <= 3 && value.chars().all(|c| c.is_ascii_digit()))
                .then(|| value.to_string())
        }
        "width" => {
            let digits = value.strip_suffix('%').unwrap_or(value);
            (!digits.is_empty() && digits.len() <= 4 && digits.chars().all(|c| c.is_ascii_digit()))
                .then(|| value.to_string())
        }
        _ => Some(value.to_string()),
    }
}

// == Visitor ==
/// Applies the policy to a list of sibling nodes.
///
/// Text passes through. Disallowed elements are replaced by their own
/// (sanitized) children at the same position.
pub fn sanitize_nodes(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Text(text) => out.push(Node::Text(text)),
            Node::Element(element) if is_allowed_tag(&element.tag) => {
                out.push(Node::Element(sanitize_element(element)));
            }
            Node::Element(element) => out.extend(sanitize_nodes(element.children)),
        }
    }
    out
}

fn sanitize_element(element: Element) -> Element {
    let allowed = allowed_attributes(&element.tag);
    let attrs = element
        .attrs
        .into_iter()
        .filter(|(name, _)| allowed.contains(&name.as_str()))
        .filter_map(|(name, value)| clean_attribute(&name, &value).map(|v| (name, v)))
        .collect();

    Element {
        tag: element.tag,
        attrs,
        children: sanitize_nodes(element.children),
    }
}
