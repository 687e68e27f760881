//! Sanitize Module
//!
//! Allow-list HTML filter for rich-text section content. Input is parsed into
//! a generic node tree, filtered by a visitor and serialized back.

mod policy;
mod style;
pub mod tree;

#[cfg(test)]
mod property_tests;

pub use policy::{allowed_attributes, is_allowed_tag, is_safe_href};
pub use style::{filter_style, is_valid_color};
pub use tree::{escape_html, Element, Node};

/// Sanitizes an HTML fragment.
///
/// Pure and idempotent: `sanitize(&sanitize(x)) == sanitize(x)`.
pub fn sanitize(html: &str) -> String {
    let nodes = tree::parse(html);
    tree::serialize(&policy::sanitize_nodes(nodes))
}
