//! Inline style filter.
//!
//! Keeps only allowed CSS properties and validates color values against the
//! hex, rgb(a) and hsl(a) grammars.

use std::sync::LazyLock;

use regex::Regex;

/// Exact property names that may appear in a `style` attribute.
/// Any `border` or `border-*` property is allowed as well.
const ALLOWED_PROPERTIES: &[&str] = &["background-color", "color", "text-align", "padding", "width"];

const TEXT_ALIGN_VALUES: &[&str] = &["left", "right", "center", "justify", "start", "end"];

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid regex"));

static RGB_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^rgba?\(\s*\d{1,3}%?\s*,\s*\d{1,3}%?\s*,\s*\d{1,3}%?\s*(?:,\s*(?:\d*\.)?\d+%?\s*)?\)$",
    )
    .expect("valid regex")
});

static HSL_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^hsla?\(\s*\d{1,3}(?:\.\d+)?(?:deg)?\s*,\s*\d{1,3}(?:\.\d+)?%\s*,\s*\d{1,3}(?:\.\d+)?%\s*(?:,\s*(?:\d*\.)?\d+%?\s*)?\)$",
    )
    .expect("valid regex")
});

static SAFE_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9#%.,()\s-]+$").expect("valid regex"));

/// Whether `value` is a hex, rgb(a) or hsl(a) color.
pub fn is_valid_color(value: &str) -> bool {
    HEX_COLOR.is_match(value) || RGB_COLOR.is_match(value) || HSL_COLOR.is_match(value)
}

fn is_allowed_property(property: &str) -> bool {
    ALLOWED_PROPERTIES.contains(&property)
        || property == "border"
        || property.starts_with("border-")
}

fn is_color_property(property: &str) -> bool {
    property == "color" || property.ends_with("-color")
}

fn is_safe_value(property: &str, value: &str) -> bool {
    if is_color_property(property) {
        return is_valid_color(value);
    }
    if property == "text-align" {
        return TEXT_ALIGN_VALUES.contains(&value.to_ascii_lowercase().as_str());
    }

    let lower = value.to_ascii_lowercase();
    SAFE_VALUE.is_match(value) && !lower.contains("expression") && !lower.contains("url")
}

/// Rewrites a `style` attribute keeping only allowed, valid declarations.
///
/// Returns `None` when nothing survives.
pub fn filter_style(style: &str) -> Option<String> {
    let declarations: Vec<String> = style
        .split(';')
        .filter_map(|declaration| {
            let (property, value) = declaration.split_once(':')?;
            let property = property.trim().to_ascii_lowercase();
            let value = value.trim();

            if value.is_empty() || !is_allowed_property(&property) || !is_safe_value(&property, value)
            {
                return None;
            }
            Some(format!("{property}: {value}"))
        })
        .collect();

    if declarations.is_empty() {
        None
    } else {
        Some(declarations.join("; "))
    }
}
