//! Property-Based Tests for the sanitizer

use proptest::prelude::*;

use crate::sanitize::tree::{parse, Node};
use crate::sanitize::{allowed_attributes, is_allowed_tag, is_safe_href, sanitize};

// == Strategies ==
/// Fragments mixing allowed, disallowed and hostile markup.
fn fragment_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("<p>".to_string()),
        Just("</p>".to_string()),
        Just("<b>".to_string()),
        Just("</b>".to_string()),
        Just("<script>".to_string()),
        Just("</script>".to_string()),
        Just("<div onclick=\"x()\">".to_string()),
        Just("</div>".to_string()),
        Just("<a href=\"javascript:alert(1)\">".to_string()),
        Just("<a href='https://ok.cl'>".to_string()),
        Just("</a>".to_string()),
        Just("<font><span style=\"color:red;width:1px\">".to_string()),
        Just("<td style=\"background-color:#fff;border:1px solid\">".to_string()),
        Just("<img src=x onerror=alert(1)>".to_string()),
        Just("<!-- c -->".to_string()),
        Just("<br/>".to_string()),
        Just("&lt;script&gt;".to_string()),
        Just("&amp;".to_string()),
        Just("&#106;".to_string()),
        Just("<".to_string()),
        Just(">".to_string()),
        Just("\"".to_string()),
        "[a-zA-Z0-9 =:;]{0,8}",
    ]
}

fn html_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment_strategy(), 0..24).prop_map(|parts| parts.concat())
}

fn assert_safe(nodes: &[Node]) -> Result<(), TestCaseError> {
    for node in nodes {
        if let Node::Element(element) = node {
            prop_assert!(is_allowed_tag(&element.tag), "tag {} leaked", element.tag);
            for (name, value) in &element.attrs {
                prop_assert!(!name.starts_with("on"), "event handler {} leaked", name);
                prop_assert!(allowed_attributes(&element.tag).contains(&name.as_str()));
                if name == "href" {
                    prop_assert!(is_safe_href(value), "unsafe href {}", value);
                }
            }
            assert_safe(&element.children)?;
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // Sanitizing twice gives the same output as sanitizing once.
    #[test]
    fn prop_sanitize_idempotent(html in html_strategy()) {
        let once = sanitize(&html);
        prop_assert_eq!(sanitize(&once), once);
    }

    // Arbitrary text is idempotent too, not only markup-like input.
    #[test]
    fn prop_sanitize_idempotent_any_text(html in "\\PC{0,64}") {
        let once = sanitize(&html);
        prop_assert_eq!(sanitize(&once), once);
    }

    // Output never contains script tags, event handlers or unsafe links.
    #[test]
    fn prop_output_is_safe(html in html_strategy()) {
        let out = sanitize(&html);
        prop_assert!(!out.to_ascii_lowercase().contains("<script"));
        assert_safe(&parse(&out))?;
    }
}
