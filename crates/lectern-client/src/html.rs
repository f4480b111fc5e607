//! HTML fragment to plain text.

use scraper::{Html, Node};

/// Elements that start a new line of text when rendered.
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "td", "th",
    "section", "article", "blockquote", "header", "footer",
];

/// Flatten an HTML fragment into plain text.
///
/// Tags are dropped, entities decoded and whitespace collapsed. Text with no
/// markup passes through with only whitespace normalized.
///
/// ```
/// use lectern_client::html_to_text;
///
/// assert_eq!(html_to_text("<em>Faith</em> &amp; hope"), "Faith & hope");
/// ```
pub fn html_to_text(fragment: &str) -> String {
    if !fragment.contains(['<', '&']) {
        return collapse_whitespace(fragment);
    }
    let parsed = Html::parse_fragment(fragment);
    let mut text = String::with_capacity(fragment.len());
    for node in parsed.root_element().descendants() {
        match node.value() {
            Node::Text(chunk) => text.push_str(chunk),
            Node::Element(element) if BLOCK_ELEMENTS.contains(&element.name()) => text.push(' '),
            _ => {}
        }
    }
    collapse_whitespace(&text)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(html_to_text("The Atonement of Jesus Christ"), "The Atonement of Jesus Christ");
        assert_eq!(html_to_text("  spaced \n out  "), "spaced out");
        assert_eq!(html_to_text(""), "");
    }

    #[test]
    fn test_tags_are_stripped() {
        assert_eq!(
            html_to_text("<p>Come unto <strong>Christ</strong></p><p>and be perfected</p>"),
            "Come unto Christ and be perfected"
        );
    }

    #[test]
    fn test_inline_highlight_does_not_split_words() {
        assert_eq!(html_to_text("be <em>faith</em>ful"), "be faithful");
    }

    #[test]
    fn test_entities_are_decoded() {
        assert_eq!(html_to_text("D&amp;C 76 &quot;vision&quot;"), "D&C 76 \"vision\"");
        assert_eq!(html_to_text("faith&nbsp;and&nbsp;works"), "faith and works");
    }

    #[test]
    fn test_script_free_markup_with_attributes() {
        assert_eq!(
            html_to_text(r#"<span class="verse-number">21</span> And now"#),
            "21 And now"
        );
    }
}
