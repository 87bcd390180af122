//! Flattening of nested text-with-markup into plain subtitle text.
//!
//! The tree is immutable and owned by the extraction call; readers build it
//! from their parsed document and drop it once [`extract_text`] returns.

use once_cell::sync::Lazy;
use regex::Regex;

/// Literal two-character escapes that survive in some caption feeds.
static BACKSLASH_ESCAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\[A-Za-z]").unwrap());

/// Horizontal whitespace only, so explicit line breaks survive collapsing.
static INLINE_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]+").unwrap());

static ANY_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Back-to-back breaks; a cue line is never empty.
static REPEATED_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());

/// Element name that contributes a line break.
const LINE_BREAK_TAG: &str = "br";

/// A node of a markup tree: a text leaf or an element with children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    Text(String),
    Element {
        name: String,
        children: Vec<MarkupNode>,
    },
}

impl MarkupNode {
    /// Convenience constructor for a text leaf.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Convenience constructor for an element.
    pub fn element(name: impl Into<String>, children: Vec<MarkupNode>) -> Self {
        Self::Element {
            name: name.into(),
            children,
        }
    }

    /// Build a tree from a parsed XML node. Comments and processing
    /// instructions are dropped; element names are matched by local name.
    pub fn from_xml(node: roxmltree::Node<'_, '_>) -> Self {
        if node.is_text() {
            return Self::text(node.text().unwrap_or_default());
        }
        let children = node
            .children()
            .filter(|c| c.is_element() || c.is_text())
            .map(MarkupNode::from_xml)
            .collect();
        Self::element(node.tag_name().name(), children)
    }
}

/// Flatten `node` into plain text.
///
/// Children are visited in document order and joined with single spaces.
/// The post-processing order matters: escapes go first, then inline
/// whitespace collapses, then spaces hugging a line break are removed.
pub fn extract_text(node: &MarkupNode) -> String {
    let parts = match node {
        MarkupNode::Text(text) => return clean_leaf(text).unwrap_or_default(),
        MarkupNode::Element { children, .. } => collect_parts(children),
    };
    let joined = parts.join(" ");
    let result = BACKSLASH_ESCAPE.replace_all(&joined, "");
    let result = INLINE_SPACE.replace_all(&result, " ");
    let result = result
        .replace(" \n ", "\n")
        .replace(" \n", "\n")
        .replace("\n ", "\n");
    REPEATED_BREAK.replace_all(&result, "\n").trim().to_string()
}

fn collect_parts(children: &[MarkupNode]) -> Vec<String> {
    let mut parts = Vec::new();
    for child in children {
        match child {
            MarkupNode::Text(text) => parts.extend(clean_leaf(text)),
            MarkupNode::Element { name, .. } if name == LINE_BREAK_TAG => {
                parts.push("\n".to_string())
            }
            MarkupNode::Element { .. } => {
                let text = extract_text(child);
                if !text.is_empty() {
                    parts.push(text);
                }
            }
        }
    }
    parts
}

/// Normalize one text leaf. Source whitespace (indentation, wrapped lines)
/// is incidental and becomes a single space before the escapes are applied.
fn clean_leaf(text: &str) -> Option<String> {
    let text = ANY_SPACE.replace_all(text, " ");
    let text = text
        .replace("\\h", "")
        .replace("\\n", "\n")
        .replace("\\t", " ");
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(children: Vec<MarkupNode>) -> MarkupNode {
        MarkupNode::element("p", children)
    }

    /// A `br` between two leaves becomes a single line break.
    #[test]
    fn br_is_a_line_break() {
        let node = p(vec![
            MarkupNode::text("Hello"),
            MarkupNode::element("br", vec![]),
            MarkupNode::text("World"),
        ]);
        assert_eq!(extract_text(&node), "Hello\nWorld");
    }

    /// Nested spans are flattened in order and joined with spaces.
    #[test]
    fn nested_spans_join_with_spaces() {
        let node = p(vec![
            MarkupNode::element("span", vec![MarkupNode::text("  Good ")]),
            MarkupNode::element(
                "span",
                vec![
                    MarkupNode::text("morning"),
                    MarkupNode::element("span", vec![MarkupNode::text("all")]),
                ],
            ),
        ]);
        assert_eq!(extract_text(&node), "Good morning all");
    }

    /// Literal escapes: `\h` vanishes, `\n` breaks, `\t` is a space.
    #[test]
    fn literal_escapes() {
        let node = p(vec![MarkupNode::text(r"one\htwo\nthree\tfour")]);
        assert_eq!(extract_text(&node), "onetwo\nthree four");
    }

    /// Remaining backslash-letter pairs are deleted after joining.
    #[test]
    fn stray_escapes_are_removed() {
        let node = p(vec![
            MarkupNode::text(r"a\N"),
            MarkupNode::element("span", vec![MarkupNode::text(r"\ib")]),
        ]);
        assert_eq!(extract_text(&node), "a b");
    }

    /// Source indentation does not turn into line breaks.
    #[test]
    fn incidental_whitespace_collapses() {
        let node = p(vec![MarkupNode::text("\n      Hello\n      there\t ")]);
        assert_eq!(extract_text(&node), "Hello there");
    }

    /// Whitespace-only leaves and empty elements contribute nothing.
    #[test]
    fn empty_parts_are_dropped() {
        let node = p(vec![
            MarkupNode::text("   "),
            MarkupNode::element("span", vec![MarkupNode::text(r"\h")]),
            MarkupNode::text("x"),
        ]);
        assert_eq!(extract_text(&node), "x");
        assert_eq!(extract_text(&p(vec![])), "");
    }

    /// Consecutive breaks fold into one so no blank line ends up in a cue.
    #[test]
    fn double_break() {
        let node = p(vec![
            MarkupNode::text("a"),
            MarkupNode::element("br", vec![]),
            MarkupNode::element("br", vec![]),
            MarkupNode::text("b"),
        ]);
        assert_eq!(extract_text(&node), "a\nb");
        let escaped = p(vec![MarkupNode::text(r"a\n\n \nb")]);
        assert_eq!(extract_text(&escaped), "a\nb");
    }

    /// `BR` is not a break element.
    #[test]
    fn br_match_is_case_sensitive() {
        let node = p(vec![
            MarkupNode::text("a"),
            MarkupNode::element("BR", vec![]),
            MarkupNode::text("b"),
        ]);
        assert_eq!(extract_text(&node), "a b");
    }

    /// A leading break is trimmed away with the rest of the edges.
    #[test]
    fn edges_are_trimmed() {
        let node = p(vec![
            MarkupNode::element("br", vec![]),
            MarkupNode::text("only"),
            MarkupNode::element("br", vec![]),
        ]);
        assert_eq!(extract_text(&node), "only");
    }

    /// Building from XML keeps text and elements and uses local names.
    #[test]
    fn from_xml_uses_local_names() {
        let doc = roxmltree::Document::parse(
            r#"<p xmlns:tt="urn:x"><!-- c -->Hi<tt:br/>there</p>"#,
        )
        .unwrap();
        let node = MarkupNode::from_xml(doc.root_element());
        assert_eq!(extract_text(&node), "Hi\nthere");
    }
}
