//! HTML fragment extraction.
//!
//! Annotation bodies embed structured values in small HTML fragments
//! (`<span data-vocab-id=..><a href=..>`, `<div class="field-value">`). This
//! module is the single place that parses HTML: a fragment is parsed with
//! html5ever, and elements are located with a small CSS-like selector
//! syntax: tag names, `.class` names, `tag.class`, and descendant
//! combinators separated by whitespace.

use html5ever::parse_document;
use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

/// Returns true if `text` looks like HTML under the IIIF rule: the first
/// character is `<` and the last is `>`.
pub fn detect_html(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.starts_with('<') && trimmed.ends_with('>')
}

/// A parsed HTML fragment.
pub struct HtmlFragment {
    dom: RcDom,
}

impl HtmlFragment {
    pub fn parse(html: &str) -> Self {
        let wrapped = format!("<!DOCTYPE html><html><head></head><body>{html}</body></html>");
        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .one(wrapped.as_bytes());
        Self { dom }
    }

    /// The `<body>` element holding the fragment content.
    pub fn root(&self) -> Element {
        let document = Element {
            handle: self.dom.document.clone(),
        };
        document
            .select_first("body")
            .unwrap_or(document)
    }

    /// First element matching `selector`, in document order.
    pub fn select_first(&self, selector: &str) -> Option<Element> {
        self.root().select_first(selector)
    }

    /// Text content of the whole fragment.
    pub fn text(&self) -> String {
        self.root().text()
    }
}

/// An element inside an [`HtmlFragment`].
#[derive(Clone)]
pub struct Element {
    handle: Handle,
}

impl Element {
    pub fn name(&self) -> Option<String> {
        match self.handle.data {
            NodeData::Element { ref name, .. } => Some(name.local.to_string()),
            _ => None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        if let NodeData::Element { ref attrs, .. } = self.handle.data {
            for attr in attrs.borrow().iter() {
                if attr.name.local.as_ref() == name {
                    return Some(attr.value.to_string());
                }
            }
        }
        None
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text(&self) -> String {
        let mut text = String::new();
        collect_text(&self.handle, &mut text);
        text
    }

    /// Serialized markup of the element's children.
    pub fn inner_html(&self) -> String {
        let mut bytes = Vec::new();
        let serializable: SerializableHandle = self.handle.clone().into();
        let opts = SerializeOpts {
            traversal_scope: TraversalScope::ChildrenOnly(None),
            ..Default::default()
        };
        if serialize(&mut bytes, &serializable, opts).is_err() {
            return self.text();
        }
        String::from_utf8(bytes).unwrap_or_default()
    }

    /// First descendant matching `selector`, in document order.
    pub fn select_first(&self, selector: &str) -> Option<Element> {
        let parts: Vec<Compound> = selector.split_whitespace().map(Compound::parse).collect();
        if parts.is_empty() {
            return None;
        }
        find_first(&self.handle, &parts, &[0])
    }
}

fn collect_text(handle: &Handle, text: &mut String) {
    match handle.data {
        NodeData::Text { ref contents } => text.push_str(&contents.borrow()),
        NodeData::Element { .. } | NodeData::Document => {
            for child in handle.children.borrow().iter() {
                collect_text(child, text);
            }
        }
        _ => {}
    }
}

/// One compound selector: an optional tag name plus required classes.
struct Compound {
    tag: Option<String>,
    classes: Vec<String>,
}

impl Compound {
    fn parse(text: &str) -> Self {
        let mut pieces = text.split('.');
        let tag = pieces
            .next()
            .filter(|tag| !tag.is_empty())
            .map(str::to_ascii_lowercase);
        let classes = pieces
            .filter(|class| !class.is_empty())
            .map(str::to_string)
            .collect();
        Self { tag, classes }
    }

    fn matches(&self, handle: &Handle) -> bool {
        let NodeData::Element {
            ref name,
            ref attrs,
            ..
        } = handle.data
        else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if name.local.as_ref() != tag.as_str() {
                return false;
            }
        }
        if self.classes.is_empty() {
            return true;
        }
        let attrs = attrs.borrow();
        let class_attr = attrs
            .iter()
            .find(|attr| attr.name.local.as_ref() == "class")
            .map(|attr| attr.value.to_string())
            .unwrap_or_default();
        self.classes
            .iter()
            .all(|class| class_attr.split_whitespace().any(|c| c == class))
    }
}

/// Pre-order search. `states` holds the indices of the compound selectors
/// the next element may match, given the ancestors matched so far.
fn find_first(handle: &Handle, parts: &[Compound], states: &[usize]) -> Option<Element> {
    for child in handle.children.borrow().iter() {
        if !matches!(child.data, NodeData::Element { .. }) {
            continue;
        }
        let mut next_states: Vec<usize> = states.to_vec();
        for &state in states {
            if parts[state].matches(child) {
                if state + 1 == parts.len() {
                    return Some(Element {
                        handle: child.clone(),
                    });
                }
                if !next_states.contains(&(state + 1)) {
                    next_states.push(state + 1);
                }
            }
        }
        if let Some(found) = find_first(child, parts, &next_states) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_html_by_angle_brackets() {
        assert!(detect_html("<p>Hello</p>"));
        assert!(detect_html("  <span>x</span>\n"));
        assert!(!detect_html("Title: <b>x</b> trailing"));
        assert!(!detect_html(""));
    }

    #[test]
    fn selects_descendants_by_class_and_tag() {
        let fragment = HtmlFragment::parse(
            r#"<div class="field"><div class="field-value"><a href="https://x.example">X</a></div></div>"#,
        );
        let link = fragment.select_first(".field-value a").expect("link");
        assert_eq!(link.attr("href").as_deref(), Some("https://x.example"));
        assert_eq!(link.text(), "X");
        assert!(fragment.select_first(".missing a").is_none());
    }

    #[test]
    fn inner_html_keeps_markup_and_text_strips_it() {
        let fragment = HtmlFragment::parse(r#"<div class="field-value">A <b>bold</b> move</div>"#);
        let value = fragment.select_first("div.field-value").expect("value");
        assert_eq!(value.inner_html(), "A <b>bold</b> move");
        assert_eq!(value.text(), "A bold move");
    }

    #[test]
    fn reads_data_attributes() {
        let fragment = HtmlFragment::parse(
            r#"<span data-vocab-id="v1" data-broader-label-1="Art">Painting</span>"#,
        );
        let span = fragment.select_first("span").expect("span");
        assert_eq!(span.name().as_deref(), Some("span"));
        assert_eq!(span.attr("data-vocab-id").as_deref(), Some("v1"));
        assert!(span.has_attr("data-broader-label-1"));
        assert!(!span.has_attr("data-broader-label-2"));
    }

    #[test]
    fn fragment_text_of_plain_input() {
        assert_eq!(HtmlFragment::parse("just words").text(), "just words");
    }
}
