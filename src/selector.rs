//! Stable selector synthesis
//!
//! Given an element of a [`LiveDocument`], produce a selector that re-locates the same
//! element later. Rules are tried in order and the first one that applies wins:
//!
//! 1. the guide marker attribute (`[data-guide-step="..."]`)
//! 2. the element id (`#id`)
//! 3. the element's own classes, when they match exactly one element
//! 4. a short ancestor path (`main.content > div.card:nth-of-type(2)`)
//!
//! The first three rules always find the element again. The ancestor path is best-effort:
//! it stops after three segments, so in a deeply repeated structure it can match an
//! earlier element first. Such paths are logged at debug level.
//!
//! Classes that start with a reserved prefix belong to transient picker or hover state
//! and never take part in a selector.

use crate::dom::query::{escape_ident, quote_attr_value};
use crate::dom::{LiveDocument, NodeHandle};
use crate::error::{GuideError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute authors put on elements that should anchor guide steps
pub const DEFAULT_MARKER_ATTRIBUTE: &str = "data-guide-step";

/// Class prefixes used by the picker and hover styling
pub const DEFAULT_RESERVED_PREFIXES: [&str; 2] = ["hover-", "picker-"];

/// Maximum number of segments in an ancestor path
pub const MAX_PATH_DEPTH: usize = 3;

/// Maximum number of classes kept on one path segment
pub const MAX_PATH_CLASSES: usize = 2;

/// A selector string in the query sublanguage understood by [`LiveDocument::query_all`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Selector(String);

impl Selector {
    pub fn new(selector: impl Into<String>) -> Self {
        Self(selector.into())
    }

    /// Selector on the default marker attribute
    pub fn for_marker(value: &str) -> Self {
        Self(format!("[{}={}]", DEFAULT_MARKER_ATTRIBUTE, quote_attr_value(value)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Resolve against `doc`, returning all matches in document order
    pub fn resolve_all<D: LiveDocument + ?Sized>(&self, doc: &D) -> Result<Vec<NodeHandle>> {
        doc.query_all(&self.0)
    }

    /// Resolve against `doc`, failing with [`GuideError::SelectorResolution`] on zero matches
    pub fn resolve<D: LiveDocument + ?Sized>(&self, doc: &D) -> Result<NodeHandle> {
        doc.query_first(&self.0)?
            .ok_or_else(|| GuideError::SelectorResolution(self.0.clone()))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Selector {
    fn from(selector: &str) -> Self {
        Self(selector.to_string())
    }
}

impl From<String> for Selector {
    fn from(selector: String) -> Self {
        Self(selector)
    }
}

/// Which synthesis rule produced a selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorRule {
    Marker,
    Id,
    UniqueClasses,
    AncestorPath,
}

/// Produces selectors for live elements
#[derive(Debug, Clone)]
pub struct SelectorSynthesizer {
    marker_attribute: String,
    reserved_prefixes: Vec<String>,
    max_depth: usize,
    max_path_classes: usize,
}

impl Default for SelectorSynthesizer {
    fn default() -> Self {
        Self {
            marker_attribute: DEFAULT_MARKER_ATTRIBUTE.to_string(),
            reserved_prefixes: DEFAULT_RESERVED_PREFIXES.iter().map(|p| p.to_string()).collect(),
            max_depth: MAX_PATH_DEPTH,
            max_path_classes: MAX_PATH_CLASSES,
        }
    }
}

impl SelectorSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: anchor on a different marker attribute
    pub fn marker_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.marker_attribute = attribute.into();
        self
    }

    /// Builder method: replace the reserved class prefixes
    pub fn reserved_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method: bound the ancestor path length
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.max(1);
        self
    }

    pub fn marker(&self) -> &str {
        &self.marker_attribute
    }

    /// Synthesize a selector for `node`
    pub fn synthesize<D: LiveDocument + ?Sized>(&self, doc: &D, node: NodeHandle) -> Result<Selector> {
        self.synthesize_with_rule(doc, node).map(|(selector, _)| selector)
    }

    /// Synthesize a selector for `node` and report which rule produced it
    pub fn synthesize_with_rule<D: LiveDocument + ?Sized>(
        &self,
        doc: &D,
        node: NodeHandle,
    ) -> Result<(Selector, SelectorRule)> {
        if doc.tag_name(node).is_none() {
            return Err(GuideError::UnknownNode(node.raw()));
        }

        if let Some(value) = doc.attribute(node, &self.marker_attribute).filter(|v| !v.is_empty()) {
            let selector = format!("[{}={}]", self.marker_attribute, quote_attr_value(value));
            return Ok((Selector(selector), SelectorRule::Marker));
        }

        if let Some(id) = doc.id(node) {
            return Ok((Selector(format!("#{}", escape_ident(id))), SelectorRule::Id));
        }

        let classes = self.usable_classes(doc.class_list(node));
        if !classes.is_empty() {
            let class_selector = class_suffix(&classes);
            match doc.query_all(&class_selector) {
                Ok(matches) if matches.len() == 1 => {
                    return Ok((Selector(class_selector), SelectorRule::UniqueClasses));
                }
                Ok(matches) => {
                    log::debug!(
                        "Class selector '{}' matches {} elements, falling back to path",
                        class_selector,
                        matches.len()
                    );
                }
                Err(e) => log::debug!("Class selector '{}' not usable: {}", class_selector, e),
            }
        }

        let path = self.ancestor_path(doc, node);
        match doc.query_first(&path) {
            Ok(Some(first)) if first == node => {}
            Ok(first) => log::debug!(
                "Path '{}' finds {:?} before node {}; the depth limit left it ambiguous",
                path,
                first,
                node.raw()
            ),
            Err(e) => log::debug!("Path '{}' not usable: {}", path, e),
        }
        Ok((Selector(path), SelectorRule::AncestorPath))
    }

    /// Classes of an element that may appear in a selector
    pub fn usable_classes<'a>(&self, classes: Vec<&'a str>) -> Vec<&'a str> {
        classes
            .into_iter()
            .filter(|class| !self.is_reserved(class))
            .collect()
    }

    fn is_reserved(&self, class: &str) -> bool {
        self.reserved_prefixes
            .iter()
            .any(|prefix| class.starts_with(prefix.as_str()))
    }

    fn ancestor_path<D: LiveDocument + ?Sized>(&self, doc: &D, node: NodeHandle) -> String {
        let root = doc.root();
        let mut segments = Vec::new();
        let mut current = Some(node);

        while let Some(handle) = current {
            if handle == root || segments.len() >= self.max_depth {
                break;
            }

            if let Some(id) = doc.id(handle) {
                segments.push(format!("#{}", escape_ident(id)));
                break;
            }

            let Some(tag) = doc.tag_name(handle) else {
                break;
            };
            let mut segment = tag.to_string();

            let classes = self.usable_classes(doc.class_list(handle));
            if !classes.is_empty() {
                let kept: Vec<&str> = classes.into_iter().take(self.max_path_classes).collect();
                segment.push_str(&class_suffix(&kept));
            }

            let parent = doc.parent(handle);
            if let Some(parent) = parent {
                let same_tag: Vec<NodeHandle> = doc
                    .children(parent)
                    .into_iter()
                    .filter(|sibling| doc.tag_name(*sibling) == Some(tag))
                    .collect();
                if same_tag.len() > 1 {
                    if let Some(position) = same_tag.iter().position(|s| *s == handle) {
                        segment.push_str(&format!(":nth-of-type({})", position + 1));
                    }
                }
            }

            segments.push(segment);
            current = parent;
        }

        if segments.is_empty() {
            // The root itself, which has no path below the document.
            return doc.tag_name(node).unwrap_or("*").to_string();
        }

        segments.reverse();
        segments.join(" > ")
    }
}

fn class_suffix(classes: &[&str]) -> String {
    classes
        .iter()
        .map(|class| format!(".{}", escape_ident(class)))
        .collect()
}

/// Synthesize a selector with the default rules
pub fn synthesize<D: LiveDocument + ?Sized>(doc: &D, node: NodeHandle) -> Result<Selector> {
    SelectorSynthesizer::default().synthesize(doc, node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{DomTree, ElementNode};

    fn invoice_page() -> DomTree {
        DomTree::new(
            ElementNode::new("body")
                .with_child(
                    ElementNode::new("nav").with_child(
                        ElementNode::new("button")
                            .with_id("start-guide")
                            .with_attribute("data-guide-step", "welcome"),
                    ),
                )
                .with_child(
                    ElementNode::new("main")
                        .with_classes(&["page", "hover-lift"])
                        .with_child(
                            ElementNode::new("button")
                                .with_id("save")
                                .with_classes(&["hover-x", "primary"]),
                        )
                        .with_child(ElementNode::new("section").with_classes(&["totals"]))
                        .with_child(ElementNode::new("div").with_classes(&["row", "picker-hovered"]))
                        .with_child(ElementNode::new("div").with_classes(&["row"]))
                        .with_child(ElementNode::new("span").with_classes(&["picker-hovered"])),
                ),
        )
    }

    #[test]
    fn test_marker_wins_over_id() {
        let doc = invoice_page();
        let button = doc.query_first("#start-guide").unwrap().unwrap();

        let (selector, rule) = SelectorSynthesizer::new().synthesize_with_rule(&doc, button).unwrap();
        assert_eq!(selector.as_str(), "[data-guide-step=\"welcome\"]");
        assert_eq!(rule, SelectorRule::Marker);
    }

    #[test]
    fn test_id_wins_over_classes() {
        let doc = invoice_page();
        let button = doc.query_first("#save").unwrap().unwrap();
        assert_eq!(synthesize(&doc, button).unwrap().as_str(), "#save");
    }

    #[test]
    fn test_empty_marker_is_ignored() {
        let doc = DomTree::new(
            ElementNode::new("body").with_child(
                ElementNode::new("input")
                    .with_attribute("data-guide-step", "")
                    .with_id("qty"),
            ),
        );
        let input = doc.node_at_path(&[0]).unwrap();
        assert_eq!(synthesize(&doc, input).unwrap().as_str(), "#qty");
    }

    #[test]
    fn test_unique_class_selector() {
        let doc = invoice_page();
        let totals = doc.query_first("section").unwrap().unwrap();

        let (selector, rule) = SelectorSynthesizer::new().synthesize_with_rule(&doc, totals).unwrap();
        assert_eq!(selector.as_str(), ".totals");
        assert_eq!(rule, SelectorRule::UniqueClasses);
    }

    #[test]
    fn test_shared_class_falls_back_to_positional_path() {
        let doc = invoice_page();
        let rows = doc.query_all("div.row").unwrap();
        assert_eq!(rows.len(), 2);

        let first = synthesize(&doc, rows[0]).unwrap();
        let second = synthesize(&doc, rows[1]).unwrap();
        assert_eq!(first.as_str(), "main.page > div.row:nth-of-type(1)");
        assert_eq!(second.as_str(), "main.page > div.row:nth-of-type(2)");

        assert_eq!(first.resolve_all(&doc).unwrap(), vec![rows[0]]);
        assert_eq!(second.resolve_all(&doc).unwrap(), vec![rows[1]]);
    }

    #[test]
    fn test_reserved_classes_never_appear() {
        let doc = invoice_page();
        let span = doc.query_first("span").unwrap().unwrap();

        let selector = synthesize(&doc, span).unwrap();
        assert_eq!(selector.as_str(), "main.page > span");
        assert!(!selector.as_str().contains("picker-"));
        assert!(!selector.as_str().contains("hover-"));
    }

    #[test]
    fn test_path_stops_at_ancestor_id() {
        let doc = DomTree::new(
            ElementNode::new("body").with_child(
                ElementNode::new("div").with_id("panel").with_child(
                    ElementNode::new("ul")
                        .with_child(ElementNode::new("li"))
                        .with_child(ElementNode::new("li")),
                ),
            ),
        );
        let second = doc.node_at_path(&[0, 0, 1]).unwrap();

        let selector = synthesize(&doc, second).unwrap();
        assert_eq!(selector.as_str(), "#panel > ul > li:nth-of-type(2)");
        assert_eq!(selector.resolve(&doc).unwrap(), second);
    }

    #[test]
    fn test_path_is_bounded_to_three_segments() {
        let doc = DomTree::new(
            ElementNode::new("body").with_child(
                ElementNode::new("div").with_child(
                    ElementNode::new("section").with_child(
                        ElementNode::new("article")
                            .with_child(ElementNode::new("p").with_child(ElementNode::new("em"))),
                    ),
                ),
            ),
        );
        let em = doc.node_at_path(&[0, 0, 0, 0, 0]).unwrap();

        let selector = synthesize(&doc, em).unwrap();
        assert_eq!(selector.as_str(), "article > p > em");
        assert_eq!(selector.resolve(&doc).unwrap(), em);
    }

    #[test]
    fn test_deep_path_is_best_effort() {
        let branch = || {
            ElementNode::new("div").with_child(
                ElementNode::new("ul").with_child(ElementNode::new("li").with_child(ElementNode::new("span"))),
            )
        };
        let doc = DomTree::new(
            ElementNode::new("body")
                .with_child(ElementNode::new("section").with_child(branch()))
                .with_child(ElementNode::new("aside").with_child(branch())),
        );
        let spans = doc.query_all("span").unwrap();
        let target = spans[1];

        let (selector, rule) = SelectorSynthesizer::default().synthesize_with_rule(&doc, target).unwrap();
        assert_eq!(rule, SelectorRule::AncestorPath);
        assert_eq!(selector.as_str(), "ul > li > span");
        assert_eq!(selector.resolve_all(&doc).unwrap(), spans);
    }

    #[test]
    fn test_leading_digit_id_is_escaped() {
        let doc = DomTree::new(ElementNode::new("body").with_child(ElementNode::new("div").with_id("2024-summary")));
        let node = doc.query_first("div").unwrap().unwrap();

        let selector = synthesize(&doc, node).unwrap();
        assert_eq!(selector.as_str(), "#\\32 024-summary");
        assert_eq!(selector.resolve(&doc).unwrap(), node);
    }

    #[test]
    fn test_isolated_element_yields_bare_tag() {
        let doc = DomTree::new(ElementNode::new("body").with_child(ElementNode::new("footer")));
        let footer = doc.node_at_path(&[0]).unwrap();
        assert_eq!(synthesize(&doc, footer).unwrap().as_str(), "footer");
        assert_eq!(synthesize(&doc, doc.root()).unwrap().as_str(), "body");
    }

    #[test]
    fn test_custom_marker_and_prefixes() {
        let doc = DomTree::new(
            ElementNode::new("body")
                .with_child(ElementNode::new("a").with_attribute("data-tour", "help"))
                .with_child(ElementNode::new("div").with_classes(&["is-active", "panel"])),
        );
        let synthesizer = SelectorSynthesizer::new()
            .marker_attribute("data-tour")
            .reserved_prefixes(["is-"]);

        let link = doc.node_at_path(&[0]).unwrap();
        let panel = doc.node_at_path(&[1]).unwrap();
        assert_eq!(synthesizer.synthesize(&doc, link).unwrap().as_str(), "[data-tour=\"help\"]");
        assert_eq!(synthesizer.synthesize(&doc, panel).unwrap().as_str(), ".panel");
    }

    #[test]
    fn test_unknown_node_is_an_error() {
        let doc = invoice_page();
        let result = synthesize(&doc, NodeHandle::from_raw(4242));
        assert!(matches!(result, Err(GuideError::UnknownNode(4242))));
    }

    #[test]
    fn test_selector_serializes_as_plain_string() {
        let selector = Selector::for_marker("save-invoice");
        let json = serde_json::to_string(&selector).unwrap();
        assert_eq!(json, "\"[data-guide-step=\\\"save-invoice\\\"]\"");
        let back: Selector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, selector);
    }
}
