//! Live document abstraction
//!
//! The guide engine never talks to a UI toolkit directly. Everything it needs from the
//! page is expressed by the [`LiveDocument`] capability:
//! - querying elements with a selector
//! - reading tag names, attributes and the parent/child structure
//! - reading an element's layout rectangle
//!
//! [`DomTree`] is the in-memory implementation used by tests and the CLI; a browser
//! host implements the same trait over its real document.

pub mod element;
pub mod query;
pub mod tree;

pub use element::{BoundingBox, ElementNode};
pub use query::SelectorList;
pub use tree::DomTree;

use crate::error::Result;

/// Opaque reference to an element of a [`LiveDocument`]
///
/// A handle does not keep the element alive; it only names it. Looking up a handle
/// whose element has been removed yields `None` rather than a stale element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(usize);

impl NodeHandle {
    pub fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> usize {
        self.0
    }
}

/// Read access to the current structure of a page
pub trait LiveDocument {
    /// The document root (the body element)
    fn root(&self) -> NodeHandle;

    fn parent(&self, node: NodeHandle) -> Option<NodeHandle>;

    /// Element children in document order
    fn children(&self, node: NodeHandle) -> Vec<NodeHandle>;

    /// Lower-case tag name, `None` for unknown handles
    fn tag_name(&self, node: NodeHandle) -> Option<&str>;

    fn attribute(&self, node: NodeHandle, name: &str) -> Option<&str>;

    fn bounding_box_of(&self, node: NodeHandle) -> Option<BoundingBox>;

    /// All elements matching `selector`, in document order
    fn query_all(&self, selector: &str) -> Result<Vec<NodeHandle>> {
        query::select_all(self, selector)
    }

    /// First element matching `selector`
    fn query_first(&self, selector: &str) -> Result<Option<NodeHandle>> {
        Ok(self.query_all(selector)?.into_iter().next())
    }

    /// Non-empty id attribute
    fn id(&self, node: NodeHandle) -> Option<&str> {
        self.attribute(node, "id").filter(|id| !id.is_empty())
    }

    fn class_list(&self, node: NodeHandle) -> Vec<&str> {
        self.attribute(node, "class")
            .map(|classes| classes.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Whether `node` or one of its ancestors carries `class_name`
    fn is_within_class(&self, node: NodeHandle, class_name: &str) -> bool {
        let mut current = Some(node);
        while let Some(handle) = current {
            if self.class_list(handle).contains(&class_name) {
                return true;
            }
            current = self.parent(handle);
        }
        false
    }
}
