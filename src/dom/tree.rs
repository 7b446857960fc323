use crate::dom::element::{BoundingBox, ElementNode};
use crate::dom::{LiveDocument, NodeHandle};
use crate::error::{GuideError, Result};
use std::collections::HashMap;

/// An element stored in a [`DomTree`]
#[derive(Debug, Clone, PartialEq)]
pub struct DomNode {
    pub tag_name: String,
    pub attributes: HashMap<String, String>,
    pub text_content: Option<String>,
    pub bounding_box: Option<BoundingBox>,
    parent: Option<NodeHandle>,
    children: Vec<NodeHandle>,
}

/// In-memory document built from an [`ElementNode`] snapshot
///
/// Nodes live in an arena and are addressed by [`NodeHandle`]. Detached nodes stay in
/// the arena but are no longer reachable from the root, so queries stop finding them.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<DomNode>,
    root: NodeHandle,
}

impl DomTree {
    /// Index an element snapshot; the snapshot root becomes the document root
    pub fn new(root: ElementNode) -> Self {
        let mut tree = Self {
            nodes: Vec::with_capacity(root.count_elements()),
            root: NodeHandle::from_raw(0),
        };
        tree.root = tree.insert(root, None);
        tree
    }

    /// Build a document from the JSON form of an [`ElementNode`]
    pub fn from_json(json: &str) -> Result<Self> {
        let root: ElementNode = serde_json::from_str(json)?;
        Ok(Self::new(root))
    }

    fn insert(&mut self, element: ElementNode, parent: Option<NodeHandle>) -> NodeHandle {
        let handle = NodeHandle::from_raw(self.nodes.len());
        self.nodes.push(DomNode {
            tag_name: element.tag_name.to_ascii_lowercase(),
            attributes: element.attributes,
            text_content: element.text_content,
            bounding_box: element.bounding_box,
            parent,
            children: Vec::new(),
        });

        for child in element.children {
            let child_handle = self.insert(child, Some(handle));
            self.nodes[handle.raw()].children.push(child_handle);
        }

        handle
    }

    /// Look up a node by handle
    pub fn element(&self, handle: NodeHandle) -> Option<&DomNode> {
        self.nodes.get(handle.raw())
    }

    fn element_mut(&mut self, handle: NodeHandle) -> Result<&mut DomNode> {
        self.nodes
            .get_mut(handle.raw())
            .ok_or(GuideError::UnknownNode(handle.raw()))
    }

    /// Append a snapshot as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeHandle, child: ElementNode) -> Result<NodeHandle> {
        self.element_mut(parent)?;
        let handle = self.insert(child, Some(parent));
        self.nodes[parent.raw()].children.push(handle);
        Ok(handle)
    }

    /// Set or replace an attribute
    pub fn set_attribute(
        &mut self,
        handle: NodeHandle,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()> {
        self.element_mut(handle)?.attributes.insert(key.into(), value.into());
        Ok(())
    }

    /// Remove an attribute, returning its previous value
    pub fn remove_attribute(&mut self, handle: NodeHandle, key: &str) -> Result<Option<String>> {
        Ok(self.element_mut(handle)?.attributes.remove(key))
    }

    /// Detach a node (and its subtree) from its parent
    pub fn detach(&mut self, handle: NodeHandle) -> Result<()> {
        let parent = self.element_mut(handle)?.parent.take();
        if let Some(parent) = parent {
            self.nodes[parent.raw()].children.retain(|child| *child != handle);
        }
        Ok(())
    }

    /// Resolve a path of child positions starting at the root (`[]` is the root itself)
    pub fn node_at_path(&self, path: &[usize]) -> Option<NodeHandle> {
        path.iter().try_fold(self.root, |node, &index| {
            self.element(node).and_then(|n| n.children.get(index).copied())
        })
    }

    /// Parse a `/`-separated child path such as `"1/0/2"`
    pub fn node_at_path_str(&self, path: &str) -> Result<Option<NodeHandle>> {
        let indices = path
            .split('/')
            .filter(|segment| !segment.trim().is_empty())
            .map(|segment| {
                segment.trim().parse::<usize>().map_err(|e| GuideError::InvalidField {
                    field: "path".to_string(),
                    reason: format!("'{}' is not a child index: {}", segment, e),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.node_at_path(&indices))
    }

    /// Convert the reachable tree back into a snapshot
    pub fn to_snapshot(&self) -> ElementNode {
        self.snapshot_of(self.root)
    }

    fn snapshot_of(&self, handle: NodeHandle) -> ElementNode {
        let node = &self.nodes[handle.raw()];
        ElementNode {
            tag_name: node.tag_name.clone(),
            attributes: node.attributes.clone(),
            text_content: node.text_content.clone(),
            children: node.children.iter().map(|c| self.snapshot_of(*c)).collect(),
            bounding_box: node.bounding_box,
        }
    }

    /// Convert the DOM tree to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_snapshot())?)
    }

    /// Count elements reachable from the root
    pub fn count_elements(&self) -> usize {
        self.count_elements_recursive(self.root)
    }

    fn count_elements_recursive(&self, handle: NodeHandle) -> usize {
        1 + self.nodes[handle.raw()]
            .children
            .iter()
            .map(|c| self.count_elements_recursive(*c))
            .sum::<usize>()
    }
}

impl LiveDocument for DomTree {
    fn root(&self) -> NodeHandle {
        self.root
    }

    fn parent(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.element(node).and_then(|n| n.parent)
    }

    fn children(&self, node: NodeHandle) -> Vec<NodeHandle> {
        self.element(node).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn tag_name(&self, node: NodeHandle) -> Option<&str> {
        self.element(node).map(|n| n.tag_name.as_str())
    }

    fn attribute(&self, node: NodeHandle, name: &str) -> Option<&str> {
        self.element(node)
            .and_then(|n| n.attributes.get(name))
            .map(String::as_str)
    }

    fn bounding_box_of(&self, node: NodeHandle) -> Option<BoundingBox> {
        self.element(node).and_then(|n| n.bounding_box)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_tree() -> ElementNode {
        ElementNode::new("body")
            .with_child(
                ElementNode::new("header")
                    .with_child(ElementNode::new("button").with_id("nav-btn").with_text("Menu")),
            )
            .with_child(
                ElementNode::new("main")
                    .with_child(ElementNode::new("a").with_attribute("href", "/page").with_text("Click here"))
                    .with_child(ElementNode::new("div").with_classes(&["content"]).with_text("Some text")),
            )
    }

    #[test]
    fn test_dom_tree_creation() {
        let tree = DomTree::new(create_test_tree());

        assert_eq!(tree.tag_name(tree.root()), Some("body"));
        assert_eq!(tree.children(tree.root()).len(), 2);
        assert_eq!(tree.parent(tree.root()), None);
    }

    #[test]
    fn test_count_elements() {
        let tree = DomTree::new(create_test_tree());

        // body > header > button, body > main > link, div
        assert_eq!(tree.count_elements(), 6);
    }

    #[test]
    fn test_node_at_path() {
        let tree = DomTree::new(create_test_tree());

        let button = tree.node_at_path(&[0, 0]).unwrap();
        assert_eq!(tree.id(button), Some("nav-btn"));
        assert_eq!(tree.node_at_path(&[]), Some(tree.root()));
        assert_eq!(tree.node_at_path(&[5]), None);

        let div = tree.node_at_path_str("1/1").unwrap().unwrap();
        assert_eq!(tree.class_list(div), vec!["content"]);
        assert!(tree.node_at_path_str("1/x").is_err());
    }

    #[test]
    fn test_detach_hides_subtree_from_queries() {
        let mut tree = DomTree::new(create_test_tree());
        let button = tree.query_first("#nav-btn").unwrap().unwrap();

        tree.detach(button).unwrap();

        assert!(tree.query_all("#nav-btn").unwrap().is_empty());
        assert_eq!(tree.count_elements(), 5);
        assert_eq!(tree.parent(button), None);
    }

    #[test]
    fn test_append_and_mutate() {
        let mut tree = DomTree::new(create_test_tree());
        let root = tree.root();
        let added = tree
            .append_child(root, ElementNode::new("footer").with_id("foot"))
            .unwrap();

        assert_eq!(tree.query_first("body > footer").unwrap(), Some(added));

        tree.set_attribute(added, "data-guide-step", "footer").unwrap();
        assert_eq!(tree.attribute(added, "data-guide-step"), Some("footer"));
        assert_eq!(
            tree.remove_attribute(added, "id").unwrap(),
            Some("foot".to_string())
        );
        assert_eq!(tree.id(added), None);
    }

    #[test]
    fn test_unknown_handle_is_absent() {
        let tree = DomTree::new(create_test_tree());
        let bogus = NodeHandle::from_raw(999);

        assert_eq!(tree.tag_name(bogus), None);
        assert!(tree.children(bogus).is_empty());
        assert!(tree.bounding_box_of(bogus).is_none());
    }

    #[test]
    fn test_to_json() {
        let root = ElementNode::new("div")
            .with_id("container")
            .with_child(ElementNode::new("span").with_text("Hello"));

        let tree = DomTree::new(root);
        let json = tree.to_json().unwrap();

        assert!(json.contains("\"tag_name\": \"div\""));
        assert!(json.contains("\"id\": \"container\""));
        assert!(json.contains("\"span\""));
        assert!(json.contains("Hello"));

        let reparsed = DomTree::from_json(&json).unwrap();
        assert_eq!(reparsed.count_elements(), 2);
    }
}
