use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

pub(crate) const TABLE_TAG: &str = "Table";
pub(crate) const ROW_TAG: &str = "TR";
const CELL_TAGS: [&str; 2] = ["TD", "TH"];
const SYNTHETIC_ROOT_TAG: &str = "Document";

/// One node of the converted document tree.
///
/// Tags are matched by prefix because the conversion service numbers
/// repeated siblings (`TD[2]`, `Table[3]`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "name", default)]
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TreeInput {
    Node(Node),
    Forest(Vec<Node>),
}

impl Node {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    #[must_use]
    pub fn has_tag(&self, prefix: &str) -> bool {
        self.tag.starts_with(prefix)
    }

    #[must_use]
    pub fn is_cell(&self) -> bool {
        CELL_TAGS.iter().any(|prefix| self.has_tag(prefix))
    }

    #[must_use]
    pub fn own_text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// All nodes in this subtree (including `self`) whose tag starts with
    /// `prefix`, in document (pre-)order.
    #[must_use]
    pub fn find_all(&self, prefix: &str) -> Vec<&Node> {
        let mut found = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.has_tag(prefix) {
                found.push(node);
            }
            stack.extend(node.children.iter().rev());
        }
        found
    }

    #[must_use]
    pub fn tables(&self) -> Vec<&Node> {
        self.find_all(TABLE_TAG)
    }

    #[must_use]
    pub fn rows(&self) -> Vec<&Node> {
        self.find_all(ROW_TAG)
    }
}

/// Parses a converted document tree. A top-level array of nodes is wrapped
/// in a synthetic `Document` root.
pub fn parse_tree(json: &str) -> Result<Node, ExtractError> {
    let input: TreeInput = serde_json::from_str(json).map_err(ExtractError::Tree)?;
    Ok(match input {
        TreeInput::Node(node) => node,
        TreeInput::Forest(children) => Node::new(SYNTHETIC_ROOT_TAG).with_children(children),
    })
}
