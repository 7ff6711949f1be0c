#![allow(dead_code)]

use std::path::Path;

use soa_extract::Node;

/// A `Table` node with one `TR` per row and one `TD` per cell. Cell text
/// sits in a nested `P`, the way the conversion service emits it.
pub fn table(rows: &[&[&str]]) -> Node {
    Node::new("Table").with_children(rows.iter().map(|cells| {
        Node::new("TR").with_children(
            cells
                .iter()
                .map(|text| Node::new("TD").with_child(Node::new("P").with_text(*text))),
        )
    }))
}

pub fn paragraph(text: &str) -> Node {
    Node::new("P").with_text(text)
}

pub fn document(children: impl IntoIterator<Item = Node>) -> Node {
    Node::new("Document").with_children(children)
}

pub fn simple_schedule() -> Node {
    document([table(&[
        &["Procedure", "V1", "V2", "V3"],
        &["Weight", "X", "", ""],
        &["ECG", "", "X", "X"],
    ])])
}

pub fn write_tree(path: &Path, root: &Node) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::write(path, serde_json::to_string_pretty(root)?)?;
    Ok(())
}
