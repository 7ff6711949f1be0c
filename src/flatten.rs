use crate::node::Node;

/// Own text plus every descendant's text, depth-first, with all whitespace
/// runs collapsed to single spaces.
#[must_use]
pub fn render_text(node: &Node) -> String {
    let mut words = Vec::new();
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        words.extend(current.own_text().split_whitespace());
        stack.extend(current.children.iter().rev());
    }
    words.join(" ")
}

/// One string per direct cell child of `row`. Empty cells stay in place so
/// column indices line up with the header row.
#[must_use]
pub fn flatten_row(row: &Node) -> Vec<String> {
    row.children
        .iter()
        .filter(|child| child.is_cell())
        .map(render_text)
        .collect()
}
