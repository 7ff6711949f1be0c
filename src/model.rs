use crate::flatten::flatten_row;
use crate::node::Node;

/// A row of the input tree together with its flattened cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow<'a> {
    pub node: &'a Node,
    pub cells: Vec<String>,
}

impl<'a> TableRow<'a> {
    #[must_use]
    pub fn new(node: &'a Node) -> Self {
        Self {
            node,
            cells: flatten_row(node),
        }
    }

    /// The trimmed first cell, where the procedure name lives.
    #[must_use]
    pub fn label(&self) -> &str {
        self.cells.first().map_or("", |cell| cell.trim())
    }

    #[must_use]
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map_or("", String::as_str)
    }
}

/// One or more page fragments reassembled into a single table. Rows borrow
/// the input tree, which is never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalTable<'a> {
    /// 1-based document-order ids of the fragments merged into this table.
    pub fragment_ids: Vec<usize>,
    pub rows: Vec<TableRow<'a>>,
    pub has_visits: bool,
}

impl<'a> LogicalTable<'a> {
    #[must_use]
    pub fn from_fragment(fragment_id: usize, table: &'a Node) -> Self {
        Self {
            fragment_ids: vec![fragment_id],
            rows: table.rows().into_iter().map(TableRow::new).collect(),
            has_visits: false,
        }
    }

    #[must_use]
    pub fn id(&self) -> usize {
        self.fragment_ids.first().copied().unwrap_or_default()
    }

    pub(crate) fn absorb(&mut self, other: LogicalTable<'a>) {
        self.fragment_ids.extend(other.fragment_ids);
        self.rows.extend(other.rows);
    }
}
