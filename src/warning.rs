#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningCode {
    LeadingHeaderlessFragment,
    DuplicateVisitColumn,
    TableRejected,
}

impl WarningCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LeadingHeaderlessFragment => "leading_headerless_fragment",
            Self::DuplicateVisitColumn => "duplicate_visit_column",
            Self::TableRejected => "table_rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractWarning {
    pub code: WarningCode,
    pub message: String,
    pub table_id: Option<usize>,
    pub row: Option<usize>,
}

impl ExtractWarning {
    #[must_use]
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            table_id: None,
            row: None,
        }
    }

    #[must_use]
    pub fn with_table_id(mut self, table_id: usize) -> Self {
        self.table_id = Some(table_id);
        self
    }

    #[must_use]
    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }
}
