//! Recovers the Schedule of Activities from a converted protocol tree.
//!
//! The input is the heading/paragraph/table tree produced by an upstream
//! document-extraction service. [`ScheduleExtractor`] finds the table
//! fragments that form the schedule, stitches page-broken fragments back
//! together, locates the visit header row, decides where the procedure rows
//! end and returns a procedure × visit [`ScheduleMatrix`].

mod config;
mod csv_out;
mod error;
mod flatten;
mod header;
mod marker;
mod matrix;
mod merge;
mod model;
mod node;
mod procedure;
mod rules;
mod scan;
mod select;
mod visit;
mod warning;

use tracing::{debug, info, warn};

use crate::matrix::MatrixBuilder;
use crate::merge::{collect_fragments, merge_fragments};
use crate::model::TableRow;
use crate::rules::Rules;
use crate::scan::ScheduleScanner;
use crate::select::select_schedule_tables;

pub use config::{HeaderStrategy, ScheduleConfig, TableQualification};
pub use csv_out::{OutputFormat, render_matrix, write_records, write_table, write_table_to_string};
pub use error::{ConfigError, ExtractError};
pub use flatten::{flatten_row, render_text};
pub use marker::MarkerDetector;
pub use matrix::{RenderedTable, ScheduleMatrix};
pub use node::{Node, parse_tree};
pub use procedure::RejectReason;
pub use scan::EndReason;
pub use visit::{VisitColumn, VisitColumnMap, VisitMatcher};
pub use warning::{ExtractWarning, WarningCode};

/// Why an extraction produced the matrix it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStatus {
    Extracted,
    NoTablesFound,
    NoQualifyingScheduleTable,
    NoVisitHeaderFound,
    /// A header was found but no row qualified; the matrix has visits only.
    EmptyProcedureSet,
}

impl ExtractionStatus {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Extracted => "extracted",
            Self::NoTablesFound => "no_tables_found",
            Self::NoQualifyingScheduleTable => "no_qualifying_schedule_table",
            Self::NoVisitHeaderFound => "no_visit_header_found",
            Self::EmptyProcedureSet => "empty_procedure_set",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionReport {
    pub status: ExtractionStatus,
    pub fragment_count: usize,
    pub table_count: usize,
    pub selected_table_count: usize,
    /// Header row index within the concatenated rows of the selected tables.
    pub header_row: Option<usize>,
    pub end_row: Option<usize>,
    pub end_reason: Option<EndReason>,
    pub warnings: Vec<ExtractWarning>,
}

impl ExtractionReport {
    fn new(status: ExtractionStatus) -> Self {
        Self {
            status,
            fragment_count: 0,
            table_count: 0,
            selected_table_count: 0,
            header_row: None,
            end_row: None,
            end_reason: None,
            warnings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub matrix: ScheduleMatrix,
    pub report: ExtractionReport,
}

impl Extraction {
    fn failed(report: ExtractionReport) -> Self {
        warn!(status = report.status.code(), "no schedule extracted");
        Self {
            matrix: ScheduleMatrix::default(),
            report,
        }
    }
}

/// Schedule recovery with a fixed, validated configuration.
///
/// Construction compiles every pattern and is the only fallible step;
/// extraction itself never fails on irregular input.
#[derive(Debug, Clone)]
pub struct ScheduleExtractor {
    rules: Rules,
}

impl ScheduleExtractor {
    pub fn new(config: ScheduleConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            rules: Rules::compile(config)?,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ScheduleConfig {
        &self.rules.config
    }

    #[must_use]
    pub fn visit_matcher(&self) -> &VisitMatcher {
        &self.rules.visits
    }

    #[must_use]
    pub fn marker_detector(&self) -> &MarkerDetector {
        &self.rules.markers
    }

    #[must_use]
    pub fn extract(&self, root: &Node) -> Extraction {
        let mut report = ExtractionReport::new(ExtractionStatus::Extracted);

        let fragments = collect_fragments(root, &self.rules);
        report.fragment_count = fragments.len();
        if fragments.is_empty() {
            report.status = ExtractionStatus::NoTablesFound;
            return Extraction::failed(report);
        }

        let merged = merge_fragments(fragments, &mut report.warnings);
        report.table_count = merged.len();
        debug!(
            fragments = report.fragment_count,
            tables = report.table_count,
            "table fragments merged"
        );

        let selected = select_schedule_tables(merged, &self.rules, &mut report.warnings);
        report.selected_table_count = selected.len();
        if selected.is_empty() {
            report.status = ExtractionStatus::NoQualifyingScheduleTable;
            return Extraction::failed(report);
        }

        let rows: Vec<TableRow<'_>> = selected.into_iter().flat_map(|table| table.rows).collect();
        let mut scanner = ScheduleScanner::new(&self.rules);
        let Some(scan) = scanner.run(&rows) else {
            debug!(state = ?scanner.state(), rows = rows.len(), "no visit header row");
            report.status = ExtractionStatus::NoVisitHeaderFound;
            return Extraction::failed(report);
        };

        for column in scan.header.columns.renamed() {
            report.warnings.push(
                ExtractWarning::new(
                    WarningCode::DuplicateVisitColumn,
                    format!(
                        "visit '{}' repeats in the header; column renamed to '{}'",
                        column.token, column.visit
                    ),
                )
                .with_row(scan.header.index),
            );
        }

        let mut builder = MatrixBuilder::new(scan.header.columns.visit_order());
        for &index in &scan.accepted {
            let row = &rows[index];
            let marked = scan
                .header
                .columns
                .columns()
                .iter()
                .enumerate()
                .filter(|(_, column)| self.rules.markers.cell_has_marker(row.cell(column.index)))
                .map(|(position, _)| position);
            builder.add_row(row.label(), marked);
        }
        let matrix = builder.build();

        report.header_row = Some(scan.header.index);
        report.end_row = Some(scan.end_row);
        report.end_reason = Some(scan.end_reason);
        if matrix.procedure_order().is_empty() {
            report.status = ExtractionStatus::EmptyProcedureSet;
            warn!(
                visits = matrix.visit_order().len(),
                "visit header found but no procedure rows accepted"
            );
        }

        info!(
            status = report.status.code(),
            procedures = matrix.procedure_order().len(),
            visits = matrix.visit_order().len(),
            associations = matrix.association_count(),
            "schedule extraction finished"
        );

        Extraction { matrix, report }
    }

    /// Parses `json` as a document tree and extracts from it.
    pub fn extract_json(&self, json: &str) -> Result<Extraction, ExtractError> {
        let root = parse_tree(json)?;
        Ok(self.extract(&root))
    }
}

/// One-shot extraction with `config`.
pub fn extract_schedule(root: &Node, config: &ScheduleConfig) -> Result<Extraction, ConfigError> {
    Ok(ScheduleExtractor::new(config.clone())?.extract(root))
}
