use tracing::{debug, trace};

use crate::header::{HeaderRow, detect_header_row};
use crate::model::TableRow;
use crate::procedure::RejectReason;
use crate::rules::Rules;
use crate::visit::VisitColumnMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    SearchingHeader,
    HeaderFound,
    CollectingRows,
    EndDetected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    /// A long run of rejected rows after the procedure floor was reached.
    RejectionRun,
    /// A section-break phrase after the section-break floor was reached.
    SectionBreak(String),
    EndOfInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleScan {
    pub header: HeaderRow,
    /// Indices of accepted procedure rows, in scan order.
    pub accepted: Vec<usize>,
    /// First row index not part of the schedule.
    pub end_row: usize,
    pub end_reason: EndReason,
}

pub(crate) fn classify_row(
    row: &TableRow<'_>,
    columns: &VisitColumnMap,
    rules: &Rules,
) -> Result<(), RejectReason> {
    let label = row.label();
    if label.is_empty() {
        return Err(RejectReason::EmptyLabel);
    }
    if rules.visits.extract_visit_token(label).is_some() {
        return Err(RejectReason::VisitLabel);
    }
    rules.labels.check_label(label)?;

    let marked = columns
        .columns()
        .iter()
        .any(|column| rules.markers.cell_has_marker(row.cell(column.index)));
    if marked {
        Ok(())
    } else {
        Err(RejectReason::NoMarker)
    }
}

/// Running counts behind end-of-schedule detection.
#[derive(Debug, Default)]
struct EndTracker {
    accepted: usize,
    rejected_run: usize,
    run_start: usize,
}

impl EndTracker {
    fn accept(&mut self) {
        self.accepted += 1;
        self.rejected_run = 0;
    }

    /// Returns the first row of the rejected run once it exceeds the ceiling.
    fn reject(&mut self, index: usize, rules: &Rules) -> Option<usize> {
        if self.rejected_run == 0 {
            self.run_start = index;
        }
        self.rejected_run += 1;
        (self.accepted >= rules.config.procedure_floor
            && self.rejected_run > rules.config.rejection_ceiling)
            .then_some(self.run_start)
    }

    fn section_break(&self, label: &str, rules: &Rules) -> Option<String> {
        if self.accepted < rules.config.section_break_floor {
            return None;
        }
        rules.section_break(label).map(|_| label.to_string())
    }
}

/// Walks the concatenated schedule rows: locate the header, then collect
/// procedure rows until an end heuristic fires or the rows run out.
pub(crate) struct ScheduleScanner<'r> {
    rules: &'r Rules,
    state: ScanState,
}

impl<'r> ScheduleScanner<'r> {
    pub fn new(rules: &'r Rules) -> Self {
        Self {
            rules,
            state: ScanState::SearchingHeader,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    fn transition(&mut self, next: ScanState) {
        debug!(from = ?self.state, to = ?next, "schedule scan state");
        self.state = next;
    }

    pub fn run(&mut self, rows: &[TableRow<'_>]) -> Option<ScheduleScan> {
        self.state = ScanState::SearchingHeader;
        let header = detect_header_row(rows, self.rules)?;
        self.transition(ScanState::HeaderFound);
        debug!(
            row = header.index,
            score = header.score,
            visits = header.columns.len(),
            "visit header row found"
        );

        self.transition(ScanState::CollectingRows);
        let mut tracker = EndTracker::default();
        let mut accepted = Vec::new();
        let mut end_row = rows.len();
        let mut end_reason = EndReason::EndOfInput;

        for (index, row) in rows.iter().enumerate().skip(header.index + 1) {
            if row.cells.is_empty() {
                continue;
            }

            if let Some(phrase) = tracker.section_break(row.label(), self.rules) {
                end_row = index;
                end_reason = EndReason::SectionBreak(phrase);
                break;
            }

            match classify_row(row, &header.columns, self.rules) {
                Ok(()) => {
                    tracker.accept();
                    accepted.push(index);
                }
                Err(reason) => {
                    trace!(row = index, ?reason, label = row.label(), "row rejected");
                    if let Some(run_start) = tracker.reject(index, self.rules) {
                        end_row = run_start;
                        end_reason = EndReason::RejectionRun;
                        break;
                    }
                }
            }
        }

        self.transition(ScanState::EndDetected);
        debug!(
            end_row,
            ?end_reason,
            accepted = accepted.len(),
            "schedule end resolved"
        );

        Some(ScheduleScan {
            header,
            accepted,
            end_row,
            end_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{EndReason, ScanState, ScheduleScanner, classify_row};
    use crate::config::ScheduleConfig;
    use crate::model::TableRow;
    use crate::node::Node;
    use crate::procedure::RejectReason;
    use crate::rules::{Rules, default_rules};
    use crate::visit::VisitColumnMap;

    fn row<'a>(node: &'a Node, cells: &[&str]) -> TableRow<'a> {
        TableRow {
            node,
            cells: cells.iter().map(ToString::to_string).collect(),
        }
    }

    fn header(node: &Node) -> TableRow<'_> {
        row(node, &["Assessment", "V1", "V2", "V3"])
    }

    fn accepted(node: &Node, count: usize, start: usize) -> Vec<TableRow<'_>> {
        (start..start + count)
            .map(|n| row(node, &[&format!("Assessment {n}"), "X", "", "X"]))
            .collect()
    }

    fn rejected(node: &Node, count: usize) -> Vec<TableRow<'_>> {
        (0..count)
            .map(|n| row(node, &[&format!("Footnote text {n}"), "", "", ""]))
            .collect()
    }

    fn rules(floor: usize, ceiling: usize, section_floor: usize) -> Rules {
        Rules::compile(ScheduleConfig {
            procedure_floor: floor,
            rejection_ceiling: ceiling,
            section_break_floor: section_floor,
            ..ScheduleConfig::default()
        })
        .expect("config compiles")
    }

    #[test]
    fn classifies_rows_against_visit_columns() {
        let node = Node::new("TR");
        let rules = default_rules();
        let columns = VisitColumnMap::from_header(&rules.visits, &header(&node).cells);

        let cases: [(&[&str], Result<(), RejectReason>); 6] = [
            (&["Weight", "X", "", ""], Ok(())),
            (&["", "X", "", ""], Err(RejectReason::EmptyLabel)),
            (&["V4", "X", "X", "X"], Err(RejectReason::VisitLabel)),
            (&["Visit window", "X", "", ""], Err(RejectReason::HeaderLabel)),
            (&["10.2 Safety", "X", "", ""], Err(RejectReason::NonProcedureText)),
            (&["Weight", "", "", "", "X"], Err(RejectReason::NoMarker)),
        ];
        for (cells, expected) in cases {
            assert_eq!(
                classify_row(&row(&node, cells), &columns, &rules),
                expected,
                "cells {cells:?}"
            );
        }
    }

    #[test]
    fn rejection_run_ends_at_first_rejected_row() {
        let node = Node::new("TR");
        let mut rows = vec![header(&node)];
        rows.extend(accepted(&node, 35, 1));
        rows.extend(rejected(&node, 22));
        rows.extend(accepted(&node, 3, 100));

        let rules = rules(30, 20, 20);
        let mut scanner = ScheduleScanner::new(&rules);
        let scan = scanner.run(&rows).expect("header should be found");

        assert_eq!(scan.end_reason, EndReason::RejectionRun);
        assert_eq!(scan.end_row, 36);
        assert_eq!(scan.accepted.len(), 35);
        assert_eq!(scanner.state(), ScanState::EndDetected);
    }

    #[test]
    fn rejection_run_below_floor_never_terminates() {
        let node = Node::new("TR");
        let mut rows = vec![header(&node)];
        rows.extend(accepted(&node, 10, 1));
        rows.extend(rejected(&node, 40));
        rows.extend(accepted(&node, 3, 100));

        let rules = rules(30, 20, 20);
        let scan = ScheduleScanner::new(&rules)
            .run(&rows)
            .expect("header should be found");

        assert_eq!(scan.end_reason, EndReason::EndOfInput);
        assert_eq!(scan.end_row, rows.len());
        assert_eq!(scan.accepted.len(), 13);
    }

    #[test]
    fn section_break_after_floor_ends_collection() {
        let node = Node::new("TR");
        let mut rows = vec![header(&node)];
        rows.extend(accepted(&node, 21, 1));
        rows.push(row(&node, &["Objectives", "", "", ""]));
        rows.extend(accepted(&node, 5, 100));

        let rules = rules(30, 20, 20);
        let scan = ScheduleScanner::new(&rules)
            .run(&rows)
            .expect("header should be found");

        assert_eq!(
            scan.end_reason,
            EndReason::SectionBreak("Objectives".to_string())
        );
        assert_eq!(scan.end_row, 22);
        assert_eq!(scan.accepted.len(), 21);
    }

    #[test]
    fn section_break_below_floor_is_skipped() {
        let node = Node::new("TR");
        let mut rows = vec![header(&node)];
        rows.extend(accepted(&node, 5, 1));
        rows.push(row(&node, &["Objectives", "", "", ""]));
        rows.extend(accepted(&node, 3, 100));

        let rules = rules(30, 20, 20);
        let scan = ScheduleScanner::new(&rules)
            .run(&rows)
            .expect("header should be found");

        assert_eq!(scan.end_reason, EndReason::EndOfInput);
        assert_eq!(scan.accepted.len(), 8);
    }

    #[test]
    fn rows_before_header_are_ignored() {
        let node = Node::new("TR");
        let mut rows = accepted(&node, 2, 1);
        rows.push(header(&node));
        rows.push(row(&node, &[]));
        rows.extend(accepted(&node, 2, 10));

        let rules = default_rules();
        let scan = ScheduleScanner::new(&rules)
            .run(&rows)
            .expect("header should be found");

        assert_eq!(scan.header.index, 2);
        assert_eq!(scan.accepted, vec![4, 5]);
    }

    #[test]
    fn missing_header_stops_in_search_state() {
        let node = Node::new("TR");
        let rows = accepted(&node, 3, 1);
        let rules = default_rules();
        let mut scanner = ScheduleScanner::new(&rules);

        assert!(scanner.run(&rows).is_none());
        assert_eq!(scanner.state(), ScanState::SearchingHeader);
    }
}
