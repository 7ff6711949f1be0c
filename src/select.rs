use tracing::debug;

use crate::config::TableQualification;
use crate::model::LogicalTable;
use crate::rules::Rules;
use crate::warning::{ExtractWarning, WarningCode};

fn max_row_visits(table: &LogicalTable<'_>, rules: &Rules) -> usize {
    table
        .rows
        .iter()
        .map(|row| rules.visits.distinct_visits(&row.cells))
        .max()
        .unwrap_or(0)
}

pub(crate) fn qualifies(table: &LogicalTable<'_>, rules: &Rules) -> bool {
    if max_row_visits(table, rules) < rules.config.min_table_visits {
        return false;
    }
    match rules.config.table_qualification {
        TableQualification::VisitsOnly => true,
        TableQualification::VisitsAndProcedures => table
            .rows
            .iter()
            .any(|row| rules.is_plausible_procedure_row(row)),
    }
}

/// Keeps the merged tables that look like a Schedule of Activities.
pub(crate) fn select_schedule_tables<'a>(
    tables: Vec<LogicalTable<'a>>,
    rules: &Rules,
    warnings: &mut Vec<ExtractWarning>,
) -> Vec<LogicalTable<'a>> {
    tables
        .into_iter()
        .filter(|table| {
            let keep = qualifies(table, rules);
            debug!(
                table_id = table.id(),
                rows = table.rows.len(),
                keep,
                "schedule table qualification"
            );
            if !keep && table.has_visits {
                warnings.push(
                    ExtractWarning::new(
                        WarningCode::TableRejected,
                        "table carries visit tokens but does not qualify as a schedule",
                    )
                    .with_table_id(table.id()),
                );
            }
            keep
        })
        .collect()
}
