use crate::model::LogicalTable;
use crate::node::Node;
use crate::rules::Rules;
use crate::warning::{ExtractWarning, WarningCode};

/// Every `Table` node in document order, flattened once, each tagged with
/// whether any of its rows carries enough visit cells to be a header.
pub(crate) fn collect_fragments<'a>(root: &'a Node, rules: &Rules) -> Vec<LogicalTable<'a>> {
    root.tables()
        .into_iter()
        .enumerate()
        .map(|(index, table)| {
            let mut fragment = LogicalTable::from_fragment(index + 1, table);
            fragment.has_visits = fragment.rows.iter().any(|row| {
                rules.visits.count_visit_cells(&row.cells) >= rules.config.fragment_min_visit_cells
            });
            fragment
        })
        .collect()
}

/// Reassembles page-broken tables. A fragment without visit tokens
/// continues the open table; a fragment with them starts a new one, unless
/// the open table has none, in which case the open rows lead the new table.
pub(crate) fn merge_fragments<'a>(
    fragments: Vec<LogicalTable<'a>>,
    warnings: &mut Vec<ExtractWarning>,
) -> Vec<LogicalTable<'a>> {
    let mut merged = Vec::new();
    let mut buffer: Option<LogicalTable<'a>> = None;

    for fragment in fragments {
        let Some(mut open) = buffer.take() else {
            buffer = Some(fragment);
            continue;
        };

        if !fragment.has_visits {
            open.absorb(fragment);
        } else if open.has_visits {
            merged.push(open);
            open = fragment;
        } else {
            warnings.push(
                ExtractWarning::new(
                    WarningCode::LeadingHeaderlessFragment,
                    "headerless table fragment precedes a header fragment; rows prepended",
                )
                .with_table_id(fragment.id()),
            );
            open.absorb(fragment);
            open.has_visits = true;
        }
        buffer = Some(open);
    }

    merged.extend(buffer);
    merged
}
