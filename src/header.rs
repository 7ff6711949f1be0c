use crate::config::HeaderStrategy;
use crate::model::TableRow;
use crate::rules::Rules;
use crate::visit::VisitColumnMap;

const KEYWORD_WEIGHT: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRow {
    /// Index into the concatenated rows of the selected tables.
    pub index: usize,
    pub score: usize,
    pub columns: VisitColumnMap,
}

/// Distinct visit tokens plus weighted header-keyword hits.
pub(crate) fn header_score(cells: &[String], rules: &Rules) -> usize {
    let row_text = cells.join(" ");
    let keyword_hits = rules
        .header_keywords
        .iter()
        .filter(|keyword| keyword.is_match(&row_text))
        .count();
    rules.visits.distinct_visits(cells) + KEYWORD_WEIGHT * keyword_hits
}

fn is_candidate(row: &TableRow<'_>, rules: &Rules) -> bool {
    rules.visits.count_visit_cells(&row.cells) >= rules.config.min_header_visit_cells
}

pub(crate) fn detect_header_row(rows: &[TableRow<'_>], rules: &Rules) -> Option<HeaderRow> {
    let (index, score) = match rules.config.header_strategy {
        HeaderStrategy::FirstMatch => rows
            .iter()
            .position(|row| is_candidate(row, rules))
            .map(|index| (index, header_score(&rows[index].cells, rules)))?,
        HeaderStrategy::Scored => {
            let mut best: Option<(usize, usize)> = None;
            for (index, row) in rows.iter().enumerate() {
                if !is_candidate(row, rules) {
                    continue;
                }
                let score = header_score(&row.cells, rules);
                if score >= rules.config.min_header_score
                    && best.is_none_or(|(_, best_score)| score > best_score)
                {
                    best = Some((index, score));
                }
            }
            best?
        }
    };

    let columns = VisitColumnMap::from_header(&rules.visits, &rows[index].cells);
    if columns.is_empty() {
        return None;
    }

    Some(HeaderRow {
        index,
        score,
        columns,
    })
}

#[cfg(test)]
mod tests {
    use super::detect_header_row;
    use crate::config::{HeaderStrategy, ScheduleConfig};
    use crate::model::TableRow;
    use crate::node::Node;
    use crate::rules::{Rules, default_rules};

    fn rows<'a>(node: &'a Node, values: &[&[&str]]) -> Vec<TableRow<'a>> {
        values
            .iter()
            .map(|cells| TableRow {
                node,
                cells: cells.iter().map(ToString::to_string).collect(),
            })
            .collect()
    }

    #[test]
    fn keyword_bonus_beats_stray_token_rows() {
        let node = Node::new("TR");
        let rows = rows(
            &node,
            &[
                &["Total Visits: V1, V2"],
                &["Visit", "V1", "V2", "V3"],
                &["Weight", "X", "", ""],
            ],
        );

        let header = detect_header_row(&rows, &default_rules()).expect("header should be found");
        assert_eq!(header.index, 1);
        assert_eq!(header.score, 5);
        assert_eq!(header.columns.visit_order(), vec!["V1", "V2", "V3"]);
    }

    #[test]
    fn scored_strategy_skips_low_scoring_title_rows() {
        let node = Node::new("TR");
        let rows = rows(
            &node,
            &[
                &["Schedule", "V1", "V2"],
                &["Procedure", "V1", "V2", "V3", "V4"],
            ],
        );

        let header = detect_header_row(&rows, &default_rules()).expect("header should be found");
        assert_eq!(header.index, 1);
    }

    #[test]
    fn first_match_strategy_takes_first_candidate() {
        let node = Node::new("TR");
        let rows = rows(
            &node,
            &[
                &["Schedule", "V1", "V2"],
                &["Procedure", "V1", "V2", "V3", "V4"],
            ],
        );
        let rules = Rules::compile(ScheduleConfig {
            header_strategy: HeaderStrategy::FirstMatch,
            ..ScheduleConfig::default()
        })
        .expect("config compiles");

        let header = detect_header_row(&rows, &rules).expect("header should be found");
        assert_eq!(header.index, 0);
        assert_eq!(header.columns.visit_order(), vec!["V1", "V2"]);
    }

    #[test]
    fn ties_keep_the_earliest_row() {
        let node = Node::new("TR");
        let rows = rows(
            &node,
            &[&["Visit", "V1", "V2", "V3"], &["Visit", "V4", "V5", "V6"]],
        );

        let header = detect_header_row(&rows, &default_rules()).expect("header should be found");
        assert_eq!(header.index, 0);
    }

    #[test]
    fn no_header_below_threshold() {
        let node = Node::new("TR");
        let rows = rows(&node, &[&["Item", "V1", "V2"], &["Weight", "X", "X"]]);
        assert!(detect_header_row(&rows, &default_rules()).is_none());
    }
}
