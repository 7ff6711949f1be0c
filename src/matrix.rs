use std::collections::HashMap;

use serde::Serialize;

pub const PROCEDURE_COLUMN: &str = "Procedure";
pub const VISIT_COLUMN: &str = "Visit";
pub const MARK: &str = "X";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Association {
    procedure: usize,
    visit: usize,
}

/// Procedure × visit incidence recovered from the schedule table.
///
/// Both axes keep first-seen order: procedures by first accepted row, visits
/// by header column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleMatrix {
    visit_order: Vec<String>,
    procedure_order: Vec<String>,
    /// Distinct `(procedure, visit)` pairs in row-scan order.
    associations: Vec<Association>,
    marks: Vec<Vec<bool>>,
}

/// Delimited rendering: a header line plus one record per row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Serialize)]
struct VisitEntry<'a> {
    visit: &'a str,
    procedures: Vec<&'a str>,
}

#[derive(Serialize)]
struct MatrixDocument<'a> {
    visit_order: &'a [String],
    procedure_order: &'a [String],
    schedule: Vec<VisitEntry<'a>>,
}

impl ScheduleMatrix {
    #[must_use]
    pub fn visit_order(&self) -> &[String] {
        &self.visit_order
    }

    #[must_use]
    pub fn procedure_order(&self) -> &[String] {
        &self.procedure_order
    }

    #[must_use]
    pub fn association_count(&self) -> usize {
        self.associations.len()
    }

    #[must_use]
    pub fn is_marked(&self, procedure: &str, visit: &str) -> bool {
        let Some(p) = self.procedure_order.iter().position(|name| name == procedure) else {
            return false;
        };
        let Some(v) = self.visit_order.iter().position(|name| name == visit) else {
            return false;
        };
        self.marks[p][v]
    }

    /// Visit → procedures marked in that visit's column, in visit display
    /// order. Visits without any marks map to an empty list.
    #[must_use]
    pub fn schedule(&self) -> Vec<(&str, Vec<&str>)> {
        self.visit_order
            .iter()
            .enumerate()
            .map(|(v, visit)| {
                let procedures = self
                    .associations
                    .iter()
                    .filter(|association| association.visit == v)
                    .map(|association| self.procedure_order[association.procedure].as_str())
                    .collect();
                (visit.as_str(), procedures)
            })
            .collect()
    }

    /// Per-visit procedure counts in visit display order.
    #[must_use]
    pub fn visit_summary(&self) -> Vec<(&str, usize)> {
        self.schedule()
            .into_iter()
            .map(|(visit, procedures)| (visit, procedures.len()))
            .collect()
    }

    /// `Procedure` index column plus one `X`/blank column per visit.
    #[must_use]
    pub fn wide_table(&self) -> RenderedTable {
        let mut headers = Vec::with_capacity(self.visit_order.len() + 1);
        headers.push(PROCEDURE_COLUMN.to_string());
        headers.extend(self.visit_order.iter().cloned());

        let rows = self
            .procedure_order
            .iter()
            .zip(&self.marks)
            .map(|(procedure, marks)| {
                let mut row = Vec::with_capacity(marks.len() + 1);
                row.push(procedure.clone());
                row.extend(marks.iter().map(|&marked| {
                    if marked {
                        MARK.to_string()
                    } else {
                        String::new()
                    }
                }));
                row
            })
            .collect();

        RenderedTable { headers, rows }
    }

    /// One `(Procedure, Visit)` record per association, in row-scan order.
    #[must_use]
    pub fn long_table(&self) -> RenderedTable {
        RenderedTable {
            headers: vec![PROCEDURE_COLUMN.to_string(), VISIT_COLUMN.to_string()],
            rows: self
                .associations
                .iter()
                .map(|association| {
                    vec![
                        self.procedure_order[association.procedure].clone(),
                        self.visit_order[association.visit].clone(),
                    ]
                })
                .collect(),
        }
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&MatrixDocument {
            visit_order: &self.visit_order,
            procedure_order: &self.procedure_order,
            schedule: self
                .schedule()
                .into_iter()
                .map(|(visit, procedures)| VisitEntry { visit, procedures })
                .collect(),
        })
    }
}

/// Accumulates accepted rows into a [`ScheduleMatrix`].
#[derive(Debug)]
pub(crate) struct MatrixBuilder {
    matrix: ScheduleMatrix,
    procedure_index: HashMap<String, usize>,
}

impl MatrixBuilder {
    pub fn new(visit_order: Vec<String>) -> Self {
        Self {
            matrix: ScheduleMatrix {
                visit_order,
                ..ScheduleMatrix::default()
            },
            procedure_index: HashMap::new(),
        }
    }

    /// Records `procedure` as marked at each visit position in
    /// `marked_visits`. Repeated pairs are recorded once.
    pub fn add_row(&mut self, procedure: &str, marked_visits: impl IntoIterator<Item = usize>) {
        let visit_count = self.matrix.visit_order.len();
        let matrix = &mut self.matrix;
        let p = *self
            .procedure_index
            .entry(procedure.to_string())
            .or_insert_with(|| {
                matrix.procedure_order.push(procedure.to_string());
                matrix.marks.push(vec![false; visit_count]);
                matrix.procedure_order.len() - 1
            });

        for v in marked_visits {
            if v >= visit_count || matrix.marks[p][v] {
                continue;
            }
            matrix.marks[p][v] = true;
            matrix.associations.push(Association {
                procedure: p,
                visit: v,
            });
        }
    }

    pub fn build(self) -> ScheduleMatrix {
        self.matrix
    }
}
