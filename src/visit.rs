use std::collections::HashSet;

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::error::ConfigError;

pub(crate) fn compile_patterns(
    field: &'static str,
    patterns: &[String],
) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| ConfigError::InvalidPattern {
                    field,
                    pattern: pattern.clone(),
                    source,
                })
        })
        .collect()
}

fn significant_len(text: &str) -> usize {
    text.chars().filter(|ch| ch.is_alphanumeric()).count()
}

/// Recognizes visit/period tokens (`V1`, `P20c`, `S1D-2`, `W12`, ...) in cell
/// text.
#[derive(Debug, Clone)]
pub struct VisitMatcher {
    patterns: Vec<Regex>,
    min_proportion: f64,
}

impl VisitMatcher {
    pub fn new(patterns: &[String], min_proportion: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            patterns: compile_patterns("visit", patterns)?,
            min_proportion,
        })
    }

    /// The longest accepted token in `text`.
    ///
    /// A pattern's candidate is its longest match, accepted only when it
    /// covers more than the minimum proportion of the text's alphanumeric
    /// characters. Equal-length candidates resolve to the earlier pattern.
    #[must_use]
    pub fn extract_visit_token(&self, text: &str) -> Option<String> {
        let text = text.trim();
        let total = significant_len(text);
        if total == 0 {
            return None;
        }

        let mut best: Option<&str> = None;
        for pattern in &self.patterns {
            let Some(candidate) = pattern
                .find_iter(text)
                .map(|found| found.as_str().trim())
                .fold(None, |longest: Option<&str>, current| match longest {
                    Some(kept) if kept.len() >= current.len() => Some(kept),
                    _ => Some(current),
                })
            else {
                continue;
            };

            #[allow(clippy::cast_precision_loss)]
            let proportion = significant_len(candidate) as f64 / total as f64;
            if proportion <= self.min_proportion {
                continue;
            }

            if best.is_none_or(|kept| candidate.len() > kept.len()) {
                best = Some(candidate);
            }
        }

        best.map(str::to_string)
    }

    #[must_use]
    pub fn count_visit_cells(&self, cells: &[String]) -> usize {
        cells
            .iter()
            .filter(|cell| self.extract_visit_token(cell).is_some())
            .count()
    }

    /// Distinct tokens among `cells`, compared case-insensitively.
    #[must_use]
    pub fn distinct_visits(&self, cells: &[String]) -> usize {
        cells
            .iter()
            .filter_map(|cell| self.extract_visit_token(cell))
            .map(|token| token.to_uppercase())
            .collect::<HashSet<_>>()
            .len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitColumn {
    pub index: usize,
    /// Token as matched in the header cell.
    pub token: String,
    /// Unique visit id; equals `token` unless the token repeated.
    pub visit: String,
}

/// Column index to visit id, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VisitColumnMap {
    columns: Vec<VisitColumn>,
}

impl VisitColumnMap {
    /// Maps every header cell that yields a token. A repeated token gets a
    /// `_1`, `_2`, ... suffix in order of appearance.
    #[must_use]
    pub fn from_header(matcher: &VisitMatcher, cells: &[String]) -> Self {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();

        for (index, cell) in cells.iter().enumerate() {
            let Some(token) = matcher.extract_visit_token(cell) else {
                continue;
            };

            let mut visit = token.clone();
            let mut counter = 1;
            while seen.contains(&visit) {
                visit = format!("{token}_{counter}");
                counter += 1;
            }
            seen.insert(visit.clone());
            columns.push(VisitColumn {
                index,
                token,
                visit,
            });
        }

        Self { columns }
    }

    #[must_use]
    pub fn columns(&self) -> &[VisitColumn] {
        &self.columns
    }

    #[must_use]
    pub fn visit_order(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| column.visit.clone())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn renamed(&self) -> impl Iterator<Item = &VisitColumn> {
        self.columns
            .iter()
            .filter(|column| column.token != column.visit)
    }
}

#[cfg(test)]
mod tests {
    use super::{VisitColumnMap, VisitMatcher};
    use crate::config::ScheduleConfig;

    fn matcher() -> VisitMatcher {
        let config = ScheduleConfig::default();
        VisitMatcher::new(&config.visit_patterns, config.min_visit_proportion)
            .expect("default patterns should compile")
    }

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn extracts_standard_visit_forms() {
        let matcher = matcher();
        assert_eq!(matcher.extract_visit_token("V1"), Some("V1".to_string()));
        assert_eq!(matcher.extract_visit_token(" P20c "), Some("P20c".to_string()));
        assert_eq!(matcher.extract_visit_token("V19A"), Some("V19A".to_string()));
        assert_eq!(matcher.extract_visit_token("W12"), Some("W12".to_string()));
        assert_eq!(matcher.extract_visit_token("Cycle 2"), Some("Cycle 2".to_string()));
    }

    #[test]
    fn prefers_compound_day_codes() {
        let matcher = matcher();
        assert_eq!(matcher.extract_visit_token("S1D-2"), Some("S1D-2".to_string()));
        assert_eq!(
            matcher.extract_visit_token("Visit V3 (S2D14)"),
            Some("S2D14".to_string())
        );
    }

    #[test]
    fn ignores_text_without_tokens() {
        let matcher = matcher();
        assert_eq!(matcher.extract_visit_token("Physical examination"), None);
        assert_eq!(matcher.extract_visit_token(""), None);
        assert_eq!(matcher.extract_visit_token(" - "), None);
    }

    #[test]
    fn reads_compound_code_not_v2_out_of_questionnaire_code() {
        let matcher = matcher();
        assert_eq!(
            matcher.extract_visit_token("TFEQ-R18V2"),
            Some("R18V2".to_string())
        );
    }

    #[test]
    fn proportion_guard_rejects_incidental_matches() {
        let matcher = VisitMatcher::new(&[r"V\d+".to_string()], 0.3).expect("pattern compiles");
        assert_eq!(matcher.extract_visit_token("TFEQ-R18V2"), None);
        assert_eq!(
            matcher.extract_visit_token("Total Visits: V1, V2 and V3"),
            None
        );
        assert_eq!(matcher.extract_visit_token("V12 (D1)"), Some("V12".to_string()));
    }

    #[test]
    fn counts_distinct_visits_case_insensitively() {
        let matcher = matcher();
        let row = cells(&["Visit", "V1", "v1", "V2", ""]);
        assert_eq!(matcher.count_visit_cells(&row), 3);
        assert_eq!(matcher.distinct_visits(&row), 2);
    }

    #[test]
    fn disambiguates_repeated_header_tokens() {
        let matcher = matcher();
        let map = VisitColumnMap::from_header(
            &matcher,
            &cells(&["Procedure", "V1", "V2", "V2", "", "V2"]),
        );

        assert_eq!(map.visit_order(), vec!["V1", "V2", "V2_1", "V2_2"]);
        let indices = map.columns().iter().map(|c| c.index).collect::<Vec<_>>();
        assert_eq!(indices, vec![1, 2, 3, 5]);
        assert_eq!(map.renamed().count(), 2);
    }
}
