use std::collections::HashSet;

use regex::Regex;

use crate::error::ConfigError;
use crate::visit::compile_patterns;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptyLabel,
    /// The first cell is itself a visit token: a repeated header or a
    /// continuation row, not data.
    VisitLabel,
    HeaderLabel,
    NonProcedureText,
    NoMarker,
}

/// First-cell checks shared by table selection and row collection.
#[derive(Debug, Clone)]
pub struct ProcedureRowFilter {
    labels: HashSet<String>,
    patterns: Vec<Regex>,
}

impl ProcedureRowFilter {
    pub fn new(labels: &[String], patterns: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            labels: labels
                .iter()
                .map(|label| label.trim().to_lowercase())
                .collect(),
            patterns: compile_patterns("non-procedure", patterns)?,
        })
    }

    pub fn check_label(&self, label: &str) -> Result<(), RejectReason> {
        let label = label.trim();
        if label.is_empty() {
            return Err(RejectReason::EmptyLabel);
        }
        if self.labels.contains(&label.to_lowercase()) {
            return Err(RejectReason::HeaderLabel);
        }
        if self.patterns.iter().any(|pattern| pattern.is_match(label)) {
            return Err(RejectReason::NonProcedureText);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ProcedureRowFilter, RejectReason};
    use crate::config::ScheduleConfig;

    fn filter() -> ProcedureRowFilter {
        let config = ScheduleConfig::default();
        ProcedureRowFilter::new(&config.non_procedure_labels, &config.non_procedure_patterns)
            .expect("default filter should compile")
    }

    #[test]
    fn accepts_procedure_names() {
        let filter = filter();
        for label in [
            "Informed consent",
            "Vital signs",
            "12-lead ECG",
            "HbA1c",
            "Notebook review",
            "Assessment of adverse events",
        ] {
            assert_eq!(filter.check_label(label), Ok(()), "label {label:?}");
        }
    }

    #[test]
    fn rejects_header_labels_case_insensitively() {
        let filter = filter();
        assert_eq!(filter.check_label("Visit"), Err(RejectReason::HeaderLabel));
        assert_eq!(filter.check_label(" STUDY WEEK "), Err(RejectReason::HeaderLabel));
        assert_eq!(filter.check_label(""), Err(RejectReason::EmptyLabel));
    }

    #[test]
    fn rejects_section_numbers_and_sentence_fragments() {
        let filter = filter();
        for label in [
            "10.3.4.1 Blood sampling",
            "10.3.4.1",
            "....",
            "The investigator will review",
            "Notes: all visits",
            "Abbreviations:",
            "See Appendix 2",
            "Key:",
        ] {
            assert_eq!(
                filter.check_label(label),
                Err(RejectReason::NonProcedureText),
                "label {label:?}"
            );
        }
    }
}
