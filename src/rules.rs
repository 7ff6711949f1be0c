use regex::Regex;

use crate::config::ScheduleConfig;
use crate::error::ConfigError;
use crate::marker::MarkerDetector;
use crate::model::TableRow;
use crate::procedure::ProcedureRowFilter;
use crate::visit::{VisitMatcher, compile_patterns};

/// A validated configuration with every pattern compiled.
#[derive(Debug, Clone)]
pub(crate) struct Rules {
    pub config: ScheduleConfig,
    pub visits: VisitMatcher,
    pub markers: MarkerDetector,
    pub labels: ProcedureRowFilter,
    pub header_keywords: Vec<Regex>,
    pub section_breaks: Vec<Regex>,
}

impl Rules {
    pub fn compile(config: ScheduleConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            visits: VisitMatcher::new(&config.visit_patterns, config.min_visit_proportion)?,
            markers: MarkerDetector::new(&config.marker_words, &config.marker_glyphs)?,
            labels: ProcedureRowFilter::new(
                &config.non_procedure_labels,
                &config.non_procedure_patterns,
            )?,
            header_keywords: compile_patterns("header keyword", &config.header_keywords)?,
            section_breaks: compile_patterns("section break", &config.section_breaks)?,
            config,
        })
    }

    /// Some column after the first carries a marker and the label passes
    /// the first-cell filter. Used before any header is known.
    pub fn is_plausible_procedure_row(&self, row: &TableRow<'_>) -> bool {
        self.labels.check_label(row.label()).is_ok()
            && row
                .cells
                .iter()
                .skip(1)
                .any(|cell| self.markers.cell_has_marker(cell))
    }

    pub fn section_break(&self, label: &str) -> Option<&Regex> {
        self.section_breaks
            .iter()
            .find(|pattern| pattern.is_match(label))
    }
}

#[cfg(test)]
pub(crate) fn default_rules() -> Rules {
    Rules::compile(ScheduleConfig::default()).expect("default config should compile")
}
