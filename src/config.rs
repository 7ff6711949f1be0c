use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Visit/period token patterns, most specific first.
pub const DEFAULT_VISIT_PATTERNS: &[&str] = &[
    r"\bS\d+D[\s-]?\d+[A-Za-z]*\b",
    r"\bS\d*[xX]D[\s-]?\d+[A-Za-z]*\b",
    r"\bS[xX]D[\s-]?\d+[A-Za-z]*\b",
    r"\b(?:V|P)\d+[A-Za-z]*\b",
    r"\bD\d+[A-Za-z]*\b",
    r"\bW\d+[A-Za-z]*\b",
    r"\bM\d+[A-Za-z]*\b",
    r"\b[A-Z]\d+[A-Z]\d+[A-Za-z]*\b",
    r"\bCYCLE\s*\d+[A-Za-z]*\b",
    r"\bTREAT\s*\d+[A-Za-z]*\b",
    r"\bPERIOD\s*\d+[A-Za-z]*\b",
    r"\b[A-Z]{2,4}\d+[A-Za-z]*\b",
];

pub const DEFAULT_MARKER_WORDS: &[&str] = &["X", "YES", "Y"];

pub const DEFAULT_MARKER_GLYPHS: &[char] = &['✔', '✓', '●', '√', '■'];

pub const DEFAULT_HEADER_KEYWORDS: &[&str] = &[
    "visit",
    "screening",
    "week",
    "day",
    "baseline",
    r"follow.?up",
];

/// First-cell labels that name a header or a section, never a procedure.
pub const DEFAULT_NON_PROCEDURE_LABELS: &[&str] = &[
    "visit",
    "visits",
    "procedure",
    "procedures",
    "visit short name",
    "study week",
    "study day",
    "visit window",
    "activity",
    "assessment",
    "objectives",
    "primary",
    "secondary",
    "exploratory",
];

pub const DEFAULT_NON_PROCEDURE_PATTERNS: &[&str] = &[
    r"^\d+(?:\.\d+)*\s",
    r"^\d+(?:\.\d+)+$",
    r"^[\p{P}\s]+$",
    r"^(?:to|the|a|an)\s+",
    r"^(?:analysis|analyses)\s",
    r"appendix",
    r"^definitions?$",
    r"^notes?(?::|$)",
    r"^abbreviations?(?::|$)",
    r"\berror!",
    r"^[a-z]+\s*:$",
];

pub const DEFAULT_SECTION_BREAKS: &[&str] = &[
    r"^Objectives$",
    r"^Primary$",
    r"^Secondary$",
    r"^Event type$",
    r"^Participant analysis",
    r"^Laboratory assessments$",
    r"^Classification of",
    r"^Notes:$",
    r"^Endpoints?$",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderStrategy {
    /// First row with enough visit cells.
    FirstMatch,
    /// Best row by distinct visits plus weighted header keywords.
    Scored,
}

impl FromStr for HeaderStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "first_match" | "first" => Ok(Self::FirstMatch),
            "scored" | "score" => Ok(Self::Scored),
            other => Err(format!(
                "unknown header strategy '{other}', expected first-match or scored"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableQualification {
    VisitsOnly,
    VisitsAndProcedures,
}

impl FromStr for TableQualification {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "visits_only" | "visits" => Ok(Self::VisitsOnly),
            "visits_and_procedures" | "combined" => Ok(Self::VisitsAndProcedures),
            other => Err(format!(
                "unknown table qualification '{other}', expected visits-only or visits-and-procedures"
            )),
        }
    }
}

/// Every tunable of the recovery pipeline. All fields default, so a config
/// file only needs the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScheduleConfig {
    pub visit_patterns: Vec<String>,
    pub min_visit_proportion: f64,
    pub marker_words: Vec<String>,
    pub marker_glyphs: Vec<char>,
    pub header_keywords: Vec<String>,
    pub header_strategy: HeaderStrategy,
    pub min_header_score: usize,
    pub min_header_visit_cells: usize,
    pub fragment_min_visit_cells: usize,
    pub min_table_visits: usize,
    pub table_qualification: TableQualification,
    pub non_procedure_labels: Vec<String>,
    pub non_procedure_patterns: Vec<String>,
    pub section_breaks: Vec<String>,
    pub procedure_floor: usize,
    pub rejection_ceiling: usize,
    pub section_break_floor: usize,
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            visit_patterns: owned(DEFAULT_VISIT_PATTERNS),
            min_visit_proportion: 0.3,
            marker_words: owned(DEFAULT_MARKER_WORDS),
            marker_glyphs: DEFAULT_MARKER_GLYPHS.to_vec(),
            header_keywords: owned(DEFAULT_HEADER_KEYWORDS),
            header_strategy: HeaderStrategy::Scored,
            min_header_score: 3,
            min_header_visit_cells: 2,
            fragment_min_visit_cells: 2,
            min_table_visits: 3,
            table_qualification: TableQualification::VisitsAndProcedures,
            non_procedure_labels: owned(DEFAULT_NON_PROCEDURE_LABELS),
            non_procedure_patterns: owned(DEFAULT_NON_PROCEDURE_PATTERNS),
            section_breaks: owned(DEFAULT_SECTION_BREAKS),
            procedure_floor: 30,
            rejection_ceiling: 20,
            section_break_floor: 20,
        }
    }
}

impl ScheduleConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that cannot describe a working pipeline. Pattern
    /// syntax is checked when the patterns are compiled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.visit_patterns.is_empty() {
            return Err(ConfigError::InvalidOption(
                "visit_patterns cannot be empty".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.min_visit_proportion) {
            return Err(ConfigError::InvalidOption(format!(
                "min_visit_proportion must be in [0, 1), got {}",
                self.min_visit_proportion
            )));
        }
        if self.marker_words.iter().all(|word| word.trim().is_empty())
            && self.marker_glyphs.is_empty()
        {
            return Err(ConfigError::InvalidOption(
                "at least one marker word or glyph is required".to_string(),
            ));
        }
        for (name, value) in [
            ("min_header_visit_cells", self.min_header_visit_cells),
            ("fragment_min_visit_cells", self.fragment_min_visit_cells),
            ("min_table_visits", self.min_table_visits),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidOption(format!(
                    "{name} must be at least 1"
                )));
            }
        }
        Ok(())
    }
}
