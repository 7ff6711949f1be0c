use regex::{Regex, RegexBuilder};

use crate::error::ConfigError;

/// Recognizes affirmative schedule cells: whole-word `X`/`YES`/`Y` or a
/// check glyph.
#[derive(Debug, Clone)]
pub struct MarkerDetector {
    words: Option<Regex>,
    glyphs: Vec<char>,
}

impl MarkerDetector {
    pub fn new(words: &[String], glyphs: &[char]) -> Result<Self, ConfigError> {
        let alternatives = words
            .iter()
            .map(|word| word.trim())
            .filter(|word| !word.is_empty())
            .map(regex::escape)
            .collect::<Vec<_>>();

        let words = if alternatives.is_empty() {
            None
        } else {
            let pattern = format!(r"\b(?:{})\b", alternatives.join("|"));
            let regex = RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| ConfigError::InvalidPattern {
                    field: "marker",
                    pattern,
                    source,
                })?;
            Some(regex)
        };

        Ok(Self {
            words,
            glyphs: glyphs.to_vec(),
        })
    }

    #[must_use]
    pub fn cell_has_marker(&self, text: &str) -> bool {
        if text.chars().any(|ch| self.glyphs.contains(&ch)) {
            return true;
        }
        self.words.as_ref().is_some_and(|regex| regex.is_match(text))
    }
}
