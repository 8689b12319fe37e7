//! Meter-analysis request/response types
//!
//! The syllable/stress analyzer is an external HTTP service; these are the
//! wire types plus defensive validation. The upstream schema is trusted
//! nowhere: every field the renderer needs is checked by
//! [`MeterAnalysis::validate`] so a malformed response degrades to an
//! analysis-unavailable condition instead of a panic at render time.
//!
//! Scansion strings are bit-strings, one character per syllable: '1' marks a
//! stressed syllable, '0' an unstressed one.

use serde::{Deserialize, Serialize};

use crate::model::Project;

/// Request body for the analyzer: one string per verse, document order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub lines: Vec<String>,
}

/// Per-word syllable analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordDetail {
    pub word: Option<String>,
    /// Hyphen-joined syllables, e.g. "sau-da-de"
    pub syllable_breakdown: Option<String>,
    /// Stress bit-string, one char per syllable
    pub scansion: Option<String>,
    pub syllable_count: Option<u32>,
}

/// Analysis of one verse line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineDetail {
    pub total_syllables: Option<u32>,
    #[serde(default)]
    pub details: Vec<WordDetail>,
}

/// Full analyzer response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterAnalysis {
    /// Detected meter name, when the analyzer recognizes one
    #[serde(default)]
    pub meter: Option<String>,
    #[serde(default)]
    pub original_lines: Vec<String>,
    #[serde(default)]
    pub word_details: Vec<LineDetail>,
}

/// Validation failure describing why a response is unusable
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MeterValidationError {
    #[error("analysis covers {details} lines but {lines} were submitted")]
    LineCountMismatch { lines: usize, details: usize },
    #[error("line {line}: scansion '{scansion}' does not match syllable count {count}")]
    ScansionMismatch {
        line: usize,
        scansion: String,
        count: u32,
    },
    #[error("line {line}: scansion '{scansion}' contains characters other than 0/1")]
    BadScansion { line: usize, scansion: String },
}

impl MeterAnalysis {
    /// Check internal consistency of the response.
    ///
    /// Rejects line-count mismatches between `original_lines` and
    /// `word_details`, non-bit scansion strings, and scansion lengths that
    /// disagree with the reported syllable count.
    pub fn validate(&self) -> Result<(), MeterValidationError> {
        if self.original_lines.len() != self.word_details.len() {
            return Err(MeterValidationError::LineCountMismatch {
                lines: self.original_lines.len(),
                details: self.word_details.len(),
            });
        }

        for (i, line) in self.word_details.iter().enumerate() {
            for word in &line.details {
                let Some(scansion) = &word.scansion else {
                    continue;
                };
                if !scansion.chars().all(|c| c == '0' || c == '1') {
                    return Err(MeterValidationError::BadScansion {
                        line: i,
                        scansion: scansion.clone(),
                    });
                }
                if let Some(count) = word.syllable_count {
                    if scansion.len() as u32 != count {
                        return Err(MeterValidationError::ScansionMismatch {
                            line: i,
                            scansion: scansion.clone(),
                            count,
                        });
                    }
                }
            }
        }

        Ok(())
    }
}

/// Build the analyzer request body from a project snapshot: the flattened
/// verse lines in document order.
pub fn flatten_lines(project: &Project) -> Vec<String> {
    project.flat_verses().iter().map(|v| v.line()).collect()
}

/// Write stressed-word display flags back onto the project tree.
///
/// This is the only feedback path from analysis into the tree: a word is
/// flagged when the analyzer marks any of its syllables stressed, cleared
/// otherwise. Word text is never touched. Lines beyond the analysis are
/// left unchanged.
pub fn apply_stress(project: &mut Project, analysis: &MeterAnalysis) {
    let mut lines = analysis.word_details.iter();
    for strophe in &mut project.strophes {
        for verse in &mut strophe.verses {
            let Some(line) = lines.next() else {
                return;
            };
            for (word, detail) in verse.words.iter_mut().zip(line.details.iter()) {
                word.stressed = detail
                    .scansion
                    .as_ref()
                    .map(|s| s.contains('1'));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RhymeTag, Verse};

    fn detail(word: &str, scansion: &str) -> WordDetail {
        WordDetail {
            word: Some(word.to_string()),
            syllable_breakdown: Some(word.to_lowercase()),
            scansion: Some(scansion.to_string()),
            syllable_count: Some(scansion.len() as u32),
        }
    }

    #[test]
    fn valid_response_passes_validation() {
        let analysis = MeterAnalysis {
            meter: None,
            original_lines: vec!["A B".to_string()],
            word_details: vec![LineDetail {
                total_syllables: Some(2),
                details: vec![detail("A", "1"), detail("B", "0")],
            }],
        };
        assert!(analysis.validate().is_ok());
    }

    #[test]
    fn line_count_mismatch_is_rejected() {
        let analysis = MeterAnalysis {
            meter: None,
            original_lines: vec!["A B".to_string(), "C".to_string()],
            word_details: vec![],
        };
        assert_eq!(
            analysis.validate(),
            Err(MeterValidationError::LineCountMismatch { lines: 2, details: 0 })
        );
    }

    #[test]
    fn scansion_length_must_match_syllable_count() {
        let mut bad = detail("SAUDADE", "010");
        bad.syllable_count = Some(2);
        let analysis = MeterAnalysis {
            meter: None,
            original_lines: vec!["SAUDADE".to_string()],
            word_details: vec![LineDetail {
                total_syllables: Some(3),
                details: vec![bad],
            }],
        };
        assert!(matches!(
            analysis.validate(),
            Err(MeterValidationError::ScansionMismatch { line: 0, .. })
        ));
    }

    #[test]
    fn non_bit_scansion_is_rejected() {
        let mut bad = detail("X", "1");
        bad.scansion = Some("12".to_string());
        bad.syllable_count = Some(2);
        let analysis = MeterAnalysis {
            meter: None,
            original_lines: vec!["X".to_string()],
            word_details: vec![LineDetail {
                total_syllables: Some(2),
                details: vec![bad],
            }],
        };
        assert!(matches!(
            analysis.validate(),
            Err(MeterValidationError::BadScansion { .. })
        ));
    }

    #[test]
    fn flatten_lines_preserves_document_order() {
        let mut p = Project::new();
        p.strophes[0].verses.push(Verse::from_line("um dois", RhymeTag::A));
        let mut second = crate::model::Strophe::prologue();
        second.verses.push(Verse::from_line("tres", RhymeTag::B));
        p.strophes.push(second);

        assert_eq!(flatten_lines(&p), ["UM DOIS".to_string(), "TRES".to_string()]);
    }

    #[test]
    fn apply_stress_sets_flags_without_touching_text() {
        let mut p = Project::new();
        p.strophes[0].verses.push(Verse::from_line("alma livre", RhymeTag::A));

        let analysis = MeterAnalysis {
            meter: None,
            original_lines: vec!["ALMA LIVRE".to_string()],
            word_details: vec![LineDetail {
                total_syllables: Some(4),
                details: vec![detail("ALMA", "10"), detail("LIVRE", "00")],
            }],
        };

        apply_stress(&mut p, &analysis);
        let verse = &p.strophes[0].verses[0];
        assert_eq!(verse.words[0].stressed, Some(true));
        assert_eq!(verse.words[1].stressed, Some(false));
        assert_eq!(verse.line(), "ALMA LIVRE");
    }
}
