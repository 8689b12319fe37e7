//! Bulk-lyrics importer
//!
//! Parses a pasted block of free text into a batch of new strophes. Blank
//! lines separate strophes; each non-empty line becomes a verse; whitespace
//! splits words (upper-cased). The result is appended to the project by the
//! caller; re-running the importer with the same text appends a duplicate
//! batch, since each run is an explicit user action.

use rand::Rng;

use super::{CameraSettings, RhymeTag, Strophe, Verse, Word};
use crate::uuid_utils;

/// Description attached to strophes produced by the importer
const IMPORTED_DESCRIPTION: &str = "Estrofe importada via 'Adicionar Letra Completa'";

/// How rhyme tags are assigned to imported verses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagAssignment {
    /// Every verse gets tag A
    Fixed,
    /// Uniform pseudo-random choice from {A, B, C, D}
    Random,
}

impl TagAssignment {
    fn pick(self) -> RhymeTag {
        match self {
            TagAssignment::Fixed => RhymeTag::A,
            TagAssignment::Random => {
                const TAGS: [RhymeTag; 4] = [RhymeTag::A, RhymeTag::B, RhymeTag::C, RhymeTag::D];
                TAGS[rand::thread_rng().gen_range(0..TAGS.len())]
            }
        }
    }
}

/// Parse a full lyric sheet into new strophes.
///
/// Groups separated by a blank line become strophes; groups that contain no
/// non-empty lines are discarded. Every imported verse carries the default
/// camera setup and the imported-strophe description.
pub fn parse_lyric_sheet(text: &str, tags: TagAssignment) -> Vec<Strophe> {
    text.split("\n\n")
        .filter_map(|group| {
            let verses: Vec<Verse> = group
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(|line| Verse {
                    id: uuid_utils::generate(),
                    words: line.split_whitespace().map(Word::new).collect(),
                    tag: tags.pick(),
                    adlib: None,
                    voice_type: None,
                    figure: None,
                    function: None,
                    technique: None,
                    meta_tool: None,
                    persona: None,
                    three_act: None,
                    music_section: None,
                    camera: Some(CameraSettings::standard()),
                    media: None,
                })
                .collect();

            if verses.is_empty() {
                return None;
            }

            let mut strophe = Strophe::prologue();
            strophe.description = IMPORTED_DESCRIPTION.to_string();
            strophe.verses = verses;
            Some(strophe)
        })
        .collect()
}
