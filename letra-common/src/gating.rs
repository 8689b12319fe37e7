//! Completion gating
//!
//! One configurable predicate replaces the old pair of near-identical
//! authoring pages (a normal mode and a gated "scholarly" mode). In
//! scholarly mode a verse's deeper annotations stay locked until its
//! required analysis metadata is filled in.

use serde::{Deserialize, Serialize};

use crate::model::Verse;

/// Editing mode carried by a project session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum CompletionGate {
    /// Annotations are always editable
    #[default]
    Standard,
    /// Annotations unlock only once required metadata is complete
    Scholarly,
}

impl CompletionGate {
    /// Required metadata present: narrative function, technique and literary
    /// figure must all be filled.
    pub fn metadata_complete(verse: &Verse) -> bool {
        let filled = |o: &Option<String>| o.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&verse.function) && filled(&verse.technique) && filled(&verse.figure)
    }

    /// Whether annotation edits on `verse` are currently locked
    pub fn locks(self, verse: &Verse) -> bool {
        match self {
            CompletionGate::Standard => false,
            CompletionGate::Scholarly => !Self::metadata_complete(verse),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RhymeTag, Verse};

    fn annotated() -> Verse {
        let mut v = Verse::from_line("a vida é um sonho", RhymeTag::A);
        v.function = Some("Tese".to_string());
        v.technique = Some("Storytelling".to_string());
        v.figure = Some("Metáfora".to_string());
        v
    }

    #[test]
    fn standard_mode_never_locks() {
        let v = Verse::from_line("solto", RhymeTag::A);
        assert!(!CompletionGate::Standard.locks(&v));
    }

    #[test]
    fn scholarly_mode_locks_until_metadata_complete() {
        let mut v = Verse::from_line("solto", RhymeTag::A);
        assert!(CompletionGate::Scholarly.locks(&v));

        v.function = Some("Tese".to_string());
        v.technique = Some("Storytelling".to_string());
        assert!(CompletionGate::Scholarly.locks(&v));

        v.figure = Some("Metáfora".to_string());
        assert!(!CompletionGate::Scholarly.locks(&v));
    }

    #[test]
    fn whitespace_only_metadata_does_not_count() {
        let mut v = annotated();
        v.technique = Some("   ".to_string());
        assert!(CompletionGate::Scholarly.locks(&v));
    }
}
