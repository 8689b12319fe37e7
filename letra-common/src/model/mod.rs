//! Project tree data model
//!
//! A project is an ordered list of strophes; a strophe is an ordered list of
//! verses; a verse is an ordered list of words plus annotation metadata
//! (rhyme tag, poetic devices, dramatic function, per-verse cinematography).
//!
//! The tree has a single owner (the editor session) and is mutated in place
//! while the session lock is held. Strophes and verses are owned by their
//! parent collection; the only cross-references are the verse-id lists in
//! `CameraSettings::related_verses`, which are resolved to flattened
//! positions lazily at export time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::planning::Planning;
use crate::uuid_utils;

pub mod import;
pub mod ops;

pub use ops::Keyed;

/// Smallest text unit of a verse.
///
/// Word text is case-normalized to upper-case on every edit. `stressed` is a
/// display flag written back by meter analysis; it never changes the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub text: String,
    /// Optional user-picked highlight color (CSS color string)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_color: Option<String>,
    /// Stressed-syllable display flag set by meter analysis
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stressed: Option<bool>,
}

impl Word {
    /// Create a word, upper-casing the text
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_uppercase(),
            custom_color: None,
            stressed: None,
        }
    }

    /// Replace the text, re-applying the upper-case normalization.
    ///
    /// Idempotent: upper-casing already-upper text is a no-op.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_uppercase();
    }
}

/// Rhyme-scheme slot label (not a computed property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RhymeTag {
    A,
    B,
    C,
    D,
}

impl RhymeTag {
    /// Cycle A -> B -> C -> D -> A
    pub fn next(self) -> Self {
        match self {
            RhymeTag::A => RhymeTag::B,
            RhymeTag::B => RhymeTag::C,
            RhymeTag::C => RhymeTag::D,
            RhymeTag::D => RhymeTag::A,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RhymeTag::A => "A",
            RhymeTag::B => "B",
            RhymeTag::C => "C",
            RhymeTag::D => "D",
        }
    }
}

/// Vocal delivery annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VoiceType {
    Chest,
    Baby,
    Psycho,
    Intimidating,
    Charismatic,
    Empresonification,
}

/// Dramatic architecture label carried by each strophe
///
/// Labels follow the classical tragedy structure used throughout the
/// authoring screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Architecture {
    #[serde(rename = "Prelúdio")]
    Prelude,
    #[serde(rename = "Prólogo")]
    Prologue,
    #[serde(rename = "Parodos (coro)")]
    Parodos,
    #[serde(rename = "Episódios")]
    Episodes,
    #[serde(rename = "Êxodo")]
    Exodus,
    #[serde(rename = "Epílogo")]
    Epilogue,
}

impl Architecture {
    pub fn label(self) -> &'static str {
        match self {
            Architecture::Prelude => "Prelúdio",
            Architecture::Prologue => "Prólogo",
            Architecture::Parodos => "Parodos (coro)",
            Architecture::Episodes => "Episódios",
            Architecture::Exodus => "Êxodo",
            Architecture::Epilogue => "Epílogo",
        }
    }
}

/// Episode sub-type, only meaningful when architecture is `Episodes`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeBeat {
    #[serde(rename = "Ascensão do herói")]
    HeroRise,
    #[serde(rename = "Erro trágico (hamartia)")]
    Hamartia,
    #[serde(rename = "Virada de fortuna (peripeteia)")]
    Peripeteia,
    #[serde(rename = "Queda (catástrofe)")]
    Catastrophe,
    #[serde(rename = "Reconhecimento (anagnórise)")]
    Anagnorisis,
}

/// Song-structure section tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MusicSection {
    Introducao,
    Verso,
    PreRefrao,
    Refrao,
    Ponte,
    Break,
    Solo,
    Outro,
}

impl MusicSection {
    pub fn label(self) -> &'static str {
        match self {
            MusicSection::Introducao => "Introdução",
            MusicSection::Verso => "Verso (estrofe)",
            MusicSection::PreRefrao => "Pré-refrão",
            MusicSection::Refrao => "Refrão (coro)",
            MusicSection::Ponte => "Ponte (bridge)",
            MusicSection::Break => "Break / Paragem",
            MusicSection::Solo => "Solo",
            MusicSection::Outro => "Outro (conclusão)",
        }
    }
}

/// Camera shot framing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShotType {
    HighAngle,
    LowAngle,
    DutchAngle,
    EyeLevel,
}

impl ShotType {
    pub fn label(self) -> &'static str {
        match self {
            ShotType::HighAngle => "Plano alto / Ângulo alto",
            ShotType::LowAngle => "Plano baixo / Ângulo baixo",
            ShotType::DutchAngle => "Plano holandês / Ângulo inclinado",
            ShotType::EyeLevel => "Ao nível dos olhos",
        }
    }
}

/// Per-verse cinematography plan.
///
/// A flat record; several sub-fields are write-only planning notes that only
/// surface in the shooting-script export. `related_verses` holds verse ids
/// (never positions) so the references survive reordering; flattened 1-based
/// positions are computed on demand by [`Project::resolve_related`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CameraSettings {
    pub shot_type: Option<ShotType>,
    pub movement: Option<String>,
    pub resolution: Option<String>,
    pub stabilization: Option<String>,
    pub location: Option<String>,
    /// Short scene label shown on the slate
    pub scene_label: Option<String>,
    /// Ids of other verses covered by the same setup
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_verses: Vec<Uuid>,
    pub iso: Option<String>,
    pub shutter_speed: Option<String>,
    pub nd_filter: Option<String>,
    pub int_ext: Option<String>,
    pub characters: Option<String>,
    pub props: Option<String>,
    pub style: Option<String>,
    pub objective: Option<String>,
    pub tags: Option<String>,
    pub special_effects: Option<String>,
    pub camera_movement: Option<String>,
    pub coverage: Option<String>,
    pub cast: Option<String>,
    pub props_costumes: Option<String>,
    pub rhythm_style: Option<String>,
    pub scene_type: Option<String>,
}

impl CameraSettings {
    /// Default setup assigned to newly created verses
    pub fn standard() -> Self {
        Self {
            shot_type: Some(ShotType::EyeLevel),
            movement: Some("pan".to_string()),
            resolution: Some("4k".to_string()),
            stabilization: Some("tripod".to_string()),
            location: Some(String::new()),
            scene_label: Some(String::new()),
            ..Self::default()
        }
    }
}

/// Media attachment referenced by a verse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAttachment {
    /// MIME type, e.g. "image/png" or "video/mp4"
    pub mime_type: String,
    #[serde(flatten)]
    pub data: MediaData,
}

/// Media payload: remote URL or inline base64
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaData {
    Url(String),
    Base64(String),
}

impl MediaAttachment {
    /// True for image MIME types (the only kind embedded in PDF exports)
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// One line of lyric: ordered words plus annotations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verse {
    pub id: Uuid,
    pub words: Vec<Word>,
    pub tag: RhymeTag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adlib: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_type: Option<VoiceType>,
    /// Literary figure name (e.g. "Metáfora")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub figure: Option<String>,
    /// Narrative function annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technique: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_tool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub three_act: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub music_section: Option<MusicSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera: Option<CameraSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaAttachment>,
}

impl Verse {
    /// Create a verse from a line of text, splitting on whitespace
    pub fn from_line(line: &str, tag: RhymeTag) -> Self {
        Self {
            id: uuid_utils::generate(),
            words: line.split_whitespace().map(Word::new).collect(),
            tag,
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
        }
    }

    /// Empty verse with the default camera setup
    pub fn empty(tag: RhymeTag) -> Self {
        Self::from_line("", tag)
    }

    /// Space-joined text of the verse
    pub fn line(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Stanza: ordered verses sharing dramatic-structure metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strophe {
    pub id: Uuid,
    pub verses: Vec<Verse>,
    pub architecture: Architecture,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architecture_desc: Option<EpisodeBeat>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub music_section: Option<MusicSection>,
}

impl Strophe {
    /// New empty strophe with the default architecture label
    pub fn prologue() -> Self {
        Self {
            id: uuid_utils::generate(),
            verses: Vec::new(),
            architecture: Architecture::Prologue,
            architecture_desc: None,
            description: "Introdução que apresenta o contexto inicial da obra, \
                          preparando o cenário para a narrativa principal."
                .to_string(),
            music_section: None,
        }
    }
}

/// Song metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SongInfo {
    pub title: String,
    pub artist: String,
    pub featuring: Vec<String>,
    pub producer: String,
}

/// Root aggregate: the whole authoring project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub song_info: SongInfo,
    pub strophes: Vec<Strophe>,
    pub music_structure: Vec<MusicSection>,
    #[serde(default)]
    pub planning: Planning,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// New project with one empty default strophe and the seeded release
    /// checklist
    pub fn new() -> Self {
        let now = Utc::now();
        let planning = Planning {
            release: crate::planning::default_release_plan(),
            ..Planning::default()
        };
        Self {
            id: uuid_utils::generate(),
            song_info: SongInfo::default(),
            strophes: vec![Strophe::prologue()],
            music_structure: Vec::new(),
            planning,
            created_at: now,
            updated_at: now,
        }
    }

    /// All verses in document order
    pub fn flat_verses(&self) -> Vec<&Verse> {
        self.strophes.iter().flat_map(|s| s.verses.iter()).collect()
    }

    /// Mutable lookup of a verse anywhere in the tree
    pub fn verse_mut(&mut self, verse_id: Uuid) -> Option<&mut Verse> {
        self.strophes
            .iter_mut()
            .flat_map(|s| s.verses.iter_mut())
            .find(|v| v.id == verse_id)
    }

    /// Lookup of a strophe by id
    pub fn strophe_mut(&mut self, strophe_id: Uuid) -> Option<&mut Strophe> {
        self.strophes.iter_mut().find(|s| s.id == strophe_id)
    }

    /// Resolve related-verse id references to 1-based flattened positions.
    ///
    /// Ids that no longer resolve (the referenced verse was removed) are
    /// skipped; nothing is rewritten in the tree.
    pub fn resolve_related(&self, related: &[Uuid]) -> Vec<usize> {
        let flat = self.flat_verses();
        related
            .iter()
            .filter_map(|id| flat.iter().position(|v| v.id == *id).map(|p| p + 1))
            .collect()
    }

    /// Add a music-structure section if not already present
    pub fn add_music_section(&mut self, section: MusicSection) {
        if !self.music_structure.contains(&section) {
            self.music_structure.push(section);
        }
    }

    /// Remove a music-structure section
    pub fn remove_music_section(&mut self, section: MusicSection) {
        self.music_structure.retain(|s| *s != section);
    }

    /// Mark the project as touched
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

impl Keyed for Verse {
    fn key(&self) -> Uuid {
        self.id
    }
}

impl Keyed for Strophe {
    fn key(&self) -> Uuid {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_text_is_uppercased_on_create_and_edit() {
        let mut w = Word::new("baixo");
        assert_eq!(w.text, "BAIXO");
        w.set_text("Alto");
        assert_eq!(w.text, "ALTO");
        // Idempotent on already-upper text
        w.set_text("ALTO");
        assert_eq!(w.text, "ALTO");
    }

    #[test]
    fn rhyme_tag_cycles_through_four_letters() {
        let mut tag = RhymeTag::A;
        for expected in [RhymeTag::B, RhymeTag::C, RhymeTag::D, RhymeTag::A] {
            tag = tag.next();
            assert_eq!(tag, expected);
        }
    }

    #[test]
    fn new_project_starts_with_one_empty_prologue() {
        let p = Project::new();
        assert_eq!(p.strophes.len(), 1);
        assert_eq!(p.strophes[0].architecture, Architecture::Prologue);
        assert!(p.strophes[0].verses.is_empty());
        assert!(p.music_structure.is_empty());
    }

    #[test]
    fn related_verse_resolution_skips_dangling_ids() {
        let mut p = Project::new();
        let s = &mut p.strophes[0];
        let v1 = Verse::from_line("UM", RhymeTag::A);
        let v2 = Verse::from_line("DOIS", RhymeTag::B);
        let gone = uuid_utils::generate();
        let refs = vec![v2.id, gone, v1.id];
        s.verses.push(v1);
        s.verses.push(v2);

        assert_eq!(p.resolve_related(&refs), vec![2, 1]);
    }

    #[test]
    fn verse_line_joins_words_with_spaces() {
        let v = Verse::from_line("nunca mais  volto", RhymeTag::A);
        assert_eq!(v.line(), "NUNCA MAIS VOLTO");
    }

    #[test]
    fn project_roundtrips_through_json() {
        let mut p = Project::new();
        p.song_info.title = "Ambo".to_string();
        p.strophes[0]
            .verses
            .push(Verse::from_line("faz te um ambo", RhymeTag::A));
        p.add_music_section(MusicSection::Refrao);

        let json = serde_json::to_string(&p).unwrap();
        let back: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }
}
