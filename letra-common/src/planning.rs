//! Production planning records
//!
//! The wizard's planning screens (fixed costs, wardrobe, contracts, release
//! checklist) persist their state inside the project payload, so the types
//! live here next to the song tree. These are plain data carried through
//! snapshots; the only behavior is the release-phase unlock rule.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::uuid_utils;

/// Whole planning block attached to a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Planning {
    pub budget: Vec<BudgetItem>,
    pub wardrobe: Vec<WardrobeItem>,
    pub team: Vec<TeamMember>,
    pub release: Vec<ReleasePhase>,
}

/// Fixed-cost budget line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetItem {
    pub id: Uuid,
    pub label: String,
    /// Free-form category, e.g. "Estúdio", "Transporte"
    pub category: String,
    pub amount_cents: i64,
    pub paid: bool,
}

/// Wardrobe plan entry, optionally tied to a verse's scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardrobeItem {
    pub id: Uuid,
    pub scene_label: String,
    pub outfit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Verse this outfit belongs to (id reference, position resolved lazily)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verse: Option<Uuid>,
}

/// Which production a contract covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductionType {
    #[serde(rename = "Música")]
    Music,
    #[serde(rename = "Vídeo")]
    Video,
}

/// Production-team contract record.
///
/// Field set mirrors the contract form: parties, payment, agreement flag and
/// the identification details needed to draft the service contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: Uuid,
    pub production_type: ProductionType,
    pub role: String,
    pub name: String,
    pub payment_cents: i64,
    pub agreement: bool,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_iban: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_bank: Option<String>,
}

/// One step of the release checklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseStep {
    pub id: String,
    pub label: String,
    pub completed: bool,
    #[serde(default)]
    pub required: bool,
}

/// Release-campaign phase: a titled group of steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleasePhase {
    pub title: String,
    pub steps: Vec<ReleaseStep>,
}

impl ReleasePhase {
    /// All required steps of this phase are done
    pub fn required_complete(&self) -> bool {
        self.steps.iter().filter(|s| s.required).all(|s| s.completed)
    }
}

/// A phase is unlocked when every required step of every preceding phase is
/// completed. The first phase is always unlocked.
pub fn phase_unlocked(phases: &[ReleasePhase], index: usize) -> bool {
    phases[..index.min(phases.len())]
        .iter()
        .all(ReleasePhase::required_complete)
}

/// Default release checklist seeded into new projects
pub fn default_release_plan() -> Vec<ReleasePhase> {
    let step = |id: &str, label: &str| ReleaseStep {
        id: id.to_string(),
        label: label.to_string(),
        completed: false,
        required: true,
    };

    vec![
        ReleasePhase {
            title: "GUERRILLA".to_string(),
            steps: vec![
                step("launch-1", "Design os Panfletos"),
                step("launch-2", "Imprimir os Panfletos"),
                step("launch-3", "Colar os Panfletos em zonas apropriadas"),
            ],
        },
        ReleasePhase {
            title: "YOUTUBE".to_string(),
            steps: vec![
                step("youtube-1", "Carregar o Vídeo no Youtube com o Estilo Predefinido"),
                step("youtube-2", "Partilhar o link nas redes sociais"),
            ],
        },
        ReleasePhase {
            title: "STREAMING".to_string(),
            steps: vec![
                step("streaming-1", "Distribuir para as plataformas de streaming"),
                step("streaming-2", "Submeter às playlists editoriais"),
            ],
        },
    ]
}

impl BudgetItem {
    pub fn new(label: &str, category: &str, amount_cents: i64) -> Self {
        Self {
            id: uuid_utils::generate(),
            label: label.to_string(),
            category: category.to_string(),
            amount_cents,
            paid: false,
        }
    }
}

/// Sum of unpaid budget lines, in cents
pub fn outstanding_cents(budget: &[BudgetItem]) -> i64 {
    budget.iter().filter(|b| !b.paid).map(|b| b.amount_cents).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_phase_is_always_unlocked() {
        let phases = default_release_plan();
        assert!(phase_unlocked(&phases, 0));
        assert!(!phase_unlocked(&phases, 1));
    }

    #[test]
    fn completing_required_steps_unlocks_the_next_phase() {
        let mut phases = default_release_plan();
        for step in &mut phases[0].steps {
            step.completed = true;
        }
        assert!(phase_unlocked(&phases, 1));
        assert!(!phase_unlocked(&phases, 2));
    }

    #[test]
    fn optional_steps_do_not_block_unlock() {
        let mut phases = default_release_plan();
        for step in &mut phases[0].steps {
            step.completed = true;
        }
        phases[1].steps.push(ReleaseStep {
            id: "youtube-extra".to_string(),
            label: "Behind the scenes".to_string(),
            completed: false,
            required: false,
        });
        for step in phases[1].steps.iter_mut().filter(|s| s.required) {
            step.completed = true;
        }
        assert!(phase_unlocked(&phases, 2));
    }

    #[test]
    fn outstanding_sums_only_unpaid_items() {
        let mut items = vec![
            BudgetItem::new("Estúdio", "Gravação", 25_000),
            BudgetItem::new("Drone", "Vídeo", 10_000),
        ];
        items[0].paid = true;
        assert_eq!(outstanding_cents(&items), 10_000);
    }
}
