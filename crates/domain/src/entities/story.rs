//! Story definitions and their stage entries.
//!
//! The story catalog JSON is permissive: `type` defaults to battle, a `boss`
//! string is shorthand for a single enemy, and stage-wide rules may arrive
//! under either `modifiers` or `stageEffects`. All of that is resolved once
//! at decode time into the explicit [`StageEntry`] union so downstream code
//! pattern-matches instead of null-checking optional fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::stage::{EnemyEntry, Modifier, StageDefinition, DEFAULT_DIFFICULTY};
use crate::error::DomainError;
use crate::ids::{CharacterId, StoryId};

/// One story: an ordered sequence of stages making up a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryDefinition {
    pub id: StoryId,
    pub title: String,
    pub stages: Vec<StageEntry>,
}

/// One stage of a story, resolved into its explicit variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", try_from = "RawStageEntry")]
pub enum StageEntry {
    Battle(BattleStage),
    Choice(ChoiceStage),
    Recruit(RecruitStage),
}

impl StageEntry {
    pub fn name(&self) -> &str {
        match self {
            StageEntry::Battle(stage) => &stage.name,
            StageEntry::Choice(stage) => &stage.name,
            StageEntry::Recruit(stage) => &stage.name,
        }
    }
}

/// A battle stage embedded in a story.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleStage {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u32>,
    pub enemies: Vec<EnemyEntry>,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objectives: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

impl BattleStage {
    /// Canonicalize into the merged stage shape the loader hands out.
    pub fn to_definition(&self) -> StageDefinition {
        StageDefinition {
            name: self.name.clone(),
            enemies: self.enemies.clone(),
            modifiers: self.modifiers.clone(),
            objectives: self.objectives.clone(),
            rewards: None,
            difficulty: self.difficulty.unwrap_or(DEFAULT_DIFFICULTY),
            background: self.background.clone(),
        }
    }
}

/// A narrative branch: the player picks one of several effects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceStage {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub choices: Vec<Choice>,
}

/// A recruitment beat: offer characters matching a tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecruitStage {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub recruit_tag: String,
    pub recruit_count: usize,
}

/// One option on a choice stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub name: String,
    pub effect: ChoiceEffect,
}

/// The effect a choice applies to one team member.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChoiceEffect {
    /// Restore HP, either a flat amount or a percentage of max HP.
    Heal {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        amount: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        amount_percent: Option<f64>,
    },
    /// Additive stat increase, permanent for the run.
    StatBoost {
        stat: crate::entities::character::StatKind,
        amount: f64,
    },
    /// Increase by a percentage of the *catalog base* stat, recomputed from
    /// the catalog rather than the current run-modified value. This prevents
    /// compounding across repeated boosts.
    StatBoostPercent {
        stat: crate::entities::character::StatKind,
        amount_percent: f64,
    },
    /// Bring a downed character back up.
    Revive,
    /// 50/50 gamble: kill the character or double their max HP.
    RiskyMedicine,
}

// =============================================================================
// Permissive wire shape
// =============================================================================

/// The raw story-catalog stage shape before variant resolution.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStageEntry {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub difficulty: Option<u32>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub boss: Option<String>,
    #[serde(default)]
    pub enemies: Option<Vec<EnemyEntry>>,
    #[serde(default)]
    pub modifiers: Option<Vec<Modifier>>,
    #[serde(default)]
    pub stage_effects: Option<Vec<Modifier>>,
    #[serde(default)]
    pub objectives: Option<Value>,
    #[serde(default)]
    pub choices: Option<Vec<Choice>>,
    #[serde(default)]
    pub recruit_tag: Option<String>,
    #[serde(default)]
    pub recruit_count: Option<usize>,
    #[serde(default)]
    pub background: Option<String>,
}

impl TryFrom<RawStageEntry> for StageEntry {
    type Error = DomainError;

    fn try_from(raw: RawStageEntry) -> Result<Self, Self::Error> {
        let kind = raw.kind.as_deref().unwrap_or("battle");
        match kind {
            "battle" => {
                let mut enemies = raw.enemies.unwrap_or_default();
                if enemies.is_empty() {
                    if let Some(boss) = &raw.boss {
                        enemies.push(EnemyEntry::plain(CharacterId::from_display_name(boss)));
                    }
                }
                if enemies.is_empty() {
                    return Err(DomainError::validation(format!(
                        "battle stage '{}' has neither enemies nor a boss",
                        raw.name
                    )));
                }
                // Either key is accepted; `modifiers` wins when both appear.
                let modifiers = raw.modifiers.or(raw.stage_effects).unwrap_or_default();
                Ok(StageEntry::Battle(BattleStage {
                    name: raw.name,
                    description: raw.description,
                    difficulty: raw.difficulty,
                    enemies,
                    modifiers,
                    objectives: raw.objectives,
                    background: raw.background,
                }))
            }
            "choice" => {
                let choices = raw.choices.unwrap_or_default();
                if choices.is_empty() {
                    return Err(DomainError::validation(format!(
                        "choice stage '{}' has no choices",
                        raw.name
                    )));
                }
                Ok(StageEntry::Choice(ChoiceStage {
                    name: raw.name,
                    description: raw.description,
                    choices,
                }))
            }
            "recruit" => {
                let recruit_tag = raw.recruit_tag.ok_or_else(|| {
                    DomainError::validation(format!(
                        "recruit stage '{}' is missing recruitTag",
                        raw.name
                    ))
                })?;
                Ok(StageEntry::Recruit(RecruitStage {
                    name: raw.name,
                    description: raw.description,
                    recruit_tag,
                    recruit_count: raw.recruit_count.unwrap_or(1),
                }))
            }
            other => Err(DomainError::parse(format!(
                "unknown stage type '{}' on stage '{}'",
                other, raw.name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_without_type_decodes_as_battle() {
        let entry: StageEntry = serde_json::from_value(serde_json::json!({
            "name": "Outskirts",
            "enemies": [{ "characterId": "ghoul" }]
        }))
        .expect("battle stage");
        let StageEntry::Battle(battle) = entry else {
            panic!("expected battle variant");
        };
        assert_eq!(battle.enemies.len(), 1);
        assert_eq!(battle.difficulty, None);
    }

    #[test]
    fn boss_shorthand_becomes_single_enemy_entry() {
        let entry: StageEntry = serde_json::from_value(serde_json::json!({
            "name": "Throne Room",
            "boss": "Iron Warden"
        }))
        .expect("boss stage");
        let StageEntry::Battle(battle) = entry else {
            panic!("expected battle variant");
        };
        assert_eq!(battle.enemies.len(), 1);
        assert_eq!(battle.enemies[0].character_id.as_str(), "iron_warden");
    }

    #[test]
    fn stage_effects_key_is_accepted_for_modifiers() {
        let entry: StageEntry = serde_json::from_value(serde_json::json!({
            "name": "Mire",
            "enemies": [{ "characterId": "marsh_hag" }],
            "stageEffects": [{ "type": "poison_air", "amount": 3 }]
        }))
        .expect("stage with stageEffects");
        let StageEntry::Battle(battle) = entry else {
            panic!("expected battle variant");
        };
        assert_eq!(battle.modifiers.len(), 1);
        assert_eq!(battle.modifiers[0].kind, "poison_air");
    }

    #[test]
    fn battle_with_no_enemies_is_rejected() {
        let result: Result<StageEntry, _> = serde_json::from_value(serde_json::json!({
            "name": "Empty Field"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn choice_stage_decodes_effect_variants() {
        let entry: StageEntry = serde_json::from_value(serde_json::json!({
            "name": "Crossroads",
            "type": "choice",
            "choices": [
                { "name": "Rest", "effect": { "type": "heal", "amount_percent": 50 } },
                { "name": "Train", "effect": { "type": "stat_boost", "stat": "attack", "amount": 10 } },
                { "name": "Gamble", "effect": { "type": "risky_medicine" } }
            ]
        }))
        .expect("choice stage");
        let StageEntry::Choice(choice) = entry else {
            panic!("expected choice variant");
        };
        assert_eq!(choice.choices.len(), 3);
        assert!(matches!(
            choice.choices[2].effect,
            ChoiceEffect::RiskyMedicine
        ));
    }

    #[test]
    fn recruit_stage_requires_tag_and_defaults_count() {
        let entry: StageEntry = serde_json::from_value(serde_json::json!({
            "name": "Campfire",
            "type": "recruit",
            "recruitTag": "school"
        }))
        .expect("recruit stage");
        let StageEntry::Recruit(recruit) = entry else {
            panic!("expected recruit variant");
        };
        assert_eq!(recruit.recruit_tag, "school");
        assert_eq!(recruit.recruit_count, 1);

        let missing: Result<StageEntry, _> = serde_json::from_value(serde_json::json!({
            "name": "Campfire",
            "type": "recruit"
        }));
        assert!(missing.is_err());
    }

    #[test]
    fn unknown_stage_type_is_a_parse_error() {
        let result: Result<StageEntry, _> = serde_json::from_value(serde_json::json!({
            "name": "???",
            "type": "puzzle"
        }));
        assert!(result.is_err());
    }
}
