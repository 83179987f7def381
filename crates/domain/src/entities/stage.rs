//! Stage registry entries, stage files, and the canonical merged definition.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{CharacterId, StageId};

/// Per-enemy stat/damage multipliers declared on a stage.
///
/// Multipliers apply to the current (post-talent) stat value and are persisted
/// into the base shadow copy as well, so later recalculation passes keep them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageModifications {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_multiplier: Option<f64>,
}

impl StageModifications {
    pub fn is_empty(&self) -> bool {
        self.hp_multiplier.is_none()
            && self.damage_multiplier.is_none()
            && self.speed_multiplier.is_none()
    }
}

/// One enemy slot on a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyEntry {
    pub character_id: CharacterId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifications: Option<StageModifications>,
}

impl EnemyEntry {
    pub fn plain(character_id: CharacterId) -> Self {
        Self {
            character_id,
            modifications: None,
        }
    }
}

/// A stage-wide rule consumed by the battle subsystem (per-turn healing,
/// fog, and so on). The engine carries these opaquely; only the battle loop
/// interprets the parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub params: Value,
}

/// How a registry entry produces its enemy list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageRegistryKind {
    /// Enemies come from the stage file (or the entry's override list).
    #[default]
    Scripted,
    /// Enemies are sampled from `enemy_pool` at load time.
    RandomBattle,
}

/// One row of the stage registry.
///
/// The optional fields are overrides: when present they take precedence over
/// the same field loaded from the stage file at `path`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageRegistryEntry {
    pub id: StageId,
    pub path: String,
    #[serde(rename = "type", default)]
    pub kind: StageRegistryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enemy_pool: Option<Vec<CharacterId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enemy_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enemies: Option<Vec<EnemyEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifiers: Option<Vec<Modifier>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objectives: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewards: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u32>,
}

/// The document wrapper of the stage registry catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageRegistryDoc {
    pub stages: Vec<StageRegistryEntry>,
}

/// The shape of a stage file fetched from a registry entry's `path`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageFile {
    pub name: String,
    #[serde(default)]
    pub enemies: Vec<EnemyEntry>,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objectives: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewards: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

/// The canonical merged stage shape consumed by the rest of the system.
/// Built fresh per load; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageDefinition {
    pub name: String,
    pub enemies: Vec<EnemyEntry>,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objectives: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewards: Option<Value>,
    pub difficulty: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

pub const DEFAULT_DIFFICULTY: u32 = 1;

impl StageDefinition {
    /// Merge a stage file with its registry entry. Any field present on the
    /// registry entry overwrites the same field from the file, which lets
    /// operators patch a stage without touching the stage file itself.
    pub fn merged(file: StageFile, entry: &StageRegistryEntry) -> Self {
        Self {
            name: file.name,
            enemies: entry.enemies.clone().unwrap_or(file.enemies),
            modifiers: entry.modifiers.clone().unwrap_or(file.modifiers),
            objectives: entry.objectives.clone().or(file.objectives),
            rewards: entry.rewards.clone().or(file.rewards),
            difficulty: entry
                .difficulty
                .or(file.difficulty)
                .unwrap_or(DEFAULT_DIFFICULTY),
            background: file.background,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage_file() -> StageFile {
        serde_json::from_value(serde_json::json!({
            "name": "Ashen Crossing",
            "enemies": [{ "characterId": "ghoul" }, { "characterId": "ghoul" }],
            "modifiers": [{ "type": "regen", "amount": 5 }],
            "difficulty": 2,
            "background": "ashen_road.png"
        }))
        .expect("stage file fixture")
    }

    #[test]
    fn registry_fields_override_stage_file_fields() {
        let entry: StageRegistryEntry = serde_json::from_value(serde_json::json!({
            "id": "ashen_crossing",
            "path": "stages/ashen_crossing.json",
            "enemies": [{ "characterId": "bone_knight" }],
            "difficulty": 4
        }))
        .expect("registry entry fixture");

        let merged = StageDefinition::merged(stage_file(), &entry);
        assert_eq!(merged.enemies.len(), 1);
        assert_eq!(merged.enemies[0].character_id.as_str(), "bone_knight");
        assert_eq!(merged.difficulty, 4);
        // Fields absent on the entry come from the file.
        assert_eq!(merged.modifiers.len(), 1);
        assert_eq!(merged.background.as_deref(), Some("ashen_road.png"));
    }

    #[test]
    fn merge_keeps_file_fields_when_entry_is_bare() {
        let entry: StageRegistryEntry = serde_json::from_value(serde_json::json!({
            "id": "ashen_crossing",
            "path": "stages/ashen_crossing.json"
        }))
        .expect("registry entry fixture");

        let merged = StageDefinition::merged(stage_file(), &entry);
        assert_eq!(merged.enemies.len(), 2);
        assert_eq!(merged.difficulty, 2);
    }

    #[test]
    fn random_battle_entries_decode_pool_and_count() {
        let entry: StageRegistryEntry = serde_json::from_value(serde_json::json!({
            "id": "wilds",
            "path": "stages/wilds.json",
            "type": "random_battle",
            "enemyPool": ["ghoul", "bone_knight", "marsh_hag"],
            "enemyCount": 2
        }))
        .expect("registry entry fixture");

        assert_eq!(entry.kind, StageRegistryKind::RandomBattle);
        assert_eq!(entry.enemy_pool.as_ref().map(Vec::len), Some(3));
        assert_eq!(entry.enemy_count, Some(2));
    }

    #[test]
    fn modifier_round_trips_opaque_params() {
        let raw = serde_json::json!({ "type": "regen", "amount": 5, "target": "all" });
        let modifier: Modifier = serde_json::from_value(raw.clone()).expect("modifier");
        assert_eq!(modifier.kind, "regen");
        let back = serde_json::to_value(&modifier).expect("serialize");
        assert_eq!(back, raw);
    }
}
