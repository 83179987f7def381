//! Durable run progress and the ephemeral battle result record.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::character::StatBlock;
use crate::ids::{CharacterId, StoryId};

/// Persisted HP/mana/stats snapshot for one team member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberState {
    #[serde(rename = "currentHP")]
    pub current_hp: f64,
    pub current_mana: f64,
    /// Full stat snapshot taken when the run last saved. Absent for records
    /// written before the member's first battle resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatBlock>,
}

/// The durable per-(user, story) record describing run position and team
/// state.
///
/// Invariants: `current_stage_index` never decreases within a run, and
/// `completed_stages` is a high-water mark at least as large as any observed
/// index. A lost run is deleted outright, never reset in place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub current_stage_index: usize,
    pub completed_stages: usize,
    #[serde(default)]
    pub last_team_state: BTreeMap<CharacterId, TeamMemberState>,
}

impl ProgressRecord {
    /// The zero-valued record used when no progress exists.
    pub fn fresh() -> Self {
        Self::default()
    }

    pub fn is_fresh(&self) -> bool {
        self.current_stage_index == 0 && self.last_team_state.is_empty()
    }

    /// Advance past the current stage, raising the high-water mark.
    pub fn advance(&mut self) {
        self.current_stage_index += 1;
        self.completed_stages = self.completed_stages.max(self.current_stage_index);
    }

    /// The authoritative team roster for an in-progress run: the saved team
    /// state keys. Empty for a fresh run.
    pub fn team(&self) -> Vec<CharacterId> {
        self.last_team_state.keys().cloned().collect()
    }
}

// =============================================================================
// Wire shapes
// =============================================================================

/// Legacy backends stored the team state as an array of `{id, ...}` entries;
/// current ones store a map keyed by ID. Both decode, and normalization to
/// the map form happens exactly once, at the persistence-store boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TeamStateWire {
    Map(BTreeMap<CharacterId, TeamMemberState>),
    List(Vec<TeamMemberEntry>),
}

/// One element of the legacy array form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMemberEntry {
    pub id: CharacterId,
    #[serde(flatten)]
    pub state: TeamMemberState,
}

impl TeamStateWire {
    pub fn into_map(self) -> BTreeMap<CharacterId, TeamMemberState> {
        match self {
            TeamStateWire::Map(map) => map,
            TeamStateWire::List(entries) => entries
                .into_iter()
                .map(|entry| (entry.id, entry.state))
                .collect(),
        }
    }
}

/// The progress record as stored in the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProgress {
    pub current_stage_index: usize,
    pub completed_stages: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_team_state: Option<TeamStateWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoredProgress {
    /// Normalize the stored shape into the in-memory record (map form).
    pub fn normalize(self) -> ProgressRecord {
        ProgressRecord {
            current_stage_index: self.current_stage_index,
            completed_stages: self.completed_stages,
            last_team_state: self
                .last_team_state
                .map(TeamStateWire::into_map)
                .unwrap_or_default(),
        }
    }

    /// The stored shape is always written in the map form.
    pub fn from_record(record: &ProgressRecord, now: DateTime<Utc>) -> Self {
        Self {
            current_stage_index: record.current_stage_index,
            completed_stages: record.completed_stages,
            last_team_state: Some(TeamStateWire::Map(record.last_team_state.clone())),
            updated_at: Some(now),
        }
    }
}

// =============================================================================
// Battle result
// =============================================================================

/// Final HP/mana for one surviving combatant, as reported by the battle
/// subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalCombatantState {
    pub id: CharacterId,
    #[serde(rename = "currentHP")]
    pub current_hp: f64,
    pub current_mana: f64,
}

/// The ephemeral single-slot message by which the battle subsystem reports an
/// encounter's outcome. At most one live instance per user; a second write
/// before consumption overwrites the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleResultRecord {
    pub story_id: StoryId,
    pub stage_index: usize,
    pub victory: bool,
    #[serde(default)]
    pub final_team_state: Vec<FinalCombatantState>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(hp: f64) -> TeamMemberState {
        TeamMemberState {
            current_hp: hp,
            current_mana: 40.0,
            stats: None,
        }
    }

    #[test]
    fn advance_raises_high_water_mark_monotonically() {
        let mut record = ProgressRecord {
            current_stage_index: 2,
            completed_stages: 5,
            last_team_state: BTreeMap::new(),
        };
        record.advance();
        assert_eq!(record.current_stage_index, 3);
        // High-water mark from a previous, longer run is preserved.
        assert_eq!(record.completed_stages, 5);

        record.current_stage_index = 5;
        record.advance();
        assert_eq!(record.completed_stages, 6);
    }

    #[test]
    fn legacy_array_team_state_normalizes_to_map() {
        let stored: StoredProgress = serde_json::from_value(serde_json::json!({
            "currentStageIndex": 2,
            "completedStages": 2,
            "lastTeamState": [
                { "id": "knight", "currentHP": 120.0, "currentMana": 40.0 },
                { "id": "witch", "currentHP": 80.0, "currentMana": 95.0 }
            ]
        }))
        .expect("stored progress");

        let record = stored.normalize();
        assert_eq!(record.last_team_state.len(), 2);
        assert_eq!(
            record.last_team_state[&CharacterId::from("knight")].current_hp,
            120.0
        );
    }

    #[test]
    fn map_team_state_passes_through() {
        let stored: StoredProgress = serde_json::from_value(serde_json::json!({
            "currentStageIndex": 1,
            "completedStages": 1,
            "lastTeamState": {
                "knight": { "currentHP": 50.0, "currentMana": 10.0 }
            }
        }))
        .expect("stored progress");

        let record = stored.normalize();
        assert_eq!(record.team(), vec![CharacterId::from("knight")]);
    }

    #[test]
    fn stored_form_is_always_the_map_form() {
        let mut record = ProgressRecord::fresh();
        record
            .last_team_state
            .insert(CharacterId::from("knight"), member(120.0));
        let stored = StoredProgress::from_record(&record, Utc::now());
        assert!(matches!(
            stored.last_team_state,
            Some(TeamStateWire::Map(_))
        ));

        let value = serde_json::to_value(&stored).expect("serialize");
        assert!(value["lastTeamState"].is_object());
    }

    #[test]
    fn fresh_record_is_zero_valued() {
        let record = ProgressRecord::fresh();
        assert!(record.is_fresh());
        assert_eq!(record.current_stage_index, 0);
        assert_eq!(record.completed_stages, 0);
        assert!(record.team().is_empty());
    }
}
