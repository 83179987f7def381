//! Pure data model for the Emberrun progression engine: IDs, catalog
//! entities, run progress, and the unified domain error. No I/O lives here.

pub mod entities;
pub mod error;
pub mod ids;

pub use entities::{
    Ability, BattleResultRecord, BattleStage, CharacterData, Choice, ChoiceEffect, ChoiceStage,
    Combatant, EffectKind, EnemyEntry, FinalCombatantState, Modifier, ProgressRecord,
    RecruitStage, StageDefinition, StageEntry, StageFile, StageModifications, StageRegistryDoc,
    StageRegistryEntry, StageRegistryKind, StatBlock, StatKind, Stats, StoredProgress,
    StoryDefinition, TeamMemberEntry, TeamMemberState, TeamStateWire, DEFAULT_DIFFICULTY,
};
pub use error::DomainError;
pub use ids::{CharacterId, InstanceId, InstanceRole, StageId, StoryId, TalentId, UserId};
