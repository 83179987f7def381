pub mod character;
pub mod progress;
pub mod stage;
pub mod story;

pub use character::{Ability, CharacterData, Combatant, EffectKind, StatBlock, StatKind, Stats};
pub use progress::{
    BattleResultRecord, FinalCombatantState, ProgressRecord, StoredProgress, TeamMemberEntry,
    TeamMemberState, TeamStateWire,
};
pub use stage::{
    EnemyEntry, Modifier, StageDefinition, StageFile, StageModifications, StageRegistryDoc,
    StageRegistryEntry, StageRegistryKind, DEFAULT_DIFFICULTY,
};
pub use story::{
    BattleStage, Choice, ChoiceEffect, ChoiceStage, RawStageEntry, RecruitStage, StageEntry,
    StoryDefinition,
};
