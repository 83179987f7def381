//! Stage resolution and roster assembly.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use emberrun_domain::{
    CharacterId, Combatant, EnemyEntry, StageDefinition, StageEntry, StageId, StageRegistryKind,
    StoryId, TeamMemberState, UserId,
};

use crate::catalogs::{CatalogError, CatalogService};
use crate::repositories::RosterRepository;
use crate::use_cases::assemble::{
    AssembleError, AssembleOptions, CharacterAssembler, InstanceCounter,
};
use crate::use_cases::team::TeamResolver;
use crate::infrastructure::ports::{PassivePort, RandomPort};

#[derive(Debug, thiserror::Error)]
pub enum StageLoadError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("Stage {index} of story {story} is not a battle stage")]
    NotABattleStage { story: StoryId, index: usize },
    #[error("Story {story} has no stage at index {index}")]
    StageIndexOutOfRange { story: StoryId, index: usize },
    #[error(transparent)]
    Assemble(#[from] AssembleError),
}

/// Locally cached ad-hoc stage definitions, consulted before the registry.
/// Supports one-off encounters generated outside the catalog.
#[derive(Default)]
pub struct StageOverrideCache {
    entries: DashMap<StageId, StageDefinition>,
}

impl StageOverrideCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, id: StageId, definition: StageDefinition) {
        self.entries.insert(id, definition);
    }

    pub fn get(&self, id: &StageId) -> Option<StageDefinition> {
        self.entries.get(id).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, id: &StageId) {
        self.entries.remove(id);
    }
}

/// Resolve a battle stage from a story at a given index.
#[derive(Debug, Clone)]
pub struct StoryContext {
    pub story_id: StoryId,
    pub stage_index: usize,
}

/// The output of one stage load: the merged definition and both rosters.
#[derive(Debug)]
pub struct LoadedStage {
    pub definition: StageDefinition,
    pub ai_roster: Vec<Combatant>,
    pub player_roster: Vec<Combatant>,
}

pub struct StageLoader {
    catalogs: Arc<CatalogService>,
    assembler: Arc<CharacterAssembler>,
    roster: Arc<RosterRepository>,
    teams: Arc<TeamResolver>,
    passives: Arc<dyn PassivePort>,
    random: Arc<dyn RandomPort>,
    overrides: Arc<StageOverrideCache>,
}

impl StageLoader {
    pub fn new(
        catalogs: Arc<CatalogService>,
        assembler: Arc<CharacterAssembler>,
        roster: Arc<RosterRepository>,
        teams: Arc<TeamResolver>,
        passives: Arc<dyn PassivePort>,
        random: Arc<dyn RandomPort>,
        overrides: Arc<StageOverrideCache>,
    ) -> Self {
        Self {
            catalogs,
            assembler,
            roster,
            teams,
            passives,
            random,
            overrides,
        }
    }

    /// Resolve one stage into its canonical definition and assemble both
    /// rosters. Resolution precedence: story context, then a cached ad-hoc
    /// override with a non-empty enemy list, then the stage registry merged
    /// with its stage file.
    pub async fn load_stage(
        &self,
        user: &UserId,
        stage_id: &StageId,
        team_state: Option<&BTreeMap<CharacterId, TeamMemberState>>,
        story_context: Option<StoryContext>,
    ) -> Result<LoadedStage, StageLoadError> {
        let definition = match story_context {
            Some(context) => self.resolve_from_story(&context).await?,
            None => match self.overrides.get(stage_id) {
                Some(definition) if !definition.enemies.is_empty() => {
                    tracing::debug!(%stage_id, "using ad-hoc stage override");
                    definition
                }
                _ => self.resolve_from_registry(stage_id).await?,
            },
        };

        let mut counter = InstanceCounter::new();
        let mut ai_roster = self.build_ai_roster(&definition, &mut counter).await?;
        let mut player_roster = self
            .build_player_roster(user, team_state, &mut counter)
            .await?;

        // Passive hooks run strictly after all stat merging, so passives that
        // read "starting" stats see final values.
        for combatant in ai_roster.iter_mut().chain(player_roster.iter_mut()) {
            if combatant.passive.is_some() {
                self.passives.initialize(combatant);
            }
        }

        Ok(LoadedStage {
            definition,
            ai_roster,
            player_roster,
        })
    }

    async fn resolve_from_story(
        &self,
        context: &StoryContext,
    ) -> Result<StageDefinition, StageLoadError> {
        let story = self.catalogs.story(&context.story_id).await?;
        let entry = story.stages.get(context.stage_index).ok_or_else(|| {
            StageLoadError::StageIndexOutOfRange {
                story: context.story_id.clone(),
                index: context.stage_index,
            }
        })?;
        match entry {
            StageEntry::Battle(battle) => Ok(battle.to_definition()),
            // Choice and recruit stages never reach this loader; the story
            // orchestrator handles them.
            _ => Err(StageLoadError::NotABattleStage {
                story: context.story_id.clone(),
                index: context.stage_index,
            }),
        }
    }

    async fn resolve_from_registry(
        &self,
        stage_id: &StageId,
    ) -> Result<StageDefinition, StageLoadError> {
        let entry = self.catalogs.registry_entry(stage_id).await?;
        let file = self.catalogs.fetch_stage_file(&entry.path).await?;
        let mut definition = StageDefinition::merged(file, &entry);

        if entry.kind == StageRegistryKind::RandomBattle {
            if let (Some(pool), Some(count)) = (&entry.enemy_pool, entry.enemy_count) {
                definition.enemies = self
                    .sample_pool(pool, count)
                    .into_iter()
                    .map(EnemyEntry::plain)
                    .collect();
            }
        }

        Ok(definition)
    }

    /// Sample `count` characters from `pool` without replacement. When the
    /// pool runs out before the count is reached it is refilled and sampling
    /// continues; duplicates are possible only in that refill case.
    fn sample_pool(&self, pool: &[CharacterId], count: usize) -> Vec<CharacterId> {
        if pool.is_empty() {
            return Vec::new();
        }
        let mut remaining: Vec<CharacterId> = pool.to_vec();
        let mut picked = Vec::with_capacity(count);
        while picked.len() < count {
            if remaining.is_empty() {
                remaining = pool.to_vec();
            }
            let index = self.random.index(remaining.len());
            picked.push(remaining.swap_remove(index));
        }
        picked
    }

    async fn build_ai_roster(
        &self,
        definition: &StageDefinition,
        counter: &mut InstanceCounter,
    ) -> Result<Vec<Combatant>, StageLoadError> {
        let mut roster = Vec::with_capacity(definition.enemies.len());
        for entry in &definition.enemies {
            let options = AssembleOptions {
                is_ai: true,
                stage_modifications: entry.modifications.as_ref(),
                ..Default::default()
            };
            match self
                .assembler
                .assemble(&entry.character_id, options, counter)
                .await
            {
                Ok(combatant) => roster.push(combatant),
                Err(AssembleError::UnknownCharacter(id)) => {
                    // Battles do not hard-fail on one missing enemy.
                    tracing::warn!(character = %id, "dropping unknown enemy from roster");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(roster)
    }

    async fn build_player_roster(
        &self,
        user: &UserId,
        team_state: Option<&BTreeMap<CharacterId, TeamMemberState>>,
        counter: &mut InstanceCounter,
    ) -> Result<Vec<Combatant>, StageLoadError> {
        let team = self.teams.resolve(user, team_state).await?;

        let mut roster = Vec::with_capacity(team.len());
        for character_id in &team {
            let talent_ids = self.roster.selected_talents(user, character_id).await;
            let options = AssembleOptions {
                is_ai: false,
                talent_ids: &talent_ids,
                saved_override: team_state.and_then(|state| state.get(character_id)),
                ..Default::default()
            };
            match self.assembler.assemble(character_id, options, counter).await {
                Ok(combatant) => roster.push(combatant),
                Err(AssembleError::UnknownCharacter(id)) => {
                    tracing::warn!(character = %id, "dropping unknown team member from roster");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(roster)
    }
}
