//! The top-level run state machine: determine the current stage, reconcile
//! pending battle results, and drive choice and recruitment stages.

use std::sync::Arc;

use emberrun_domain::{
    BattleStage, CharacterId, ChoiceEffect, ChoiceStage, Combatant, ProgressRecord, RecruitStage,
    StageEntry, StatBlock, StoryDefinition, StoryId, TeamMemberState, UserId,
};

use crate::catalogs::{CatalogError, CatalogService};
use crate::infrastructure::ports::{RandomPort, RepoError};
use crate::repositories::{ProgressRepository, RosterRepository};
use crate::use_cases::assemble::{AssembleError, AssembleOptions, CharacterAssembler, InstanceCounter};
use crate::use_cases::team::TeamResolver;

#[derive(Debug, thiserror::Error)]
pub enum StoryError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Assemble(#[from] AssembleError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("Stage {index} of story {story} is not a {expected} stage")]
    WrongStageKind {
        story: StoryId,
        index: usize,
        expected: &'static str,
    },
    #[error("Story {0} is already complete")]
    StoryComplete(StoryId),
    #[error("No choice at index {0} on the current stage")]
    InvalidChoice(usize),
    #[error("Character {0} is not on the team")]
    NotOnTeam(CharacterId),
    #[error("Character {0} is already on the team")]
    AlreadyOnTeam(CharacterId),
    #[error("Unknown character: {0}")]
    UnknownCharacter(CharacterId),
}

/// What the UI renders for the run's current position.
#[derive(Debug, Clone)]
pub enum CurrentStage {
    Battle { index: usize, stage: BattleStage },
    Choice { index: usize, stage: ChoiceStage },
    Recruit { index: usize, stage: RecruitStage },
    Complete,
}

/// A loaded story view: the run as it stands after reconciliation.
pub struct StoryView {
    pub story: Arc<StoryDefinition>,
    pub progress: ProgressRecord,
    pub team: Vec<Combatant>,
    pub current: CurrentStage,
}

/// Outcome of [`StoryOrchestrator::load_story`].
pub enum StoryLoad {
    View(StoryView),
    /// A defeat was reconciled: the run is over and its progress has already
    /// been deleted. The caller routes to fresh team selection.
    RunEnded,
}

/// Result of applying one choice effect.
#[derive(Debug, Clone)]
pub struct ChoiceApplied {
    pub character: CharacterId,
    pub state: TeamMemberState,
    pub progress: ProgressRecord,
}

enum Reconciled {
    Untouched,
    Advanced,
    RunEnded,
}

pub struct StoryOrchestrator {
    catalogs: Arc<CatalogService>,
    progress: Arc<ProgressRepository>,
    roster: Arc<RosterRepository>,
    assembler: Arc<CharacterAssembler>,
    teams: Arc<TeamResolver>,
    random: Arc<dyn RandomPort>,
}

impl StoryOrchestrator {
    pub fn new(
        catalogs: Arc<CatalogService>,
        progress: Arc<ProgressRepository>,
        roster: Arc<RosterRepository>,
        assembler: Arc<CharacterAssembler>,
        teams: Arc<TeamResolver>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            catalogs,
            progress,
            roster,
            assembler,
            teams,
            random,
        }
    }

    pub fn is_story_complete(story: &StoryDefinition, progress: &ProgressRecord) -> bool {
        progress.current_stage_index >= story.stages.len()
    }

    /// Load a story for one user: resolve the team, reconcile any pending
    /// battle result, and report the current stage.
    pub async fn load_story(
        &self,
        user: &UserId,
        story_id: &StoryId,
    ) -> Result<StoryLoad, StoryError> {
        let story = self.catalogs.story(story_id).await?;
        let mut progress = self.progress.fetch(user, story_id).await;

        let team_ids = self.resolve_team(user, &progress).await?;
        let mut team = self.assemble_team(user, &team_ids, &progress).await?;

        match self.reconcile(user, &story, &mut progress, &mut team).await? {
            Reconciled::RunEnded => return Ok(StoryLoad::RunEnded),
            Reconciled::Untouched | Reconciled::Advanced => {}
        }

        let current = Self::current_stage(&story, &progress);
        Ok(StoryLoad::View(StoryView {
            story,
            progress,
            team,
            current,
        }))
    }

    /// Apply one choice on the current (choice) stage, then advance and save
    /// in a single write.
    pub async fn apply_choice_effect(
        &self,
        user: &UserId,
        story_id: &StoryId,
        choice_index: usize,
        target: &CharacterId,
    ) -> Result<ChoiceApplied, StoryError> {
        let story = self.catalogs.story(story_id).await?;
        let mut progress = self.progress.fetch(user, story_id).await;
        let index = progress.current_stage_index;

        let stage = story
            .stages
            .get(index)
            .ok_or_else(|| StoryError::StoryComplete(story_id.clone()))?;
        let StageEntry::Choice(choice_stage) = stage else {
            return Err(StoryError::WrongStageKind {
                story: story_id.clone(),
                index,
                expected: "choice",
            });
        };
        let choice = choice_stage
            .choices
            .get(choice_index)
            .ok_or(StoryError::InvalidChoice(choice_index))?;

        let team_ids = self.resolve_team(user, &progress).await?;
        if !team_ids.contains(target) {
            return Err(StoryError::NotOnTeam(target.clone()));
        }
        let base = self.catalog_base(target).await?;
        self.ensure_member_states(&mut progress, &team_ids).await?;

        let member = progress
            .last_team_state
            .get_mut(target)
            .ok_or_else(|| StoryError::NotOnTeam(target.clone()))?;
        apply_effect(&choice.effect, &base, member, self.random.as_ref());
        let state = member.clone();
        tracing::debug!(%user, %story_id, %target, choice = %choice.name, "applied choice effect");

        progress.advance();
        self.progress.save(user, story_id, &progress).await?;
        Ok(ChoiceApplied {
            character: target.clone(),
            state,
            progress,
        })
    }

    /// Candidate recruits for the current (recruit) stage: catalog characters
    /// not on the team whose ID contains the stage's tag, shuffled, first
    /// `recruit_count` taken.
    pub async fn recruitment_offers(
        &self,
        user: &UserId,
        story_id: &StoryId,
    ) -> Result<Vec<CharacterId>, StoryError> {
        let (stage, progress) = self.current_recruit_stage(user, story_id).await?;
        let team_ids = self.resolve_team(user, &progress).await?;
        let registry = self.catalogs.character_registry().await?;

        let mut candidates: Vec<CharacterId> = registry
            .values()
            .filter(|data| !data.locked)
            .filter(|data| !team_ids.contains(&data.id))
            .filter(|data| data.id.as_str().contains(stage.recruit_tag.as_str()))
            .map(|data| data.id.clone())
            .collect();
        candidates.sort_unstable();
        self.random.shuffle_characters(&mut candidates);
        candidates.truncate(stage.recruit_count);
        Ok(candidates)
    }

    /// Add a recruit to the run: extend the account selection, rebuild the
    /// saved team state with the new member at full vitals, advance, save.
    pub async fn add_recruit(
        &self,
        user: &UserId,
        story_id: &StoryId,
        character_id: &CharacterId,
    ) -> Result<ProgressRecord, StoryError> {
        let (_, mut progress) = self.current_recruit_stage(user, story_id).await?;

        let data = self
            .catalogs
            .character(character_id)
            .await?
            .ok_or_else(|| StoryError::UnknownCharacter(character_id.clone()))?;

        let team_ids = self.resolve_team(user, &progress).await?;
        if team_ids.contains(character_id) {
            return Err(StoryError::AlreadyOnTeam(character_id.clone()));
        }

        self.ensure_member_states(&mut progress, &team_ids).await?;
        progress.last_team_state.insert(
            character_id.clone(),
            TeamMemberState {
                current_hp: data.stats.hp,
                current_mana: data.stats.mana,
                stats: Some(data.stats),
            },
        );

        let mut selection = self.roster.current_team(user).await;
        if !selection.contains(character_id) {
            selection.push(character_id.clone());
            self.roster.save_team(user, &selection).await?;
        }

        tracing::info!(%user, %story_id, recruit = %character_id, "recruited character");
        progress.advance();
        self.progress.save(user, story_id, &progress).await?;
        Ok(progress)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn current_stage(story: &StoryDefinition, progress: &ProgressRecord) -> CurrentStage {
        let index = progress.current_stage_index;
        match story.stages.get(index) {
            None => CurrentStage::Complete,
            Some(StageEntry::Battle(stage)) => CurrentStage::Battle {
                index,
                stage: stage.clone(),
            },
            Some(StageEntry::Choice(stage)) => CurrentStage::Choice {
                index,
                stage: stage.clone(),
            },
            Some(StageEntry::Recruit(stage)) => CurrentStage::Recruit {
                index,
                stage: stage.clone(),
            },
        }
    }

    async fn resolve_team(
        &self,
        user: &UserId,
        progress: &ProgressRecord,
    ) -> Result<Vec<CharacterId>, StoryError> {
        Ok(self
            .teams
            .resolve(user, Some(&progress.last_team_state))
            .await?)
    }

    async fn assemble_team(
        &self,
        user: &UserId,
        team_ids: &[CharacterId],
        progress: &ProgressRecord,
    ) -> Result<Vec<Combatant>, StoryError> {
        let mut counter = InstanceCounter::new();
        let mut team = Vec::with_capacity(team_ids.len());
        for character_id in team_ids {
            let talent_ids = self.roster.selected_talents(user, character_id).await;
            let options = AssembleOptions {
                is_ai: false,
                talent_ids: &talent_ids,
                saved_override: progress.last_team_state.get(character_id),
                ..Default::default()
            };
            match self
                .assembler
                .assemble(character_id, options, &mut counter)
                .await
            {
                Ok(combatant) => team.push(combatant),
                Err(AssembleError::UnknownCharacter(id)) => {
                    tracing::warn!(character = %id, "dropping unknown team member");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(team)
    }

    /// Consume and reconcile a pending battle result.
    ///
    /// A result is accepted only on an exact (story, stage index) match
    /// against the run's current pointer; anything else is a stale or
    /// duplicate delivery and is discarded. That exact-match check is what
    /// makes duplicate delivery safe.
    async fn reconcile(
        &self,
        user: &UserId,
        story: &StoryDefinition,
        progress: &mut ProgressRecord,
        team: &mut [Combatant],
    ) -> Result<Reconciled, StoryError> {
        let result = match self.progress.consume_battle_result(user).await {
            Ok(Some(result)) => result,
            Ok(None) => return Ok(Reconciled::Untouched),
            Err(e) => {
                tracing::warn!(%user, error = %e, "battle result read failed, skipping reconciliation");
                return Ok(Reconciled::Untouched);
            }
        };

        if result.story_id != story.id || result.stage_index != progress.current_stage_index {
            tracing::warn!(
                %user,
                result_story = %result.story_id,
                result_stage = result.stage_index,
                current_stage = progress.current_stage_index,
                "discarding mismatched battle result"
            );
            return Ok(Reconciled::Untouched);
        }

        if !result.victory {
            // The run is over. Delete, never reset: a lost run cannot resume.
            self.progress.delete(user, &story.id).await?;
            tracing::info!(%user, story = %story.id, "defeat reconciled, run wiped");
            return Ok(Reconciled::RunEnded);
        }

        for combatant in team.iter_mut() {
            match result
                .final_team_state
                .iter()
                .find(|state| state.id == combatant.character_id)
            {
                Some(state) => {
                    combatant.current_hp = state.current_hp;
                    combatant.current_mana = state.current_mana;
                    combatant.clamp_vitals();
                }
                // Absent from the final state means the character died.
                None => combatant.current_hp = 0.0,
            }
        }

        progress.last_team_state = team
            .iter()
            .map(|combatant| {
                (
                    combatant.character_id.clone(),
                    TeamMemberState {
                        current_hp: combatant.current_hp,
                        current_mana: combatant.current_mana,
                        // Current stats are persisted so permanent growth
                        // survives the next assembly.
                        stats: Some(combatant.stats.current),
                    },
                )
            })
            .collect();
        progress.advance();
        self.progress.save(user, &story.id, progress).await?;
        tracing::info!(%user, story = %story.id, stage = progress.current_stage_index, "victory reconciled");
        Ok(Reconciled::Advanced)
    }

    async fn current_recruit_stage(
        &self,
        user: &UserId,
        story_id: &StoryId,
    ) -> Result<(RecruitStage, ProgressRecord), StoryError> {
        let story = self.catalogs.story(story_id).await?;
        let progress = self.progress.fetch(user, story_id).await;
        let index = progress.current_stage_index;
        let stage = story
            .stages
            .get(index)
            .ok_or_else(|| StoryError::StoryComplete(story_id.clone()))?;
        match stage {
            StageEntry::Recruit(recruit) => Ok((recruit.clone(), progress)),
            _ => Err(StoryError::WrongStageKind {
                story: story_id.clone(),
                index,
                expected: "recruit",
            }),
        }
    }

    async fn catalog_base(&self, character_id: &CharacterId) -> Result<StatBlock, StoryError> {
        Ok(self
            .catalogs
            .character(character_id)
            .await?
            .ok_or_else(|| StoryError::UnknownCharacter(character_id.clone()))?
            .stats)
    }

    /// Make sure every team member has a saved state entry, creating missing
    /// ones at full vitals from catalog base stats. Needed when a choice or
    /// recruit stage runs before the first battle has persisted anything.
    async fn ensure_member_states(
        &self,
        progress: &mut ProgressRecord,
        team_ids: &[CharacterId],
    ) -> Result<(), StoryError> {
        for character_id in team_ids {
            if progress.last_team_state.contains_key(character_id) {
                continue;
            }
            let base = self.catalog_base(character_id).await?;
            progress.last_team_state.insert(
                character_id.clone(),
                TeamMemberState {
                    current_hp: base.hp,
                    current_mana: base.mana,
                    stats: Some(base),
                },
            );
        }
        Ok(())
    }
}

/// Apply one choice effect to a member's saved state.
///
/// Percent boosts are computed from the *catalog base* block, never the
/// current run-modified stats, so repeated boosts stay linear instead of
/// compounding.
fn apply_effect(
    effect: &ChoiceEffect,
    base: &StatBlock,
    member: &mut TeamMemberState,
    random: &dyn RandomPort,
) {
    let stats = member.stats.get_or_insert(*base);
    match effect {
        ChoiceEffect::Heal {
            amount,
            amount_percent,
        } => {
            let healed = amount.unwrap_or(0.0)
                + amount_percent.map_or(0.0, |percent| stats.hp * percent / 100.0);
            member.current_hp += healed;
        }
        ChoiceEffect::StatBoost { stat, amount } => {
            stats.set(*stat, stats.get(*stat) + amount);
        }
        ChoiceEffect::StatBoostPercent {
            stat,
            amount_percent,
        } => {
            stats.set(
                *stat,
                stats.get(*stat) + base.get(*stat) * amount_percent / 100.0,
            );
        }
        ChoiceEffect::Revive => {
            if member.current_hp <= 0.0 {
                member.current_hp = stats.hp / 2.0;
            }
        }
        ChoiceEffect::RiskyMedicine => {
            if random.coin_flip() {
                stats.hp *= 2.0;
                member.current_hp = stats.hp;
            } else {
                member.current_hp = 0.0;
            }
        }
    }
    let stats = member.stats.unwrap_or(*base);
    member.current_hp = member.current_hp.clamp(0.0, stats.hp);
    member.current_mana = member.current_mana.clamp(0.0, stats.mana);
}
