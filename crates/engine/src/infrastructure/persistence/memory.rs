//! In-memory persistence backend.
//!
//! Backs all four repository ports with concurrent maps. This is the default
//! embedded backend and the one the test suites run against. `take` on the
//! battle result slot is a single `DashMap::remove`, so consume-and-delete is
//! atomic here; a remote adapter without an atomic remove inherits the
//! read/delete window and must document it.

use async_trait::async_trait;
use dashmap::DashMap;
use emberrun_domain::{BattleResultRecord, CharacterId, StoryId, StoredProgress, TalentId, UserId};

use crate::infrastructure::ports::{
    BattleResultRepo, ProgressRepo, RepoError, TalentRepo, TeamSelectionRepo,
};

#[derive(Default)]
pub struct MemoryBackend {
    progress: DashMap<(UserId, StoryId), StoredProgress>,
    battle_results: DashMap<UserId, BattleResultRecord>,
    team_selection: DashMap<UserId, Vec<CharacterId>>,
    talents: DashMap<(UserId, CharacterId), Vec<TalentId>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the account team selection, for embedding setups and tests.
    pub fn seed_team_selection(&self, user: &UserId, team: Vec<CharacterId>) {
        self.team_selection.insert(user.clone(), team);
    }

    /// Seed per-character talent selections.
    pub fn seed_talents(&self, user: &UserId, character: &CharacterId, talents: Vec<TalentId>) {
        self.talents
            .insert((user.clone(), character.clone()), talents);
    }
}

#[async_trait]
impl ProgressRepo for MemoryBackend {
    async fn get(
        &self,
        user: &UserId,
        story: &StoryId,
    ) -> Result<Option<StoredProgress>, RepoError> {
        Ok(self
            .progress
            .get(&(user.clone(), story.clone()))
            .map(|entry| entry.value().clone()))
    }

    async fn save(
        &self,
        user: &UserId,
        story: &StoryId,
        record: &StoredProgress,
    ) -> Result<(), RepoError> {
        self.progress
            .insert((user.clone(), story.clone()), record.clone());
        Ok(())
    }

    async fn delete(&self, user: &UserId, story: &StoryId) -> Result<(), RepoError> {
        self.progress.remove(&(user.clone(), story.clone()));
        Ok(())
    }
}

#[async_trait]
impl BattleResultRepo for MemoryBackend {
    async fn take(&self, user: &UserId) -> Result<Option<BattleResultRecord>, RepoError> {
        Ok(self.battle_results.remove(user).map(|(_, record)| record))
    }

    async fn put(&self, user: &UserId, record: &BattleResultRecord) -> Result<(), RepoError> {
        self.battle_results.insert(user.clone(), record.clone());
        Ok(())
    }
}

#[async_trait]
impl TeamSelectionRepo for MemoryBackend {
    async fn get(&self, user: &UserId) -> Result<Vec<CharacterId>, RepoError> {
        Ok(self
            .team_selection
            .get(user)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    async fn save(&self, user: &UserId, team: &[CharacterId]) -> Result<(), RepoError> {
        self.team_selection.insert(user.clone(), team.to_vec());
        Ok(())
    }
}

#[async_trait]
impl TalentRepo for MemoryBackend {
    async fn selected_talents(
        &self,
        user: &UserId,
        character: &CharacterId,
    ) -> Result<Vec<TalentId>, RepoError> {
        Ok(self
            .talents
            .get(&(user.clone(), character.clone()))
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }
}
