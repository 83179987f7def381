//! Repository port traits for the persistence backend.
//!
//! Logical backend paths, one port per path:
//! - `story-progress[user][story]` -> [`ProgressRepo`]
//! - `last-battle-result[user]`    -> [`BattleResultRepo`]
//! - `team-selection[user]`        -> [`TeamSelectionRepo`]
//! - `character-talents[user][character]` -> [`TalentRepo`]

use async_trait::async_trait;
use emberrun_domain::{BattleResultRecord, CharacterId, StoryId, StoredProgress, TalentId, UserId};

use super::error::RepoError;

/// Durable per-(user, story) progress records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressRepo: Send + Sync {
    async fn get(&self, user: &UserId, story: &StoryId)
        -> Result<Option<StoredProgress>, RepoError>;
    /// Full-record overwrite; last writer wins.
    async fn save(
        &self,
        user: &UserId,
        story: &StoryId,
        record: &StoredProgress,
    ) -> Result<(), RepoError>;
    async fn delete(&self, user: &UserId, story: &StoryId) -> Result<(), RepoError>;
}

/// The single-slot battle result mailbox.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BattleResultRepo: Send + Sync {
    /// Consume-and-delete in one logical step. Adapters whose backend offers
    /// an atomic remove (the in-memory backend does) close the read/delete
    /// window; adapters over backends without one inherit it and must say so.
    async fn take(&self, user: &UserId) -> Result<Option<BattleResultRecord>, RepoError>;

    /// Written by the battle subsystem when an encounter ends. A second write
    /// before consumption overwrites the first.
    async fn put(&self, user: &UserId, record: &BattleResultRecord) -> Result<(), RepoError>;
}

/// The account's general team selection list.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TeamSelectionRepo: Send + Sync {
    async fn get(&self, user: &UserId) -> Result<Vec<CharacterId>, RepoError>;
    async fn save(&self, user: &UserId, team: &[CharacterId]) -> Result<(), RepoError>;
}

/// Per-character talent selections.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TalentRepo: Send + Sync {
    async fn selected_talents(
        &self,
        user: &UserId,
        character: &CharacterId,
    ) -> Result<Vec<TalentId>, RepoError>;
}
