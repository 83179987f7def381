//! The run progress store.
//!
//! Wraps the raw persistence ports with the policies the rest of the engine
//! relies on: wire-shape normalization, read-failure degradation, and the
//! single-slot battle result consume.

use std::sync::Arc;

use emberrun_domain::{BattleResultRecord, ProgressRecord, StoredProgress, StoryId, UserId};

use crate::infrastructure::ports::{BattleResultRepo, ClockPort, ProgressRepo, RepoError};

pub struct ProgressRepository {
    progress: Arc<dyn ProgressRepo>,
    results: Arc<dyn BattleResultRepo>,
    clock: Arc<dyn ClockPort>,
}

impl ProgressRepository {
    pub fn new(
        progress: Arc<dyn ProgressRepo>,
        results: Arc<dyn BattleResultRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            progress,
            results,
            clock,
        }
    }

    /// Fetch the progress record for a (user, story) pair.
    ///
    /// Never fails: absence and backend read errors both degrade to the
    /// zero-valued fresh record, so an unreachable backend means "fresh run"
    /// rather than a blocked UI. The stored team state is normalized to the
    /// map form here, at the boundary, regardless of which legacy shape the
    /// backend returned.
    pub async fn fetch(&self, user: &UserId, story: &StoryId) -> ProgressRecord {
        match self.progress.get(user, story).await {
            Ok(Some(stored)) => stored.normalize(),
            Ok(None) => ProgressRecord::fresh(),
            Err(e) => {
                tracing::warn!(%user, %story, error = %e, "progress read failed, treating as fresh run");
                ProgressRecord::fresh()
            }
        }
    }

    /// Full overwrite of the stored record. Write failures propagate: a run
    /// that fails to persist must not silently appear to have advanced.
    pub async fn save(
        &self,
        user: &UserId,
        story: &StoryId,
        record: &ProgressRecord,
    ) -> Result<(), RepoError> {
        let stored = StoredProgress::from_record(record, self.clock.now());
        self.progress.save(user, story, &stored).await?;
        tracing::debug!(%user, %story, stage = record.current_stage_index, "saved run progress");
        Ok(())
    }

    /// Wipe the run. Used exclusively on confirmed defeat.
    pub async fn delete(&self, user: &UserId, story: &StoryId) -> Result<(), RepoError> {
        self.progress.delete(user, story).await?;
        tracing::debug!(%user, %story, "deleted run progress");
        Ok(())
    }

    /// Consume the pending battle result, if any. Read-and-delete is one
    /// logical step on the port.
    pub async fn consume_battle_result(
        &self,
        user: &UserId,
    ) -> Result<Option<BattleResultRecord>, RepoError> {
        self.results.take(user).await
    }
}
