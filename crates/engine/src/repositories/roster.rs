//! Account roster data: team selection and per-character talent choices.

use std::sync::Arc;

use emberrun_domain::{CharacterId, TalentId, UserId};

use crate::infrastructure::ports::{RepoError, TalentRepo, TeamSelectionRepo};

pub struct RosterRepository {
    team: Arc<dyn TeamSelectionRepo>,
    talents: Arc<dyn TalentRepo>,
}

impl RosterRepository {
    pub fn new(team: Arc<dyn TeamSelectionRepo>, talents: Arc<dyn TalentRepo>) -> Self {
        Self { team, talents }
    }

    /// The account's general team selection. Read failures degrade to an
    /// empty list; the orchestrator's fallback substitution handles that the
    /// same way it handles an all-locked team.
    pub async fn current_team(&self, user: &UserId) -> Vec<CharacterId> {
        match self.team.get(user).await {
            Ok(team) => team,
            Err(e) => {
                tracing::warn!(%user, error = %e, "team selection read failed");
                Vec::new()
            }
        }
    }

    pub async fn save_team(&self, user: &UserId, team: &[CharacterId]) -> Result<(), RepoError> {
        self.team.save(user, team).await
    }

    /// Selected talent IDs for one character. Missing selections are an
    /// empty list, never an error.
    pub async fn selected_talents(&self, user: &UserId, character: &CharacterId) -> Vec<TalentId> {
        match self.talents.selected_talents(user, character).await {
            Ok(talents) => talents,
            Err(e) => {
                tracing::warn!(%user, %character, error = %e, "talent read failed");
                Vec::new()
            }
        }
    }
}
