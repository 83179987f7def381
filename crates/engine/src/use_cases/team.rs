//! Team resolution, shared by the stage loader and the story orchestrator.

use std::collections::BTreeMap;
use std::sync::Arc;

use emberrun_domain::{CharacterId, TeamMemberState, UserId};

use crate::catalogs::{CatalogError, CatalogService};
use crate::repositories::RosterRepository;

/// Resolves the effective team-character-ID list for one user.
pub struct TeamResolver {
    catalogs: Arc<CatalogService>,
    roster: Arc<RosterRepository>,
    fallback_character: CharacterId,
}

impl TeamResolver {
    pub fn new(
        catalogs: Arc<CatalogService>,
        roster: Arc<RosterRepository>,
        fallback_character: CharacterId,
    ) -> Self {
        Self {
            catalogs,
            roster,
            fallback_character,
        }
    }

    /// The saved team state keys are the authoritative roster for an
    /// in-progress run (they can include mid-run recruits); otherwise the
    /// account's team selection applies. Locked and unknown characters are
    /// filtered, and an emptied team is substituted with the guaranteed
    /// fallback.
    pub async fn resolve(
        &self,
        user: &UserId,
        saved: Option<&BTreeMap<CharacterId, TeamMemberState>>,
    ) -> Result<Vec<CharacterId>, CatalogError> {
        let mut team_ids: Vec<CharacterId> = match saved {
            Some(state) if !state.is_empty() => state.keys().cloned().collect(),
            _ => self.roster.current_team(user).await,
        };

        let registry = self.catalogs.character_registry().await?;
        team_ids.retain(|id| registry.get(id).map(|data| !data.locked).unwrap_or(false));

        if team_ids.is_empty() {
            tracing::warn!(%user, fallback = %self.fallback_character, "team emptied by lock filtering, substituting fallback");
            team_ids.push(self.fallback_character.clone());
        }
        Ok(team_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::MemoryBackend;
    use crate::test_fixtures;

    fn resolver(backend: Arc<MemoryBackend>) -> TeamResolver {
        let roster = Arc::new(RosterRepository::new(backend.clone(), backend));
        TeamResolver::new(
            test_fixtures::fixture_catalogs(),
            roster,
            "novice_recruit".into(),
        )
    }

    fn member(hp: f64) -> TeamMemberState {
        TeamMemberState {
            current_hp: hp,
            current_mana: 10.0,
            stats: None,
        }
    }

    #[tokio::test]
    async fn saved_state_keys_win_over_the_account_selection() {
        let backend = Arc::new(MemoryBackend::new());
        backend.seed_team_selection(&"u1".into(), vec!["witch".into()]);
        let mut saved = BTreeMap::new();
        saved.insert(CharacterId::from("knight"), member(300.0));

        let team = resolver(backend)
            .resolve(&"u1".into(), Some(&saved))
            .await
            .expect("resolve");
        assert_eq!(team, vec![CharacterId::from("knight")]);
    }

    #[tokio::test]
    async fn locked_and_unknown_characters_are_filtered() {
        let backend = Arc::new(MemoryBackend::new());
        backend.seed_team_selection(
            &"u1".into(),
            vec!["a_locked".into(), "knight".into(), "nobody".into()],
        );

        let team = resolver(backend)
            .resolve(&"u1".into(), None)
            .await
            .expect("resolve");
        assert_eq!(team, vec![CharacterId::from("knight")]);
    }

    #[tokio::test]
    async fn emptied_team_substitutes_the_fallback() {
        let backend = Arc::new(MemoryBackend::new());
        backend.seed_team_selection(&"u1".into(), vec!["a_locked".into(), "b_locked".into()]);

        let team = resolver(backend)
            .resolve(&"u1".into(), None)
            .await
            .expect("resolve");
        assert_eq!(team, vec![CharacterId::from("novice_recruit")]);
    }
}
