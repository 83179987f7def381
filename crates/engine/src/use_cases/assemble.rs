//! Character assembly: catalog data + talents + stage modifications + saved
//! run state, merged into one materialized combatant.

use std::sync::Arc;

use emberrun_domain::{
    CharacterId, Combatant, StageModifications, StatKind, TalentId, TeamMemberState,
};

use crate::catalogs::{CatalogError, CatalogService};
use crate::infrastructure::ports::TalentPort;

#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    /// Non-fatal for a roster: the caller drops the entry and continues.
    #[error("Unknown character: {0}")]
    UnknownCharacter(CharacterId),
    /// Fatal for the whole stage load: a broken stat object would corrupt
    /// damage math silently.
    #[error("Assembled stats are structurally invalid for {0}")]
    InvalidStats(CharacterId),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Per-roster-build instance counters, one sequence per role. Guarantees
/// unique instance IDs across duplicate catalog characters in one encounter.
#[derive(Debug, Default)]
pub struct InstanceCounter {
    ai: u32,
    player: u32,
}

impl InstanceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self, is_ai: bool) -> u32 {
        let slot = if is_ai { &mut self.ai } else { &mut self.player };
        let value = *slot;
        *slot += 1;
        value
    }
}

/// Inputs for one assembly, beyond the character itself.
#[derive(Default)]
pub struct AssembleOptions<'a> {
    pub is_ai: bool,
    pub talent_ids: &'a [TalentId],
    pub stage_modifications: Option<&'a StageModifications>,
    /// Player-roster path only; the final authority over stats and vitals.
    pub saved_override: Option<&'a TeamMemberState>,
}

pub struct CharacterAssembler {
    catalogs: Arc<CatalogService>,
    talents: Arc<dyn TalentPort>,
}

impl CharacterAssembler {
    pub fn new(catalogs: Arc<CatalogService>, talents: Arc<dyn TalentPort>) -> Self {
        Self { catalogs, talents }
    }

    /// Materialize one combatant. The pipeline order is a contract:
    /// catalog base, talents, stage modifications, saved stat override, then
    /// vitals clamped against the just-computed maxima.
    pub async fn assemble(
        &self,
        character_id: &CharacterId,
        options: AssembleOptions<'_>,
        counter: &mut InstanceCounter,
    ) -> Result<Combatant, AssembleError> {
        let data = self
            .catalogs
            .character(character_id)
            .await?
            .ok_or_else(|| AssembleError::UnknownCharacter(character_id.clone()))?;

        let mut combatant =
            Combatant::from_catalog(&data, options.is_ai, counter.next(options.is_ai));

        if !options.talent_ids.is_empty() {
            self.talents
                .apply_talents(&mut combatant, options.talent_ids);
        }

        if let Some(mods) = options.stage_modifications {
            Self::apply_stage_modifications(&mut combatant, mods);
        }

        if let Some(saved) = options.saved_override {
            if let Some(stats) = saved.stats {
                // Saved run growth wins over talents and stage modifications.
                for kind in StatKind::ALL {
                    combatant.stats.set_permanent(kind, stats.get(kind));
                }
            }
        }

        if !combatant.stats.is_valid() {
            return Err(AssembleError::InvalidStats(character_id.clone()));
        }

        match options.saved_override {
            Some(saved) => {
                combatant.current_hp = saved.current_hp;
                combatant.current_mana = saved.current_mana;
                combatant.clamp_vitals();
            }
            None => combatant.restore_full(),
        }

        Ok(combatant)
    }

    /// Multipliers apply to the current (post-talent) value and are written
    /// into both the live stat and its base shadow, so a later
    /// recalculation pass keeps them. The same rule holds for AI and player
    /// instances.
    fn apply_stage_modifications(combatant: &mut Combatant, mods: &StageModifications) {
        if let Some(multiplier) = mods.hp_multiplier {
            combatant.stats.scale_permanent(StatKind::Hp, multiplier);
        }
        if let Some(multiplier) = mods.speed_multiplier {
            combatant.stats.scale_permanent(StatKind::Speed, multiplier);
        }
        if let Some(multiplier) = mods.damage_multiplier {
            for ability in &mut combatant.abilities {
                ability.scale_damage(multiplier);
            }
        }
    }
}
