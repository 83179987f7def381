//! Ports for external collaborators: catalog content sources, the talent
//! subsystem, and passive-ability initialization hooks.

use async_trait::async_trait;
use emberrun_domain::{Combatant, TalentId};

use super::error::ContentError;

/// Raw catalog access. One logical fetch per document path; the catalog
/// service owns parsing and caching on top of this.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentPort: Send + Sync {
    async fn fetch_json(&self, path: &str) -> Result<serde_json::Value, ContentError>;
}

/// The external talent subsystem. Applying talents mutates derived stats and
/// ability parameters in place; it is pure computation, so the port is
/// synchronous.
#[cfg_attr(test, mockall::automock)]
pub trait TalentPort: Send + Sync {
    fn apply_talents(&self, combatant: &mut Combatant, talents: &[TalentId]);
}

/// Passive-ability initialization, invoked strictly after all stat merging so
/// passives that read "starting" stats see final values.
#[cfg_attr(test, mockall::automock)]
pub trait PassivePort: Send + Sync {
    fn initialize(&self, combatant: &mut Combatant);
}

/// No-op talent subsystem for embeddings that do not ship talents.
pub struct NoTalents;

impl TalentPort for NoTalents {
    fn apply_talents(&self, _combatant: &mut Combatant, _talents: &[TalentId]) {}
}

/// No-op passive hook.
pub struct NoPassives;

impl PassivePort for NoPassives {
    fn initialize(&self, _combatant: &mut Combatant) {}
}
