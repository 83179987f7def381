//! Port traits for infrastructure boundaries.
//!
//! These are the only abstractions in the engine. Everything else is concrete
//! types. Ports exist for:
//! - Persistence backend access (could swap the in-memory backend for a
//!   remote document store)
//! - Catalog content sources (local files vs. HTTP)
//! - External collaborators (talent subsystem, passive hooks)
//! - Clock/Random (for testing)

mod error;
mod external;
mod repos;
mod testing;

pub use error::{ContentError, RepoError};
pub use external::{ContentPort, NoPassives, NoTalents, PassivePort, TalentPort};
pub use repos::{BattleResultRepo, ProgressRepo, TalentRepo, TeamSelectionRepo};
pub use testing::{ClockPort, RandomPort};

#[cfg(test)]
pub use external::{MockContentPort, MockPassivePort, MockTalentPort};
#[cfg(test)]
pub use repos::{MockBattleResultRepo, MockProgressRepo, MockTalentRepo, MockTeamSelectionRepo};
#[cfg(test)]
pub use testing::{MockClockPort, MockRandomPort};
