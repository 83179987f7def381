//! Repository wrappers over the persistence ports.

mod progress;
mod roster;

pub use progress::ProgressRepository;
pub use roster::RosterRepository;
