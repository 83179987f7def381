//! Run progression engine: content catalogs, character assembly, stage
//! loading, and the story orchestrator, over pluggable persistence and
//! content ports.

pub mod app;
pub mod catalogs;
pub mod infrastructure;
pub mod repositories;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod test_fixtures;
