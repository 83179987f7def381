//! Engine settings.
//!
//! Settings are an infrastructure concern; they carry serde derives because
//! embeddings store and transmit them across process boundaries.

use emberrun_domain::CharacterId;
use serde::{Deserialize, Serialize};

/// Where catalog documents live.
pub const STAGE_REGISTRY_PATH: &str = "stages.json";
pub const STORY_CATALOG_PATH: &str = "stories.json";
pub const CHARACTER_REGISTRY_PATH: &str = "characters.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSettings {
    /// Base path or URL of the catalog content source.
    pub content_base: String,
    /// Substituted when locked-character filtering empties a team. Must name
    /// a character that is always available.
    pub fallback_character: CharacterId,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            content_base: "content".to_string(),
            fallback_character: CharacterId::from("novice_recruit"),
        }
    }
}

impl EngineSettings {
    /// Environment overrides, same convention as the rest of the stack:
    /// `EMBERRUN_CONTENT_BASE`, `EMBERRUN_FALLBACK_CHARACTER`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            content_base: std::env::var("EMBERRUN_CONTENT_BASE")
                .unwrap_or(defaults.content_base),
            fallback_character: std::env::var("EMBERRUN_FALLBACK_CHARACTER")
                .map(CharacterId::from)
                .unwrap_or(defaults.fallback_character),
        }
    }
}
