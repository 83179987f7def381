use std::fmt;

use serde::{Deserialize, Serialize};

/// Catalog and account identifiers are semantic strings (`schoolboy_siegfried`,
/// `ashen_road`), not UUIDs: they are authored in catalog JSON and must survive
/// round-trips through persistence unchanged.
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

// Catalog entity IDs
define_id!(CharacterId);
define_id!(StageId);
define_id!(StoryId);
define_id!(TalentId);

// Account IDs
define_id!(UserId);

impl CharacterId {
    /// Convert a display name into a catalog ID (`"Iron Warden"` ->
    /// `iron_warden`). Used for the `boss` shorthand in story catalogs.
    pub fn from_display_name(name: &str) -> Self {
        Self(name.trim().to_lowercase().replace(' ', "_"))
    }
}

/// Process-unique identifier for one materialized combatant.
///
/// Distinct from [`CharacterId`] because the same catalog character can appear
/// twice in one encounter (two AI copies, for example).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    pub fn compose(character: &CharacterId, role: InstanceRole, counter: u32) -> Self {
        Self(format!("{}-{}-{}", character.as_str(), role, counter))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Distinguishes AI instances from player instances in an [`InstanceId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceRole {
    Ai,
    Player,
}

impl fmt::Display for InstanceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ai => write!(f, "ai"),
            Self::Player => write!(f, "pc"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn character_id_from_display_name_lowercases_and_underscores() {
        let id = CharacterId::from_display_name("Iron Warden");
        assert_eq!(id.as_str(), "iron_warden");
    }

    #[test]
    fn instance_id_distinguishes_roles_and_counters() {
        let character = CharacterId::from("ghoul");
        let a = InstanceId::compose(&character, InstanceRole::Ai, 0);
        let b = InstanceId::compose(&character, InstanceRole::Ai, 1);
        let c = InstanceId::compose(&character, InstanceRole::Player, 0);
        assert_eq!(a.as_str(), "ghoul-ai-0");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
