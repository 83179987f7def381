//! Static catalog loading and caching.
//!
//! The three catalogs (stage registry, story definitions, character registry)
//! are fetched at most once per process lifetime and cached. A failed fetch
//! or parse is NOT cached: it surfaces a [`CatalogError`] and the next call
//! retries, because retry policy belongs to the caller.
//!
//! Catalogs are explicitly constructed and injected (no module-level state);
//! the permissive story JSON is resolved into the tagged [`StageEntry`] union
//! here, at load time.

use std::collections::HashMap;
use std::sync::Arc;

use emberrun_domain::{
    CharacterData, CharacterId, StageFile, StageId, StageRegistryDoc, StageRegistryEntry,
    StoryDefinition, StoryId,
};
use tokio::sync::OnceCell;

use crate::infrastructure::app_settings::{
    CHARACTER_REGISTRY_PATH, STAGE_REGISTRY_PATH, STORY_CATALOG_PATH,
};
use crate::infrastructure::ports::{ContentError, ContentPort};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("Malformed {what} catalog: {detail}")]
    Malformed { what: &'static str, detail: String },
    #[error("Unknown story: {0}")]
    UnknownStory(StoryId),
    #[error("Unknown stage: {0}")]
    UnknownStage(StageId),
}

/// The document wrapper of the character registry catalog.
#[derive(Debug, Clone, serde::Deserialize)]
struct CharacterRegistryDoc {
    characters: Vec<CharacterData>,
}

pub struct CatalogService {
    content: Arc<dyn ContentPort>,
    stage_registry: OnceCell<Arc<HashMap<StageId, StageRegistryEntry>>>,
    stories: OnceCell<Arc<Vec<Arc<StoryDefinition>>>>,
    characters: OnceCell<Arc<HashMap<CharacterId, CharacterData>>>,
}

impl CatalogService {
    pub fn new(content: Arc<dyn ContentPort>) -> Self {
        Self {
            content,
            stage_registry: OnceCell::new(),
            stories: OnceCell::new(),
            characters: OnceCell::new(),
        }
    }

    /// Eagerly prime all three catalogs.
    pub async fn load(&self) -> Result<(), CatalogError> {
        self.stage_registry().await?;
        self.stories().await?;
        self.character_registry().await?;
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.stage_registry.get().is_some()
            && self.stories.get().is_some()
            && self.characters.get().is_some()
    }

    pub async fn stage_registry(
        &self,
    ) -> Result<Arc<HashMap<StageId, StageRegistryEntry>>, CatalogError> {
        self.stage_registry
            .get_or_try_init(|| async {
                let value = self.content.fetch_json(STAGE_REGISTRY_PATH).await?;
                let doc: StageRegistryDoc =
                    serde_json::from_value(value).map_err(|e| CatalogError::Malformed {
                        what: "stage registry",
                        detail: e.to_string(),
                    })?;
                let map: HashMap<_, _> = doc
                    .stages
                    .into_iter()
                    .map(|entry| (entry.id.clone(), entry))
                    .collect();
                tracing::info!(stages = map.len(), "loaded stage registry");
                Ok(Arc::new(map))
            })
            .await
            .cloned()
    }

    pub async fn registry_entry(&self, id: &StageId) -> Result<StageRegistryEntry, CatalogError> {
        self.stage_registry()
            .await?
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownStage(id.clone()))
    }

    pub async fn stories(&self) -> Result<Arc<Vec<Arc<StoryDefinition>>>, CatalogError> {
        self.stories
            .get_or_try_init(|| async {
                let value = self.content.fetch_json(STORY_CATALOG_PATH).await?;
                let stories: Vec<StoryDefinition> =
                    serde_json::from_value(value).map_err(|e| CatalogError::Malformed {
                        what: "story",
                        detail: e.to_string(),
                    })?;
                tracing::info!(stories = stories.len(), "loaded story catalog");
                Ok(Arc::new(stories.into_iter().map(Arc::new).collect()))
            })
            .await
            .cloned()
    }

    pub async fn story(&self, id: &StoryId) -> Result<Arc<StoryDefinition>, CatalogError> {
        self.stories()
            .await?
            .iter()
            .find(|story| &story.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownStory(id.clone()))
    }

    pub async fn character_registry(
        &self,
    ) -> Result<Arc<HashMap<CharacterId, CharacterData>>, CatalogError> {
        self.characters
            .get_or_try_init(|| async {
                let value = self.content.fetch_json(CHARACTER_REGISTRY_PATH).await?;
                let doc: CharacterRegistryDoc =
                    serde_json::from_value(value).map_err(|e| CatalogError::Malformed {
                        what: "character registry",
                        detail: e.to_string(),
                    })?;
                let map: HashMap<_, _> = doc
                    .characters
                    .into_iter()
                    .map(|data| (data.id.clone(), data))
                    .collect();
                tracing::info!(characters = map.len(), "loaded character registry");
                Ok(Arc::new(map))
            })
            .await
            .cloned()
    }

    pub async fn character(&self, id: &CharacterId) -> Result<Option<CharacterData>, CatalogError> {
        Ok(self.character_registry().await?.get(id).cloned())
    }

    /// Stage files are referenced by registry entries and fetched per load;
    /// only the three top-level catalogs are cached.
    pub async fn fetch_stage_file(&self, path: &str) -> Result<StageFile, CatalogError> {
        let value = self.content.fetch_json(path).await?;
        serde_json::from_value(value).map_err(|e| CatalogError::Malformed {
            what: "stage file",
            detail: e.to_string(),
        })
    }
}
