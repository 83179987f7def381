//! Application state and composition.

use std::sync::Arc;

use crate::catalogs::CatalogService;
use crate::infrastructure::persistence::MemoryBackend;
use crate::infrastructure::ports::{
    BattleResultRepo, ContentPort, PassivePort, ProgressRepo, RandomPort, TalentPort, TalentRepo,
    TeamSelectionRepo,
};
use crate::infrastructure::{EngineSettings, SystemClock, SystemRandom};
use crate::repositories::{ProgressRepository, RosterRepository};
use crate::use_cases::{
    CharacterAssembler, StageLoader, StageOverrideCache, StoryOrchestrator, TeamResolver,
};

/// Persistence ports injected into the app, one per logical backend path.
pub struct PersistencePorts {
    pub progress: Arc<dyn ProgressRepo>,
    pub results: Arc<dyn BattleResultRepo>,
    pub team: Arc<dyn TeamSelectionRepo>,
    pub talents: Arc<dyn TalentRepo>,
}

impl PersistencePorts {
    /// All four paths on one in-memory backend.
    pub fn in_memory() -> Self {
        let backend = Arc::new(MemoryBackend::new());
        Self {
            progress: backend.clone(),
            results: backend.clone(),
            team: backend.clone(),
            talents: backend,
        }
    }
}

/// Main application state: catalogs, stores, and use cases, fully wired.
pub struct App {
    pub settings: EngineSettings,
    pub catalogs: Arc<CatalogService>,
    pub progress: Arc<ProgressRepository>,
    pub roster: Arc<RosterRepository>,
    pub assembler: Arc<CharacterAssembler>,
    pub teams: Arc<TeamResolver>,
    pub overrides: Arc<StageOverrideCache>,
    pub stage_loader: Arc<StageLoader>,
    pub orchestrator: Arc<StoryOrchestrator>,
}

impl App {
    /// Wire up the engine over the given content source, persistence ports,
    /// and gameplay hooks.
    pub fn new(
        settings: EngineSettings,
        content: Arc<dyn ContentPort>,
        persistence: PersistencePorts,
        talents: Arc<dyn TalentPort>,
        passives: Arc<dyn PassivePort>,
    ) -> Self {
        let random: Arc<dyn RandomPort> = Arc::new(SystemRandom::new());

        let catalogs = Arc::new(CatalogService::new(content));
        let progress = Arc::new(ProgressRepository::new(
            persistence.progress,
            persistence.results,
            Arc::new(SystemClock::new()),
        ));
        let roster = Arc::new(RosterRepository::new(
            persistence.team,
            persistence.talents,
        ));
        let assembler = Arc::new(CharacterAssembler::new(catalogs.clone(), talents));
        let teams = Arc::new(TeamResolver::new(
            catalogs.clone(),
            roster.clone(),
            settings.fallback_character.clone(),
        ));
        let overrides = Arc::new(StageOverrideCache::new());

        let stage_loader = Arc::new(StageLoader::new(
            catalogs.clone(),
            assembler.clone(),
            roster.clone(),
            teams.clone(),
            passives,
            random.clone(),
            overrides.clone(),
        ));
        let orchestrator = Arc::new(StoryOrchestrator::new(
            catalogs.clone(),
            progress.clone(),
            roster.clone(),
            assembler.clone(),
            teams.clone(),
            random,
        ));

        Self {
            settings,
            catalogs,
            progress,
            roster,
            assembler,
            teams,
            overrides,
            stage_loader,
            orchestrator,
        }
    }
}
