//! Full run flow over the wired application: battle, choice, recruitment,
//! and defeat, against the on-disk fixture catalogs and the in-memory
//! backend.

use std::path::PathBuf;
use std::sync::Arc;

use emberrun_domain::{BattleResultRecord, FinalCombatantState};
use emberrun_engine::app::{App, PersistencePorts};
use emberrun_engine::infrastructure::content_sources::FileContentSource;
use emberrun_engine::infrastructure::persistence::MemoryBackend;
use emberrun_engine::infrastructure::ports::{BattleResultRepo, NoPassives, NoTalents};
use emberrun_engine::infrastructure::EngineSettings;
use emberrun_engine::use_cases::{CurrentStage, StoryContext, StoryLoad, StoryView};
use tracing_subscriber::EnvFilter;

fn wired_app() -> (App, Arc<MemoryBackend>) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();

    let backend = Arc::new(MemoryBackend::new());
    let content = Arc::new(FileContentSource::new(
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_data"),
    ));
    let app = App::new(
        EngineSettings::default(),
        content,
        PersistencePorts {
            progress: backend.clone(),
            results: backend.clone(),
            team: backend.clone(),
            talents: backend.clone(),
        },
        Arc::new(NoTalents),
        Arc::new(NoPassives),
    );
    (app, backend)
}

fn view(load: StoryLoad) -> StoryView {
    match load {
        StoryLoad::View(view) => view,
        StoryLoad::RunEnded => panic!("expected a story view, got run ended"),
    }
}

#[tokio::test]
async fn a_full_run_from_first_battle_to_defeat() {
    let (app, backend) = wired_app();
    let user = "u1".into();
    let story = "ashen_road".into();

    backend.seed_team_selection(&user, vec!["knight".into(), "witch".into()]);
    app.catalogs.load().await.expect("prime catalogs");
    assert!(app.catalogs.is_loaded());

    // Fresh run: first stage is the opening battle, team at full vitals.
    let opening = view(app.orchestrator.load_story(&user, &story).await.expect("load"));
    assert!(matches!(opening.current, CurrentStage::Battle { index: 0, .. }));
    assert_eq!(opening.team.len(), 2);
    assert_eq!(opening.team[0].current_hp, 1000.0);

    // The stage loader materializes the same battle for the combat layer.
    let loaded = app
        .stage_loader
        .load_stage(
            &user,
            &"unused".into(),
            Some(&opening.progress.last_team_state),
            Some(StoryContext {
                story_id: story.clone(),
                stage_index: 0,
            }),
        )
        .await
        .expect("stage load");
    assert_eq!(loaded.definition.name, "Outskirts");
    assert_eq!(loaded.ai_roster.len(), 2);
    assert_eq!(loaded.player_roster.len(), 2);

    // Victory at stage 0 advances to the choice stage.
    backend
        .put(
            &user,
            &BattleResultRecord {
                story_id: story.clone(),
                stage_index: 0,
                victory: true,
                final_team_state: vec![
                    FinalCombatantState {
                        id: "knight".into(),
                        current_hp: 640.0,
                        current_mana: 80.0,
                    },
                    FinalCombatantState {
                        id: "witch".into(),
                        current_hp: 700.0,
                        current_mana: 180.0,
                    },
                ],
            },
        )
        .await
        .expect("put result");
    let at_choice = view(app.orchestrator.load_story(&user, &story).await.expect("load"));
    assert!(matches!(at_choice.current, CurrentStage::Choice { index: 1, .. }));
    assert_eq!(at_choice.team[0].current_hp, 640.0);

    // "Train" boosts the knight's attack and moves on to recruitment.
    let applied = app
        .orchestrator
        .apply_choice_effect(&user, &story, 1, &"knight".into())
        .await
        .expect("choice");
    assert_eq!(applied.state.stats.expect("stats").attack, 60.0);
    assert_eq!(applied.progress.current_stage_index, 2);

    let offers = app
        .orchestrator
        .recruitment_offers(&user, &story)
        .await
        .expect("offers");
    assert_eq!(offers.len(), 1);
    let progress = app
        .orchestrator
        .add_recruit(&user, &story, &offers[0])
        .await
        .expect("recruit");
    assert_eq!(progress.current_stage_index, 3);

    // The boss battle fields the enlarged team.
    let at_boss = view(app.orchestrator.load_story(&user, &story).await.expect("load"));
    let CurrentStage::Battle { index: 3, stage } = at_boss.current else {
        panic!("expected the boss battle");
    };
    assert_eq!(stage.name, "Throne of Cinders");
    assert_eq!(at_boss.team.len(), 3);

    // Defeat ends and wipes the run.
    backend
        .put(
            &user,
            &BattleResultRecord {
                story_id: story.clone(),
                stage_index: 3,
                victory: false,
                final_team_state: vec![],
            },
        )
        .await
        .expect("put result");
    let ended = app.orchestrator.load_story(&user, &story).await.expect("load");
    assert!(matches!(ended, StoryLoad::RunEnded));
    assert!(app.progress.fetch(&user, &story).await.is_fresh());
}
