//! Engine use cases: assembly, stage loading, and the story run loop.

pub mod assemble;
pub mod stage;
pub mod story;
pub mod team;

pub use assemble::{AssembleError, AssembleOptions, CharacterAssembler, InstanceCounter};
pub use stage::{LoadedStage, StageLoadError, StageLoader, StageOverrideCache, StoryContext};
pub use story::{
    ChoiceApplied, CurrentStage, StoryError, StoryLoad, StoryOrchestrator, StoryView,
};
pub use team::TeamResolver;
