pub mod app_settings;
pub mod clock;
pub mod content_sources;
pub mod persistence;
pub mod ports;

pub use app_settings::EngineSettings;
pub use clock::{SystemClock, SystemRandom};
