//! Shared test scaffolding: the on-disk fixture catalogs and a deterministic
//! randomness source.

use std::path::PathBuf;
use std::sync::Arc;

use emberrun_domain::CharacterId;

use crate::catalogs::CatalogService;
use crate::infrastructure::content_sources::FileContentSource;
use crate::infrastructure::ports::RandomPort;

/// A catalog service reading the JSON fixtures under `test_data/`.
pub fn fixture_catalogs() -> Arc<CatalogService> {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_data");
    Arc::new(CatalogService::new(Arc::new(FileContentSource::new(base))))
}

/// A [`RandomPort`] with pinned outcomes.
pub struct FixedRandom {
    index: usize,
    coin: bool,
}

impl FixedRandom {
    /// Always pick index 0, land every coin flip on heads, leave shuffles
    /// alone.
    pub fn zeros() -> Self {
        Self {
            index: 0,
            coin: true,
        }
    }
}

impl RandomPort for FixedRandom {
    fn index(&self, len: usize) -> usize {
        self.index.min(len.saturating_sub(1))
    }

    fn coin_flip(&self) -> bool {
        self.coin
    }

    fn shuffle_characters(&self, _ids: &mut Vec<CharacterId>) {}
}
