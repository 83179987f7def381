//! Testability ports for injecting time and randomness.

use chrono::{DateTime, Utc};
use emberrun_domain::CharacterId;

#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[cfg_attr(test, mockall::automock)]
pub trait RandomPort: Send + Sync {
    /// Uniform index in `[0, len)`. `len` must be non-zero.
    fn index(&self, len: usize) -> usize;
    /// Fair coin.
    fn coin_flip(&self) -> bool;
    /// Uniform shuffle, used for recruitment offers.
    fn shuffle_characters(&self, ids: &mut Vec<CharacterId>);
}
