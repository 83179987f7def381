//! Persistence backend adapters.

mod memory;

pub use memory::MemoryBackend;
