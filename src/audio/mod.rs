//! Audio storage and processing

pub mod cache;
pub mod combine;

pub use cache::{AudioCache, AudioRef, AudioStore, CacheKey, FileStore, MemoryStore};
pub use combine::{combine, GAP_MS};
