//! Speech backends

// Google Translate text-to-speech over HTTPS
pub mod google;

// Deterministic offline backend for tests and dry runs
pub mod scripted;

pub use google::GoogleTranslateTts;
pub use scripted::ScriptedBackend;
