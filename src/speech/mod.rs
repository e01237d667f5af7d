//! Speech synthesis system

pub mod backends;
pub mod synth;
pub mod voices;

pub use synth::{SpeechBackend, SpeechRequest, Synthesizer};
pub use voices::{Voice, VoiceConfig};
