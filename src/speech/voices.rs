//! Voice configuration table
//!
//! Three fixed synthesis profiles: two conversational voices that alternate
//! between conversation lines, and a slow narrator for questions and choices.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Language/region/speed triple selecting a synthesis profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceConfig {
    /// Language code sent to the speech service
    pub language: &'static str,
    /// Regional variant (Google domain suffix, e.g. "com.mx")
    pub region: &'static str,
    /// Slow speech rate
    pub slow: bool,
}

/// Synthesis voices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    /// Castilian Spanish
    Spain,
    /// Mexican Spanish
    Mexico,
    /// Slow US Spanish, used for questions and answer choices
    Narrator,
}

const VOICES: [(Voice, VoiceConfig); 3] = [
    (
        Voice::Spain,
        VoiceConfig {
            language: "es",
            region: "es",
            slow: false,
        },
    ),
    (
        Voice::Mexico,
        VoiceConfig {
            language: "es",
            region: "com.mx",
            slow: false,
        },
    ),
    (
        Voice::Narrator,
        VoiceConfig {
            language: "es",
            region: "us",
            slow: true,
        },
    ),
];

impl Voice {
    /// Stable identifier, part of the cache key
    pub fn id(self) -> &'static str {
        match self {
            Voice::Spain => "spain",
            Voice::Mexico => "mexico",
            Voice::Narrator => "narrator",
        }
    }

    pub fn config(self) -> &'static VoiceConfig {
        VOICES
            .iter()
            .find(|(voice, _)| *voice == self)
            .map(|(_, config)| config)
            .unwrap_or(&VOICES[0].1)
    }

    /// Voice for the nth line of a conversation (spain, mexico, spain, ...)
    pub fn for_line(index: usize) -> Self {
        if index % 2 == 0 {
            Voice::Spain
        } else {
            Voice::Mexico
        }
    }

    pub fn all() -> impl Iterator<Item = Voice> {
        VOICES.iter().map(|(voice, _)| *voice)
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_voice_has_config() {
        for voice in Voice::all() {
            assert_eq!(voice.config().language, "es");
        }
        assert_eq!(Voice::Mexico.config().region, "com.mx");
        assert!(Voice::Narrator.config().slow);
        assert!(!Voice::Spain.config().slow);
    }

    #[test]
    fn test_conversation_lines_alternate() {
        assert_eq!(Voice::for_line(0), Voice::Spain);
        assert_eq!(Voice::for_line(1), Voice::Mexico);
        assert_eq!(Voice::for_line(2), Voice::Spain);
    }
}
