//! Speech synthesizer
//!
//! Turns text plus a voice into audio bytes. Synthesis goes through a
//! `SpeechBackend`, retried across regional variants in a fixed order
//! before giving up.

use super::voices::Voice;
use crate::{PracticeError, Result};
use log::{debug, info, warn};

/// Regional variants tried after the voice's own region
pub const FALLBACK_REGIONS: [&str; 2] = ["com", "es"];

/// Language used for the last, minimal-configuration attempt
pub const MINIMAL_LANGUAGE: &str = "es";

/// A single request sent to a speech backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub text: String,
    pub language: String,
    /// Regional variant; `None` lets the backend pick its default
    pub region: Option<String>,
    pub slow: bool,
}

impl SpeechRequest {
    /// Minimal request: language only, backend defaults for everything else
    pub fn minimal(text: &str) -> Self {
        Self {
            text: text.to_string(),
            language: MINIMAL_LANGUAGE.to_string(),
            region: None,
            slow: false,
        }
    }
}

/// Text-to-speech service
///
/// Backends return encoded audio (MP3 or WAV) for one request.
pub trait SpeechBackend {
    /// Short name used in log output
    fn name(&self) -> &str;

    /// Synthesize one request into encoded audio bytes
    fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>>;
}

impl<B: SpeechBackend + ?Sized> SpeechBackend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        (**self).synthesize(request)
    }
}

/// Voice-aware synthesizer with a regional fallback ladder
pub struct Synthesizer<B> {
    backend: B,
}

impl<B: SpeechBackend> Synthesizer<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Requests tried for `text` spoken by `voice`, in order
    ///
    /// The voice's region, then each fallback region, then a minimal request.
    pub fn attempts(text: &str, voice: Voice) -> Vec<SpeechRequest> {
        let config = voice.config();
        let mut attempts: Vec<SpeechRequest> = std::iter::once(config.region)
            .chain(FALLBACK_REGIONS)
            .map(|region| SpeechRequest {
                text: text.to_string(),
                language: config.language.to_string(),
                region: Some(region.to_string()),
                slow: config.slow,
            })
            .collect();
        attempts.push(SpeechRequest::minimal(text));
        attempts
    }

    /// Synthesize `text` with `voice`, returning the first successful result
    pub fn synthesize(&self, text: &str, voice: Voice) -> Result<Vec<u8>> {
        let attempts = Self::attempts(text, voice);
        let total = attempts.len();
        let mut first_error: Option<PracticeError> = None;
        let mut last_error: Option<PracticeError> = None;

        for (i, request) in attempts.iter().enumerate() {
            debug!(
                "{}: attempt {}/{} for voice {} (region {:?})",
                self.backend.name(),
                i + 1,
                total,
                voice,
                request.region
            );
            match self.backend.synthesize(request) {
                Ok(audio) => {
                    if i > 0 {
                        info!(
                            "Synthesized with fallback attempt {} (region {:?})",
                            i + 1,
                            request.region
                        );
                    }
                    return Ok(audio);
                }
                Err(e) => {
                    warn!(
                        "✗ {} failed for region {:?}: {}",
                        self.backend.name(),
                        request.region,
                        e
                    );
                    if first_error.is_none() {
                        first_error = Some(e);
                    } else {
                        last_error = Some(e);
                    }
                }
            }
        }

        let first = first_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no attempts made".to_string());
        let last = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| first.clone());
        Err(PracticeError::Synthesis {
            attempts: total,
            first,
            last,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::backends::scripted::ScriptedBackend;

    #[test]
    fn test_attempt_order() {
        let attempts = Synthesizer::<ScriptedBackend>::attempts("hola", Voice::Mexico);
        let regions: Vec<Option<&str>> = attempts.iter().map(|r| r.region.as_deref()).collect();
        assert_eq!(
            regions,
            vec![Some("com.mx"), Some("com"), Some("es"), None]
        );
        assert!(attempts.iter().all(|r| r.text == "hola"));
        assert_eq!(attempts[3], SpeechRequest::minimal("hola"));
    }

    #[test]
    fn test_narrator_attempts_keep_slow_speed() {
        let attempts = Synthesizer::<ScriptedBackend>::attempts("pregunta", Voice::Narrator);
        assert!(attempts[..3].iter().all(|r| r.slow));
        assert!(!attempts[3].slow);
    }

    #[test]
    fn test_first_success_wins() {
        let backend = ScriptedBackend::new().fail_first(2);
        let synth = Synthesizer::new(backend);
        let audio = synth.synthesize("hola", Voice::Spain).unwrap();
        assert!(!audio.is_empty());
        assert_eq!(synth.backend().requests().len(), 3);
        assert_eq!(
            synth.backend().requests()[2].region.as_deref(),
            Some("es")
        );
    }

    #[test]
    fn test_all_attempts_fail() {
        let synth = Synthesizer::new(ScriptedBackend::new().fail_first(usize::MAX));
        let err = synth.synthesize("hola", Voice::Spain).unwrap_err();
        match err {
            PracticeError::Synthesis {
                attempts,
                first,
                last,
            } => {
                assert_eq!(attempts, 4);
                assert!(first.contains("attempt 1"));
                assert!(last.contains("attempt 4"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
