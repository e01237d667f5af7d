//! Integration tests for speech synthesis
//!
//! Exercises the regional fallback ladder through the public API with a
//! scripted backend, so no network access is needed.

use spanish_practice::speech::backends::ScriptedBackend;
use spanish_practice::speech::{Synthesizer, Voice};
use spanish_practice::PracticeError;

#[test]
fn test_first_attempt_succeeds() {
    let synth = Synthesizer::new(ScriptedBackend::new());
    let audio = synth.synthesize("Buenos días", Voice::Mexico).unwrap();
    assert!(!audio.is_empty());

    let requests = synth.backend().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].region.as_deref(), Some("com.mx"));
    assert!(!requests[0].slow);
}

#[test]
fn test_ladder_reaches_minimal_request() {
    let synth = Synthesizer::new(ScriptedBackend::new().fail_first(3));
    synth.synthesize("¿Qué hora es?", Voice::Narrator).unwrap();

    let requests = synth.backend().requests();
    let regions: Vec<Option<&str>> = requests.iter().map(|r| r.region.as_deref()).collect();
    assert_eq!(regions, vec![Some("us"), Some("com"), Some("es"), None]);
    assert_eq!(requests[3].language, "es");
    assert!(!requests[3].slow);
    assert_eq!(synth.backend().successes(), 1);
}

#[test]
fn test_exhausted_ladder_reports_errors() {
    let synth = Synthesizer::new(ScriptedBackend::new().fail_first(4));
    match synth.synthesize("Hola", Voice::Spain) {
        Err(PracticeError::Synthesis {
            attempts,
            first,
            last,
        }) => {
            assert_eq!(attempts, 4);
            assert_ne!(first, last);
        }
        other => panic!("expected synthesis error, got {:?}", other.map(|b| b.len())),
    }
}

#[test]
fn test_empty_text_fails_every_attempt() {
    let synth = Synthesizer::new(ScriptedBackend::new());
    assert!(synth.synthesize("   ", Voice::Spain).is_err());
    assert_eq!(synth.backend().requests().len(), 4);
}
