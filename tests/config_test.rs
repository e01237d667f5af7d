//! Configuration loading tests
//!
//! Tests that configuration files are created with defaults and that
//! values in an existing file override them

use spanish_practice::model::gemini::DEFAULT_MODEL;
use spanish_practice::questions::generator::DEFAULT_MAX_QUESTIONS;
use spanish_practice::state::config::Config;
use std::fs;

#[test]
fn test_default_config_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("practice.cfg");

    let config = Config::load_from(&path).expect("Failed to load config");
    assert!(path.exists());
    assert_eq!(config.path(), path.as_path());

    assert_eq!(config.gemini_model(), DEFAULT_MODEL);
    assert_eq!(config.max_questions(), DEFAULT_MAX_QUESTIONS);
    assert!(config.speech_host().starts_with("translate.google"));
    assert!(config
        .questions_file()
        .to_string_lossy()
        .ends_with("generated_questions.json"));

    // Reloading the written file gives the same values
    let again = Config::load_from(&path).unwrap();
    assert_eq!(again.audio_cache_dir(), config.audio_cache_dir());
}

#[test]
fn test_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("practice.cfg");
    fs::write(
        &path,
        "[gemini]\nmodel=gemini-test\napi_key=  secret  \n\
         [storage]\naudio_cache=/tmp/practice-audio\n\
         [quiz]\nmax_questions=5\n",
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.gemini_model(), "gemini-test");
    assert_eq!(config.max_questions(), 5);
    assert_eq!(
        config.audio_cache_dir(),
        std::path::PathBuf::from("/tmp/practice-audio")
    );
    assert_eq!(config.resolve_api_key(None).as_deref(), Some("secret"));

    let settings = config.settings_with_key("secret");
    assert_eq!(settings.model, "gemini-test");
}

#[test]
fn test_invalid_values_fall_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("practice.cfg");
    fs::write(&path, "[quiz]\nmax_questions=-3\n[gemini]\napi_key=\n").unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.max_questions(), DEFAULT_MAX_QUESTIONS);
    assert_eq!(config.resolve_api_key(None), None);
}

#[test]
fn test_set_and_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("practice.cfg");
    let mut config = Config::load_from(&path).unwrap();
    config.set("speech", "host", "translate.example");
    config.save().unwrap();

    let reloaded = Config::load_from(&path).unwrap();
    assert_eq!(reloaded.speech_host(), "translate.example");
}
