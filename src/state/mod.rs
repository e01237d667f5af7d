//! Application state
//!
//! `AppState` holds the loaded configuration and builds the components each
//! command needs. Live components talk to Gemini and Google speech; dry-run
//! components use the scripted doubles and an in-memory audio store so the
//! whole pipeline can be exercised offline.

pub mod config;

use crate::audio::{AudioCache, AudioStore, FileStore, MemoryStore};
use crate::index::{GeminiEmbedder, HashingEmbedder, QuestionIndex};
use crate::model::{GeminiChat, LanguageModel, ScriptedModel};
use crate::questions::{QuestionGenerator, TranscriptExtractor};
use crate::speech::backends::{GoogleTranslateTts, ScriptedBackend};
use crate::speech::{SpeechBackend, Synthesizer};
use crate::writing::WritingAssistant;
use crate::Result;
use config::Config;
use log::info;

/// Generator with boxed model and backend, as built from configuration
pub type DynGenerator<S> =
    QuestionGenerator<Box<dyn LanguageModel>, S, Box<dyn SpeechBackend>>;

pub struct AppState {
    pub config: Config,
    dry_run: bool,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            dry_run: false,
        }
    }

    /// Use scripted model and speech instead of network services
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Language model client; `MissingCredentials` when no key is configured
    pub fn model(&self) -> Result<Box<dyn LanguageModel>> {
        if self.dry_run {
            return Ok(Box::new(ScriptedModel::new().reply(DRY_RUN_REPLY)));
        }
        Ok(Box::new(GeminiChat::new(self.config.gemini_settings()?)?))
    }

    pub fn speech_backend(&self) -> Result<Box<dyn SpeechBackend>> {
        if self.dry_run {
            return Ok(Box::new(ScriptedBackend::new()));
        }
        Ok(Box::new(GoogleTranslateTts::with_host(
            &self.config.speech_host(),
        )?))
    }

    fn audio_cache<S: AudioStore>(
        &self,
        store: S,
    ) -> Result<AudioCache<S, Box<dyn SpeechBackend>>> {
        Ok(AudioCache::new(store, Synthesizer::new(self.speech_backend()?)))
    }

    /// Generator writing audio to the configured cache directory
    pub fn generator(&self) -> Result<DynGenerator<FileStore>> {
        let model = self.model()?;
        let store = FileStore::open(self.config.audio_cache_dir())?;
        info!("Audio cache at {:?}", store.dir());
        Ok(QuestionGenerator::new(model, self.audio_cache(store)?)
            .with_max_questions(self.config.max_questions()))
    }

    /// Generator keeping audio in memory
    pub fn memory_generator(&self) -> Result<DynGenerator<MemoryStore>> {
        Ok(
            QuestionGenerator::new(self.model()?, self.audio_cache(MemoryStore::new())?)
                .with_max_questions(self.config.max_questions()),
        )
    }

    pub fn writing_assistant(&self) -> Result<WritingAssistant<Box<dyn LanguageModel>>> {
        Ok(WritingAssistant::new(self.model()?))
    }

    pub fn transcript_extractor(&self) -> Result<TranscriptExtractor<Box<dyn LanguageModel>>> {
        Ok(TranscriptExtractor::new(self.model()?))
    }

    /// Index embedded with Gemini
    pub fn gemini_index(&self) -> Result<QuestionIndex<GeminiEmbedder>> {
        let embedder = GeminiEmbedder::new(self.config.gemini_settings()?)?;
        QuestionIndex::open(self.config.index_dir(), embedder)
    }

    /// Index embedded locally, no credentials needed
    pub fn local_index(&self) -> Result<QuestionIndex<HashingEmbedder>> {
        QuestionIndex::open(
            self.config.index_dir().join("local"),
            HashingEmbedder::default(),
        )
    }
}

/// Reply the dry-run model gives to any prompt
pub const DRY_RUN_REPLY: &str = "Conversation:
[Ana]: Hola, ¿a qué hora sale el tren para Sevilla?
[Empleado]: Sale a las diez y media, desde el andén tres.
Question: ¿De qué andén sale el tren?
Correct Answer: Del andén tres
Incorrect Answer 1: Del andén uno
Incorrect Answer 2: Del andén diez
Incorrect Answer 3: Del andén seis
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PracticeError;

    fn config(dir: &tempfile::TempDir, extra: &str) -> Config {
        let path = dir.path().join("test.cfg");
        std::fs::write(
            &path,
            format!(
                "[storage]\naudio_cache={}\nindex_dir={}\n{}",
                dir.path().join("audio").display(),
                dir.path().join("index").display(),
                extra
            ),
        )
        .unwrap();
        Config::load_from(&path).unwrap()
    }

    #[test]
    fn test_dry_run_generates_offline() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(config(&dir, "")).with_dry_run(true);
        let mut generator = state.generator().unwrap();
        let items = generator
            .generate_questions("[A]: Hola\n[B]: Buenos días", 1)
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].choice_audio.len(), 4);
        assert!(dir.path().join("audio").exists());
    }

    #[test]
    fn test_local_index_needs_no_key() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(config(&dir, ""));
        let index = state.local_index().unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_file_key_used_for_settings() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir, "[gemini]\napi_key=abc\nmodel=test-model\n");
        assert_eq!(config.resolve_api_key(None).as_deref(), Some("abc"));
        assert_eq!(
            config.resolve_api_key(Some("env".to_string())).as_deref(),
            Some("env")
        );
        assert_eq!(config.settings_with_key("abc").model, "test-model");
    }

    #[test]
    fn test_missing_key_is_reported() {
        if std::env::var(config::API_KEY_VAR).is_ok() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(config(&dir, ""));
        assert!(matches!(
            state.model(),
            Err(PracticeError::MissingCredentials(_))
        ));
    }
}
