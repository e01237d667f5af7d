//! Configuration management

use crate::model::gemini::{DEFAULT_API_BASE, DEFAULT_EMBEDDING_MODEL, DEFAULT_MODEL};
use crate::model::GeminiSettings;
use crate::questions::generator::DEFAULT_MAX_QUESTIONS;
use crate::speech::backends::google::DEFAULT_HOST;
use crate::{PracticeError, Result};
use ini::Ini;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable checked for the API key before the config file
pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";

const CONFIG_FILE: &str = ".spanish-practice.cfg";

/// Application configuration
///
/// Backed by an INI file with `[gemini]`, `[speech]`, `[storage]` and
/// `[quiz]` sections. Missing keys fall back to built-in defaults.
pub struct Config {
    /// INI configuration storage
    ini: Ini,

    /// Config file path (~/.spanish-practice.cfg unless overridden)
    path: PathBuf,
}

impl Config {
    /// Load configuration from the default location, creating it if absent
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, creating a default file if absent
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", path);

        let ini = if path.exists() {
            Ini::load_from_file(path)
                .map_err(|e| PracticeError::IniParse(format!("Failed to load config: {}", e)))?
        } else {
            info!("Config file not found, creating default at {:?}", path);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let default = Self::default_config();
            default
                .write_to_file(path)
                .map_err(|e| PracticeError::IniParse(format!("Failed to write config: {}", e)))?;
            default
        };

        Ok(Self {
            ini,
            path: path.to_path_buf(),
        })
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        debug!("Saving config to {:?}", self.path);
        self.ini
            .write_to_file(&self.path)
            .map_err(|e| PracticeError::Config(format!("Failed to save config: {}", e)))
    }

    /// Default config file path (~/.spanish-practice.cfg)
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory generated data lives under by default
    fn data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("spanish-practice")
    }

    /// Create default configuration
    fn default_config() -> Ini {
        let data = Self::data_dir();
        let mut ini = Ini::new();

        ini.with_section(Some("gemini"))
            .set("model", DEFAULT_MODEL)
            .set("embedding_model", DEFAULT_EMBEDDING_MODEL)
            .set("api_base", DEFAULT_API_BASE);

        ini.with_section(Some("speech")).set("host", DEFAULT_HOST);

        ini.with_section(Some("storage"))
            .set("audio_cache", data.join("audio_cache").display().to_string())
            .set(
                "questions_file",
                data.join("generated_questions.json").display().to_string(),
            )
            .set("index_dir", data.join("vectorstore").display().to_string());

        ini.with_section(Some("quiz"))
            .set("max_questions", DEFAULT_MAX_QUESTIONS.to_string());

        ini
    }

    /// Get a string value from config
    pub fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        self.ini
            .get_from(Some(section), key)
            .unwrap_or(default)
            .to_string()
    }

    /// Get an integer value from config
    pub fn get_int(&self, section: &str, key: &str, default: i32) -> i32 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Set a value in config
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
    }

    /// Get a path value, expanding a leading `~/`
    pub fn get_path(&self, section: &str, key: &str, default: &Path) -> PathBuf {
        match self.ini.get_from(Some(section), key).map(str::trim) {
            Some(value) if !value.is_empty() => expand_home(value),
            _ => default.to_path_buf(),
        }
    }

    pub fn gemini_model(&self) -> String {
        self.get_string("gemini", "model", DEFAULT_MODEL)
    }

    pub fn embedding_model(&self) -> String {
        self.get_string("gemini", "embedding_model", DEFAULT_EMBEDDING_MODEL)
    }

    pub fn api_base(&self) -> String {
        self.get_string("gemini", "api_base", DEFAULT_API_BASE)
    }

    /// API key from `GOOGLE_API_KEY`, falling back to `[gemini] api_key`
    pub fn api_key(&self) -> Option<String> {
        self.resolve_api_key(std::env::var(API_KEY_VAR).ok())
    }

    /// API key given an already-read environment value
    pub fn resolve_api_key(&self, env_value: Option<String>) -> Option<String> {
        env_value
            .or_else(|| self.ini.get_from(Some("gemini"), "api_key").map(String::from))
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    /// Connection settings for the model, or `MissingCredentials` without a key
    pub fn gemini_settings(&self) -> Result<GeminiSettings> {
        let api_key = self.api_key().ok_or_else(|| {
            PracticeError::MissingCredentials(format!(
                "Set {} or add api_key to the [gemini] section of {}",
                API_KEY_VAR,
                self.path.display()
            ))
        })?;
        Ok(self.settings_with_key(&api_key))
    }

    /// Connection settings using `api_key`
    pub fn settings_with_key(&self, api_key: &str) -> GeminiSettings {
        let mut settings = GeminiSettings::new(api_key);
        settings.model = self.gemini_model();
        settings.embedding_model = self.embedding_model();
        settings.api_base = self.api_base();
        settings
    }

    /// Host name prefix for the speech service (region is appended per request)
    pub fn speech_host(&self) -> String {
        self.get_string("speech", "host", DEFAULT_HOST)
    }

    pub fn audio_cache_dir(&self) -> PathBuf {
        self.get_path(
            "storage",
            "audio_cache",
            &Self::data_dir().join("audio_cache"),
        )
    }

    pub fn questions_file(&self) -> PathBuf {
        self.get_path(
            "storage",
            "questions_file",
            &Self::data_dir().join("generated_questions.json"),
        )
    }

    pub fn index_dir(&self) -> PathBuf {
        self.get_path("storage", "index_dir", &Self::data_dir().join("vectorstore"))
    }

    /// Upper bound on questions per generate request (at least 1)
    pub fn max_questions(&self) -> usize {
        self.get_int("quiz", "max_questions", DEFAULT_MAX_QUESTIONS as i32)
            .try_into()
            .ok()
            .filter(|&n: &usize| n > 0)
            .unwrap_or(DEFAULT_MAX_QUESTIONS)
    }
}

fn expand_home(value: &str) -> PathBuf {
    match (value.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(value),
    }
}
