//! Content-addressed audio cache
//!
//! Audio is keyed by an MD5 digest of what was spoken and who spoke it, so
//! the same line is only ever synthesized once. Entries are write-once and
//! never evicted.

use crate::audio::combine;
use crate::questions::Conversation;
use crate::speech::{SpeechBackend, Synthesizer, Voice};
use crate::{PracticeError, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Reference to stored audio, as recorded in practice items
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudioRef(pub String);

impl AudioRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AudioRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Deterministic cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    stem: String,
    extension: &'static str,
}

impl CacheKey {
    /// Key for one synthesized line: md5 of "normalized text:voice id"
    pub fn speech(text: &str, voice: Voice) -> Self {
        let digest = md5::compute(format!("{}:{}", normalize(text), voice.id()));
        Self {
            stem: format!("{:x}", digest),
            extension: "mp3",
        }
    }

    /// Key for a combined conversation track
    pub fn conversation(conversation: &Conversation) -> Self {
        let digest = md5::compute(conversation.to_string());
        Self {
            stem: format!("combined_{:x}", digest),
            extension: "wav",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.stem, self.extension)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// Collapse runs of whitespace and trim
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Content-addressed key/value storage for audio blobs
pub trait AudioStore {
    /// Stored bytes for `key`, if any
    fn load(&self, key: &CacheKey) -> Result<Option<Vec<u8>>>;

    /// Store `bytes` under `key`, replacing any previous value
    fn save(&self, key: &CacheKey, bytes: &[u8]) -> Result<()>;

    /// Reference recorded in items for `key`
    fn locate(&self, key: &CacheKey) -> AudioRef;

    fn contains(&self, key: &CacheKey) -> Result<bool> {
        Ok(self.load(key)?.is_some())
    }
}

/// Flat directory of hash-named files
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a cache directory
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let dir = dir.canonicalize()?;
        debug!("Audio cache at {:?}", dir);
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }
}

impl AudioStore for FileStore {
    fn load(&self, key: &CacheKey) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &CacheKey, bytes: &[u8]) -> Result<()> {
        // Write beside the target and rename so readers never see a partial file
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.persist(self.path(key)).map_err(|e| e.error)?;
        Ok(())
    }

    fn locate(&self, key: &CacheKey) -> AudioRef {
        AudioRef(self.path(key).to_string_lossy().into_owned())
    }
}

/// In-memory store
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AudioStore for MemoryStore {
    fn load(&self, key: &CacheKey) -> Result<Option<Vec<u8>>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| PracticeError::Other("audio store lock poisoned".to_string()))?;
        Ok(entries.get(&key.file_name()).cloned())
    }

    fn save(&self, key: &CacheKey, bytes: &[u8]) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| PracticeError::Other("audio store lock poisoned".to_string()))?;
        entries.insert(key.file_name(), bytes.to_vec());
        Ok(())
    }

    fn locate(&self, key: &CacheKey) -> AudioRef {
        AudioRef(format!("memory://{}", key.file_name()))
    }
}

/// Synthesizer fronted by an audio store
pub struct AudioCache<S, B> {
    store: S,
    synth: Synthesizer<B>,
}

impl<S: AudioStore, B: SpeechBackend> AudioCache<S, B> {
    pub fn new(store: S, synth: Synthesizer<B>) -> Self {
        Self { store, synth }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn synthesizer(&self) -> &Synthesizer<B> {
        &self.synth
    }

    /// Cached audio for `text` spoken by `voice`, synthesizing on a miss
    pub fn get_or_create(&self, text: &str, voice: Voice) -> Result<Vec<u8>> {
        let key = CacheKey::speech(text, voice);
        if let Some(bytes) = self.store.load(&key)? {
            debug!("Cache hit {} ({})", key, voice);
            return Ok(bytes);
        }

        debug!("Cache miss {} ({}), synthesizing", key, voice);
        let bytes = self.synth.synthesize(text, voice)?;
        self.store.save(&key, &bytes)?;
        Ok(bytes)
    }

    /// Like `get_or_create`, returning the stored reference
    pub fn speech(&self, text: &str, voice: Voice) -> Result<AudioRef> {
        self.get_or_create(text, voice)?;
        Ok(self.store.locate(&CacheKey::speech(text, voice)))
    }

    /// Combined track for a whole conversation, voices alternating by line
    pub fn conversation(&self, conversation: &Conversation) -> Result<AudioRef> {
        if conversation.is_empty() {
            return Err(PracticeError::InvalidInput(
                "Cannot generate audio for an empty conversation".to_string(),
            ));
        }

        let key = CacheKey::conversation(conversation);
        if self.store.contains(&key)? {
            debug!("Conversation audio already cached as {}", key);
            return Ok(self.store.locate(&key));
        }

        let clips = conversation
            .turns()
            .iter()
            .enumerate()
            .map(|(i, turn)| self.get_or_create(&turn.text, Voice::for_line(i)))
            .collect::<Result<Vec<_>>>()?;

        let combined = combine::combine(&clips)?;
        self.store.save(&key, &combined)?;
        info!(
            "Generated conversation audio {} from {} lines",
            key,
            clips.len()
        );
        Ok(self.store.locate(&key))
    }
}
