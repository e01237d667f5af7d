//! Offline speech backend
//!
//! Renders a short deterministic tone per request instead of calling a
//! speech service. Used by tests and `--dry-run`, and able to fail a
//! configurable number of leading attempts to exercise the fallback ladder.

use crate::speech::{SpeechBackend, SpeechRequest};
use crate::{PracticeError, Result};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Sample rate of the generated clips
pub const SCRIPTED_SAMPLE_RATE: u32 = 8000;

/// Samples rendered per character of input text
const SAMPLES_PER_CHAR: usize = 40;

/// Deterministic offline backend
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    /// Number of leading attempts that fail
    failures: usize,

    /// Attempts made so far
    attempts: AtomicUsize,

    /// Every request received, in order
    requests: Mutex<Vec<SpeechRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the first `n` attempts, then succeed
    pub fn fail_first(mut self, n: usize) -> Self {
        self.failures = n;
        self
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<SpeechRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Number of successful syntheses
    pub fn successes(&self) -> usize {
        self.attempts
            .load(Ordering::SeqCst)
            .saturating_sub(self.failures)
    }

    /// Number of samples a clip for `text` contains
    pub fn clip_len(text: &str) -> usize {
        text.chars().count().max(1) * SAMPLES_PER_CHAR
    }

    fn render(text: &str) -> Result<Vec<u8>> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: SCRIPTED_SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
            let bytes: Vec<u8> = text.bytes().collect();
            for i in 0..Self::clip_len(text) {
                // Never zero, so clips are distinguishable from silence
                let b = bytes.get(i % bytes.len().max(1)).copied().unwrap_or(b'a');
                let sample = 1000 + i16::from(b) * 10;
                writer.write_sample(sample)?;
            }
            writer.finalize()?;
        }
        Ok(cursor.into_inner())
    }
}

impl SpeechBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.failures {
            return Err(PracticeError::Speech(format!(
                "scripted failure on attempt {}",
                attempt
            )));
        }
        if request.text.trim().is_empty() {
            return Err(PracticeError::Speech("No text to speak".to_string()));
        }
        Self::render(&request.text)
    }
}
