//! Question extraction from listening-test transcripts
//!
//! A transcript of a recorded listening test is sent to the model, which
//! returns the exercises as JSON records. Those records seed the vector
//! index that example conversations are picked from.

use super::prompts;
use crate::model::LanguageModel;
use crate::{PracticeError, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One exercise extracted from a transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(rename = "Conversation")]
    pub conversation: String,
    #[serde(rename = "Question")]
    pub question: String,
    #[serde(rename = "Answer")]
    pub answer: String,
}

/// Extracts question records from transcripts with a language model
pub struct TranscriptExtractor<M> {
    model: M,
}

impl<M: LanguageModel> TranscriptExtractor<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn read_transcript(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(path)?)
    }

    /// Ask the model for the exercises in `transcript`, returning its JSON text
    pub fn extract_questions(&mut self, transcript: &str) -> Result<String> {
        if transcript.trim().is_empty() {
            return Err(PracticeError::InvalidInput("Transcript is empty".to_string()));
        }
        let response = self.model.generate(&prompts::transcript_prompt(transcript))?;
        Ok(strip_code_fences(&response))
    }

    /// Write extracted JSON to `path`, creating parent directories
    pub fn save_questions(&self, questions: &str, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, questions)?;
        info!("Saved extracted questions to {:?}", path);
        Ok(())
    }
}

/// Remove markdown code fences the model wraps JSON in
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse extracted JSON into records
pub fn parse_records(json: &str) -> Result<Vec<QuestionRecord>> {
    let records: Vec<QuestionRecord> = serde_json::from_str(&strip_code_fences(json))?;
    Ok(records)
}
