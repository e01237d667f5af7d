//! Question generator
//!
//! One example conversation in, N practice items with audio out:
//! prompt the model once, parse its reply, then synthesize (or fetch from
//! cache) the conversation track and the narrated question and choices.

use super::item::PracticeItem;
use super::parser::{self, ParsedItem};
use super::prompts;
use crate::audio::{AudioCache, AudioStore};
use crate::model::LanguageModel;
use crate::speech::{SpeechBackend, Voice};
use crate::{PracticeError, Result};
use log::{info, warn};

/// Upper bound on items per request
pub const DEFAULT_MAX_QUESTIONS: usize = 20;

/// Generates practice items from an example conversation
pub struct QuestionGenerator<M, S, B> {
    model: M,
    audio: AudioCache<S, B>,
    max_questions: usize,
}

impl<M, S, B> QuestionGenerator<M, S, B>
where
    M: LanguageModel,
    S: AudioStore,
    B: SpeechBackend,
{
    pub fn new(model: M, audio: AudioCache<S, B>) -> Self {
        Self {
            model,
            audio,
            max_questions: DEFAULT_MAX_QUESTIONS,
        }
    }

    pub fn with_max_questions(mut self, max_questions: usize) -> Self {
        self.max_questions = max_questions.max(1);
        self
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn audio(&self) -> &AudioCache<S, B> {
        &self.audio
    }

    /// Generate `num_questions` new items styled after `conversation`
    ///
    /// The model is called once; its errors propagate unchanged. Drafts the
    /// parser rejects are logged and skipped. The model may return more or
    /// fewer items than requested; all complete ones are kept.
    pub fn generate_questions(
        &mut self,
        conversation: &str,
        num_questions: usize,
    ) -> Result<Vec<PracticeItem>> {
        if conversation.trim().is_empty() {
            return Err(PracticeError::InvalidInput(
                "Example conversation is empty".to_string(),
            ));
        }
        if num_questions == 0 || num_questions > self.max_questions {
            return Err(PracticeError::InvalidInput(format!(
                "Number of questions must be between 1 and {}",
                self.max_questions
            )));
        }

        let prompt = prompts::question_prompt(conversation, num_questions);
        info!("Requesting {} questions from the model", num_questions);
        let response = self.model.generate(&prompt)?;

        let report = parser::parse(&response);
        for rejected in &report.rejected {
            warn!("Skipping malformed item: {}", rejected);
        }
        if report.items.is_empty() {
            return Err(PracticeError::NoItems {
                rejected: report.rejected.len(),
            });
        }
        if report.items.len() != num_questions {
            warn!(
                "Asked for {} questions, model produced {}",
                num_questions,
                report.items.len()
            );
        }

        report
            .items
            .into_iter()
            .map(|item| self.attach_audio(item))
            .collect()
    }

    /// Synthesize conversation, question and choice audio for a parsed item
    pub fn attach_audio(&self, item: ParsedItem) -> Result<PracticeItem> {
        let conversation_audio = self.audio.conversation(&item.conversation)?;
        let question_audio = self.audio.speech(&item.question, Voice::Narrator)?;
        let choice_audio = item
            .choices()
            .into_iter()
            .map(|choice| self.audio.speech(choice, Voice::Narrator))
            .collect::<Result<Vec<_>>>()?;

        Ok(PracticeItem {
            conversation: item.conversation,
            question: item.question,
            answer: item.answer,
            distractors: item.distractors,
            conversation_audio,
            question_audio,
            choice_audio,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::MemoryStore;
    use crate::model::ScriptedModel;
    use crate::speech::backends::ScriptedBackend;
    use crate::speech::Synthesizer;

    fn generator(model: ScriptedModel) -> QuestionGenerator<ScriptedModel, MemoryStore, ScriptedBackend> {
        QuestionGenerator::new(
            model,
            AudioCache::new(MemoryStore::new(), Synthesizer::new(ScriptedBackend::new())),
        )
    }

    #[test]
    fn test_rejects_bad_counts() {
        let mut generator = generator(ScriptedModel::new());
        assert!(generator.generate_questions("[A]: Hola", 0).is_err());
        assert!(generator.generate_questions("[A]: Hola", 21).is_err());
        assert!(generator.generate_questions("   ", 1).is_err());
        assert!(generator.model().prompts().is_empty());
    }

    #[test]
    fn test_model_error_propagates() {
        let mut generator = generator(ScriptedModel::new().fail("quota exceeded"));
        let err = generator.generate_questions("[A]: Hola", 1).unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
        assert!(generator.audio().store().is_empty());
    }

    #[test]
    fn test_unparseable_reply() {
        let mut generator = generator(ScriptedModel::new().reply("Lo siento, no puedo."));
        assert!(matches!(
            generator.generate_questions("[A]: Hola", 1),
            Err(PracticeError::NoItems { rejected: 0 })
        ));
    }
}
