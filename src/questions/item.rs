//! Practice item data model

use crate::audio::AudioRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One spoken line of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: String,
    pub text: String,
}

/// Ordered conversation between speakers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub(crate) fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut Turn> {
        self.turns.last_mut()
    }
}

/// Canonical `[speaker]: text` form, one turn per line
impl fmt::Display for Conversation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, turn) in self.turns.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[{}]: {}", turn.speaker, turn.text)?;
        }
        Ok(())
    }
}

/// A generated conversation, question and answer set with attached audio
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeItem {
    pub conversation: Conversation,
    pub question: String,
    /// The correct answer
    pub answer: String,
    /// Incorrect answers, in the order the model stated them
    pub distractors: [String; 3],
    pub conversation_audio: AudioRef,
    pub question_audio: AudioRef,
    /// One clip per entry of `choices()`, same order
    pub choice_audio: Vec<AudioRef>,
}

impl PracticeItem {
    /// Correct answer first, then the distractors
    pub fn choices(&self) -> Vec<&str> {
        std::iter::once(self.answer.as_str())
            .chain(self.distractors.iter().map(String::as_str))
            .collect()
    }
}
