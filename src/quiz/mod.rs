//! Quiz sessions
//!
//! A `QuizSession` owns everything one sitting of the quiz needs: the items,
//! the per-question choice order, what the learner selected and which
//! questions have been checked. Nothing is global, so two sessions over the
//! same items never interfere.

pub mod terminal;

use crate::audio::AudioRef;
use crate::questions::PracticeItem;
use crate::{PracticeError, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

/// One answer choice as shown to the learner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub text: String,
    pub audio: Option<AudioRef>,
    /// Set on the item's correct answer only, whatever its text
    pub is_correct: bool,
}

/// State of a single question within a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionState {
    /// Choices in display order
    pub choices: Vec<Choice>,
    pub correct_answer: String,
    /// Index into `choices`
    pub selected: Option<usize>,
    pub checked: bool,
    pub is_correct: bool,
}

impl QuestionState {
    fn new<R: Rng + ?Sized>(item: &PracticeItem, rng: &mut R) -> Self {
        let mut choices: Vec<Choice> = item
            .choices()
            .into_iter()
            .enumerate()
            .map(|(i, text)| Choice {
                text: text.to_string(),
                audio: item.choice_audio.get(i).cloned(),
                is_correct: i == 0,
            })
            .collect();
        choices.shuffle(rng);

        Self {
            choices,
            correct_answer: item.answer.clone(),
            selected: None,
            checked: false,
            is_correct: false,
        }
    }

    /// Index of the correct answer in display order
    pub fn correct_index(&self) -> Option<usize> {
        self.choices.iter().position(|c| c.is_correct)
    }
}

/// Feedback tier for a finished quiz
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Perfect,
    Great,
    Good,
    KeepStudying,
}

impl Feedback {
    pub fn for_percentage(percentage: f64) -> Self {
        if percentage >= 100.0 {
            Feedback::Perfect
        } else if percentage >= 80.0 {
            Feedback::Great
        } else if percentage >= 60.0 {
            Feedback::Good
        } else {
            Feedback::KeepStudying
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Feedback::Perfect => "¡Perfecto! Excellent work!",
            Feedback::Great => "¡Muy bien! Great job!",
            Feedback::Good => "¡Bien! Good effort!",
            Feedback::KeepStudying => "Keep practicing! ¡Sigue estudiando!",
        }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Final result of a session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub correct: usize,
    pub checked: usize,
    pub percentage: f64,
    pub feedback: Feedback,
}

pub struct QuizSession {
    items: Vec<PracticeItem>,
    questions: Vec<QuestionState>,
}

impl QuizSession {
    /// Start a session, shuffling each item's choices (text and audio together)
    pub fn new<R: Rng + ?Sized>(items: Vec<PracticeItem>, rng: &mut R) -> Self {
        let questions = items
            .iter()
            .map(|item| QuestionState::new(item, rng))
            .collect();
        Self { items, questions }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, question: usize) -> Option<&PracticeItem> {
        self.items.get(question)
    }

    pub fn question(&self, question: usize) -> Option<&QuestionState> {
        self.questions.get(question)
    }

    pub fn questions(&self) -> &[QuestionState] {
        &self.questions
    }

    fn state_mut(&mut self, question: usize) -> Result<&mut QuestionState> {
        let count = self.questions.len();
        self.questions.get_mut(question).ok_or_else(|| {
            PracticeError::InvalidInput(format!(
                "Question {} out of range (session has {})",
                question + 1,
                count
            ))
        })
    }

    /// Select a choice; changing the selection clears an earlier check
    pub fn select(&mut self, question: usize, choice: usize) -> Result<()> {
        let state = self.state_mut(question)?;
        if choice >= state.choices.len() {
            return Err(PracticeError::InvalidInput(format!(
                "Choice {} out of range",
                choice + 1
            )));
        }
        if state.selected != Some(choice) {
            state.selected = Some(choice);
            state.checked = false;
            state.is_correct = false;
        }
        Ok(())
    }

    /// Check the current selection, returning whether it is correct
    pub fn check(&mut self, question: usize) -> Result<bool> {
        let state = self.state_mut(question)?;
        let selected = state.selected.ok_or_else(|| {
            PracticeError::InvalidInput(format!("No answer selected for question {}", question + 1))
        })?;
        state.is_correct = state.choices[selected].is_correct;
        state.checked = true;
        Ok(state.is_correct)
    }

    /// Score once every question has been checked
    pub fn score(&self) -> Option<Score> {
        if self.questions.is_empty() || !self.questions.iter().all(|q| q.checked) {
            return None;
        }
        let checked = self.questions.len();
        let correct = self.questions.iter().filter(|q| q.is_correct).count();
        let percentage = correct as f64 / checked as f64 * 100.0;
        Some(Score {
            correct,
            checked,
            percentage,
            feedback: Feedback::for_percentage(percentage),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::{Conversation, Turn};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn item(n: usize) -> PracticeItem {
        PracticeItem {
            conversation: Conversation::new(vec![Turn {
                speaker: "Ana".to_string(),
                text: format!("Hola {}", n),
            }]),
            question: format!("Pregunta {}", n),
            answer: format!("correcta {}", n),
            distractors: [
                format!("mala a {}", n),
                format!("mala b {}", n),
                format!("mala c {}", n),
            ],
            conversation_audio: AudioRef(format!("conv{}.wav", n)),
            question_audio: AudioRef(format!("q{}.mp3", n)),
            choice_audio: (0..4).map(|i| AudioRef(format!("c{}_{}.mp3", n, i))).collect(),
        }
    }

    fn session(count: usize) -> QuizSession {
        let mut rng = StdRng::seed_from_u64(7);
        QuizSession::new((0..count).map(item).collect(), &mut rng)
    }

    #[test]
    fn test_audio_follows_text_when_shuffled() {
        let quiz = session(3);
        for (n, state) in quiz.questions().iter().enumerate() {
            let original = item(n);
            for choice in &state.choices {
                let i = original
                    .choices()
                    .iter()
                    .position(|c| *c == choice.text)
                    .unwrap();
                assert_eq!(choice.audio.as_ref(), Some(&original.choice_audio[i]));
            }
            assert_eq!(state.choices.len(), 4);
            assert!(state.correct_index().is_some());
        }
    }

    #[test]
    fn test_check_requires_selection() {
        let mut quiz = session(1);
        assert!(quiz.check(0).is_err());
        assert!(quiz.select(0, 4).is_err());
        assert!(quiz.select(1, 0).is_err());
    }

    #[test]
    fn test_score_after_all_checked() {
        let mut quiz = session(2);
        let right = quiz.question(0).unwrap().correct_index().unwrap();
        quiz.select(0, right).unwrap();
        assert!(quiz.check(0).unwrap());
        assert!(quiz.score().is_none());

        let right = quiz.question(1).unwrap().correct_index().unwrap();
        let wrong = (right + 1) % 4;
        quiz.select(1, wrong).unwrap();
        assert!(!quiz.check(1).unwrap());

        let score = quiz.score().unwrap();
        assert_eq!(score.correct, 1);
        assert_eq!(score.checked, 2);
        assert_eq!(score.percentage, 50.0);
        assert_eq!(score.feedback, Feedback::KeepStudying);
    }

    #[test]
    fn test_reselect_clears_check() {
        let mut quiz = session(1);
        let right = quiz.question(0).unwrap().correct_index().unwrap();
        quiz.select(0, (right + 1) % 4).unwrap();
        quiz.check(0).unwrap();
        quiz.select(0, right).unwrap();
        assert!(!quiz.question(0).unwrap().checked);
        assert!(quiz.score().is_none());
    }

    #[test]
    fn test_repeated_answer_text_graded_by_position() {
        let mut repeated = item(0);
        repeated.answer = "Sí".to_string();
        repeated.distractors = ["Sí".to_string(), "No".to_string(), "Quizás".to_string()];
        let mut quiz = QuizSession::new(vec![repeated], &mut StdRng::seed_from_u64(11));

        let state = quiz.question(0).unwrap();
        assert_eq!(state.choices.iter().filter(|c| c.is_correct).count(), 1);
        let right = state.correct_index().unwrap();
        assert_eq!(
            state.choices[right].audio,
            Some(AudioRef("c0_0.mp3".to_string()))
        );
        let twin = state
            .choices
            .iter()
            .position(|c| c.audio == Some(AudioRef("c0_1.mp3".to_string())))
            .unwrap();

        quiz.select(0, twin).unwrap();
        assert!(!quiz.check(0).unwrap());
        quiz.select(0, right).unwrap();
        assert!(quiz.check(0).unwrap());
    }

    #[test]
    fn test_feedback_tiers() {
        assert_eq!(Feedback::for_percentage(100.0), Feedback::Perfect);
        assert_eq!(Feedback::for_percentage(80.0), Feedback::Great);
        assert_eq!(Feedback::for_percentage(60.0), Feedback::Good);
        assert_eq!(Feedback::for_percentage(59.9), Feedback::KeepStudying);
    }
}
