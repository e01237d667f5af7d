//! Conversation/question parser
//!
//! Reads the line-prefixed text a language model returns:
//!
//! ```text
//! Conversation:
//! [Speaker 1]: ¡Hola! ¿Cómo estás?
//! [Speaker 2]: Muy bien, gracias.
//! Question: ¿Cómo está la segunda persona?
//! Correct Answer: Muy bien
//! Incorrect Answer 1: Cansada
//! Incorrect Answer 2: Enferma
//! Incorrect Answer 3: Triste
//! ```
//!
//! Each `Conversation:` line opens a new draft. Drafts are validated when
//! they close; incomplete or contradictory drafts are rejected, never
//! emitted half-filled.

use super::item::{Conversation, Turn};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static BRACKETED_SPEAKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[([^\]]+)\]\s*:\s*(.*)$").expect("valid speaker regex"));

/// `Name: text`; the name starts with a letter and the colon is followed by
/// whitespace, so clock times like `3:30` stay in the running turn
static NAMED_SPEAKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\p{L}[\p{L}\p{N} .'-]{0,39}):(?:\s+(.*))?$").expect("valid speaker regex")
});

/// Recognized line prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Conversation,
    Question,
    CorrectAnswer,
    IncorrectAnswer(usize),
}

const PREFIXES: [(&str, Field); 6] = [
    ("Conversation:", Field::Conversation),
    ("Question:", Field::Question),
    ("Correct Answer:", Field::CorrectAnswer),
    ("Incorrect Answer 1:", Field::IncorrectAnswer(0)),
    ("Incorrect Answer 2:", Field::IncorrectAnswer(1)),
    ("Incorrect Answer 3:", Field::IncorrectAnswer(2)),
];

impl Field {
    fn name(self) -> &'static str {
        match self {
            Field::Conversation => "conversation",
            Field::Question => "question",
            Field::CorrectAnswer => "correct answer",
            Field::IncorrectAnswer(0) => "incorrect answer 1",
            Field::IncorrectAnswer(1) => "incorrect answer 2",
            Field::IncorrectAnswer(_) => "incorrect answer 3",
        }
    }
}

/// Why a draft was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("item {index}: missing {}", missing.join(", "))]
    Incomplete {
        index: usize,
        missing: Vec<&'static str>,
    },

    #[error("item {index}: {field} given more than once")]
    Duplicate { index: usize, field: &'static str },

    #[error("item {index}: choice \"{choice}\" appears more than once")]
    Repeated { index: usize, choice: String },

    #[error("line {line}: {field} appears before any conversation")]
    Orphan { line: usize, field: &'static str },
}

/// A complete, validated item (no audio yet)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedItem {
    pub conversation: Conversation,
    pub question: String,
    pub answer: String,
    pub distractors: [String; 3],
}

impl ParsedItem {
    /// Correct answer first, then the distractors in stated order
    pub fn choices(&self) -> Vec<&str> {
        std::iter::once(self.answer.as_str())
            .chain(self.distractors.iter().map(String::as_str))
            .collect()
    }
}

/// Accumulates one item's fields until the next `Conversation:` line
#[derive(Debug, Default)]
pub struct ItemDraft {
    index: usize,
    conversation: Conversation,
    question: Option<String>,
    answer: Option<String>,
    distractors: [Option<String>; 3],
    duplicate: Option<&'static str>,
}

impl ItemDraft {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }

    /// Conversation lines are only accepted before any other field
    fn accepts_conversation(&self) -> bool {
        self.question.is_none() && self.answer.is_none() && self.distractors.iter().all(Option::is_none)
    }

    /// Add one conversation line
    ///
    /// `[Speaker]: text` and `Speaker: text` open a turn; anything else
    /// continues the previous turn.
    fn push_line(&mut self, line: &str) {
        let tagged = BRACKETED_SPEAKER
            .captures(line)
            .or_else(|| NAMED_SPEAKER.captures(line));

        if let Some(caps) = tagged {
            self.conversation.push(Turn {
                speaker: caps[1].trim().to_string(),
                text: caps.get(2).map_or("", |m| m.as_str()).trim().to_string(),
            });
            return;
        }

        if let Some(last) = self.conversation.last_mut() {
            if !last.text.is_empty() {
                last.text.push(' ');
            }
            last.text.push_str(line);
            return;
        }

        self.conversation.push(Turn {
            speaker: String::new(),
            text: line.to_string(),
        });
    }

    fn set(&mut self, field: Field, value: &str) {
        let slot = match field {
            Field::Conversation => return,
            Field::Question => &mut self.question,
            Field::CorrectAnswer => &mut self.answer,
            Field::IncorrectAnswer(n) => &mut self.distractors[n],
        };
        if slot.is_some() {
            self.duplicate.get_or_insert(field.name());
        } else {
            *slot = Some(value.to_string());
        }
    }

    /// Validate and produce the finished item
    pub fn finish(self) -> Result<ParsedItem, DraftError> {
        if let Some(field) = self.duplicate {
            return Err(DraftError::Duplicate {
                index: self.index,
                field,
            });
        }

        let turns: Vec<Turn> = self
            .conversation
            .turns()
            .iter()
            .filter(|t| !t.text.is_empty())
            .cloned()
            .collect();

        fn present(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.is_empty())
        }

        let question = present(self.question);
        let answer = present(self.answer);
        let [d1, d2, d3] = self.distractors;
        let distractors = [present(d1), present(d2), present(d3)];

        let mut missing = Vec::new();
        if turns.is_empty() {
            missing.push(Field::Conversation.name());
        }
        if question.is_none() {
            missing.push(Field::Question.name());
        }
        if answer.is_none() {
            missing.push(Field::CorrectAnswer.name());
        }
        for (i, d) in distractors.iter().enumerate() {
            if d.is_none() {
                missing.push(Field::IncorrectAnswer(i).name());
            }
        }

        match (question, answer, distractors) {
            (Some(question), Some(answer), [Some(d1), Some(d2), Some(d3)])
                if !turns.is_empty() =>
            {
                let choices = [&answer, &d1, &d2, &d3];
                if let Some(choice) = choices
                    .iter()
                    .enumerate()
                    .find_map(|(i, c)| choices[..i].contains(c).then_some(*c))
                {
                    return Err(DraftError::Repeated {
                        index: self.index,
                        choice: choice.clone(),
                    });
                }
                Ok(ParsedItem {
                    conversation: Conversation::new(turns),
                    question,
                    answer,
                    distractors: [d1, d2, d3],
                })
            }
            _ => Err(DraftError::Incomplete {
                index: self.index,
                missing,
            }),
        }
    }
}

/// Outcome of parsing one model response
#[derive(Debug, Default)]
pub struct ParseReport {
    pub items: Vec<ParsedItem>,
    pub rejected: Vec<DraftError>,
}

impl ParseReport {
    fn record(&mut self, outcome: Result<ParsedItem, DraftError>) {
        match outcome {
            Ok(item) => self.items.push(item),
            Err(e) => self.rejected.push(e),
        }
    }
}

/// Strip markdown emphasis and bullet markers
fn clean(line: &str) -> String {
    line.replace("**", "")
        .replace("__", "")
        .trim()
        .trim_start_matches(['#', '*', '-', '>'])
        .trim()
        .to_string()
}

fn match_field(line: &str) -> Option<(Field, &str)> {
    PREFIXES.iter().find_map(|(prefix, field)| {
        line.strip_prefix(prefix)
            .map(|rest| (*field, rest.trim()))
    })
}

/// Parse a model response into practice item drafts
pub fn parse(text: &str) -> ParseReport {
    let mut report = ParseReport::default();
    let mut draft: Option<ItemDraft> = None;
    let mut next_index = 0;

    for (line_no, raw) in text.lines().enumerate() {
        let line = clean(raw);
        if line.is_empty() {
            continue;
        }

        match match_field(&line) {
            Some((Field::Conversation, rest)) => {
                if let Some(done) = draft.take() {
                    report.record(done.finish());
                }
                let mut fresh = ItemDraft::new(next_index);
                next_index += 1;
                if !rest.is_empty() {
                    fresh.push_line(rest);
                }
                draft = Some(fresh);
            }
            Some((field, rest)) => match draft.as_mut() {
                Some(current) => current.set(field, rest),
                None => report.rejected.push(DraftError::Orphan {
                    line: line_no + 1,
                    field: field.name(),
                }),
            },
            None => match draft.as_mut() {
                Some(current) if current.accepts_conversation() => current.push_line(&line),
                _ => debug!("Ignoring line {}: {}", line_no + 1, line),
            },
        }
    }

    if let Some(done) = draft {
        report.record(done.finish());
    }

    debug!(
        "Parsed {} items, rejected {}",
        report.items.len(),
        report.rejected.len()
    );
    report
}
