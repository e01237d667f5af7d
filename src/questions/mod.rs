//! Listening-comprehension questions: data model, parsing, generation

pub mod generator;
pub mod item;
pub mod library;
pub mod parser;
pub mod prompts;
pub mod transcript;

pub use generator::QuestionGenerator;
pub use item::{Conversation, PracticeItem, Turn};
pub use parser::{parse, DraftError, ParseReport, ParsedItem};
pub use transcript::{QuestionRecord, TranscriptExtractor};
