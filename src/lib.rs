//! spanish-practice - Spanish listening and writing practice
//!
//! Generates listening-comprehension items (a short conversation, a question
//! and four answer choices) with a language model, synthesizes and caches the
//! audio for them, and runs them as a quiz. Also extracts questions from test
//! transcripts into a searchable index, and reads handwritten Spanish off
//! images for writing practice.

pub mod audio;
pub mod error;
pub mod index;
pub mod model;
pub mod questions;
pub mod quiz;
pub mod speech;
pub mod state;
pub mod writing;

pub use error::{PracticeError, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "spanish-practice";
