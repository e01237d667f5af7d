//! Language model clients
//!
//! The generator and the writing assistant talk to a model through the
//! `LanguageModel` trait: free text in, free text out, optionally with an
//! image attached.

pub mod gemini;
pub mod scripted;

pub use gemini::{GeminiChat, GeminiSettings};
pub use scripted::{ScriptedModel, ScriptedReply};

use crate::Result;

/// An image sent alongside a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Text-generating model
pub trait LanguageModel {
    /// Send a prompt and return the model's text reply
    fn generate(&mut self, prompt: &str) -> Result<String>;

    /// Send a prompt with an attached image
    fn generate_with_image(&mut self, prompt: &str, image: &ImageInput) -> Result<String>;
}

impl<M: LanguageModel + ?Sized> LanguageModel for Box<M> {
    fn generate(&mut self, prompt: &str) -> Result<String> {
        (**self).generate(prompt)
    }

    fn generate_with_image(&mut self, prompt: &str, image: &ImageInput) -> Result<String> {
        (**self).generate_with_image(prompt, image)
    }
}
