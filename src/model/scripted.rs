//! Scripted language model
//!
//! Replays queued replies in order and records every prompt it receives.
//! Used by tests and by `--dry-run` so the whole pipeline can run offline.

use super::{ImageInput, LanguageModel};
use crate::{PracticeError, Result};
use std::collections::VecDeque;

/// One queued reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedReply {
    /// Return this text
    Text(String),
    /// Fail with this message
    Error(String),
}

/// Language model that replays a fixed script
#[derive(Debug, Default)]
pub struct ScriptedModel {
    replies: VecDeque<ScriptedReply>,
    prompts: Vec<String>,
    images: Vec<ImageInput>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    pub fn reply(mut self, text: impl Into<String>) -> Self {
        self.replies.push_back(ScriptedReply::Text(text.into()));
        self
    }

    /// Queue a failure
    pub fn fail(mut self, message: impl Into<String>) -> Self {
        self.replies.push_back(ScriptedReply::Error(message.into()));
        self
    }

    /// Prompts received so far
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Images received so far
    pub fn images(&self) -> &[ImageInput] {
        &self.images
    }

    fn next_reply(&mut self) -> Result<String> {
        match self.replies.pop_front() {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Error(message)) => Err(PracticeError::Model(message)),
            None => Err(PracticeError::Model("script exhausted".to_string())),
        }
    }
}

impl LanguageModel for ScriptedModel {
    fn generate(&mut self, prompt: &str) -> Result<String> {
        self.prompts.push(prompt.to_string());
        self.next_reply()
    }

    fn generate_with_image(&mut self, prompt: &str, image: &ImageInput) -> Result<String> {
        self.prompts.push(prompt.to_string());
        self.images.push(image.clone());
        self.next_reply()
    }
}
