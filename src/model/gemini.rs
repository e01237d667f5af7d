//! Google Gemini client
//!
//! Uses the `generateContent` REST endpoint. Text prompts go through a chat
//! session: earlier turns are resent with every request so follow-up
//! prompts see the conversation so far. Image prompts are one-shot.

use super::{ImageInput, LanguageModel};
use crate::{PracticeError, Result};
use base64::Engine;
use log::{debug, info};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-lite-preview-02-05";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";

/// Connection settings for the Gemini API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiSettings {
    pub api_base: String,
    pub model: String,
    pub embedding_model: String,
    pub api_key: String,
}

impl GeminiSettings {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub(crate) fn endpoint(&self, model: &str, method: &str) -> String {
        format!(
            "{}/v1beta/models/{}:{}",
            self.api_base.trim_end_matches('/'),
            model,
            method
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: &'a [Content],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl Content {
    fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts,
        }
    }

    fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    fn image(image: &ImageInput) -> Self {
        Self {
            inline_data: Some(InlineData {
                mime_type: image.mime_type.clone(),
                data: base64::engine::general_purpose::STANDARD.encode(&image.bytes),
            }),
            ..Default::default()
        }
    }
}

/// POST a JSON body to a Gemini endpoint, mapping API errors to `PracticeError::Model`
pub(crate) fn post_json<T: Serialize + ?Sized>(
    client: &Client,
    settings: &GeminiSettings,
    url: &str,
    body: &T,
) -> Result<String> {
    let response = client
        .post(url)
        .header("x-goog-api-key", &settings.api_key)
        .json(body)
        .send()?;

    let status = response.status();
    let text = response.text()?;
    if !status.is_success() {
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .map(|body| body.error.message)
            .unwrap_or(text);
        return Err(PracticeError::Model(format!("{} ({})", message, status)));
    }
    Ok(text)
}

/// Pull the reply text out of a `generateContent` response body
fn reply_content(body: &str) -> Result<Content> {
    let response: GenerateResponse = serde_json::from_str(body)?;

    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(PracticeError::Model(format!("Prompt blocked: {}", reason)));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| PracticeError::Model("Response contained no candidates".to_string()))?;

    match candidate.content {
        Some(content) if !content.text().is_empty() => Ok(content),
        _ => Err(PracticeError::Model(format!(
            "Empty response (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        ))),
    }
}

/// Chat session with a Gemini model
pub struct GeminiChat {
    client: Client,
    settings: GeminiSettings,
    history: Vec<Content>,
}

impl GeminiChat {
    pub fn new(settings: GeminiSettings) -> Result<Self> {
        if settings.api_key.trim().is_empty() {
            return Err(PracticeError::MissingCredentials(
                "Gemini API key is empty".to_string(),
            ));
        }
        info!("Using Gemini model {}", settings.model);
        Ok(Self {
            client: Client::new(),
            settings,
            history: Vec::new(),
        })
    }

    pub fn settings(&self) -> &GeminiSettings {
        &self.settings
    }

    /// Number of messages (user and model) in the session
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Forget earlier turns
    pub fn reset(&mut self) {
        self.history.clear();
    }

    fn send(&self, contents: &[Content]) -> Result<Content> {
        let url = self.settings.endpoint(&self.settings.model, "generateContent");
        debug!("POST {} ({} messages)", url, contents.len());
        let body = post_json(&self.client, &self.settings, &url, &GenerateRequest { contents })?;
        reply_content(&body)
    }
}

impl LanguageModel for GeminiChat {
    fn generate(&mut self, prompt: &str) -> Result<String> {
        let mut contents = self.history.clone();
        contents.push(Content::user(vec![Part::text(prompt)]));

        let mut reply = self.send(&contents)?;
        let text = reply.text();

        reply.role = Some("model".to_string());
        contents.push(reply);
        self.history = contents;
        Ok(text)
    }

    fn generate_with_image(&mut self, prompt: &str, image: &ImageInput) -> Result<String> {
        let contents = [Content::user(vec![Part::text(prompt), Part::image(image)])];
        Ok(self.send(&contents)?.text())
    }
}
