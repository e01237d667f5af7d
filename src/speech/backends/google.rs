//! Google Translate speech backend
//!
//! Speaks through the same public endpoint the Translate web page uses.
//! Long text is split into short chunks, one request per chunk, and the
//! returned MP3 fragments are concatenated in order.
//!
//! No API key is needed; the service is rate limited per client and may
//! reject individual regional domains, which is what the synthesizer's
//! fallback ladder is for.

use crate::speech::{SpeechBackend, SpeechRequest};
use crate::{PracticeError, Result};
use base64::Engine;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client;
use serde_json::{json, Value};

/// Domain prefix; the region is appended (`translate.google.com.mx`)
pub const DEFAULT_HOST: &str = "translate.google";

/// Region used when a request does not name one
pub const DEFAULT_REGION: &str = "com";

/// Maximum characters per request accepted by the endpoint
pub const MAX_CHUNK_CHARS: usize = 100;

const RPC_ID: &str = "jQ1olc";

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

static AUDIO_PAYLOAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"jQ1olc","\[\\"(.*)\\"\]"#).expect("valid audio payload regex"));

/// Characters after which a chunk may end
const BREAK_AFTER: &[char] = &['.', ',', ';', ':', '!', '?', '…', '\n'];

/// Google Translate text-to-speech client
pub struct GoogleTranslateTts {
    client: Client,
    host: String,
}

impl GoogleTranslateTts {
    pub fn new() -> Result<Self> {
        Self::with_host(DEFAULT_HOST)
    }

    /// Use a different domain prefix (e.g. a proxy)
    pub fn with_host(host: &str) -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            host: host.trim_end_matches('.').to_string(),
        })
    }

    fn endpoint(&self, region: &str) -> String {
        format!(
            "https://{}.{}/_/TranslateWebserverUi/data/batchexecute",
            self.host, region
        )
    }

    fn speak_chunk(&self, chunk: &str, request: &SpeechRequest) -> Result<Vec<u8>> {
        let region = request.region.as_deref().unwrap_or(DEFAULT_REGION);
        let body = package_rpc(chunk, &request.language, request.slow)?;

        let response = self
            .client
            .post(self.endpoint(region))
            .header("Referer", "http://translate.google.com/")
            .form(&[("f.req", body)])
            .send()?
            .error_for_status()?;

        let text = response.text()?;
        extract_audio(&text)
    }
}

impl SpeechBackend for GoogleTranslateTts {
    fn name(&self) -> &str {
        "google-translate"
    }

    fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        let chunks = split_text(&request.text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(PracticeError::Speech("No text to speak".to_string()));
        }

        let mut audio = Vec::new();
        for (i, chunk) in chunks.iter().enumerate() {
            debug!("Speaking chunk {}/{}: {:?}", i + 1, chunks.len(), chunk);
            audio.extend(self.speak_chunk(chunk, request)?);
        }
        Ok(audio)
    }
}

/// Build the `f.req` form value for one chunk
pub fn package_rpc(text: &str, language: &str, slow: bool) -> Result<String> {
    let speed = if slow { Value::Bool(true) } else { Value::Null };
    let parameter = serde_json::to_string(&json!([text, language, speed, "null"]))?;
    let rpc = json!([[[RPC_ID, parameter, Value::Null, "generic"]]]);
    Ok(serde_json::to_string(&rpc)?)
}

/// Pull the base64 audio out of a batchexecute response body
pub fn extract_audio(body: &str) -> Result<Vec<u8>> {
    let encoded = body
        .lines()
        .filter(|line| line.contains(RPC_ID))
        .find_map(|line| AUDIO_PAYLOAD.captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| PracticeError::Speech("No audio found in speech response".to_string()))?;

    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| PracticeError::Speech(format!("Invalid audio payload: {}", e)))
}

/// Split text into chunks of at most `max_chars` characters
///
/// Prefers breaking after punctuation, then at whitespace, and only cuts a
/// word in half when neither occurs inside the window.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chunks = Vec::new();
    let mut rest = normalized.as_str();

    while !rest.is_empty() {
        let limit = match rest.char_indices().nth(max_chars) {
            Some((idx, _)) => idx,
            None => {
                chunks.push(rest.to_string());
                break;
            }
        };
        let window = &rest[..limit];

        let cut = window
            .char_indices()
            .rev()
            .find(|(_, c)| BREAK_AFTER.contains(c))
            .map(|(i, c)| i + c.len_utf8())
            .or_else(|| window.rfind(' '))
            .filter(|&cut| cut > 0)
            .unwrap_or(limit);

        let chunk = rest[..cut].trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }
        rest = rest[cut..].trim_start();
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        assert_eq!(split_text("  ¡Hola!   ¿Qué tal? ", 100), vec!["¡Hola! ¿Qué tal?"]);
        assert!(split_text("   ", 100).is_empty());
    }

    #[test]
    fn test_long_text_breaks_at_punctuation() {
        let text = "Primera frase bastante larga, segunda parte. Y una tercera que sigue";
        let chunks = split_text(text, 40);
        assert!(chunks.iter().all(|c| c.chars().count() <= 40));
        assert_eq!(chunks[0], "Primera frase bastante larga,");
        assert_eq!(chunks.join(" "), text);
    }

    #[test]
    fn test_unbroken_word_is_cut() {
        let text = "a".repeat(250);
        let chunks = split_text(&text, 100);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].len(), 50);
    }

    #[test]
    fn test_package_rpc() {
        let body = package_rpc("hola", "es", true).unwrap();
        assert_eq!(
            body,
            r#"[[["jQ1olc","[\"hola\",\"es\",true,\"null\"]",null,"generic"]]]"#
        );
        let normal = package_rpc("hola", "es", false).unwrap();
        assert!(normal.contains(r#"\"es\",null,"#));
    }

    #[test]
    fn test_extract_audio() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"ID3audio");
        let body = format!(
            ")]}}'\n\n123\n[[\"wrb.fr\",\"jQ1olc\",\"[\\\"{}\\\"]\",null,null,null,\"generic\"]]\n",
            encoded
        );
        assert_eq!(extract_audio(&body).unwrap(), b"ID3audio");
    }

    #[test]
    fn test_extract_audio_missing() {
        assert!(matches!(
            extract_audio("[[\"wrb.fr\",\"other\"]]"),
            Err(PracticeError::Speech(_))
        ));
    }
}
